//! Incremental `text/event-stream` decoder.
//!
//! Network chunks do not line up with SSE frames, so bytes are buffered
//! until a full line is available. Only `data:` fields are kept; `event:`,
//! `id:` and `retry:` are ignored because the hub never sends them.
//!
//! A frame whose pending line or accumulated data grows past `max_len`
//! bytes is dropped whole; decoding resumes after the next blank line.

/// Largest frame accepted by [`SseDecoder::new`].
pub const DEFAULT_MAX_FRAME_LEN: usize = 1024 * 1024;

/// Decodes SSE bytes into the payloads of complete frames.
#[derive(Debug)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    /// Bytes of `buffer` already known to hold no newline.
    scanned: usize,
    data: Vec<String>,
    data_len: usize,
    max_len: usize,
    discarding: bool,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::with_max_len(DEFAULT_MAX_FRAME_LEN)
    }
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            buffer: Vec::new(),
            scanned: 0,
            data: Vec::new(),
            data_len: 0,
            max_len,
            discarding: false,
        }
    }

    /// Feed one chunk and return every frame it completed.
    ///
    /// Multi-line `data:` fields are joined with `\n`. Comment lines
    /// (keep-alives) and frames without data produce nothing.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        let mut consumed = 0;
        while let Some(offset) = self.buffer[self.scanned..].iter().position(|b| *b == b'\n') {
            let end = self.scanned + offset;
            let raw = &self.buffer[consumed..end];
            let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
            let line = String::from_utf8_lossy(raw).into_owned();

            self.scanned = end + 1;
            consumed = self.scanned;
            if let Some(frame) = self.process_line(&line) {
                frames.push(frame);
            }
        }
        self.buffer.drain(..consumed);
        self.scanned = self.buffer.len();

        if self.buffer.len() > self.max_len {
            tracing::warn!(max_len = self.max_len, "Dropping oversized event stream line");
            self.buffer.clear();
            self.scanned = 0;
            self.discard_frame();
        }
        frames
    }

    /// Whether a partial line or an undispatched frame is buffered.
    pub fn has_pending(&self) -> bool {
        !self.buffer.is_empty() || !self.data.is_empty() || self.discarding
    }

    fn discard_frame(&mut self) {
        self.data.clear();
        self.data_len = 0;
        self.discarding = true;
    }

    fn process_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            if self.discarding {
                self.discarding = false;
                return None;
            }
            if self.data.is_empty() {
                return None;
            }
            let frame = self.data.join("\n");
            self.data.clear();
            self.data_len = 0;
            return Some(frame);
        }

        if self.discarding || line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        if field == "data" {
            if self.data_len + value.len() > self.max_len {
                tracing::warn!(max_len = self.max_len, "Dropping oversized event stream frame");
                self.discard_frame();
                return None;
            }
            self.data_len += value.len();
            self.data.push(value.to_string());
        }
        None
    }
}
