//! HTTP transport for the consumer, built on a streaming reqwest response.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::{header, Client};
use std::time::Duration;

use crate::domain::foundation::ClientId;
use crate::ports::{EventStreamTransport, FrameStream, TransportError};

use super::sse_decoder::{SseDecoder, DEFAULT_MAX_FRAME_LEN};

/// Where and how to open subscriptions.
#[derive(Debug, Clone)]
pub struct HttpEventSourceConfig {
    /// Server origin, e.g. `http://localhost:3000`.
    pub base_url: String,
    /// Subscription path on that server.
    pub path: String,
    /// Time allowed for the TCP/TLS handshake. The stream itself has no
    /// overall timeout.
    pub connect_timeout: Duration,
    /// Frames larger than this many bytes are dropped.
    pub max_frame_len: usize,
}

impl HttpEventSourceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            path: "/api/realtime/events".to_string(),
            connect_timeout: Duration::from_secs(10),
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_max_frame_len(mut self, max_frame_len: usize) -> Self {
        self.max_frame_len = max_frame_len;
        self
    }

    fn events_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.path)
    }
}

/// Opens `text/event-stream` subscriptions over HTTP.
pub struct HttpEventSource {
    config: HttpEventSourceConfig,
    client: Client,
}

impl HttpEventSource {
    pub fn new(config: HttpEventSourceConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| TransportError::Connect(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl EventStreamTransport for HttpEventSource {
    async fn open(&self, client_id: Option<&ClientId>) -> Result<FrameStream, TransportError> {
        let mut request = self
            .client
            .get(self.config.events_url())
            .header(header::ACCEPT, "text/event-stream")
            .header(header::CACHE_CONTROL, "no-cache");
        if let Some(id) = client_id {
            request = request.query(&[("clientId", id.as_str())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        let mut decoder = SseDecoder::with_max_len(self.config.max_frame_len);
        let frames = response
            .bytes_stream()
            .map(move |chunk| match chunk {
                Ok(bytes) => decoder.feed(&bytes).into_iter().map(Ok).collect::<Vec<_>>(),
                Err(e) => vec![Err(TransportError::Stream(e.to_string()))],
            })
            .flat_map(stream::iter);

        Ok(Box::pin(frames))
    }
}
