//! Event consumer: keeps one subscription open and feeds callbacks.
//!
//! `connect` spawns a task that opens the subscription through an
//! [`EventStreamTransport`], decodes each frame and dispatches it to the
//! registered [`EventHandlers`]. When the stream fails or ends, the task
//! waits according to the [`ReconnectPolicy`] and tries again with the
//! same client id. The backoff only resets once the hub's `connected`
//! handshake arrives, so a server that accepts and hangs up at once is
//! retried with growing delays. A `replaced` frame (another connection
//! took over the client id) stops the task for good.
//!
//! Every `connect`/`disconnect` bumps an epoch. A task that no longer owns
//! the current epoch makes no further state changes, even if it is still
//! finishing a poll when it is aborted.

use futures::StreamExt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::domain::foundation::ClientId;
use crate::domain::realtime::{InboundFrame, RealtimeEvent};
use crate::ports::{EventStreamTransport, FrameStream, TransportError};

use super::handlers::EventHandlers;
use super::reconnect::{Backoff, ReconnectPolicy};

/// Connection status as seen by the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    /// Waiting `delay` before retry number `attempt`.
    Reconnecting { attempt: u32, delay: Duration },
    /// The reconnect policy ran out of attempts.
    GaveUp,
    /// Another connection took over this client id; no reconnect.
    Replaced,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

/// Consumer settings.
#[derive(Debug, Clone, Default)]
pub struct ConsumerConfig {
    pub reconnect: ReconnectPolicy,
}

impl ConsumerConfig {
    pub fn with_reconnect(mut self, policy: ReconnectPolicy) -> Self {
        self.reconnect = policy;
        self
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConsumerError {
    #[error("no tokio runtime available to run the subscription")]
    NoRuntime,
}

#[derive(Default)]
struct Shared {
    epoch: AtomicU64,
    last_event: Mutex<Option<RealtimeEvent>>,
    assigned_id: Mutex<Option<ClientId>>,
}

impl Shared {
    fn is_current(&self, epoch: u64) -> bool {
        self.epoch.load(Ordering::SeqCst) == epoch
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Client side of the realtime channel.
pub struct EventConsumer {
    transport: Arc<dyn EventStreamTransport>,
    handlers: Arc<EventHandlers>,
    config: ConsumerConfig,
    state: Arc<watch::Sender<ConnectionState>>,
    shared: Arc<Shared>,
    task: Mutex<Option<JoinHandle<()>>>,
    requested_id: Mutex<Option<ClientId>>,
}

impl EventConsumer {
    pub fn new(
        transport: Arc<dyn EventStreamTransport>,
        handlers: EventHandlers,
        config: ConsumerConfig,
    ) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            transport,
            handlers: Arc::new(handlers),
            config,
            state: Arc::new(state),
            shared: Arc::new(Shared::default()),
            task: Mutex::new(None),
            requested_id: Mutex::new(None),
        }
    }

    /// Open a subscription, closing any existing one first.
    ///
    /// Returns immediately; progress is visible through
    /// [`subscribe_state`](Self::subscribe_state).
    pub fn connect(&self, client_id: Option<ClientId>) -> Result<(), ConsumerError> {
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| ConsumerError::NoRuntime)?;

        let mut task = lock(&self.task);
        let epoch = self.stop(&mut task);
        *lock(&self.requested_id) = client_id.clone();

        let worker = SubscriptionWorker {
            transport: self.transport.clone(),
            handlers: self.handlers.clone(),
            state: self.state.clone(),
            shared: self.shared.clone(),
            backoff: Backoff::new(self.config.reconnect.clone()),
            client_id,
            epoch,
        };
        *task = Some(runtime.spawn(worker.run()));
        Ok(())
    }

    /// Close the subscription and cancel any pending reconnect.
    ///
    /// Clears the connection state and the last event. Safe to call any
    /// number of times.
    pub fn disconnect(&self) {
        let mut task = lock(&self.task);
        let was_running = task.is_some();
        self.stop(&mut task);
        if was_running {
            tracing::info!("Realtime consumer disconnected");
        }
    }

    /// Reconnect by hand with the last requested client id and a fresh
    /// backoff.
    pub fn reconnect(&self) -> Result<(), ConsumerError> {
        let client_id = lock(&self.requested_id).clone();
        self.connect(client_id)
    }

    pub fn is_connected(&self) -> bool {
        self.state.borrow().is_connected()
    }

    pub fn state(&self) -> ConnectionState {
        self.state.borrow().clone()
    }

    /// Watch connection state changes.
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// The most recent event received on the current subscription.
    pub fn last_event(&self) -> Option<RealtimeEvent> {
        lock(&self.shared.last_event).clone()
    }

    /// The id the hub acknowledged for the current subscription.
    pub fn assigned_client_id(&self) -> Option<ClientId> {
        lock(&self.shared.assigned_id).clone()
    }

    /// Invalidate and abort the running task, reset shared state, and
    /// return the new epoch.
    fn stop(&self, task: &mut Option<JoinHandle<()>>) -> u64 {
        let epoch = self.shared.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(handle) = task.take() {
            handle.abort();
        }
        *lock(&self.shared.last_event) = None;
        *lock(&self.shared.assigned_id) = None;
        self.state.send_replace(ConnectionState::Disconnected);
        epoch
    }
}

impl Drop for EventConsumer {
    fn drop(&mut self) {
        self.shared.epoch.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = lock(&self.task).take() {
            handle.abort();
        }
    }
}

/// How a subscription stream ended without a transport error.
enum StreamEnd {
    Closed,
    Replaced,
}

/// The spawned half of a consumer.
struct SubscriptionWorker {
    transport: Arc<dyn EventStreamTransport>,
    handlers: Arc<EventHandlers>,
    state: Arc<watch::Sender<ConnectionState>>,
    shared: Arc<Shared>,
    backoff: Backoff,
    client_id: Option<ClientId>,
    epoch: u64,
}

impl SubscriptionWorker {
    async fn run(mut self) {
        loop {
            if !self.set_state(ConnectionState::Connecting) {
                return;
            }

            match self.transport.open(self.client_id.as_ref()).await {
                Ok(stream) => {
                    if !self.set_state(ConnectionState::Connected) {
                        return;
                    }
                    tracing::info!(client_id = ?self.client_id, "Realtime stream connected");

                    match self.pump(stream).await {
                        Ok(StreamEnd::Closed) => tracing::info!("Realtime stream closed by server"),
                        Ok(StreamEnd::Replaced) => {
                            tracing::warn!(
                                client_id = ?self.client_id,
                                "Client id taken over by another connection, not reconnecting"
                            );
                            self.set_state(ConnectionState::Replaced);
                            return;
                        }
                        Err(e) => tracing::warn!(error = %e, "Realtime stream failed"),
                    }
                }
                Err(e) => tracing::warn!(error = %e, "Failed to open realtime stream"),
            }

            match self.backoff.next_delay() {
                Some(delay) => {
                    let attempt = self.backoff.attempt();
                    if !self.set_state(ConnectionState::Reconnecting { attempt, delay }) {
                        return;
                    }
                    tracing::debug!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Scheduling realtime reconnect"
                    );
                    tokio::time::sleep(delay).await;
                }
                None => {
                    tracing::error!(
                        attempts = self.backoff.attempt(),
                        "Giving up on realtime stream"
                    );
                    self.set_state(ConnectionState::GaveUp);
                    return;
                }
            }
        }
    }

    async fn pump(&mut self, mut stream: FrameStream) -> Result<StreamEnd, TransportError> {
        while let Some(frame) = stream.next().await {
            let text = frame?;
            if !self.shared.is_current(self.epoch) {
                return Ok(StreamEnd::Closed);
            }
            if let Some(end) = self.handle_frame(&text) {
                return Ok(end);
            }
        }
        Ok(StreamEnd::Closed)
    }

    fn handle_frame(&mut self, text: &str) -> Option<StreamEnd> {
        match InboundFrame::decode(text) {
            Ok(InboundFrame::Connected { client_id }) => {
                tracing::debug!(client_id = %client_id, "Realtime hub acknowledged subscription");
                self.backoff.reset();
                let mut assigned = lock(&self.shared.assigned_id);
                if self.shared.is_current(self.epoch) {
                    *assigned = Some(client_id);
                }
            }
            Ok(InboundFrame::Replaced { .. }) => return Some(StreamEnd::Replaced),
            Ok(InboundFrame::Event(event)) => {
                {
                    let mut last = lock(&self.shared.last_event);
                    if !self.shared.is_current(self.epoch) {
                        return None;
                    }
                    *last = Some(event.clone());
                }
                self.handlers.dispatch(&event);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Dropping malformed realtime frame");
            }
        }
        None
    }

    /// Publish a state change if this worker is still current.
    fn set_state(&self, next: ConnectionState) -> bool {
        let shared = &self.shared;
        let epoch = self.epoch;
        let mut applied = false;
        self.state.send_if_modified(|state| {
            if !shared.is_current(epoch) {
                return false;
            }
            applied = true;
            if *state == next {
                return false;
            }
            *state = next;
            true
        });
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::time::Instant;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    use crate::domain::realtime::{EventType, ServerMessage};

    const WAIT: Duration = Duration::from_secs(2);

    type FrameSender = mpsc::UnboundedSender<Result<String, TransportError>>;

    enum Script {
        Fail(TransportError),
        Stream(mpsc::UnboundedReceiver<Result<String, TransportError>>),
    }

    #[derive(Default)]
    struct ScriptedTransport {
        scripts: Mutex<VecDeque<Script>>,
        opens: Mutex<Vec<Option<ClientId>>>,
    }

    impl ScriptedTransport {
        fn fail(self, error: TransportError) -> Self {
            self.scripts.lock().unwrap().push_back(Script::Fail(error));
            self
        }

        fn stream(self) -> (Self, FrameSender) {
            let (tx, rx) = mpsc::unbounded_channel();
            self.scripts.lock().unwrap().push_back(Script::Stream(rx));
            (self, tx)
        }

        fn opens(&self) -> Vec<Option<ClientId>> {
            self.opens.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EventStreamTransport for ScriptedTransport {
        async fn open(&self, client_id: Option<&ClientId>) -> Result<FrameStream, TransportError> {
            self.opens.lock().unwrap().push(client_id.cloned());
            let script = self.scripts.lock().unwrap().pop_front();
            match script {
                Some(Script::Fail(error)) => Err(error),
                Some(Script::Stream(rx)) => Ok(Box::pin(futures::stream::unfold(
                    rx,
                    |mut rx| async move { rx.recv().await.map(|item| (item, rx)) },
                ))),
                None => Err(TransportError::Connect("script exhausted".into())),
            }
        }
    }

    fn handshake(id: &str) -> Result<String, TransportError> {
        Ok(format!(r#"{{"type":"connected","clientId":"{}"}}"#, id))
    }

    fn event_frame(event_type: EventType, data: serde_json::Value) -> Result<String, TransportError> {
        Ok(ServerMessage::Event(RealtimeEvent::new(event_type, data))
            .to_frame()
            .unwrap())
    }

    fn fast_retry() -> ConsumerConfig {
        ConsumerConfig::default().with_reconnect(ReconnectPolicy::fixed(Duration::from_millis(10)))
    }

    fn id(raw: &str) -> ClientId {
        ClientId::parse(raw).unwrap()
    }

    fn collecting_handlers() -> (EventHandlers, mpsc::UnboundedReceiver<RealtimeEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handlers = EventHandlers::new().on_any(move |event| {
            let _ = tx.send(event.clone());
        });
        (handlers, rx)
    }

    async fn wait_for_state<F>(consumer: &EventConsumer, predicate: F)
    where
        F: FnMut(&ConnectionState) -> bool,
    {
        let mut rx = consumer.subscribe_state();
        timeout(WAIT, rx.wait_for(predicate))
            .await
            .expect("timed out waiting for state")
            .expect("state channel closed");
    }

    #[tokio::test]
    async fn dispatches_events_and_records_last() {
        let (transport, tx) = ScriptedTransport::default().stream();
        let transport = Arc::new(transport);
        let (lines_tx, mut lines) = mpsc::unbounded_channel();
        let handlers = EventHandlers::new().on_line_created(move |event| {
            let _ = lines_tx.send(event.clone());
        });
        let consumer = EventConsumer::new(transport.clone(), handlers, fast_retry());

        tx.send(handshake("admin-dashboard")).unwrap();
        tx.send(event_frame(EventType::LineCreated, json!({"line": {"name": "L1"}})))
            .unwrap();
        consumer.connect(Some(id("admin-dashboard"))).unwrap();

        let received = timeout(WAIT, lines.recv()).await.unwrap().unwrap();
        assert_eq!(received.data["line"]["name"], "L1");
        assert!(consumer.is_connected());
        assert_eq!(consumer.last_event().unwrap().event_type, EventType::LineCreated);
        assert_eq!(consumer.assigned_client_id(), Some(id("admin-dashboard")));
        assert_eq!(transport.opens(), vec![Some(id("admin-dashboard"))]);
    }

    #[tokio::test]
    async fn handshake_is_not_dispatched() {
        let (transport, tx) = ScriptedTransport::default().stream();
        let (handlers, mut events) = collecting_handlers();
        let consumer = EventConsumer::new(Arc::new(transport), handlers, fast_retry());

        tx.send(handshake("A")).unwrap();
        tx.send(event_frame(EventType::TicketDeleted, json!({}))).unwrap();
        consumer.connect(None).unwrap();

        let first = timeout(WAIT, events.recv()).await.unwrap().unwrap();
        assert_eq!(first.event_type, EventType::TicketDeleted);
    }

    #[tokio::test]
    async fn malformed_frame_is_dropped_and_connection_kept() {
        let (transport, tx) = ScriptedTransport::default().stream();
        let transport = Arc::new(transport);
        let (handlers, mut events) = collecting_handlers();
        let consumer = EventConsumer::new(transport.clone(), handlers, fast_retry());

        tx.send(Ok("not json".into())).unwrap();
        tx.send(Ok(r#"{"data":{}}"#.into())).unwrap();
        tx.send(event_frame(EventType::LineUpdated, json!({"id": 1}))).unwrap();
        consumer.connect(None).unwrap();

        let event = timeout(WAIT, events.recv()).await.unwrap().unwrap();
        assert_eq!(event.event_type, EventType::LineUpdated);
        assert!(consumer.is_connected());
        assert_eq!(transport.opens().len(), 1);
    }

    #[tokio::test]
    async fn disconnect_is_idempotent() {
        let (transport, tx) = ScriptedTransport::default().stream();
        let transport = Arc::new(transport);
        let (handlers, mut events) = collecting_handlers();
        let consumer = EventConsumer::new(transport.clone(), handlers, fast_retry());

        tx.send(event_frame(EventType::LineDeleted, json!({}))).unwrap();
        consumer.connect(None).unwrap();
        timeout(WAIT, events.recv()).await.unwrap().unwrap();
        assert!(consumer.last_event().is_some());

        consumer.disconnect();
        consumer.disconnect();

        assert_eq!(consumer.state(), ConnectionState::Disconnected);
        assert!(consumer.last_event().is_none());
        assert!(consumer.assigned_client_id().is_none());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(transport.opens().len(), 1);
    }

    #[tokio::test]
    async fn disconnect_without_connect_is_a_no_op() {
        let consumer = EventConsumer::new(
            Arc::new(ScriptedTransport::default()),
            EventHandlers::new(),
            fast_retry(),
        );
        consumer.disconnect();
        assert_eq!(consumer.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn reconnects_with_same_client_id_after_failure() {
        let transport = ScriptedTransport::default().fail(TransportError::Status(503));
        let (transport, tx) = transport.stream();
        let transport = Arc::new(transport);
        let (handlers, mut events) = collecting_handlers();
        let consumer = EventConsumer::new(transport.clone(), handlers, fast_retry());

        consumer.connect(Some(id("scanner-1"))).unwrap();
        wait_for_state(&consumer, ConnectionState::is_connected).await;

        tx.send(event_frame(EventType::TicketTypeCreated, json!({}))).unwrap();
        let event = timeout(WAIT, events.recv()).await.unwrap().unwrap();
        assert_eq!(event.event_type, EventType::TicketTypeCreated);
        assert_eq!(transport.opens(), vec![Some(id("scanner-1")), Some(id("scanner-1"))]);
    }

    #[tokio::test]
    async fn stream_end_triggers_reconnect() {
        let (transport, first) = ScriptedTransport::default().stream();
        let (transport, _second) = transport.stream();
        let transport = Arc::new(transport);
        let consumer = EventConsumer::new(transport.clone(), EventHandlers::new(), fast_retry());

        consumer.connect(None).unwrap();
        wait_for_state(&consumer, ConnectionState::is_connected).await;
        drop(first);

        timeout(WAIT, async {
            while transport.opens().len() < 2 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
        wait_for_state(&consumer, ConnectionState::is_connected).await;
    }

    #[tokio::test]
    async fn stream_error_triggers_reconnect() {
        let (transport, first) = ScriptedTransport::default().stream();
        let (transport, _second) = transport.stream();
        let transport = Arc::new(transport);
        let consumer = EventConsumer::new(transport.clone(), EventHandlers::new(), fast_retry());

        consumer.connect(None).unwrap();
        wait_for_state(&consumer, ConnectionState::is_connected).await;
        first.send(Err(TransportError::Stream("reset".into()))).unwrap();

        timeout(WAIT, async {
            while transport.opens().len() < 2 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let transport = Arc::new(ScriptedTransport::default());
        let policy = ReconnectPolicy::fixed(Duration::from_millis(5)).with_max_attempts(2);
        let consumer = EventConsumer::new(
            transport.clone(),
            EventHandlers::new(),
            ConsumerConfig::default().with_reconnect(policy),
        );

        consumer.connect(None).unwrap();
        wait_for_state(&consumer, |s| *s == ConnectionState::GaveUp).await;

        assert_eq!(transport.opens().len(), 3);
        assert!(!consumer.is_connected());
    }

    #[tokio::test]
    async fn disconnect_cancels_pending_reconnect() {
        let transport = Arc::new(
            ScriptedTransport::default().fail(TransportError::Connect("refused".into())),
        );
        let policy = ReconnectPolicy::fixed(Duration::from_secs(30));
        let consumer = EventConsumer::new(
            transport.clone(),
            EventHandlers::new(),
            ConsumerConfig::default().with_reconnect(policy),
        );

        consumer.connect(None).unwrap();
        wait_for_state(&consumer, |s| {
            matches!(s, ConnectionState::Reconnecting { attempt: 1, .. })
        })
        .await;

        consumer.disconnect();
        assert_eq!(consumer.state(), ConnectionState::Disconnected);
        assert_eq!(transport.opens().len(), 1);
    }

    #[tokio::test]
    async fn manual_reconnect_reuses_last_client_id() {
        let (transport, _first) = ScriptedTransport::default().stream();
        let (transport, _second) = transport.stream();
        let transport = Arc::new(transport);
        let consumer = EventConsumer::new(transport.clone(), EventHandlers::new(), fast_retry());

        consumer.connect(Some(id("scanner-7"))).unwrap();
        wait_for_state(&consumer, ConnectionState::is_connected).await;
        consumer.disconnect();

        consumer.reconnect().unwrap();
        wait_for_state(&consumer, ConnectionState::is_connected).await;
        assert_eq!(
            transport.opens(),
            vec![Some(id("scanner-7")), Some(id("scanner-7"))]
        );
    }

    /// Accepts every subscription and ends it straight away, optionally
    /// after the handshake.
    #[derive(Default)]
    struct HangUpTransport {
        send_handshake: bool,
        opened_at: Mutex<Vec<Instant>>,
    }

    impl HangUpTransport {
        fn opens(&self) -> usize {
            self.opened_at.lock().unwrap().len()
        }

        fn gaps(&self) -> Vec<Duration> {
            let opened_at = self.opened_at.lock().unwrap();
            opened_at.windows(2).map(|w| w[1] - w[0]).collect()
        }
    }

    #[async_trait]
    impl EventStreamTransport for HangUpTransport {
        async fn open(&self, _client_id: Option<&ClientId>) -> Result<FrameStream, TransportError> {
            self.opened_at.lock().unwrap().push(Instant::now());
            let frames = if self.send_handshake {
                vec![handshake("A")]
            } else {
                Vec::new()
            };
            Ok(Box::pin(futures::stream::iter(frames)))
        }
    }

    #[tokio::test]
    async fn accepted_then_closed_streams_back_off() {
        let transport = Arc::new(HangUpTransport::default());
        let policy = ReconnectPolicy::default()
            .with_jitter(false)
            .with_initial_delay(Duration::from_millis(10))
            .with_max_delay(Duration::from_secs(5))
            .with_max_attempts(3);
        let consumer = EventConsumer::new(
            transport.clone(),
            EventHandlers::new(),
            ConsumerConfig::default().with_reconnect(policy),
        );

        consumer.connect(None).unwrap();
        wait_for_state(&consumer, |s| *s == ConnectionState::GaveUp).await;

        assert_eq!(transport.opens(), 4);
        let gaps = transport.gaps();
        for (gap, expected_ms) in gaps.iter().zip([10u64, 20, 40]) {
            assert!(
                *gap >= Duration::from_millis(expected_ms),
                "gap {:?} shorter than {}ms",
                gap,
                expected_ms
            );
        }
    }

    #[tokio::test]
    async fn handshake_resets_backoff() {
        let transport = Arc::new(HangUpTransport {
            send_handshake: true,
            ..Default::default()
        });
        let policy = ReconnectPolicy::fixed(Duration::from_millis(5)).with_max_attempts(2);
        let consumer = EventConsumer::new(
            transport.clone(),
            EventHandlers::new(),
            ConsumerConfig::default().with_reconnect(policy),
        );

        consumer.connect(None).unwrap();
        timeout(WAIT, async {
            while transport.opens() < 6 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        assert_ne!(consumer.state(), ConnectionState::GaveUp);
        consumer.disconnect();
    }

    #[tokio::test]
    async fn transport_error_marks_disconnected_until_retry() {
        let (transport, first) = ScriptedTransport::default().stream();
        let (transport, _second) = transport.stream();
        let transport = Arc::new(transport);
        let policy = ReconnectPolicy::fixed(Duration::from_millis(200));
        let consumer = EventConsumer::new(
            transport.clone(),
            EventHandlers::new(),
            ConsumerConfig::default().with_reconnect(policy),
        );

        consumer.connect(Some(id("scanner-1"))).unwrap();
        wait_for_state(&consumer, ConnectionState::is_connected).await;

        first.send(Err(TransportError::Stream("reset".into()))).unwrap();
        wait_for_state(&consumer, |s| {
            matches!(s, ConnectionState::Reconnecting { attempt: 1, .. })
        })
        .await;
        assert!(!consumer.is_connected());
        assert_eq!(transport.opens().len(), 1);

        wait_for_state(&consumer, ConnectionState::is_connected).await;
        assert_eq!(transport.opens(), vec![Some(id("scanner-1")), Some(id("scanner-1"))]);
    }

    #[tokio::test]
    async fn replaced_connection_does_not_reconnect() {
        let (transport, tx) = ScriptedTransport::default().stream();
        let (transport, _unused) = transport.stream();
        let transport = Arc::new(transport);
        let consumer = EventConsumer::new(transport.clone(), EventHandlers::new(), fast_retry());

        tx.send(handshake("admin-dashboard")).unwrap();
        tx.send(Ok(r#"{"type":"replaced","clientId":"admin-dashboard"}"#.into()))
            .unwrap();
        consumer.connect(Some(id("admin-dashboard"))).unwrap();

        wait_for_state(&consumer, |s| *s == ConnectionState::Replaced).await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(!consumer.is_connected());
        assert_eq!(consumer.state(), ConnectionState::Replaced);
        assert_eq!(transport.opens().len(), 1);
    }

    #[test]
    fn connect_outside_runtime_fails() {
        let consumer = EventConsumer::new(
            Arc::new(ScriptedTransport::default()),
            EventHandlers::new(),
            ConsumerConfig::default(),
        );
        assert_eq!(consumer.connect(None), Err(ConsumerError::NoRuntime));
    }
}
