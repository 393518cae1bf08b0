//! Callback registry for consumed events.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::domain::realtime::{EventType, RealtimeEvent};

/// A registered callback.
pub type EventCallback = Arc<dyn Fn(&RealtimeEvent) + Send + Sync>;

/// Callbacks invoked for each event the consumer receives.
///
/// The `on_any` callback runs first, then the callback registered for the
/// event's exact type. Unknown types only reach `on_any`.
#[derive(Clone, Default)]
pub struct EventHandlers {
    any: Option<EventCallback>,
    by_type: HashMap<EventType, EventCallback>,
}

impl EventHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_any<F>(mut self, callback: F) -> Self
    where
        F: Fn(&RealtimeEvent) + Send + Sync + 'static,
    {
        self.any = Some(Arc::new(callback));
        self
    }

    /// Register a callback for one event type, replacing any previous one.
    pub fn on<F>(mut self, event_type: EventType, callback: F) -> Self
    where
        F: Fn(&RealtimeEvent) + Send + Sync + 'static,
    {
        self.by_type.insert(event_type, Arc::new(callback));
        self
    }

    pub fn on_line_created<F>(self, callback: F) -> Self
    where
        F: Fn(&RealtimeEvent) + Send + Sync + 'static,
    {
        self.on(EventType::LineCreated, callback)
    }

    pub fn on_line_updated<F>(self, callback: F) -> Self
    where
        F: Fn(&RealtimeEvent) + Send + Sync + 'static,
    {
        self.on(EventType::LineUpdated, callback)
    }

    pub fn on_line_deleted<F>(self, callback: F) -> Self
    where
        F: Fn(&RealtimeEvent) + Send + Sync + 'static,
    {
        self.on(EventType::LineDeleted, callback)
    }

    pub fn on_ticket_type_created<F>(self, callback: F) -> Self
    where
        F: Fn(&RealtimeEvent) + Send + Sync + 'static,
    {
        self.on(EventType::TicketTypeCreated, callback)
    }

    pub fn on_ticket_deleted<F>(self, callback: F) -> Self
    where
        F: Fn(&RealtimeEvent) + Send + Sync + 'static,
    {
        self.on(EventType::TicketDeleted, callback)
    }

    /// Invoke the callbacks matching `event`.
    pub fn dispatch(&self, event: &RealtimeEvent) {
        if let Some(any) = &self.any {
            any(event);
        }
        if let Some(callback) = self.by_type.get(&event.event_type) {
            callback(event);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.any.is_none() && self.by_type.is_empty()
    }
}

impl fmt::Debug for EventHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandlers")
            .field("any", &self.any.is_some())
            .field("by_type", &self.by_type.keys().collect::<Vec<_>>())
            .finish()
    }
}
