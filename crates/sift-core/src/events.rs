//! Typed listener arena for non-fatal events.
//!
//! Components that need to report warnings or informational notices receive
//! an [`EventHub`] explicitly. Listeners are attached before execution and
//! detached afterwards.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Event severity, ordered from least to most important.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl EventLevel {
    /// Upper-case label used in log files.
    pub fn label(self) -> &'static str {
        match self {
            EventLevel::Debug => "DEBUG",
            EventLevel::Info => "INFO",
            EventLevel::Warning => "WARN",
            EventLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for EventLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single reported event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub level: EventLevel,
    /// Component or engine that produced the event.
    pub source: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Event {
    pub fn new(level: EventLevel, source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            source: source.into(),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Receives events emitted through an [`EventHub`].
pub trait EventListener: Send + Sync {
    fn on_event(&self, event: &Event);
}

/// Handle returned by [`EventHub::attach`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(usize);

/// Arena of attached listeners.
#[derive(Default)]
pub struct EventHub {
    listeners: RwLock<Vec<(ListenerId, Arc<dyn EventListener>)>>,
    next_id: RwLock<usize>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a listener; it receives every event emitted until detached.
    pub fn attach(&self, listener: Arc<dyn EventListener>) -> ListenerId {
        let mut next = self.next_id.write();
        let id = ListenerId(*next);
        *next += 1;
        self.listeners.write().push((id, listener));
        id
    }

    /// Detach one listener. Returns false if it was not attached.
    pub fn detach(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    pub fn detach_all(&self) {
        self.listeners.write().clear();
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Deliver an event to every listener and mirror it into `tracing`.
    pub fn emit(&self, event: Event) {
        match event.level {
            EventLevel::Debug => tracing::debug!(source = %event.source, "{}", event.message),
            EventLevel::Info => tracing::info!(source = %event.source, "{}", event.message),
            EventLevel::Warning => tracing::warn!(source = %event.source, "{}", event.message),
            EventLevel::Error => tracing::error!(source = %event.source, "{}", event.message),
        }

        // Snapshot so a listener may emit without deadlocking.
        let listeners: Vec<Arc<dyn EventListener>> = self
            .listeners
            .read()
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener.on_event(&event);
        }
    }

    pub fn debug(&self, source: &str, message: impl Into<String>) {
        self.emit(Event::new(EventLevel::Debug, source, message));
    }

    pub fn info(&self, source: &str, message: impl Into<String>) {
        self.emit(Event::new(EventLevel::Info, source, message));
    }

    pub fn warn(&self, source: &str, message: impl Into<String>) {
        self.emit(Event::new(EventLevel::Warning, source, message));
    }

    pub fn error(&self, source: &str, message: impl Into<String>) {
        self.emit(Event::new(EventLevel::Error, source, message));
    }
}

impl fmt::Debug for EventHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHub")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Listener that keeps every event in memory.
#[derive(Debug, Default)]
pub struct EventLog {
    events: RwLock<Vec<Event>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.read().clone()
    }

    /// Count of events at exactly `level`.
    pub fn count(&self, level: EventLevel) -> usize {
        self.events.read().iter().filter(|e| e.level == level).count()
    }

    pub fn messages(&self, level: EventLevel) -> Vec<String> {
        self.events
            .read()
            .iter()
            .filter(|e| e.level == level)
            .map(|e| e.message.clone())
            .collect()
    }
}

impl EventListener for EventLog {
    fn on_event(&self, event: &Event) {
        self.events.write().push(event.clone());
    }
}
