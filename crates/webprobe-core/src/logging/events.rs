//! Timestamped run events for observers
//!
//! A run reports progress to its caller as a stream of [`LogEvent`]s. The
//! [`ObserverLogger`] adapts any callback into a [`Logger`] so every
//! component can keep logging through the same trait.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::traits::Logger;

/// Kind of a run event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    Info,
    Warning,
    Error,
    Success,
    Agent,
}

impl std::fmt::Display for LogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogKind::Info => write!(f, "info"),
            LogKind::Warning => write!(f, "warning"),
            LogKind::Error => write!(f, "error"),
            LogKind::Success => write!(f, "success"),
            LogKind::Agent => write!(f, "agent"),
        }
    }
}

/// One observer event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub kind: LogKind,
    pub message: String,
}

impl LogEvent {
    /// Create an event stamped with the current time
    pub fn now(kind: LogKind, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            kind,
            message: message.into(),
        }
    }
}

/// Callback receiving run events
pub type EventCallback = Arc<dyn Fn(LogEvent) + Send + Sync>;

/// Logger that turns every call into a [`LogEvent`] for a callback.
///
/// Debug messages are dropped unless `with_debug` is set; they are
/// reported as `info` events when enabled.
#[derive(Clone)]
pub struct ObserverLogger {
    callback: EventCallback,
    include_debug: bool,
}

impl ObserverLogger {
    pub fn new(callback: EventCallback) -> Self {
        Self {
            callback,
            include_debug: false,
        }
    }

    /// Build from a plain closure
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(LogEvent) + Send + Sync + 'static,
    {
        Self::new(Arc::new(f))
    }

    pub fn with_debug(mut self, include_debug: bool) -> Self {
        self.include_debug = include_debug;
        self
    }

    fn emit(&self, kind: LogKind, message: &str) {
        (self.callback)(LogEvent::now(kind, message));
    }
}

impl std::fmt::Debug for ObserverLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverLogger")
            .field("include_debug", &self.include_debug)
            .finish()
    }
}

impl Logger for ObserverLogger {
    fn debug(&self, message: &str) {
        if self.include_debug {
            self.emit(LogKind::Info, message);
        }
    }

    fn info(&self, message: &str) {
        self.emit(LogKind::Info, message);
    }

    fn warn(&self, message: &str) {
        self.emit(LogKind::Warning, message);
    }

    fn error(&self, message: &str) {
        self.emit(LogKind::Error, message);
    }

    fn success(&self, message: &str) {
        self.emit(LogKind::Success, message);
    }

    fn agent(&self, message: &str) {
        self.emit(LogKind::Agent, message);
    }
}

/// Logger that keeps every event in memory
///
/// Used by tests to assert on what a run reported.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    events: Mutex<Vec<LogEvent>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events
    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().clone()
    }

    /// Messages of a given kind, in order
    pub fn messages(&self, kind: LogKind) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.message.clone())
            .collect()
    }

    fn push(&self, kind: LogKind, message: &str) {
        self.events.lock().push(LogEvent::now(kind, message));
    }
}

impl Logger for RecordingLogger {
    fn debug(&self, _message: &str) {}

    fn info(&self, message: &str) {
        self.push(LogKind::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(LogKind::Warning, message);
    }

    fn error(&self, message: &str) {
        self.push(LogKind::Error, message);
    }

    fn success(&self, message: &str) {
        self.push(LogKind::Success, message);
    }

    fn agent(&self, message: &str) {
        self.push(LogKind::Agent, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observer_logger_maps_kinds() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let logger = ObserverLogger::from_fn(move |event| sink.lock().push(event));

        logger.debug("hidden");
        logger.info("hello");
        logger.warn("careful");
        logger.error("broken");
        logger.success("done");
        logger.agent("thinking");

        let kinds: Vec<LogKind> = seen.lock().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                LogKind::Info,
                LogKind::Warning,
                LogKind::Error,
                LogKind::Success,
                LogKind::Agent
            ]
        );
    }

    #[test]
    fn test_observer_logger_debug_opt_in() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let logger = ObserverLogger::from_fn(move |event| sink.lock().push(event)).with_debug(true);

        logger.debug("verbose");
        assert_eq!(seen.lock().len(), 1);
        assert_eq!(seen.lock()[0].message, "verbose");
    }

    #[test]
    fn test_event_serialization() {
        let event = LogEvent::now(LogKind::Warning, "retrying");
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"kind\":\"warning\""));
        assert!(json.contains("\"timestamp\""));
    }

    #[test]
    fn test_recording_logger() {
        let logger = RecordingLogger::new();
        logger.info("a");
        logger.warn("b");
        logger.info("c");
        assert_eq!(logger.messages(LogKind::Info), vec!["a", "c"]);
        assert_eq!(logger.events().len(), 3);
    }
}
