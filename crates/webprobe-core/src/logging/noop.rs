//! No-op logger implementation

use super::traits::Logger;

/// A logger that discards everything
///
/// Default for components built without an observer, and for tests that
/// do not assert on output.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLogger;

impl NoOpLogger {
    pub fn new() -> Self {
        Self
    }
}

impl Logger for NoOpLogger {
    fn debug(&self, _message: &str) {}
    fn info(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
    fn success(&self, _message: &str) {}
    fn agent(&self, _message: &str) {}
}
