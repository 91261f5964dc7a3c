//! Logging abstractions for runtime-agnostic logging

mod traits;
mod noop;
mod console;
mod events;

pub use traits::Logger;
pub use noop::NoOpLogger;
pub use console::ConsoleLogger;
pub use events::{EventCallback, LogEvent, LogKind, ObserverLogger, RecordingLogger};
