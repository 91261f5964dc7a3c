//! Agent orchestration
//!
//! ```text
//!   transcript ──► Provider::chat ──► final text ──► FinalReport
//!        ▲                │
//!        │                ▼ tool calls
//!        │         NavigationGuard
//!        │                │
//!        └── tool msg ◄── ToolDispatcher ──► local tool | external session
//! ```

mod dispatcher;
mod error;
mod guard;
mod orchestrator;
mod outcome;
mod prompt;
pub mod recovery;
mod report;

pub use dispatcher::ToolDispatcher;
pub use error::{AgentError, AgentResult};
pub use guard::{NavigationGuard, MAX_CONSECUTIVE_BACK, NAVIGATE_BACK_TOOL};
pub use orchestrator::{Agent, LoopState, RunOutcome};
pub use outcome::RawToolOutcome;
pub use prompt::{initial_user_message, SYSTEM_PROMPT};
pub use report::{FinalReport, TestResults, TestStatus};

#[cfg(test)]
mod tests;
