//! Tool management module
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  ToolRegistry                               │
//! │                                             │
//! │  - Fetches tools via MCP tools/list         │
//! │  - Applies include/exclude configuration    │
//! │  - Appends local tools (never shadowed)     │
//! │  - Provides tools to the LLM                │
//! └─────────────────────────────────────────────┘
//!           │                         │
//!           │ MCP (tools/list)        │ in-process
//!           ▼                         ▼
//! ┌──────────────────────┐  ┌──────────────────────┐
//! │  Playwright MCP      │  │  Local tools         │
//! │  browser_* tools     │  │  save_test_file      │
//! │                      │  │  run_tests           │
//! │                      │  │  list_test_files     │
//! └──────────────────────┘  └──────────────────────┘
//! ```

pub mod local;
mod registry;

pub use local::{GeneratedFiles, LocalTool, LocalToolTable, ToolError};
pub use registry::{ToolFilter, ToolRegistry};
