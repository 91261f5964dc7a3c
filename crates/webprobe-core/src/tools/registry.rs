//! Tool registry: the unified tool surface offered to the LLM
//!
//! The ToolRegistry is responsible for:
//! - Discovering tools from the external tool server
//! - Filtering server tools based on configuration
//! - Merging them with local tools, without letting a server tool shadow a local one

use std::collections::HashSet;
use std::sync::Arc;

use crate::{log_debug, log_info};
use crate::config::AgentSettings;
use crate::logging::Logger;
use crate::mcp::ExternalToolClient;
use crate::types::Tool;

use super::local::LocalToolTable;

/// Filter applied to server tools
#[derive(Debug, Clone, Default)]
pub struct ToolFilter {
    /// If set, only include tools with these names
    pub include: Option<HashSet<String>>,
    /// Exclude tools with these names
    pub exclude: HashSet<String>,
}

impl ToolFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from settings; an empty include list means "everything"
    pub fn from_settings(settings: &AgentSettings) -> Self {
        let mut filter = Self::new().with_exclude(settings.exclude_tools.iter().cloned());
        if !settings.include_tools.is_empty() {
            filter = filter.with_include(settings.include_tools.iter().cloned());
        }
        filter
    }

    /// Include only specific tools
    pub fn with_include(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.include = Some(names.into_iter().collect());
        self
    }

    /// Exclude specific tools
    pub fn with_exclude(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.exclude = names.into_iter().collect();
        self
    }

    /// Check if a tool name passes this filter
    pub fn matches(&self, name: &str) -> bool {
        if self.exclude.contains(name) {
            return false;
        }

        match &self.include {
            Some(include) => include.contains(name),
            None => true,
        }
    }
}

/// Aggregates server and local tools for one run
pub struct ToolRegistry {
    /// External tool session owner, shared with the dispatcher
    client: Arc<ExternalToolClient>,
    /// Local tools (always win on name clashes)
    local: LocalToolTable,
    /// Applied to server tools only
    filter: ToolFilter,
    /// Logger
    logger: Arc<dyn Logger>,
}

impl ToolRegistry {
    /// Create a new tool registry
    pub fn new(client: Arc<ExternalToolClient>, local: LocalToolTable, logger: Arc<dyn Logger>) -> Self {
        Self {
            client,
            local,
            filter: ToolFilter::new(),
            logger,
        }
    }

    pub fn with_filter(mut self, filter: ToolFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn local_tools(&self) -> &LocalToolTable {
        &self.local
    }

    /// All tools for the LLM, plus the local table used for dispatch
    ///
    /// Server tools come first in server order, then local tools in
    /// registration order. A server tool is dropped if its name is taken by
    /// a local tool or an earlier server tool. Listing failures contribute
    /// nothing.
    pub async fn get_all_tools(&self) -> (Vec<Tool>, LocalToolTable) {
        let local_names: HashSet<String> = self.local.names().into_iter().collect();
        let mut seen: HashSet<String> = HashSet::new();
        let mut tools = Vec::new();

        let external = self.client.list_tools().await;
        let discovered = external.len();

        for tool in external {
            if !self.filter.matches(&tool.name) {
                continue;
            }
            if local_names.contains(&tool.name) {
                log_debug!(
                    self.logger,
                    "[ToolRegistry] Server tool {} shadowed by local tool",
                    tool.name
                );
                continue;
            }
            if !seen.insert(tool.name.clone()) {
                continue;
            }
            tools.push(tool);
        }

        let external_count = tools.len();
        tools.extend(self.local.definitions());

        log_info!(
            self.logger,
            "[ToolRegistry] {} tools available ({} of {} from server, {} local)",
            tools.len(),
            external_count,
            discovered,
            self.local.len()
        );

        (tools, self.local.clone())
    }
}
