//! Breaks "go back" loops
//!
//! Models exploring a site sometimes alternate between a page and
//! `browser_navigate_back` indefinitely. After two consecutive back
//! navigations further ones are refused until another tool is used.

use crate::types::ToolResult;

pub const NAVIGATE_BACK_TOOL: &str = "browser_navigate_back";
pub const MAX_CONSECUTIVE_BACK: usize = 2;

pub const BLOCKED_MESSAGE: &str = "Blocked: browser_navigate_back was called repeatedly. \
Navigate to an explicit URL with browser_navigate instead of going back.";

#[derive(Debug, Clone, Default)]
pub struct NavigationGuard {
    consecutive: usize,
}

impl NavigationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a call; returns the result to use instead of dispatching when blocked
    pub fn check(&mut self, tool_name: &str) -> Option<ToolResult> {
        if tool_name != NAVIGATE_BACK_TOOL {
            self.consecutive = 0;
            return None;
        }

        self.consecutive += 1;
        if self.consecutive > MAX_CONSECUTIVE_BACK {
            Some(ToolResult::failure(BLOCKED_MESSAGE))
        } else {
            None
        }
    }

    /// Consecutive back navigations seen so far
    pub fn consecutive(&self) -> usize {
        self.consecutive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_third_and_later() {
        let mut guard = NavigationGuard::new();
        assert!(guard.check(NAVIGATE_BACK_TOOL).is_none());
        assert!(guard.check(NAVIGATE_BACK_TOOL).is_none());

        let blocked = guard.check(NAVIGATE_BACK_TOOL).expect("third call is blocked");
        assert!(!blocked.success);
        assert!(blocked.error_message.unwrap().contains("explicit URL"));
        assert!(guard.check(NAVIGATE_BACK_TOOL).is_some());
        assert_eq!(guard.consecutive(), 4);
    }

    #[test]
    fn test_other_tool_resets() {
        let mut guard = NavigationGuard::new();
        guard.check(NAVIGATE_BACK_TOOL);
        guard.check(NAVIGATE_BACK_TOOL);
        guard.check(NAVIGATE_BACK_TOOL);
        assert_eq!(guard.consecutive(), 3);

        assert!(guard.check("browser_snapshot").is_none());
        assert_eq!(guard.consecutive(), 0);
        assert!(guard.check(NAVIGATE_BACK_TOOL).is_none());
        assert!(guard.check(NAVIGATE_BACK_TOOL).is_none());
    }
}
