//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (input loading, --as-of, JSON output, warnings)
//! - `classify` - Classification commands (classify, rules)
//! - `debts` - Debt payoff simulation
//! - `patterns` - Spending pattern detection
//! - `project` - Balance projection and 50/30/20 tiers

pub mod classify;
pub mod core;
pub mod debts;
pub mod patterns;
pub mod project;

// Re-export command functions for main.rs
pub use classify::*;
pub use core::*;
pub use debts::*;
pub use patterns::*;
pub use project::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
