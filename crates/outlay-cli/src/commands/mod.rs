//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Core commands (init) and shared utilities (open_db, date parsing)
//! - `categories` - Category management commands
//! - `expenses` - Expense commands (list, add, delete)
//! - `reports` - Summary and category breakdown
//! - `users` - User account commands
//! - `serve` - Web server command

pub mod categories;
pub mod core;
pub mod expenses;
pub mod reports;
pub mod serve;
pub mod users;

// Re-export command functions for main.rs
pub use categories::*;
pub use core::*;
pub use expenses::*;
pub use reports::*;
pub use serve::*;
pub use users::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
