//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `accounts` - Account management commands (list, add, rename, archive, delete)
//! - `categories` - Category management commands
//! - `core` - Core commands (init, register) and shared utilities (open_db)
//! - `import` - Statement import command (xlsx and CSV)
//! - `reminders` - Recurring date reminder commands
//! - `serve` - Web server command
//! - `status` - Status and dashboard commands
//! - `transactions` - Transaction commands (list, add, delete)

pub mod accounts;
pub mod categories;
pub mod core;
pub mod import;
pub mod reminders;
pub mod serve;
pub mod status;
pub mod transactions;

// Re-export command functions for main.rs
pub use accounts::*;
pub use categories::*;
pub use core::*;
pub use import::*;
pub use reminders::*;
pub use serve::*;
pub use status::*;
pub use transactions::*;

/// Truncate a string to a maximum number of characters, adding "..." if
/// truncated. Cuts on a char boundary so accented text is safe.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let keep = max.saturating_sub(3);
    let cut = s
        .char_indices()
        .nth(keep)
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    format!("{}...", &s[..cut])
}
