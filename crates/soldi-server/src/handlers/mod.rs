//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod accounts;
pub mod audit;
pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod import;
pub mod reminders;
pub mod transactions;

// Re-export all handlers for use in router
pub use accounts::*;
pub use audit::*;
pub use auth::*;
pub use categories::*;
pub use dashboard::*;
pub use import::*;
pub use reminders::*;
pub use transactions::*;
