//! Soldi Core Library
//!
//! Shared functionality for the Soldi personal finance tracker:
//! - Database access and migrations (SQLite, optionally SQLCipher-encrypted)
//! - Accounts, transactions, categories, and recurring date reminders
//! - Bank statement (xlsx) and CSV import
//! - Password hashing and session token handling

pub mod auth;
pub mod db;
pub mod error;
pub mod import;
pub mod models;

pub use db::{AuditEntry, Database};
pub use error::{Error, Result};
pub use import::{ImportOutcome, StatementRow};
pub use models::{
    Account, AccountStatus, Category, DashboardStats, NewAccount, NewReminder, NewTransaction,
    Posting, Reminder, ReminderKind, Session, Subcategory, Transaction, TransactionKind, User,
};
