//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Soldi - Track accounts, spending, and recurring dates
#[derive(Parser)]
#[command(name = "soldi")]
#[command(about = "Self-hosted personal finance tracker", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "soldi.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set SOLDI_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Register a user account for web access
    Register {
        /// Email address to register
        #[arg(short, long)]
        email: String,

        /// Password (prompted interactively if omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        ///
        /// WARNING: Do not use this flag when exposing the server to a network.
        /// By default, the server requires a session token or API key.
        #[arg(long)]
        no_auth: bool,

        /// Directory containing static files to serve (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Show dashboard summary
    Dashboard,

    /// Show database status (encryption, size, etc.)
    Status,

    /// Manage accounts (list, add, rename, archive, delete)
    Accounts {
        #[command(subcommand)]
        action: Option<AccountsAction>,
    },

    /// Manage transactions (list, add, delete)
    Transactions {
        #[command(subcommand)]
        action: Option<TransactionsAction>,
    },

    /// Manage expense categories (list, add, delete)
    Categories {
        #[command(subcommand)]
        action: Option<CategoriesAction>,
    },

    /// Manage recurring date reminders (list, add, delete)
    Reminders {
        #[command(subcommand)]
        action: Option<RemindersAction>,
    },

    /// Import a bank statement (xlsx) or CSV export into an account
    Import {
        /// Statement file to import (.xlsx or .csv)
        #[arg(short, long)]
        file: PathBuf,

        /// Account ID to import into
        #[arg(short, long)]
        account: i64,

        /// Show the first rows without committing anything
        #[arg(long)]
        preview: bool,
    },
}

#[derive(Subcommand)]
pub enum AccountsAction {
    /// List accounts
    List {
        /// Include archived accounts
        #[arg(long)]
        all: bool,
    },

    /// Add a new account
    Add {
        /// Account name
        name: String,

        /// Starting balance
        #[arg(short, long, default_value = "0")]
        balance: f64,
    },

    /// Rename an account
    Rename {
        /// Account ID
        id: i64,
        /// New name
        name: String,
    },

    /// Archive an account (hidden, history preserved)
    Archive {
        /// Account ID
        id: i64,
    },

    /// Restore an archived account
    Unarchive {
        /// Account ID
        id: i64,
    },

    /// Delete an account and all its transactions
    Delete {
        /// Account ID
        id: i64,

        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum TransactionsAction {
    /// List recent transactions
    List {
        /// Maximum number to show
        #[arg(short, long, default_value = "20")]
        limit: i64,

        /// Only show transactions touching this account
        #[arg(short, long)]
        account: Option<i64>,
    },

    /// Record a transaction
    Add {
        /// Transaction kind: income, expense, transfer
        #[arg(short, long)]
        kind: String,

        /// Amount (positive)
        #[arg(short, long)]
        amount: f64,

        /// Description
        #[arg(short, long)]
        description: String,

        /// Date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Account ID (income/expense) or source account (transfer)
        #[arg(long)]
        account: i64,

        /// Destination account ID (transfers only)
        #[arg(long)]
        to_account: Option<i64>,

        /// Category ID (income/expense only)
        #[arg(long)]
        category: Option<i64>,

        /// Subcategory ID (requires --category)
        #[arg(long)]
        subcategory: Option<i64>,
    },

    /// Delete a transaction, reversing its balance effect
    Delete {
        /// Transaction ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum CategoriesAction {
    /// List categories with their subcategories
    List,

    /// Add a category
    Add {
        /// Category name
        name: String,

        /// Subcategories to create alongside (repeatable)
        #[arg(short, long = "sub")]
        subcategories: Vec<String>,
    },

    /// Delete a category and its subcategories
    Delete {
        /// Category ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum RemindersAction {
    /// List reminders in calendar order
    List,

    /// Show the next upcoming reminders
    Upcoming {
        /// Maximum number to show
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },

    /// Add a reminder
    Add {
        /// Person or event name
        name: String,

        /// Date (YYYY-MM-DD, the year is kept for anniversaries)
        #[arg(long)]
        date: String,

        /// Reminder kind: birthday, nameday, anniversary
        #[arg(short, long)]
        kind: String,
    },

    /// Delete a reminder
    Delete {
        /// Reminder ID
        id: i64,
    },
}
