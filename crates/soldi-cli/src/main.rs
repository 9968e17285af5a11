//! Soldi CLI - Personal finance tracker
//!
//! Usage:
//!   soldi init                   Initialize database
//!   soldi accounts add Contanti  Create an account
//!   soldi import --file e.xlsx --account 1   Import a bank statement
//!   soldi serve --port 3000      Start web server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Register { email, password } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_register(&db, &email, password.as_deref())
        }
        Commands::Serve {
            port,
            host,
            no_auth,
            static_dir,
        } => {
            commands::cmd_serve(
                &cli.db,
                &host,
                port,
                no_auth,
                cli.no_encrypt,
                static_dir.as_deref(),
            )
            .await
        }
        Commands::Dashboard => commands::cmd_dashboard(&cli.db, cli.no_encrypt),
        Commands::Status => commands::cmd_status(&cli.db, cli.no_encrypt),
        Commands::Accounts { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_accounts_list(&db, false),
                Some(AccountsAction::List { all }) => commands::cmd_accounts_list(&db, all),
                Some(AccountsAction::Add { name, balance }) => {
                    commands::cmd_accounts_add(&db, &name, balance)
                }
                Some(AccountsAction::Rename { id, name }) => {
                    commands::cmd_accounts_rename(&db, id, &name)
                }
                Some(AccountsAction::Archive { id }) => commands::cmd_accounts_archive(&db, id),
                Some(AccountsAction::Unarchive { id }) => {
                    commands::cmd_accounts_unarchive(&db, id)
                }
                Some(AccountsAction::Delete { id, yes }) => {
                    commands::cmd_accounts_delete(&db, id, yes)
                }
            }
        }
        Commands::Transactions { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_transactions_list(&db, 20, None),
                Some(TransactionsAction::List { limit, account }) => {
                    commands::cmd_transactions_list(&db, limit, account)
                }
                Some(TransactionsAction::Add {
                    kind,
                    amount,
                    description,
                    date,
                    account,
                    to_account,
                    category,
                    subcategory,
                }) => commands::cmd_transactions_add(
                    &db,
                    &kind,
                    amount,
                    &description,
                    date.as_deref(),
                    account,
                    to_account,
                    category,
                    subcategory,
                ),
                Some(TransactionsAction::Delete { id }) => {
                    commands::cmd_transactions_delete(&db, id)
                }
            }
        }
        Commands::Categories { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(CategoriesAction::List) => commands::cmd_categories_list(&db),
                Some(CategoriesAction::Add {
                    name,
                    subcategories,
                }) => commands::cmd_categories_add(&db, &name, &subcategories),
                Some(CategoriesAction::Delete { id }) => commands::cmd_categories_delete(&db, id),
            }
        }
        Commands::Reminders { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(RemindersAction::List) => commands::cmd_reminders_list(&db),
                Some(RemindersAction::Upcoming { limit }) => {
                    commands::cmd_reminders_upcoming(&db, limit)
                }
                Some(RemindersAction::Add { name, date, kind }) => {
                    commands::cmd_reminders_add(&db, &name, &date, &kind)
                }
                Some(RemindersAction::Delete { id }) => commands::cmd_reminders_delete(&db, id),
            }
        }
        Commands::Import {
            file,
            account,
            preview,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_import(&db, &file, account, preview)
        }
    }
}
