//! Account command implementations

use anyhow::Result;
use soldi_core::db::Database;
use soldi_core::models::AccountStatus;

pub fn cmd_accounts_list(db: &Database, include_archived: bool) -> Result<()> {
    let user = db.get_or_create_local_user()?;
    let accounts = db.list_accounts(user.id, include_archived)?;

    if accounts.is_empty() {
        println!("No accounts found. Create one with:");
        println!("  soldi accounts add Contanti");
        return Ok(());
    }

    println!();
    println!("📁 Accounts");
    println!("   ─────────────────────────────────────────────");

    for account in &accounts {
        let status_mark = if account.status == AccountStatus::Archived {
            " (archived)"
        } else {
            ""
        };
        println!(
            "   [{}] {:<20} €{:>10.2}{}",
            account.id, account.name, account.balance, status_mark
        );
    }

    let total = db.total_balance(user.id)?;
    println!("   ─────────────────────────────────────────────");
    println!("   {:<25} €{:>10.2}", "Total (active)", total);

    Ok(())
}

pub fn cmd_accounts_add(db: &Database, name: &str, balance: f64) -> Result<()> {
    let user = db.get_or_create_local_user()?;
    let account = db.create_account(user.id, name, balance)?;

    println!(
        "✅ Created account [{}] {} with balance €{:.2}",
        account.id, account.name, account.balance
    );

    Ok(())
}

pub fn cmd_accounts_rename(db: &Database, id: i64, name: &str) -> Result<()> {
    let user = db.get_or_create_local_user()?;
    db.rename_account(user.id, id, name)?;

    println!("✅ Renamed account {} to {}", id, name);

    Ok(())
}

pub fn cmd_accounts_archive(db: &Database, id: i64) -> Result<()> {
    let user = db.get_or_create_local_user()?;
    db.set_account_status(user.id, id, AccountStatus::Archived)?;

    println!("✅ Archived account {}.", id);
    println!("   It is hidden from listings and excluded from the total balance.");
    println!("   Use 'soldi accounts unarchive {}' to restore it.", id);

    Ok(())
}

pub fn cmd_accounts_unarchive(db: &Database, id: i64) -> Result<()> {
    let user = db.get_or_create_local_user()?;
    db.set_account_status(user.id, id, AccountStatus::Active)?;

    println!("✅ Restored account {}.", id);

    Ok(())
}

pub fn cmd_accounts_delete(db: &Database, id: i64, yes: bool) -> Result<()> {
    use std::io::{self, Write};

    let user = db.get_or_create_local_user()?;
    let account = db
        .get_account(user.id, id)?
        .ok_or_else(|| anyhow::anyhow!("Account {} not found", id))?;

    if !yes {
        print!(
            "⚠️  This will delete '{}' and ALL its transactions.\n\nAre you sure? [y/N] ",
            account.name
        );
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    db.delete_account(user.id, id)?;

    println!("✅ Deleted account '{}' and its transactions.", account.name);

    Ok(())
}
