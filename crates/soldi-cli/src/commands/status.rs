//! Status and dashboard command implementations

use std::path::Path;

use anyhow::Result;

use super::open_db;

pub fn cmd_status(db_path: &Path, no_encrypt: bool) -> Result<()> {
    use soldi_core::db::DB_KEY_ENV;
    use std::fs;

    println!();
    println!("📊 Soldi Status");
    println!("   ─────────────────────────────────────────────────────────────");

    // Database path
    println!("   Database: {}", db_path.display());

    // Check if database file exists and get size
    if db_path.exists() {
        if let Ok(metadata) = fs::metadata(db_path) {
            let size_kb = metadata.len() as f64 / 1024.0;
            if size_kb < 1024.0 {
                println!("   Size: {:.1} KB", size_kb);
            } else {
                println!("   Size: {:.1} MB", size_kb / 1024.0);
            }
        }
    } else {
        println!("   Size: (database not initialized)");
    }

    let has_key = std::env::var(DB_KEY_ENV).is_ok();

    // Try to open the database and show stats
    if db_path.exists() {
        match open_db(db_path, no_encrypt) {
            Ok(db) => {
                // Encryption status as reported by the live connection
                match db.is_encrypted() {
                    Ok(true) => println!("   🔒 Encryption: ENABLED ({}=***)", DB_KEY_ENV),
                    Ok(false) => println!("   ⚠️  Encryption: DISABLED"),
                    Err(e) => println!("   ❌ Encryption: unknown ({})", e),
                }
                if let Ok(user) = db.get_or_create_local_user() {
                    let accounts = db.list_accounts(user.id, true).unwrap_or_default();
                    let transactions = db.count_transactions(user.id).unwrap_or(0);
                    let reminders = db.list_reminders(user.id).unwrap_or_default();
                    println!();
                    println!("   Accounts: {}", accounts.len());
                    println!("   Transactions: {}", transactions);
                    println!("   Reminders: {}", reminders.len());
                }
            }
            Err(e) => {
                println!();
                println!("   ❌ Error opening database: {}", e);
                if !no_encrypt && !has_key {
                    println!("      Set {} or use --no-encrypt", DB_KEY_ENV);
                } else if has_key {
                    println!("      (Check if {} is correct)", DB_KEY_ENV);
                }
            }
        }
    } else if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else if has_key {
        println!("   🔒 Encryption: ENABLED ({}=***)", DB_KEY_ENV);
    } else {
        println!("   ❌ Encryption: REQUIRED but {} not set", DB_KEY_ENV);
    }

    println!();
    Ok(())
}

pub fn cmd_dashboard(db_path: &Path, no_encrypt: bool) -> Result<()> {
    let db = open_db(db_path, no_encrypt)?;
    let user = db.get_or_create_local_user()?;

    let total_balance = db.total_balance(user.id)?;
    let accounts = db.list_accounts(user.id, false)?;
    let transactions = db.count_transactions(user.id)?;
    let upcoming = db.upcoming_reminders(user.id, 5)?;

    println!();
    println!("╭─────────────────────────────────────────╮");
    println!("│           💰 Soldi Dashboard            │");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Total balance:   €{:.2}", total_balance);
    println!("  Accounts:        {}", accounts.len());
    println!("  Transactions:    {}", transactions);
    println!();

    if upcoming.is_empty() {
        println!("  📅 No upcoming reminders.");
    } else {
        println!("  📅 Upcoming reminders:");
        for reminder in upcoming {
            let (month, day) = reminder.month_day();
            println!(
                "     {:02}/{:02} {} ({})",
                day, month, reminder.name, reminder.kind
            );
        }
    }
    println!();

    Ok(())
}
