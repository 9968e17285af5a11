//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `cmd_init` - Initialize the database
//! - `cmd_register` - Register a user for web access

use std::path::Path;

use anyhow::{Context, Result};
use soldi_core::{auth, db::Database};

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path must be valid UTF-8")?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path, no_encrypt)?;

    // Seed default accounts for the local user
    let user = db
        .get_or_create_local_user()
        .context("Failed to create local user")?;
    let created = db
        .seed_default_accounts(user.id)
        .context("Failed to seed default accounts")?;
    if !created.is_empty() {
        println!("   Seeded accounts: {}", created.join(", "));
    }

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Record a transaction: soldi transactions add --kind expense --amount 12.50 --description \"Pranzo\" --account 1");
    println!("  2. Import a statement: soldi import --file estratto.xlsx --account 2");
    println!("  3. Start web UI: soldi serve");

    Ok(())
}

pub fn cmd_register(db: &Database, email: &str, password: Option<&str>) -> Result<()> {
    use std::io::{self, Write};

    let email = email.trim().to_lowercase();
    if !email.contains('@') {
        anyhow::bail!("Invalid email address: {}", email);
    }

    let password = match password {
        Some(p) => p.to_string(),
        None => {
            print!("Password (min {} chars): ", auth::MIN_PASSWORD_LEN);
            io::stdout().flush()?;
            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            input.trim_end_matches(['\r', '\n']).to_string()
        }
    };

    let hash = auth::hash_password(&password).map_err(|e| anyhow::anyhow!("{}", e))?;
    let user = db
        .create_user(&email, &hash)
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    let accounts = db.seed_default_accounts(user.id)?;

    println!("✅ Registered {}", user.email);
    if !accounts.is_empty() {
        println!("   Created accounts: {}", accounts.join(", "));
    }
    println!();
    println!("   Log in through the web UI to get a session token.");

    Ok(())
}
