//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};

use super::open_db;

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    no_auth: bool,
    no_encrypt: bool,
    static_dir: Option<&Path>,
) -> Result<()> {
    println!("🚀 Starting Soldi web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }

    // Parse API keys from environment (comma-separated)
    let api_keys: Vec<String> = std::env::var("SOLDI_API_KEYS")
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if no_auth {
        println!();
        println!("   ⚠️  Authentication DISABLED - do not expose to network!");
    } else {
        println!("   🔒 Authentication: session tokens (register via the web UI)");
        if !api_keys.is_empty() {
            println!(
                "   🔑 API keys: {} configured (SOLDI_API_KEYS)",
                api_keys.len()
            );
        }
    }
    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path, no_encrypt)?;

    // Ensure the local user and default accounts exist (idempotent)
    if no_auth {
        let user = db
            .get_or_create_local_user()
            .context("Failed to create local user")?;
        db.seed_default_accounts(user.id)
            .context("Failed to seed default accounts")?;
    }

    let config = soldi_server::ServerConfig {
        require_auth: !no_auth,
        allowed_origins: vec![],
        api_keys,
    };

    let static_dir_str = match &static_dir {
        Some(p) => Some(
            p.to_str()
                .context("Static directory path must be valid UTF-8")?,
        ),
        None => None,
    };
    soldi_server::serve_with_config(db, host, port, static_dir_str, config).await?;

    Ok(())
}
