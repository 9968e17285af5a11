//! Statement import command implementation

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use soldi_core::db::Database;
use soldi_core::import::{self, StatementRow};

use super::truncate;

pub fn cmd_import(db: &Database, file: &Path, account_id: i64, preview: bool) -> Result<()> {
    let user = db.get_or_create_local_user()?;
    let account = db
        .get_account(user.id, account_id)?
        .ok_or_else(|| anyhow::anyhow!("Account {} not found", account_id))?;

    let extension = file
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    println!("📥 Parsing {}...", file.display());

    let rows = match extension.as_str() {
        "xlsx" => {
            let reader = File::open(file)
                .with_context(|| format!("Failed to open file: {}", file.display()))?;
            import::parse_statement(reader)?
        }
        "csv" => {
            let reader = File::open(file)
                .with_context(|| format!("Failed to open file: {}", file.display()))?;
            import::parse_csv(reader)?
        }
        other => anyhow::bail!("Unsupported file type '{}' (expected .xlsx or .csv)", other),
    };

    println!("   Found {} rows", rows.len());

    if preview {
        print_preview(&rows);
        println!();
        println!("   Re-run without --preview to import into '{}'.", account.name);
        return Ok(());
    }

    let outcome = import::commit_rows(db, user.id, account.id, &rows);

    println!("✅ Import into '{}' complete!", account.name);
    println!("   Imported: {}", outcome.imported);
    if outcome.skipped > 0 {
        println!("   Skipped (missing date or amount): {}", outcome.skipped);
    }
    if outcome.failed > 0 {
        println!("   Failed: {}", outcome.failed);
    }

    if let Some(account) = db.get_account(user.id, account.id)? {
        println!("   New balance: €{:.2}", account.balance);
    }

    Ok(())
}

fn print_preview(rows: &[StatementRow]) {
    if rows.is_empty() {
        println!("   (no rows to show)");
        return;
    }

    println!();
    println!("   First rows:");
    for row in import::preview(rows) {
        let date = row
            .date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "??".to_string());
        let amount = row
            .amount
            .map(|a| format!("€{:.2}", a))
            .unwrap_or_else(|| "??".to_string());
        println!(
            "   {} │ {:>12} │ {}",
            date,
            amount,
            truncate(&row.description, 40)
        );
    }
}
