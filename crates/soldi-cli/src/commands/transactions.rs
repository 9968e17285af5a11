//! Transaction command implementations

use anyhow::Result;
use chrono::NaiveDate;
use soldi_core::db::Database;
use soldi_core::models::{NewTransaction, Posting, TransactionKind};

use super::truncate;

pub fn cmd_transactions_list(db: &Database, limit: i64, account_id: Option<i64>) -> Result<()> {
    let user = db.get_or_create_local_user()?;
    let transactions = db.list_transactions(user.id, account_id, Some(limit), None)?;

    if transactions.is_empty() {
        println!("No transactions found. Record one with:");
        println!("  soldi transactions add --kind expense --amount 12.50 --description \"Pranzo\" --account 1");
        return Ok(());
    }

    println!();
    println!("📝 Recent Transactions");
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions {
        let amount_str = match tx.posting {
            Posting::Expense { .. } => format!("\x1b[31m-€{:.2}\x1b[0m", tx.amount),
            Posting::Income { .. } => format!("\x1b[32m+€{:.2}\x1b[0m", tx.amount),
            Posting::Transfer { .. } => format!("\x1b[36m⇄€{:.2}\x1b[0m", tx.amount),
        };

        println!(
            "   [{}] {} │ {:>12} │ {}",
            tx.id,
            tx.date,
            amount_str,
            truncate(&tx.description, 40)
        );
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_transactions_add(
    db: &Database,
    kind: &str,
    amount: f64,
    description: &str,
    date: Option<&str>,
    account_id: i64,
    to_account_id: Option<i64>,
    category_id: Option<i64>,
    subcategory_id: Option<i64>,
) -> Result<()> {
    let user = db.get_or_create_local_user()?;

    let kind: TransactionKind = kind.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let date = match date {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| anyhow::anyhow!("Invalid date '{}' (use YYYY-MM-DD)", s))?,
        None => chrono::Local::now().date_naive(),
    };

    let posting = match kind {
        TransactionKind::Income => Posting::income(account_id, category_id, subcategory_id),
        TransactionKind::Expense => Posting::expense(account_id, category_id, subcategory_id),
        TransactionKind::Transfer => {
            let to = to_account_id
                .ok_or_else(|| anyhow::anyhow!("--to-account is required for transfers"))?;
            Posting::transfer(account_id, to).map_err(|e| anyhow::anyhow!("{}", e))?
        }
    };

    let tx = NewTransaction::new(date, description.to_string(), amount, posting)
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    let stored = db
        .insert_transaction(user.id, &tx)
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    println!(
        "✅ Recorded {} [{}]: {} €{:.2} on {}",
        kind, stored.id, stored.description, stored.amount, stored.date
    );

    match stored.posting {
        Posting::Transfer {
            from_account_id,
            to_account_id,
        } => {
            let from = db.get_account(user.id, from_account_id)?;
            let to = db.get_account(user.id, to_account_id)?;
            if let (Some(from), Some(to)) = (from, to) {
                println!("   {} €{:.2} → {} €{:.2}", from.name, from.balance, to.name, to.balance);
            }
        }
        _ => {
            if let Some(account) = db.get_account(user.id, account_id)? {
                println!("   {} balance: €{:.2}", account.name, account.balance);
            }
        }
    }

    Ok(())
}

pub fn cmd_transactions_delete(db: &Database, id: i64) -> Result<()> {
    let user = db.get_or_create_local_user()?;
    let tx = db
        .get_transaction(user.id, id)?
        .ok_or_else(|| anyhow::anyhow!("Transaction {} not found", id))?;

    db.delete_transaction(user.id, id)?;

    println!("✅ Deleted transaction {}:", id);
    println!(
        "   {} │ €{:.2} │ {}",
        tx.date,
        tx.amount,
        truncate(&tx.description, 40)
    );
    println!();
    println!("   Account balances were adjusted to reverse its effect.");

    Ok(())
}
