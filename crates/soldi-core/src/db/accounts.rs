//! Account operations

use rusqlite::params;

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Account, AccountStatus};

/// Accounts created for a user who has none yet
pub const DEFAULT_ACCOUNT_NAMES: [&str; 3] = ["Contanti", "Bancoposta", "Postepay"];

fn map_account_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Account> {
    let status_str: String = row.get(4)?;
    let created_at_str: String = row.get(5)?;
    Ok(Account {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        balance: row.get(3)?,
        status: status_str.parse().unwrap_or(AccountStatus::Active),
        created_at: parse_datetime(&created_at_str),
    })
}

const ACCOUNT_COLUMNS: &str = "id, user_id, name, balance, status, created_at";

impl Database {
    /// Create an account with a starting balance
    pub fn create_account(&self, user_id: i64, name: &str, balance: f64) -> Result<Account> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidData("Account name cannot be empty".into()));
        }

        let conn = self.conn()?;
        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM accounts WHERE user_id = ? AND name = ?",
                params![user_id, name],
                |row| row.get(0),
            )
            .ok();
        if existing.is_some() {
            return Err(Error::InvalidData(format!(
                "An account named '{}' already exists",
                name
            )));
        }

        conn.execute(
            "INSERT INTO accounts (user_id, name, balance) VALUES (?, ?, ?)",
            params![user_id, name, balance],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);

        self.get_account(user_id, id)?
            .ok_or_else(|| Error::NotFound(format!("Account {}", id)))
    }

    /// List a user's accounts, optionally including archived ones
    pub fn list_accounts(&self, user_id: i64, include_archived: bool) -> Result<Vec<Account>> {
        let conn = self.conn()?;
        let sql = if include_archived {
            format!(
                "SELECT {} FROM accounts WHERE user_id = ? ORDER BY name",
                ACCOUNT_COLUMNS
            )
        } else {
            format!(
                "SELECT {} FROM accounts WHERE user_id = ? AND status = 'active' ORDER BY name",
                ACCOUNT_COLUMNS
            )
        };
        let mut stmt = conn.prepare(&sql)?;

        let accounts = stmt
            .query_map(params![user_id], map_account_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(accounts)
    }

    /// Get one of a user's accounts by ID
    pub fn get_account(&self, user_id: i64, id: i64) -> Result<Option<Account>> {
        let conn = self.conn()?;
        let account = conn
            .query_row(
                &format!(
                    "SELECT {} FROM accounts WHERE user_id = ? AND id = ?",
                    ACCOUNT_COLUMNS
                ),
                params![user_id, id],
                map_account_row,
            )
            .ok();
        Ok(account)
    }

    /// Rename an account
    pub fn rename_account(&self, user_id: i64, id: i64, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidData("Account name cannot be empty".into()));
        }
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE accounts SET name = ? WHERE user_id = ? AND id = ?",
            params![name, user_id, id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("Account {}", id)));
        }
        Ok(())
    }

    /// Full update of an account's editable fields. The balance is a
    /// manually maintained figure, so overwriting it here is allowed.
    pub fn update_account(&self, user_id: i64, id: i64, name: &str, balance: f64) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidData("Account name cannot be empty".into()));
        }
        if !balance.is_finite() {
            return Err(Error::InvalidData("Account balance must be a number".into()));
        }
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE accounts SET name = ?, balance = ? WHERE user_id = ? AND id = ?",
            params![name, balance, user_id, id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("Account {}", id)));
        }
        Ok(())
    }

    /// Set an account's status (archive or restore)
    pub fn set_account_status(&self, user_id: i64, id: i64, status: AccountStatus) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE accounts SET status = ? WHERE user_id = ? AND id = ?",
            params![status.as_str(), user_id, id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("Account {}", id)));
        }
        Ok(())
    }

    /// Delete an account and every transaction touching it
    pub fn delete_account(&self, user_id: i64, id: i64) -> Result<()> {
        let conn = self.conn()?;

        if self.get_account(user_id, id)?.is_none() {
            return Err(Error::NotFound(format!("Account {}", id)));
        }

        // Use explicit transaction for atomicity
        conn.execute("BEGIN TRANSACTION", [])?;

        let result = (|| {
            conn.execute(
                "DELETE FROM transactions
                 WHERE user_id = ? AND (account_id = ? OR to_account_id = ?)",
                params![user_id, id, id],
            )?;
            conn.execute(
                "DELETE FROM accounts WHERE user_id = ? AND id = ?",
                params![user_id, id],
            )?;
            Ok(())
        })();

        match result {
            Ok(()) => {
                conn.execute("COMMIT", [])?;
                Ok(())
            }
            Err(e) => {
                let _ = conn.execute("ROLLBACK", []);
                Err(e)
            }
        }
    }

    /// Sum of balances across a user's active accounts
    pub fn total_balance(&self, user_id: i64) -> Result<f64> {
        let conn = self.conn()?;
        let total: f64 = conn.query_row(
            "SELECT COALESCE(SUM(balance), 0) FROM accounts
             WHERE user_id = ? AND status = 'active'",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    /// Seed the default accounts for a user who has none.
    /// Returns the names of accounts created, empty if the user
    /// already had any.
    pub fn seed_default_accounts(&self, user_id: i64) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM accounts WHERE user_id = ?",
            params![user_id],
            |row| row.get(0),
        )?;
        if count > 0 {
            return Ok(Vec::new());
        }

        let mut created = Vec::new();
        for name in DEFAULT_ACCOUNT_NAMES {
            conn.execute(
                "INSERT INTO accounts (user_id, name, balance) VALUES (?, ?, 0)",
                params![user_id, name],
            )?;
            created.push(name.to_string());
        }
        Ok(created)
    }
}
