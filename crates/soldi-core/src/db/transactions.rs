//! Transaction recording and listing

use rusqlite::params;

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{NewTransaction, Posting, Transaction, TransactionKind};

const TX_COLUMNS: &str = "id, user_id, date, description, amount, kind, \
                          account_id, to_account_id, category_id, subcategory_id, created_at";

fn map_transaction_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Transaction> {
    let date_str: String = row.get(2)?;
    let kind_str: String = row.get(5)?;
    let created_at_str: String = row.get(10)?;

    let account_id: i64 = row.get(6)?;
    let to_account_id: Option<i64> = row.get(7)?;
    let category_id: Option<i64> = row.get(8)?;
    let subcategory_id: Option<i64> = row.get(9)?;

    let kind: TransactionKind = kind_str
        .parse()
        .unwrap_or(TransactionKind::Expense);
    let posting = match kind {
        TransactionKind::Income => Posting::Income {
            account_id,
            category_id,
            subcategory_id,
        },
        TransactionKind::Expense => Posting::Expense {
            account_id,
            category_id,
            subcategory_id,
        },
        TransactionKind::Transfer => Posting::Transfer {
            from_account_id: account_id,
            to_account_id: to_account_id.unwrap_or(account_id),
        },
    };

    Ok(Transaction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        date: chrono::NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").unwrap_or_default(),
        description: row.get(3)?,
        amount: row.get(4)?,
        posting,
        created_at: parse_datetime(&created_at_str),
    })
}

impl Database {
    /// Record a transaction and apply its effect to the stored balances.
    ///
    /// The balance adjustment happens once here, at write time. Balances
    /// are never rebuilt from the transaction history afterwards.
    pub fn insert_transaction(&self, user_id: i64, tx: &NewTransaction) -> Result<Transaction> {
        self.check_posting_ownership(user_id, &tx.posting)?;

        let conn = self.conn()?;
        conn.execute("BEGIN TRANSACTION", [])?;

        let result = (|| {
            let (account_id, to_account_id, category_id, subcategory_id) = match tx.posting {
                Posting::Income {
                    account_id,
                    category_id,
                    subcategory_id,
                }
                | Posting::Expense {
                    account_id,
                    category_id,
                    subcategory_id,
                } => (account_id, None, category_id, subcategory_id),
                Posting::Transfer {
                    from_account_id,
                    to_account_id,
                } => (from_account_id, Some(to_account_id), None, None),
            };

            conn.execute(
                "INSERT INTO transactions
                 (user_id, date, description, amount, kind,
                  account_id, to_account_id, category_id, subcategory_id)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    user_id,
                    tx.date.to_string(),
                    tx.description,
                    tx.amount,
                    tx.posting.kind().as_str(),
                    account_id,
                    to_account_id,
                    category_id,
                    subcategory_id,
                ],
            )?;
            let id = conn.last_insert_rowid();

            match tx.posting {
                Posting::Income { account_id, .. } => {
                    conn.execute(
                        "UPDATE accounts SET balance = balance + ? WHERE id = ?",
                        params![tx.amount, account_id],
                    )?;
                }
                Posting::Expense { account_id, .. } => {
                    conn.execute(
                        "UPDATE accounts SET balance = balance - ? WHERE id = ?",
                        params![tx.amount, account_id],
                    )?;
                }
                Posting::Transfer {
                    from_account_id,
                    to_account_id,
                } => {
                    conn.execute(
                        "UPDATE accounts SET balance = balance - ? WHERE id = ?",
                        params![tx.amount, from_account_id],
                    )?;
                    conn.execute(
                        "UPDATE accounts SET balance = balance + ? WHERE id = ?",
                        params![tx.amount, to_account_id],
                    )?;
                }
            }

            Ok(id)
        })();

        let id = match result {
            Ok(id) => {
                conn.execute("COMMIT", [])?;
                id
            }
            Err(e) => {
                let _ = conn.execute("ROLLBACK", []);
                return Err(e);
            }
        };
        drop(conn);

        self.get_transaction(user_id, id)?
            .ok_or_else(|| Error::NotFound(format!("Transaction {}", id)))
    }

    /// Delete a transaction, reversing its balance effect
    pub fn delete_transaction(&self, user_id: i64, id: i64) -> Result<()> {
        let tx = self
            .get_transaction(user_id, id)?
            .ok_or_else(|| Error::NotFound(format!("Transaction {}", id)))?;

        let conn = self.conn()?;
        conn.execute("BEGIN TRANSACTION", [])?;

        let result = (|| {
            match tx.posting {
                Posting::Income { account_id, .. } => {
                    conn.execute(
                        "UPDATE accounts SET balance = balance - ? WHERE id = ?",
                        params![tx.amount, account_id],
                    )?;
                }
                Posting::Expense { account_id, .. } => {
                    conn.execute(
                        "UPDATE accounts SET balance = balance + ? WHERE id = ?",
                        params![tx.amount, account_id],
                    )?;
                }
                Posting::Transfer {
                    from_account_id,
                    to_account_id,
                } => {
                    conn.execute(
                        "UPDATE accounts SET balance = balance + ? WHERE id = ?",
                        params![tx.amount, from_account_id],
                    )?;
                    conn.execute(
                        "UPDATE accounts SET balance = balance - ? WHERE id = ?",
                        params![tx.amount, to_account_id],
                    )?;
                }
            }
            conn.execute(
                "DELETE FROM transactions WHERE user_id = ? AND id = ?",
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

    pub fn get_transaction(&self, user_id: i64, id: i64) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        let tx = conn
            .query_row(
                &format!(
                    "SELECT {} FROM transactions WHERE user_id = ? AND id = ?",
                    TX_COLUMNS
                ),
                params![user_id, id],
                map_transaction_row,
            )
            .ok();
        Ok(tx)
    }

    /// List a user's transactions, newest first, optionally scoped to one
    /// account (matching either side of a transfer)
    pub fn list_transactions(
        &self,
        user_id: i64,
        account_id: Option<i64>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let limit = limit.unwrap_or(100);
        let offset = offset.unwrap_or(0);

        let transactions = if let Some(account_id) = account_id {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM transactions
                 WHERE user_id = ? AND (account_id = ? OR to_account_id = ?)
                 ORDER BY date DESC, id DESC
                 LIMIT ? OFFSET ?",
                TX_COLUMNS
            ))?;
            let rows = stmt
                .query_map(
                    params![user_id, account_id, account_id, limit, offset],
                    map_transaction_row,
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows
        } else {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM transactions
                 WHERE user_id = ?
                 ORDER BY date DESC, id DESC
                 LIMIT ? OFFSET ?",
                TX_COLUMNS
            ))?;
            let rows = stmt
                .query_map(params![user_id, limit, offset], map_transaction_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows
        };

        Ok(transactions)
    }

    pub fn count_transactions(&self, user_id: i64) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE user_id = ?",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Every account and category a posting references must belong to the
    /// same user as the transaction
    fn check_posting_ownership(&self, user_id: i64, posting: &Posting) -> Result<()> {
        match *posting {
            Posting::Income {
                account_id,
                category_id,
                subcategory_id,
            }
            | Posting::Expense {
                account_id,
                category_id,
                subcategory_id,
            } => {
                if self.get_account(user_id, account_id)?.is_none() {
                    return Err(Error::NotFound(format!("Account {}", account_id)));
                }
                if let Some(category_id) = category_id {
                    if self.get_category(user_id, category_id)?.is_none() {
                        return Err(Error::NotFound(format!("Category {}", category_id)));
                    }
                    if let Some(subcategory_id) = subcategory_id {
                        if !self.subcategory_belongs_to(category_id, subcategory_id)? {
                            return Err(Error::NotFound(format!(
                                "Subcategory {}",
                                subcategory_id
                            )));
                        }
                    }
                } else if subcategory_id.is_some() {
                    return Err(Error::InvalidData(
                        "Subcategory requires a category".into(),
                    ));
                }
            }
            Posting::Transfer {
                from_account_id,
                to_account_id,
            } => {
                if self.get_account(user_id, from_account_id)?.is_none() {
                    return Err(Error::NotFound(format!("Account {}", from_account_id)));
                }
                if self.get_account(user_id, to_account_id)?.is_none() {
                    return Err(Error::NotFound(format!("Account {}", to_account_id)));
                }
            }
        }
        Ok(())
    }
}
