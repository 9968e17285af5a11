//! User and session operations

use chrono::{DateTime, Utc};
use rusqlite::params;

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Session, User};

/// Email used for unauthenticated local access (CLI, --no-auth server)
pub const LOCAL_USER_EMAIL: &str = "local@soldi";

fn map_user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let created_at_str: String = row.get(3)?;
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        created_at: parse_datetime(&created_at_str),
    })
}

impl Database {
    /// Create a user with an already-hashed password
    pub fn create_user(&self, email: &str, password_hash: &str) -> Result<User> {
        let conn = self.conn()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM users WHERE email = ?",
                params![email],
                |row| row.get(0),
            )
            .ok();
        if existing.is_some() {
            return Err(Error::InvalidData(format!(
                "Email already registered: {}",
                email
            )));
        }

        conn.execute(
            "INSERT INTO users (email, password_hash) VALUES (?, ?)",
            params![email, password_hash],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);

        self.get_user(id)?
            .ok_or_else(|| Error::NotFound(format!("User {}", id)))
    }

    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                "SELECT id, email, password_hash, created_at FROM users WHERE id = ?",
                params![id],
                map_user_row,
            )
            .ok();
        Ok(user)
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                "SELECT id, email, password_hash, created_at FROM users WHERE email = ?",
                params![email],
                map_user_row,
            )
            .ok();
        Ok(user)
    }

    /// Get or create the local user for unauthenticated access.
    /// The local user has no usable password, it can only be reached
    /// from contexts that bypass login.
    pub fn get_or_create_local_user(&self) -> Result<User> {
        if let Some(user) = self.get_user_by_email(LOCAL_USER_EMAIL)? {
            return Ok(user);
        }
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO users (email, password_hash) VALUES (?, '')",
            params![LOCAL_USER_EMAIL],
        )?;
        drop(conn);
        self.get_user_by_email(LOCAL_USER_EMAIL)?
            .ok_or_else(|| Error::NotFound("local user".to_string()))
    }

    /// Store a session for a user. Only the token hash is persisted.
    pub fn create_session(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO sessions (user_id, token_hash, expires_at) VALUES (?, ?, ?)",
            params![
                user_id,
                token_hash,
                expires_at.format("%Y-%m-%d %H:%M:%S").to_string()
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Resolve a token hash to its session, if it exists and has not expired
    pub fn get_session(&self, token_hash: &str) -> Result<Option<Session>> {
        let conn = self.conn()?;
        let session = conn
            .query_row(
                "SELECT id, user_id, token_hash, expires_at, created_at
                 FROM sessions
                 WHERE token_hash = ? AND expires_at > datetime('now')",
                params![token_hash],
                |row| {
                    let expires_at_str: String = row.get(3)?;
                    let created_at_str: String = row.get(4)?;
                    Ok(Session {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        token_hash: row.get(2)?,
                        expires_at: parse_datetime(&expires_at_str),
                        created_at: parse_datetime(&created_at_str),
                    })
                },
            )
            .ok();
        Ok(session)
    }

    /// Resolve a token hash to the authenticated user
    pub fn get_session_user(&self, token_hash: &str) -> Result<Option<User>> {
        match self.get_session(token_hash)? {
            Some(session) => self.get_user(session.user_id),
            None => Ok(None),
        }
    }

    /// Delete a session (logout). Unknown tokens are a no-op.
    pub fn delete_session(&self, token_hash: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "DELETE FROM sessions WHERE token_hash = ?",
            params![token_hash],
        )?;
        Ok(())
    }

    /// Remove expired sessions, returns how many were purged
    pub fn purge_expired_sessions(&self) -> Result<usize> {
        let conn = self.conn()?;
        let purged = conn.execute(
            "DELETE FROM sessions WHERE expires_at <= datetime('now')",
            [],
        )?;
        Ok(purged)
    }
}
