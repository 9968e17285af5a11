//! Recurring date reminders (birthdays, name days, anniversaries)

use rusqlite::params;

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{NewReminder, Reminder, ReminderKind};

fn map_reminder_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Reminder> {
    let date_str: String = row.get(3)?;
    let kind_str: String = row.get(4)?;
    let created_at_str: String = row.get(5)?;
    Ok(Reminder {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        date: chrono::NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").unwrap_or_default(),
        kind: kind_str.parse().unwrap_or(ReminderKind::Birthday),
        created_at: parse_datetime(&created_at_str),
    })
}

impl Database {
    pub fn create_reminder(&self, user_id: i64, reminder: &NewReminder) -> Result<Reminder> {
        let name = reminder.name.trim();
        if name.is_empty() {
            return Err(Error::InvalidData("Reminder name cannot be empty".into()));
        }

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO reminders (user_id, name, date, kind) VALUES (?, ?, ?, ?)",
            params![
                user_id,
                name,
                reminder.date.to_string(),
                reminder.kind.as_str()
            ],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);

        self.get_reminder(user_id, id)?
            .ok_or_else(|| Error::NotFound(format!("Reminder {}", id)))
    }

    /// List reminders in calendar order: by month and day, the year is
    /// ignored so a 1990 birthday in March sorts before a 2001 one in May
    pub fn list_reminders(&self, user_id: i64) -> Result<Vec<Reminder>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, name, date, kind, created_at FROM reminders
             WHERE user_id = ?
             ORDER BY strftime('%m-%d', date), name",
        )?;
        let reminders = stmt
            .query_map(params![user_id], map_reminder_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(reminders)
    }

    pub fn get_reminder(&self, user_id: i64, id: i64) -> Result<Option<Reminder>> {
        let conn = self.conn()?;
        let reminder = conn
            .query_row(
                "SELECT id, user_id, name, date, kind, created_at FROM reminders
                 WHERE user_id = ? AND id = ?",
                params![user_id, id],
                map_reminder_row,
            )
            .ok();
        Ok(reminder)
    }

    pub fn delete_reminder(&self, user_id: i64, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM reminders WHERE user_id = ? AND id = ?",
            params![user_id, id],
        )?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("Reminder {}", id)));
        }
        Ok(())
    }

    /// The next `limit` reminders from today onwards in calendar order,
    /// wrapping around the year end
    pub fn upcoming_reminders(&self, user_id: i64, limit: usize) -> Result<Vec<Reminder>> {
        use chrono::Datelike;

        let all = self.list_reminders(user_id)?;
        if all.is_empty() {
            return Ok(Vec::new());
        }

        let today = chrono::Utc::now().date_naive();
        let today_key = (today.month(), today.day());

        let mut upcoming: Vec<Reminder> = all
            .iter()
            .filter(|r| r.month_day() >= today_key)
            .cloned()
            .collect();
        // Wrap to the start of next year
        upcoming.extend(all.iter().filter(|r| r.month_day() < today_key).cloned());
        upcoming.truncate(limit);

        Ok(upcoming)
    }
}
