//! Reminder command implementations

use anyhow::Result;
use chrono::NaiveDate;
use soldi_core::db::Database;
use soldi_core::models::{NewReminder, ReminderKind};

fn kind_icon(kind: ReminderKind) -> &'static str {
    match kind {
        ReminderKind::Birthday => "🎂",
        ReminderKind::NameDay => "📜",
        ReminderKind::Anniversary => "💍",
    }
}

pub fn cmd_reminders_list(db: &Database) -> Result<()> {
    let user = db.get_or_create_local_user()?;
    let reminders = db.list_reminders(user.id)?;

    if reminders.is_empty() {
        println!("No reminders found. Create one with:");
        println!("  soldi reminders add Anna --date 1990-07-26 --kind birthday");
        return Ok(());
    }

    println!();
    println!("📅 Reminders (calendar order)");
    println!("   ─────────────────────────────────────");

    for reminder in reminders {
        let (month, day) = reminder.month_day();
        println!(
            "   [{}] {:02}/{:02} {} {} ({})",
            reminder.id,
            day,
            month,
            kind_icon(reminder.kind),
            reminder.name,
            reminder.kind
        );
    }

    Ok(())
}

pub fn cmd_reminders_upcoming(db: &Database, limit: usize) -> Result<()> {
    let user = db.get_or_create_local_user()?;
    let reminders = db.upcoming_reminders(user.id, limit)?;

    if reminders.is_empty() {
        println!("No upcoming reminders.");
        return Ok(());
    }

    println!();
    println!("📅 Next up");
    println!("   ─────────────────────────────────────");

    for reminder in reminders {
        let (month, day) = reminder.month_day();
        println!(
            "   {:02}/{:02} {} {}",
            day,
            month,
            kind_icon(reminder.kind),
            reminder.name
        );
    }

    Ok(())
}

pub fn cmd_reminders_add(db: &Database, name: &str, date: &str, kind: &str) -> Result<()> {
    let user = db.get_or_create_local_user()?;

    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("Invalid date '{}' (use YYYY-MM-DD)", date))?;
    let kind: ReminderKind = kind.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let reminder = db.create_reminder(
        user.id,
        &NewReminder {
            name: name.to_string(),
            date,
            kind,
        },
    )?;

    println!(
        "✅ Created {} reminder [{}] {} on {}",
        reminder.kind, reminder.id, reminder.name, reminder.date
    );

    Ok(())
}

pub fn cmd_reminders_delete(db: &Database, id: i64) -> Result<()> {
    let user = db.get_or_create_local_user()?;
    db.delete_reminder(user.id, id)?;

    println!("✅ Deleted reminder {}.", id);

    Ok(())
}
