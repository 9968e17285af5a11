//! Database tests

use super::*;
use crate::models::*;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn test_user(db: &Database) -> User {
        db.create_user("tester@example.com", "not-a-real-hash")
            .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_in_memory_db() {
        let db = Database::in_memory().unwrap();
        let user = test_user(&db);
        let accounts = db.list_accounts(user.id, true).unwrap();
        assert!(accounts.is_empty());
    }

    #[test]
    fn test_unencrypted_database_reports_not_encrypted() {
        let db = Database::in_memory().unwrap();
        assert!(!db.is_encrypted().unwrap());
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let db = Database::in_memory().unwrap();
        test_user(&db);
        assert!(db.create_user("tester@example.com", "other").is_err());
    }

    #[test]
    fn test_sessions() {
        let db = Database::in_memory().unwrap();
        let user = test_user(&db);

        let expires = chrono::Utc::now() + chrono::Duration::days(30);
        db.create_session(user.id, "hash-a", expires).unwrap();

        let found = db.get_session_user("hash-a").unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert!(db.get_session_user("hash-b").unwrap().is_none());

        db.delete_session("hash-a").unwrap();
        assert!(db.get_session_user("hash-a").unwrap().is_none());
    }

    #[test]
    fn test_expired_sessions_rejected_and_purged() {
        let db = Database::in_memory().unwrap();
        let user = test_user(&db);

        let expired = chrono::Utc::now() - chrono::Duration::hours(1);
        db.create_session(user.id, "stale", expired).unwrap();
        assert!(db.get_session_user("stale").unwrap().is_none());
        assert_eq!(db.purge_expired_sessions().unwrap(), 1);
    }

    #[test]
    fn test_account_crud() {
        let db = Database::in_memory().unwrap();
        let user = test_user(&db);

        let account = db.create_account(user.id, "Bancoposta", 100.0).unwrap();
        assert!(account.id > 0);
        assert_eq!(account.status, AccountStatus::Active);

        // Same name for the same user is rejected
        assert!(db.create_account(user.id, "Bancoposta", 0.0).is_err());
        assert!(db.create_account(user.id, "  ", 0.0).is_err());

        db.rename_account(user.id, account.id, "Conto BancoPosta")
            .unwrap();
        let renamed = db.get_account(user.id, account.id).unwrap().unwrap();
        assert_eq!(renamed.name, "Conto BancoPosta");

        db.update_account(user.id, account.id, "BancoPosta", 250.0)
            .unwrap();
        let updated = db.get_account(user.id, account.id).unwrap().unwrap();
        assert_eq!(updated.name, "BancoPosta");
        assert_eq!(updated.balance, 250.0);
        assert!(db
            .update_account(user.id, account.id, "BancoPosta", f64::NAN)
            .is_err());

        db.delete_account(user.id, account.id).unwrap();
        assert!(db.get_account(user.id, account.id).unwrap().is_none());
    }

    #[test]
    fn test_accounts_are_scoped_per_user() {
        let db = Database::in_memory().unwrap();
        let alice = db.create_user("alice@example.com", "x").unwrap();
        let bob = db.create_user("bob@example.com", "x").unwrap();

        let account = db.create_account(alice.id, "Contanti", 50.0).unwrap();
        // Same name is fine for a different user
        db.create_account(bob.id, "Contanti", 0.0).unwrap();

        assert!(db.get_account(bob.id, account.id).unwrap().is_none());
        assert_eq!(db.list_accounts(alice.id, true).unwrap().len(), 1);
    }

    #[test]
    fn test_archive_hides_account_from_listing_and_totals() {
        let db = Database::in_memory().unwrap();
        let user = test_user(&db);

        let a = db.create_account(user.id, "Contanti", 30.0).unwrap();
        db.create_account(user.id, "Postepay", 70.0).unwrap();

        db.set_account_status(user.id, a.id, AccountStatus::Archived)
            .unwrap();
        assert_eq!(db.list_accounts(user.id, false).unwrap().len(), 1);
        assert_eq!(db.list_accounts(user.id, true).unwrap().len(), 2);
        assert!((db.total_balance(user.id).unwrap() - 70.0).abs() < 1e-9);

        db.set_account_status(user.id, a.id, AccountStatus::Active)
            .unwrap();
        assert!((db.total_balance(user.id).unwrap() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_seed_default_accounts_only_when_empty() {
        let db = Database::in_memory().unwrap();
        let user = test_user(&db);

        let created = db.seed_default_accounts(user.id).unwrap();
        assert_eq!(created, vec!["Contanti", "Bancoposta", "Postepay"]);

        // Second call is a no-op
        assert!(db.seed_default_accounts(user.id).unwrap().is_empty());
        assert_eq!(db.list_accounts(user.id, true).unwrap().len(), 3);
    }

    #[test]
    fn test_income_and_expense_adjust_balance() {
        let db = Database::in_memory().unwrap();
        let user = test_user(&db);
        let account = db.create_account(user.id, "Bancoposta", 100.0).unwrap();

        let income = NewTransaction::new(
            date(2024, 3, 5),
            "Salary".into(),
            1500.0,
            Posting::income(account.id, None, None),
        )
        .unwrap();
        db.insert_transaction(user.id, &income).unwrap();

        let expense = NewTransaction::new(
            date(2024, 3, 6),
            "Groceries".into(),
            60.0,
            Posting::expense(account.id, None, None),
        )
        .unwrap();
        db.insert_transaction(user.id, &expense).unwrap();

        let account = db.get_account(user.id, account.id).unwrap().unwrap();
        assert!((account.balance - 1540.0).abs() < 1e-9);
    }

    #[test]
    fn test_transfer_moves_between_accounts() {
        let db = Database::in_memory().unwrap();
        let user = test_user(&db);
        let from = db.create_account(user.id, "Bancoposta", 200.0).unwrap();
        let to = db.create_account(user.id, "Postepay", 10.0).unwrap();

        let transfer = NewTransaction::new(
            date(2024, 3, 7),
            "Top up".into(),
            50.0,
            Posting::transfer(from.id, to.id).unwrap(),
        )
        .unwrap();
        let stored = db.insert_transaction(user.id, &transfer).unwrap();
        assert_eq!(stored.posting.kind(), TransactionKind::Transfer);

        let from = db.get_account(user.id, from.id).unwrap().unwrap();
        let to = db.get_account(user.id, to.id).unwrap().unwrap();
        assert!((from.balance - 150.0).abs() < 1e-9);
        assert!((to.balance - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_transfer_to_same_account_rejected() {
        assert!(Posting::transfer(1, 1).is_err());
    }

    #[test]
    fn test_zero_amount_rejected() {
        assert!(NewTransaction::new(
            date(2024, 1, 1),
            "x".into(),
            0.0,
            Posting::income(1, None, None)
        )
        .is_err());
    }

    #[test]
    fn test_transaction_against_unknown_account_fails() {
        let db = Database::in_memory().unwrap();
        let user = test_user(&db);

        let tx = NewTransaction::new(
            date(2024, 3, 5),
            "x".into(),
            5.0,
            Posting::income(9999, None, None),
        )
        .unwrap();
        assert!(db.insert_transaction(user.id, &tx).is_err());
        assert_eq!(db.count_transactions(user.id).unwrap(), 0);
    }

    #[test]
    fn test_delete_transaction_reverses_balance() {
        let db = Database::in_memory().unwrap();
        let user = test_user(&db);
        let account = db.create_account(user.id, "Contanti", 100.0).unwrap();

        let expense = NewTransaction::new(
            date(2024, 3, 5),
            "Dinner".into(),
            40.0,
            Posting::expense(account.id, None, None),
        )
        .unwrap();
        let stored = db.insert_transaction(user.id, &expense).unwrap();

        db.delete_transaction(user.id, stored.id).unwrap();
        let account = db.get_account(user.id, account.id).unwrap().unwrap();
        assert!((account.balance - 100.0).abs() < 1e-9);
        assert_eq!(db.count_transactions(user.id).unwrap(), 0);
    }

    #[test]
    fn test_list_transactions_newest_first_with_account_filter() {
        let db = Database::in_memory().unwrap();
        let user = test_user(&db);
        let a = db.create_account(user.id, "Bancoposta", 0.0).unwrap();
        let b = db.create_account(user.id, "Postepay", 0.0).unwrap();

        for (day, desc) in [(1, "first"), (3, "third"), (2, "second")] {
            let tx = NewTransaction::new(
                date(2024, 3, day),
                desc.into(),
                10.0,
                Posting::income(a.id, None, None),
            )
            .unwrap();
            db.insert_transaction(user.id, &tx).unwrap();
        }
        let transfer = NewTransaction::new(
            date(2024, 3, 4),
            "move".into(),
            5.0,
            Posting::transfer(a.id, b.id).unwrap(),
        )
        .unwrap();
        db.insert_transaction(user.id, &transfer).unwrap();

        let all = db.list_transactions(user.id, None, None, None).unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].description, "move");
        assert_eq!(all[1].description, "third");

        // Transfers show up for the destination account too
        let for_b = db
            .list_transactions(user.id, Some(b.id), None, None)
            .unwrap();
        assert_eq!(for_b.len(), 1);
        assert_eq!(for_b[0].description, "move");

        let limited = db.list_transactions(user.id, None, Some(2), None).unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[test]
    fn test_delete_account_removes_its_transactions() {
        let db = Database::in_memory().unwrap();
        let user = test_user(&db);
        let a = db.create_account(user.id, "Bancoposta", 0.0).unwrap();
        let b = db.create_account(user.id, "Postepay", 0.0).unwrap();

        let transfer = NewTransaction::new(
            date(2024, 3, 4),
            "move".into(),
            5.0,
            Posting::transfer(a.id, b.id).unwrap(),
        )
        .unwrap();
        db.insert_transaction(user.id, &transfer).unwrap();

        db.delete_account(user.id, b.id).unwrap();
        assert_eq!(db.count_transactions(user.id).unwrap(), 0);
        assert!(db.get_account(user.id, a.id).unwrap().is_some());
    }

    #[test]
    fn test_categories_with_subcategories() {
        let db = Database::in_memory().unwrap();
        let user = test_user(&db);

        let category = db
            .create_category(user.id, "Casa", &["Bollette".into(), "Affitto".into()])
            .unwrap();
        assert_eq!(category.subcategories.len(), 2);

        assert!(db.create_category(user.id, "Casa", &[]).is_err());

        let sub = db.add_subcategory(user.id, category.id, "Spesa").unwrap();
        let fetched = db.get_category(user.id, category.id).unwrap().unwrap();
        assert_eq!(fetched.subcategories.len(), 3);

        db.delete_subcategory(user.id, category.id, sub.id).unwrap();
        db.delete_category(user.id, category.id).unwrap();
        assert!(db.list_categories(user.id).unwrap().is_empty());
    }

    #[test]
    fn test_categorized_expense() {
        let db = Database::in_memory().unwrap();
        let user = test_user(&db);
        let account = db.create_account(user.id, "Contanti", 100.0).unwrap();
        let category = db
            .create_category(user.id, "Casa", &["Bollette".into()])
            .unwrap();
        let sub_id = category.subcategories[0].id;

        let expense = NewTransaction::new(
            date(2024, 3, 5),
            "Luce".into(),
            45.0,
            Posting::expense(account.id, Some(category.id), Some(sub_id)),
        )
        .unwrap();
        let stored = db.insert_transaction(user.id, &expense).unwrap();
        match stored.posting {
            Posting::Expense {
                category_id,
                subcategory_id,
                ..
            } => {
                assert_eq!(category_id, Some(category.id));
                assert_eq!(subcategory_id, Some(sub_id));
            }
            other => panic!("Expected expense posting, got {:?}", other),
        }

        // Subcategory from a different category is rejected
        let other = db.create_category(user.id, "Svago", &[]).unwrap();
        let bad = NewTransaction::new(
            date(2024, 3, 6),
            "x".into(),
            5.0,
            Posting::expense(account.id, Some(other.id), Some(sub_id)),
        )
        .unwrap();
        assert!(db.insert_transaction(user.id, &bad).is_err());
    }

    #[test]
    fn test_reminders_sorted_by_month_day() {
        let db = Database::in_memory().unwrap();
        let user = test_user(&db);

        for (name, d, kind) in [
            ("Marco", date(1990, 12, 25), ReminderKind::Birthday),
            ("Anna", date(2001, 3, 8), ReminderKind::Birthday),
            ("San Giuseppe", date(2020, 3, 19), ReminderKind::NameDay),
            ("Nozze", date(2015, 1, 2), ReminderKind::Anniversary),
        ] {
            db.create_reminder(
                user.id,
                &NewReminder {
                    name: name.into(),
                    date: d,
                    kind,
                },
            )
            .unwrap();
        }

        let names: Vec<String> = db
            .list_reminders(user.id)
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        // Birth years are ignored, only month and day order matters
        assert_eq!(names, vec!["Nozze", "Anna", "San Giuseppe", "Marco"]);
    }

    #[test]
    fn test_upcoming_reminders_wrap_the_year() {
        let db = Database::in_memory().unwrap();
        let user = test_user(&db);

        db.create_reminder(
            user.id,
            &NewReminder {
                name: "Capodanno".into(),
                date: date(2000, 1, 1),
                kind: ReminderKind::Anniversary,
            },
        )
        .unwrap();
        db.create_reminder(
            user.id,
            &NewReminder {
                name: "Natale".into(),
                date: date(2000, 12, 25),
                kind: ReminderKind::Anniversary,
            },
        )
        .unwrap();

        let upcoming = db.upcoming_reminders(user.id, 10).unwrap();
        assert_eq!(upcoming.len(), 2);

        let limited = db.upcoming_reminders(user.id, 1).unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[test]
    fn test_audit_log() {
        let db = Database::in_memory().unwrap();
        db.log_audit(
            "tester@example.com",
            "create",
            Some("account"),
            Some(1),
            None,
        )
        .unwrap();

        let conn = db.conn().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM audit_log", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
