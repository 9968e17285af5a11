//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use soldi_core::db::Database;
use soldi_core::models::AccountStatus;

use crate::commands::{self, truncate};

fn setup_test_db() -> Database {
    Database::in_memory().unwrap()
}

// ========== Account Command Tests ==========

#[test]
fn test_cmd_accounts_list_empty() {
    let db = setup_test_db();
    let result = commands::cmd_accounts_list(&db, false);
    assert!(result.is_ok());
}

#[test]
fn test_cmd_accounts_add() {
    let db = setup_test_db();
    let result = commands::cmd_accounts_add(&db, "Bancoposta", 150.0);
    assert!(result.is_ok());

    let user = db.get_or_create_local_user().unwrap();
    let accounts = db.list_accounts(user.id, false).unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].name, "Bancoposta");
    assert_eq!(accounts[0].balance, 150.0);
}

#[test]
fn test_cmd_accounts_add_duplicate() {
    let db = setup_test_db();
    commands::cmd_accounts_add(&db, "Contanti", 0.0).unwrap();

    let result = commands::cmd_accounts_add(&db, "Contanti", 0.0);
    assert!(result.is_err());
}

#[test]
fn test_cmd_accounts_rename() {
    let db = setup_test_db();
    let user = db.get_or_create_local_user().unwrap();
    let account = db.create_account(user.id, "OldName", 0.0).unwrap();

    let result = commands::cmd_accounts_rename(&db, account.id, "NewName");
    assert!(result.is_ok());

    let account = db.get_account(user.id, account.id).unwrap().unwrap();
    assert_eq!(account.name, "NewName");
}

#[test]
fn test_cmd_accounts_archive_unarchive() {
    let db = setup_test_db();
    let user = db.get_or_create_local_user().unwrap();
    let account = db.create_account(user.id, "Postepay", 50.0).unwrap();

    commands::cmd_accounts_archive(&db, account.id).unwrap();
    let archived = db.get_account(user.id, account.id).unwrap().unwrap();
    assert_eq!(archived.status, AccountStatus::Archived);

    commands::cmd_accounts_unarchive(&db, account.id).unwrap();
    let active = db.get_account(user.id, account.id).unwrap().unwrap();
    assert_eq!(active.status, AccountStatus::Active);
}

#[test]
fn test_cmd_accounts_delete_with_yes() {
    let db = setup_test_db();
    let user = db.get_or_create_local_user().unwrap();
    let account = db.create_account(user.id, "ToDelete", 0.0).unwrap();

    let result = commands::cmd_accounts_delete(&db, account.id, true);
    assert!(result.is_ok());

    assert!(db.get_account(user.id, account.id).unwrap().is_none());
}

#[test]
fn test_cmd_accounts_delete_not_found() {
    let db = setup_test_db();
    let result = commands::cmd_accounts_delete(&db, 9999, true);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("not found"));
}

// ========== Transaction Command Tests ==========

#[test]
fn test_cmd_transactions_add_expense() {
    let db = setup_test_db();
    let user = db.get_or_create_local_user().unwrap();
    let account = db.create_account(user.id, "Contanti", 100.0).unwrap();

    let result = commands::cmd_transactions_add(
        &db,
        "expense",
        12.5,
        "Pranzo",
        Some("2024-03-05"),
        account.id,
        None,
        None,
        None,
    );
    assert!(result.is_ok());

    let account = db.get_account(user.id, account.id).unwrap().unwrap();
    assert!((account.balance - 87.5).abs() < 0.001);
}

#[test]
fn test_cmd_transactions_add_transfer() {
    let db = setup_test_db();
    let user = db.get_or_create_local_user().unwrap();
    let from = db.create_account(user.id, "Contanti", 100.0).unwrap();
    let to = db.create_account(user.id, "Bancoposta", 0.0).unwrap();

    let result = commands::cmd_transactions_add(
        &db,
        "transfer",
        40.0,
        "Versamento",
        Some("2024-03-05"),
        from.id,
        Some(to.id),
        None,
        None,
    );
    assert!(result.is_ok());

    let to = db.get_account(user.id, to.id).unwrap().unwrap();
    assert_eq!(to.balance, 40.0);
}

#[test]
fn test_cmd_transactions_add_transfer_requires_destination() {
    let db = setup_test_db();
    let user = db.get_or_create_local_user().unwrap();
    let account = db.create_account(user.id, "Contanti", 100.0).unwrap();

    let result = commands::cmd_transactions_add(
        &db,
        "transfer",
        40.0,
        "Versamento",
        None,
        account.id,
        None,
        None,
        None,
    );
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("--to-account is required"));
}

#[test]
fn test_cmd_transactions_add_invalid_kind() {
    let db = setup_test_db();
    let user = db.get_or_create_local_user().unwrap();
    let account = db.create_account(user.id, "Contanti", 100.0).unwrap();

    let result = commands::cmd_transactions_add(
        &db, "refund", 5.0, "Bad", None, account.id, None, None, None,
    );
    assert!(result.is_err());
}

#[test]
fn test_cmd_transactions_add_invalid_date() {
    let db = setup_test_db();
    let user = db.get_or_create_local_user().unwrap();
    let account = db.create_account(user.id, "Contanti", 100.0).unwrap();

    let result = commands::cmd_transactions_add(
        &db,
        "expense",
        5.0,
        "Bad",
        Some("05/03/2024"),
        account.id,
        None,
        None,
        None,
    );
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("Invalid date"));
}

#[test]
fn test_cmd_transactions_list_and_delete() {
    let db = setup_test_db();
    let user = db.get_or_create_local_user().unwrap();
    let account = db.create_account(user.id, "Contanti", 100.0).unwrap();

    commands::cmd_transactions_add(
        &db,
        "income",
        50.0,
        "Regalo",
        Some("2024-03-05"),
        account.id,
        None,
        None,
        None,
    )
    .unwrap();

    assert!(commands::cmd_transactions_list(&db, 20, None).is_ok());

    let txs = db.list_transactions(user.id, None, None, None).unwrap();
    assert_eq!(txs.len(), 1);

    let result = commands::cmd_transactions_delete(&db, txs[0].id);
    assert!(result.is_ok());

    let account = db.get_account(user.id, account.id).unwrap().unwrap();
    assert_eq!(account.balance, 100.0);
}

#[test]
fn test_cmd_transactions_delete_not_found() {
    let db = setup_test_db();
    let result = commands::cmd_transactions_delete(&db, 9999);
    assert!(result.is_err());
}

// ========== Category Command Tests ==========

#[test]
fn test_cmd_categories_add_and_list() {
    let db = setup_test_db();

    let subs = vec!["Supermercato".to_string(), "Panetteria".to_string()];
    let result = commands::cmd_categories_add(&db, "Spesa", &subs);
    assert!(result.is_ok());

    let user = db.get_or_create_local_user().unwrap();
    let categories = db.list_categories(user.id).unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].subcategories.len(), 2);

    assert!(commands::cmd_categories_list(&db).is_ok());
}

#[test]
fn test_cmd_categories_delete() {
    let db = setup_test_db();
    let user = db.get_or_create_local_user().unwrap();
    let category = db.create_category(user.id, "Svago", &[]).unwrap();

    let result = commands::cmd_categories_delete(&db, category.id);
    assert!(result.is_ok());

    assert!(db.get_category(user.id, category.id).unwrap().is_none());
}

#[test]
fn test_cmd_categories_delete_not_found() {
    let db = setup_test_db();
    let result = commands::cmd_categories_delete(&db, 9999);
    assert!(result.is_err());
}

// ========== Reminder Command Tests ==========

#[test]
fn test_cmd_reminders_add_and_list() {
    let db = setup_test_db();

    let result = commands::cmd_reminders_add(&db, "Anna", "1990-07-26", "birthday");
    assert!(result.is_ok());

    let user = db.get_or_create_local_user().unwrap();
    let reminders = db.list_reminders(user.id).unwrap();
    assert_eq!(reminders.len(), 1);
    assert_eq!(reminders[0].name, "Anna");

    assert!(commands::cmd_reminders_list(&db).is_ok());
    assert!(commands::cmd_reminders_upcoming(&db, 5).is_ok());
}

#[test]
fn test_cmd_reminders_add_invalid_kind() {
    let db = setup_test_db();
    let result = commands::cmd_reminders_add(&db, "Anna", "1990-07-26", "holiday");
    assert!(result.is_err());
}

#[test]
fn test_cmd_reminders_delete() {
    let db = setup_test_db();
    commands::cmd_reminders_add(&db, "Marco", "1985-12-08", "nameday").unwrap();

    let user = db.get_or_create_local_user().unwrap();
    let reminders = db.list_reminders(user.id).unwrap();

    let result = commands::cmd_reminders_delete(&db, reminders[0].id);
    assert!(result.is_ok());
    assert!(db.list_reminders(user.id).unwrap().is_empty());
}

// ========== Register Command Tests ==========

#[test]
fn test_cmd_register() {
    let db = setup_test_db();

    let result = commands::cmd_register(&db, "Mario@Example.com", Some("correct-horse"));
    assert!(result.is_ok());

    // Email is normalized, default accounts are seeded
    let user = db.get_user_by_email("mario@example.com").unwrap().unwrap();
    let accounts = db.list_accounts(user.id, false).unwrap();
    assert_eq!(accounts.len(), 3);
}

#[test]
fn test_cmd_register_invalid_email() {
    let db = setup_test_db();
    let result = commands::cmd_register(&db, "not-an-email", Some("correct-horse"));
    assert!(result.is_err());
}

#[test]
fn test_cmd_register_short_password() {
    let db = setup_test_db();
    let result = commands::cmd_register(&db, "mario@example.com", Some("abc"));
    assert!(result.is_err());
}

// ========== Import Command Tests ==========

#[test]
fn test_cmd_import_csv_file() {
    use std::io::Write;

    let db = setup_test_db();
    let user = db.get_or_create_local_user().unwrap();
    let account = db.create_account(user.id, "Bancoposta", 0.0).unwrap();

    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "date,description,amount").unwrap();
    writeln!(file, "2024-03-05,POS purchase,-25.00").unwrap();
    writeln!(file, "2024-03-06,Salary,1500.00").unwrap();
    file.flush().unwrap();

    let result = commands::cmd_import(&db, file.path(), account.id, false);
    assert!(result.is_ok());

    let txs = db.list_transactions(user.id, None, None, None).unwrap();
    assert_eq!(txs.len(), 2);

    let account = db.get_account(user.id, account.id).unwrap().unwrap();
    assert!((account.balance - 1475.0).abs() < 0.001);
}

#[test]
fn test_cmd_import_preview_commits_nothing() {
    use std::io::Write;

    let db = setup_test_db();
    let user = db.get_or_create_local_user().unwrap();
    let account = db.create_account(user.id, "Bancoposta", 0.0).unwrap();

    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "date,description,amount").unwrap();
    writeln!(file, "2024-03-05,POS purchase,-25.00").unwrap();
    file.flush().unwrap();

    let result = commands::cmd_import(&db, file.path(), account.id, true);
    assert!(result.is_ok());

    let txs = db.list_transactions(user.id, None, None, None).unwrap();
    assert!(txs.is_empty());
}

#[test]
fn test_cmd_import_unknown_extension() {
    use std::io::Write;

    let db = setup_test_db();
    let user = db.get_or_create_local_user().unwrap();
    let account = db.create_account(user.id, "Bancoposta", 0.0).unwrap();

    let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
    writeln!(file, "not a statement").unwrap();
    file.flush().unwrap();

    let result = commands::cmd_import(&db, file.path(), account.id, false);
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Unsupported file type"));
}

#[test]
fn test_cmd_import_unknown_account() {
    let db = setup_test_db();
    let result = commands::cmd_import(&db, std::path::Path::new("whatever.csv"), 9999, false);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("not found"));
}

// ========== Utility Tests ==========

#[test]
fn test_cmd_status_reports_on_existing_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("soldi.db");

    let db = commands::open_db(&path, true).unwrap();
    let user = db.get_or_create_local_user().unwrap();
    db.create_account(user.id, "Contanti", 10.0).unwrap();
    drop(db);

    assert!(commands::cmd_status(&path, true).is_ok());
}

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("exactly-10", 10), "exactly-10");
    assert_eq!(truncate("this is far too long", 10), "this is...");
}

#[test]
fn test_truncate_cuts_accented_text_on_char_boundary() {
    // Accented descriptions are the normal case for this domain
    assert_eq!(
        truncate("Pagamento al Cafè della stazione", 20),
        "Pagamento al Cafè..."
    );
    assert_eq!(truncate("Caffè", 10), "Caffè");
    assert_eq!(truncate("èèèèèèèèèè", 5), "èè...");
}
