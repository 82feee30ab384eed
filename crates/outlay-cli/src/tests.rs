//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use chrono::{DateTime, Datelike, Local, NaiveDate, Timelike, Utc};
use outlay_core::db::Database;
use outlay_core::models::{ExpenseFilter, NewExpense};
use rust_decimal_macros::dec;

use crate::commands::{self, truncate};

fn setup_test_db() -> Database {
    let db = Database::in_memory().unwrap();
    db.seed_default_categories().unwrap();
    db
}

fn add_expense(db: &Database, amount: &str, category: Option<&str>, date: &str) -> String {
    db.create_expense(&NewExpense {
        amount: amount.to_string(),
        description: None,
        category_id: category.map(str::to_string),
        date: DateTime::parse_from_rfc3339(date).unwrap().with_timezone(&Utc),
    })
    .unwrap()
    .id
}

// ========== Init Command Tests ==========

#[test]
fn test_cmd_init_seeds_categories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("outlay.db");

    commands::cmd_init(&path, true).unwrap();
    // Running twice must not duplicate anything
    commands::cmd_init(&path, true).unwrap();

    let db = commands::open_db(&path, true).unwrap();
    assert_eq!(db.list_categories().unwrap().len(), 8);
}

// ========== Categories Command Tests ==========

#[test]
fn test_cmd_categories_list() {
    let db = setup_test_db();
    assert!(commands::cmd_categories_list(&db).is_ok());
}

#[test]
fn test_cmd_categories_list_empty() {
    let db = Database::in_memory().unwrap();
    assert!(commands::cmd_categories_list(&db).is_ok());
}

#[test]
fn test_cmd_categories_add() {
    let db = setup_test_db();
    commands::cmd_categories_add(&db, "Pets", Some("#a855f7"), Some("paw")).unwrap();

    let pets = db
        .list_categories()
        .unwrap()
        .into_iter()
        .find(|c| c.name == "Pets")
        .unwrap();
    assert_eq!(pets.color, "#a855f7");
    assert_eq!(pets.icon, "paw");
}

#[test]
fn test_cmd_categories_add_invalid_color() {
    let db = setup_test_db();
    assert!(commands::cmd_categories_add(&db, "Pets", Some("purple"), None).is_err());
}

#[test]
fn test_cmd_categories_add_duplicate() {
    let db = setup_test_db();
    assert!(commands::cmd_categories_add(&db, "Transport", None, None).is_err());
}

#[test]
fn test_cmd_categories_delete_in_use_requires_force() {
    let db = setup_test_db();
    let expense_id = add_expense(&db, "9.99", Some("entertainment"), "2024-03-01T12:00:00Z");

    assert!(commands::cmd_categories_delete(&db, "entertainment", false).is_err());
    assert!(db.get_category("entertainment").unwrap().is_some());

    commands::cmd_categories_delete(&db, "entertainment", true).unwrap();
    assert!(db.get_category("entertainment").unwrap().is_none());

    let expense = db.get_expense(&expense_id).unwrap().unwrap();
    assert!(expense.expense.category_id.is_none());
    assert!(expense.category.is_none());
}

#[test]
fn test_cmd_categories_delete_unused() {
    let db = setup_test_db();
    commands::cmd_categories_delete(&db, "health", false).unwrap();
    assert!(db.get_category("health").unwrap().is_none());
}

#[test]
fn test_cmd_categories_delete_missing() {
    let db = setup_test_db();
    assert!(commands::cmd_categories_delete(&db, "nope", false).is_err());
}

// ========== Expenses Command Tests ==========

#[test]
fn test_cmd_expenses_list_empty() {
    let db = setup_test_db();
    assert!(commands::cmd_expenses_list(&db, 20, None).is_ok());
}

#[test]
fn test_cmd_expenses_list_with_data() {
    let db = setup_test_db();
    add_expense(&db, "12.50", Some("food"), "2024-03-01T12:00:00Z");
    add_expense(&db, "40.00", None, "2024-03-02T12:00:00Z");

    assert!(commands::cmd_expenses_list(&db, 20, None).is_ok());
    assert!(commands::cmd_expenses_list(&db, 1, Some("food")).is_ok());
}

#[test]
fn test_cmd_expenses_add_with_date() {
    let db = setup_test_db();
    commands::cmd_expenses_add(
        &db,
        "12.50",
        Some("food"),
        Some("2024-03-05"),
        Some("Lunch"),
    )
    .unwrap();

    let expenses = db.list_expenses(&ExpenseFilter::default()).unwrap();
    assert_eq!(expenses.len(), 1);
    let item = &expenses[0];
    assert_eq!(item.expense.amount, "12.50");
    assert_eq!(item.expense.description.as_deref(), Some("Lunch"));
    assert_eq!(item.category.as_ref().unwrap().id, "food");

    // Stored as local midday, so the local calendar day is preserved
    let local = item.expense.date.with_timezone(&Local);
    assert_eq!(local.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
}

#[test]
fn test_cmd_expenses_add_defaults_to_today() {
    let db = setup_test_db();
    commands::cmd_expenses_add(&db, "3.20", None, None, None).unwrap();

    let expenses = db.list_expenses(&ExpenseFilter::default()).unwrap();
    assert_eq!(expenses.len(), 1);
    let local = expenses[0].expense.date.with_timezone(&Local);
    assert_eq!(local.date_naive(), Local::now().date_naive());
    assert!(expenses[0].category.is_none());
}

#[test]
fn test_cmd_expenses_add_invalid_amount() {
    let db = setup_test_db();
    assert!(commands::cmd_expenses_add(&db, "twelve", None, None, None).is_err());
    assert!(commands::cmd_expenses_add(&db, "-5", None, None, None).is_err());
    assert_eq!(db.count_expenses().unwrap(), 0);
}

#[test]
fn test_cmd_expenses_add_invalid_date() {
    let db = setup_test_db();
    assert!(commands::cmd_expenses_add(&db, "5", None, Some("03/05/2024"), None).is_err());
}

#[test]
fn test_cmd_expenses_add_unknown_category() {
    let db = setup_test_db();
    assert!(commands::cmd_expenses_add(&db, "5", Some("nope"), None, None).is_err());
}

#[test]
fn test_cmd_expenses_delete() {
    let db = setup_test_db();
    let id = add_expense(&db, "12.50", Some("food"), "2024-03-01T12:00:00Z");

    commands::cmd_expenses_delete(&db, &id).unwrap();
    assert!(db.get_expense(&id).unwrap().is_none());
    assert!(commands::cmd_expenses_delete(&db, &id).is_err());
}

// ========== Report Command Tests ==========

#[test]
fn test_cmd_summary_empty() {
    let db = setup_test_db();
    let reference = commands::resolve_reference(Some("2024-03-10T09:00:00Z")).unwrap();
    assert!(commands::cmd_summary(&db, &reference, false).is_ok());
    assert!(commands::cmd_summary(&db, &reference, true).is_ok());
}

#[test]
fn test_cmd_summary_with_data() {
    let db = setup_test_db();
    add_expense(&db, "100.00", Some("food"), "2024-03-05T10:00:00Z");
    add_expense(&db, "50.00", None, "2024-02-20T10:00:00Z");

    let reference = commands::resolve_reference(Some("2024-03-10T09:00:00Z")).unwrap();
    assert!(commands::cmd_summary(&db, &reference, false).is_ok());

    let summary = db.expense_summary(&reference).unwrap();
    assert_eq!(summary.monthly, dec!(100.00));
    assert_eq!(summary.previous_month, dec!(50.00));
    assert_eq!(summary.monthly_change, Some(100.0));
}

#[test]
fn test_cmd_breakdown() {
    let db = setup_test_db();
    add_expense(&db, "75", Some("food"), "2024-03-05T10:00:00Z");
    add_expense(&db, "25", None, "2024-03-06T10:00:00Z");

    assert!(commands::cmd_breakdown(&db, false, false).is_ok());
    assert!(commands::cmd_breakdown(&db, true, false).is_ok());
    assert!(commands::cmd_breakdown(&db, false, true).is_ok());
}

#[test]
fn test_cmd_breakdown_empty() {
    let db = setup_test_db();
    assert!(commands::cmd_breakdown(&db, false, false).is_ok());
}

#[test]
fn test_format_change() {
    assert_eq!(commands::format_change(Some(12.34)), "▲ 12.3%");
    assert_eq!(commands::format_change(Some(-50.0)), "▼ 50.0%");
    assert_eq!(commands::format_change(Some(0.0)), "  0.0%");
    assert_eq!(commands::format_change(None), "   new");
}

// ========== Users Command Tests ==========

#[test]
fn test_cmd_users_add_and_list() {
    let db = setup_test_db();
    assert!(commands::cmd_users_list(&db).is_ok());

    commands::cmd_users_add(&db, "Sam@Example.com", Some("Sam"), "correct horse").unwrap();
    let users = db.list_users().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].email, "sam@example.com");

    assert!(commands::cmd_users_list(&db).is_ok());
}

#[test]
fn test_cmd_users_add_short_password() {
    let db = setup_test_db();
    assert!(commands::cmd_users_add(&db, "sam@example.com", None, "short").is_err());
}

#[test]
fn test_cmd_users_add_duplicate() {
    let db = setup_test_db();
    commands::cmd_users_add(&db, "sam@example.com", None, "correct horse").unwrap();
    assert!(commands::cmd_users_add(&db, "SAM@example.com", None, "another one").is_err());
}

// ========== Helper Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("exactly10!", 10), "exactly10!");
    assert_eq!(truncate("this is a long string", 10), "this is...");
    assert_eq!(truncate("café crème brûlée", 8), "café ...");
}

#[test]
fn test_parse_date_arg() {
    let date = commands::parse_date_arg("2024-02-29", "--date").unwrap();
    assert_eq!((date.year(), date.month(), date.day()), (2024, 2, 29));

    let err = commands::parse_date_arg("2024-02-30", "--date").unwrap_err();
    assert!(err.to_string().contains("--date"));
}

#[test]
fn test_local_day_to_utc_is_local_midday() {
    let day = NaiveDate::from_ymd_opt(2024, 7, 14).unwrap();
    let local = commands::local_day_to_utc(day).unwrap().with_timezone(&Local);
    assert_eq!(local.date_naive(), day);
    assert_eq!(local.hour(), 12);
}

#[test]
fn test_resolve_reference() {
    let reference = commands::resolve_reference(Some("2024-03-10T09:00:00+10:00")).unwrap();
    assert_eq!(reference.offset().local_minus_utc(), 10 * 3600);
    assert_eq!(reference.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());

    assert!(commands::resolve_reference(Some("yesterday")).is_err());
    assert!(commands::resolve_reference(None).is_ok());
}
