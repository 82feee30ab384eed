//! Database tests

use super::*;
use crate::models::*;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use rusqlite::params;

    fn new_category(name: &str) -> NewCategory {
        NewCategory {
            name: name.to_string(),
            color: None,
            icon: None,
        }
    }

    fn new_expense(amount: &str, category_id: Option<&str>, y: i32, m: u32, d: u32) -> NewExpense {
        NewExpense {
            amount: amount.to_string(),
            description: None,
            category_id: category_id.map(str::to_string),
            date: Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_in_memory_db() {
        let db = Database::in_memory().unwrap();
        assert!(db.list_categories().unwrap().is_empty());
        assert_eq!(db.count_expenses().unwrap(), 0);
    }

    #[test]
    fn test_expenses_schema_exists() {
        let db = Database::in_memory().unwrap();
        let conn = db.conn().unwrap();

        let result: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('expenses') WHERE name IN ('id', 'amount', 'description', 'category_id', 'date', 'created_at', 'updated_at')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(result, 7, "expenses table should have 7 expected columns");

        let fk: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1, "foreign keys should be enabled on pooled connections");
    }

    // ========== Categories ==========

    #[test]
    fn test_seed_default_categories_is_idempotent() {
        let db = Database::in_memory().unwrap();

        let first = db.seed_default_categories().unwrap();
        assert_eq!(first, DEFAULT_CATEGORIES.len());

        let second = db.seed_default_categories().unwrap();
        assert_eq!(second, 0);

        assert_eq!(db.list_categories().unwrap().len(), DEFAULT_CATEGORIES.len());
        let food = db.get_category("food").unwrap().unwrap();
        assert_eq!(food.name, "Food & Dining");
    }

    #[test]
    fn test_category_crud() {
        let db = Database::in_memory().unwrap();

        let created = db
            .create_category(&NewCategory {
                name: "  Groceries ".to_string(),
                color: Some("#16a34a".to_string()),
                icon: Some("cart".to_string()),
            })
            .unwrap();
        assert_eq!(created.name, "Groceries");
        assert_eq!(created.color, "#16a34a");

        let fetched = db.get_category(&created.id).unwrap().unwrap();
        assert_eq!(fetched, created);

        let updated = db
            .update_category(
                &created.id,
                &CategoryUpdate {
                    name: Some("Supermarket".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.name, "Supermarket");
        assert_eq!(updated.color, "#16a34a");
        assert_eq!(updated.icon, "cart");

        let result = db.delete_category(&created.id, false).unwrap();
        assert!(result.deleted);
        assert_eq!(result.expenses_uncategorized, 0);
        assert!(db.get_category(&created.id).unwrap().is_none());
    }

    #[test]
    fn test_category_defaults_applied() {
        let db = Database::in_memory().unwrap();
        let created = db.create_category(&new_category("Pets")).unwrap();
        assert_eq!(created.color, DEFAULT_CATEGORY_COLOR);
        assert_eq!(created.icon, DEFAULT_CATEGORY_ICON);
    }

    #[test]
    fn test_category_validation() {
        let db = Database::in_memory().unwrap();

        assert!(matches!(
            db.create_category(&new_category("   ")),
            Err(Error::InvalidData(_))
        ));
        assert!(matches!(
            db.create_category(&NewCategory {
                name: "Gifts".to_string(),
                color: Some("red".to_string()),
                icon: None,
            }),
            Err(Error::InvalidData(_))
        ));
        assert!(matches!(
            db.update_category("missing", &CategoryUpdate::default()),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_category_duplicate_name_conflicts() {
        let db = Database::in_memory().unwrap();
        let travel = db.create_category(&new_category("Travel")).unwrap();
        let gifts = db.create_category(&new_category("Gifts")).unwrap();

        assert!(matches!(
            db.create_category(&new_category("travel")),
            Err(Error::Conflict(_))
        ));

        // Renaming onto another category's name conflicts, keeping your own does not
        let rename = CategoryUpdate {
            name: Some("TRAVEL".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            db.update_category(&gifts.id, &rename),
            Err(Error::Conflict(_))
        ));
        assert_eq!(
            db.update_category(&travel.id, &rename).unwrap().name,
            "TRAVEL"
        );
    }

    #[test]
    fn test_delete_category_in_use() {
        let db = Database::in_memory().unwrap();
        db.seed_default_categories().unwrap();
        let expense = db
            .create_expense(&new_expense("12.00", Some("food"), 2024, 3, 1))
            .unwrap();

        assert_eq!(db.count_expenses_in_category("food").unwrap(), 1);
        assert!(matches!(
            db.delete_category("food", false),
            Err(Error::Conflict(_))
        ));
        assert!(db.get_category("food").unwrap().is_some());

        let result = db.delete_category("food", true).unwrap();
        assert!(result.deleted);
        assert_eq!(result.expenses_uncategorized, 1);

        let orphan = db.get_expense(&expense.id).unwrap().unwrap();
        assert!(orphan.expense.category_id.is_none());
        assert!(orphan.category.is_none());
    }

    #[test]
    fn test_delete_missing_category() {
        let db = Database::in_memory().unwrap();
        assert!(matches!(
            db.delete_category("nope", true),
            Err(Error::NotFound(_))
        ));
    }

    // ========== Expenses ==========

    #[test]
    fn test_expense_crud() {
        let db = Database::in_memory().unwrap();
        db.seed_default_categories().unwrap();

        let created = db
            .create_expense(&NewExpense {
                amount: " 42.50 ".to_string(),
                description: Some("Dinner".to_string()),
                category_id: Some("food".to_string()),
                date: Utc.with_ymd_and_hms(2024, 3, 5, 19, 30, 0).unwrap(),
            })
            .unwrap();
        assert_eq!(created.amount, "42.50");

        let fetched = db.get_expense(&created.id).unwrap().unwrap();
        assert_eq!(fetched.expense.amount, "42.50");
        assert_eq!(fetched.expense.description.as_deref(), Some("Dinner"));
        assert_eq!(fetched.expense.date, created.date);
        assert_eq!(fetched.category.unwrap().id, "food");

        let updated = db
            .update_expense(
                &created.id,
                &ExpenseUpdate {
                    amount: Some("40".to_string()),
                    description: Some(None),
                    category_id: Some(Some("transport".to_string())),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.amount, "40");
        assert!(updated.description.is_none());
        assert_eq!(updated.category_id.as_deref(), Some("transport"));
        assert_eq!(updated.date, created.date);

        db.delete_expense(&created.id).unwrap();
        assert!(db.get_expense(&created.id).unwrap().is_none());
        assert!(matches!(
            db.delete_expense(&created.id),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_expense_validation() {
        let db = Database::in_memory().unwrap();

        assert!(matches!(
            db.create_expense(&new_expense("-5", None, 2024, 3, 1)),
            Err(Error::InvalidData(_))
        ));
        assert!(matches!(
            db.create_expense(&new_expense("five", None, 2024, 3, 1)),
            Err(Error::InvalidData(_))
        ));
        assert!(matches!(
            db.create_expense(&new_expense("5", Some("ghost"), 2024, 3, 1)),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            db.update_expense("missing", &ExpenseUpdate::default()),
            Err(Error::NotFound(_))
        ));
        assert_eq!(db.count_expenses().unwrap(), 0);
    }

    #[test]
    fn test_list_expenses_filters() {
        let db = Database::in_memory().unwrap();
        db.seed_default_categories().unwrap();

        db.create_expense(&new_expense("1", Some("food"), 2024, 2, 28))
            .unwrap();
        db.create_expense(&new_expense("2", Some("transport"), 2024, 3, 1))
            .unwrap();
        db.create_expense(&new_expense("3", Some("food"), 2024, 3, 15))
            .unwrap();
        db.create_expense(&new_expense("4", None, 2024, 3, 31))
            .unwrap();

        // Newest first
        let all = db.list_expenses(&ExpenseFilter::default()).unwrap();
        let amounts: Vec<&str> = all.iter().map(|e| e.expense.amount.as_str()).collect();
        assert_eq!(amounts, vec!["4", "3", "2", "1"]);

        let food = db
            .list_expenses(&ExpenseFilter {
                category_id: Some("food".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(food.len(), 2);

        // Date bounds are inclusive
        let march = db
            .list_expenses(&ExpenseFilter {
                from: NaiveDate::from_ymd_opt(2024, 3, 1),
                to: NaiveDate::from_ymd_opt(2024, 3, 31),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(march.len(), 3);

        // Late on Feb 29th UTC is already March 1st at UTC+10
        db.create_expense(&NewExpense {
            amount: "5".to_string(),
            description: None,
            category_id: None,
            date: Utc.with_ymd_and_hms(2024, 2, 29, 16, 0, 0).unwrap(),
        })
        .unwrap();
        let march_first = |utc_offset: FixedOffset| {
            db.list_expenses(&ExpenseFilter {
                from: NaiveDate::from_ymd_opt(2024, 3, 1),
                to: NaiveDate::from_ymd_opt(2024, 3, 1),
                utc_offset,
                ..Default::default()
            })
            .unwrap()
            .len()
        };
        assert_eq!(march_first(FixedOffset::east_opt(0).unwrap()), 1);
        assert_eq!(march_first(FixedOffset::east_opt(10 * 3600).unwrap()), 2);

        let page = db
            .list_expenses(&ExpenseFilter {
                limit: 2,
                offset: 1,
                ..Default::default()
            })
            .unwrap();
        let amounts: Vec<&str> = page.iter().map(|e| e.expense.amount.as_str()).collect();
        assert_eq!(amounts, vec!["3", "2"]);
    }

    // ========== Users ==========

    #[test]
    fn test_user_create_and_verify() {
        let db = Database::in_memory().unwrap();

        let user = db
            .create_user("Alex@Example.com", Some("Alex"), "correct horse")
            .unwrap();
        assert_eq!(user.email, "alex@example.com");

        let verified = db
            .verify_user_password("alex@example.com", "correct horse")
            .unwrap();
        assert_eq!(verified.map(|u| u.id), Some(user.id.clone()));

        assert!(db
            .verify_user_password("alex@example.com", "wrong password")
            .unwrap()
            .is_none());
        assert!(db
            .verify_user_password("nobody@example.com", "correct horse")
            .unwrap()
            .is_none());

        let found = db.get_user_by_email("ALEX@example.com").unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(db.list_users().unwrap().len(), 1);
    }

    #[test]
    fn test_user_validation() {
        let db = Database::in_memory().unwrap();
        db.create_user("sam@example.com", None, "longenough").unwrap();

        assert!(matches!(
            db.create_user("SAM@example.com", None, "longenough"),
            Err(Error::Conflict(_))
        ));
        assert!(matches!(
            db.create_user("not-an-email", None, "longenough"),
            Err(Error::InvalidData(_))
        ));
        assert!(matches!(
            db.create_user("kim@example.com", None, "short"),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn test_password_hash_is_not_plaintext() {
        let db = Database::in_memory().unwrap();
        db.create_user("sam@example.com", None, "longenough").unwrap();

        let conn = db.conn().unwrap();
        let stored: String = conn
            .query_row(
                "SELECT password_hash FROM users WHERE email = ?",
                params!["sam@example.com"],
                |row| row.get(0),
            )
            .unwrap();
        assert!(stored.starts_with("$argon2"));
        assert!(!stored.contains("longenough"));
    }

    // ========== Audit ==========

    #[test]
    fn test_audit_log() {
        let db = Database::in_memory().unwrap();

        db.log_audit("a@example.com", "list", Some("category"), None, Some("count=8"))
            .unwrap();
        let id = db
            .log_audit("b@example.com", "delete", Some("expense"), Some("abc"), None)
            .unwrap();
        assert!(id > 0);

        let entries = db.list_audit_log(10).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, "delete");
        assert_eq!(entries[0].entity_id.as_deref(), Some("abc"));
        assert_eq!(entries[1].details.as_deref(), Some("count=8"));

        assert_eq!(db.list_audit_log(1).unwrap().len(), 1);
    }

    // ========== Analytics snapshots ==========

    #[test]
    fn test_expense_records_resolve_categories() {
        let db = Database::in_memory().unwrap();
        db.seed_default_categories().unwrap();
        db.create_expense(&new_expense("10", Some("food"), 2024, 3, 1))
            .unwrap();
        db.create_expense(&new_expense("5", None, 2024, 3, 2))
            .unwrap();

        let records = db.list_expense_records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].category.as_ref().map(|c| c.name.as_str()),
            Some("Food & Dining")
        );
        assert!(records[1].category.is_none());
    }

    #[test]
    fn test_unparsable_stored_amount_is_skipped() {
        let db = Database::in_memory().unwrap();
        db.create_expense(&new_expense("20", None, 2024, 3, 5))
            .unwrap();

        // Rows written by other tools may carry text that is not a decimal
        let conn = db.conn().unwrap();
        conn.execute(
            "INSERT INTO expenses (id, amount, date, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
            params![
                "legacy",
                "n/a",
                "2024-03-05T00:00:00Z",
                "2024-03-05T00:00:00Z",
                "2024-03-05T00:00:00Z"
            ],
        )
        .unwrap();
        drop(conn);

        let now = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
        let summary = db.expense_summary(&now).unwrap();
        assert_eq!(summary.total, dec!(20));
    }

    #[test]
    fn test_expense_summary() {
        let db = Database::in_memory().unwrap();
        db.seed_default_categories().unwrap();
        db.create_expense(&new_expense("100.00", Some("food"), 2024, 3, 5))
            .unwrap();
        db.create_expense(&new_expense("50.00", Some("transport"), 2024, 2, 20))
            .unwrap();

        let now = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
        let summary = db.expense_summary(&now).unwrap();

        assert_eq!(summary.total, dec!(150));
        assert_eq!(summary.monthly, dec!(100));
        assert_eq!(summary.previous_month, dec!(50));
        assert_eq!(summary.monthly_change, Some(100.0));

        // Same instant seen from UTC-8 is still March 10th
        let pacific = FixedOffset::west_opt(8 * 3600).unwrap();
        let local = db.expense_summary(&now.with_timezone(&pacific)).unwrap();
        assert_eq!(local.monthly, dec!(100));
    }

    #[test]
    fn test_category_breakdown_after_force_delete() {
        let db = Database::in_memory().unwrap();
        db.seed_default_categories().unwrap();
        db.create_expense(&new_expense("60", Some("food"), 2024, 3, 1))
            .unwrap();
        db.create_expense(&new_expense("40", Some("health"), 2024, 3, 2))
            .unwrap();

        let entries = db.category_breakdown(BreakdownOptions::default()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].category.id, "food");
        assert_eq!(entries[0].percentage, 60.0);

        db.delete_category("health", true).unwrap();

        // The orphaned 40 still dilutes the default grand total
        let entries = db.category_breakdown(BreakdownOptions::default()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].amount, dec!(60));
        assert_eq!(entries[0].percentage, 60.0);

        let entries = db
            .category_breakdown(BreakdownOptions {
                grand_total: GrandTotalBasis::CategorizedOnly,
            })
            .unwrap();
        assert_eq!(entries[0].percentage, 100.0);

        let total: Decimal = db
            .list_expense_records()
            .unwrap()
            .iter()
            .filter_map(|r| crate::analytics::parse_amount(&r.amount))
            .sum();
        assert_eq!(total, dec!(100));
    }

    // ========== Encryption ==========

    #[test]
    fn test_encrypted_database_requires_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("encrypted.db");
        let path = path.to_string_lossy();

        {
            let db = Database::new_with_key(&path, Some("hunter2-passphrase")).unwrap();
            db.seed_default_categories().unwrap();
        }

        let reopened = Database::new_with_key(&path, Some("hunter2-passphrase")).unwrap();
        assert_eq!(
            reopened.list_categories().unwrap().len(),
            DEFAULT_CATEGORIES.len()
        );
        drop(reopened);

        assert!(Database::new_with_key(&path, Some("wrong-passphrase")).is_err());
    }

    #[test]
    fn test_derive_key_is_deterministic() {
        let a = derive_key("passphrase").unwrap();
        let b = derive_key("passphrase").unwrap();
        let c = derive_key("other").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }
}
