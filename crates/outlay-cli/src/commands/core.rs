//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `cmd_init` - Initialize the database
//! - date helpers shared by the expense and report commands

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use outlay_core::db::Database;

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path must be valid UTF-8")?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path, no_encrypt)?;

    let seeded = db
        .seed_default_categories()
        .context("Failed to seed default categories")?;
    println!("   Seeded {} default categories", seeded);

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Record an expense: outlay expenses add 12.50 --category food");
    println!("  2. See where it goes: outlay summary");
    println!("  3. Start web UI: outlay serve");

    Ok(())
}

/// Parse a YYYY-MM-DD argument
pub fn parse_date_arg(value: &str, flag: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid {} date format (use YYYY-MM-DD)", flag))
}

/// The instant used to store an expense entered as a local calendar day
///
/// Midday local time, so the day survives conversion to UTC and back.
pub fn local_day_to_utc(day: NaiveDate) -> Result<DateTime<Utc>> {
    let midday = day.and_time(NaiveTime::from_hms_opt(12, 0, 0).context("Invalid time")?);
    let local = Local
        .from_local_datetime(&midday)
        .earliest()
        .with_context(|| format!("{} does not exist in the local time zone", midday))?;
    Ok(local.with_timezone(&Utc))
}

/// Resolve the reference instant for analytics (`--at`, or now in local time)
pub fn resolve_reference(at: Option<&str>) -> Result<DateTime<FixedOffset>> {
    match at {
        Some(s) => DateTime::parse_from_rfc3339(s)
            .context("Invalid --at timestamp (use RFC 3339, e.g. 2024-03-10T09:00:00+01:00)"),
        None => Ok(Local::now().fixed_offset()),
    }
}
