//! Outlay Core Library
//!
//! Shared functionality for the Outlay expense tracker:
//! - Domain models for categories, expenses and users
//! - Expense analytics (period summaries, category breakdown)
//! - Database access, migrations and audit logging

pub mod analytics;
pub mod db;
pub mod error;
pub mod models;

pub use analytics::{
    calculate_change, compute_category_breakdown, compute_summary, parse_amount, SummaryWindows,
};
pub use db::{AuditEntry, Database};
pub use error::{Error, Result};
