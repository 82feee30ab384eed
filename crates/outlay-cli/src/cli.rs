//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Outlay - Track where your money goes
#[derive(Parser)]
#[command(name = "outlay")]
#[command(about = "Self-hosted personal expense tracker", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "outlay.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set OUTLAY_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and seed default categories
    Init,

    /// Manage categories
    Categories {
        #[command(subcommand)]
        action: Option<CategoriesAction>,
    },

    /// Manage expenses
    Expenses {
        #[command(subcommand)]
        action: Option<ExpensesAction>,
    },

    /// Show spending totals with period-over-period change
    Summary {
        /// Reference instant (RFC 3339, e.g. 2024-03-10T09:00:00+01:00).
        /// Its UTC offset defines the calendar. Defaults to now in local time.
        #[arg(long)]
        at: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show spending per category
    Breakdown {
        /// Compute percentages against categorized spending only
        #[arg(long)]
        categorized_only: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Manage user accounts
    Users {
        #[command(subcommand)]
        action: Option<UsersAction>,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        ///
        /// WARNING: Do not use this flag when exposing the server to a network.
        /// By default, the server requires an identity header or API key.
        #[arg(long)]
        no_auth: bool,

        /// Directory containing static files to serve (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum CategoriesAction {
    /// List categories
    List,

    /// Add a new category
    Add {
        /// Category name
        name: String,
        /// Optional color (e.g., "#10b981")
        #[arg(long)]
        color: Option<String>,
        /// Optional icon key (e.g., "car")
        #[arg(long)]
        icon: Option<String>,
    },

    /// Delete a category
    Delete {
        /// Category ID
        id: String,
        /// Delete even if expenses use it (they become uncategorized)
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum ExpensesAction {
    /// List recent expenses
    List {
        /// Number of expenses to show
        #[arg(short, long, default_value = "20")]
        limit: i64,
        /// Only show expenses in this category (ID)
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Record an expense
    Add {
        /// Amount (e.g., 12.50)
        amount: String,
        /// Category ID
        #[arg(short, long)]
        category: Option<String>,
        /// Date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
        /// Optional description
        #[arg(long)]
        description: Option<String>,
    },

    /// Delete an expense
    Delete {
        /// Expense ID
        id: String,
    },
}

#[derive(Subcommand)]
pub enum UsersAction {
    /// List users
    List,

    /// Register a user
    Add {
        /// Email address
        email: String,
        /// Display name
        #[arg(long)]
        name: Option<String>,
        /// Password (at least 8 characters)
        #[arg(long)]
        password: String,
    },
}
