//! Outlay CLI - Personal expense tracker
//!
//! Usage:
//!   outlay init                     Initialize database
//!   outlay expenses add 12.50 -c food
//!   outlay summary                  Spending totals and change
//!   outlay breakdown                Spending per category
//!   outlay serve --port 3000        Start web server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Categories { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(CategoriesAction::List) => commands::cmd_categories_list(&db),
                Some(CategoriesAction::Add { name, color, icon }) => {
                    commands::cmd_categories_add(&db, &name, color.as_deref(), icon.as_deref())
                }
                Some(CategoriesAction::Delete { id, force }) => {
                    commands::cmd_categories_delete(&db, &id, force)
                }
            }
        }
        Commands::Expenses { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_expenses_list(&db, 20, None),
                Some(ExpensesAction::List { limit, category }) => {
                    commands::cmd_expenses_list(&db, limit, category.as_deref())
                }
                Some(ExpensesAction::Add {
                    amount,
                    category,
                    date,
                    description,
                }) => commands::cmd_expenses_add(
                    &db,
                    &amount,
                    category.as_deref(),
                    date.as_deref(),
                    description.as_deref(),
                ),
                Some(ExpensesAction::Delete { id }) => commands::cmd_expenses_delete(&db, &id),
            }
        }
        Commands::Summary { at, json } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let reference = commands::resolve_reference(at.as_deref())?;
            commands::cmd_summary(&db, &reference, json)
        }
        Commands::Breakdown {
            categorized_only,
            json,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_breakdown(&db, categorized_only, json)
        }
        Commands::Users { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(UsersAction::List) => commands::cmd_users_list(&db),
                Some(UsersAction::Add {
                    email,
                    name,
                    password,
                }) => commands::cmd_users_add(&db, &email, name.as_deref(), &password),
            }
        }
        Commands::Serve {
            port,
            host,
            no_auth,
            static_dir,
        } => {
            commands::cmd_serve(
                &cli.db,
                &host,
                port,
                no_auth,
                cli.no_encrypt,
                static_dir.as_deref(),
            )
            .await
        }
    }
}
