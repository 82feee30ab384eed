//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};

use super::open_db;

/// Environment variable with comma-separated API keys
const API_KEYS_ENV: &str = "OUTLAY_API_KEYS";

/// Environment variable with comma-separated allowed CORS origins
const ALLOWED_ORIGINS_ENV: &str = "OUTLAY_ALLOWED_ORIGINS";

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    no_auth: bool,
    no_encrypt: bool,
    static_dir: Option<&Path>,
) -> Result<()> {
    println!("🚀 Starting Outlay web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }

    let api_keys = outlay_server::parse_list(&std::env::var(API_KEYS_ENV).unwrap_or_default());
    let allowed_origins =
        outlay_server::parse_list(&std::env::var(ALLOWED_ORIGINS_ENV).unwrap_or_default());

    if no_auth {
        println!();
        println!("   ⚠️  Authentication DISABLED - do not expose to network!");
    } else {
        println!(
            "   🔒 Authentication: identity header ({})",
            outlay_server::USER_HEADER
        );
        if !api_keys.is_empty() {
            println!(
                "   🔑 API keys: {} configured ({})",
                api_keys.len(),
                API_KEYS_ENV
            );
        }
    }
    if !allowed_origins.is_empty() {
        println!(
            "   🌐 Allowed origins: {} ({})",
            allowed_origins.join(", "),
            ALLOWED_ORIGINS_ENV
        );
    }
    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path, no_encrypt)?;

    // Ensure default categories exist (idempotent)
    db.seed_default_categories()
        .context("Failed to seed default categories")?;

    let config = outlay_server::ServerConfig {
        require_auth: !no_auth,
        allowed_origins,
        api_keys,
    };

    let static_dir_str = static_dir
        .map(|p| p.to_str().context("Static directory path must be valid UTF-8"))
        .transpose()?;
    outlay_server::serve_with_config(db, host, port, static_dir_str, config).await?;

    Ok(())
}
