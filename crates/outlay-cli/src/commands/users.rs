//! User account command implementations

use anyhow::Result;
use outlay_core::db::Database;

pub fn cmd_users_list(db: &Database) -> Result<()> {
    let users = db.list_users()?;

    if users.is_empty() {
        println!("No users found. Add one with:");
        println!("  outlay users add you@example.com --password '...'");
        return Ok(());
    }

    println!();
    println!("👤 Users");
    println!("   ─────────────────────────────");
    for user in &users {
        match &user.name {
            Some(name) => println!("   • {} ({})", user.email, name),
            None => println!("   • {}", user.email),
        }
    }

    Ok(())
}

pub fn cmd_users_add(
    db: &Database,
    email: &str,
    name: Option<&str>,
    password: &str,
) -> Result<()> {
    let user = db.create_user(email, name, password)?;
    println!("✅ Created user {} (id: {})", user.email, user.id);
    Ok(())
}
