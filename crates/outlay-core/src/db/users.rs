//! User accounts
//!
//! Passwords are stored as Argon2id PHC strings with a per-user random salt.

use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use super::{format_timestamp, new_id, timestamp_column, Database};
use crate::error::{Error, Result};
use crate::models::User;

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 8;

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::PasswordHash(e.to_string()))?;
    Ok(hash.to_string())
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        created_at: timestamp_column(row, 3)?,
    })
}

impl Database {
    /// Register a user
    pub fn create_user(&self, email: &str, name: Option<&str>, password: &str) -> Result<User> {
        let email = email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(Error::InvalidData(format!("Invalid email '{}'", email)));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(Error::InvalidData(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        if self.get_user_by_email(&email)?.is_some() {
            return Err(Error::Conflict(format!("User {} already exists", email)));
        }

        let user = User {
            id: new_id(),
            email,
            name: name.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string),
            created_at: Utc::now(),
        };
        let password_hash = hash_password(password)?;

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO users (id, email, name, password_hash, created_at) VALUES (?, ?, ?, ?, ?)",
            params![
                user.id,
                user.email,
                user.name,
                password_hash,
                format_timestamp(&user.created_at)
            ],
        )?;

        Ok(user)
    }

    /// Look up a user by email (case-insensitive)
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                "SELECT id, email, name, created_at FROM users WHERE email = ?",
                params![email.trim()],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// List all users
    pub fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT id, email, name, created_at FROM users ORDER BY email")?;
        let users = stmt
            .query_map([], row_to_user)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(users)
    }

    /// Check a password, returning the user when it matches
    ///
    /// Unknown emails and wrong passwords both yield `Ok(None)`.
    pub fn verify_user_password(&self, email: &str, password: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let stored: Option<(User, String)> = conn
            .query_row(
                "SELECT id, email, name, created_at, password_hash FROM users WHERE email = ?",
                params![email.trim()],
                |row| Ok((row_to_user(row)?, row.get(4)?)),
            )
            .optional()?;

        let Some((user, password_hash)) = stored else {
            return Ok(None);
        };

        let parsed =
            PasswordHash::new(&password_hash).map_err(|e| Error::PasswordHash(e.to_string()))?;

        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
        {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }
}
