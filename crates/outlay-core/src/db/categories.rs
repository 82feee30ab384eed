//! Category operations

use rusqlite::{params, OptionalExtension};
use tracing::info;

use super::{new_id, Database, DbConn};
use crate::error::{Error, Result};
use crate::models::{
    Category, CategoryUpdate, DeleteCategoryResult, NewCategory, DEFAULT_CATEGORIES,
    DEFAULT_CATEGORY_COLOR, DEFAULT_CATEGORY_ICON,
};

/// Check that a color is `#rgb` or `#rrggbb`
fn validate_color(color: &str) -> Result<()> {
    let valid = color
        .strip_prefix('#')
        .map(|hex| {
            (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
        })
        .unwrap_or(false);

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidData(format!(
            "Invalid color '{}': expected #rgb or #rrggbb",
            color
        )))
    }
}

fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidData("Category name cannot be empty".to_string()));
    }
    Ok(trimmed.to_string())
}

fn row_to_category(row: &rusqlite::Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
        icon: row.get(3)?,
    })
}

impl Database {
    /// Seed the default categories (idempotent - skips ids or names already present)
    ///
    /// Returns the number of categories inserted.
    pub fn seed_default_categories(&self) -> Result<usize> {
        let conn = self.conn()?;
        let mut inserted = 0;

        for (id, name, color, icon) in DEFAULT_CATEGORIES {
            inserted += conn.execute(
                "INSERT OR IGNORE INTO categories (id, name, color, icon) VALUES (?, ?, ?, ?)",
                params![id, name, color, icon],
            )?;
        }

        if inserted > 0 {
            info!(inserted, "Seeded default categories");
        }
        Ok(inserted)
    }

    /// Create a new category
    pub fn create_category(&self, new: &NewCategory) -> Result<Category> {
        let name = validate_name(&new.name)?;
        let color = new
            .color
            .as_deref()
            .unwrap_or(DEFAULT_CATEGORY_COLOR)
            .to_string();
        validate_color(&color)?;
        let icon = new
            .icon
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_CATEGORY_ICON)
            .to_string();

        let conn = self.conn()?;
        ensure_name_available(&conn, &name, None)?;

        let category = Category {
            id: new_id(),
            name,
            color,
            icon,
        };

        conn.execute(
            "INSERT INTO categories (id, name, color, icon) VALUES (?, ?, ?, ?)",
            params![category.id, category.name, category.color, category.icon],
        )?;

        Ok(category)
    }

    /// Get a category by ID
    pub fn get_category(&self, id: &str) -> Result<Option<Category>> {
        let conn = self.conn()?;
        get_category_with_conn(&conn, id)
    }

    /// List all categories, by name
    pub fn list_categories(&self) -> Result<Vec<Category>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT id, name, color, icon FROM categories ORDER BY name COLLATE NOCASE")?;

        let categories = stmt
            .query_map([], row_to_category)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    /// Apply a partial update and return the updated category
    pub fn update_category(&self, id: &str, update: &CategoryUpdate) -> Result<Category> {
        let conn = self.conn()?;

        let mut category = get_category_with_conn(&conn, id)?
            .ok_or_else(|| Error::NotFound(format!("Category {}", id)))?;

        if let Some(name) = &update.name {
            let name = validate_name(name)?;
            ensure_name_available(&conn, &name, Some(id))?;
            category.name = name;
        }
        if let Some(color) = &update.color {
            validate_color(color)?;
            category.color = color.clone();
        }
        if let Some(icon) = &update.icon {
            let icon = icon.trim();
            if icon.is_empty() {
                return Err(Error::InvalidData("Category icon cannot be empty".to_string()));
            }
            category.icon = icon.to_string();
        }

        conn.execute(
            "UPDATE categories SET name = ?, color = ?, icon = ? WHERE id = ?",
            params![category.name, category.color, category.icon, id],
        )?;

        Ok(category)
    }

    /// Count expenses referencing a category
    pub fn count_expenses_in_category(&self, id: &str) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM expenses WHERE category_id = ?",
            params![id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Delete a category
    ///
    /// A category that still has expenses is only deleted with `force`, in
    /// which case those expenses become uncategorized.
    pub fn delete_category(&self, id: &str, force: bool) -> Result<DeleteCategoryResult> {
        let mut conn = self.conn()?;

        if get_category_with_conn(&conn, id)?.is_none() {
            return Err(Error::NotFound(format!("Category {}", id)));
        }

        let in_use: i64 = conn.query_row(
            "SELECT COUNT(*) FROM expenses WHERE category_id = ?",
            params![id],
            |row| row.get(0),
        )?;

        if in_use > 0 && !force {
            return Err(Error::Conflict(format!(
                "Category {} is used by {} expense(s)",
                id, in_use
            )));
        }

        let tx = conn.transaction()?;
        let expenses_uncategorized = tx.execute(
            "UPDATE expenses SET category_id = NULL WHERE category_id = ?",
            params![id],
        )? as i64;
        tx.execute("DELETE FROM categories WHERE id = ?", params![id])?;
        tx.commit()?;

        info!(category = id, expenses_uncategorized, "Deleted category");

        Ok(DeleteCategoryResult {
            deleted: true,
            expenses_uncategorized,
        })
    }
}

/// Get a category using an existing connection (avoids a second pool checkout)
pub(crate) fn get_category_with_conn(conn: &DbConn, id: &str) -> Result<Option<Category>> {
    let category = conn
        .query_row(
            "SELECT id, name, color, icon FROM categories WHERE id = ?",
            params![id],
            row_to_category,
        )
        .optional()?;
    Ok(category)
}

fn ensure_name_available(conn: &DbConn, name: &str, except_id: Option<&str>) -> Result<()> {
    let taken: bool = conn
        .query_row(
            "SELECT 1 FROM categories WHERE name = ? COLLATE NOCASE AND id IS NOT ?",
            params![name, except_id],
            |_| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if taken {
        return Err(Error::Conflict(format!(
            "A category named '{}' already exists",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_color() {
        assert!(validate_color("#fff").is_ok());
        assert!(validate_color("#4f46E5").is_ok());
        assert!(validate_color("4f46e5").is_err());
        assert!(validate_color("#12345").is_err());
        assert!(validate_color("#ggg").is_err());
    }
}
