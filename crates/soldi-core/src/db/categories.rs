//! Category and subcategory operations

use rusqlite::params;

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Category, Subcategory};

impl Database {
    /// Create a category, optionally with initial subcategories
    pub fn create_category(
        &self,
        user_id: i64,
        name: &str,
        subcategories: &[String],
    ) -> Result<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidData("Category name cannot be empty".into()));
        }

        let conn = self.conn()?;
        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM categories WHERE user_id = ? AND name = ?",
                params![user_id, name],
                |row| row.get(0),
            )
            .ok();
        if existing.is_some() {
            return Err(Error::InvalidData(format!(
                "A category named '{}' already exists",
                name
            )));
        }

        conn.execute(
            "INSERT INTO categories (user_id, name) VALUES (?, ?)",
            params![user_id, name],
        )?;
        let id = conn.last_insert_rowid();

        for sub in subcategories {
            let sub = sub.trim();
            if sub.is_empty() {
                continue;
            }
            conn.execute(
                "INSERT OR IGNORE INTO subcategories (category_id, name) VALUES (?, ?)",
                params![id, sub],
            )?;
        }
        drop(conn);

        self.get_category(user_id, id)?
            .ok_or_else(|| Error::NotFound(format!("Category {}", id)))
    }

    /// List a user's categories with their subcategories
    pub fn list_categories(&self, user_id: i64) -> Result<Vec<Category>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, name, created_at FROM categories
             WHERE user_id = ? ORDER BY name",
        )?;

        let mut categories = stmt
            .query_map(params![user_id], |row| {
                let created_at_str: String = row.get(3)?;
                Ok(Category {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    name: row.get(2)?,
                    subcategories: Vec::new(),
                    created_at: parse_datetime(&created_at_str),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for category in &mut categories {
            category.subcategories = self.list_subcategories(category.id)?;
        }

        Ok(categories)
    }

    pub fn get_category(&self, user_id: i64, id: i64) -> Result<Option<Category>> {
        let conn = self.conn()?;
        let category = conn
            .query_row(
                "SELECT id, user_id, name, created_at FROM categories
                 WHERE user_id = ? AND id = ?",
                params![user_id, id],
                |row| {
                    let created_at_str: String = row.get(3)?;
                    Ok(Category {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        name: row.get(2)?,
                        subcategories: Vec::new(),
                        created_at: parse_datetime(&created_at_str),
                    })
                },
            )
            .ok();

        match category {
            Some(mut category) => {
                category.subcategories = self.list_subcategories(category.id)?;
                Ok(Some(category))
            }
            None => Ok(None),
        }
    }

    /// Delete a category and its subcategories. Transactions that pointed
    /// at it keep their category_id, lookups simply stop resolving.
    pub fn delete_category(&self, user_id: i64, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM categories WHERE user_id = ? AND id = ?",
            params![user_id, id],
        )?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("Category {}", id)));
        }
        Ok(())
    }

    /// Add a subcategory under a user's category
    pub fn add_subcategory(&self, user_id: i64, category_id: i64, name: &str) -> Result<Subcategory> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidData(
                "Subcategory name cannot be empty".into(),
            ));
        }
        if self.get_category(user_id, category_id)?.is_none() {
            return Err(Error::NotFound(format!("Category {}", category_id)));
        }

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO subcategories (category_id, name) VALUES (?, ?)",
            params![category_id, name],
        )?;
        let id = conn.last_insert_rowid();

        Ok(Subcategory {
            id,
            category_id,
            name: name.to_string(),
        })
    }

    pub fn delete_subcategory(&self, user_id: i64, category_id: i64, id: i64) -> Result<()> {
        if self.get_category(user_id, category_id)?.is_none() {
            return Err(Error::NotFound(format!("Category {}", category_id)));
        }
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM subcategories WHERE category_id = ? AND id = ?",
            params![category_id, id],
        )?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("Subcategory {}", id)));
        }
        Ok(())
    }

    pub(crate) fn list_subcategories(&self, category_id: i64) -> Result<Vec<Subcategory>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, category_id, name FROM subcategories
             WHERE category_id = ? ORDER BY name",
        )?;
        let subcategories = stmt
            .query_map(params![category_id], |row| {
                Ok(Subcategory {
                    id: row.get(0)?,
                    category_id: row.get(1)?,
                    name: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(subcategories)
    }

    pub(crate) fn subcategory_belongs_to(&self, category_id: i64, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let found: Option<i64> = conn
            .query_row(
                "SELECT id FROM subcategories WHERE category_id = ? AND id = ?",
                params![category_id, id],
                |row| row.get(0),
            )
            .ok();
        Ok(found.is_some())
    }
}
