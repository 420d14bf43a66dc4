//! # Menu Item Repository
//!
//! Owner-scoped CRUD for the product menu. Menu items have an independent
//! lifecycle: proforma line items are free text and never reference them.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::client::like_pattern;
use miga_core::{MenuCategory, MenuItem, MenuItemInput};

/// Repository for menu item database operations.
#[derive(Debug, Clone)]
pub struct MenuItemRepository {
    pool: SqlitePool,
}

impl MenuItemRepository {
    /// Creates a new MenuItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MenuItemRepository { pool }
    }

    /// Lists menu items for an owner, newest first.
    ///
    /// `q` matches the name case-insensitively; `category` narrows to one
    /// menu section when given.
    pub async fn list(
        &self,
        user_id: &str,
        q: &str,
        category: Option<MenuCategory>,
        take: i64,
        skip: i64,
    ) -> DbResult<(Vec<MenuItem>, i64)> {
        let pattern = like_pattern(q);
        // Empty sentinel disables the category filter inside a single query
        let category = category.map(|c| c.as_str()).unwrap_or("");

        debug!(user_id = %user_id, q = %q, category = %category, "Listing menu items");

        let items = sqlx::query_as::<_, MenuItem>(
            r#"
            SELECT id, user_id, category, name, description, price_cents,
                   created_at, updated_at
            FROM menu_items
            WHERE user_id = ?1
              AND (?2 = '' OR category = ?2)
              AND LOWER(name) LIKE ?3
            ORDER BY created_at DESC
            LIMIT ?4 OFFSET ?5
            "#,
        )
        .bind(user_id)
        .bind(category)
        .bind(&pattern)
        .bind(take)
        .bind(skip)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM menu_items
            WHERE user_id = ?1
              AND (?2 = '' OR category = ?2)
              AND LOWER(name) LIKE ?3
            "#,
        )
        .bind(user_id)
        .bind(category)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok((items, total))
    }

    /// Gets a menu item by id, scoped to its owner.
    pub async fn get_by_id(&self, user_id: &str, id: &str) -> DbResult<Option<MenuItem>> {
        let item = sqlx::query_as::<_, MenuItem>(
            r#"
            SELECT id, user_id, category, name, description, price_cents,
                   created_at, updated_at
            FROM menu_items
            WHERE id = ?1 AND user_id = ?2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Inserts a new menu item for an owner.
    pub async fn insert(&self, user_id: &str, input: &MenuItemInput) -> DbResult<MenuItem> {
        let now = Utc::now();
        let item = MenuItem {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            category: input.category,
            name: input.name.trim().to_string(),
            description: input.description.clone(),
            price_cents: input.price_cents,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %item.id, category = %item.category.as_str(), "Inserting menu item");

        sqlx::query(
            r#"
            INSERT INTO menu_items (id, user_id, category, name, description,
                                    price_cents, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&item.id)
        .bind(&item.user_id)
        .bind(item.category)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price_cents)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(item)
    }

    /// Updates a menu item, scoped to its owner.
    pub async fn update(
        &self,
        user_id: &str,
        id: &str,
        input: &MenuItemInput,
    ) -> DbResult<MenuItem> {
        let now = Utc::now();

        debug!(id = %id, user_id = %user_id, "Updating menu item");

        let result = sqlx::query(
            r#"
            UPDATE menu_items SET
                category = ?3,
                name = ?4,
                description = ?5,
                price_cents = ?6,
                updated_at = ?7
            WHERE id = ?1 AND user_id = ?2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(input.category)
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.price_cents)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("MenuItem", id));
        }

        self.get_by_id(user_id, id)
            .await?
            .ok_or_else(|| DbError::not_found("MenuItem", id))
    }

    /// Deletes a menu item, scoped to its owner.
    pub async fn delete(&self, user_id: &str, id: &str) -> DbResult<()> {
        debug!(id = %id, user_id = %user_id, "Deleting menu item");

        let result = sqlx::query("DELETE FROM menu_items WHERE id = ?1 AND user_id = ?2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("MenuItem", id));
        }

        Ok(())
    }
}
