//! # Client Repository
//!
//! Owner-scoped CRUD and search for clients.
//!
//! The (user_id, tax_id) unique index is enforced here: inserting or
//! updating a client with another client's tax id surfaces as
//! [`DbError::UniqueViolation`], which the API maps to a conflict, not a
//! crash.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use miga_core::{Client, ClientInput};

/// Repository for client database operations.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    pool: SqlitePool,
}

impl ClientRepository {
    /// Creates a new ClientRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ClientRepository { pool }
    }

    /// Lists clients for an owner, newest first.
    ///
    /// `q` matches name, company or tax id, case-insensitively. Empty query
    /// returns everything (paged).
    ///
    /// ## Returns
    /// The requested page and the total count for the same filter.
    pub async fn list(
        &self,
        user_id: &str,
        q: &str,
        take: i64,
        skip: i64,
    ) -> DbResult<(Vec<Client>, i64)> {
        let pattern = like_pattern(q);

        debug!(user_id = %user_id, q = %q, take, skip, "Listing clients");

        let clients = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, user_id, name, company, tax_id, created_at, updated_at
            FROM clients
            WHERE user_id = ?1
              AND (
                LOWER(name) LIKE ?2
                OR LOWER(company) LIKE ?2
                OR LOWER(COALESCE(tax_id, '')) LIKE ?2
              )
            ORDER BY created_at DESC
            LIMIT ?3 OFFSET ?4
            "#,
        )
        .bind(user_id)
        .bind(&pattern)
        .bind(take)
        .bind(skip)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM clients
            WHERE user_id = ?1
              AND (
                LOWER(name) LIKE ?2
                OR LOWER(company) LIKE ?2
                OR LOWER(COALESCE(tax_id, '')) LIKE ?2
              )
            "#,
        )
        .bind(user_id)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok((clients, total))
    }

    /// Gets a client by id, scoped to its owner.
    pub async fn get_by_id(&self, user_id: &str, id: &str) -> DbResult<Option<Client>> {
        let client = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, user_id, name, company, tax_id, created_at, updated_at
            FROM clients
            WHERE id = ?1 AND user_id = ?2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(client)
    }

    /// Inserts a new client for an owner.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - tax id already used by this owner
    pub async fn insert(&self, user_id: &str, input: &ClientInput) -> DbResult<Client> {
        let now = Utc::now();
        let client = Client {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: input.name.trim().to_string(),
            company: input.company.trim().to_string(),
            tax_id: normalize_tax_id(&input.tax_id),
            created_at: now,
            updated_at: now,
        };

        debug!(id = %client.id, user_id = %user_id, "Inserting client");

        sqlx::query(
            r#"
            INSERT INTO clients (id, user_id, name, company, tax_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&client.id)
        .bind(&client.user_id)
        .bind(&client.name)
        .bind(&client.company)
        .bind(&client.tax_id)
        .bind(client.created_at)
        .bind(client.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(client)
    }

    /// Updates a client, scoped to its owner.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - no such client for this owner
    /// * `Err(DbError::UniqueViolation)` - tax id already used by this owner
    pub async fn update(&self, user_id: &str, id: &str, input: &ClientInput) -> DbResult<Client> {
        let now = Utc::now();
        let tax_id = normalize_tax_id(&input.tax_id);

        debug!(id = %id, user_id = %user_id, "Updating client");

        let result = sqlx::query(
            r#"
            UPDATE clients SET
                name = ?3,
                company = ?4,
                tax_id = ?5,
                updated_at = ?6
            WHERE id = ?1 AND user_id = ?2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(input.name.trim())
        .bind(input.company.trim())
        .bind(&tax_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Client", id));
        }

        self.get_by_id(user_id, id)
            .await?
            .ok_or_else(|| DbError::not_found("Client", id))
    }

    /// Deletes a client, scoped to its owner.
    ///
    /// Proformas referencing it keep their snapshot; their `client_id`
    /// becomes NULL (weak reference).
    pub async fn delete(&self, user_id: &str, id: &str) -> DbResult<()> {
        debug!(id = %id, user_id = %user_id, "Deleting client");

        let result = sqlx::query("DELETE FROM clients WHERE id = ?1 AND user_id = ?2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Client", id));
        }

        Ok(())
    }
}

/// Case-insensitive LIKE pattern for a search query. An empty query matches
/// every row.
pub(crate) fn like_pattern(q: &str) -> String {
    let q = q.trim().to_lowercase();
    if q.is_empty() {
        "%".to_string()
    } else {
        format!("%{q}%")
    }
}

/// Empty tax ids are stored as NULL so the per-owner unique index ignores
/// them.
fn normalize_tax_id(tax_id: &Option<String>) -> Option<String> {
    tax_id
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern() {
        assert_eq!(like_pattern(""), "%");
        assert_eq!(like_pattern("  "), "%");
        assert_eq!(like_pattern("Cafetal"), "%cafetal%");
    }

    #[test]
    fn test_normalize_tax_id() {
        assert_eq!(normalize_tax_id(&None), None);
        assert_eq!(normalize_tax_id(&Some("".to_string())), None);
        assert_eq!(normalize_tax_id(&Some("  ".to_string())), None);
        assert_eq!(
            normalize_tax_id(&Some(" 3-101-1 ".to_string())),
            Some("3-101-1".to_string())
        );
    }
}
