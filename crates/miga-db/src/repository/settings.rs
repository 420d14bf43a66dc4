//! # Company Settings Repository
//!
//! One row per user, created lazily on first write.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use miga_core::{CompanySettings, CompanySettingsInput};

/// Repository for company settings.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    /// Creates a new SettingsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Gets the settings row for an owner, if one exists yet.
    pub async fn get(&self, user_id: &str) -> DbResult<Option<CompanySettings>> {
        let settings = sqlx::query_as::<_, CompanySettings>(
            r#"
            SELECT id, user_id, name, contact_name, tax_id, address, phone,
                   email, logo_url, created_at, updated_at
            FROM company_settings
            WHERE user_id = ?1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(settings)
    }

    /// Creates or updates the settings row for an owner.
    ///
    /// Upsert semantics: the first write creates the row, later writes
    /// update it in place. The caller passes normalized input (blank
    /// optionals already mapped to None).
    pub async fn upsert(
        &self,
        user_id: &str,
        input: &CompanySettingsInput,
    ) -> DbResult<CompanySettings> {
        let now = Utc::now();
        let id = Uuid::new_v4().to_string();

        debug!(user_id = %user_id, "Upserting company settings");

        sqlx::query(
            r#"
            INSERT INTO company_settings (id, user_id, name, contact_name, tax_id,
                                          address, phone, email, logo_url,
                                          created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
            ON CONFLICT (user_id) DO UPDATE SET
                name = excluded.name,
                contact_name = excluded.contact_name,
                tax_id = excluded.tax_id,
                address = excluded.address,
                phone = excluded.phone,
                email = excluded.email,
                logo_url = excluded.logo_url,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(&input.name)
        .bind(&input.contact_name)
        .bind(&input.tax_id)
        .bind(&input.address)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.logo_url)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get(user_id)
            .await?
            .ok_or_else(|| DbError::Internal("settings row missing after upsert".to_string()))
    }
}
