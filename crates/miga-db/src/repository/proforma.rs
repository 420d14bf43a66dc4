//! # Proforma Repository
//!
//! The document service: transactional composition of a proforma and its
//! line items.
//!
//! ## Document Lifecycle
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                      Proforma Lifecycle                            │
//! │                                                                    │
//! │  1. CREATE                                                         │
//! │     └── create() → totals + year/sequence/number + row + items,    │
//! │         one transaction, status defaults to DRAFT                  │
//! │                                                                    │
//! │  2. UPDATE (full replacement)                                      │
//! │     └── update() → delete all items, recompute totals, update      │
//! │         row, insert new items - one transaction.                   │
//! │         year/sequence/number never change after creation           │
//! │                                                                    │
//! │  3. DUPLICATE                                                      │
//! │     └── duplicate() → new identity + fresh number for the          │
//! │         CURRENT year, items and snapshot copied verbatim           │
//! │                                                                    │
//! │  4. DELETE                                                         │
//! │     └── delete() → cascades to items                               │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Sequence Allocation
//! The next sequence for (owner, year) is `MAX(sequence) + 1`, read inside
//! the same transaction as the insert. The UNIQUE(user_id, year, sequence)
//! index serializes concurrent allocations: the losing writer's commit
//! fails and the whole operation is retried with a fresh read, up to
//! [`MAX_ALLOCATION_ATTEMPTS`] times.

use chrono::{DateTime, Datelike, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::client::like_pattern;
use miga_core::numbering::{format_number, next_sequence};
use miga_core::totals::calculate_totals;
use miga_core::{
    Proforma, ProformaInput, ProformaItem, ProformaItemInput, ProformaStatus, ProformaWithItems,
};

/// How many times an allocation collision is retried before the operation
/// surfaces as a conflict. Each retry re-reads MAX(sequence), so a burst of
/// K concurrent creations needs at most K attempts for the last writer.
pub const MAX_ALLOCATION_ATTEMPTS: u32 = 10;

const PROFORMA_COLUMNS: &str = r#"
    id, user_id, client_id, client_name, client_company, client_tax_id,
    status, discount_cents, notes, subtotal_cents, total_cents,
    year, sequence, number, created_at, updated_at
"#;

/// Repository for proforma database operations.
#[derive(Debug, Clone)]
pub struct ProformaRepository {
    pool: SqlitePool,
}

impl ProformaRepository {
    /// Creates a new ProformaRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProformaRepository { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Lists proformas for an owner, newest first, with their items.
    ///
    /// `q` matches the document number, the client name or the client
    /// company, case-insensitively.
    pub async fn list(
        &self,
        user_id: &str,
        q: &str,
        take: i64,
        skip: i64,
    ) -> DbResult<(Vec<ProformaWithItems>, i64)> {
        let pattern = like_pattern(q);

        debug!(user_id = %user_id, q = %q, take, skip, "Listing proformas");

        let proformas = sqlx::query_as::<_, Proforma>(&format!(
            r#"
            SELECT {PROFORMA_COLUMNS}
            FROM proformas
            WHERE user_id = ?1
              AND (
                LOWER(number) LIKE ?2
                OR LOWER(client_name) LIKE ?2
                OR LOWER(client_company) LIKE ?2
              )
            ORDER BY created_at DESC
            LIMIT ?3 OFFSET ?4
            "#
        ))
        .bind(user_id)
        .bind(&pattern)
        .bind(take)
        .bind(skip)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM proformas
            WHERE user_id = ?1
              AND (
                LOWER(number) LIKE ?2
                OR LOWER(client_name) LIKE ?2
                OR LOWER(client_company) LIKE ?2
              )
            "#,
        )
        .bind(user_id)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let mut documents = Vec::with_capacity(proformas.len());
        for proforma in proformas {
            let items = self.items_for(&proforma.id).await?;
            documents.push(ProformaWithItems { proforma, items });
        }

        Ok((documents, total))
    }

    /// Gets a proforma with its items, scoped to its owner.
    pub async fn get_with_items(
        &self,
        user_id: &str,
        id: &str,
    ) -> DbResult<Option<ProformaWithItems>> {
        let proforma = sqlx::query_as::<_, Proforma>(&format!(
            r#"
            SELECT {PROFORMA_COLUMNS}
            FROM proformas
            WHERE id = ?1 AND user_id = ?2
            "#
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(proforma) = proforma else {
            return Ok(None);
        };

        let items = self.items_for(&proforma.id).await?;
        Ok(Some(ProformaWithItems { proforma, items }))
    }

    /// Gets a proforma by id alone - no owner scoping.
    ///
    /// Only for the tokenized print view, which authenticates with an HMAC
    /// bound to (owner, document) instead of a session. Everything else goes
    /// through [`ProformaRepository::get_with_items`].
    pub async fn get_unscoped(&self, id: &str) -> DbResult<Option<ProformaWithItems>> {
        let proforma = sqlx::query_as::<_, Proforma>(&format!(
            r#"
            SELECT {PROFORMA_COLUMNS}
            FROM proformas
            WHERE id = ?1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(proforma) = proforma else {
            return Ok(None);
        };

        let items = self.items_for(&proforma.id).await?;
        Ok(Some(ProformaWithItems { proforma, items }))
    }

    // =========================================================================
    // Create
    // =========================================================================

    /// Creates a proforma with its items as one atomic unit.
    ///
    /// - Validates that `client_id`, when given, belongs to the owner
    ///   ([`DbError::InvalidReference`] otherwise)
    /// - Computes totals from the items and discount
    /// - Allocates year/sequence/number for the current calendar year
    /// - Status defaults to DRAFT when unspecified
    pub async fn create(&self, user_id: &str, input: &ProformaInput) -> DbResult<ProformaWithItems> {
        self.ensure_client_reference(user_id, input.client_id.as_deref())
            .await?;

        let year = current_year();
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.try_create(user_id, input, year).await {
                Err(err) if err.is_allocation_conflict() => {
                    if attempt >= MAX_ALLOCATION_ATTEMPTS {
                        warn!(
                            user_id = %user_id,
                            year,
                            attempt,
                            "Sequence allocation retries exhausted"
                        );
                        return Err(DbError::AllocationExhausted { attempts: attempt });
                    }
                    debug!(user_id = %user_id, year, attempt, "Sequence collision, retrying");
                }
                Ok(document) => {
                    info!(
                        id = %document.proforma.id,
                        number = %document.proforma.number,
                        total_cents = document.proforma.total_cents,
                        "Proforma created"
                    );
                    return Ok(document);
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn try_create(
        &self,
        user_id: &str,
        input: &ProformaInput,
        year: i64,
    ) -> DbResult<ProformaWithItems> {
        let mut tx = self.pool.begin().await?;

        let (sequence, number) = allocate_number(&mut tx, user_id, year).await?;
        let totals = calculate_totals(&input.items, Some(input.discount()));
        let now = Utc::now();

        let proforma = Proforma {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            client_id: input.client_id.clone(),
            client_name: input.client_name.trim().to_string(),
            client_company: input.client_company.trim().to_string(),
            client_tax_id: input.client_tax_id.clone(),
            status: ProformaStatus::default().apply(input.status),
            discount_cents: input.discount_cents,
            notes: input.notes.clone(),
            subtotal_cents: totals.subtotal.cents(),
            total_cents: totals.total.cents(),
            year,
            sequence,
            number,
            created_at: now,
            updated_at: now,
        };

        insert_proforma_row(&mut tx, &proforma).await?;
        let items = insert_items(&mut tx, &proforma.id, &input.items, now).await?;

        tx.commit().await?;

        Ok(ProformaWithItems { proforma, items })
    }

    // =========================================================================
    // Update
    // =========================================================================

    /// Updates a proforma in place, replacing the entire item collection.
    ///
    /// Item deletion, the parent row update and the new inserts share one
    /// transaction - a partial result is never observable. The allocation
    /// coordinates (year/sequence/number) are immutable and never touched.
    pub async fn update(
        &self,
        user_id: &str,
        id: &str,
        input: &ProformaInput,
    ) -> DbResult<ProformaWithItems> {
        self.ensure_client_reference(user_id, input.client_id.as_deref())
            .await?;

        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, Proforma>(&format!(
            r#"
            SELECT {PROFORMA_COLUMNS}
            FROM proformas
            WHERE id = ?1 AND user_id = ?2
            "#
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Proforma", id))?;

        let totals = calculate_totals(&input.items, Some(input.discount()));
        let status = existing.status.apply(input.status);
        let now = Utc::now();

        sqlx::query("DELETE FROM proforma_items WHERE proforma_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE proformas SET
                client_id = ?3,
                client_name = ?4,
                client_company = ?5,
                client_tax_id = ?6,
                status = ?7,
                discount_cents = ?8,
                notes = ?9,
                subtotal_cents = ?10,
                total_cents = ?11,
                updated_at = ?12
            WHERE id = ?1 AND user_id = ?2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&input.client_id)
        .bind(input.client_name.trim())
        .bind(input.client_company.trim())
        .bind(&input.client_tax_id)
        .bind(status)
        .bind(input.discount_cents)
        .bind(&input.notes)
        .bind(totals.subtotal.cents())
        .bind(totals.total.cents())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let items = insert_items(&mut tx, id, &input.items, now).await?;

        tx.commit().await?;

        info!(id = %id, number = %existing.number, "Proforma updated");

        let proforma = Proforma {
            client_id: input.client_id.clone(),
            client_name: input.client_name.trim().to_string(),
            client_company: input.client_company.trim().to_string(),
            client_tax_id: input.client_tax_id.clone(),
            status,
            discount_cents: input.discount_cents,
            notes: input.notes.clone(),
            subtotal_cents: totals.subtotal.cents(),
            total_cents: totals.total.cents(),
            updated_at: now,
            ..existing
        };

        Ok(ProformaWithItems { proforma, items })
    }

    // =========================================================================
    // Duplicate
    // =========================================================================

    /// Duplicates a proforma into a new document.
    ///
    /// The copy gets a new identity and a fresh year/sequence/number for the
    /// *current* calendar year - never the source's original year, even when
    /// they coincide. Client snapshot, discount, notes, totals, status and
    /// items are copied verbatim.
    pub async fn duplicate(&self, user_id: &str, id: &str) -> DbResult<ProformaWithItems> {
        let source = self
            .get_with_items(user_id, id)
            .await?
            .ok_or_else(|| DbError::not_found("Proforma", id))?;

        let year = current_year();
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.try_duplicate(user_id, &source, year).await {
                Err(err) if err.is_allocation_conflict() => {
                    if attempt >= MAX_ALLOCATION_ATTEMPTS {
                        warn!(
                            user_id = %user_id,
                            year,
                            attempt,
                            "Sequence allocation retries exhausted"
                        );
                        return Err(DbError::AllocationExhausted { attempts: attempt });
                    }
                    debug!(user_id = %user_id, year, attempt, "Sequence collision, retrying");
                }
                Ok(document) => {
                    info!(
                        source = %id,
                        id = %document.proforma.id,
                        number = %document.proforma.number,
                        "Proforma duplicated"
                    );
                    return Ok(document);
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn try_duplicate(
        &self,
        user_id: &str,
        source: &ProformaWithItems,
        year: i64,
    ) -> DbResult<ProformaWithItems> {
        let mut tx = self.pool.begin().await?;

        let (sequence, number) = allocate_number(&mut tx, user_id, year).await?;
        let now = Utc::now();

        let proforma = Proforma {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            client_id: source.proforma.client_id.clone(),
            client_name: source.proforma.client_name.clone(),
            client_company: source.proforma.client_company.clone(),
            client_tax_id: source.proforma.client_tax_id.clone(),
            status: source.proforma.status,
            discount_cents: source.proforma.discount_cents,
            notes: source.proforma.notes.clone(),
            subtotal_cents: source.proforma.subtotal_cents,
            total_cents: source.proforma.total_cents,
            year,
            sequence,
            number,
            created_at: now,
            updated_at: now,
        };

        let item_inputs: Vec<ProformaItemInput> = source
            .items
            .iter()
            .map(|item| ProformaItemInput {
                description: item.description.clone(),
                quantity: item.quantity,
                unit_price_cents: item.unit_price_cents,
            })
            .collect();

        insert_proforma_row(&mut tx, &proforma).await?;
        let items = insert_items(&mut tx, &proforma.id, &item_inputs, now).await?;

        tx.commit().await?;

        Ok(ProformaWithItems { proforma, items })
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// Deletes a proforma, scoped to its owner. Items cascade with it.
    pub async fn delete(&self, user_id: &str, id: &str) -> DbResult<()> {
        debug!(id = %id, user_id = %user_id, "Deleting proforma");

        let result = sqlx::query("DELETE FROM proformas WHERE id = ?1 AND user_id = ?2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Proforma", id));
        }

        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// A client reference supplied by the caller must belong to the
    /// requesting owner. A miss here is an invalid reference, not a
    /// not-found: the document operation itself may still be valid.
    async fn ensure_client_reference(
        &self,
        user_id: &str,
        client_id: Option<&str>,
    ) -> DbResult<()> {
        let Some(client_id) = client_id else {
            return Ok(());
        };

        let exists: Option<String> =
            sqlx::query_scalar("SELECT id FROM clients WHERE id = ?1 AND user_id = ?2")
                .bind(client_id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        if exists.is_none() {
            return Err(DbError::invalid_reference("Client", client_id));
        }

        Ok(())
    }

    /// Items of a document, in display order.
    async fn items_for(&self, proforma_id: &str) -> DbResult<Vec<ProformaItem>> {
        let items = sqlx::query_as::<_, ProformaItem>(
            r#"
            SELECT id, proforma_id, description, quantity, unit_price_cents,
                   position, created_at
            FROM proforma_items
            WHERE proforma_id = ?1
            ORDER BY position
            "#,
        )
        .bind(proforma_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

/// Reads the next free sequence for (owner, year) and formats the number.
///
/// Must run inside the transaction that inserts the row; the unique index
/// turns a stale read into a retryable constraint violation at commit.
async fn allocate_number(
    tx: &mut Transaction<'_, Sqlite>,
    user_id: &str,
    year: i64,
) -> DbResult<(i64, String)> {
    let current_max: Option<i64> =
        sqlx::query_scalar("SELECT MAX(sequence) FROM proformas WHERE user_id = ?1 AND year = ?2")
            .bind(user_id)
            .bind(year)
            .fetch_one(&mut **tx)
            .await?;

    let sequence = next_sequence(current_max);
    Ok((sequence, format_number(year, sequence)))
}

async fn insert_proforma_row(
    tx: &mut Transaction<'_, Sqlite>,
    proforma: &Proforma,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO proformas (
            id, user_id, client_id, client_name, client_company, client_tax_id,
            status, discount_cents, notes, subtotal_cents, total_cents,
            year, sequence, number, created_at, updated_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6,
            ?7, ?8, ?9, ?10, ?11,
            ?12, ?13, ?14, ?15, ?16
        )
        "#,
    )
    .bind(&proforma.id)
    .bind(&proforma.user_id)
    .bind(&proforma.client_id)
    .bind(&proforma.client_name)
    .bind(&proforma.client_company)
    .bind(&proforma.client_tax_id)
    .bind(proforma.status)
    .bind(proforma.discount_cents)
    .bind(&proforma.notes)
    .bind(proforma.subtotal_cents)
    .bind(proforma.total_cents)
    .bind(proforma.year)
    .bind(proforma.sequence)
    .bind(&proforma.number)
    .bind(proforma.created_at)
    .bind(proforma.updated_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn insert_items(
    tx: &mut Transaction<'_, Sqlite>,
    proforma_id: &str,
    items: &[ProformaItemInput],
    now: DateTime<Utc>,
) -> DbResult<Vec<ProformaItem>> {
    let mut inserted = Vec::with_capacity(items.len());

    for (position, input) in items.iter().enumerate() {
        let item = ProformaItem {
            id: Uuid::new_v4().to_string(),
            proforma_id: proforma_id.to_string(),
            description: input.description.clone(),
            quantity: input.quantity,
            unit_price_cents: input.unit_price_cents,
            position: position as i64,
            created_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO proforma_items (
                id, proforma_id, description, quantity, unit_price_cents,
                position, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&item.id)
        .bind(&item.proforma_id)
        .bind(&item.description)
        .bind(item.quantity)
        .bind(item.unit_price_cents)
        .bind(item.position)
        .bind(item.created_at)
        .execute(&mut **tx)
        .await?;

        inserted.push(item);
    }

    Ok(inserted)
}

/// The calendar year documents are currently allocated in.
fn current_year() -> i64 {
    Utc::now().year() as i64
}
