//! # Domain Types
//!
//! Core domain types used throughout Miga Proformas.
//!
//! ## Type Hierarchy
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                               │
//! │                                                                    │
//! │  ┌───────────────┐  ┌───────────────┐  ┌────────────────────┐     │
//! │  │    Client     │  │   Proforma    │  │   ProformaItem     │     │
//! │  │  ───────────  │  │  ───────────  │  │  ────────────────  │     │
//! │  │  id (UUID)    │  │  id (UUID)    │  │  id (UUID)         │     │
//! │  │  name         │  │  number (biz) │  │  description       │     │
//! │  │  company      │  │  status       │  │  quantity          │     │
//! │  │  tax_id       │  │  totals       │  │  unit_price_cents  │     │
//! │  └───────────────┘  └───────────────┘  └────────────────────┘     │
//! │                                                                    │
//! │  ┌───────────────┐  ┌───────────────┐  ┌────────────────────┐     │
//! │  │   MenuItem    │  │ MenuCategory  │  │  ProformaStatus    │     │
//! │  │  ───────────  │  │  BOCADILLOS   │  │  DRAFT             │     │
//! │  │  category     │  │  POSTRES      │  │  SENT              │     │
//! │  │  price_cents  │  │  QUEQUES      │  │  PAID              │     │
//! │  └───────────────┘  └───────────────┘  └────────────────────┘     │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID where one exists (`number` on Proforma) - human-readable
//!
//! ## Snapshot Pattern
//! A proforma copies the client's name, company and tax id onto itself at
//! write time. Historical documents stay stable when the client record is
//! later edited or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// User
// =============================================================================

/// An account that owns clients, menu items, settings and proformas.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct User {
    pub id: String,
    pub email: String,
    /// Argon2 PHC string. Never serialized to the frontend.
    #[serde(skip_serializing)]
    #[ts(skip)]
    pub password_hash: String,
    pub display_name: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Client
// =============================================================================

/// A customer that proformas can be issued to.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Client {
    pub id: String,
    pub user_id: String,
    /// Contact person's display name.
    pub name: String,
    /// Company name shown on documents.
    pub company: String,
    /// Tax identifier (cédula jurídica). Unique per owner when present.
    pub tax_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or updating a client.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ClientInput {
    pub name: String,
    pub company: String,
    pub tax_id: Option<String>,
}

// =============================================================================
// Menu
// =============================================================================

/// Fixed menu sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
pub enum MenuCategory {
    Bocadillos,
    Postres,
    Queques,
}

impl MenuCategory {
    /// The stored/wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            MenuCategory::Bocadillos => "BOCADILLOS",
            MenuCategory::Postres => "POSTRES",
            MenuCategory::Queques => "QUEQUES",
        }
    }
}

/// A product on the menu. Independent lifecycle, never referenced by
/// proformas (line items are free text).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MenuItem {
    pub id: String,
    pub user_id: String,
    pub category: MenuCategory,
    pub name: String,
    pub description: Option<String>,
    /// Price in cents (smallest currency unit).
    pub price_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl MenuItem {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// Input for creating or updating a menu item.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MenuItemInput {
    pub category: MenuCategory,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
}

// =============================================================================
// Company Settings
// =============================================================================

/// The issuing business's identity, one-to-one with a user.
/// Created lazily on first write (upsert semantics).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CompanySettings {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub contact_name: Option<String>,
    pub tax_id: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub logo_url: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Input for the settings upsert. Blank optional fields are normalized to
/// None before validation.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CompanySettingsInput {
    pub name: String,
    pub contact_name: Option<String>,
    pub tax_id: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub logo_url: Option<String>,
}

impl CompanySettingsInput {
    /// Trims all fields and maps empty optionals to None.
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        CompanySettingsInput {
            name: self.name.trim().to_string(),
            contact_name: clean(self.contact_name),
            tax_id: clean(self.tax_id),
            address: clean(self.address),
            phone: clean(self.phone),
            email: clean(self.email),
            logo_url: clean(self.logo_url),
        }
    }
}

// =============================================================================
// Proforma Status
// =============================================================================

/// The lifecycle status of a proforma.
///
/// Transitions are intentionally unconstrained: any value may be set
/// directly on update (PAID back to DRAFT is accepted). [`ProformaStatus::apply`]
/// is the single choke point should a real state machine ever be wanted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
pub enum ProformaStatus {
    /// Being prepared, not yet shared with the client.
    Draft,
    /// Sent to the client.
    Sent,
    /// The client paid.
    Paid,
}

impl ProformaStatus {
    /// Applies a requested status on top of the current one.
    ///
    /// This is the single choke point for status changes. Today every
    /// transition is accepted and an unspecified status falls back to
    /// DRAFT; a future state machine hooks in here without touching the
    /// document service.
    pub fn apply(self, requested: Option<ProformaStatus>) -> ProformaStatus {
        requested.unwrap_or_default()
    }

    /// The stored/wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProformaStatus::Draft => "DRAFT",
            ProformaStatus::Sent => "SENT",
            ProformaStatus::Paid => "PAID",
        }
    }
}

impl Default for ProformaStatus {
    fn default() -> Self {
        ProformaStatus::Draft
    }
}

// =============================================================================
// Proforma
// =============================================================================

/// A quotation document issued to a client.
///
/// `subtotal_cents`/`total_cents` are persisted at write time, never
/// recomputed on read. `year`/`sequence`/`number` are allocated once at
/// creation and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Proforma {
    pub id: String,
    pub user_id: String,
    /// Weak reference to the client record; the document keeps its snapshot
    /// even if this becomes dangling.
    pub client_id: Option<String>,
    /// Client name at time of write (frozen).
    pub client_name: String,
    /// Client company at time of write (frozen).
    pub client_company: String,
    /// Client tax id at time of write (frozen).
    pub client_tax_id: Option<String>,
    pub status: ProformaStatus,
    /// Flat discount in cents. Absent means zero.
    pub discount_cents: Option<i64>,
    /// Free-text delivery notes.
    pub notes: Option<String>,
    pub subtotal_cents: i64,
    pub total_cents: i64,
    /// Calendar year the number was allocated in.
    pub year: i64,
    /// 1-based position within (owner, year).
    pub sequence: i64,
    /// Human-readable document number, e.g. "PF-2025-0007".
    pub number: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Proforma {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Discount as Money, absent treated as zero.
    #[inline]
    pub fn discount(&self) -> Money {
        Money::from_cents(self.discount_cents.unwrap_or(0))
    }
}

/// A line item on a proforma.
///
/// Owned exclusively by its parent: every edit of the document replaces the
/// whole collection. The multi-line description carries an optional title on
/// the first line; the remaining lines render as a bulleted list. That is a
/// presentation convention, not stored structure.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProformaItem {
    pub id: String,
    pub proforma_id: String,
    pub description: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    /// Explicit ordering within the document.
    pub position: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl ProformaItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Line total (unit price x quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }
}

/// A proforma together with its ordered items - the full aggregate as it
/// crosses the API boundary.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProformaWithItems {
    #[serde(flatten)]
    pub proforma: Proforma,
    pub items: Vec<ProformaItem>,
}

// =============================================================================
// Proforma Input
// =============================================================================

/// One line of input for creating or updating a proforma.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProformaItemInput {
    pub description: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

impl ProformaItemInput {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }
}

/// Input for creating or updating a proforma.
///
/// The client snapshot fields are provided directly; `client_id` is an
/// optional back-reference that must belong to the requesting owner.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProformaInput {
    #[serde(default)]
    pub client_id: Option<String>,
    pub client_name: String,
    pub client_company: String,
    #[serde(default)]
    pub client_tax_id: Option<String>,
    #[serde(default)]
    pub discount_cents: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: Option<ProformaStatus>,
    pub items: Vec<ProformaItemInput>,
}

impl ProformaInput {
    /// Discount as Money, absent treated as zero.
    #[inline]
    pub fn discount(&self) -> Money {
        Money::from_cents(self.discount_cents.unwrap_or(0))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
