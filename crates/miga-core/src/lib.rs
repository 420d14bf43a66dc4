//! # miga-core: Pure Business Logic for Miga Proformas
//!
//! This crate is the heart of the system. It contains all business logic as
//! pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                     Miga Proformas Architecture                    │
//! │                                                                    │
//! │  ┌──────────────────────────────────────────────────────────────┐ │
//! │  │                    Web Frontend (TypeScript)                 │ │
//! │  └──────────────────────────────┬───────────────────────────────┘ │
//! │                                 │ HTTP/JSON                        │
//! │  ┌──────────────────────────────▼───────────────────────────────┐ │
//! │  │                 apps/api (axum handlers)                     │ │
//! │  └──────────────────────────────┬───────────────────────────────┘ │
//! │                                 │                                  │
//! │  ┌──────────────────────────────▼───────────────────────────────┐ │
//! │  │               ★ miga-core (THIS CRATE) ★                     │ │
//! │  │                                                              │ │
//! │  │   ┌─────────┐ ┌─────────┐ ┌───────────┐ ┌────────────┐      │ │
//! │  │   │  types  │ │  money  │ │  totals   │ │ numbering  │      │ │
//! │  │   └─────────┘ └─────────┘ └───────────┘ └────────────┘      │ │
//! │  │                                                              │ │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS         │ │
//! │  └──────────────────────────────┬───────────────────────────────┘ │
//! │                                 │                                  │
//! │  ┌──────────────────────────────▼───────────────────────────────┐ │
//! │  │                  miga-db (Database Layer)                    │ │
//! │  │          SQLite queries, migrations, repositories            │ │
//! │  └──────────────────────────────────────────────────────────────┘ │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Client, MenuItem, Proforma, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`totals`] - Subtotal/total calculator
//! - [`numbering`] - Document number formatting and sequence math
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod numbering;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::ValidationError;
pub use money::Money;
pub use totals::{calculate_totals, Totals};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items allowed on a single proforma.
pub const MAX_PROFORMA_ITEMS: usize = 100;

/// Maximum quantity of a single line item.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum length for names, companies, tax ids, phones.
pub const MAX_NAME_LEN: usize = 200;

/// Maximum length for free text (descriptions, notes, addresses, URLs).
pub const MAX_TEXT_LEN: usize = 2000;
