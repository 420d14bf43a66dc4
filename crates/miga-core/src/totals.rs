//! # Totals Calculator
//!
//! Pure computation of a proforma's subtotal and total from its line items
//! and an optional flat discount.
//!
//! ## Contract
//! ```text
//! subtotal = Σ (quantity_i × unit_price_i)
//! total    = subtotal − discount        (discount absent → 0)
//! ```
//!
//! No floor at zero is applied: a discount larger than the subtotal yields a
//! negative total. Malformed items (zero/negative quantity, negative price)
//! are rejected upstream by validation, never here.
//!
//! The math runs entirely on integer cents ([`Money`]); nothing is formatted
//! or rounded until the display boundary.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::ProformaItemInput;

// =============================================================================
// Totals
// =============================================================================

/// The computed money summary of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Totals {
    pub subtotal: Money,
    pub total: Money,
}

/// Computes the line total for one item.
#[inline]
pub fn line_total(quantity: i64, unit_price: Money) -> Money {
    unit_price.multiply_quantity(quantity)
}

/// Computes subtotal and total over an ordered list of items.
///
/// Side-effect free; same input always produces the same output.
///
/// ## Example
/// ```rust
/// use miga_core::money::Money;
/// use miga_core::totals::calculate_totals;
/// use miga_core::types::ProformaItemInput;
///
/// let items = vec![
///     ProformaItemInput { description: "Tamales".into(), quantity: 2, unit_price_cents: 1500 },
///     ProformaItemInput { description: "Cafe".into(), quantity: 1, unit_price_cents: 500 },
/// ];
/// let totals = calculate_totals(&items, Some(Money::from_cents(200)));
/// assert_eq!(totals.subtotal.cents(), 3500);
/// assert_eq!(totals.total.cents(), 3300);
/// ```
pub fn calculate_totals(items: &[ProformaItemInput], discount: Option<Money>) -> Totals {
    let subtotal: Money = items
        .iter()
        .map(|item| line_total(item.quantity, item.unit_price()))
        .sum();

    let total = subtotal - discount.unwrap_or_else(Money::zero);

    Totals { subtotal, total }
}

// =============================================================================
// Unit Tests
// =============================================================================
