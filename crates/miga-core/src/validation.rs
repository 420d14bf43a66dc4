//! # Validation Module
//!
//! Input validation for Miga Proformas.
//!
//! ## Validation Strategy
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                             │
//! │                                                                    │
//! │  Layer 1: Frontend (TypeScript)                                    │
//! │  └── Basic format checks, immediate feedback                       │
//! │           │                                                        │
//! │           ▼                                                        │
//! │  Layer 2: API handler (Rust)                                       │
//! │  ├── Type validation (deserialization)                             │
//! │  └── THIS MODULE: field rules                                      │
//! │           │                                                        │
//! │           ▼                                                        │
//! │  Layer 3: Database (SQLite)                                        │
//! │  └── NOT NULL / UNIQUE / CHECK / foreign key constraints           │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every function returns the field name inside the error so the API can
//! hand back field-level detail.

use crate::error::{ValidationError, ValidationResult};
use crate::types::{ClientInput, CompanySettingsInput, MenuItemInput, ProformaInput};
use crate::{MAX_ITEM_QUANTITY, MAX_NAME_LEN, MAX_PROFORMA_ITEMS, MAX_TEXT_LEN};

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a required, bounded text field.
pub fn validate_required_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates an optional, bounded text field.
pub fn validate_optional_text(
    field: &str,
    value: Option<&str>,
    max: usize,
) -> ValidationResult<()> {
    if let Some(value) = value {
        if value.len() > max {
            return Err(ValidationError::TooLong {
                field: field.to_string(),
                max,
            });
        }
    }

    Ok(())
}

/// Validates a line item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY
pub fn validate_quantity(field: &str, qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price or discount in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0); zero is allowed (free items)
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates an email address. Intentionally shallow - format, not
/// deliverability.
pub fn validate_email(field: &str, email: &str) -> ValidationResult<()> {
    let email = email.trim();

    let well_formed = email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
    });

    if !well_formed {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a valid email address".to_string(),
        });
    }

    Ok(())
}

/// Validates a UUID string format.
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Aggregate Validators
// =============================================================================

/// Validates a client create/update payload.
pub fn validate_client_input(input: &ClientInput) -> ValidationResult<()> {
    validate_required_text("name", &input.name, MAX_NAME_LEN)?;
    validate_required_text("company", &input.company, MAX_NAME_LEN)?;
    validate_optional_text("taxId", input.tax_id.as_deref(), MAX_NAME_LEN)?;
    Ok(())
}

/// Validates a menu item create/update payload.
pub fn validate_menu_item_input(input: &MenuItemInput) -> ValidationResult<()> {
    validate_required_text("name", &input.name, MAX_NAME_LEN)?;
    validate_optional_text("description", input.description.as_deref(), MAX_TEXT_LEN)?;
    validate_price_cents("priceCents", input.price_cents)?;
    Ok(())
}

/// Validates a company settings payload (after normalization).
pub fn validate_settings_input(input: &CompanySettingsInput) -> ValidationResult<()> {
    validate_required_text("name", &input.name, MAX_NAME_LEN)?;
    validate_optional_text("contactName", input.contact_name.as_deref(), MAX_NAME_LEN)?;
    validate_optional_text("taxId", input.tax_id.as_deref(), MAX_NAME_LEN)?;
    validate_optional_text("address", input.address.as_deref(), MAX_TEXT_LEN)?;
    validate_optional_text("phone", input.phone.as_deref(), MAX_NAME_LEN)?;
    if let Some(email) = input.email.as_deref() {
        validate_email("email", email)?;
    }
    validate_optional_text("logoUrl", input.logo_url.as_deref(), MAX_TEXT_LEN)?;
    Ok(())
}

/// Validates a proforma create/update payload.
///
/// ## Rules
/// - Client reference, when present, must be a well-formed id (ownership is
///   checked by the document service against the store)
/// - Snapshot name and company are required
/// - Discount, when present, must be non-negative
/// - At least one item; each item needs a description, a positive quantity
///   and a non-negative unit price
pub fn validate_proforma_input(input: &ProformaInput) -> ValidationResult<()> {
    if let Some(client_id) = input.client_id.as_deref() {
        validate_uuid("clientId", client_id)?;
    }

    validate_required_text("clientName", &input.client_name, MAX_NAME_LEN)?;
    validate_required_text("clientCompany", &input.client_company, MAX_NAME_LEN)?;
    validate_optional_text("clientTaxId", input.client_tax_id.as_deref(), MAX_NAME_LEN)?;

    if let Some(discount) = input.discount_cents {
        validate_price_cents("discountCents", discount)?;
    }

    validate_optional_text("notes", input.notes.as_deref(), MAX_TEXT_LEN)?;

    if input.items.is_empty() {
        return Err(ValidationError::Empty {
            field: "items".to_string(),
        });
    }

    if input.items.len() > MAX_PROFORMA_ITEMS {
        return Err(ValidationError::TooMany {
            field: "items".to_string(),
            max: MAX_PROFORMA_ITEMS,
        });
    }

    for (index, item) in input.items.iter().enumerate() {
        validate_required_text(&format!("items[{index}].description"), &item.description, MAX_TEXT_LEN)?;
        validate_quantity(&format!("items[{index}].quantity"), item.quantity)?;
        validate_price_cents(&format!("items[{index}].unitPriceCents"), item.unit_price_cents)?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
