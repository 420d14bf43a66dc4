//! Tokenized print view.
//!
//! This page is what the PDF gateway's headless browser fetches. It carries
//! no session - the request authenticates with the HMAC print token bound
//! to (owner, document). A missing or wrong token yields the same 404 as a
//! missing document, so existence is never revealed.
//!
//! The askama template receives pre-formatted strings only; parsing and
//! currency formatting happen here.

use askama::Template;
use axum::extract::{Path, Query, State};
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

use miga_core::{CompanySettings, ProformaWithItems};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/proformas/{id}/print", get(print_view))
}

#[derive(Debug, Deserialize)]
pub struct PrintQuery {
    pub token: Option<String>,
}

/// GET /proformas/{id}/print?token=...
pub async fn print_view(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PrintQuery>,
) -> ApiResult<Html<String>> {
    let document = state
        .db
        .proformas()
        .get_unscoped(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Proforma", &id))?;

    let token = query.token.unwrap_or_default();
    if !state
        .pdf_tokens
        .verify(&document.proforma.user_id, &id, &token)
    {
        return Err(ApiError::not_found("Proforma", &id));
    }

    let settings = state.db.settings().get(&document.proforma.user_id).await?;
    let template = PrintTemplate::build(&document, settings.as_ref());

    let html = template
        .render()
        .map_err(|e| ApiError::internal(format!("Template render failed: {e}")))?;

    Ok(Html(html))
}

// =============================================================================
// Template
// =============================================================================

#[derive(Template)]
#[template(path = "proforma_print.html")]
struct PrintTemplate {
    company_name: String,
    company_contact: String,
    company_tax_id: String,
    company_address: String,
    company_phone: String,
    company_email: String,
    logo_url: String,
    number: String,
    date: String,
    client_name: String,
    client_company: String,
    client_tax_id: String,
    items: Vec<PrintItem>,
    subtotal: String,
    discount: String,
    total: String,
    notes: String,
}

struct PrintItem {
    title: String,
    bullets: Vec<String>,
    quantity: i64,
    unit_price: String,
    line_total: String,
}

impl PrintTemplate {
    fn build(document: &ProformaWithItems, settings: Option<&CompanySettings>) -> Self {
        let proforma = &document.proforma;

        let items = document
            .items
            .iter()
            .map(|item| {
                let parsed = parse_description(&item.description);
                PrintItem {
                    title: parsed.title,
                    bullets: parsed.bullets,
                    quantity: item.quantity,
                    unit_price: format_crc(item.unit_price_cents),
                    line_total: format_crc(item.line_total().cents()),
                }
            })
            .collect();

        let discount_cents = proforma.discount_cents.unwrap_or(0);

        PrintTemplate {
            company_name: settings.map(|s| s.name.clone()).unwrap_or_default(),
            company_contact: optional(settings.and_then(|s| s.contact_name.clone())),
            company_tax_id: optional(settings.and_then(|s| s.tax_id.clone())),
            company_address: optional(settings.and_then(|s| s.address.clone())),
            company_phone: optional(settings.and_then(|s| s.phone.clone())),
            company_email: optional(settings.and_then(|s| s.email.clone())),
            logo_url: optional(settings.and_then(|s| s.logo_url.clone())),
            number: proforma.number.clone(),
            date: proforma.created_at.format("%d/%m/%Y").to_string(),
            client_name: proforma.client_name.clone(),
            client_company: proforma.client_company.clone(),
            client_tax_id: optional(proforma.client_tax_id.clone()),
            items,
            subtotal: format_crc(proforma.subtotal_cents),
            // Empty string hides the discount row entirely
            discount: if discount_cents != 0 {
                format_crc(discount_cents)
            } else {
                String::new()
            },
            total: format_crc(proforma.total_cents),
            notes: proforma
                .notes
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .unwrap_or("Por definir")
                .to_string(),
        }
    }
}

fn optional(value: Option<String>) -> String {
    value.unwrap_or_default()
}

// =============================================================================
// Description Parsing
// =============================================================================

/// A line item description split into the display convention: an optional
/// title line followed by bullet lines.
#[derive(Debug, PartialEq, Eq)]
pub struct ParsedDescription {
    pub title: String,
    pub bullets: Vec<String>,
}

fn strip_bullet(line: &str) -> &str {
    line.strip_prefix(['-', '*', '•'])
        .unwrap_or(line)
        .trim_start()
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split([';', ','])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Splits a free-text description into title + bullets.
///
/// Display convention only; the stored description stays untouched:
/// - multiple lines: first line is the title, the rest are bullets
/// - a leading bullet marker means there is no title
/// - a single line with a colon becomes "title: + listed tail"
/// - a single line with `;`/`,` separators becomes a bare list
pub fn parse_description(description: &str) -> ParsedDescription {
    let lines: Vec<&str> = description
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let Some((&first, rest)) = lines.split_first() else {
        return ParsedDescription {
            title: String::new(),
            bullets: Vec::new(),
        };
    };

    let rest: Vec<String> = rest.iter().map(|line| strip_bullet(line).to_string()).collect();

    if first.starts_with(['-', '*', '•']) {
        let mut bullets = vec![strip_bullet(first).to_string()];
        bullets.extend(rest);
        return ParsedDescription {
            title: String::new(),
            bullets,
        };
    }

    if lines.len() == 1 {
        if let Some(colon_index) = first.find(':') {
            let title = first[..=colon_index].trim().to_string();
            let tail = first[colon_index + 1..].trim();
            let bullets = if tail.is_empty() {
                Vec::new()
            } else {
                split_list(tail)
            };
            return ParsedDescription { title, bullets };
        }

        let bullets = split_list(first);
        if bullets.len() > 1 {
            return ParsedDescription {
                title: String::new(),
                bullets,
            };
        }

        return ParsedDescription {
            title: String::new(),
            bullets: vec![strip_bullet(first).to_string()],
        };
    }

    ParsedDescription {
        title: first.to_string(),
        bullets: rest,
    }
}

// =============================================================================
// Currency Formatting
// =============================================================================

/// Formats cents as colones for the printed document: `₡3.500,00`
/// (es-CR grouping - dot thousands, comma decimals).
pub fn format_crc(cents: i64) -> String {
    let negative = cents < 0;
    let abs = cents.abs();
    let major = (abs / 100).to_string();
    let minor = abs % 100;

    let mut grouped = String::with_capacity(major.len() + major.len() / 3);
    for (i, c) in major.chars().enumerate() {
        if i > 0 && (major.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}₡{grouped},{minor:02}")
}

// =============================================================================
// Unit Tests
// =============================================================================
