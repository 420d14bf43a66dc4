//! # Routes
//!
//! One module per resource, each exposing a `router()` that the app
//! assembles here.
//!
//! ```text
//! POST /api/auth/login
//! GET  /api/clients            POST /api/clients
//! GET  /api/clients/{id}       PUT/DELETE /api/clients/{id}
//! GET  /api/menu-items         POST /api/menu-items
//! GET  /api/menu-items/{id}    PUT/DELETE /api/menu-items/{id}
//! GET  /api/company-settings   PUT /api/company-settings
//! GET  /api/proformas          POST /api/proformas
//! GET  /api/proformas/{id}     PUT/DELETE /api/proformas/{id}
//! POST /api/proformas/{id}/duplicate
//! GET  /api/proformas/{id}/pdf
//! GET  /proformas/{id}/print   (token-authenticated print view)
//! ```

use axum::Router;
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod auth;
pub mod clients;
pub mod menu_items;
pub mod print;
pub mod proformas;
pub mod settings;

/// Assembles the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(auth::router())
        .merge(clients::router())
        .merge(menu_items::router())
        .merge(settings::router())
        .merge(proformas::router())
        .merge(print::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// Shared List Plumbing
// =============================================================================

/// Default page size for list endpoints.
const DEFAULT_TAKE: i64 = 10;

/// Hard cap on page size.
const MAX_TAKE: i64 = 100;

/// Common list query parameters: free-text search plus take/skip paging.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub q: String,
    pub take: Option<i64>,
    pub skip: Option<i64>,
}

impl ListQuery {
    /// Clamped (take, skip) pair.
    pub fn page(&self) -> (i64, i64) {
        page(self.take, self.skip, DEFAULT_TAKE)
    }
}

pub(crate) fn page(take: Option<i64>, skip: Option<i64>, default_take: i64) -> (i64, i64) {
    let take = take.unwrap_or(default_take).clamp(1, MAX_TAKE);
    let skip = skip.unwrap_or(0).max(0);
    (take, skip)
}

/// One page of results plus the total count for the same filter.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_clamping() {
        assert_eq!(page(None, None, 10), (10, 0));
        assert_eq!(page(Some(0), Some(-5), 10), (1, 0));
        assert_eq!(page(Some(1000), Some(20), 10), (100, 20));
    }
}
