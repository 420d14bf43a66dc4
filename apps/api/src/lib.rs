//! # Miga API
//!
//! HTTP server for Miga Proformas: authenticated JSON CRUD over clients,
//! menu items and company settings, the proforma document service, and the
//! tokenized print view with its headless-browser PDF gateway.
//!
//! ## Request Flow
//! ```text
//! client request
//!      │
//!      ▼
//! CurrentOwner extractor (JWT)  ── 401 when absent/invalid
//!      │
//!      ▼
//! handler (routes/*) ── validation (miga-core)
//!      │
//!      ▼
//! repository (miga-db) ── one transaction per operation
//!      │
//!      ▼
//! JSON response / ApiError
//! ```
//!
//! PDF flow: owner request → HMAC print token → headless Chromium fetches
//! `/proformas/{id}/print?token=...` → PDF bytes stream back.

pub mod auth;
pub mod config;
pub mod error;
pub mod pdf;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ErrorCode};
pub use state::AppState;
