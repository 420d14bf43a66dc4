//! # PDF Gateway
//!
//! Turns a proforma's print view into PDF bytes.
//!
//! ## Flow
//! ```text
//! GET /api/proformas/{id}/pdf   (owner-authenticated)
//!      │
//!      ▼
//! sign print token  ── HMAC("{owner_id}:{proforma_id}")
//!      │
//!      ▼
//! headless Chromium ── fetches /proformas/{id}/print?token=...
//!      │                (token-authenticated, no session)
//!      ▼
//! --print-to-pdf    ── bounded by PDF_TIMEOUT_SECS
//!      │
//!      ▼
//! application/pdf response
//! ```
//!
//! - [`token`] - short opaque print token, verified without a database
//!   lookup, constant-time comparison
//! - [`renderer`] - executable resolution and the browser invocation

pub mod renderer;
pub mod token;
