//! Shared application state.
//!
//! One [`AppState`] is built at startup and cloned into every handler via
//! axum's `State` extractor. All fields are cheap to clone.

use std::sync::Arc;

use miga_db::Database;

use crate::auth::JwtManager;
use crate::config::ApiConfig;
use crate::pdf::token::PdfTokenSigner;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database handle (pooled).
    pub db: Database,

    /// JWT manager for the access-control guard.
    pub jwt: Arc<JwtManager>,

    /// Signer for the tokenized print view.
    pub pdf_tokens: Arc<PdfTokenSigner>,

    /// Loaded configuration.
    pub config: Arc<ApiConfig>,
}

impl AppState {
    /// Builds the state from a connected database and loaded configuration.
    pub fn new(db: Database, config: ApiConfig) -> Self {
        let jwt = Arc::new(JwtManager::new(
            config.jwt_secret.clone(),
            config.jwt_access_lifetime_secs,
        ));
        let pdf_tokens = Arc::new(PdfTokenSigner::new(&config.pdf_token_secret));

        AppState {
            db,
            jwt,
            pdf_tokens,
            config: Arc::new(config),
        }
    }
}
