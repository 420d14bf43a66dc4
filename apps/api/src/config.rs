//! API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults suitable for local development.

use std::env;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// Path to the SQLite database file
    pub database_path: String,

    /// JWT secret key for signing access tokens
    pub jwt_secret: String,

    /// JWT access token lifetime in seconds
    pub jwt_access_lifetime_secs: i64,

    /// Secret for the HMAC print token
    pub pdf_token_secret: String,

    /// Base URL the headless browser uses to reach the print view.
    /// Defaults to the local listener when unset.
    pub public_base_url: Option<String>,

    /// Explicit Chromium/Chrome executable path. When unset, well-known
    /// install locations are probed.
    pub chrome_executable: Option<String>,

    /// Upper bound for one PDF render (browser startup + navigation +
    /// print), in seconds.
    pub pdf_timeout_secs: u64,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ApiConfig {
            http_port: env::var("HTTP_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("HTTP_PORT".to_string()))?,

            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "./data/miga.db".to_string()),

            jwt_secret: env::var("JWT_SECRET")
                // In production this MUST be set via environment variable
                .unwrap_or_else(|_| "miga-dev-secret-change-in-production".to_string()),

            jwt_access_lifetime_secs: env::var("JWT_ACCESS_LIFETIME_SECS")
                .unwrap_or_else(|_| "3600".to_string()) // 1 hour
                .parse()
                .map_err(|_| ConfigError::InvalidValue("JWT_ACCESS_LIFETIME_SECS".to_string()))?,

            pdf_token_secret: env::var("PDF_TOKEN_SECRET")
                .unwrap_or_else(|_| "dev-secret".to_string()),

            public_base_url: env::var("PUBLIC_BASE_URL").ok(),

            chrome_executable: env::var("CHROME_EXECUTABLE_PATH").ok(),

            pdf_timeout_secs: env::var("PDF_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PDF_TIMEOUT_SECS".to_string()))?,
        };

        Ok(config)
    }

    /// The base URL for links the headless browser will follow.
    pub fn base_url(&self) -> String {
        match &self.public_base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://127.0.0.1:{}", self.http_port),
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trims_trailing_slash() {
        let mut config = ApiConfig {
            http_port: 8080,
            database_path: ":memory:".to_string(),
            jwt_secret: "s".to_string(),
            jwt_access_lifetime_secs: 3600,
            pdf_token_secret: "s".to_string(),
            public_base_url: Some("https://miga.example/".to_string()),
            chrome_executable: None,
            pdf_timeout_secs: 30,
        };
        assert_eq!(config.base_url(), "https://miga.example");

        config.public_base_url = None;
        assert_eq!(config.base_url(), "http://127.0.0.1:8080");
    }
}
