//! JWT authentication module.
//!
//! Token generation and validation for the access-control guard, plus the
//! [`CurrentOwner`] extractor every protected handler takes. The owner id
//! it yields scopes every database query.

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    /// Account email
    pub email: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,
}

/// JWT token manager.
pub struct JwtManager {
    secret: String,
    access_lifetime_secs: i64,
}

impl JwtManager {
    /// Create a new JWT manager.
    pub fn new(secret: String, access_lifetime_secs: i64) -> Self {
        JwtManager {
            secret,
            access_lifetime_secs,
        }
    }

    /// Generate an access token for a user.
    pub fn generate_access_token(&self, user_id: &str, email: &str) -> Result<String, ApiError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.access_lifetime_secs);

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::internal(format!("Failed to generate token: {}", e)))
    }

    /// Validate and decode a token.
    pub fn validate_token(&self, token: &str) -> Result<Claims, ApiError> {
        let validation = Validation::default();

        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|_| ApiError::unauthorized())?;

        Ok(token_data.claims)
    }
}

/// Extract bearer token from an authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

// =============================================================================
// Extractor
// =============================================================================

/// The authenticated principal. Every document operation is scoped to this
/// owner's rows.
#[derive(Debug, Clone)]
pub struct CurrentOwner {
    pub user_id: String,
    pub email: String,
}

impl FromRequestParts<AppState> for CurrentOwner {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Reuse a principal another extractor already validated
        if let Some(owner) = parts.extensions.get::<CurrentOwner>() {
            return Ok(owner.clone());
        }

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let token = match auth_header {
            Some(header) => extract_bearer_token(header).ok_or_else(ApiError::unauthorized)?,
            None => return Err(ApiError::unauthorized()),
        };

        match state.jwt.validate_token(token) {
            Ok(claims) => {
                let owner = CurrentOwner {
                    user_id: claims.sub,
                    email: claims.email,
                };
                parts.extensions.insert(owner.clone());
                Ok(owner)
            }
            Err(err) => {
                warn!(uri = %parts.uri, "Rejected bearer token");
                Err(err)
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
