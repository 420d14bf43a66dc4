//! Login endpoint for the access-control guard.
//!
//! Session/credential *management* is out of scope; this single endpoint
//! exchanges email + password for a short-lived access token.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/auth/login", post(login))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: LoginUser,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginUser {
    pub id: String,
    pub email: String,
    pub display_name: String,
}

/// POST /api/auth/login
///
/// Misses and wrong passwords produce the same detail-free 401.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let user = state
        .db
        .users()
        .get_by_email(&payload.email)
        .await?
        .ok_or_else(ApiError::unauthorized)?;

    let parsed_hash =
        PasswordHash::new(&user.password_hash).map_err(|_| ApiError::unauthorized())?;

    Argon2::default()
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::unauthorized())?;

    let token = state.jwt.generate_access_token(&user.id, &user.email)?;

    info!(user_id = %user.id, "Login succeeded");

    Ok(Json(LoginResponse {
        token,
        user: LoginUser {
            id: user.id,
            email: user.email,
            display_name: user.display_name,
        },
    }))
}
