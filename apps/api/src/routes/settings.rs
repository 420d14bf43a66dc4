//! Company settings API handlers.
//!
//! One row per owner with upsert semantics: GET returns null until the
//! first PUT creates it.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use miga_core::validation::validate_settings_input;
use miga_core::{CompanySettings, CompanySettingsInput};

use crate::auth::CurrentOwner;
use crate::error::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/company-settings", get(get_settings).put(upsert))
}

/// GET /api/company-settings
pub async fn get_settings(
    State(state): State<AppState>,
    owner: CurrentOwner,
) -> ApiResult<Json<Option<CompanySettings>>> {
    let settings = state.db.settings().get(&owner.user_id).await?;

    Ok(Json(settings))
}

/// PUT /api/company-settings - create on first write, update afterwards
pub async fn upsert(
    State(state): State<AppState>,
    owner: CurrentOwner,
    Json(input): Json<CompanySettingsInput>,
) -> ApiResult<Json<CompanySettings>> {
    let input = input.normalized();
    validate_settings_input(&input)?;

    let settings = state.db.settings().upsert(&owner.user_id, &input).await?;

    Ok(Json(settings))
}
