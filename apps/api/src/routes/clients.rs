//! Client API handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use miga_core::validation::validate_client_input;
use miga_core::{Client, ClientInput};

use crate::auth::CurrentOwner;
use crate::error::{ApiError, ApiResult};
use crate::routes::{ListQuery, Page};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/clients", get(list).post(create))
        .route(
            "/api/clients/{id}",
            get(get_by_id).put(update).delete(delete),
        )
}

/// GET /api/clients - list/search the owner's clients
pub async fn list(
    State(state): State<AppState>,
    owner: CurrentOwner,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Page<Client>>> {
    let (take, skip) = query.page();
    let (data, total) = state
        .db
        .clients()
        .list(&owner.user_id, &query.q, take, skip)
        .await?;

    Ok(Json(Page { data, total }))
}

/// GET /api/clients/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    owner: CurrentOwner,
    Path(id): Path<String>,
) -> ApiResult<Json<Client>> {
    let client = state
        .db
        .clients()
        .get_by_id(&owner.user_id, &id)
        .await?
        .ok_or_else(|| ApiError::not_found("Client", &id))?;

    Ok(Json(client))
}

/// POST /api/clients
pub async fn create(
    State(state): State<AppState>,
    owner: CurrentOwner,
    Json(input): Json<ClientInput>,
) -> ApiResult<(StatusCode, Json<Client>)> {
    validate_client_input(&input)?;

    let client = state.db.clients().insert(&owner.user_id, &input).await?;

    Ok((StatusCode::CREATED, Json(client)))
}

/// PUT /api/clients/{id}
pub async fn update(
    State(state): State<AppState>,
    owner: CurrentOwner,
    Path(id): Path<String>,
    Json(input): Json<ClientInput>,
) -> ApiResult<Json<Client>> {
    validate_client_input(&input)?;

    let client = state
        .db
        .clients()
        .update(&owner.user_id, &id, &input)
        .await?;

    Ok(Json(client))
}

/// DELETE /api/clients/{id}
pub async fn delete(
    State(state): State<AppState>,
    owner: CurrentOwner,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    state.db.clients().delete(&owner.user_id, &id).await?;

    Ok(Json(serde_json::json!({ "ok": true })))
}
