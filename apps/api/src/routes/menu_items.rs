//! Menu item API handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use miga_core::validation::validate_menu_item_input;
use miga_core::{MenuCategory, MenuItem, MenuItemInput};

use crate::auth::CurrentOwner;
use crate::error::{ApiError, ApiResult};
use crate::routes::{page, Page};
use crate::state::AppState;

/// Menu lists default to a fuller page than the other resources; the UI
/// shows a whole category at once.
const MENU_DEFAULT_TAKE: i64 = 30;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/menu-items", get(list).post(create))
        .route(
            "/api/menu-items/{id}",
            get(get_by_id).put(update).delete(delete),
        )
}

/// List query with the optional category filter.
#[derive(Debug, Deserialize)]
pub struct MenuListQuery {
    #[serde(default)]
    pub q: String,
    pub category: Option<MenuCategory>,
    pub take: Option<i64>,
    pub skip: Option<i64>,
}

/// GET /api/menu-items - list/search, optionally narrowed to one category
pub async fn list(
    State(state): State<AppState>,
    owner: CurrentOwner,
    Query(query): Query<MenuListQuery>,
) -> ApiResult<Json<Page<MenuItem>>> {
    let (take, skip) = page(query.take, query.skip, MENU_DEFAULT_TAKE);
    let (data, total) = state
        .db
        .menu_items()
        .list(&owner.user_id, &query.q, query.category, take, skip)
        .await?;

    Ok(Json(Page { data, total }))
}

/// GET /api/menu-items/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    owner: CurrentOwner,
    Path(id): Path<String>,
) -> ApiResult<Json<MenuItem>> {
    let item = state
        .db
        .menu_items()
        .get_by_id(&owner.user_id, &id)
        .await?
        .ok_or_else(|| ApiError::not_found("MenuItem", &id))?;

    Ok(Json(item))
}

/// POST /api/menu-items
pub async fn create(
    State(state): State<AppState>,
    owner: CurrentOwner,
    Json(input): Json<MenuItemInput>,
) -> ApiResult<(StatusCode, Json<MenuItem>)> {
    validate_menu_item_input(&input)?;

    let item = state.db.menu_items().insert(&owner.user_id, &input).await?;

    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /api/menu-items/{id}
pub async fn update(
    State(state): State<AppState>,
    owner: CurrentOwner,
    Path(id): Path<String>,
    Json(input): Json<MenuItemInput>,
) -> ApiResult<Json<MenuItem>> {
    validate_menu_item_input(&input)?;

    let item = state
        .db
        .menu_items()
        .update(&owner.user_id, &id, &input)
        .await?;

    Ok(Json(item))
}

/// DELETE /api/menu-items/{id}
pub async fn delete(
    State(state): State<AppState>,
    owner: CurrentOwner,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    state.db.menu_items().delete(&owner.user_id, &id).await?;

    Ok(Json(serde_json::json!({ "ok": true })))
}
