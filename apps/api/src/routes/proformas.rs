//! Proforma API handlers.
//!
//! Thin HTTP wrappers over the document service in miga-db; all transaction
//! and allocation logic lives there. The PDF endpoint is the one exception
//! with real work of its own: it signs a print token and drives the
//! headless-browser gateway.

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use miga_core::validation::validate_proforma_input;
use miga_core::{ProformaInput, ProformaWithItems};

use crate::auth::CurrentOwner;
use crate::error::{ApiError, ApiResult};
use crate::pdf::renderer::render_pdf;
use crate::routes::{ListQuery, Page};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/proformas", get(list).post(create))
        .route(
            "/api/proformas/{id}",
            get(get_by_id).put(update).delete(delete),
        )
        .route("/api/proformas/{id}/duplicate", post(duplicate))
        .route("/api/proformas/{id}/pdf", get(pdf))
}

/// GET /api/proformas - list/search the owner's documents, newest first.
/// `q` matches the number, client name or client company.
pub async fn list(
    State(state): State<AppState>,
    owner: CurrentOwner,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Page<ProformaWithItems>>> {
    let (take, skip) = query.page();
    let (data, total) = state
        .db
        .proformas()
        .list(&owner.user_id, &query.q, take, skip)
        .await?;

    Ok(Json(Page { data, total }))
}

/// GET /api/proformas/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    owner: CurrentOwner,
    Path(id): Path<String>,
) -> ApiResult<Json<ProformaWithItems>> {
    let document = state
        .db
        .proformas()
        .get_with_items(&owner.user_id, &id)
        .await?
        .ok_or_else(|| ApiError::not_found("Proforma", &id))?;

    Ok(Json(document))
}

/// POST /api/proformas
pub async fn create(
    State(state): State<AppState>,
    owner: CurrentOwner,
    Json(input): Json<ProformaInput>,
) -> ApiResult<(StatusCode, Json<ProformaWithItems>)> {
    validate_proforma_input(&input)?;

    let document = state.db.proformas().create(&owner.user_id, &input).await?;

    Ok((StatusCode::CREATED, Json(document)))
}

/// PUT /api/proformas/{id} - full replacement of content and items.
/// The document number never changes.
pub async fn update(
    State(state): State<AppState>,
    owner: CurrentOwner,
    Path(id): Path<String>,
    Json(input): Json<ProformaInput>,
) -> ApiResult<Json<ProformaWithItems>> {
    validate_proforma_input(&input)?;

    let document = state
        .db
        .proformas()
        .update(&owner.user_id, &id, &input)
        .await?;

    Ok(Json(document))
}

/// POST /api/proformas/{id}/duplicate - copy into a fresh document with the
/// current year's next number.
pub async fn duplicate(
    State(state): State<AppState>,
    owner: CurrentOwner,
    Path(id): Path<String>,
) -> ApiResult<(StatusCode, Json<ProformaWithItems>)> {
    let document = state
        .db
        .proformas()
        .duplicate(&owner.user_id, &id)
        .await?;

    Ok((StatusCode::CREATED, Json(document)))
}

/// DELETE /api/proformas/{id} - cascades to items.
pub async fn delete(
    State(state): State<AppState>,
    owner: CurrentOwner,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    state.db.proformas().delete(&owner.user_id, &id).await?;

    Ok(Json(serde_json::json!({ "ok": true })))
}

/// GET /api/proformas/{id}/pdf
///
/// Owner-checked, then hands a tokenized print URL to the headless-browser
/// gateway and streams the PDF back inline.
pub async fn pdf(
    State(state): State<AppState>,
    owner: CurrentOwner,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let document = state
        .db
        .proformas()
        .get_with_items(&owner.user_id, &id)
        .await?
        .ok_or_else(|| ApiError::not_found("Proforma", &id))?;

    let token = state.pdf_tokens.sign(&owner.user_id, &id);
    let print_url = format!(
        "{}/proformas/{}/print?token={}",
        state.config.base_url(),
        id,
        token
    );

    let bytes = render_pdf(&state.config, &print_url).await?;

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}.pdf\"", document.proforma.number),
        ),
    ];

    Ok((headers, bytes))
}
