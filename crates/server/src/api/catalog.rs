//! Catalog API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use reelsync_core::{CatalogKind, KeyFilter};
use serde_json::Value;

use super::sync::ErrorResponse;
use crate::state::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// GET /api/v1/catalog/{kind}/{key}
///
/// Returns one synced document by natural key.
pub async fn get_document(
    State(state): State<Arc<AppState>>,
    Path((kind, key)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let kind: CatalogKind = kind
        .parse()
        .map_err(|e: String| error(StatusCode::BAD_REQUEST, e))?;

    let filter = KeyFilter::new(kind.key_field(), key.clone());
    match state.target().find_one(kind.collection(), &filter).await {
        Ok(Some(document)) => Ok(Json(document)),
        Ok(None) => Err(error(
            StatusCode::NOT_FOUND,
            format!("{} {} not found", kind, key),
        )),
        Err(e) => Err(error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    }
}
