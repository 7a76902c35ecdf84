use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path,
    },
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde_json::Value;

use crate::error::ApiError;
use crate::middleware::BoundModel;

/// GET /api/:version/:model - every record in the collection
pub async fn list(Extension(BoundModel(store)): Extension<BoundModel>) -> Result<Json<Vec<Value>>, ApiError> {
    Ok(Json(store.get_all().await?))
}

/// GET /api/:version/:model/:id - one record, `null` when absent
pub async fn show(
    Extension(BoundModel(store)): Extension<BoundModel>,
    path: Result<Path<(String, i64)>, PathRejection>,
) -> Result<Json<Option<Value>>, ApiError> {
    let Path((_, id)) = path?;
    Ok(Json(store.get(id).await?))
}

/// POST /api/:version/:model
pub async fn create(
    Extension(BoundModel(store)): Extension<BoundModel>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let record = store.create(payload).await?;
    tracing::debug!("Created {} {}", store.name(), record["id"]);
    Ok((StatusCode::CREATED, Json(record)))
}

/// PUT /api/:version/:model/:id - merges the supplied fields, `null` when absent
pub async fn update(
    Extension(BoundModel(store)): Extension<BoundModel>,
    path: Result<Path<(String, i64)>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Option<Value>>, ApiError> {
    let Path((_, id)) = path?;
    let Json(payload) = payload?;
    Ok(Json(store.update(id, payload).await?))
}

/// DELETE /api/:version/:model/:id - number of records removed
pub async fn remove(
    Extension(BoundModel(store)): Extension<BoundModel>,
    path: Result<Path<(String, i64)>, PathRejection>,
) -> Result<Json<u64>, ApiError> {
    let Path((_, id)) = path?;
    let removed = store.delete(id).await?;
    tracing::debug!("Deleted {} {} ({} removed)", store.name(), id, removed);
    Ok(Json(removed))
}
