use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::sync::Arc;

use crate::database::RecordStore;
use crate::error::ApiError;
use crate::server::AppState;

/// Store bound to the `:model` segment of the current request
#[derive(Clone)]
pub struct BoundModel(pub Arc<dyn RecordStore>);

/// Resolves `:model` against the registry before any authentication runs.
pub async fn resolve_model_middleware(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let name = params
        .get("model")
        .ok_or_else(|| ApiError::internal_server_error("Route has no model segment"))?;

    let store = state.collections.resolve(name)?;
    request.extensions_mut().insert(BoundModel(store));

    Ok(next.run(request).await)
}
