use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use cl_api_types::{DenomBatchRequest, DenomBatchResponse, DenomDisplayResponse, DenomMetadata};
use cl_explorer_core::{DenomError, ResolutionError};
use serde::Deserialize;
use std::collections::HashSet;

use crate::{ApiResult, AppState, bad_request, error_response};

#[derive(Debug, Deserialize)]
pub(crate) struct DenomQuery {
    denom: String,
}

/// GET /denom/display: whatever label is available right now.
pub(crate) async fn denom_display(
    State(state): State<AppState>,
    Query(query): Query<DenomQuery>,
) -> ApiResult<DenomDisplayResponse> {
    if query.denom.trim().is_empty() {
        return Err(bad_request("denom is required"));
    }

    let display = state.denoms.resolve_display(&query.denom);
    Ok(Json(DenomDisplayResponse {
        denom: query.denom,
        display,
    }))
}

/// POST /denom/display/batch. Answers follow request order, duplicates collapsed.
pub(crate) async fn denom_display_batch(
    State(state): State<AppState>,
    Json(request): Json<DenomBatchRequest>,
) -> ApiResult<DenomBatchResponse> {
    if request.denoms.iter().any(|denom| denom.trim().is_empty()) {
        return Err(bad_request("denoms cannot contain empty entries"));
    }

    let mut displays = state.denoms.resolve_display_batch(&request.denoms);
    let mut seen = HashSet::new();
    let displays = request
        .denoms
        .into_iter()
        .filter(|denom| seen.insert(denom.clone()))
        .map(|denom| {
            let display = displays.remove(&denom).unwrap_or_else(|| denom.clone());
            DenomDisplayResponse { denom, display }
        })
        .collect();

    Ok(Json(DenomBatchResponse { displays }))
}

/// GET /denom/metadata: waits for resolution and reports failures.
pub(crate) async fn denom_metadata(
    State(state): State<AppState>,
    Query(query): Query<DenomQuery>,
) -> ApiResult<DenomMetadata> {
    if query.denom.trim().is_empty() {
        return Err(bad_request("denom is required"));
    }

    match state.denoms.resolve_display_async(&query.denom).await {
        Ok(meta) => Ok(Json(meta)),
        Err(DenomError::MalformedHash(err)) => Err(bad_request(&err.to_string())),
        Err(DenomError::Resolution(err)) => {
            let status = match &err {
                ResolutionError::NotFound(_) => StatusCode::NOT_FOUND,
                ResolutionError::Network(_) => StatusCode::BAD_GATEWAY,
                ResolutionError::Malformed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            };
            Err(error_response(status, &err.to_string()))
        }
    }
}
