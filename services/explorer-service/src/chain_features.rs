use axum::{Json, extract::State};
use cl_api_types::{ChainFeaturesResponse, Feature};

use crate::{ApiResult, AppState};

/// GET /chain/features
///
/// Feature flags for gating explorer pages. Everything reads `false` while
/// discovery is loading or after it failed; `isLoading` tells the two apart.
pub(crate) async fn chain_features(State(state): State<AppState>) -> ApiResult<ChainFeaturesResponse> {
    let capabilities = &state.capabilities;
    Ok(Json(ChainFeaturesResponse {
        is_loading: capabilities.is_loading(),
        evm: capabilities.has_feature(Feature::Evm),
        ibc: capabilities.has_feature(Feature::Ibc),
        wasm: capabilities.has_feature(Feature::Wasm),
        custom_modules: capabilities.has_custom_modules(),
        capabilities: capabilities.capabilities(),
    }))
}
