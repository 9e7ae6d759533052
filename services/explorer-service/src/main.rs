mod chain_features;
mod config;
mod denom;

use anyhow::Context;
use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use cl_chain_client::ChainQuerier;
use cl_chain_cosmos::CosmosRestClient;
use cl_explorer_core::{CapabilityResolver, DenomFacade, IbcResolver};
use cl_storage::{DenomCache, InMemoryDenomCache, RocksDbDenomCache};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::config::ServiceConfig;

#[derive(Debug, Serialize)]
struct HealthResponse {
    service: &'static str,
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct VersionResponse {
    service: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ErrorResponse {
    error: String,
}

pub(crate) type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

/// Process-wide singletons, built once in `main` and shared by every request.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) denoms: DenomFacade<dyn ChainQuerier, dyn DenomCache>,
    pub(crate) capabilities: Arc<CapabilityResolver<dyn ChainQuerier>>,
}

impl AppState {
    pub(crate) fn new(
        querier: Arc<dyn ChainQuerier>,
        cache: Arc<dyn DenomCache>,
        config: &ServiceConfig,
    ) -> Self {
        let resolver = IbcResolver::new(querier.clone(), cache, config.channel_info_ttl);
        Self {
            denoms: DenomFacade::new(Arc::new(resolver)),
            capabilities: Arc::new(CapabilityResolver::new(
                querier,
                config.feature_rules.clone(),
            )),
        }
    }
}

fn open_denom_cache(config: &ServiceConfig) -> anyhow::Result<Arc<dyn DenomCache>> {
    match &config.denom_cache_path {
        Some(path) => {
            std::fs::create_dir_all(path)
                .with_context(|| format!("failed to create denom cache directory {path}"))?;
            let cache = RocksDbDenomCache::open_default(path)?;
            match cache.list_traces() {
                Ok(traces) => info!(
                    "persisting resolved denoms under {path} ({} restored)",
                    traces.len()
                ),
                Err(err) => warn!("denom cache at {path} has unreadable entries: {err:#}"),
            }
            Ok(Arc::new(cache))
        }
        None => {
            info!("DENOM_CACHE_PATH is empty, resolved denoms are kept in memory only");
            Ok(Arc::new(InMemoryDenomCache::default()))
        }
    }
}

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .route("/denom/display", get(denom::denom_display))
        .route("/denom/display/batch", post(denom::denom_display_batch))
        .route("/denom/metadata", get(denom::denom_metadata))
        .route("/chain/features", get(chain_features::chain_features))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = ServiceConfig::from_env()?;

    let querier: Arc<dyn ChainQuerier> = Arc::new(CosmosRestClient::with_timeout(
        Some(config.chain_rest_url.clone()),
        config.request_timeout,
    ));
    let cache = open_denom_cache(&config)?;
    let state = AppState::new(querier, cache, &config);

    // Discovery runs once for the life of the process; requests that arrive
    // before it settles see every feature as unsupported.
    let capabilities = state.capabilities.clone();
    tokio::spawn(async move { capabilities.initialize().await });

    let app = router(state);

    info!(
        "explorer-service listening on {} (chain REST {})",
        config.bind_addr, config.chain_rest_url
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        service: "explorer-service",
        status: "ok",
    })
}

async fn version() -> Json<VersionResponse> {
    Json(VersionResponse {
        service: "explorer-service",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub(crate) fn error_response(status: StatusCode, message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: message.to_owned(),
        }),
    )
}

pub(crate) fn bad_request(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    error_response(StatusCode::BAD_REQUEST, message)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use cl_api_types::{ChainDiscovery, DenomTrace, IbcChannelInfo};
    use cl_chain_client::ChainQueryError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    pub(crate) const ATOM_HASH: &str =
        "27394FB092D2ECCD56123C74F36E4C1F926001CEADA9CA97EA622B25F41E5EB2";

    /// Osmosis-like chain: knows ATOM over channel-0, runs IBC and CosmWasm.
    #[derive(Default)]
    pub(crate) struct StubChain {
        pub(crate) trace_calls: AtomicUsize,
        pub(crate) discovery_fails: bool,
    }

    #[async_trait]
    impl ChainQuerier for StubChain {
        fn endpoint(&self) -> &str {
            "stub://osmosis"
        }

        async fn query_denom_trace(&self, ibc_hash: &str) -> Result<DenomTrace, ChainQueryError> {
            self.trace_calls.fetch_add(1, Ordering::SeqCst);
            if ibc_hash == ATOM_HASH {
                Ok(DenomTrace::new("uatom", "transfer/channel-0"))
            } else {
                Err(ChainQueryError::NotFound(ibc_hash.to_owned()))
            }
        }

        async fn query_channel_info(
            &self,
            channel_id: &str,
            port_id: &str,
        ) -> Result<IbcChannelInfo, ChainQueryError> {
            Err(ChainQueryError::Network(format!("{port_id}/{channel_id} unavailable")))
        }

        async fn discover_chain(&self) -> Result<ChainDiscovery, ChainQueryError> {
            if self.discovery_fails {
                return Err(ChainQueryError::Network("connection refused".to_owned()));
            }
            Ok(ChainDiscovery {
                chain_id: "osmosis-1".to_owned(),
                chain_name: "osmosis".to_owned(),
                bond_denom: Some("uosmo".to_owned()),
                module_paths: vec![
                    "github.com/cosmos/ibc-go/v8".to_owned(),
                    "github.com/CosmWasm/wasmd".to_owned(),
                ],
            })
        }
    }

    pub(crate) fn test_state(chain: Arc<StubChain>) -> AppState {
        let config = ServiceConfig::from_lookup(|_| None).expect("default config");
        AppState::new(chain, Arc::new(InMemoryDenomCache::default()), &config)
    }

    pub(crate) async fn send(
        state: AppState,
        request: Request<Body>,
    ) -> (StatusCode, serde_json::Value) {
        let response = router(state).oneshot(request).await.expect("router response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("response body");
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    pub(crate) fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).expect("request")
    }
}
