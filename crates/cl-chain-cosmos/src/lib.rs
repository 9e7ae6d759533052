use async_trait::async_trait;
use cl_api_types::{ChainDiscovery, DenomTrace, IbcChannelInfo};
use cl_chain_client::{ChainQuerier, ChainQueryError};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_REST_URL: &str = "http://localhost:1317";

/// gRPC status code the gateway reports for a missing resource.
const GRPC_NOT_FOUND: i64 = 5;

/// HTTP querier for a Cosmos SDK REST (LCD) endpoint.
///
/// Reads `CHAIN_REST_URL` from environment at construction time
/// (default: `http://localhost:1317`).
pub struct CosmosRestClient {
    endpoint: String,
    http: reqwest::Client,
}

impl Default for CosmosRestClient {
    fn default() -> Self {
        Self::new(None)
    }
}

impl CosmosRestClient {
    pub fn new(endpoint: Option<String>) -> Self {
        Self::with_timeout(endpoint, Duration::from_secs(15))
    }

    pub fn with_timeout(endpoint: Option<String>, timeout: Duration) -> Self {
        let endpoint = endpoint
            .or_else(|| std::env::var("CHAIN_REST_URL").ok())
            .unwrap_or_else(|| DEFAULT_REST_URL.to_string());
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|err| {
                warn!("falling back to default http client: {err}");
                reqwest::Client::new()
            });
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            http,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ChainQueryError> {
        let url = format!("{}{}", self.endpoint, path);
        debug!("GET {url}");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| ChainQueryError::Network(format!("{path}: {err}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| ChainQueryError::Network(format!("{path}: {err}")))?;

        if !status.is_success() {
            return Err(classify_failure(path, status, &text));
        }

        serde_json::from_str::<T>(&text)
            .map_err(|err| ChainQueryError::Malformed(format!("{path}: {err}")))
    }
}

// ── Cosmos REST response types ───────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GatewayErrorResponse {
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct DenomTraceResponse {
    denom_trace: RawDenomTrace,
}

#[derive(Debug, Deserialize)]
struct RawDenomTrace {
    #[serde(default)]
    path: String,
    base_denom: String,
}

/// ibc-go v10 route: the trace is a list of hops instead of a path string.
#[derive(Debug, Deserialize)]
struct DenomResponse {
    denom: RawDenom,
}

#[derive(Debug, Deserialize)]
struct RawDenom {
    base: String,
    #[serde(default)]
    trace: Vec<RawHop>,
}

#[derive(Debug, Deserialize)]
struct RawHop {
    port_id: String,
    channel_id: String,
}

impl RawDenom {
    fn into_trace(self) -> DenomTrace {
        let path = self
            .trace
            .iter()
            .map(|hop| format!("{}/{}", hop.port_id, hop.channel_id))
            .collect::<Vec<_>>()
            .join("/");
        DenomTrace::new(self.base, path)
    }
}

#[derive(Debug, Deserialize)]
struct ChannelResponse {
    channel: RawChannel,
}

#[derive(Debug, Deserialize)]
struct RawChannel {
    #[serde(default)]
    state: String,
    counterparty: RawCounterparty,
}

#[derive(Debug, Deserialize)]
struct RawCounterparty {
    port_id: String,
    #[serde(default)]
    channel_id: String,
}

#[derive(Debug, Deserialize)]
struct ChannelClientStateResponse {
    identified_client_state: IdentifiedClientState,
}

#[derive(Debug, Deserialize)]
struct IdentifiedClientState {
    client_state: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct NodeInfoResponse {
    default_node_info: DefaultNodeInfo,
    #[serde(default)]
    application_version: Option<ApplicationVersion>,
}

#[derive(Debug, Deserialize)]
struct DefaultNodeInfo {
    network: String,
    #[serde(default)]
    moniker: String,
}

#[derive(Debug, Default, Deserialize)]
struct ApplicationVersion {
    #[serde(default)]
    name: String,
    #[serde(default)]
    app_name: String,
    #[serde(default)]
    build_deps: Vec<BuildDep>,
}

/// Newer SDKs report `{path, version, sum}` objects, older ones `path@version` strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BuildDep {
    Module { path: String },
    Plain(String),
}

impl BuildDep {
    fn module_path(&self) -> &str {
        match self {
            BuildDep::Module { path } => path,
            BuildDep::Plain(raw) => raw.split('@').next().unwrap_or(raw),
        }
    }
}

#[derive(Debug, Deserialize)]
struct StakingParamsResponse {
    params: StakingParams,
}

#[derive(Debug, Deserialize)]
struct StakingParams {
    bond_denom: String,
}

#[async_trait]
impl ChainQuerier for CosmosRestClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn query_denom_trace(&self, ibc_hash: &str) -> Result<DenomTrace, ChainQueryError> {
        let path = format!("/ibc/apps/transfer/v1/denom_traces/{ibc_hash}");
        match self.get_json::<DenomTraceResponse>(&path).await {
            Ok(body) => Ok(DenomTrace::new(
                body.denom_trace.base_denom,
                body.denom_trace.path,
            )),
            // ibc-go v10 dropped the denom_traces route.
            Err(err) if err.is_not_found() => {
                debug!("{err}, retrying on the denoms route");
                let path = format!("/ibc/apps/transfer/v1/denoms/{ibc_hash}");
                let body: DenomResponse = self.get_json(&path).await?;
                Ok(body.denom.into_trace())
            }
            Err(err) => Err(err),
        }
    }

    async fn query_channel_info(
        &self,
        channel_id: &str,
        port_id: &str,
    ) -> Result<IbcChannelInfo, ChainQueryError> {
        let path = format!("/ibc/core/channel/v1/channels/{channel_id}/ports/{port_id}");
        let body: ChannelResponse = self.get_json(&path).await?;

        // The counterparty chain id lives in the light client, not the channel.
        let counterparty_chain_id = match self
            .get_json::<ChannelClientStateResponse>(&format!("{path}/client_state"))
            .await
        {
            Ok(client) => client_state_chain_id(&client.identified_client_state.client_state),
            Err(err) => {
                warn!("client state lookup for {port_id}/{channel_id} failed: {err}");
                None
            }
        };

        Ok(IbcChannelInfo {
            channel_id: channel_id.to_owned(),
            port_id: port_id.to_owned(),
            state: body.channel.state,
            counterparty_channel_id: body.channel.counterparty.channel_id,
            counterparty_port_id: body.channel.counterparty.port_id,
            counterparty_chain_id,
        })
    }

    async fn discover_chain(&self) -> Result<ChainDiscovery, ChainQueryError> {
        let node_info: NodeInfoResponse = self
            .get_json("/cosmos/base/tendermint/v1beta1/node_info")
            .await?;

        let bond_denom = match self
            .get_json::<StakingParamsResponse>("/cosmos/staking/v1beta1/params")
            .await
        {
            Ok(body) => Some(body.params.bond_denom),
            Err(err) => {
                warn!("staking params unavailable, bond denom unknown: {err}");
                None
            }
        };

        let app = node_info.application_version.unwrap_or_default();
        let chain_name = [app.name, app.app_name, node_info.default_node_info.moniker]
            .into_iter()
            .find(|name| !name.trim().is_empty())
            .unwrap_or_else(|| node_info.default_node_info.network.clone());

        Ok(ChainDiscovery {
            chain_id: node_info.default_node_info.network,
            chain_name,
            bond_denom,
            module_paths: app
                .build_deps
                .iter()
                .map(|dep| dep.module_path().to_owned())
                .collect(),
        })
    }
}

fn classify_failure(path: &str, status: reqwest::StatusCode, body: &str) -> ChainQueryError {
    if status == reqwest::StatusCode::NOT_FOUND {
        return ChainQueryError::NotFound(path.to_owned());
    }

    // Gateways often wrap a gRPC NotFound in a 400/500.
    if let Ok(err) = serde_json::from_str::<GatewayErrorResponse>(body) {
        if err.code == GRPC_NOT_FOUND {
            return ChainQueryError::NotFound(format!("{path}: {}", err.message));
        }
        return ChainQueryError::Network(format!("{path}: HTTP {status}: {}", err.message));
    }

    ChainQueryError::Network(format!("{path}: HTTP {status}: {body}"))
}

fn client_state_chain_id(client_state: &serde_json::Value) -> Option<String> {
    client_state
        .get("chain_id")
        .and_then(|value| value.as_str())
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
}
