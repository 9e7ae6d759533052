use async_trait::async_trait;
use cl_api_types::{ChainDiscovery, DenomTrace, IbcChannelInfo};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChainQueryError {
    /// The endpoint answered and the resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    #[error("network error: {0}")]
    Network(String),
    /// The endpoint answered with something we could not make sense of.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ChainQueryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ChainQueryError::NotFound(_))
    }
}

/// Read-only queries the explorer needs from a chain REST endpoint.
#[async_trait]
pub trait ChainQuerier: Send + Sync {
    fn endpoint(&self) -> &str;

    /// Trace behind an `ibc/<hash>` denom. `ibc_hash` is the bare hex digest.
    async fn query_denom_trace(&self, ibc_hash: &str) -> Result<DenomTrace, ChainQueryError>;

    async fn query_channel_info(
        &self,
        channel_id: &str,
        port_id: &str,
    ) -> Result<IbcChannelInfo, ChainQueryError>;

    async fn discover_chain(&self) -> Result<ChainDiscovery, ChainQueryError>;
}
