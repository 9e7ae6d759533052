use anyhow::{Context, Result};
use cl_chain_cosmos::DEFAULT_REST_URL;
use cl_explorer_core::{DEFAULT_CHANNEL_INFO_TTL, FeatureRules};
use std::net::SocketAddr;
use std::time::Duration;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DENOM_CACHE_PATH: &str = "./data/denom-cache";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone)]
pub(crate) struct ServiceConfig {
    pub(crate) chain_rest_url: String,
    pub(crate) request_timeout: Duration,
    pub(crate) feature_rules: FeatureRules,
    /// `None` keeps resolved denoms in memory only.
    pub(crate) denom_cache_path: Option<String>,
    pub(crate) channel_info_ttl: Duration,
    pub(crate) bind_addr: SocketAddr,
}

impl ServiceConfig {
    pub(crate) fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let chain_rest_url = lookup("CHAIN_REST_URL")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REST_URL.to_owned());

        let request_timeout = match lookup("CHAIN_REST_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.trim()
                    .parse()
                    .with_context(|| format!("invalid CHAIN_REST_TIMEOUT_SECS: {raw}"))?,
            ),
            None => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        let feature_rules = lookup("CHAIN_CUSTOM_MODULE_PREFIXES")
            .map(|raw| FeatureRules::from_prefix_list(&raw))
            .unwrap_or_default();

        let denom_cache_path = match lookup("DENOM_CACHE_PATH") {
            Some(raw) if raw.trim().is_empty() => None,
            Some(raw) => Some(raw),
            None => Some(DEFAULT_DENOM_CACHE_PATH.to_owned()),
        };

        let channel_info_ttl = match lookup("CHANNEL_INFO_TTL_SECS") {
            Some(raw) => Duration::from_secs(
                raw.trim()
                    .parse()
                    .with_context(|| format!("invalid CHANNEL_INFO_TTL_SECS: {raw}"))?,
            ),
            None => DEFAULT_CHANNEL_INFO_TTL,
        };

        let bind_addr = lookup("EXPLORER_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned());
        let bind_addr = bind_addr
            .parse()
            .with_context(|| format!("invalid EXPLORER_BIND_ADDR: {bind_addr}"))?;

        Ok(Self {
            chain_rest_url,
            request_timeout,
            feature_rules,
            denom_cache_path,
            channel_info_ttl,
            bind_addr,
        })
    }
}
