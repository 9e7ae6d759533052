use serde::{Deserialize, Serialize};
use std::fmt;

/// Display metadata for a single denomination.
///
/// Built from the static registry for native denoms, or from a resolved
/// [`DenomTrace`] for `ibc/<hash>` denoms.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DenomMetadata {
    pub denom: String,
    pub display_name: String,
    pub symbol: String,
    pub decimals: u32,
    #[serde(rename = "isIBC")]
    pub is_ibc: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ibc_hash: Option<String>,
}

impl DenomMetadata {
    /// Metadata for a denom nobody knows anything about. The raw string is
    /// the best display we have.
    pub fn unregistered(denom: &str) -> Self {
        Self {
            denom: denom.to_owned(),
            display_name: denom.to_owned(),
            symbol: denom.to_owned(),
            decimals: 0,
            is_ibc: false,
            ibc_hash: None,
        }
    }

    pub fn from_trace(ibc_hash: &str, trace: &DenomTrace) -> Self {
        let symbol = trace
            .symbol
            .clone()
            .unwrap_or_else(|| trace.base_denom.clone());
        Self {
            denom: format!("ibc/{ibc_hash}"),
            display_name: trace
                .display_name
                .clone()
                .unwrap_or_else(|| trace.base_denom.clone()),
            symbol,
            decimals: trace.decimals.unwrap_or(0),
            is_ibc: true,
            ibc_hash: Some(ibc_hash.to_owned()),
        }
    }
}

/// The unwound identity of an IBC denomination: the base denom on its
/// origin chain and the `port/channel` hops it travelled through.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DenomTrace {
    pub base_denom: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u32>,
}

impl DenomTrace {
    pub fn new(base_denom: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            base_denom: base_denom.into(),
            path: path.into(),
            display_name: None,
            symbol: None,
            decimals: None,
        }
    }

    /// Splits `path` into `(port, channel)` pairs.
    ///
    /// Returns `None` when the path is empty or has an odd number of
    /// segments, neither of which describes a real IBC transfer route.
    pub fn hops(&self) -> Option<Vec<(&str, &str)>> {
        if self.path.trim().is_empty() {
            return None;
        }

        let segments: Vec<&str> = self.path.split('/').collect();
        if segments.len() % 2 != 0 || segments.iter().any(|s| s.is_empty()) {
            return None;
        }

        Some(
            segments
                .chunks(2)
                .map(|pair| (pair[0], pair[1]))
                .collect(),
        )
    }

    /// `"{path}/{base_denom}"`, the preimage of the IBC hash.
    pub fn full_path(&self) -> String {
        format!("{}/{}", self.path, self.base_denom)
    }
}

/// Counterparty identity of one end of an IBC channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IbcChannelInfo {
    pub channel_id: String,
    pub port_id: String,
    pub state: String,
    pub counterparty_channel_id: String,
    pub counterparty_port_id: String,
    pub counterparty_chain_id: Option<String>,
}

/// Optional chain modules the explorer can gate rendering on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Feature {
    Evm,
    Ibc,
    Wasm,
    CustomModules,
}

impl Feature {
    pub const ALL: [Feature; 4] = [
        Feature::Evm,
        Feature::Ibc,
        Feature::Wasm,
        Feature::CustomModules,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Evm => "evm",
            Feature::Ibc => "ibc",
            Feature::Wasm => "wasm",
            Feature::CustomModules => "customModules",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "evm" => Some(Feature::Evm),
            "ibc" => Some(Feature::Ibc),
            "wasm" => Some(Feature::Wasm),
            "customModules" | "custom_modules" => Some(Feature::CustomModules),
            _ => None,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChainFeatures {
    pub evm: bool,
    pub ibc: bool,
    pub wasm: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_modules: Option<Vec<String>>,
}

impl ChainFeatures {
    pub fn custom_modules(&self) -> &[String] {
        self.custom_modules.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChainCapabilities {
    pub chain_id: String,
    pub chain_name: String,
    pub base_denom: String,
    pub display_denom: String,
    pub decimals: u32,
    pub features: ChainFeatures,
}

/// Raw answer of the chain discovery query, before features are derived.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainDiscovery {
    pub chain_id: String,
    pub chain_name: String,
    pub bond_denom: Option<String>,
    /// Go module paths the node binary was built with.
    pub module_paths: Vec<String>,
}

// ── explorer-service HTTP payloads ──

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenomDisplayResponse {
    pub denom: String,
    pub display: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenomBatchRequest {
    pub denoms: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenomBatchResponse {
    pub displays: Vec<DenomDisplayResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainFeaturesResponse {
    pub is_loading: bool,
    pub evm: bool,
    pub ibc: bool,
    pub wasm: bool,
    pub custom_modules: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<ChainCapabilities>,
}
