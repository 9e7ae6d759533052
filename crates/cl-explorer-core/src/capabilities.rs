use cl_api_types::{ChainCapabilities, ChainDiscovery, ChainFeatures, Feature};
use cl_chain_client::ChainQuerier;
use cl_denom_codec::registry;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{info, warn};

/// Lifecycle of chain discovery. `Resolved` and `Failed` are terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityState {
    Uninitialized,
    Loading,
    Resolved(ChainCapabilities),
    Failed(String),
}

/// How module paths from the node's build info map to features.
#[derive(Debug, Clone, Default)]
pub struct FeatureRules {
    /// Module path prefixes that mark chain-specific modules,
    /// e.g. `github.com/osmosis-labs/osmosis/v25/x/`.
    pub custom_module_prefixes: Vec<String>,
}

impl FeatureRules {
    /// Parses a comma-separated prefix list; blanks are skipped.
    pub fn from_prefix_list(raw: &str) -> Self {
        Self {
            custom_module_prefixes: raw
                .split(',')
                .map(str::trim)
                .filter(|prefix| !prefix.is_empty())
                .map(ToOwned::to_owned)
                .collect(),
        }
    }
}

const EVM_MARKERS: &[&str] = &["ethermint", "evmos/os", "evmos/evm", "cosmos/evm"];
const IBC_MARKERS: &[&str] = &["ibc-go"];
const WASM_MARKERS: &[&str] = &["wasmd", "wasmvm"];

fn any_marker(paths: &[String], markers: &[&str]) -> bool {
    paths
        .iter()
        .any(|path| markers.iter().any(|marker| path.contains(marker)))
}

/// `github.com/org/chain/x/tokenfactory` -> `tokenfactory`,
/// `github.com/org/module/v2` -> `module`.
fn module_name(path: &str) -> Option<&str> {
    let mut segments = path.trim_end_matches('/').rsplit('/');
    let last = segments.next()?;
    let is_major_version =
        last.len() > 1 && last.starts_with('v') && last[1..].chars().all(|c| c.is_ascii_digit());
    let name = if is_major_version { segments.next()? } else { last };
    (!name.is_empty()).then_some(name)
}

/// Display unit for a bond denom missing from the registry, following the
/// `u` (micro, 6) and `a` (atto, 18) prefix conventions.
fn display_unit(base_denom: &str) -> (String, u32) {
    if let Some(native) = registry::lookup(base_denom) {
        return (native.symbol.to_owned(), native.decimals);
    }

    let scaled = |rest: &str| rest.len() >= 2 && rest.chars().all(|c| c.is_ascii_alphabetic());
    if let Some(rest) = base_denom.strip_prefix('u').filter(|rest| scaled(*rest)) {
        return (rest.to_ascii_uppercase(), 6);
    }
    if let Some(rest) = base_denom.strip_prefix('a').filter(|rest| scaled(*rest)) {
        return (rest.to_ascii_uppercase(), 18);
    }
    (base_denom.to_ascii_uppercase(), 0)
}

pub fn derive_capabilities(discovery: &ChainDiscovery, rules: &FeatureRules) -> ChainCapabilities {
    let paths = &discovery.module_paths;

    let custom_modules = (!rules.custom_module_prefixes.is_empty()).then(|| {
        let mut modules: Vec<String> = paths
            .iter()
            .filter(|path| {
                rules
                    .custom_module_prefixes
                    .iter()
                    .any(|prefix| path.starts_with(prefix.as_str()))
            })
            .filter_map(|path| module_name(path))
            .map(ToOwned::to_owned)
            .collect();
        modules.sort();
        modules.dedup();
        modules
    });

    let base_denom = discovery.bond_denom.clone().unwrap_or_default();
    let (display_denom, decimals) = display_unit(&base_denom);

    ChainCapabilities {
        chain_id: discovery.chain_id.clone(),
        chain_name: discovery.chain_name.clone(),
        base_denom,
        display_denom,
        decimals,
        features: ChainFeatures {
            evm: any_marker(paths, EVM_MARKERS),
            ibc: any_marker(paths, IBC_MARKERS),
            wasm: any_marker(paths, WASM_MARKERS),
            custom_modules,
        },
    }
}

/// Discovers once per process which optional modules the connected chain
/// runs, and answers feature queries synchronously from then on.
///
/// Until discovery settles, and forever after it fails, every feature
/// reads as unsupported.
pub struct CapabilityResolver<Q: ?Sized> {
    querier: Arc<Q>,
    rules: FeatureRules,
    state: RwLock<CapabilityState>,
}

impl<Q: ChainQuerier + ?Sized + 'static> CapabilityResolver<Q> {
    pub fn new(querier: Arc<Q>, rules: FeatureRules) -> Self {
        Self {
            querier,
            rules,
            state: RwLock::new(CapabilityState::Uninitialized),
        }
    }

    /// Runs discovery if nobody has yet. Later calls return immediately,
    /// whatever the outcome of the first.
    ///
    /// Discovery runs as its own task and always settles the state, even if
    /// the caller stops waiting on this future.
    pub async fn initialize(self: &Arc<Self>) {
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            if *state != CapabilityState::Uninitialized {
                return;
            }
            *state = CapabilityState::Loading;
        }

        let this = self.clone();
        let task = tokio::spawn(async move {
            let next = this.discover().await;
            this.settle(next);
        });

        if let Err(err) = task.await {
            warn!("chain discovery task aborted: {err}");
            self.settle(CapabilityState::Failed(format!("discovery task aborted: {err}")));
        }
    }

    async fn discover(&self) -> CapabilityState {
        match self.querier.discover_chain().await {
            Ok(discovery) => {
                let capabilities = derive_capabilities(&discovery, &self.rules);
                info!(
                    "chain {} ({}) features: evm={} ibc={} wasm={} custom_modules={:?}",
                    capabilities.chain_id,
                    capabilities.chain_name,
                    capabilities.features.evm,
                    capabilities.features.ibc,
                    capabilities.features.wasm,
                    capabilities.features.custom_modules(),
                );
                CapabilityState::Resolved(capabilities)
            }
            Err(err) => {
                warn!(
                    "chain discovery against {} failed, assuming no optional modules: {err}",
                    self.querier.endpoint()
                );
                CapabilityState::Failed(err.to_string())
            }
        }
    }

    /// Only a `Loading` state moves; a terminal state is never overwritten.
    fn settle(&self, next: CapabilityState) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if *state == CapabilityState::Loading {
            *state = next;
        }
    }

    pub fn state(&self) -> CapabilityState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// True until discovery has settled either way.
    pub fn is_loading(&self) -> bool {
        matches!(
            *self.state.read().unwrap_or_else(PoisonError::into_inner),
            CapabilityState::Uninitialized | CapabilityState::Loading
        )
    }

    pub fn capabilities(&self) -> Option<ChainCapabilities> {
        match self.state() {
            CapabilityState::Resolved(capabilities) => Some(capabilities),
            _ => None,
        }
    }

    /// `CustomModules` is true when the discovered module list is non-empty.
    pub fn has_feature(&self, feature: Feature) -> bool {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let CapabilityState::Resolved(capabilities) = &*state else {
            return false;
        };

        let features = &capabilities.features;
        match feature {
            Feature::Evm => features.evm,
            Feature::Ibc => features.ibc,
            Feature::Wasm => features.wasm,
            Feature::CustomModules => !features.custom_modules().is_empty(),
        }
    }

    pub fn has_custom_modules(&self) -> bool {
        self.has_feature(Feature::CustomModules)
    }

    /// Unknown feature names are unsupported.
    pub fn has_feature_named(&self, name: &str) -> bool {
        Feature::parse(name).is_some_and(|feature| self.has_feature(feature))
    }
}
