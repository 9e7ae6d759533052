use cl_api_types::DenomMetadata;
use cl_chain_client::ChainQuerier;
use cl_denom_codec::{is_ibc_denom, parse_ibc_denom, registry};
use cl_storage::DenomCache;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{DenomError, ResolutionError};
use crate::resolver::IbcResolver;

enum Probe {
    Known(String),
    /// Nothing to look up remotely; show the raw denom.
    Unresolvable,
    /// Well-formed IBC denom that is not cached yet.
    Pending(String),
}

/// Entry point for rendering code: denom string in, display string out.
///
/// Holds no state of its own beyond a handle on the resolver, whose cache is
/// shared by the synchronous and asynchronous paths.
pub struct DenomFacade<Q: ?Sized, C: ?Sized> {
    resolver: Arc<IbcResolver<Q, C>>,
}

impl<Q: ?Sized, C: ?Sized> Clone for DenomFacade<Q, C> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
        }
    }
}

impl<Q, C> DenomFacade<Q, C>
where
    Q: ChainQuerier + ?Sized + 'static,
    C: DenomCache + ?Sized + 'static,
{
    pub fn new(resolver: Arc<IbcResolver<Q, C>>) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &Arc<IbcResolver<Q, C>> {
        &self.resolver
    }

    /// Best display string available right now. Never blocks and never fails.
    ///
    /// An uncached IBC denom is returned raw while its resolution is kicked
    /// off in the background, so a later call picks up the symbol.
    pub fn resolve_display(&self, denom: &str) -> String {
        match self.probe(denom) {
            Probe::Known(symbol) => symbol,
            Probe::Unresolvable => denom.to_owned(),
            Probe::Pending(hash) => {
                if !self.resolver.is_in_flight(&hash) {
                    self.spawn_resolution(hash);
                }
                denom.to_owned()
            }
        }
    }

    /// Same lookup as [`DenomFacade::resolve_display`] for many denoms.
    /// Repeated denoms are probed once.
    pub fn resolve_display_batch<I, S>(&self, denoms: I) -> HashMap<String, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut displays = HashMap::new();
        for denom in denoms {
            let denom = denom.as_ref();
            if displays.contains_key(denom) {
                continue;
            }
            displays.insert(denom.to_owned(), self.resolve_display(denom));
        }
        displays
    }

    /// Full metadata, waiting on the chain if needed.
    ///
    /// Unlike the synchronous path this reports why an IBC denom could not
    /// be resolved. Non-IBC denoms missing from the registry are not an
    /// error; they come back as unregistered metadata.
    pub async fn resolve_display_async(&self, denom: &str) -> Result<DenomMetadata, DenomError> {
        if let Some(meta) = registry::lookup_metadata(denom) {
            return Ok(meta);
        }

        if !is_ibc_denom(denom) {
            return Ok(DenomMetadata::unregistered(denom));
        }

        let hash = parse_ibc_denom(denom)?;
        Ok(self.resolver.resolve(&hash).await?)
    }

    fn probe(&self, denom: &str) -> Probe {
        if let Some(native) = registry::lookup(denom) {
            return Probe::Known(native.symbol.to_owned());
        }

        if !is_ibc_denom(denom) {
            return Probe::Unresolvable;
        }

        let hash = match parse_ibc_denom(denom) {
            Ok(hash) => hash,
            Err(err) => {
                debug!("not resolving {denom}: {err}");
                return Probe::Unresolvable;
            }
        };

        match self.resolver.cached(&hash) {
            Some(meta) => Probe::Known(meta.symbol),
            None => Probe::Pending(hash),
        }
    }

    fn spawn_resolution(&self, hash: String) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!("no async runtime, skipping background resolution of ibc/{hash}");
            return;
        };

        let resolver = self.resolver.clone();
        runtime.spawn(async move {
            match resolver.resolve(&hash).await {
                Ok(_) => {}
                Err(ResolutionError::NotFound(msg)) => debug!("ibc/{hash} has no trace: {msg}"),
                Err(err) => warn!("background resolution of ibc/{hash} failed: {err}"),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ATOM_HASH, MockQuerier};
    use cl_api_types::DenomTrace;
    use cl_denom_codec::CodecError;
    use cl_storage::{InMemoryDenomCache, RocksDbDenomCache};
    use std::time::Duration;

    fn facade(querier: Arc<MockQuerier>) -> DenomFacade<MockQuerier, InMemoryDenomCache> {
        let cache = Arc::new(InMemoryDenomCache::default());
        DenomFacade::new(Arc::new(IbcResolver::new(
            querier,
            cache,
            Duration::from_secs(60),
        )))
    }

    fn atom_denom() -> String {
        format!("ibc/{ATOM_HASH}")
    }

    #[tokio::test]
    async fn registry_denoms_resolve_without_queries() {
        let querier = Arc::new(MockQuerier::with_atom());
        let facade = facade(querier.clone());

        assert_eq!(facade.resolve_display("uosmo"), "OSMO");
        assert_eq!(facade.resolve_display("inj"), "INJ");
        assert_eq!(facade.resolve_display("uunknown"), "uunknown");

        let meta = facade.resolve_display_async("uatom").await.unwrap();
        assert_eq!(meta.symbol, "ATOM");

        tokio::task::yield_now().await;
        assert_eq!(querier.trace_calls(), 0);
    }

    #[tokio::test]
    async fn uncached_ibc_denom_is_raw_first_then_resolved() {
        let querier = Arc::new(MockQuerier::with_atom().gated());
        let facade = facade(querier.clone());
        let denom = atom_denom();

        // Two renders before anything settles: both get the raw string.
        assert_eq!(facade.resolve_display(&denom), denom);
        assert_eq!(facade.resolve_display(&denom), denom);

        querier.release();
        let meta = facade.resolve_display_async(&denom).await.unwrap();
        assert_eq!(meta.symbol, "ATOM");

        assert_eq!(facade.resolve_display(&denom), "ATOM");
        assert_eq!(querier.trace_calls(), 1);
        assert_eq!(querier.last_trace_query().as_deref(), Some(ATOM_HASH));
    }

    #[tokio::test]
    async fn background_resolution_fills_cache_without_awaiting() {
        let querier = Arc::new(MockQuerier::with_atom());
        let facade = facade(querier.clone());
        let denom = format!("ibc/{}", ATOM_HASH.to_ascii_lowercase());

        assert_eq!(facade.resolve_display(&denom), denom);

        for _ in 0..50 {
            if facade.resolver().cached(ATOM_HASH).is_some() {
                break;
            }
            tokio::task::yield_now().await;
        }

        assert_eq!(facade.resolve_display(&denom), "ATOM");
        assert_eq!(querier.trace_calls(), 1);
    }

    #[tokio::test]
    async fn malformed_hash_never_reaches_the_chain() {
        let querier = Arc::new(MockQuerier::with_atom());
        let facade = facade(querier.clone());

        assert_eq!(facade.resolve_display("ibc/not-hex"), "ibc/not-hex");
        let err = facade.resolve_display_async("ibc/not-hex").await.unwrap_err();
        assert!(matches!(
            err,
            DenomError::MalformedHash(CodecError::MalformedHash { .. })
        ));

        tokio::task::yield_now().await;
        assert_eq!(querier.trace_calls(), 0);
    }

    #[tokio::test]
    async fn async_variant_surfaces_resolution_errors() {
        let querier = Arc::new(MockQuerier::default());
        let facade = facade(querier);

        let err = facade.resolve_display_async(&atom_denom()).await.unwrap_err();
        assert!(matches!(
            err,
            DenomError::Resolution(ResolutionError::NotFound(_))
        ));

        let meta = facade.resolve_display_async("factory/osmo1xyz/ufoo").await.unwrap();
        assert_eq!(meta, DenomMetadata::unregistered("factory/osmo1xyz/ufoo"));
    }

    #[tokio::test]
    async fn batch_applies_per_denom_rules() {
        let querier = Arc::new(MockQuerier::with_atom().gated());
        let facade = facade(querier.clone());
        let denom = atom_denom();

        let displays = facade.resolve_display_batch([
            "uatom",
            denom.as_str(),
            "ibc/not-hex",
            denom.as_str(),
        ]);

        assert_eq!(displays.len(), 3);
        assert_eq!(displays["uatom"], "ATOM");
        assert_eq!(displays[&denom], denom);
        assert_eq!(displays["ibc/not-hex"], "ibc/not-hex");

        querier.release();
        facade.resolve_display_async(&denom).await.unwrap();
        assert_eq!(querier.trace_calls(), 1);
    }

    #[tokio::test]
    async fn cached_trace_answers_after_restart() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().to_string_lossy().to_string();

        {
            let cache = RocksDbDenomCache::open_default(&path)?;
            let trace = DenomTrace {
                symbol: Some("ATOM".to_owned()),
                decimals: Some(6),
                ..DenomTrace::new("uatom", "transfer/channel-0")
            };
            cache.save_trace(ATOM_HASH, &trace)?;
        }

        let querier = Arc::new(MockQuerier::default());
        let cache = Arc::new(RocksDbDenomCache::open_default(&path)?);
        let facade = DenomFacade::new(Arc::new(IbcResolver::new(
            querier.clone(),
            cache,
            Duration::from_secs(60),
        )));

        assert_eq!(facade.resolve_display(&atom_denom()), "ATOM");
        tokio::task::yield_now().await;
        assert_eq!(querier.trace_calls(), 0);
        Ok(())
    }

    #[test]
    fn display_without_runtime_still_answers() {
        let querier = Arc::new(MockQuerier::with_atom());
        let facade = facade(querier.clone());
        assert_eq!(facade.resolve_display(&atom_denom()), atom_denom());
        assert_eq!(querier.trace_calls(), 0);
    }
}
