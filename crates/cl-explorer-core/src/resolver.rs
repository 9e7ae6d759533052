use cl_api_types::{DenomMetadata, DenomTrace, IbcChannelInfo};
use cl_chain_client::{ChainQuerier, ChainQueryError};
use cl_denom_codec::{placeholder_symbol, registry, verify_trace};
use cl_storage::DenomCache;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, warn};

use crate::channel_cache::ChannelInfoCache;
use crate::error::ResolutionError;

type PendingResolution = Shared<BoxFuture<'static, Result<DenomMetadata, ResolutionError>>>;
type InFlight = Arc<Mutex<HashMap<String, PendingResolution>>>;

/// Resolves `ibc/<hash>` denoms against the chain, writing successes through
/// to the persistent cache.
///
/// At most one trace query per hash is outstanding at any time: concurrent
/// callers attach to the pending result. The query itself runs as its own
/// task, so it completes and fills the cache even if every caller gives up.
pub struct IbcResolver<Q: ?Sized, C: ?Sized> {
    querier: Arc<Q>,
    cache: Arc<C>,
    channels: Arc<ChannelInfoCache>,
    in_flight: InFlight,
}

impl<Q, C> IbcResolver<Q, C>
where
    Q: ChainQuerier + ?Sized + 'static,
    C: DenomCache + ?Sized + 'static,
{
    pub fn new(querier: Arc<Q>, cache: Arc<C>, channel_info_ttl: Duration) -> Self {
        Self {
            querier,
            cache,
            channels: Arc::new(ChannelInfoCache::new(channel_info_ttl)),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Synchronous cache probe. Storage errors count as a miss.
    pub fn cached(&self, ibc_hash: &str) -> Option<DenomMetadata> {
        match self.cache.load_trace(ibc_hash) {
            Ok(trace) => trace.map(|trace| DenomMetadata::from_trace(ibc_hash, &trace)),
            Err(err) => {
                warn!("denom cache read failed for {ibc_hash}: {err:#}");
                None
            }
        }
    }

    pub fn is_in_flight(&self, ibc_hash: &str) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&ibc_hash.to_ascii_uppercase())
    }

    /// `ibc_hash` is the bare hex digest; case does not matter.
    pub async fn resolve(&self, ibc_hash: &str) -> Result<DenomMetadata, ResolutionError> {
        let hash = ibc_hash.to_ascii_uppercase();
        if let Some(meta) = self.cached(&hash) {
            return Ok(meta);
        }

        let pending = {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            match in_flight.get(&hash) {
                Some(pending) => pending.clone(),
                None => {
                    // A resolution may have finished between the probe above and
                    // taking the lock; it writes the cache before leaving the map.
                    if let Some(meta) = self.cached(&hash) {
                        return Ok(meta);
                    }
                    let pending = self.start_resolution(hash.clone());
                    in_flight.insert(hash, pending.clone());
                    pending
                }
            }
        };

        pending.await
    }

    /// Channel metadata with a bounded staleness; failures are not cached.
    pub async fn query_channel_info(
        &self,
        channel_id: &str,
        port_id: &str,
    ) -> Result<IbcChannelInfo, ResolutionError> {
        channel_info(&*self.querier, &self.channels, channel_id, port_id)
            .await
            .map_err(ResolutionError::from)
    }

    fn start_resolution(&self, hash: String) -> PendingResolution {
        let querier = self.querier.clone();
        let cache = self.cache.clone();
        let channels = self.channels.clone();
        let in_flight = self.in_flight.clone();

        let task = tokio::spawn(async move {
            let result = fetch_trace(&*querier, &channels, &hash).await;

            if let Ok(trace) = &result {
                if let Err(err) = cache.save_trace(&hash, trace) {
                    warn!("failed to persist denom trace for {hash}: {err:#}");
                }
            }

            in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&hash);

            match result {
                Ok(trace) => {
                    debug!("resolved ibc/{hash} to {}", trace.base_denom);
                    Ok(DenomMetadata::from_trace(&hash, &trace))
                }
                Err(err) => {
                    debug!("resolution of ibc/{hash} failed: {err}");
                    Err(err)
                }
            }
        });

        async move {
            task.await.unwrap_or_else(|err| {
                Err(ResolutionError::Network(format!("resolution task aborted: {err}")))
            })
        }
        .boxed()
        .shared()
    }
}

async fn channel_info<Q: ChainQuerier + ?Sized>(
    querier: &Q,
    channels: &ChannelInfoCache,
    channel_id: &str,
    port_id: &str,
) -> Result<IbcChannelInfo, ChainQueryError> {
    if let Some(info) = channels.get(channel_id, port_id) {
        return Ok(info);
    }

    let info = querier.query_channel_info(channel_id, port_id).await?;
    channels.insert(info.clone());
    Ok(info)
}

/// Queries the trace, checks it against the hash and fills in display fields.
async fn fetch_trace<Q: ChainQuerier + ?Sized>(
    querier: &Q,
    channels: &ChannelInfoCache,
    hash: &str,
) -> Result<DenomTrace, ResolutionError> {
    let mut trace = querier.query_denom_trace(hash).await?;

    let first_hop = trace
        .hops()
        .and_then(|hops| hops.first().map(|&(port, channel)| (port.to_owned(), channel.to_owned())));
    let Some((port_id, channel_id)) = first_hop else {
        return Err(ResolutionError::Malformed(format!(
            "trace for {hash} has no channel path (base denom {:?})",
            trace.base_denom
        )));
    };

    if !verify_trace(hash, &trace) {
        return Err(ResolutionError::Malformed(format!(
            "trace {} does not hash to {hash}",
            trace.full_path()
        )));
    }

    let (symbol, decimals, name) = match registry::lookup(&trace.base_denom) {
        Some(native) => (
            native.symbol.to_owned(),
            Some(native.decimals),
            native.display_name.to_owned(),
        ),
        None => (placeholder_symbol(hash), None, trace.base_denom.clone()),
    };

    let display_name = match channel_info(querier, channels, &channel_id, &port_id).await {
        Ok(IbcChannelInfo {
            counterparty_chain_id: Some(chain_id),
            ..
        }) => format!("{name} ({chain_id})"),
        Ok(_) => name,
        Err(err) => {
            debug!("channel {port_id}/{channel_id} unavailable for enrichment: {err}");
            name
        }
    };

    trace.symbol = Some(symbol);
    trace.decimals = decimals;
    trace.display_name = Some(display_name);
    Ok(trace)
}
