use async_trait::async_trait;
use cl_api_types::{ChainDiscovery, DenomTrace, IbcChannelInfo};
use cl_chain_client::{ChainQuerier, ChainQueryError};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Notify;

/// ATOM on Osmosis over `transfer/channel-0`.
pub(crate) const ATOM_HASH: &str =
    "27394FB092D2ECCD56123C74F36E4C1F926001CEADA9CA97EA622B25F41E5EB2";

pub(crate) fn atom_channel() -> IbcChannelInfo {
    IbcChannelInfo {
        channel_id: "channel-0".to_owned(),
        port_id: "transfer".to_owned(),
        state: "STATE_OPEN".to_owned(),
        counterparty_channel_id: "channel-141".to_owned(),
        counterparty_port_id: "transfer".to_owned(),
        counterparty_chain_id: Some("cosmoshub-4".to_owned()),
    }
}

/// Scripted chain endpoint that counts every query it answers.
#[derive(Default)]
pub(crate) struct MockQuerier {
    traces: HashMap<String, Result<DenomTrace, ChainQueryError>>,
    channels: HashMap<(String, String), IbcChannelInfo>,
    discovery: Option<Result<ChainDiscovery, ChainQueryError>>,
    gate: Option<Notify>,
    released: AtomicBool,
    trace_calls: AtomicUsize,
    channel_calls: AtomicUsize,
    discovery_calls: AtomicUsize,
    last_trace_query: Mutex<Option<String>>,
}

impl MockQuerier {
    pub(crate) fn with_atom() -> Self {
        Self::default()
            .with_trace(ATOM_HASH, Ok(DenomTrace::new("uatom", "transfer/channel-0")))
            .with_channel(atom_channel())
    }

    pub(crate) fn with_trace(
        mut self,
        hash: &str,
        trace: Result<DenomTrace, ChainQueryError>,
    ) -> Self {
        self.traces.insert(hash.to_owned(), trace);
        self
    }

    pub(crate) fn with_channel(mut self, info: IbcChannelInfo) -> Self {
        self.channels
            .insert((info.port_id.clone(), info.channel_id.clone()), info);
        self
    }

    pub(crate) fn with_discovery(mut self, discovery: Result<ChainDiscovery, ChainQueryError>) -> Self {
        self.discovery = Some(discovery);
        self
    }

    /// Trace and discovery queries block until [`MockQuerier::release`].
    pub(crate) fn gated(mut self) -> Self {
        self.gate = Some(Notify::new());
        self
    }

    pub(crate) fn release(&self) {
        self.released.store(true, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notify_waiters();
            gate.notify_one();
        }
    }

    pub(crate) fn trace_calls(&self) -> usize {
        self.trace_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn channel_calls(&self) -> usize {
        self.channel_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn discovery_calls(&self) -> usize {
        self.discovery_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_trace_query(&self) -> Option<String> {
        self.last_trace_query.lock().ok().and_then(|guard| guard.clone())
    }

    async fn wait_for_gate(&self) {
        if let Some(gate) = &self.gate {
            while !self.released.load(Ordering::SeqCst) {
                gate.notified().await;
            }
        }
    }
}

#[async_trait]
impl ChainQuerier for MockQuerier {
    fn endpoint(&self) -> &str {
        "mock://chain"
    }

    async fn query_denom_trace(&self, ibc_hash: &str) -> Result<DenomTrace, ChainQueryError> {
        self.trace_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.last_trace_query.lock() {
            *guard = Some(ibc_hash.to_owned());
        }
        self.wait_for_gate().await;

        self.traces
            .get(ibc_hash)
            .cloned()
            .unwrap_or_else(|| Err(ChainQueryError::NotFound(ibc_hash.to_owned())))
    }

    async fn query_channel_info(
        &self,
        channel_id: &str,
        port_id: &str,
    ) -> Result<IbcChannelInfo, ChainQueryError> {
        self.channel_calls.fetch_add(1, Ordering::SeqCst);
        self.channels
            .get(&(port_id.to_owned(), channel_id.to_owned()))
            .cloned()
            .ok_or_else(|| ChainQueryError::NotFound(format!("{port_id}/{channel_id}")))
    }

    async fn discover_chain(&self) -> Result<ChainDiscovery, ChainQueryError> {
        self.discovery_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_for_gate().await;

        self.discovery
            .clone()
            .unwrap_or_else(|| Err(ChainQueryError::Network("no discovery scripted".to_owned())))
    }
}
