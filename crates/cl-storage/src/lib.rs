use anyhow::{Context, Result, anyhow};
use cl_api_types::DenomTrace;
use rocksdb::{DB, IteratorMode, Options};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Durable map from IBC hash to its resolved trace.
///
/// Reads are synchronous so the display path can consult the cache without
/// suspending. Entries are written once and never invalidated: a hash is a
/// deterministic function of its trace.
pub trait DenomCache: Send + Sync {
    fn load_trace(&self, ibc_hash: &str) -> Result<Option<DenomTrace>>;
    fn save_trace(&self, ibc_hash: &str, trace: &DenomTrace) -> Result<()>;
}

#[derive(Default)]
pub struct InMemoryDenomCache {
    traces: RwLock<HashMap<String, DenomTrace>>,
}

impl DenomCache for InMemoryDenomCache {
    fn load_trace(&self, ibc_hash: &str) -> Result<Option<DenomTrace>> {
        let guard = self
            .traces
            .read()
            .map_err(|_| anyhow!("denom cache lock poisoned"))?;
        Ok(guard.get(ibc_hash).cloned())
    }

    fn save_trace(&self, ibc_hash: &str, trace: &DenomTrace) -> Result<()> {
        let mut guard = self
            .traces
            .write()
            .map_err(|_| anyhow!("denom cache lock poisoned"))?;
        guard.insert(ibc_hash.to_owned(), trace.clone());
        Ok(())
    }
}

pub struct RocksDbDenomCache {
    db: Arc<DB>,
}

impl RocksDbDenomCache {
    pub fn open_default(path: &str) -> Result<Self> {
        let mut options = Options::default();
        options.create_if_missing(true);
        let db = DB::open(&options, path)
            .with_context(|| format!("failed to open denom cache at {path}"))?;
        Ok(Self { db: Arc::new(db) })
    }

    fn key_for_trace(ibc_hash: &str) -> String {
        format!("denom-trace:{ibc_hash}")
    }

    /// Every cached `(hash, trace)` pair, in key order.
    pub fn list_traces(&self) -> Result<Vec<(String, DenomTrace)>> {
        let mut traces = Vec::new();

        for entry in self.db.iterator(IteratorMode::Start) {
            let (key, value) = entry?;
            let Some(hash) = key.as_ref().strip_prefix(b"denom-trace:") else {
                continue;
            };

            let hash = String::from_utf8(hash.to_vec())?;
            let trace = serde_json::from_slice::<DenomTrace>(&value)?;
            traces.push((hash, trace));
        }

        Ok(traces)
    }
}

impl DenomCache for RocksDbDenomCache {
    fn load_trace(&self, ibc_hash: &str) -> Result<Option<DenomTrace>> {
        let key = Self::key_for_trace(ibc_hash);
        let value = self.db.get(key.as_bytes())?;
        match value {
            Some(raw) => Ok(Some(serde_json::from_slice::<DenomTrace>(&raw)?)),
            None => Ok(None),
        }
    }

    fn save_trace(&self, ibc_hash: &str, trace: &DenomTrace) -> Result<()> {
        let key = Self::key_for_trace(ibc_hash);
        let value = serde_json::to_vec(trace)?;
        self.db.put(key.as_bytes(), value)?;
        Ok(())
    }
}
