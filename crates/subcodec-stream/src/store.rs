//! Event persistence.
//!
//! `EventDb` keeps per-contract state in a `KeyValueStore`: the last logged
//! block number and a marker for every event already dispatched from that
//! block onwards. Both survive a watcher restart when the store does.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use subcodec_core::{decode, encode, EventRecord, Shape, Value, WatchError};
use tracing::debug;

/// Byte-oriented key/value storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, WatchError>;

    /// Insert or overwrite.
    async fn put(&self, key: &[u8], value: Vec<u8>) -> Result<(), WatchError>;

    async fn del(&self, key: &[u8]) -> Result<(), WatchError>;
}

/// Thread-safe in-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<HashMap<Vec<u8>, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, WatchError> {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        Ok(data.get(key).cloned())
    }

    async fn put(&self, key: &[u8], value: Vec<u8>) -> Result<(), WatchError> {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        data.insert(key.to_vec(), value);
        Ok(())
    }

    async fn del(&self, key: &[u8]) -> Result<(), WatchError> {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        data.remove(key);
        Ok(())
    }
}

/// Per-contract event bookkeeping on top of a `KeyValueStore`.
#[derive(Clone)]
pub struct EventDb {
    store: Arc<dyn KeyValueStore>,
    contract: String,
}

impl EventDb {
    pub fn new(store: Arc<dyn KeyValueStore>, contract: impl Into<String>) -> Self {
        Self {
            store,
            contract: contract.into(),
        }
    }

    pub fn contract(&self) -> &str {
        &self.contract
    }

    fn key(&self, kind: &str, suffix: &str) -> Vec<u8> {
        format!("{}/{kind}/{suffix}", self.contract).into_bytes()
    }

    fn last_block_key(&self) -> Vec<u8> {
        self.key("meta", "last_logged_block")
    }

    /// Highest block whose events have been dispatched, if any.
    pub async fn last_logged_block(&self) -> Result<Option<u64>, WatchError> {
        let Some(raw) = self.store.get(&self.last_block_key()).await? else {
            return Ok(None);
        };
        let value = decode(&Shape::u64(), &raw)?;
        value
            .as_u64()
            .map(Some)
            .ok_or_else(|| WatchError::Store(format!("bad last_logged_block value: {value}")))
    }

    /// Stored as the SCALE `U64` encoding. Seen markers for blocks below
    /// `block` are dropped; the block check already filters those records.
    pub async fn set_last_logged_block(&self, block: u64) -> Result<(), WatchError> {
        let raw = encode(&Value::u64(block))?;
        self.store.put(&self.last_block_key(), raw).await?;
        let pruned = self.prune_seen_below(block).await?;
        if pruned > 0 {
            debug!(contract = %self.contract, block, pruned, "pruned seen markers");
        }
        Ok(())
    }

    fn seen_key(&self, record: &EventRecord) -> Vec<u8> {
        self.key("seen", &record.key())
    }

    fn seen_index_key(&self) -> Vec<u8> {
        self.key("meta", "seen_index")
    }

    pub async fn is_seen(&self, record: &EventRecord) -> Result<bool, WatchError> {
        Ok(self.store.get(&self.seen_key(record)).await?.is_some())
    }

    /// Persist the record's payload under its `(block, index, name)` key.
    ///
    /// The marker is listed in the seen index before it is written, so a
    /// failed write never leaves a marker that pruning cannot find.
    pub async fn mark_seen(&self, record: &EventRecord) -> Result<(), WatchError> {
        let key = self.seen_key(record);
        let mut index = self.seen_index().await?;
        if !index.iter().any(|(_, k)| *k == key) {
            index.push((record.block_number, key.clone()));
            self.store_seen_index(&index).await?;
        }
        let raw = encode(&Value::bytes(record.data.clone()))?;
        self.store.put(&key, raw).await
    }

    /// Payload of a previously seen record.
    pub async fn seen_payload(&self, record: &EventRecord) -> Result<Option<Vec<u8>>, WatchError> {
        let Some(raw) = self.store.get(&self.seen_key(record)).await? else {
            return Ok(None);
        };
        let value = decode(&Shape::Bytes, &raw)?;
        Ok(value.as_bytes().map(<[u8]>::to_vec))
    }

    /// Number of seen markers currently held.
    pub async fn seen_count(&self) -> Result<usize, WatchError> {
        Ok(self.seen_index().await?.len())
    }

    async fn prune_seen_below(&self, block: u64) -> Result<usize, WatchError> {
        let (stale, live): (Vec<_>, Vec<_>) = self
            .seen_index()
            .await?
            .into_iter()
            .partition(|(b, _)| *b < block);
        if stale.is_empty() {
            return Ok(0);
        }
        for (_, key) in &stale {
            self.store.del(key).await?;
        }
        self.store_seen_index(&live).await?;
        Ok(stale.len())
    }

    /// `(block, marker key)` for every marker written, as a SCALE
    /// `Vec<(U64, Raw)>`.
    async fn seen_index(&self) -> Result<Vec<(u64, Vec<u8>)>, WatchError> {
        let Some(raw) = self.store.get(&self.seen_index_key()).await? else {
            return Ok(Vec::new());
        };
        let bad = || WatchError::Store("bad seen index entry".into());
        let value = decode(&Shape::list(seen_entry_shape()), &raw)?;
        value
            .as_list()
            .ok_or_else(bad)?
            .items()
            .iter()
            .map(|entry| match entry {
                Value::Tuple(parts) => match parts.as_slice() {
                    [block, Value::Bytes(key)] => block.as_u64().map(|b| (b, key.to_vec())).ok_or_else(bad),
                    _ => Err(bad()),
                },
                _ => Err(bad()),
            })
            .collect()
    }

    async fn store_seen_index(&self, entries: &[(u64, Vec<u8>)]) -> Result<(), WatchError> {
        if entries.is_empty() {
            return self.store.del(&self.seen_index_key()).await;
        }
        let items = entries
            .iter()
            .map(|(block, key)| Value::tuple([Value::u64(*block), Value::bytes(key.clone())]))
            .collect();
        let raw = encode(&Value::list(seen_entry_shape(), items)?)?;
        self.store.put(&self.seen_index_key(), raw).await
    }
}

fn seen_entry_shape() -> Shape {
    Shape::tuple([Shape::u64(), Shape::Bytes])
}
