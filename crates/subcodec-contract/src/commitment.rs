//! `CommitmentContract`: per-block Merkle root commitments.
//!
//! Wire layout, with `W` the configured block-number width:
//!
//! | operation                 | payload                                |
//! |---------------------------|----------------------------------------|
//! | `submit_root` call args   | `(Address, U<W>, Bytes)`               |
//! | `current_block` key/value | `Address` → `U<W>`                     |
//! | `roots` key/value         | `(Address, U<W>)` → `Bytes`            |
//! | `BlockSubmitted` event    | `(U<W>, Bytes)`                        |

use crate::client::{Call, ChainClient, TxHash};
use crate::config::ContractConfig;
use crate::error::ContractError;
use std::sync::Arc;
use subcodec_core::{decode, encode, Address, Bytes, CodecError, Shape, Value, WatchError, U256};
use subcodec_stream::{EventSource, EventWatcher, KeyValueStore, WatcherConfig};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Event emitted when a root is committed.
pub const BLOCK_SUBMITTED: &str = "BlockSubmitted";

pub struct CommitmentContract<C> {
    address: Address,
    client: Arc<C>,
    config: ContractConfig,
    watcher: Arc<EventWatcher>,
}

impl<C: ChainClient> CommitmentContract<C> {
    /// `event_db` holds the watcher's seen-event state for this contract.
    pub fn new(
        address: Address,
        client: Arc<C>,
        event_db: Arc<dyn KeyValueStore>,
        config: ContractConfig,
    ) -> Self {
        Self::with_watcher_config(address, client, event_db, config, |_| {})
    }

    /// Like [`new`](Self::new), with a hook to adjust the watcher's
    /// retry settings. The contract address is always this contract's.
    pub fn with_watcher_config(
        address: Address,
        client: Arc<C>,
        event_db: Arc<dyn KeyValueStore>,
        config: ContractConfig,
        tweak: impl FnOnce(&mut WatcherConfig),
    ) -> Self {
        let mut watcher_config = WatcherConfig::new(address.to_string());
        tweak(&mut watcher_config);
        watcher_config.contract_address = address.to_string();
        Self {
            watcher: Arc::new(EventWatcher::new(watcher_config, event_db)),
            address,
            client,
            config,
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn config(&self) -> &ContractConfig {
        &self.config
    }

    pub fn watcher(&self) -> &Arc<EventWatcher> {
        &self.watcher
    }

    fn block_number(&self, n: U256) -> Value {
        Value::uint(n, self.config.block_number_width)
    }

    fn block_number_shape(&self) -> Shape {
        Shape::Uint(self.config.block_number_width)
    }

    /// Commit `root` as the Merkle root of plasma block `block_number`.
    pub async fn submit(&self, block_number: U256, root: Bytes) -> Result<TxHash, ContractError> {
        let args = encode(&Value::tuple([
            Value::Address(self.address.clone()),
            self.block_number(block_number),
            Value::Bytes(root),
        ]))?;
        info!(contract = %self.address, block = %block_number, "submitting root");
        let call = Call::new(&self.config.pallet, "submit_root", args);
        let tx = self.client.submit(call).await?;
        debug!(tx = %tx, "root submitted");
        Ok(tx)
    }

    /// Latest committed plasma block. Zero if nothing has been committed.
    pub async fn current_block(&self) -> Result<U256, ContractError> {
        let key = encode(&Value::Address(self.address.clone()))?;
        let Some(raw) = self.client.query(&self.config.pallet, "current_block", &key).await? else {
            return Ok(U256::ZERO);
        };
        let value = decode(&self.block_number_shape(), &raw)?;
        value.as_uint().ok_or_else(|| ContractError::UnexpectedValue {
            item: "current_block".into(),
            value: value.to_string(),
        })
    }

    /// Root committed for `block_number`, if any.
    pub async fn root(&self, block_number: U256) -> Result<Option<Bytes>, ContractError> {
        let key = encode(&Value::tuple([
            Value::Address(self.address.clone()),
            self.block_number(block_number),
        ]))?;
        let Some(raw) = self.client.query(&self.config.pallet, "roots", &key).await? else {
            return Ok(None);
        };
        match decode(&Shape::Bytes, &raw)? {
            Value::Bytes(root) => Ok(Some(root)),
            other => Err(ContractError::UnexpectedValue {
                item: "roots".into(),
                value: other.to_string(),
            }),
        }
    }

    /// Call `handler(block_number, root)` for every `BlockSubmitted` event.
    ///
    /// Payloads that fail to decode are logged and dropped.
    pub fn subscribe_block_submitted<F>(&self, handler: F)
    where
        F: Fn(U256, Bytes) + Send + Sync + 'static,
    {
        let shape = Shape::tuple([self.block_number_shape(), Shape::Bytes]);
        self.watcher.subscribe(BLOCK_SUBMITTED, move |record| {
            match decode_block_submitted(&shape, &record.data) {
                Ok((block_number, root)) => handler(block_number, root),
                Err(e) => error!(key = %record.key(), "undecodable {BLOCK_SUBMITTED} payload: {e}"),
            }
        });
    }

    /// Start the contract's event watcher on `source`.
    pub fn start_watching(&self, source: Arc<dyn EventSource>) -> JoinHandle<Result<(), WatchError>> {
        Arc::clone(&self.watcher).start(source)
    }
}

fn decode_block_submitted(shape: &Shape, data: &[u8]) -> Result<(U256, Bytes), CodecError> {
    let value = decode(shape, data)?;
    match value {
        Value::Tuple(mut items) if items.len() == 2 => {
            let root = items.pop();
            let number = items.pop();
            match (number, root) {
                (Some(Value::Uint(n)), Some(Value::Bytes(root))) => Ok((n.value, root)),
                _ => Err(CodecError::ShapeMismatch {
                    expected: shape.to_string(),
                    got: "unexpected components".into(),
                }),
            }
        }
        other => Err(CodecError::ShapeMismatch {
            expected: shape.to_string(),
            got: other.shape().to_string(),
        }),
    }
}
