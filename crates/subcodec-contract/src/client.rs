//! The `ChainClient` trait: the boundary to a node's RPC.

use async_trait::async_trait;
use subcodec_core::ChainError;

/// Transaction hash returned by the node, as `0x` hex.
pub type TxHash = String;

/// A runtime call with SCALE-encoded arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub pallet: String,
    pub method: String,
    /// Arguments encoded as one tuple, in declaration order.
    pub args: Vec<u8>,
}

impl Call {
    pub fn new(pallet: impl Into<String>, method: impl Into<String>, args: Vec<u8>) -> Self {
        Self {
            pallet: pallet.into(),
            method: method.into(),
            args,
        }
    }
}

/// Node access used by contract clients.
///
/// Implementations own connection handling and extrinsic signing. The
/// trait is object-safe and can be stored as `Arc<dyn ChainClient>`.
#[async_trait]
pub trait ChainClient: Send + Sync + 'static {
    /// Sign and submit a call.
    async fn submit(&self, call: Call) -> Result<TxHash, ChainError>;

    /// Read a storage item. `key` is the SCALE encoding of the map key.
    /// Returns `None` when the item is absent.
    async fn query(&self, pallet: &str, item: &str, key: &[u8]) -> Result<Option<Vec<u8>>, ChainError>;

    /// Node URL or name, for logging.
    fn endpoint(&self) -> &str;
}
