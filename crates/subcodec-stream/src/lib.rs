//! # subcodec-stream
//!
//! Watches the runtime's event feed and hands raw event payloads to
//! registered handlers.
//!
//! ## Architecture
//! ```text
//! EventSource (RPC subscription, per-block batches)
//!       │
//!       ▼
//! EventWatcher::process_batch
//!       │   ├── EventDb: skip already-seen records, advance last logged block
//!       ▼
//! handler registry (event name → handler)
//!       │
//!       ▼
//! handler decodes `EventRecord::data` with its own Shape
//! ```

pub mod config;
pub mod source;
pub mod store;
pub mod watcher;

pub use config::WatcherConfig;
pub use source::{ChannelSource, EventSource, EventStream};
pub use store::{EventDb, KeyValueStore, MemoryStore};
pub use watcher::{EventHandler, EventWatcher, WatcherMetrics};
