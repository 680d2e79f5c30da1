//! `EventWatcher`: dispatches runtime events to registered handlers.

use crate::config::WatcherConfig;
use crate::source::EventSource;
use crate::store::{EventDb, KeyValueStore};
use futures::StreamExt;
use indexmap::IndexMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use subcodec_core::{EventRecord, WatchError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Callback invoked with each new record of a subscribed event.
pub type EventHandler = Arc<dyn Fn(&EventRecord) + Send + Sync>;

/// Metrics snapshot for the watcher.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatcherMetrics {
    pub dispatched: u64,
    pub unknown: u64,
    pub duplicates: u64,
    pub reconnections: u64,
}

/// Watches one contract's events.
///
/// # Usage
/// ```no_run
/// # async fn example(source: std::sync::Arc<dyn subcodec_stream::EventSource>) {
/// use std::sync::Arc;
/// use subcodec_stream::{EventWatcher, MemoryStore, WatcherConfig};
///
/// let watcher = Arc::new(EventWatcher::new(
///     WatcherConfig::new("0x01"),
///     Arc::new(MemoryStore::new()),
/// ));
/// watcher.subscribe("BlockSubmitted", |rec| println!("{}", rec.block_number));
/// let task = Arc::clone(&watcher).start(source);
/// # let _ = task.await;
/// # }
/// ```
pub struct EventWatcher {
    config: WatcherConfig,
    db: EventDb,
    handlers: RwLock<IndexMap<String, EventHandler>>,
    metrics: Mutex<WatcherMetrics>,
}

impl EventWatcher {
    pub fn new(config: WatcherConfig, store: Arc<dyn KeyValueStore>) -> Self {
        let db = EventDb::new(store, config.contract_address.clone());
        Self {
            config,
            db,
            handlers: RwLock::new(IndexMap::new()),
            metrics: Mutex::new(WatcherMetrics::default()),
        }
    }

    pub fn config(&self) -> &WatcherConfig {
        &self.config
    }

    pub fn db(&self) -> &EventDb {
        &self.db
    }

    /// Register the handler for `event`, replacing any previous one.
    pub fn subscribe<F>(&self, event: impl Into<String>, handler: F)
    where
        F: Fn(&EventRecord) + Send + Sync + 'static,
    {
        let event = event.into();
        debug!(event = %event, "handler registered");
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(event, Arc::new(handler));
    }

    /// Returns `true` if a handler was removed.
    pub fn unsubscribe(&self, event: &str) -> bool {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .shift_remove(event)
            .is_some()
    }

    /// Subscribed event names, in registration order.
    pub fn subscriptions(&self) -> Vec<String> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Returns a snapshot of current metrics.
    pub fn metrics(&self) -> WatcherMetrics {
        self.metrics.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn record_metric(&self, f: impl FnOnce(&mut WatcherMetrics)) {
        f(&mut self.metrics.lock().unwrap_or_else(PoisonError::into_inner));
    }

    /// Spawn the watch loop on the Tokio runtime.
    pub fn start(self: Arc<Self>, source: Arc<dyn EventSource>) -> JoinHandle<Result<(), WatchError>> {
        tokio::spawn(async move { self.run(source).await })
    }

    /// Subscribe, process batches and reconnect until `max_retries`
    /// consecutive failures.
    ///
    /// A failure is a failed subscription, or a stream that errors or closes
    /// before a batch was processed. A batch that fails to process ends the
    /// stream, so the source redelivers it and the seen markers dedupe what
    /// was already dispatched.
    pub async fn run(&self, source: Arc<dyn EventSource>) -> Result<(), WatchError> {
        let endpoint = source.endpoint().to_string();
        let mut failures = 0u32;
        loop {
            info!(endpoint = %endpoint, contract = %self.config.contract_address, "subscribing to events");
            match source.subscribe().await {
                Err(e) => {
                    failures += 1;
                    error!(endpoint = %endpoint, attempt = failures, "event subscription failed: {e}");
                }
                Ok(mut stream) => {
                    let mut delivered = false;
                    while let Some(item) = stream.next().await {
                        match item {
                            Err(e) => {
                                warn!(endpoint = %endpoint, "event stream error: {e}");
                                break;
                            }
                            Ok(records) => match self.process_batch(records).await {
                                Ok(_) => delivered = true,
                                Err(e) => {
                                    error!(endpoint = %endpoint, "failed to process event batch, resubscribing: {e}");
                                    break;
                                }
                            },
                        }
                    }
                    if delivered {
                        failures = 0;
                    } else {
                        failures += 1;
                    }
                    info!(endpoint = %endpoint, delivered, "event stream closed");
                }
            }

            if failures > self.config.max_retries {
                return Err(WatchError::RetriesExhausted { attempts: failures });
            }
            self.record_metric(|m| m.reconnections += 1);
            tokio::time::sleep(self.config.backoff(failures.max(1))).await;
        }
    }

    /// Dispatch one batch of records. Returns the number handed to a handler.
    ///
    /// Records already marked seen, or from blocks older than the last
    /// logged block, are skipped. Every other record is marked seen before
    /// dispatch, whether or not a handler exists for it; if the marker
    /// cannot be written the record is not dispatched.
    pub async fn process_batch(&self, records: Vec<EventRecord>) -> Result<usize, WatchError> {
        let last = self.db.last_logged_block().await?;
        let mut newest = last;
        let mut dispatched = 0;

        for record in &records {
            if last.is_some_and(|l| record.block_number < l) || self.db.is_seen(record).await? {
                debug!(event = %record.name, key = %record.key(), "skipping duplicate event");
                self.record_metric(|m| m.duplicates += 1);
                continue;
            }

            self.db.mark_seen(record).await?;
            newest = Some(newest.map_or(record.block_number, |n| n.max(record.block_number)));

            let handler = self
                .handlers
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .get(&record.name)
                .cloned();
            match handler {
                Some(handler) => {
                    handler(record);
                    dispatched += 1;
                    self.record_metric(|m| m.dispatched += 1);
                }
                None => {
                    warn!(event = %record.name, block = record.block_number, "unknown event");
                    self.record_metric(|m| m.unknown += 1);
                }
            }
        }

        if let Some(block) = newest.filter(|&n| Some(n) != last) {
            self.db.set_last_logged_block(block).await?;
        }
        Ok(dispatched)
    }
}
