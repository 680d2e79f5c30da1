//! `EventSource` trait: abstraction over the node's event subscription.
//!
//! A source yields one batch of records per block. The watcher owns
//! reconnects; a source only has to open a fresh stream when asked.

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use std::sync::{Mutex, PoisonError};
use subcodec_core::{EventRecord, WatchError};
use tokio::sync::mpsc;

/// A stream of per-block event batches.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<Vec<EventRecord>, WatchError>> + Send>>;

#[async_trait]
pub trait EventSource: Send + Sync {
    /// Endpoint this source reads from, for logging.
    fn endpoint(&self) -> &str;

    /// Open a new event stream.
    async fn subscribe(&self) -> Result<EventStream, WatchError>;
}

/// Source fed from an in-process channel.
///
/// The receiver can be subscribed once; later calls fail with
/// `WatchError::Closed`, so a watcher on this source stops after the
/// sender is dropped and its retries run out.
pub struct ChannelSource {
    endpoint: String,
    rx: Mutex<Option<mpsc::Receiver<Vec<EventRecord>>>>,
}

impl ChannelSource {
    pub fn new(endpoint: impl Into<String>, capacity: usize) -> (Self, mpsc::Sender<Vec<EventRecord>>) {
        let (tx, rx) = mpsc::channel(capacity);
        let source = Self {
            endpoint: endpoint.into(),
            rx: Mutex::new(Some(rx)),
        };
        (source, tx)
    }
}

#[async_trait]
impl EventSource for ChannelSource {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn subscribe(&self) -> Result<EventStream, WatchError> {
        let rx = self
            .rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(WatchError::Closed)?;
        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|batch| (Ok(batch), rx))
        });
        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn channel_source_streams_batches_once() {
        let (source, tx) = ChannelSource::new("local", 4);
        tx.send(vec![EventRecord::new("A", 1, 0, vec![])]).await.unwrap();
        drop(tx);

        let mut stream = source.subscribe().await.unwrap();
        let batch = stream.next().await.unwrap().unwrap();
        assert_eq!(batch[0].name, "A");
        assert!(stream.next().await.is_none());

        assert!(matches!(source.subscribe().await, Err(WatchError::Closed)));
    }
}
