// Event sinks - where drained ledger events go

use crate::events::LedgerEvent;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::broadcast;

/// Default number of events a lagging bus subscriber may fall behind
pub const DEFAULT_BUS_CAPACITY: usize = 1024;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Event sink lock poisoned")]
    Poisoned,

    #[error("Event sink storage failed: {0}")]
    Storage(String),
}

/// An append-only consumer of ledger events
///
/// Events arrive in emission order and are never re-delivered.
pub trait EventSink: Send + Sync {
    fn publish(&self, events: &[LedgerEvent]) -> Result<(), SinkError>;
}

/// In-memory event log; clones share the same log
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    entries: Arc<Mutex<Vec<LedgerEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything published so far
    pub fn events(&self) -> Vec<LedgerEvent> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .map(|entries| entries.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for EventLog {
    fn publish(&self, events: &[LedgerEvent]) -> Result<(), SinkError> {
        let mut entries = self.entries.lock().map_err(|_| SinkError::Poisoned)?;
        entries.extend_from_slice(events);
        Ok(())
    }
}

/// Broadcast channel fan-out to any number of subscribers
#[derive(Clone, Debug)]
pub struct EventBus {
    sender: broadcast::Sender<LedgerEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Receive every event published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}

impl EventSink for EventBus {
    fn publish(&self, events: &[LedgerEvent]) -> Result<(), SinkError> {
        for event in events {
            // No subscribers is not a failure: nobody is listening yet
            if self.sender.send(event.clone()).is_err() {
                tracing::trace!(event = %event, "no bus subscribers");
            }
        }
        Ok(())
    }
}
