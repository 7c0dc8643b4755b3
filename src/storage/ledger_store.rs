// LedgerStore - typed persistence on top of any KeyValueStore
//
// Provides typed access for storing:
// - The ledger snapshot
// - The append-only event log
// - Labelled account keypairs

use crate::events::{EventCodec, EventSink, LedgerEvent, SinkError};
use crate::identity::Keypair;
use crate::ledger::Ledger;
use crate::storage::{KeyValueStore, StoreError, WriteBatch};
use std::sync::Arc;
use tracing::{debug, info};

/// Key prefixes for organizing data
mod keys {
    pub const LEDGER_SNAPSHOT: &[u8] = b"ledger:snapshot";
    pub const EVENT_PREFIX: &[u8] = b"events:";
    pub const EVENT_SEQ: &[u8] = b"meta:event_seq";
    pub const KEYPAIR_PREFIX: &[u8] = b"identity:keypair:";
}

fn event_key(seq: u64) -> Vec<u8> {
    [keys::EVENT_PREFIX, &seq.to_be_bytes()].concat()
}

fn keypair_key(label: &str) -> Vec<u8> {
    [keys::KEYPAIR_PREFIX, label.as_bytes()].concat()
}

fn snapshot_bytes(ledger: &Ledger) -> Result<Vec<u8>, StoreError> {
    ledger
        .to_bytes()
        .map_err(|e| StoreError::SerializationFailed(e.to_string()))
}

/// Ledger-aware view over a key-value backend; clones share the backend
pub struct LedgerStore<S> {
    kv: Arc<S>,
}

impl<S> Clone for LedgerStore<S> {
    fn clone(&self) -> Self {
        Self {
            kv: Arc::clone(&self.kv),
        }
    }
}

impl<S: KeyValueStore> LedgerStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv: Arc::new(kv) }
    }

    /// The underlying key-value backend
    pub fn backend(&self) -> &S {
        &self.kv
    }

    /// Flush all pending writes
    pub fn flush(&self) -> Result<(), StoreError> {
        self.kv.flush()
    }

    // ========================================================================
    // LEDGER SNAPSHOT
    // ========================================================================

    /// Whether a ledger has been saved
    pub fn has_ledger(&self) -> Result<bool, StoreError> {
        Ok(self.kv.get_raw(keys::LEDGER_SNAPSHOT)?.is_some())
    }

    /// Save the ledger state (its pending events are not part of the snapshot)
    pub fn save_ledger(&self, ledger: &Ledger) -> Result<(), StoreError> {
        let bytes = snapshot_bytes(ledger)?;
        self.kv.put_raw(keys::LEDGER_SNAPSHOT, &bytes)?;
        debug!(bytes = bytes.len(), "ledger snapshot saved");
        Ok(())
    }

    /// Save the snapshot and append `events` in one atomic write.
    /// Either both land or the store is left as it was. Returns the new event count.
    pub fn commit(&self, ledger: &Ledger, events: &[LedgerEvent]) -> Result<u64, StoreError> {
        let bytes = snapshot_bytes(ledger)?;
        let mut batch = WriteBatch::new();
        batch.put(keys::LEDGER_SNAPSHOT, bytes);
        let seq = self.stage_events(&mut batch, events)?;
        self.kv.apply_batch(batch)?;
        debug!(events = events.len(), event_count = seq, "ledger committed");
        Ok(seq)
    }

    /// Load the ledger state
    pub fn load_ledger(&self) -> Result<Option<Ledger>, StoreError> {
        match self.kv.get_raw(keys::LEDGER_SNAPSHOT)? {
            Some(bytes) => {
                let ledger = Ledger::from_bytes(&bytes)
                    .map_err(|e| StoreError::DeserializationFailed(e.to_string()))?;
                Ok(Some(ledger))
            }
            None => Ok(None),
        }
    }

    // ========================================================================
    // EVENT LOG
    // ========================================================================

    /// Number of events persisted so far
    pub fn event_count(&self) -> Result<u64, StoreError> {
        match self.kv.get_raw(keys::EVENT_SEQ)? {
            Some(bytes) => {
                let array: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
                    StoreError::DeserializationFailed("Invalid event sequence length".to_string())
                })?;
                Ok(u64::from_be_bytes(array))
            }
            None => Ok(0),
        }
    }

    /// Append events after the last stored one. Returns the new event count.
    pub fn append_events(&self, events: &[LedgerEvent]) -> Result<u64, StoreError> {
        let mut batch = WriteBatch::new();
        let seq = self.stage_events(&mut batch, events)?;
        self.kv.apply_batch(batch)?;
        Ok(seq)
    }

    /// Queue `events` and the bumped sequence number into `batch`
    fn stage_events(
        &self,
        batch: &mut WriteBatch,
        events: &[LedgerEvent],
    ) -> Result<u64, StoreError> {
        let mut seq = self.event_count()?;
        for event in events {
            let bytes = EventCodec::encode(event)
                .map_err(|e| StoreError::SerializationFailed(e.to_string()))?;
            batch.put(event_key(seq), bytes);
            seq += 1;
        }
        batch.put(keys::EVENT_SEQ, seq.to_be_bytes());
        Ok(seq)
    }

    /// The full event log, oldest first
    pub fn events(&self) -> Result<Vec<LedgerEvent>, StoreError> {
        self.kv
            .scan_prefix(keys::EVENT_PREFIX)?
            .into_iter()
            .map(|(_, bytes)| {
                EventCodec::decode(&bytes)
                    .map_err(|e| StoreError::DeserializationFailed(e.to_string()))
            })
            .collect()
    }

    // ========================================================================
    // IDENTITY PERSISTENCE
    // ========================================================================

    /// Save a keypair under a label, replacing any previous one
    pub fn save_keypair(&self, label: &str, keypair: &Keypair) -> Result<(), StoreError> {
        self.kv.put_raw(&keypair_key(label), &keypair.to_bytes())?;
        info!(label, address = %keypair.address(), "keypair stored");
        Ok(())
    }

    /// Load a keypair by label
    pub fn load_keypair(&self, label: &str) -> Result<Option<Keypair>, StoreError> {
        match self.kv.get_raw(&keypair_key(label))? {
            Some(bytes) => {
                let keypair = Keypair::from_bytes(&bytes)
                    .map_err(|e| StoreError::DeserializationFailed(e.to_string()))?;
                Ok(Some(keypair))
            }
            None => Ok(None),
        }
    }

    /// Labels of all stored keypairs, sorted
    pub fn keypair_labels(&self) -> Result<Vec<String>, StoreError> {
        self.kv
            .scan_prefix(keys::KEYPAIR_PREFIX)?
            .into_iter()
            .map(|(key, _)| {
                String::from_utf8(key[keys::KEYPAIR_PREFIX.len()..].to_vec())
                    .map_err(|e| StoreError::DeserializationFailed(e.to_string()))
            })
            .collect()
    }
}

impl<S: KeyValueStore> EventSink for LedgerStore<S> {
    fn publish(&self, events: &[LedgerEvent]) -> Result<(), SinkError> {
        self.append_events(events)
            .map(|_| ())
            .map_err(|e| SinkError::Storage(e.to_string()))
    }
}
