// Storage module - PERSISTENCE
// The key-value contract, its sled and in-memory backends, and typed ledger persistence

mod kv;
mod ledger_store;
mod store;

pub use kv::{KeyValueStore, MemoryStore, WriteBatch};
pub use ledger_store::LedgerStore;
pub use store::{SledStore, StorageStats, StoreError};
