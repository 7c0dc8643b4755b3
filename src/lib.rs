//! Fungible-token ledger: balances, allowances, and delegated transfers.
//!
//! The [`ledger::Ledger`] is a plain in-process state machine. Every
//! successful mutation appends a [`events::LedgerEvent`] to its outbox, and
//! [`ledger::SharedLedger`] serializes mutations for multi-threaded callers
//! while forwarding events to [`events::EventSink`]s. Durable state goes
//! through the [`storage::KeyValueStore`] contract.

pub mod deploy;
pub mod events;
pub mod identity;
pub mod ledger;
pub mod storage;
