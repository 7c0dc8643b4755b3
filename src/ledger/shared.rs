// SharedLedger - a ledger that many threads may call into
//
// One RwLock guards the whole ledger: mutations hold the write lock for the
// full validate/apply/publish step, queries hold the read lock. Events are
// published to sinks while the write lock is held, so every sink sees the
// same total order.

use crate::events::{EventSink, LedgerEvent};
use crate::identity::Address;
use crate::ledger::{Amount, Ledger, LedgerError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::warn;

struct Inner {
    ledger: RwLock<Ledger>,
    sinks: Vec<Box<dyn EventSink>>,
    delivery_failures: AtomicU64,
}

/// Cloneable handle to a ledger shared between threads
///
/// Event delivery never changes the outcome of an operation: once a mutation
/// is applied it is reported as `Ok`, every sink is offered its events, and a
/// sink that fails is logged and counted in `delivery_failures`.
#[derive(Clone)]
pub struct SharedLedger {
    inner: Arc<Inner>,
}

impl SharedLedger {
    /// Wrap a ledger, delivering any events it already holds (such as the issuance) to `sinks`
    pub fn new(mut ledger: Ledger, sinks: Vec<Box<dyn EventSink>>) -> Self {
        let pending = ledger.drain_events();
        let shared = Self {
            inner: Arc::new(Inner {
                ledger: RwLock::new(ledger),
                sinks,
                delivery_failures: AtomicU64::new(0),
            }),
        };
        shared.publish(&pending);
        shared
    }

    // Mutations validate before writing, so a panic while the lock is held
    // cannot leave a half-applied operation behind; a poisoned lock still
    // guards a consistent ledger.
    fn read(&self) -> RwLockReadGuard<'_, Ledger> {
        self.inner.ledger.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Ledger> {
        self.inner.ledger.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run one mutation and publish what it emitted, all under the write lock
    fn mutate<F>(&self, op: F) -> Result<(), LedgerError>
    where
        F: FnOnce(&mut Ledger) -> Result<(), LedgerError>,
    {
        let mut ledger = self.write();
        op(&mut ledger)?;
        let events = ledger.drain_events();
        self.publish(&events);
        Ok(())
    }

    /// Offer `events` to every sink; one sink failing does not starve the rest
    fn publish(&self, events: &[LedgerEvent]) {
        if events.is_empty() {
            return;
        }
        for (index, sink) in self.inner.sinks.iter().enumerate() {
            if let Err(e) = sink.publish(events) {
                self.inner.delivery_failures.fetch_add(1, Ordering::Relaxed);
                warn!(sink = index, events = events.len(), error = %e, "event delivery failed");
            }
        }
    }

    /// Number of (sink, batch) deliveries that have failed so far
    pub fn delivery_failures(&self) -> u64 {
        self.inner.delivery_failures.load(Ordering::Relaxed)
    }

    pub fn transfer(
        &self,
        sender: Address,
        recipient: Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        self.mutate(|ledger| ledger.transfer(sender, recipient, amount))
    }

    pub fn approve(
        &self,
        owner: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        self.mutate(|ledger| ledger.approve(owner, spender, amount))
    }

    pub fn transfer_from(
        &self,
        caller: Address,
        owner: Address,
        recipient: Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        self.mutate(|ledger| ledger.transfer_from(caller, owner, recipient, amount))
    }

    pub fn balance_of(&self, address: Address) -> Amount {
        self.read().balance_of(address)
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> Amount {
        self.read().allowance(owner, spender)
    }

    pub fn total_supply(&self) -> Amount {
        self.read().total_supply()
    }

    pub fn name(&self) -> String {
        self.read().name().to_string()
    }

    pub fn symbol(&self) -> String {
        self.read().symbol().to_string()
    }

    /// Run a read-only closure against a consistent view of the ledger
    pub fn with_ledger<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        f(&self.read())
    }

    /// Clone of the current state, with an empty outbox
    pub fn snapshot(&self) -> Ledger {
        self.read().clone()
    }
}
