// Event Sink Tests
// In-memory log, broadcast bus, and delivery through a shared ledger

use ourtoken::events::{EventBus, EventLog, EventSink, LedgerEvent};
use ourtoken::identity::Address;
use ourtoken::ledger::{Ledger, SharedLedger};
use tokio::sync::broadcast::error::TryRecvError;

#[test]
fn test_event_log_appends_in_order() {
    let log = EventLog::new();
    let a = Address::generate();
    let b = Address::generate();

    log.publish(&[LedgerEvent::transfer(Address::ZERO, a, 10)]).unwrap();
    log.publish(&[
        LedgerEvent::approval(a, b, 3),
        LedgerEvent::transfer(a, b, 3),
    ])
    .unwrap();

    let events = log.events();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].name(), "Transfer");
    assert_eq!(events[1].name(), "Approval");
    assert_eq!(events[2], LedgerEvent::transfer(a, b, 3));
}

#[test]
fn test_bus_subscriber_only_sees_later_events() {
    let bus = EventBus::default();
    let a = Address::generate();

    bus.publish(&[LedgerEvent::transfer(Address::ZERO, a, 1)]).unwrap();
    let mut rx = bus.subscribe();
    bus.publish(&[LedgerEvent::transfer(Address::ZERO, a, 2)]).unwrap();

    assert_eq!(rx.try_recv().unwrap().amount(), 2);
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_bus_fans_out_shared_ledger_events() {
    let issuer = Address::generate();
    let bob = Address::generate();
    let bus = EventBus::new(16);
    let mut first = bus.subscribe();
    let mut second = bus.subscribe();
    assert_eq!(bus.subscriber_count(), 2);

    let ledger = Ledger::new(1000, "OurToken", "OT", issuer).unwrap();
    let shared = SharedLedger::new(ledger, vec![Box::new(bus.clone())]);
    shared.transfer(issuer, bob, 50).unwrap();

    for rx in [&mut first, &mut second] {
        let issuance = rx.recv().await.unwrap();
        assert!(issuance.is_issuance());
        assert_eq!(rx.recv().await.unwrap(), LedgerEvent::transfer(issuer, bob, 50));
    }
}

#[test]
fn test_multiple_sinks_receive_identical_streams() {
    let issuer = Address::generate();
    let bob = Address::generate();
    let first = EventLog::new();
    let second = EventLog::new();

    let ledger = Ledger::new(1000, "OurToken", "OT", issuer).unwrap();
    let shared = SharedLedger::new(
        ledger,
        vec![Box::new(first.clone()), Box::new(second.clone())],
    );
    shared.approve(issuer, bob, 5).unwrap();
    let _ = shared.transfer_from(bob, issuer, bob, 6);
    shared.transfer_from(bob, issuer, bob, 5).unwrap();

    assert_eq!(first.events(), second.events());
    assert_eq!(first.len(), 3);
}
