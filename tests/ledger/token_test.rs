// Ledger Tests
// Construction, queries, transfer and approve

use ourtoken::events::LedgerEvent;
use ourtoken::identity::{Address, Keypair};
use ourtoken::ledger::{Ledger, LedgerError, DEFAULT_DECIMALS};

fn issue(supply: u128) -> (Ledger, Address) {
    let issuer = Keypair::generate().address();
    let ledger = Ledger::new(supply, "OurToken", "OT", issuer).unwrap();
    (ledger, issuer)
}

// ============================================================================
// CONSTRUCTION
// ============================================================================

#[test]
fn test_construction_assigns_supply_to_issuer() {
    let (ledger, issuer) = issue(1000);

    assert_eq!(ledger.balance_of(issuer), 1000);
    assert_eq!(ledger.total_supply(), 1000);
    assert_eq!(ledger.name(), "OurToken");
    assert_eq!(ledger.symbol(), "OT");
    assert_eq!(ledger.decimals(), DEFAULT_DECIMALS);
}

#[test]
fn test_construction_leaves_other_accounts_empty() {
    let (ledger, _) = issue(1000);

    for _ in 0..10 {
        assert_eq!(ledger.balance_of(Address::generate()), 0);
    }
    assert_eq!(ledger.balance_of(Address::ZERO), 0);
}

#[test]
fn test_construction_emits_issuance_transfer() {
    let (ledger, issuer) = issue(1000);

    assert_eq!(ledger.events().len(), 1);
    assert!(ledger.events()[0].is_issuance());
    assert_eq!(
        ledger.events()[0],
        LedgerEvent::transfer(Address::ZERO, issuer, 1000)
    );
}

#[test]
fn test_construction_with_zero_supply() {
    let (ledger, issuer) = issue(0);

    assert_eq!(ledger.total_supply(), 0);
    assert_eq!(ledger.balance_of(issuer), 0);
    assert!(ledger.holders().is_empty());
}

#[test]
fn test_construction_rejects_bad_metadata() {
    let issuer = Address::generate();

    for (name, symbol) in [("", "OT"), ("OurToken", ""), ("OurToken", "WAYTOOLONGSYM")] {
        let result = Ledger::new(1000, name, symbol, issuer);
        assert!(
            matches!(result, Err(LedgerError::InvalidConstructionArgument(_))),
            "accepted name={:?} symbol={:?}",
            name,
            symbol
        );
    }
}

// ============================================================================
// TRANSFER
// ============================================================================

#[test]
fn test_transfer_moves_balance() {
    let (mut ledger, issuer) = issue(1000);
    let bob = Address::generate();
    ledger.drain_events();

    ledger.transfer(issuer, bob, 50).unwrap();

    assert_eq!(ledger.balance_of(issuer), 950);
    assert_eq!(ledger.balance_of(bob), 50);
    assert_eq!(ledger.events(), &[LedgerEvent::transfer(issuer, bob, 50)]);
}

#[test]
fn test_transfer_insufficient_balance_changes_nothing() {
    let (mut ledger, issuer) = issue(1000);
    let bob = Address::generate();
    ledger.drain_events();

    let result = ledger.transfer(issuer, bob, 2000);

    assert_eq!(
        result,
        Err(LedgerError::InsufficientBalance {
            balance: 1000,
            needed: 2000
        })
    );
    assert_eq!(ledger.balance_of(issuer), 1000);
    assert_eq!(ledger.balance_of(bob), 0);
    assert!(ledger.events().is_empty());
}

#[test]
fn test_transfer_to_null_address_rejected() {
    let (mut ledger, issuer) = issue(1000);

    let result = ledger.transfer(issuer, Address::ZERO, 10);

    assert_eq!(result, Err(LedgerError::InvalidRecipient));
    assert_eq!(ledger.balance_of(issuer), 1000);
}

#[test]
fn test_transfer_from_null_address_rejected() {
    let (mut ledger, _) = issue(1000);

    let result = ledger.transfer(Address::ZERO, Address::generate(), 0);

    assert_eq!(result, Err(LedgerError::InvalidSender));
}

#[test]
fn test_null_recipient_reported_before_balance() {
    let (mut ledger, _) = issue(1000);
    let broke = Address::generate();

    let result = ledger.transfer(broke, Address::ZERO, 10);

    assert_eq!(result, Err(LedgerError::InvalidRecipient));
}

#[test]
fn test_self_transfer_is_net_noop_but_emits() {
    let (mut ledger, issuer) = issue(1000);
    ledger.drain_events();

    ledger.transfer(issuer, issuer, 400).unwrap();

    assert_eq!(ledger.balance_of(issuer), 1000);
    assert_eq!(ledger.events(), &[LedgerEvent::transfer(issuer, issuer, 400)]);
}

#[test]
fn test_self_transfer_still_requires_balance() {
    let (mut ledger, issuer) = issue(1000);

    let result = ledger.transfer(issuer, issuer, 1001);

    assert!(matches!(result, Err(LedgerError::InsufficientBalance { .. })));
}

#[test]
fn test_transfer_entire_balance_and_zero_amount() {
    let (mut ledger, issuer) = issue(1000);
    let bob = Address::generate();

    ledger.transfer(issuer, bob, 1000).unwrap();
    ledger.transfer(issuer, bob, 0).unwrap();

    assert_eq!(ledger.balance_of(issuer), 0);
    assert_eq!(ledger.balance_of(bob), 1000);
    assert_eq!(ledger.holders(), vec![(bob, 1000)]);
}

#[test]
fn test_transfer_at_u128_scale() {
    let (mut ledger, issuer) = issue(u128::MAX);
    let bob = Address::generate();

    ledger.transfer(issuer, bob, u128::MAX).unwrap();

    assert_eq!(ledger.balance_of(bob), u128::MAX);
    assert!(ledger.check_supply_invariant());
}

// ============================================================================
// APPROVE
// ============================================================================

#[test]
fn test_approve_sets_allowance_and_emits() {
    let (mut ledger, issuer) = issue(1000);
    let bob = Address::generate();
    ledger.drain_events();

    ledger.approve(issuer, bob, 50).unwrap();

    assert_eq!(ledger.allowance(issuer, bob), 50);
    assert_eq!(ledger.allowance(bob, issuer), 0);
    assert_eq!(ledger.events(), &[LedgerEvent::approval(issuer, bob, 50)]);
}

#[test]
fn test_approve_overwrites() {
    let (mut ledger, issuer) = issue(1000);
    let bob = Address::generate();

    ledger.approve(issuer, bob, 50).unwrap();
    ledger.approve(issuer, bob, 10).unwrap();

    assert_eq!(ledger.allowance(issuer, bob), 10);
    assert_eq!(
        ledger.events().last(),
        Some(&LedgerEvent::approval(issuer, bob, 10))
    );
}

#[test]
fn test_approve_may_exceed_balance() {
    let (mut ledger, issuer) = issue(1000);
    let bob = Address::generate();

    ledger.approve(issuer, bob, 1_000_000).unwrap();

    assert_eq!(ledger.allowance(issuer, bob), 1_000_000);
    assert_eq!(ledger.balance_of(issuer), 1000);
}

#[test]
fn test_approve_null_spender_rejected() {
    let (mut ledger, issuer) = issue(1000);
    ledger.drain_events();

    let result = ledger.approve(issuer, Address::ZERO, 50);

    assert_eq!(result, Err(LedgerError::InvalidSpender));
    assert!(ledger.events().is_empty());
}

#[test]
fn test_approve_from_null_owner_rejected() {
    let (mut ledger, _) = issue(1000);

    let result = ledger.approve(Address::ZERO, Address::generate(), 50);

    assert_eq!(result, Err(LedgerError::InvalidApprover));
}

// ============================================================================
// QUERIES
// ============================================================================

#[test]
fn test_queries_are_idempotent() {
    let (mut ledger, issuer) = issue(1000);
    let bob = Address::generate();
    ledger.transfer(issuer, bob, 30).unwrap();
    ledger.approve(bob, issuer, 5).unwrap();
    let events_before = ledger.events().len();

    let first = (ledger.balance_of(bob), ledger.allowance(bob, issuer));
    for _ in 0..5 {
        assert_eq!((ledger.balance_of(bob), ledger.allowance(bob, issuer)), first);
    }
    assert_eq!(ledger.events().len(), events_before);
}

#[test]
fn test_statistics_count_non_zero_entries() {
    let (mut ledger, issuer) = issue(1000);
    let bob = Address::generate();
    let carol = Address::generate();

    ledger.transfer(issuer, bob, 100).unwrap();
    ledger.approve(issuer, carol, 10).unwrap();
    ledger.approve(issuer, bob, 0).unwrap();

    let stats = ledger.statistics();
    assert_eq!(stats.holder_count, 2);
    assert_eq!(stats.allowance_count, 1);
    assert_eq!(stats.total_supply, 1000);
}
