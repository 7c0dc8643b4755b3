// Ledger - balances, allowances, and the operations that move them
//
// Every mutating operation validates fully before touching state, so a
// rejected call leaves balances, allowances and the event outbox untouched.

use crate::events::LedgerEvent;
use crate::identity::Address;
use crate::ledger::metadata::TokenMetadata;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, warn};

/// Token quantity in base units
pub type Amount = u128;

/// Errors that can occur during ledger operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient balance: balance {balance}, needed {needed}")]
    InsufficientBalance { balance: Amount, needed: Amount },

    #[error("Insufficient allowance: allowance {allowance}, needed {needed}")]
    InsufficientAllowance { allowance: Amount, needed: Amount },

    #[error("Invalid recipient: the null address cannot receive tokens")]
    InvalidRecipient,

    #[error("Invalid spender: the null address cannot be approved")]
    InvalidSpender,

    #[error("Invalid sender: the null address cannot send tokens")]
    InvalidSender,

    #[error("Invalid approver: the null address cannot grant allowances")]
    InvalidApprover,

    #[error("Invalid construction argument: {0}")]
    InvalidConstructionArgument(String),

    #[error("Balance would overflow")]
    BalanceOverflow,

    #[error("Snapshot error: {0}")]
    SnapshotFailed(String),
}

/// Summary of the ledger's current shape
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerStatistics {
    /// Accounts holding a non-zero balance
    pub holder_count: usize,
    /// Owner/spender pairs with a non-zero allowance
    pub allowance_count: usize,
    pub total_supply: Amount,
}

/// The token ledger
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Ledger {
    metadata: TokenMetadata,
    total_supply: Amount,
    balances: BTreeMap<Address, Amount>,
    /// (owner, spender) -> remaining allowance
    allowances: BTreeMap<(Address, Address), Amount>,
    /// Events emitted since the last drain
    #[serde(skip)]
    outbox: Vec<LedgerEvent>,
}

impl Ledger {
    /// Create a ledger whose entire supply belongs to `issuer`.
    ///
    /// Emits `Transfer(ZERO, issuer, initial_supply)`.
    pub fn new(
        initial_supply: Amount,
        name: &str,
        symbol: &str,
        issuer: Address,
    ) -> Result<Self, LedgerError> {
        let metadata =
            TokenMetadata::new(name, symbol).map_err(LedgerError::InvalidConstructionArgument)?;

        if issuer.is_zero() {
            return Err(LedgerError::InvalidConstructionArgument(
                "issuer must not be the null address".into(),
            ));
        }

        let mut balances = BTreeMap::new();
        balances.insert(issuer, initial_supply);

        let mut ledger = Self {
            metadata,
            total_supply: initial_supply,
            balances,
            allowances: BTreeMap::new(),
            outbox: Vec::new(),
        };
        ledger.emit(LedgerEvent::transfer(Address::ZERO, issuer, initial_supply));

        debug!(%issuer, initial_supply, symbol, "ledger issued");
        Ok(ledger)
    }

    // ========================================================================
    // IDENTITY QUERIES
    // ========================================================================

    pub fn name(&self) -> &str {
        self.metadata.name()
    }

    pub fn symbol(&self) -> &str {
        self.metadata.symbol()
    }

    pub fn decimals(&self) -> u8 {
        self.metadata.decimals()
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    pub fn metadata(&self) -> &TokenMetadata {
        &self.metadata
    }

    // ========================================================================
    // BALANCE QUERIES
    // ========================================================================

    /// Current balance; zero for accounts never credited
    pub fn balance_of(&self, address: Address) -> Amount {
        self.balances.get(&address).copied().unwrap_or(0)
    }

    /// What `spender` may still move out of `owner`'s balance; zero if never set
    pub fn allowance(&self, owner: Address, spender: Address) -> Amount {
        self.allowances.get(&(owner, spender)).copied().unwrap_or(0)
    }

    /// Accounts with a non-zero balance, in address order
    pub fn holders(&self) -> Vec<(Address, Amount)> {
        self.balances
            .iter()
            .filter(|(_, balance)| **balance > 0)
            .map(|(address, balance)| (*address, *balance))
            .collect()
    }

    pub fn statistics(&self) -> LedgerStatistics {
        LedgerStatistics {
            holder_count: self.balances.values().filter(|b| **b > 0).count(),
            allowance_count: self.allowances.values().filter(|a| **a > 0).count(),
            total_supply: self.total_supply,
        }
    }

    /// Whether the balances add up to exactly the total supply
    pub fn check_supply_invariant(&self) -> bool {
        self.balances
            .values()
            .try_fold(0u128, |sum, balance| sum.checked_add(*balance))
            == Some(self.total_supply)
    }

    // ========================================================================
    // MUTATIONS
    // ========================================================================

    /// Move `amount` from `sender` to `recipient`.
    ///
    /// Self-transfers are allowed: they need a sufficient balance and emit an
    /// event, but leave balances unchanged.
    pub fn transfer(
        &mut self,
        sender: Address,
        recipient: Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        if let Err(e) = self.move_balance(sender, recipient, amount) {
            warn!(%sender, %recipient, amount, error = %e, "transfer rejected");
            return Err(e);
        }

        self.emit(LedgerEvent::transfer(sender, recipient, amount));
        debug!(%sender, %recipient, amount, "transfer applied");
        Ok(())
    }

    /// Set (overwrite, never add to) the allowance `spender` holds over `owner`'s balance
    pub fn approve(
        &mut self,
        owner: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let checked = if owner.is_zero() {
            Err(LedgerError::InvalidApprover)
        } else if spender.is_zero() {
            Err(LedgerError::InvalidSpender)
        } else {
            Ok(())
        };
        if let Err(e) = checked {
            warn!(%owner, %spender, amount, error = %e, "approve rejected");
            return Err(e);
        }

        self.allowances.insert((owner, spender), amount);
        self.emit(LedgerEvent::approval(owner, spender, amount));
        debug!(%owner, %spender, amount, "allowance set");
        Ok(())
    }

    /// Spend `caller`'s allowance over `owner` to move `amount` to `recipient`.
    ///
    /// The allowance is checked before anything else, so a spender that is
    /// short on both allowance and owner balance sees `InsufficientAllowance`.
    pub fn transfer_from(
        &mut self,
        caller: Address,
        owner: Address,
        recipient: Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let allowance = self.allowance(owner, caller);
        let result = if allowance < amount {
            Err(LedgerError::InsufficientAllowance {
                allowance,
                needed: amount,
            })
        } else {
            self.move_balance(owner, recipient, amount)
        };
        if let Err(e) = result {
            warn!(%caller, %owner, %recipient, amount, error = %e, "transfer_from rejected");
            return Err(e);
        }

        // Balance move succeeded, so the allowance debit cannot fail
        self.allowances.insert((owner, caller), allowance - amount);
        self.emit(LedgerEvent::transfer(owner, recipient, amount));
        debug!(
            %caller,
            %owner,
            %recipient,
            amount,
            remaining_allowance = allowance - amount,
            "transfer_from applied"
        );
        Ok(())
    }

    /// Validate, then apply, a debit/credit pair
    fn move_balance(
        &mut self,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        if from.is_zero() {
            return Err(LedgerError::InvalidSender);
        }
        if to.is_zero() {
            return Err(LedgerError::InvalidRecipient);
        }

        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(LedgerError::InsufficientBalance {
                balance: from_balance,
                needed: amount,
            });
        }

        if from == to {
            return Ok(());
        }

        let to_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow)?;

        self.balances.insert(from, from_balance - amount);
        self.balances.insert(to, to_balance);
        Ok(())
    }

    // ========================================================================
    // EVENT OUTBOX
    // ========================================================================

    fn emit(&mut self, event: LedgerEvent) {
        self.outbox.push(event);
    }

    /// Events emitted since the last drain, oldest first
    pub fn events(&self) -> &[LedgerEvent] {
        &self.outbox
    }

    /// Take all pending events, leaving the outbox empty
    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.outbox)
    }

    // ========================================================================
    // SNAPSHOTS
    // ========================================================================

    /// Serialize balances, allowances and metadata. Pending events are not included.
    pub fn to_bytes(&self) -> Result<Vec<u8>, LedgerError> {
        postcard::to_allocvec(self).map_err(|e| LedgerError::SnapshotFailed(e.to_string()))
    }

    /// Restore a snapshot, rejecting one that no sequence of operations could
    /// have produced: balances that do not add up, or entries for the null address
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LedgerError> {
        let ledger: Ledger =
            postcard::from_bytes(bytes).map_err(|e| LedgerError::SnapshotFailed(e.to_string()))?;

        ledger
            .metadata
            .validate()
            .map_err(LedgerError::SnapshotFailed)?;

        if !ledger.check_supply_invariant() {
            return Err(LedgerError::SnapshotFailed(
                "balances do not sum to total supply".into(),
            ));
        }

        // Live operations never credit or authorize the null address
        if ledger.balances.contains_key(&Address::ZERO) {
            return Err(LedgerError::SnapshotFailed(
                "balance held by the null address".into(),
            ));
        }
        if ledger
            .allowances
            .keys()
            .any(|(owner, spender)| owner.is_zero() || spender.is_zero())
        {
            return Err(LedgerError::SnapshotFailed(
                "allowance involving the null address".into(),
            ));
        }

        Ok(ledger)
    }
}
