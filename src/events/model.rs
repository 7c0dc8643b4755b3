// Ledger events - emitted once per successful mutation, in order

use crate::identity::Address;
use crate::ledger::Amount;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A notification produced by a successful ledger mutation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// Tokens moved from one account to another.
    /// Issuance is reported as a transfer from `Address::ZERO`.
    Transfer {
        from: Address,
        to: Address,
        amount: Amount,
    },
    /// An allowance was set to a new value
    Approval {
        owner: Address,
        spender: Address,
        amount: Amount,
    },
}

impl LedgerEvent {
    pub fn transfer(from: Address, to: Address, amount: Amount) -> Self {
        Self::Transfer { from, to, amount }
    }

    pub fn approval(owner: Address, spender: Address, amount: Amount) -> Self {
        Self::Approval {
            owner,
            spender,
            amount,
        }
    }

    /// Event name as observers know it
    pub fn name(&self) -> &'static str {
        match self {
            Self::Transfer { .. } => "Transfer",
            Self::Approval { .. } => "Approval",
        }
    }

    /// Whether this is the construction-time issuance
    pub fn is_issuance(&self) -> bool {
        matches!(self, Self::Transfer { from, .. } if from.is_zero())
    }

    pub fn amount(&self) -> Amount {
        match self {
            Self::Transfer { amount, .. } | Self::Approval { amount, .. } => *amount,
        }
    }
}

impl fmt::Display for LedgerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transfer { from, to, amount } => {
                write!(f, "Transfer({}, {}, {})", from, to, amount)
            }
            Self::Approval {
                owner,
                spender,
                amount,
            } => write!(f, "Approval({}, {}, {})", owner, spender, amount),
        }
    }
}
