// Ledger module - THE ACCOUNT BOOK
// Balances, allowances, and the transactional operations over them

mod metadata;
mod shared;
mod token;

pub use metadata::{TokenMetadata, DEFAULT_DECIMALS, MAX_NAME_LENGTH, MAX_SYMBOL_LENGTH};
pub use shared::SharedLedger;
pub use token::{Amount, Ledger, LedgerError, LedgerStatistics};
