// Deploy module - ONE-TIME ISSUANCE
// Builds a ledger from configuration and optionally persists it

mod config;

pub use config::{
    parse_amount, ConfigError, TokenConfig, DEFAULT_NAME, DEFAULT_SYMBOL, INITIAL_SUPPLY,
};

use crate::identity::Address;
use crate::ledger::{Ledger, LedgerError};
use crate::storage::{KeyValueStore, LedgerStore, StoreError};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("A ledger is already deployed in this store")]
    AlreadyDeployed,
}

/// Create a ledger issuing the configured supply to `issuer`.
///
/// The returned ledger still holds the issuance event in its outbox.
pub fn deploy(config: &TokenConfig, issuer: Address) -> Result<Ledger, DeployError> {
    config.validate()?;
    let ledger = Ledger::new(config.initial_supply, &config.name, &config.symbol, issuer)?;

    info!(
        name = %config.name,
        symbol = %config.symbol,
        initial_supply = config.initial_supply,
        %issuer,
        "token deployed"
    );
    Ok(ledger)
}

/// Deploy and persist: snapshot plus the issuance event in one commit, then flush.
///
/// Refuses to overwrite a store that already holds a ledger. The returned
/// ledger's outbox is empty; its events are in the store. A failed commit
/// leaves the store undeployed, so the call can be retried.
pub fn deploy_into<S: KeyValueStore>(
    store: &LedgerStore<S>,
    config: &TokenConfig,
    issuer: Address,
) -> Result<Ledger, DeployError> {
    if store.has_ledger()? {
        return Err(DeployError::AlreadyDeployed);
    }

    let mut ledger = deploy(config, issuer)?;
    store.commit(&ledger, ledger.events())?;
    ledger.drain_events();
    store.flush()?;

    Ok(ledger)
}
