// Deployment configuration - what a token is created with

use crate::ledger::{Amount, TokenMetadata};
use thiserror::Error;

pub const DEFAULT_NAME: &str = "OurToken";
pub const DEFAULT_SYMBOL: &str = "OT";

/// Default issuance: 1000 whole tokens at 18 decimals
pub const INITIAL_SUPPLY: Amount = 1_000 * 10u128.pow(18);

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid amount '{input}': {reason}")]
    InvalidAmount { input: String, reason: String },

    #[error("Invalid token metadata: {0}")]
    InvalidMetadata(String),
}

/// Construction-time parameters of a token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenConfig {
    pub initial_supply: Amount,
    pub name: String,
    pub symbol: String,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            initial_supply: INITIAL_SUPPLY,
            name: DEFAULT_NAME.to_string(),
            symbol: DEFAULT_SYMBOL.to_string(),
        }
    }
}

impl TokenConfig {
    pub fn new(initial_supply: Amount, name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            initial_supply,
            name: name.into(),
            symbol: symbol.into(),
        }
    }

    /// Check the name/symbol constraints before anything is created
    pub fn validate(&self) -> Result<(), ConfigError> {
        TokenMetadata::new(&self.name, &self.symbol)
            .map(|_| ())
            .map_err(ConfigError::InvalidMetadata)
    }
}

/// Parse a base-unit amount: decimal digits with optional `_` separators and
/// an optional `e<N>` scale, e.g. `1_000`, `1000e18`.
pub fn parse_amount(input: &str) -> Result<Amount, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidAmount {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let cleaned: String = input.trim().chars().filter(|c| *c != '_').collect();
    let (digits, exponent) = match cleaned.split_once(['e', 'E']) {
        Some((digits, exponent)) => (digits, Some(exponent)),
        None => (cleaned.as_str(), None),
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("expected decimal digits"));
    }
    let base: Amount = digits.parse().map_err(|_| invalid("too large"))?;

    let scale = match exponent {
        Some(exp) => {
            let exp: u32 = exp.parse().map_err(|_| invalid("bad exponent"))?;
            10u128.checked_pow(exp).ok_or_else(|| invalid("exponent too large"))?
        }
        None => 1,
    };

    base.checked_mul(scale).ok_or_else(|| invalid("too large"))
}
