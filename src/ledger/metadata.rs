// Token metadata - display identity, fixed at construction

use serde::{Deserialize, Serialize};

/// Longest accepted token name, in characters
pub const MAX_NAME_LENGTH: usize = 64;

/// Longest accepted token symbol, in characters
pub const MAX_SYMBOL_LENGTH: usize = 11;

/// Display precision reported to wallets; amounts themselves are integers
pub const DEFAULT_DECIMALS: u8 = 18;

/// Immutable name/symbol/decimals of a token
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    name: String,
    symbol: String,
    decimals: u8,
}

impl TokenMetadata {
    /// Validate and build metadata. Returns a human-readable reason on rejection.
    pub fn new(name: &str, symbol: &str) -> Result<Self, String> {
        let metadata = Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals: DEFAULT_DECIMALS,
        };
        metadata.validate()?;
        Ok(metadata)
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        check_field("name", &self.name, MAX_NAME_LENGTH)?;
        check_field("symbol", &self.symbol, MAX_SYMBOL_LENGTH)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }
}

fn check_field(field: &str, value: &str, max_len: usize) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} must not be empty", field));
    }
    if value.trim() != value {
        return Err(format!("{} must not have leading or trailing whitespace", field));
    }
    let len = value.chars().count();
    if len > max_len {
        return Err(format!(
            "{} is {} characters, at most {} allowed",
            field, len, max_len
        ));
    }
    if value.chars().any(char::is_control) {
        return Err(format!("{} must not contain control characters", field));
    }
    Ok(())
}
