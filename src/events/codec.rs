// Binary form of ledger events, as stored in the event log and handed to observers

use crate::events::LedgerEvent;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use thiserror::Error;

/// Errors turning ledger events into log entries and back
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Failed to encode event: {0}")]
    EncodeError(String),

    #[error("Failed to decode event: {0}")]
    DecodeError(String),

    #[error("Invalid hex string: {0}")]
    InvalidHex(String),

    #[error("Invalid base64 string: {0}")]
    InvalidBase64(String),
}

/// Converts `Transfer`/`Approval` events to and from event-log entries.
///
/// An entry is the postcard encoding of the event: a variant tag followed by
/// the two 20-byte addresses and a varint amount. The hex and base64 forms
/// wrap the same bytes for observers that only take text.
pub struct EventCodec;

impl EventCodec {
    /// Event-log entry for `event`
    pub fn encode(event: &LedgerEvent) -> Result<Vec<u8>, CodecError> {
        postcard::to_allocvec(event).map_err(|e| CodecError::EncodeError(e.to_string()))
    }

    /// Parse an event-log entry. Trailing or missing bytes are an error.
    pub fn decode(bytes: &[u8]) -> Result<LedgerEvent, CodecError> {
        match postcard::take_from_bytes(bytes) {
            Ok((event, [])) => Ok(event),
            Ok((_, rest)) => Err(CodecError::DecodeError(format!(
                "{} trailing bytes after event",
                rest.len()
            ))),
            Err(e) => Err(CodecError::DecodeError(e.to_string())),
        }
    }

    pub fn encode_hex(event: &LedgerEvent) -> Result<String, CodecError> {
        Ok(hex::encode(Self::encode(event)?))
    }

    pub fn decode_hex(text: &str) -> Result<LedgerEvent, CodecError> {
        let bytes = hex::decode(text).map_err(|e| CodecError::InvalidHex(e.to_string()))?;
        Self::decode(&bytes)
    }

    /// URL-safe, unpadded
    pub fn encode_base64(event: &LedgerEvent) -> Result<String, CodecError> {
        Ok(URL_SAFE_NO_PAD.encode(Self::encode(event)?))
    }

    pub fn decode_base64(text: &str) -> Result<LedgerEvent, CodecError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(text)
            .map_err(|e| CodecError::InvalidBase64(e.to_string()))?;
        Self::decode(&bytes)
    }
}
