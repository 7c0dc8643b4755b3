// Event Codec Tests

use ourtoken::events::{CodecError, EventCodec, LedgerEvent};
use ourtoken::identity::Address;

#[test]
fn test_text_encodings_decode_to_same_event() {
    let event = LedgerEvent::approval(Address::generate(), Address::generate(), u128::MAX);

    let hex = EventCodec::encode_hex(&event).unwrap();
    let b64 = EventCodec::encode_base64(&event).unwrap();

    assert_eq!(EventCodec::decode_hex(&hex).unwrap(), event);
    assert_eq!(EventCodec::decode_base64(&b64).unwrap(), event);
    assert!(!b64.contains('='));
}

#[test]
fn test_decode_rejects_bad_input() {
    assert!(matches!(
        EventCodec::decode_hex("zz"),
        Err(CodecError::InvalidHex(_))
    ));
    assert!(matches!(
        EventCodec::decode_base64("***"),
        Err(CodecError::InvalidBase64(_))
    ));
    assert!(matches!(
        EventCodec::decode(&[0xff, 0xff]),
        Err(CodecError::DecodeError(_))
    ));
}

#[test]
fn test_truncated_event_rejected() {
    let event = LedgerEvent::transfer(Address::ZERO, Address::generate(), 1000);
    let bytes = EventCodec::encode(&event).unwrap();

    assert!(EventCodec::decode(&bytes[..bytes.len() - 1]).is_err());
}

#[test]
fn test_entry_with_trailing_bytes_rejected() {
    let event = LedgerEvent::transfer(Address::generate(), Address::generate(), 7);
    let mut bytes = EventCodec::encode(&event).unwrap();
    bytes.push(0);

    assert!(matches!(
        EventCodec::decode(&bytes),
        Err(CodecError::DecodeError(_))
    ));
}
