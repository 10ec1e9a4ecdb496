//! Property tests for InListPassiveTarget reply decoding.

use pn532_uid::{bytes_to_hex, extract_uid, locate_response_marker, parse_uid, FrameError};
use proptest::prelude::*;

const MARKER: [u8; 2] = [0xD5, 0x4B];

/// Marker + header declaring `uid_len` + `uid`
fn reply(nb_tg: u8, uid_len: u8, uid: &[u8]) -> Vec<u8> {
    let mut buf = MARKER.to_vec();
    buf.extend_from_slice(&[nb_tg, 0x01, 0x00, 0x44, 0x00, uid_len]);
    buf.extend_from_slice(uid);
    buf
}

/// Leading bytes that never form the marker
fn noise() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>().prop_filter("not marker start", |b| *b != 0xD5), 0..16)
}

fn valid_uid() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![Just(4usize), Just(7usize), Just(10usize)]
        .prop_flat_map(|len| prop::collection::vec(any::<u8>(), len))
}

proptest! {
    /// A well-formed reply yields exactly the declared UID bytes
    #[test]
    fn prop_valid_reply_yields_uid(
        prefix in noise(),
        uid in valid_uid(),
        nb_tg in 1u8..=2,
        suffix in prop::collection::vec(any::<u8>(), 0..8),
    ) {
        let mut buf = prefix.clone();
        buf.extend_from_slice(&reply(nb_tg, uid.len() as u8, &uid));
        buf.extend_from_slice(&suffix);

        let parsed = extract_uid(&buf).expect("uid");
        prop_assert_eq!(parsed.as_bytes(), uid.as_slice());
        prop_assert_eq!(locate_response_marker(&buf), Some(prefix.len()));

        let hex = parsed.to_hex();
        prop_assert_eq!(hex.len(), uid.len() * 2);
        prop_assert!(hex.chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
    }

    #[test]
    fn prop_short_buffers_have_no_marker(buf in prop::collection::vec(any::<u8>(), 0..2)) {
        prop_assert_eq!(locate_response_marker(&buf), None);
    }

    /// Cutting a valid reply anywhere before the end of the UID never yields a UID
    #[test]
    fn prop_truncated_reply_is_rejected(
        prefix in noise(),
        uid in valid_uid(),
        cut in any::<prop::sample::Index>(),
    ) {
        let mut buf = prefix.clone();
        buf.extend_from_slice(&reply(1, uid.len() as u8, &uid));
        let keep = prefix.len() + cut.index(buf.len() - prefix.len());
        buf.truncate(keep);

        prop_assert!(extract_uid(&buf).is_none());
    }

    #[test]
    fn prop_invalid_length_is_rejected(
        uid_len in prop_oneof![0u8..4, 11u8..=255],
        fill in prop::collection::vec(any::<u8>(), 0..300),
    ) {
        let buf = reply(1, uid_len, &fill);
        prop_assert_eq!(parse_uid(&buf), Err(FrameError::InvalidUidLength(uid_len)));
    }

    #[test]
    fn prop_arbitrary_input_never_panics(buf in prop::collection::vec(any::<u8>(), 0..128)) {
        if let Some(uid) = extract_uid(&buf) {
            prop_assert!((4..=10).contains(&uid.len()));
        }
    }

    #[test]
    fn prop_hex_is_deterministic(bytes in prop::collection::vec(any::<u8>(), 0..32)) {
        let first = bytes_to_hex(&bytes);
        prop_assert_eq!(&first, &bytes_to_hex(&bytes));
        prop_assert_eq!(first.len(), bytes.len() * 2);
    }
}
