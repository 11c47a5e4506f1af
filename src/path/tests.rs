use alloy_primitives::Address;

use super::*;

fn token(tag: u8) -> Address {
    Address::repeat_byte(tag)
}

fn two_hop_path() -> Path {
    PathBuilder::new(token(0xaa))
        .hop(3000, 1, ActionCode::SwapExactIn, token(0xbb))
        .hop(3000, 1, ActionCode::SwapExactIn, token(0xcc))
        .build()
        .expect("valid path")
}

#[test]
fn encoding_matches_packed_layout() {
    let path = two_hop_path();
    let bytes = encode(&path);
    assert_eq!(bytes.len(), 20 + 2 * HOP_LEN);

    assert_eq!(&bytes[..20], token(0xaa).as_slice());
    // fee 3000 = 0x000bb8, big-endian 3 bytes
    assert_eq!(&bytes[20..23], &[0x00, 0x0b, 0xb8]);
    assert_eq!(bytes[23], 1);
    assert_eq!(bytes[24], 0);
    assert_eq!(&bytes[25..45], token(0xbb).as_slice());
    assert_eq!(&bytes[50..70], token(0xcc).as_slice());
}

#[test]
fn decode_inverts_encode() {
    let path = two_hop_path();
    let decoded = decode(&encode(&path)).expect("decode");
    assert_eq!(decoded, path);
    assert_eq!(decoded.tokens(), vec![token(0xaa), token(0xbb), token(0xcc)]);
}

#[test]
fn encode_inverts_decode_for_wellformed_bytes() {
    for hop_count in 0..4usize {
        for with_mode in [false, true] {
            let len = ADDRESS_LEN + hop_count * HOP_LEN + usize::from(with_mode);
            let bytes: Vec<u8> = (0..len).map(|i| (i * 7 + 3) as u8).collect();
            let path = decode(&bytes).expect("well-formed length");
            assert_eq!(path.len(), hop_count);
            assert_eq!(path.mode_byte().is_some(), with_mode);
            assert_eq!(encode(&path), bytes);
        }
    }
}

#[test]
fn trailing_mode_flag_is_preserved() {
    let path = PathBuilder::new(token(1))
        .hop(500, 0, ActionCode::MarginClose, token(2))
        .mode(ModeFlag::new(AmountMode::Max, 3).unwrap())
        .build()
        .unwrap();
    let bytes = encode(&path);
    assert_eq!(bytes.len(), 20 + HOP_LEN + 1);
    assert_eq!(*bytes.last().unwrap(), 0x31);

    let decoded = decode(&bytes).unwrap();
    let mode = decoded.mode().unwrap();
    assert!(mode.is_max());
    assert_eq!(mode.lender_id, 3);
}

#[test]
fn rejects_lengths_outside_congruence() {
    for len in [0usize, 1, 19, 22, 44, 47, 20 + HOP_LEN + 2, 20 + 2 * HOP_LEN - 1] {
        let bytes = vec![0u8; len];
        assert_eq!(decode(&bytes), Err(PathError::Malformed { len }), "len {len}");
    }
}

#[test]
fn accepts_bare_token_and_bare_token_with_mode() {
    let bare = decode(&[7u8; 20]).unwrap();
    assert!(bare.is_empty());
    assert_eq!(bare.final_token(), token(7));

    let with_mode = decode(&[0u8; 21]).unwrap();
    assert!(with_mode.is_empty());
    assert_eq!(with_mode.mode_byte(), Some(0));
}

#[test]
fn codec_does_not_validate_action_or_provider() {
    let path = Path::new(vec![Hop::new(token(1), 1, 250, 99u8)], token(2), None).unwrap();
    let decoded = decode(&encode(&path)).unwrap();
    assert_eq!(decoded.hops()[0].action, 99);
    assert_eq!(
        decoded.hops()[0].action_code(),
        Err(PathError::UnknownAction(99))
    );
}

#[test]
fn fee_wider_than_24_bits_is_rejected() {
    let err = PathBuilder::new(token(1))
        .hop(MAX_FEE + 1, 0, ActionCode::SwapExactIn, token(2))
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        PathError::FeeOutOfRange {
            index: 0,
            fee: MAX_FEE + 1
        }
    );
}

#[test]
fn reversed_path_flips_orientation() {
    let path = PathBuilder::new(token(0xaa))
        .hop(100, 0, ActionCode::SwapExactIn, token(0xbb))
        .hop(3000, 1, ActionCode::SwapExactIn, token(0xcc))
        .raw_mode(0x10)
        .build()
        .unwrap();
    let reversed = path.reversed();

    assert_eq!(reversed.tokens(), vec![token(0xcc), token(0xbb), token(0xaa)]);
    assert_eq!(reversed.hops()[0].fee, 3000);
    assert_eq!(reversed.hops()[0].provider_id, 1);
    assert_eq!(reversed.hops()[1].fee, 100);
    assert!(
        reversed
            .hops()
            .iter()
            .all(|hop| hop.action == u8::from(ActionCode::SwapExactOut))
    );
    assert_eq!(reversed.mode_byte(), Some(0x10));
    assert_eq!(reversed.reversed(), path);
}

#[test]
fn reversed_path_keeps_leveraged_code_on_first_hop() {
    let path = PathBuilder::new(token(0xaa))
        .hop(3000, 1, ActionCode::MarginOpen, token(0xbb))
        .hop(500, 2, ActionCode::SwapExactIn, token(0xcc))
        .build()
        .unwrap();
    let reversed = path.reversed();

    assert_eq!(reversed.tokens(), vec![token(0xcc), token(0xbb), token(0xaa)]);
    let actions: Vec<u8> = reversed.hops().iter().map(|hop| hop.action).collect();
    assert_eq!(
        actions,
        vec![
            u8::from(ActionCode::MarginOpen),
            u8::from(ActionCode::SwapExactOut)
        ]
    );
    // 池子属性跟随所在的代币对
    assert_eq!(reversed.hops()[0].fee, 500);
    assert_eq!(reversed.hops()[0].provider_id, 2);
    assert_eq!(reversed.hops()[1].fee, 3000);
    assert_eq!(reversed.reversed(), path);

    let single = PathBuilder::new(token(0xaa))
        .hop(3000, 1, ActionCode::DebtSwap, token(0xbb))
        .build()
        .unwrap();
    assert_eq!(
        single.reversed().hops()[0].action,
        u8::from(ActionCode::DebtSwap)
    );
}

#[test]
fn invalid_hex_reports_decoder_message() {
    let err = Path::from_hex("0x0g").unwrap_err();
    match err {
        PathError::Hex(message) => assert!(!message.is_empty()),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(
        Path::from_hex("zz").unwrap_err(),
        Path::from_hex("zz").unwrap_err()
    );
}

#[test]
fn legs_orient_by_direction() {
    let path = two_hop_path();
    let legs: Vec<_> = path.legs().collect();
    assert_eq!(legs.len(), 2);
    assert_eq!(legs[1].head, token(0xbb));
    assert_eq!(legs[1].tail, token(0xcc));
    assert_eq!(
        legs[1].oriented(Direction::ExactOut),
        (token(0xcc), token(0xbb))
    );
    assert_eq!(
        path.endpoints(Direction::ExactIn),
        (token(0xaa), token(0xcc))
    );
}

#[test]
fn hex_helpers_accept_prefixed_input() {
    let path = two_hop_path();
    let hex = path.to_hex();
    assert!(hex.starts_with("0x"));
    assert_eq!(Path::from_hex(&hex).unwrap(), path);
    assert!(matches!(Path::from_hex("0xzz"), Err(PathError::Hex(_))));
}
