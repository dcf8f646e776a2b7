use serde_json::{json, Value};
use territory::protocol::{validate_player_name, MalformedMessage, Message, RoomCode};
use territory::PlayerColor;

fn code(s: &str) -> RoomCode {
    RoomCode::parse(s).unwrap()
}

fn to_json(msg: &Message) -> Value {
    serde_json::from_slice(&msg.encode().unwrap()).unwrap()
}

#[test]
fn test_envelope_shapes() {
    assert_eq!(
        to_json(&Message::CreateRoom {
            player_name: "Ana".into()
        }),
        json!({"type": "create_room", "playerName": "Ana"})
    );
    assert_eq!(
        to_json(&Message::RoomCreated {
            room_code: code("QX7PA")
        }),
        json!({"type": "room_created", "roomCode": "QX7PA"})
    );
    assert_eq!(
        to_json(&Message::RoomJoined {
            room_code: code("QX7PA"),
            blue_name: "Ana".into()
        }),
        json!({"type": "room_joined", "roomCode": "QX7PA", "blueName": "Ana"})
    );
    assert_eq!(
        to_json(&Message::Move {
            room_code: code("QX7PA"),
            row: 2,
            col: 2,
            player: PlayerColor::Blue,
        }),
        json!({"type": "move", "roomCode": "QX7PA", "row": 2, "col": 2, "player": "blue"})
    );
    assert_eq!(
        to_json(&Message::GameOver {
            room_code: code("QX7PA"),
            winner: PlayerColor::Black,
        }),
        json!({"type": "game_over", "roomCode": "QX7PA", "winner": "black"})
    );
    assert_eq!(to_json(&Message::RoomExpired), json!({"type": "room_expired"}));
    assert_eq!(
        to_json(&Message::PlayerDisconnected),
        json!({"type": "player_disconnected"})
    );
    assert_eq!(
        to_json(&Message::error("Room not found")),
        json!({"type": "error", "message": "Room not found"})
    );
}

#[test]
fn test_decode_client_messages() {
    let msg = Message::decode(br#"{"type":"join_room","roomCode":"qx7pa","playerName":"Bo"}"#)
        .unwrap();
    assert_eq!(
        msg,
        Message::JoinRoom {
            room_code: "qx7pa".into(),
            player_name: "Bo".into()
        }
    );
    assert_eq!(msg.kind(), "join_room");

    let msg = Message::decode(
        br#"{"type":"move","roomCode":"QX7PA","row":7,"col":8,"player":"black"}"#,
    )
    .unwrap();
    assert!(matches!(
        msg,
        Message::Move { row: 7, col: 8, player: PlayerColor::Black, .. }
    ));
}

#[test]
fn test_decode_rejects_garbage() {
    let cases: [&[u8]; 5] = [
        b"not json",
        br#"{"type":"teleport"}"#,
        br#"{"type":"move","roomCode":"QX7PA","row":1}"#,
        br#"{"type":"move","roomCode":"QX7PA","row":1,"col":1,"player":"red"}"#,
        br#"{"roomCode":"QX7PA"}"#,
    ];
    for bad in cases {
        let err: MalformedMessage = Message::decode(bad).unwrap_err();
        assert!(err.to_string().starts_with("Malformed message"));
    }
}

#[test]
fn test_room_code_normalization() {
    assert_eq!(code("  qx7pa ").as_str(), "QX7PA");
    assert!(RoomCode::parse("QX7P").is_none());
    assert!(RoomCode::parse("QX7PAB").is_none());
    assert!(RoomCode::parse("QX-PA").is_none());
    assert!("abcde".parse::<RoomCode>().is_ok());
    assert!("ab".parse::<RoomCode>().is_err());
}

#[test]
fn test_random_room_codes_use_the_alphabet() {
    use rand::{rngs::SmallRng, SeedableRng};
    let mut rng = SmallRng::seed_from_u64(7);
    for _ in 0..100 {
        let c = RoomCode::random(&mut rng);
        assert_eq!(c.as_str().len(), territory::ROOM_CODE_LEN);
        assert!(c
            .as_str()
            .bytes()
            .all(|b| territory::ROOM_CODE_ALPHABET.contains(&b)));
        assert_eq!(RoomCode::parse(c.as_str()), Some(c.clone()));
    }
}

#[test]
fn test_player_name_validation() {
    assert_eq!(validate_player_name("  Ana "), Ok("Ana".to_string()));
    assert_eq!(validate_player_name("TenLetters"), Ok("TenLetters".to_string()));
    assert!(validate_player_name("").is_err());
    assert!(validate_player_name("   ").is_err());
    assert!(validate_player_name("ElevenChars").is_err());
}
