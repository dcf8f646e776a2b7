use std::time::Duration;

use rand::{rngs::SmallRng, Rng, SeedableRng};
use territory::protocol::{Message, RoomCode};
use territory::transport::{in_memory::InMemoryTransport, Transport};
use territory::{
    MatchEvent, MatchPhase, PlayerColor, Position, Relay, RelayConfig, Session, SessionEvent,
    SessionLoss, SessionPhase,
};
use tokio::time::timeout;

async fn events(session: &mut Session) -> Vec<SessionEvent> {
    timeout(Duration::from_secs(5), session.next_events())
        .await
        .expect("timed out waiting for relay")
        .expect("session closed")
}

async fn raw_recv(t: &mut InMemoryTransport) -> Message {
    timeout(Duration::from_secs(5), t.recv())
        .await
        .expect("timed out waiting for relay")
        .expect("relay connection closed")
}

fn session(relay: &Relay, name: &str) -> Session {
    Session::new(Box::new(relay.connect_in_memory()), name).unwrap()
}

/// Host a room with a session and return its code.
async fn host_room(host: &mut Session) -> RoomCode {
    host.create_room().await.unwrap();
    assert!(matches!(host.phase(), SessionPhase::Creating));
    match events(host).await.as_slice() {
        [SessionEvent::RoomCreated { code }] => code.clone(),
        other => panic!("expected room_created, got {:?}", other),
    }
}

/// A host session matched against a raw relay connection sitting in black's seat.
async fn host_against_raw(relay: &Relay) -> (Session, InMemoryTransport, RoomCode) {
    let mut host = session(relay, "Ana");
    let code = host_room(&mut host).await;
    let mut raw = relay.connect_in_memory();
    raw.send(Message::JoinRoom {
        room_code: code.to_string(),
        player_name: "Mallory".into(),
    })
    .await
    .unwrap();
    assert!(matches!(raw_recv(&mut raw).await, Message::RoomJoined { .. }));
    assert!(matches!(
        events(&mut host).await.as_slice(),
        [SessionEvent::MatchStarted { .. }]
    ));
    (host, raw, code)
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sessions_converge_through_relay() {
    let relay = Relay::new(RelayConfig::default());
    let mut blue = session(&relay, "Ana");
    let mut black = session(&relay, "Bo");

    let code = host_room(&mut blue).await;
    black.join_room(&code.as_str().to_lowercase()).await.unwrap();

    let joined = events(&mut black).await;
    let started = events(&mut blue).await;
    let expected_names = territory::PlayerNames {
        blue: "Ana".into(),
        black: "Bo".into(),
    };
    assert_eq!(
        joined,
        vec![SessionEvent::MatchStarted {
            code: code.clone(),
            me: PlayerColor::Black,
            names: expected_names.clone(),
        }]
    );
    assert_eq!(
        started,
        vec![SessionEvent::MatchStarted {
            code: code.clone(),
            me: PlayerColor::Blue,
            names: expected_names,
        }]
    );

    let mut rng = SmallRng::seed_from_u64(42);
    loop {
        let (mover, waiter) = match blue.online_match().unwrap().game.current_turn() {
            PlayerColor::Blue => (&mut blue, &mut black),
            PlayerColor::Black => (&mut black, &mut blue),
        };
        let online = mover.online_match().unwrap();
        let moves = online.game.state().legal_moves(online.me);
        let to = moves[rng.random_range(0..moves.len())];
        assert!(mover.attempt_move(to).await.unwrap());

        let received = events(waiter).await;
        assert!(matches!(
            received.first(),
            Some(SessionEvent::Match(MatchEvent::BoardChanged { to: t, .. })) if *t == to
        ));
        let a = mover.online_match().unwrap();
        let b = waiter.online_match().unwrap();
        assert_eq!(a.game.state().fingerprint(), b.game.state().fingerprint());

        if a.game.phase() == MatchPhase::Finished {
            assert_eq!(a.game.winner(), b.game.winner());
            assert_eq!(a.game.winner(), Some(a.me));
            // The trailing game_over agrees with the local result.
            assert!(events(waiter).await.is_empty());
            assert_eq!(waiter.online_match().unwrap().game.winner(), Some(a.me));
            break;
        }
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_local_moves_are_checked_before_sending() {
    let relay = Relay::new(RelayConfig::default());
    let (mut host, mut raw, code) = host_against_raw(&relay).await;

    assert!(!host.attempt_move(Position::new(3, 3)).await.unwrap());
    assert!(host.attempt_move(Position::new(2, 2)).await.unwrap());
    // Not our turn any more.
    assert!(!host.attempt_move(Position::new(3, 3)).await.unwrap());

    assert_eq!(
        raw_recv(&mut raw).await,
        Message::Move {
            room_code: code,
            row: 2,
            col: 2,
            player: PlayerColor::Blue,
        }
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_illegal_inbound_move_ends_session() {
    let relay = Relay::new(RelayConfig::default());
    let (mut host, mut raw, code) = host_against_raw(&relay).await;

    assert!(host.attempt_move(Position::new(1, 1)).await.unwrap());
    assert!(matches!(raw_recv(&mut raw).await, Message::Move { .. }));

    // Black on (8,8) cannot reach (0,8); the relay forwards it anyway.
    raw.send(Message::Move {
        room_code: code,
        row: 0,
        col: 8,
        player: PlayerColor::Black,
    })
    .await
    .unwrap();

    let evs = events(&mut host).await;
    assert!(matches!(
        evs.as_slice(),
        [SessionEvent::SessionLost(SessionLoss::ProtocolViolation(_))]
    ));
    assert!(matches!(host.phase(), SessionPhase::Idle));
    // The host left the room, so the cheater is told the other seat is gone.
    assert_eq!(raw_recv(&mut raw).await, Message::PlayerDisconnected);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_announced_winner_is_trusted() {
    let relay = Relay::new(RelayConfig::default());
    let (mut host, mut raw, code) = host_against_raw(&relay).await;

    raw.send(Message::GameOver {
        room_code: code,
        winner: PlayerColor::Black,
    })
    .await
    .unwrap();
    assert_eq!(
        events(&mut host).await,
        vec![SessionEvent::Match(MatchEvent::MatchFinished {
            winner: PlayerColor::Black
        })]
    );
    let online = host.online_match().unwrap();
    assert_eq!(online.game.phase(), MatchPhase::Finished);
    assert_eq!(online.game.winner(), Some(PlayerColor::Black));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_peer_disconnect_returns_to_idle() {
    let relay = Relay::new(RelayConfig::default());
    let (mut host, raw, _code) = host_against_raw(&relay).await;
    drop(raw);
    assert_eq!(
        events(&mut host).await,
        vec![SessionEvent::SessionLost(SessionLoss::PeerDisconnected)]
    );
    assert!(matches!(host.phase(), SessionPhase::Idle));
    assert!(host.is_connected());

    // Back in the menu: a new room can be hosted on the same connection.
    host_room(&mut host).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_room_expiry_reaches_session() {
    let config = RelayConfig::default()
        .with_room_timeout(Duration::from_millis(150))
        .with_sweep_interval(Duration::from_millis(20));
    let relay = Relay::new(config);
    let sweeper = relay.spawn_sweeper();
    let mut host = session(&relay, "Ana");
    let code = host_room(&mut host).await;
    assert!(matches!(host.phase(), SessionPhase::Waiting { code: c } if *c == code));

    assert_eq!(
        events(&mut host).await,
        vec![SessionEvent::SessionLost(SessionLoss::RoomExpired)]
    );
    assert!(matches!(host.phase(), SessionPhase::Idle));
    sweeper.abort();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_join_errors() {
    let relay = Relay::new(RelayConfig::default());
    let mut guest = session(&relay, "Bo");

    // Malformed codes never reach the relay.
    assert!(guest.join_room("AB").await.is_err());
    assert!(matches!(guest.phase(), SessionPhase::Idle));

    let mut host = session(&relay, "Ana");
    let code = host_room(&mut host).await;
    let unknown = if code.as_str() == "ZZZZZ" { "YYYYY" } else { "ZZZZZ" };
    guest.join_room(unknown).await.unwrap();
    assert_eq!(
        events(&mut guest).await,
        vec![SessionEvent::ServerError("Room not found".into())]
    );
    assert!(matches!(guest.phase(), SessionPhase::Idle));

    // Already hosting.
    assert!(host.create_room().await.is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_names_rejected() {
    let relay = Relay::new(RelayConfig::default());
    assert!(Session::new(Box::new(relay.connect_in_memory()), "  ").is_err());
    assert!(Session::new(Box::new(relay.connect_in_memory()), "ElevenChars").is_err());
    let s = Session::new(Box::new(relay.connect_in_memory()), " Ana ").unwrap();
    assert_eq!(s.player_name(), "Ana");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_transport_loss_is_reported() {
    let (client, server) = InMemoryTransport::pair();
    let mut s = Session::new(Box::new(client), "Ana").unwrap();
    drop(server);
    let evs = events(&mut s).await;
    assert!(matches!(
        evs.as_slice(),
        [SessionEvent::SessionLost(SessionLoss::Transport(_))]
    ));
    assert!(!s.is_connected());
    assert!(s.next_events().await.is_err());
}

async fn wait_for_rooms(relay: &Relay, n: usize) {
    timeout(Duration::from_secs(5), async {
        while relay.room_count() != n {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("room count never settled");
}

/// Two sessions in a match; returns (blue, black, code).
async fn start_match(relay: &Relay) -> (Session, Session, RoomCode) {
    let mut blue = session(relay, "Ana");
    let mut black = session(relay, "Bo");
    let code = host_room(&mut blue).await;
    black.join_room(code.as_str()).await.unwrap();
    assert!(matches!(
        events(&mut black).await.as_slice(),
        [SessionEvent::MatchStarted { .. }]
    ));
    assert!(matches!(
        events(&mut blue).await.as_slice(),
        [SessionEvent::MatchStarted { .. }]
    ));
    (blue, black, code)
}

#[tokio::test(flavor = "multi_thread")]
async fn test_leave_while_creating_closes_late_room() {
    let relay = Relay::new(RelayConfig::default());
    let mut host = session(&relay, "Ana");
    host.create_room().await.unwrap();
    host.leave().await.unwrap();
    assert!(matches!(host.phase(), SessionPhase::Idle));
    // The code is not known yet, so a new room must wait for it.
    assert!(host.create_room().await.is_err());

    // The late room_created is answered with leave_room.
    assert!(events(&mut host).await.is_empty());
    assert!(matches!(host.phase(), SessionPhase::Idle));
    wait_for_rooms(&relay, 0).await;

    host_room(&mut host).await;
    assert_eq!(relay.room_count(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_leave_while_joining_releases_seat() {
    let relay = Relay::new(RelayConfig::default());
    let mut host = session(&relay, "Ana");
    let code = host_room(&mut host).await;

    let mut guest = session(&relay, "Bo");
    guest.join_room(code.as_str()).await.unwrap();
    guest.leave().await.unwrap();
    assert!(matches!(guest.phase(), SessionPhase::Idle));

    // The host is matched, then told the guest is gone.
    assert!(matches!(
        events(&mut host).await.as_slice(),
        [SessionEvent::MatchStarted { .. }]
    ));
    assert_eq!(
        events(&mut host).await,
        vec![SessionEvent::SessionLost(SessionLoss::PeerDisconnected)]
    );
    assert!(matches!(host.phase(), SessionPhase::Idle));

    // The guest is free to host right away; the late room_joined is dropped.
    guest.create_room().await.unwrap();
    assert!(events(&mut guest).await.is_empty());
    let fresh = match events(&mut guest).await.as_slice() {
        [SessionEvent::RoomCreated { code }] => code.clone(),
        other => panic!("expected room_created, got {:?}", other),
    };
    assert!(matches!(guest.phase(), SessionPhase::Waiting { code } if *code == fresh));
    assert_eq!(relay.room_count(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_leave_after_failed_join_is_quiet() {
    let relay = Relay::new(RelayConfig::default());
    let mut guest = session(&relay, "Bo");
    guest.join_room("ZZZZZ").await.unwrap();
    guest.leave().await.unwrap();
    guest.create_room().await.unwrap();

    // Both rejections (the join and the leave) are swallowed.
    let mut seen = Vec::new();
    for _ in 0..3 {
        let evs = events(&mut guest).await;
        if !evs.is_empty() {
            seen = evs;
            break;
        }
    }
    assert!(matches!(seen.as_slice(), [SessionEvent::RoomCreated { .. }]));
    assert_eq!(relay.room_count(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_leave_while_playing_notifies_peer() {
    let relay = Relay::new(RelayConfig::default());
    let (mut blue, mut black, _code) = start_match(&relay).await;

    black.leave().await.unwrap();
    assert!(matches!(black.phase(), SessionPhase::Idle));
    assert!(black.is_connected());
    assert_eq!(
        events(&mut blue).await,
        vec![SessionEvent::SessionLost(SessionLoss::PeerDisconnected)]
    );
    wait_for_rooms(&relay, 0).await;

    // Both are back in the menu on their open connections.
    host_room(&mut black).await;
    assert_eq!(relay.room_count(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_close_releases_seat() {
    let relay = Relay::new(RelayConfig::default());
    let (mut blue, black, _code) = start_match(&relay).await;

    black.close().await;
    assert_eq!(
        events(&mut blue).await,
        vec![SessionEvent::SessionLost(SessionLoss::PeerDisconnected)]
    );
    wait_for_rooms(&relay, 0).await;

    let mut waiting = session(&relay, "Cy");
    host_room(&mut waiting).await;
    waiting.close().await;
    wait_for_rooms(&relay, 0).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unexpected_room_joined_is_left() {
    let (client, mut server) = InMemoryTransport::pair();
    let mut s = Session::new(Box::new(client), "Bo").unwrap();
    let code = RoomCode::parse("QX7PA").unwrap();

    let evs = s
        .handle_message(Message::RoomJoined {
            room_code: code.clone(),
            blue_name: "Ana".into(),
        })
        .await
        .unwrap();
    assert!(evs.is_empty());
    assert!(matches!(s.phase(), SessionPhase::Idle));
    assert_eq!(raw_recv(&mut server).await, Message::LeaveRoom { room_code: code });
}

#[tokio::test(flavor = "multi_thread")]
async fn test_move_tagged_with_other_room_still_applies() {
    let (client, mut server) = InMemoryTransport::pair();
    let mut s = Session::new(Box::new(client), "Ana").unwrap();
    let code = RoomCode::parse("QX7PA").unwrap();

    s.create_room().await.unwrap();
    assert!(matches!(raw_recv(&mut server).await, Message::CreateRoom { .. }));
    s.handle_message(Message::RoomCreated {
        room_code: code.clone(),
    })
    .await
    .unwrap();
    s.handle_message(Message::PlayerJoined {
        player_name: "Bo".into(),
    })
    .await
    .unwrap();
    assert!(s.attempt_move(Position::new(1, 1)).await.unwrap());

    let evs = s
        .handle_message(Message::Move {
            room_code: RoomCode::parse("AAAAA").unwrap(),
            row: 7,
            col: 7,
            player: PlayerColor::Black,
        })
        .await
        .unwrap();
    assert!(matches!(
        evs.first(),
        Some(SessionEvent::Match(MatchEvent::BoardChanged { mover: PlayerColor::Black, .. }))
    ));
    let online = s.online_match().unwrap();
    assert_eq!(online.code, code);
    assert!(online.is_my_turn());
}
