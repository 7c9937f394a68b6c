//! End-to-end command flows through the dispatcher
//!
//! Connections are plain channels, so every test observes exactly what a
//! websocket writer would have sent.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use backend::{Connection, Dispatcher, GameStore, MatchStore, MemoryStore, StoreError, StoreResult};
use chess_engine::{Color, Game, Move, Position};
use shared::{ClientCommand, MatchId, ServerMessage};
use tokio::sync::mpsc::Receiver;

struct Fixture {
    store: Arc<MemoryStore>,
    dispatcher: Arc<Dispatcher>,
    match_id: MatchId,
    alice: String,
    bob: String,
    carol: String,
}

/// Game store whose saves fail while `failing` is set
struct FlakyGames {
    inner: Arc<MemoryStore>,
    failing: AtomicBool,
}

#[async_trait]
impl GameStore for FlakyGames {
    async fn load_game(&self, match_id: MatchId) -> StoreResult<Game> {
        self.inner.load_game(match_id).await
    }

    async fn save_game(&self, match_id: MatchId, game: &Game) -> StoreResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("disk offline".to_string()));
        }
        self.inner.save_game(match_id, game).await
    }
}

/// One match with alice as WHITE, bob as BLACK and carol unseated
async fn setup() -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let record = store.create("friendly").await.unwrap();
    store.join(record.id, "alice", Color::White).unwrap();
    store.join(record.id, "bob", Color::Black).unwrap();

    let dispatcher = Arc::new(Dispatcher::new(store.clone(), store.clone(), store.clone()));
    Fixture {
        alice: store.issue_token("alice"),
        bob: store.issue_token("bob"),
        carol: store.issue_token("carol"),
        store,
        dispatcher,
        match_id: record.id,
    }
}

fn drain(rx: &mut Receiver<String>) -> Vec<ServerMessage> {
    let mut out = Vec::new();
    while let Ok(text) = rx.try_recv() {
        out.push(serde_json::from_str(&text).expect("Server sent invalid JSON"));
    }
    out
}

fn notifications(messages: &[ServerMessage]) -> Vec<&str> {
    messages
        .iter()
        .filter_map(|msg| match msg {
            ServerMessage::Notification { message } => Some(message.as_str()),
            _ => None,
        })
        .collect()
}

fn errors(messages: &[ServerMessage]) -> Vec<&str> {
    messages
        .iter()
        .filter_map(|msg| match msg {
            ServerMessage::Error { message } => Some(message.as_str()),
            _ => None,
        })
        .collect()
}

fn connect(token: &str, match_id: MatchId) -> ClientCommand {
    ClientCommand::Connect {
        auth_token: token.to_string(),
        match_id,
    }
}

fn make_move(token: &str, match_id: MatchId, from: (i32, i32), to: (i32, i32)) -> ClientCommand {
    ClientCommand::MakeMove {
        auth_token: token.to_string(),
        match_id,
        mv: Move::new(
            Position::new(from.0, from.1).unwrap(),
            Position::new(to.0, to.1).unwrap(),
        ),
    }
}

fn resign(token: &str, match_id: MatchId) -> ClientCommand {
    ClientCommand::Resign {
        auth_token: token.to_string(),
        match_id,
    }
}

/// Connect `token` on a fresh channel and discard the join traffic
async fn join(fx: &Fixture, token: &str) -> (Connection, Receiver<String>) {
    let (conn, mut rx) = Connection::channel();
    fx.dispatcher.handle(&conn, connect(token, fx.match_id)).await;
    drain(&mut rx);
    (conn, rx)
}

// ============================================================================
// Connect
// ============================================================================

#[tokio::test]
async fn test_connect_unknown_match_creates_no_session() {
    let fx = setup().await;
    let (conn, mut rx) = Connection::channel();

    fx.dispatcher.handle(&conn, connect(&fx.alice, 99)).await;

    let received = drain(&mut rx);
    assert_eq!(errors(&received), vec!["Error: match 99 not found"]);
    assert!(fx.dispatcher.hub().get(99).is_none(), "No registry for unknown match");
}

#[tokio::test]
async fn test_connect_with_bad_token_is_unauthorized() {
    let fx = setup().await;
    let (conn, mut rx) = Connection::channel();

    fx.dispatcher.handle(&conn, connect("bogus", fx.match_id)).await;
    fx.dispatcher.handle(&conn, connect("", fx.match_id)).await;

    assert_eq!(
        errors(&drain(&mut rx)),
        vec!["Error: unauthorized", "Error: unauthorized"]
    );
    assert!(fx.dispatcher.hub().get(fx.match_id).is_none());
}

#[tokio::test]
async fn test_connect_sends_state_and_announces_role() {
    let fx = setup().await;
    let (alice, mut rx_alice) = Connection::channel();
    fx.dispatcher.handle(&alice, connect(&fx.alice, fx.match_id)).await;

    let received = drain(&mut rx_alice);
    assert_eq!(received.len(), 1, "Only the state, no self-notification");
    assert!(matches!(
        &received[0],
        ServerMessage::LoadGame { game } if game.side_to_move() == Color::White
    ));

    let (bob, mut rx_bob) = Connection::channel();
    fx.dispatcher.handle(&bob, connect(&fx.bob, fx.match_id)).await;
    let (carol, _rx_carol) = Connection::channel();
    fx.dispatcher.handle(&carol, connect(&fx.carol, fx.match_id)).await;

    assert_eq!(
        notifications(&drain(&mut rx_alice)),
        vec!["bob joined as BLACK", "carol joined as OBSERVER"]
    );
    assert_eq!(notifications(&drain(&mut rx_bob)), vec!["carol joined as OBSERVER"]);
}

#[tokio::test]
async fn test_malformed_frame_is_reported_to_sender() {
    let fx = setup().await;
    let (conn, mut rx) = Connection::channel();

    fx.dispatcher.handle_text(&conn, r#"{"type": "DANCE"}"#).await;
    fx.dispatcher.handle_text(&conn, "not json").await;

    let received = drain(&mut rx);
    let errs = errors(&received);
    assert_eq!(errs.len(), 2);
    assert!(errs.iter().all(|e| e.starts_with("Error: malformed command: ")));
}

#[tokio::test]
async fn test_non_promotion_kind_is_malformed() {
    let fx = setup().await;
    let (alice, mut rx_alice) = join(&fx, &fx.alice).await;
    let frame = format!(
        r#"{{"type": "MAKE_MOVE", "authToken": "{}", "matchId": {},
            "move": {{"start": {{"row": 2, "col": 1}}, "end": {{"row": 3, "col": 1}},
                      "promotion": "KING"}}}}"#,
        fx.alice, fx.match_id
    );

    fx.dispatcher.handle_text(&alice, &frame).await;

    let received = drain(&mut rx_alice);
    let errs = errors(&received);
    assert_eq!(errs.len(), 1);
    assert!(errs[0].starts_with("Error: malformed command: "), "{}", errs[0]);
}

#[tokio::test]
async fn test_text_frame_connect() {
    let fx = setup().await;
    let (conn, mut rx) = Connection::channel();
    let frame = format!(
        r#"{{"type": "CONNECT", "authToken": "{}", "matchId": {}}}"#,
        fx.alice, fx.match_id
    );

    fx.dispatcher.handle_text(&conn, &frame).await;

    let received = drain(&mut rx);
    assert!(matches!(received.as_slice(), [ServerMessage::LoadGame { .. }]));
}

// ============================================================================
// Moves
// ============================================================================

#[tokio::test]
async fn test_move_broadcasts_state_and_notifies_others() {
    let fx = setup().await;
    let (alice, mut rx_alice) = join(&fx, &fx.alice).await;
    let (_bob, mut rx_bob) = join(&fx, &fx.bob).await;
    drain(&mut rx_alice);

    fx.dispatcher
        .handle(&alice, make_move(&fx.alice, fx.match_id, (2, 5), (4, 5)))
        .await;

    let to_alice = drain(&mut rx_alice);
    let to_bob = drain(&mut rx_bob);

    let state = |msgs: &[ServerMessage]| {
        msgs.iter()
            .find_map(|m| match m {
                ServerMessage::LoadGame { game } => Some(game.clone()),
                _ => None,
            })
            .expect("LOAD_GAME expected")
    };
    assert_eq!(state(&to_alice), state(&to_bob), "Identical state for everyone");
    assert_eq!(state(&to_bob).side_to_move(), Color::Black);

    assert!(notifications(&to_alice).is_empty(), "Mover gets no move notice");
    assert_eq!(notifications(&to_bob), vec!["alice moved e2 to e4"]);

    let saved = fx.store.load_game(fx.match_id)
        .await
        .unwrap();
    assert_eq!(saved.side_to_move(), Color::Black, "Move persisted");
}

#[tokio::test]
async fn test_observer_cannot_move() {
    let fx = setup().await;
    let (carol, mut rx_carol) = join(&fx, &fx.carol).await;

    fx.dispatcher
        .handle(&carol, make_move(&fx.carol, fx.match_id, (2, 5), (4, 5)))
        .await;

    assert_eq!(errors(&drain(&mut rx_carol)), vec!["Error: observers cannot move"]);
}

#[tokio::test]
async fn test_wrong_turn_and_invalid_move_do_not_broadcast() {
    let fx = setup().await;
    let (alice, mut rx_alice) = join(&fx, &fx.alice).await;
    let (bob, mut rx_bob) = join(&fx, &fx.bob).await;
    drain(&mut rx_alice);

    fx.dispatcher
        .handle(&bob, make_move(&fx.bob, fx.match_id, (7, 5), (5, 5)))
        .await;
    assert_eq!(errors(&drain(&mut rx_bob)), vec!["Error: not your turn"]);

    fx.dispatcher
        .handle(&alice, make_move(&fx.alice, fx.match_id, (2, 5), (5, 5)))
        .await;
    fx.dispatcher
        .handle(&alice, make_move(&fx.alice, fx.match_id, (7, 5), (6, 5)))
        .await;
    assert_eq!(
        errors(&drain(&mut rx_alice)),
        vec!["Error: invalid move", "Error: invalid move"]
    );
    assert!(drain(&mut rx_bob).is_empty(), "Rejected commands never broadcast");
}

#[tokio::test]
async fn test_check_is_announced() {
    let fx = setup().await;
    let (alice, mut rx_alice) = join(&fx, &fx.alice).await;
    let (bob, _rx_bob) = join(&fx, &fx.bob).await;

    fx.dispatcher
        .handle(&alice, make_move(&fx.alice, fx.match_id, (2, 5), (4, 5)))
        .await;
    fx.dispatcher
        .handle(&bob, make_move(&fx.bob, fx.match_id, (7, 6), (6, 6)))
        .await;
    drain(&mut rx_alice);
    fx.dispatcher
        .handle(&alice, make_move(&fx.alice, fx.match_id, (1, 4), (5, 8)))
        .await;

    assert_eq!(notifications(&drain(&mut rx_alice)), vec!["Check against BLACK"]);
}

#[tokio::test]
async fn test_fools_mate_is_announced() {
    let fx = setup().await;
    let (alice, mut rx_alice) = join(&fx, &fx.alice).await;
    let (bob, mut rx_bob) = join(&fx, &fx.bob).await;

    let moves = [
        (&alice, &fx.alice, (2, 6), (3, 6)),
        (&bob, &fx.bob, (7, 5), (5, 5)),
        (&alice, &fx.alice, (2, 7), (4, 7)),
        (&bob, &fx.bob, (8, 4), (4, 8)),
    ];
    for (conn, token, from, to) in moves {
        fx.dispatcher
            .handle(conn, make_move(token, fx.match_id, from, to))
            .await;
    }

    let to_alice = drain(&mut rx_alice);
    assert!(errors(&to_alice).is_empty());
    assert_eq!(
        notifications(&to_alice).last().copied(),
        Some("Checkmate against WHITE")
    );
    assert_eq!(
        notifications(&drain(&mut rx_bob)).last().copied(),
        Some("Checkmate against WHITE"),
        "The mating side hears the verdict too"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_duplicate_moves_apply_once() {
    let fx = setup().await;
    let (first, mut rx_first) = Connection::channel();
    let (second, mut rx_second) = Connection::channel();
    let cmd = make_move(&fx.alice, fx.match_id, (2, 5), (4, 5));

    let a = {
        let dispatcher = fx.dispatcher.clone();
        let cmd = cmd.clone();
        tokio::spawn(async move { dispatcher.handle(&first, cmd).await })
    };
    let b = {
        let dispatcher = fx.dispatcher.clone();
        tokio::spawn(async move { dispatcher.handle(&second, cmd).await })
    };
    a.await.unwrap();
    b.await.unwrap();

    let mut received = drain(&mut rx_first);
    received.extend(drain(&mut rx_second));
    assert_eq!(errors(&received), vec!["Error: not your turn"], "Exactly one attempt loses");

    let saved = fx.store.load_game(fx.match_id)
        .await
        .unwrap();
    assert_eq!(saved.side_to_move(), Color::Black);
}

// ============================================================================
// Resign and leave
// ============================================================================

#[tokio::test]
async fn test_resign_twice_is_rejected_without_broadcast() {
    let fx = setup().await;
    let (alice, mut rx_alice) = join(&fx, &fx.alice).await;
    let (bob, mut rx_bob) = join(&fx, &fx.bob).await;
    drain(&mut rx_alice);

    fx.dispatcher.handle(&alice, resign(&fx.alice, fx.match_id)).await;
    assert_eq!(notifications(&drain(&mut rx_alice)), vec!["alice resigned"]);
    assert_eq!(notifications(&drain(&mut rx_bob)), vec!["alice resigned"]);

    fx.dispatcher.handle(&bob, resign(&fx.bob, fx.match_id)).await;
    assert_eq!(errors(&drain(&mut rx_bob)), vec!["Error: game already over"]);
    assert!(drain(&mut rx_alice).is_empty(), "No broadcast for the rejected resign");

    fx.dispatcher
        .handle(&alice, make_move(&fx.alice, fx.match_id, (2, 5), (4, 5)))
        .await;
    assert_eq!(errors(&drain(&mut rx_alice)), vec!["Error: game already over"]);
}

#[tokio::test]
async fn test_observer_cannot_resign() {
    let fx = setup().await;
    let (carol, mut rx_carol) = join(&fx, &fx.carol).await;

    fx.dispatcher.handle(&carol, resign(&fx.carol, fx.match_id)).await;

    assert_eq!(errors(&drain(&mut rx_carol)), vec!["Error: observers cannot resign"]);
}

#[tokio::test]
async fn test_leave_clears_seat_and_notifies() {
    let fx = setup().await;
    let (_alice, mut rx_alice) = join(&fx, &fx.alice).await;
    let (bob, mut rx_bob) = join(&fx, &fx.bob).await;
    drain(&mut rx_alice);

    fx.dispatcher
        .handle(
            &bob,
            ClientCommand::Leave {
                auth_token: fx.bob.clone(),
                match_id: fx.match_id,
            },
        )
        .await;

    assert_eq!(notifications(&drain(&mut rx_alice)), vec!["bob left the game"]);
    assert!(drain(&mut rx_bob).is_empty());

    let record = fx.store.get(fx.match_id).await.unwrap().unwrap();
    assert_eq!(record.black, None, "Seat cleared");
    assert_eq!(record.white.as_deref(), Some("alice"));

    let session = fx.dispatcher.hub().get(fx.match_id).unwrap();
    assert!(!session.registry().contains("bob"));
}

#[tokio::test]
async fn test_observer_leave_keeps_seats() {
    let fx = setup().await;
    let (_alice, mut rx_alice) = join(&fx, &fx.alice).await;
    let (carol, mut rx_carol) = join(&fx, &fx.carol).await;
    drain(&mut rx_alice);

    fx.dispatcher
        .handle(
            &carol,
            ClientCommand::Leave {
                auth_token: fx.carol.clone(),
                match_id: fx.match_id,
            },
        )
        .await;

    assert!(errors(&drain(&mut rx_carol)).is_empty());
    assert_eq!(notifications(&drain(&mut rx_alice)), vec!["carol left the game"]);

    let record = fx.store.get(fx.match_id).await.unwrap().unwrap();
    assert_eq!(record.white.as_deref(), Some("alice"), "Seats untouched");
    assert_eq!(record.black.as_deref(), Some("bob"), "Seats untouched");

    let session = fx.dispatcher.hub().get(fx.match_id).unwrap();
    assert!(!session.registry().contains("carol"));
}

// ============================================================================
// Store failures
// ============================================================================

#[tokio::test]
async fn test_store_failure_is_internal_and_recoverable() {
    let fx = setup().await;
    let games = Arc::new(FlakyGames {
        inner: fx.store.clone(),
        failing: AtomicBool::new(true),
    });
    let dispatcher = Dispatcher::new(fx.store.clone(), fx.store.clone(), games.clone());

    let (alice, mut rx_alice) = Connection::channel();
    let (bob, mut rx_bob) = Connection::channel();
    dispatcher.handle(&alice, connect(&fx.alice, fx.match_id)).await;
    dispatcher.handle(&bob, connect(&fx.bob, fx.match_id)).await;
    drain(&mut rx_alice);
    drain(&mut rx_bob);

    let opening = make_move(&fx.alice, fx.match_id, (2, 5), (4, 5));
    dispatcher.handle(&alice, opening.clone()).await;

    let to_alice = drain(&mut rx_alice);
    assert_eq!(
        errors(&to_alice),
        vec!["Error: internal failure"],
        "Store detail stays in the log"
    );
    assert!(drain(&mut rx_bob).is_empty(), "Failed command never broadcasts");
    assert_eq!(
        fx.store.load_game(fx.match_id).await.unwrap(),
        Game::new(),
        "Nothing persisted"
    );

    games.failing.store(false, Ordering::SeqCst);
    dispatcher.handle(&alice, opening).await;

    assert_eq!(drain(&mut rx_alice).len(), 1, "Retry delivers the new state");
    assert_eq!(drain(&mut rx_bob).len(), 2, "State plus move notice");
    assert_eq!(
        fx.store.load_game(fx.match_id).await.unwrap().side_to_move(),
        Color::Black
    );
}

// ============================================================================
// Connection lifecycle
// ============================================================================

#[tokio::test]
async fn test_dead_connection_is_pruned_on_broadcast() {
    let fx = setup().await;
    let (alice, _rx_alice) = join(&fx, &fx.alice).await;
    let (_carol, rx_carol) = join(&fx, &fx.carol).await;
    drop(rx_carol);

    fx.dispatcher
        .handle(&alice, make_move(&fx.alice, fx.match_id, (2, 5), (4, 5)))
        .await;

    let session = fx.dispatcher.hub().get(fx.match_id).unwrap();
    let registry = session.registry();
    assert!(!registry.contains("carol"), "Dead observer pruned");
    assert!(registry.contains("alice"));
}

#[tokio::test]
async fn test_reconnect_replaces_and_stale_close_keeps_newer() {
    let fx = setup().await;
    let (old, mut rx_old) = join(&fx, &fx.alice).await;
    let (new, mut rx_new) = join(&fx, &fx.alice).await;
    let (bob, _rx_bob) = join(&fx, &fx.bob).await;
    assert_eq!(notifications(&drain(&mut rx_new)), vec!["bob joined as BLACK"]);

    fx.dispatcher.disconnect(&old);
    fx.dispatcher.handle(&bob, resign(&fx.bob, fx.match_id)).await;

    assert!(drain(&mut rx_old).is_empty(), "Replaced channel receives nothing");
    assert_eq!(notifications(&drain(&mut rx_new)), vec!["bob resigned"]);

    fx.dispatcher.disconnect(&new);
    let session = fx.dispatcher.hub().get(fx.match_id).unwrap();
    assert!(!session.registry().contains("alice"));
}

#[tokio::test]
async fn test_reset_empties_registries() {
    let fx = setup().await;
    let (_alice, mut rx_alice) = join(&fx, &fx.alice).await;
    let (bob, _rx_bob) = join(&fx, &fx.bob).await;
    drain(&mut rx_alice);
    let before = fx.dispatcher.hub().get(fx.match_id).unwrap();

    fx.dispatcher.reset();

    let after = fx.dispatcher.hub().get(fx.match_id).unwrap();
    assert!(Arc::ptr_eq(&before, &after), "Command lock survives the reset");
    assert!(after.registry().is_empty());

    fx.dispatcher.handle(&bob, resign(&fx.bob, fx.match_id)).await;
    assert!(drain(&mut rx_alice).is_empty(), "Cleared participants hear nothing");
}
