//! Screen session behaviour against in-memory collaborators

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::time::{sleep, timeout};

use snake_feed::event_logger::EventLogger;
use snake_feed::game::{Cell, Direction, Food, GameState, Snake};
use snake_feed::protocol::{ClientMessage, ServerMessage};
use snake_feed::screen::ScreenSession;
use snake_feed::state::AppState;
use snake_feed::store::{InMemoryBlobStore, InMemoryIdentity, InMemoryStore, RealtimeStore, UserProfile};

struct Harness {
    app: Arc<AppState>,
    store: Arc<InMemoryStore>,
    identity: Arc<InMemoryIdentity>,
    blobs: Arc<InMemoryBlobStore>,
}

fn carol() -> UserProfile {
    UserProfile {
        uid: "u-carol".to_string(),
        display_name: "Carol".to_string(),
        avatar_url: None,
        email: Some("carol@example.com".to_string()),
    }
}

fn harness(tick: Duration) -> Harness {
    let store = Arc::new(InMemoryStore::new());
    let identity = Arc::new(InMemoryIdentity::new());
    identity.sign_in("t-carol", carol());
    let blobs = Arc::new(InMemoryBlobStore::new());
    let app = AppState::with_services(
        store.clone(),
        identity.clone(),
        blobs.clone(),
        Arc::new(EventLogger::disabled()),
    )
    .with_tick_period(tick);

    Harness {
        app: Arc::new(app),
        store,
        identity,
        blobs,
    }
}

/// A tick slow enough that the game does not interfere with feed tests
const SLOW_TICK: Duration = Duration::from_secs(60);

async fn mount(h: &Harness, token: &str) -> (ScreenSession, UnboundedReceiver<ServerMessage>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let screen = ScreenSession::mount(h.app.clone(), token, tx).await;
    (screen, rx)
}

/// Wait for the first message matching `pred`, skipping others
async fn expect<F>(rx: &mut UnboundedReceiver<ServerMessage>, mut pred: F) -> ServerMessage
where
    F: FnMut(&ServerMessage) -> bool,
{
    timeout(Duration::from_secs(2), async {
        loop {
            let msg = rx.recv().await.expect("outbox open");
            if pred(&msg) {
                return msg;
            }
        }
    })
    .await
    .expect("expected message")
}

fn drain(rx: &mut UnboundedReceiver<ServerMessage>) -> Vec<ServerMessage> {
    let mut out = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        out.push(msg);
    }
    out
}

#[tokio::test]
async fn mount_sends_welcome_and_initial_state() {
    let h = harness(SLOW_TICK);
    let (screen, mut rx) = mount(&h, "t-carol").await;

    match rx.recv().await.unwrap() {
        ServerMessage::Welcome { user, grid_size, .. } => {
            assert_eq!(user, Some(carol()));
            assert_eq!(grid_size, 15);
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(
        rx.recv().await.unwrap(),
        ServerMessage::State { state: GameState::initial() }
    );
    assert_eq!(h.app.session_count(), 1);

    screen.unmount().await;
    assert_eq!(h.app.session_count(), 0);
}

#[tokio::test]
async fn unknown_token_mounts_anonymous_screen() {
    let h = harness(SLOW_TICK);
    let (mut screen, mut rx) = mount(&h, "nobody").await;

    assert!(matches!(rx.recv().await.unwrap(), ServerMessage::Welcome { user: None, .. }));
    assert!(screen.user().is_none());

    screen.handle(ClientMessage::OpenProfile).await;
    expect(&mut rx, |m| matches!(m, ServerMessage::Notice { .. })).await;
    assert!(!screen.feeds().recent_scores.is_active());

    screen.unmount().await;
}

#[tokio::test]
async fn game_loop_moves_snake_and_game_over_is_recorded_once() {
    let h = harness(Duration::from_millis(10));
    let (screen, mut rx) = mount(&h, "t-carol").await;

    let snake = Snake::from_segments([Cell::new(1, 1), Cell::new(1, 2)]).unwrap();
    let mut doomed = GameState::with_layout(snake, Food::default(), Direction::Down);
    doomed.score = 3;
    screen.game().lock().await.load_state(doomed);

    let msg = expect(&mut rx, |m| matches!(m, ServerMessage::GameOver { .. })).await;
    assert_eq!(msg, ServerMessage::GameOver { score: 3 });

    sleep(Duration::from_millis(100)).await;
    let rest = drain(&mut rx);
    assert!(!rest.iter().any(|m| matches!(m, ServerMessage::GameOver { .. })));

    let log = h.store.snapshot("scores/u-carol").unwrap();
    let records = log.as_object().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records.values().next().unwrap()["points"], 3);

    screen.unmount().await;
}

#[tokio::test]
async fn turns_are_ignored_after_game_over_until_restart() {
    let h = harness(Duration::from_millis(10));
    let (mut screen, mut rx) = mount(&h, "nobody").await;

    let snake = Snake::from_segments([Cell::new(1, 1), Cell::new(1, 2)]).unwrap();
    screen
        .game()
        .lock()
        .await
        .load_state(GameState::with_layout(snake, Food::default(), Direction::Down));
    expect(&mut rx, |m| matches!(m, ServerMessage::GameOver { .. })).await;

    screen.handle(ClientMessage::Direction { direction: Direction::Left }).await;
    assert_eq!(screen.game().lock().await.state().direction, Direction::Down);

    screen.handle(ClientMessage::Restart).await;
    let state = screen.game().lock().await.state().clone();
    assert!(!state.is_over);
    assert_eq!(state.score, 0);

    screen.unmount().await;
}

#[tokio::test]
async fn comments_view_streams_feed_until_closed() {
    let h = harness(SLOW_TICK);
    let (mut screen, mut rx) = mount(&h, "t-carol").await;
    h.store.push("comments", json!({"text": "first"})).await.unwrap();

    screen.handle(ClientMessage::OpenComments).await;
    let msg = expect(&mut rx, |m| matches!(m, ServerMessage::Comments { .. })).await;
    let ServerMessage::Comments { data } = msg else { unreachable!() };
    assert_eq!(data.len(), 1);
    assert_eq!(data[0].comment, "first");

    screen
        .handle(ClientMessage::PostComment { text: "second".to_string() })
        .await;
    let msg = expect(&mut rx, |m| matches!(m, ServerMessage::Comments { .. })).await;
    let ServerMessage::Comments { data } = msg else { unreachable!() };
    let texts: Vec<_> = data.iter().map(|c| c.comment.as_str()).collect();
    assert_eq!(texts, vec!["first", "second"]);

    screen.handle(ClientMessage::CloseComments).await;
    assert_eq!(h.store.subscriber_count("comments"), 0);

    h.store.push("comments", json!({"text": "third"})).await.unwrap();
    sleep(Duration::from_millis(50)).await;
    assert!(!drain(&mut rx).iter().any(|m| matches!(m, ServerMessage::Comments { .. })));

    screen.unmount().await;
}

#[tokio::test]
async fn blank_comment_is_reported() {
    let h = harness(SLOW_TICK);
    let (mut screen, mut rx) = mount(&h, "t-carol").await;

    screen
        .handle(ClientMessage::PostComment { text: "   ".to_string() })
        .await;
    expect(&mut rx, |m| matches!(m, ServerMessage::Notice { blocking: false, .. })).await;
    assert_eq!(h.store.snapshot("comments"), None);

    screen.unmount().await;
}

#[tokio::test]
async fn profile_view_shows_recent_scores_newest_first() {
    let h = harness(SLOW_TICK);
    for points in [3, 7] {
        h.store
            .push("scores/u-carol", json!({"points": points, "date": "2026-10-19T09:00:00+00:00"}))
            .await
            .unwrap();
    }
    let (mut screen, mut rx) = mount(&h, "t-carol").await;

    screen.handle(ClientMessage::OpenProfile).await;
    let msg = expect(&mut rx, |m| matches!(m, ServerMessage::Scores { .. })).await;
    let ServerMessage::Scores { data } = msg else { unreachable!() };
    let points: Vec<u32> = data.iter().map(|s| s.points).collect();
    assert_eq!(points, vec![7, 3]);

    screen.handle(ClientMessage::CloseProfile).await;
    assert_eq!(h.store.subscriber_count("scores/u-carol"), 0);

    screen.unmount().await;
}

#[tokio::test]
async fn saving_profile_uploads_avatar_and_closes_view() {
    let h = harness(SLOW_TICK);
    let (mut screen, mut rx) = mount(&h, "t-carol").await;

    screen.handle(ClientMessage::OpenProfile).await;
    screen
        .handle(ClientMessage::ProfileName { name: "Caz".to_string() })
        .await;
    screen
        .handle(ClientMessage::ProfileAvatar { bytes: vec![7, 7, 7] })
        .await;
    screen.handle(ClientMessage::SaveProfile).await;

    let msg = expect(&mut rx, |m| matches!(m, ServerMessage::Profile { .. })).await;
    let ServerMessage::Profile { user } = msg else { unreachable!() };
    assert_eq!(user.display_name, "Caz");
    assert_eq!(user.avatar_url.as_deref(), Some("memory://avatar/u-carol"));
    assert_eq!(h.blobs.get("avatar/u-carol"), Some(vec![7, 7, 7]));
    assert_eq!(h.identity.user("u-carol").unwrap().display_name, "Caz");
    assert_eq!(screen.user().unwrap().display_name, "Caz");
    assert!(!screen.feeds().recent_scores.is_active());

    screen.unmount().await;
}

#[tokio::test]
async fn failed_avatar_upload_is_a_recoverable_notice() {
    let h = harness(SLOW_TICK);
    h.blobs.set_online(false);
    let (mut screen, mut rx) = mount(&h, "t-carol").await;

    screen.handle(ClientMessage::OpenProfile).await;
    screen
        .handle(ClientMessage::ProfileAvatar { bytes: vec![1] })
        .await;
    let flow = screen.handle(ClientMessage::SaveProfile).await;

    assert_eq!(flow, ControlFlow::Continue(()));
    expect(&mut rx, |m| matches!(m, ServerMessage::Notice { blocking: false, .. })).await;
    assert_eq!(h.identity.user("u-carol").unwrap(), carol());
    assert!(screen.feeds().recent_scores.is_active());

    screen.unmount().await;
}

#[tokio::test]
async fn sign_out_closes_screen_and_second_attempt_alerts() {
    let h = harness(SLOW_TICK);
    let (mut first, mut first_rx) = mount(&h, "t-carol").await;
    let (mut second, mut second_rx) = mount(&h, "t-carol").await;

    assert_eq!(first.handle(ClientMessage::SignOut).await, ControlFlow::Break(()));
    expect(&mut first_rx, |m| *m == ServerMessage::SignedOut).await;

    assert_eq!(second.handle(ClientMessage::SignOut).await, ControlFlow::Continue(()));
    expect(&mut second_rx, |m| matches!(m, ServerMessage::Notice { blocking: true, .. })).await;

    first.unmount().await;
    second.unmount().await;
}

#[tokio::test]
async fn unmount_releases_every_subscription() {
    let h = harness(Duration::from_millis(10));
    let (mut screen, mut rx) = mount(&h, "t-carol").await;

    screen.handle(ClientMessage::OpenComments).await;
    screen.handle(ClientMessage::OpenProfile).await;
    assert_eq!(h.store.subscriber_count("comments"), 1);
    assert_eq!(h.store.subscriber_count("scores/u-carol"), 1);

    screen.unmount().await;

    assert_eq!(h.store.subscriber_count("comments"), 0);
    assert_eq!(h.store.subscriber_count("scores/u-carol"), 0);
    assert_eq!(h.app.session_count(), 0);

    drain(&mut rx);
    sleep(Duration::from_millis(50)).await;
    assert!(!drain(&mut rx).iter().any(|m| matches!(m, ServerMessage::State { .. })));
}
