use duelink_core::{ClientId, GameType, TurnOwner};
use duelink_session::{
    GameSession, GameSessionConfig, GameSnapshot, GameStoreConfig, LocalIdentity, LocalMedia,
    MemoryRelay, PeerSessionConfig, SessionEvent,
};
use std::time::Duration;
use tokio::sync::{mpsc, watch};

pub const CONNECT_TIMEOUT_MS: u64 = 15_000;
pub const STATE_TIMEOUT_MS: u64 = 10_000;

/// Fixed ids so the election outcome is deterministic: "aaaa..." always wins
/// the lexicographic tie-break against "zzzz...".
pub fn offerer_identity() -> LocalIdentity {
    LocalIdentity {
        client_id: ClientId::from("aaaa-offerer"),
        username: "alice".to_string(),
    }
}

pub fn answerer_identity() -> LocalIdentity {
    LocalIdentity {
        client_id: ClientId::from("zzzz-answerer"),
        username: "bob".to_string(),
    }
}

fn test_config(starting_turn: TurnOwner) -> GameSessionConfig {
    GameSessionConfig {
        peer: PeerSessionConfig::local_only(),
        store: GameStoreConfig::instant(),
        game_type: GameType::Yugioh,
        starting_turn,
    }
}

pub async fn join_session(
    relay: &MemoryRelay,
    room: &str,
    identity: LocalIdentity,
    media: LocalMedia,
    starting_turn: TurnOwner,
) -> GameSession {
    let (channel, signal_rx) = relay.join(room);
    GameSession::connect(identity, channel, signal_rx, media, test_config(starting_turn))
        .await
        .expect("failed to start session")
}

/// Two data-only sessions on one memory relay room, both waited on until the
/// game channel is open (loopback host candidates, no STUN).
pub async fn connect_pair(relay: &MemoryRelay, room: &str) -> (GameSession, GameSession) {
    let mut a = join_session(
        relay,
        room,
        offerer_identity(),
        LocalMedia::none(),
        TurnOwner::Yours,
    )
    .await;
    let mut b = join_session(
        relay,
        room,
        answerer_identity(),
        LocalMedia::none(),
        TurnOwner::Theirs,
    )
    .await;

    wait_for_event(
        &mut a.events,
        |e| matches!(e, SessionEvent::ChannelOpen),
        CONNECT_TIMEOUT_MS,
    )
    .await;
    wait_for_event(
        &mut b.events,
        |e| matches!(e, SessionEvent::ChannelOpen),
        CONNECT_TIMEOUT_MS,
    )
    .await;

    (a, b)
}

pub async fn wait_for_event(
    events: &mut mpsc::Receiver<SessionEvent>,
    predicate: impl Fn(&SessionEvent) -> bool,
    timeout_ms: u64,
) -> SessionEvent {
    tokio::time::timeout(Duration::from_millis(timeout_ms), async {
        loop {
            match events.recv().await {
                Some(event) if predicate(&event) => return event,
                Some(_) => {}
                None => panic!("session event stream closed"),
            }
        }
    })
    .await
    .expect("timed out waiting for session event")
}

pub async fn wait_for_state(
    snapshots: &mut watch::Receiver<GameSnapshot>,
    predicate: impl Fn(&GameSnapshot) -> bool,
) -> GameSnapshot {
    tokio::time::timeout(Duration::from_millis(STATE_TIMEOUT_MS), async {
        loop {
            {
                let snap = snapshots.borrow();
                if predicate(&snap) {
                    return snap.clone();
                }
            }
            snapshots.changed().await.expect("store gone");
        }
    })
    .await
    .expect("timed out waiting for game state")
}
