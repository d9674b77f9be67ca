use duelink_core::{SignalEvent, TurnOwner};
use duelink_session::{Action, LocalMedia, MemoryRelay};
use std::time::Duration;

use crate::integration::init_tracing;
use crate::utils::{connect_pair, join_session, offerer_identity, wait_for_state};

#[tokio::test]
async fn life_updates_cross_the_data_channel() {
    init_tracing();

    let relay = MemoryRelay::new();
    let (a, mut b) = connect_pair(&relay, "duel").await;

    a.actions.send(Action::SetLife(6500)).await.unwrap();

    let snap = wait_for_state(&mut b.state, |s| s.life_opponent == 6500).await;
    assert_eq!(snap.life_own, 8000);
}

#[tokio::test]
async fn adjustments_broadcast_the_absolute_total() {
    init_tracing();

    let relay = MemoryRelay::new();
    let (a, mut b) = connect_pair(&relay, "duel").await;

    // Each adjustment carries the resulting total, so a dropped or
    // duplicated update cannot drift the opponent's view.
    a.actions.send(Action::AdjustLife(-500)).await.unwrap();
    a.actions.send(Action::AdjustLife(-500)).await.unwrap();

    wait_for_state(&mut b.state, |s| s.life_opponent == 7000).await;
}

#[tokio::test]
async fn commands_fall_back_to_the_relay_without_a_peer() {
    init_tracing();

    let relay = MemoryRelay::new();
    let (_observer, mut observer_rx) = relay.join("empty-room");

    // Alone in the room: the channel never opens, every broadcast must take
    // the signaling path.
    let a = join_session(
        &relay,
        "empty-room",
        offerer_identity(),
        LocalMedia::none(),
        TurnOwner::Yours,
    )
    .await;

    a.actions.send(Action::AdvancePhase).await.unwrap();

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let event = tokio::time::timeout_at(deadline, observer_rx.recv())
            .await
            .expect("phase update never reached the relay")
            .expect("relay closed");
        if let SignalEvent::PhaseUpdate(phase) = event {
            assert_eq!(phase, "Standby Phase");
            break;
        }
    }
}
