use duelink_core::{CardInfo, GameType, TurnOwner};
use duelink_session::{Action, MemoryRelay};

use crate::integration::init_tracing;
use crate::utils::{connect_pair, wait_for_state};

#[tokio::test]
async fn passing_the_turn_converges_both_sides() {
    init_tracing();

    let relay = MemoryRelay::new();
    let (mut a, mut b) = connect_pair(&relay, "duel").await;

    a.actions.send(Action::PassTurn).await.unwrap();

    let snap_a = wait_for_state(&mut a.state, |s| {
        s.turn == TurnOwner::Theirs && !s.switching
    })
    .await;
    let snap_b = wait_for_state(&mut b.state, |s| {
        s.turn == TurnOwner::Yours && !s.switching
    })
    .await;

    // Both sides settle on the canonical opening phase of the new turn.
    assert_eq!(snap_a.phase, "Draw Phase");
    assert_eq!(snap_b.phase, "Draw Phase");
}

#[tokio::test]
async fn walking_every_phase_hands_the_turn_over() {
    init_tracing();

    let relay = MemoryRelay::new();
    let (mut a, mut b) = connect_pair(&relay, "duel").await;

    for _ in 0..GameType::Yugioh.phases().len() {
        a.actions.send(Action::AdvancePhase).await.unwrap();
    }

    wait_for_state(&mut a.state, |s| {
        s.turn == TurnOwner::Theirs && !s.switching
    })
    .await;
    let snap_b = wait_for_state(&mut b.state, |s| {
        s.turn == TurnOwner::Yours && !s.switching
    })
    .await;
    assert_eq!(snap_b.phase, "Draw Phase");
}

#[tokio::test]
async fn declared_card_shows_in_the_opponent_slot() {
    init_tracing();

    let relay = MemoryRelay::new();
    let (a, mut b) = connect_pair(&relay, "duel").await;

    a.actions
        .send(Action::DeclareCard(CardInfo::named("Blue-Eyes White Dragon")))
        .await
        .unwrap();

    let snap = wait_for_state(&mut b.state, |s| s.opponent_card.is_some()).await;
    assert_eq!(snap.opponent_card.unwrap().name, "Blue-Eyes White Dragon");
}
