use duelink_core::{SignalEvent, TurnOwner};
use duelink_session::{LocalMedia, MemoryRelay, SessionEvent};
use std::time::Duration;

use crate::integration::init_tracing;
use crate::utils::{
    CONNECT_TIMEOUT_MS, answerer_identity, connect_pair, join_session, offerer_identity,
    sample_video_media, spawn_sample_writer, wait_for_event,
};

#[tokio::test]
async fn election_produces_exactly_one_offer() {
    init_tracing();

    let relay = MemoryRelay::new();
    let (_observer, mut observer_rx) = relay.join("duel");

    let _a = join_session(
        &relay,
        "duel",
        offerer_identity(),
        LocalMedia::none(),
        TurnOwner::Yours,
    )
    .await;
    let _b = join_session(
        &relay,
        "duel",
        answerer_identity(),
        LocalMedia::none(),
        TurnOwner::Theirs,
    )
    .await;

    // Watch the room until the answer goes out, counting offers on the way.
    let mut offers = 0;
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    loop {
        let event = tokio::time::timeout_at(deadline, observer_rx.recv())
            .await
            .expect("no answer observed on the room topic")
            .expect("relay closed");
        match event {
            SignalEvent::Offer { .. } => offers += 1,
            SignalEvent::Answer { .. } => break,
            _ => {}
        }
    }

    // Both peers announced ready; only one of them may have offered.
    tokio::time::sleep(Duration::from_millis(300)).await;
    while let Ok(event) = observer_rx.try_recv() {
        if matches!(event, SignalEvent::Offer { .. }) {
            offers += 1;
        }
    }
    assert_eq!(offers, 1);
}

#[tokio::test]
async fn peers_open_the_game_channel() {
    init_tracing();

    let relay = MemoryRelay::new();
    let (a, b) = connect_pair(&relay, "duel").await;

    a.leave().await;
    b.leave().await;
}

#[tokio::test]
async fn remote_usernames_are_exchanged() {
    init_tracing();

    let relay = MemoryRelay::new();
    let mut a = join_session(
        &relay,
        "duel",
        offerer_identity(),
        LocalMedia::none(),
        TurnOwner::Yours,
    )
    .await;
    let mut b = join_session(
        &relay,
        "duel",
        answerer_identity(),
        LocalMedia::none(),
        TurnOwner::Theirs,
    )
    .await;

    let event = wait_for_event(
        &mut a.events,
        |e| matches!(e, SessionEvent::RemoteUsername(_)),
        CONNECT_TIMEOUT_MS,
    )
    .await;
    assert!(matches!(event, SessionEvent::RemoteUsername(name) if name == "bob"));

    let event = wait_for_event(
        &mut b.events,
        |e| matches!(e, SessionEvent::RemoteUsername(_)),
        CONNECT_TIMEOUT_MS,
    )
    .await;
    assert!(matches!(event, SessionEvent::RemoteUsername(name) if name == "alice"));
}

#[tokio::test]
async fn first_inbound_media_reports_connected() {
    init_tracing();

    let relay = MemoryRelay::new();
    let (media_a, track_a) = sample_video_media("alice-cam");
    let (media_b, track_b) = sample_video_media("bob-cam");

    let mut a = join_session(&relay, "duel", offerer_identity(), media_a, TurnOwner::Yours).await;
    let mut b = join_session(
        &relay,
        "duel",
        answerer_identity(),
        media_b,
        TurnOwner::Theirs,
    )
    .await;

    let writer_a = spawn_sample_writer(track_a);
    let writer_b = spawn_sample_writer(track_b);

    let event = wait_for_event(
        &mut a.events,
        |e| matches!(e, SessionEvent::Connected { .. }),
        CONNECT_TIMEOUT_MS,
    )
    .await;
    if let SessionEvent::Connected { remote_username } = event {
        assert_eq!(remote_username.as_deref(), Some("bob"));
    }

    wait_for_event(
        &mut b.events,
        |e| matches!(e, SessionEvent::Connected { .. }),
        CONNECT_TIMEOUT_MS,
    )
    .await;

    writer_a.abort();
    writer_b.abort();
    a.leave().await;
    b.leave().await;
}
