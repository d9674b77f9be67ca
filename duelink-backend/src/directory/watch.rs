use crate::directory::RoomDirectory;
use duelink_core::RoomRow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::interval;
use tracing::warn;

/// Poll-based room list subscription: re-lists on `period` and publishes
/// only when the listing actually changed. Stops when every receiver is
/// gone. Failed polls keep the previous listing.
pub fn watch_rooms(
    directory: Arc<dyn RoomDirectory>,
    period: Duration,
) -> watch::Receiver<Vec<RoomRow>> {
    let (tx, rx) = watch::channel(Vec::new());

    tokio::spawn(async move {
        let mut ticker = interval(period);
        loop {
            ticker.tick().await;
            if tx.is_closed() {
                break;
            }
            match directory.list_rooms().await {
                Ok(rooms) => {
                    let changed = *tx.borrow() != rooms;
                    if changed && tx.send(rooms).is_err() {
                        break;
                    }
                }
                Err(e) => warn!("room listing poll failed: {e}"),
            }
        }
    });

    rx
}
