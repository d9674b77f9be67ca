use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::info;

const TOPIC_CAPACITY: usize = 256;

/// One relayed frame. The sender id only exists so members never hear their
/// own broadcasts echoed back.
#[derive(Debug, Clone)]
pub struct Frame {
    pub sender: u64,
    pub text: String,
}

/// Lazily created broadcast topic per room id. Topics are pruned once the
/// last member disconnects; a later join simply recreates them.
#[derive(Clone, Default)]
pub struct RoomRegistry {
    rooms: Arc<DashMap<String, broadcast::Sender<Frame>>>,
    next_member: Arc<AtomicU64>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_member(&self) -> u64 {
        self.next_member.fetch_add(1, Ordering::Relaxed)
    }

    pub fn topic(&self, room_id: &str) -> broadcast::Sender<Frame> {
        self.rooms
            .entry(room_id.to_string())
            .or_insert_with(|| {
                info!("creating room topic '{room_id}'");
                broadcast::channel(TOPIC_CAPACITY).0
            })
            .clone()
    }

    pub fn prune(&self, room_id: &str) {
        let removed = self
            .rooms
            .remove_if(room_id, |_, topic| topic.receiver_count() == 0);
        if removed.is_some() {
            info!("room topic '{room_id}' emptied, pruned");
        }
    }
}
