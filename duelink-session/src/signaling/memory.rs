use crate::signaling::RoomChannel;
use async_trait::async_trait;
use dashmap::DashMap;
use duelink_core::SignalEvent;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};

const TOPIC_CAPACITY: usize = 256;

#[derive(Clone)]
struct Envelope {
    sender: u64,
    event: SignalEvent,
}

/// In-process pub/sub relay: one broadcast topic per room id. A member never
/// receives its own sends. Used by tests and by two clients sharing a
/// process; the wire-backed equivalent lives in the relay crate.
#[derive(Clone, Default)]
pub struct MemoryRelay {
    rooms: Arc<DashMap<String, broadcast::Sender<Envelope>>>,
    next_member: Arc<AtomicU64>,
}

impl MemoryRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to a room topic. Returns the send handle and the inbound
    /// event stream, in receipt order.
    pub fn join(&self, room_id: &str) -> (Arc<MemoryRoomChannel>, mpsc::Receiver<SignalEvent>) {
        let topic = self
            .rooms
            .entry(room_id.to_string())
            .or_insert_with(|| broadcast::channel(TOPIC_CAPACITY).0)
            .clone();

        let member = self.next_member.fetch_add(1, Ordering::Relaxed);
        let (inbound_tx, inbound_rx) = mpsc::channel(TOPIC_CAPACITY);

        let mut topic_rx = topic.subscribe();
        tokio::spawn(async move {
            loop {
                match topic_rx.recv().await {
                    Ok(envelope) if envelope.sender != member => {
                        if inbound_tx.send(envelope.event).await.is_err() {
                            break;
                        }
                    }
                    Ok(_) => {} // own broadcast, not echoed back
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("memory relay member {member} lagged, dropped {n} events");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        let channel = Arc::new(MemoryRoomChannel {
            topic,
            member,
            left: AtomicBool::new(false),
        });
        (channel, inbound_rx)
    }
}

pub struct MemoryRoomChannel {
    topic: broadcast::Sender<Envelope>,
    member: u64,
    left: AtomicBool,
}

#[async_trait]
impl RoomChannel for MemoryRoomChannel {
    async fn send(&self, event: SignalEvent) {
        if self.left.load(Ordering::Acquire) {
            return;
        }
        // Fire-and-forget: an empty room just means nobody was listening.
        if self.topic.send(Envelope {
            sender: self.member,
            event,
        })
        .is_err()
        {
            debug!("memory relay send with no subscribers");
        }
    }

    async fn leave(&self) {
        self.left.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duelink_core::ClientId;

    fn ready(id: &str) -> SignalEvent {
        SignalEvent::Ready {
            client_id: ClientId::from(id),
            username: id.to_string(),
        }
    }

    #[tokio::test]
    async fn members_do_not_hear_their_own_sends() {
        let relay = MemoryRelay::new();
        let (a, mut a_rx) = relay.join("room");
        let (b, mut b_rx) = relay.join("room");

        a.send(ready("a1")).await;
        assert_eq!(b_rx.recv().await, Some(ready("a1")));

        b.send(ready("b2")).await;
        assert_eq!(a_rx.recv().await, Some(ready("b2")));

        // Nothing was echoed back to the sender.
        assert!(a_rx.try_recv().is_err());
        assert!(b_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn delivery_order_is_send_order_per_sender() {
        let relay = MemoryRelay::new();
        let (a, _a_rx) = relay.join("room");
        let (_b, mut b_rx) = relay.join("room");

        for total in [8000, 7000, 6500] {
            a.send(SignalEvent::LpUpdate(total)).await;
        }
        for total in [8000, 7000, 6500] {
            assert_eq!(b_rx.recv().await, Some(SignalEvent::LpUpdate(total)));
        }
    }

    #[tokio::test]
    async fn leave_is_idempotent_and_silences_sends() {
        let relay = MemoryRelay::new();
        let (a, _a_rx) = relay.join("room");
        let (_b, mut b_rx) = relay.join("room");

        a.leave().await;
        a.leave().await;
        a.send(ready("a1")).await;
        assert!(b_rx.try_recv().is_err());
    }
}
