use async_trait::async_trait;
use duelink_core::SignalEvent;

/// The seam between the session and whatever pub/sub relay hosts the room
/// topic. Implementations deliver each broadcast to every *other* current
/// member, at most once, with no cross-sender ordering guarantee.
///
/// `send` is fire-and-forget: a dead transport is logged by the
/// implementation and never surfaced to the caller. There are no delivery
/// acknowledgments, which is why game commands also travel the direct data
/// channel when it is open.
#[async_trait]
pub trait RoomChannel: Send + Sync {
    /// Broadcast an event to the other room members.
    async fn send(&self, event: SignalEvent);

    /// Unsubscribe from the topic. Idempotent.
    async fn leave(&self);
}
