use crate::signaling::RoomChannel;
use duelink_core::{GameCommand, SignalEvent};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, warn};
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_state::RTCDataChannelState;

const INBOUND_CAPACITY: usize = 64;

/// Best-effort, at-most-once delivery of game commands over two transports:
/// the negotiated reliable data channel when it is open, the room topic on
/// the relay otherwise. No acks, no retries; both transports may deliver the
/// same logical update, so the receiving store applies commands
/// idempotently.
#[derive(Clone)]
pub struct CommandBus {
    channel: Arc<Mutex<Option<Arc<RTCDataChannel>>>>,
    signaling: Arc<dyn RoomChannel>,
    inbound_tx: mpsc::Sender<GameCommand>,
}

impl CommandBus {
    /// Returns the bus and the unified inbound stream: commands received
    /// over either transport, already decoded, in receipt order.
    pub fn new(signaling: Arc<dyn RoomChannel>) -> (Self, mpsc::Receiver<GameCommand>) {
        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_CAPACITY);
        (
            Self {
                channel: Arc::new(Mutex::new(None)),
                signaling,
                inbound_tx,
            },
            inbound_rx,
        )
    }

    /// Called by the negotiator once the data channel opens, on either side.
    pub(crate) async fn attach_channel(&self, dc: Arc<RTCDataChannel>) {
        *self.channel.lock().await = Some(dc);
    }

    /// Send a command to the peer. The direct channel counts as used only
    /// when it reports open *and* the send call itself succeeds; anything
    /// else falls back to the relay event named after the command tag.
    pub async fn send(&self, cmd: GameCommand) {
        let payload = match serde_json::to_string(&cmd) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("failed to encode {}: {e}", cmd.event_name());
                return;
            }
        };

        if let Some(dc) = self.channel.lock().await.as_ref() {
            if dc.ready_state() == RTCDataChannelState::Open {
                match dc.send_text(payload).await {
                    Ok(_) => return,
                    Err(e) => debug!("data channel send failed, using relay: {e}"),
                }
            } else {
                debug!(
                    "data channel not open ({:?}), using relay for {}",
                    dc.ready_state(),
                    cmd.event_name()
                );
            }
        }

        self.signaling.send(SignalEvent::from(cmd)).await;
    }

    /// Feed a command received on either transport into the single inbound
    /// stream the game store consumes.
    pub(crate) async fn deliver(&self, cmd: GameCommand) {
        if self.inbound_tx.send(cmd).await.is_err() {
            debug!("inbound command dropped, store already gone");
        }
    }
}
