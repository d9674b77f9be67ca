use anyhow::{Context, Result};
use async_trait::async_trait;
use duelink_core::SignalEvent;
use duelink_session::RoomChannel;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, warn};

const OUTBOUND_CAPACITY: usize = 64;
const INBOUND_CAPACITY: usize = 256;

enum Outbound {
    Event(SignalEvent),
    Close,
}

/// Wire-backed room channel over the relay's WebSocket endpoint. Undecodable
/// inbound frames are dropped with a log line, never surfaced.
pub struct WsRoomChannel {
    outbound: mpsc::Sender<Outbound>,
}

impl WsRoomChannel {
    /// Subscribe to `base_url` (e.g. `ws://host:8787`) for one room. Returns
    /// the send handle and the inbound event stream, in receipt order.
    pub async fn join(
        base_url: &str,
        room_id: &str,
    ) -> Result<(Arc<Self>, mpsc::Receiver<SignalEvent>)> {
        let url = format!("{base_url}/rooms/{room_id}/ws");
        let (ws, _) = connect_async(&url)
            .await
            .with_context(|| format!("failed to reach relay at {url}"))?;
        let (mut write, mut read) = ws.split();

        let (outbound_tx, mut outbound_rx) = mpsc::channel(OUTBOUND_CAPACITY);
        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_CAPACITY);

        tokio::spawn(async move {
            while let Some(out) = outbound_rx.recv().await {
                match out {
                    Outbound::Event(event) => match serde_json::to_string(&event) {
                        Ok(json) => {
                            if write.send(WsMessage::Text(json)).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!("unserializable signal event dropped: {e}"),
                    },
                    Outbound::Close => {
                        let _ = write.send(WsMessage::Close(None)).await;
                        break;
                    }
                }
            }
        });

        tokio::spawn(async move {
            while let Some(msg) = read.next().await {
                match msg {
                    Ok(WsMessage::Text(text)) => {
                        match serde_json::from_str::<SignalEvent>(&text) {
                            Ok(event) => {
                                if inbound_tx.send(event).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => debug!("undecodable relay frame dropped: {e}"),
                        }
                    }
                    Ok(WsMessage::Close(_)) | Err(_) => break,
                    Ok(_) => {}
                }
            }
            debug!("relay stream ended");
        });

        Ok((Arc::new(Self { outbound: outbound_tx }), inbound_rx))
    }
}

#[async_trait]
impl RoomChannel for WsRoomChannel {
    async fn send(&self, event: SignalEvent) {
        if self.outbound.send(Outbound::Event(event)).await.is_err() {
            warn!("relay connection gone, event dropped");
        }
    }

    async fn leave(&self) {
        let _ = self.outbound.send(Outbound::Close).await;
    }
}
