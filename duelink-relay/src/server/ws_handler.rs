use crate::server::{Frame, RoomRegistry};
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast;
use tracing::{info, warn};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(room_id): Path<String>,
    State(registry): State<RoomRegistry>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, room_id, registry))
}

async fn handle_socket(socket: WebSocket, room_id: String, registry: RoomRegistry) {
    let member = registry.next_member();
    info!("member {member} joined room '{room_id}'");

    let (mut sender, mut receiver) = socket.split();
    let topic = registry.topic(&room_id);
    let mut topic_rx = topic.subscribe();

    let send_room_id = room_id.clone();
    let mut send_task = tokio::spawn(async move {
        loop {
            match topic_rx.recv().await {
                Ok(frame) if frame.sender != member => {
                    if sender.send(Message::Text(frame.text.into())).await.is_err() {
                        break;
                    }
                }
                Ok(_) => {} // own broadcast, not echoed back
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("member {member} in '{send_room_id}' lagged, dropped {n} frames");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    // Opaque fan-out; frames are never interpreted here.
                    let _ = topic.send(Frame {
                        sender: member,
                        text: text.to_string(),
                    });
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    registry.prune(&room_id);
    info!("member {member} left room '{room_id}'");
}
