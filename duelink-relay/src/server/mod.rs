mod room_registry;
mod ws_handler;

pub use room_registry::{Frame, RoomRegistry};

use axum::Router;
use axum::routing::get;

/// The relay's whole surface: one upgrade endpoint per room.
pub fn router(registry: RoomRegistry) -> Router {
    Router::new()
        .route("/rooms/{room_id}/ws", get(ws_handler::ws_handler))
        .with_state(registry)
}
