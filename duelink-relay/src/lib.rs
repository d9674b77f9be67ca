//! Room event relay: a WebSocket fan-out server plus the matching client.
//!
//! The relay is deliberately dumb. It never parses what it forwards; every
//! text frame a member sends is broadcast verbatim to every other member of
//! the same room. All protocol knowledge lives in the clients.

pub mod client;
pub mod server;

pub use client::WsRoomChannel;
pub use server::{RoomRegistry, router};
