mod memory;
mod rest;
mod watch;

pub use memory::MemoryDirectory;
pub use rest::RestDirectory;
pub use watch::watch_rooms;

use crate::error::BackendError;
use async_trait::async_trait;
use duelink_core::{RoomRow, RoomSettings};
use serde::Serialize;

/// Row to insert; the directory assigns the id.
#[derive(Debug, Clone, Serialize)]
pub struct NewRoom {
    pub host_id: Option<String>,
    pub host_name: String,
    pub format: String,
    pub language: String,
    pub is_public: bool,
    pub current_players: u32,
    pub max_players: u32,
    pub password: Option<String>,
    pub settings: RoomSettings,
}

impl NewRoom {
    /// A fresh public two-seat room with the host already counted in.
    pub fn hosted_by(host_name: impl Into<String>) -> Self {
        Self {
            host_id: None,
            host_name: host_name.into(),
            format: "Advanced".to_string(),
            language: "en".to_string(),
            is_public: true,
            current_players: 1,
            max_players: 2,
            password: None,
            settings: RoomSettings::default(),
        }
    }
}

/// The lobby's persistence seam.
#[async_trait]
pub trait RoomDirectory: Send + Sync {
    async fn create_room(&self, room: NewRoom) -> Result<RoomRow, BackendError>;

    /// All visible rooms, newest first.
    async fn list_rooms(&self) -> Result<Vec<RoomRow>, BackendError>;

    /// Seat accounting: set on join and leave so `is_full` stays accurate.
    async fn update_player_count(
        &self,
        room_id: &str,
        current_players: u32,
    ) -> Result<(), BackendError>;
}
