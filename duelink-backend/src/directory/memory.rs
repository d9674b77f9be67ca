use crate::directory::{NewRoom, RoomDirectory};
use crate::error::BackendError;
use async_trait::async_trait;
use duelink_core::RoomRow;
use reqwest::StatusCode;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// In-process `RoomDirectory` for tests and offline development.
#[derive(Default)]
pub struct MemoryDirectory {
    rooms: Mutex<Vec<RoomRow>>,
    next_id: AtomicU64,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomDirectory for MemoryDirectory {
    async fn create_room(&self, room: NewRoom) -> Result<RoomRow, BackendError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let row = RoomRow {
            id: format!("room-{id}"),
            host_id: room.host_id,
            host_name: room.host_name,
            format: room.format,
            language: room.language,
            is_public: room.is_public,
            current_players: room.current_players,
            max_players: room.max_players,
            password: room.password,
            settings: room.settings,
        };
        let mut rooms = self.rooms.lock().unwrap_or_else(|e| e.into_inner());
        // Newest first, matching the REST directory's ordering.
        rooms.insert(0, row.clone());
        Ok(row)
    }

    async fn list_rooms(&self) -> Result<Vec<RoomRow>, BackendError> {
        Ok(self
            .rooms
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone())
    }

    async fn update_player_count(
        &self,
        room_id: &str,
        current_players: u32,
    ) -> Result<(), BackendError> {
        let mut rooms = self.rooms.lock().unwrap_or_else(|e| e.into_inner());
        match rooms.iter_mut().find(|r| r.id == room_id) {
            Some(room) => {
                room.current_players = current_players;
                Ok(())
            }
            None => Err(BackendError::Status {
                status: StatusCode::NOT_FOUND,
                context: "update_player_count",
            }),
        }
    }
}
