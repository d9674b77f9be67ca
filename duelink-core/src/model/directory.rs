use serde::{Deserialize, Serialize};

/// Per-room settings persisted alongside the row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RoomSettings {
    #[serde(rename = "gameType", default)]
    pub game_type: Option<String>,
    #[serde(rename = "time_limit", default)]
    pub time_limit: Option<u32>,
}

/// Row shape of the room directory service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomRow {
    pub id: String,
    #[serde(default)]
    pub host_id: Option<String>,
    pub host_name: String,
    pub format: String,
    pub language: String,
    pub is_public: bool,
    pub current_players: u32,
    pub max_players: u32,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub settings: RoomSettings,
}

impl RoomRow {
    pub fn is_full(&self) -> bool {
        self.current_players >= self.max_players
    }
}
