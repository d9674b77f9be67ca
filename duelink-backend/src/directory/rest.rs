use crate::config::BackendConfig;
use crate::directory::{NewRoom, RoomDirectory};
use crate::error::BackendError;
use async_trait::async_trait;
use duelink_core::RoomRow;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, Response};
use url::Url;

/// `RoomDirectory` over a PostgREST-style endpoint: `rooms` is a table,
/// filters ride in the query string, and inserts answer with the created
/// representation when asked to.
pub struct RestDirectory {
    http: Client,
    base: String,
    api_key: String,
}

impl RestDirectory {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        // Parsed once for validation; endpoints are formatted off the string.
        Url::parse(&config.directory_url)?;
        Ok(Self {
            http: Client::new(),
            base: config.directory_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}/{path}", self.base))
            .header("apikey", &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
    }

    fn ensure_success(
        response: &Response,
        context: &'static str,
    ) -> Result<(), BackendError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(BackendError::Status { status, context })
        }
    }
}

#[async_trait]
impl RoomDirectory for RestDirectory {
    async fn create_room(&self, room: NewRoom) -> Result<RoomRow, BackendError> {
        let response = self
            .request(Method::POST, "rooms")
            .header("Prefer", "return=representation")
            .json(&room)
            .send()
            .await?;
        Self::ensure_success(&response, "create_room")?;

        // Inserts answer with an array of created rows.
        let mut rows: Vec<RoomRow> = response.json().await?;
        rows.pop().ok_or(BackendError::EmptyResponse("create_room"))
    }

    async fn list_rooms(&self) -> Result<Vec<RoomRow>, BackendError> {
        let response = self
            .request(Method::GET, "rooms")
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .send()
            .await?;
        Self::ensure_success(&response, "list_rooms")?;
        Ok(response.json().await?)
    }

    async fn update_player_count(
        &self,
        room_id: &str,
        current_players: u32,
    ) -> Result<(), BackendError> {
        let response = self
            .request(Method::PATCH, "rooms")
            .query(&[("id", format!("eq.{room_id}"))])
            .json(&serde_json::json!({ "current_players": current_players }))
            .send()
            .await?;
        Self::ensure_success(&response, "update_player_count")
    }
}
