use serde::{Deserialize, Serialize};

/// A card as declared by a player, optionally enriched with whatever the
/// recognition service returned alongside the name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub metadata: serde_json::Value,
}

impl CardInfo {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metadata: serde_json::Value::Null,
        }
    }
}
