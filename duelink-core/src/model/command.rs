use crate::model::card::CardInfo;
use serde::{Deserialize, Serialize};

/// Application commands exchanged between the two peers. This is the wire
/// format of the data channel (JSON text frames) and the payload of the
/// matching relay fallback events.
///
/// Every variant is safe to apply more than once: the receiver keeps the
/// last value for `phase-update` / `lp-update` / `card-declared`, and
/// `pass-turn` carries a strictly increasing timestamp so stale duplicates
/// can be rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum GameCommand {
    /// The sender advanced to this phase.
    PhaseUpdate(String),
    /// The sender's new life-point total.
    LpUpdate(i32),
    /// The sender passed the turn. Unix milliseconds, monotonically
    /// increasing per game.
    PassTurn { timestamp: u64 },
    /// The sender declared a card.
    CardDeclared(CardInfo),
}

impl GameCommand {
    /// The relay event name this command travels under when the data
    /// channel is not available.
    pub fn event_name(&self) -> &'static str {
        match self {
            GameCommand::PhaseUpdate(_) => "phase-update",
            GameCommand::LpUpdate(_) => "lp-update",
            GameCommand::PassTurn { .. } => "pass-turn",
            GameCommand::CardDeclared(_) => "card-declared",
        }
    }
}
