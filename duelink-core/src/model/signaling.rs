use crate::model::card::CardInfo;
use crate::model::command::GameCommand;
use crate::model::ids::ClientId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpKind {
    Offer,
    Answer,
}

/// An opaque negotiated capability descriptor, exchanged once each way per
/// connection attempt. A side that already holds a remote description
/// ignores further offers/answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub kind: SdpKind,
    pub sdp: String,
}

/// Browser-shaped ICE candidate hint, unordered relative to descriptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IceCandidateInit {
    pub candidate: String,
    #[serde(rename = "sdpMid", skip_serializing_if = "Option::is_none")]
    pub sdp_mid: Option<String>,
    #[serde(rename = "sdpMLineIndex", skip_serializing_if = "Option::is_none")]
    pub sdp_mline_index: Option<u16>,
    #[serde(rename = "usernameFragment", skip_serializing_if = "Option::is_none")]
    pub username_fragment: Option<String>,
}

/// Every named broadcast event on a room topic: the negotiation events plus
/// one event per game command tag (the relay fallback path of the command
/// bus). The relay itself never interprets these; both ends agree on this
/// shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum SignalEvent {
    #[serde(rename_all = "camelCase")]
    Ready { client_id: ClientId, username: String },
    Offer {
        offer: SessionDescription,
        username: String,
    },
    Answer {
        answer: SessionDescription,
        username: String,
    },
    IceCandidate(IceCandidateInit),
    PhaseUpdate(String),
    LpUpdate(i32),
    PassTurn { timestamp: u64 },
    CardDeclared(CardInfo),
}

impl SignalEvent {
    /// Split off the game-command events the dual-transport bus consumes.
    /// Negotiation events come back unchanged in `Err`.
    pub fn into_game_command(self) -> Result<GameCommand, SignalEvent> {
        match self {
            SignalEvent::PhaseUpdate(phase) => Ok(GameCommand::PhaseUpdate(phase)),
            SignalEvent::LpUpdate(total) => Ok(GameCommand::LpUpdate(total)),
            SignalEvent::PassTurn { timestamp } => Ok(GameCommand::PassTurn { timestamp }),
            SignalEvent::CardDeclared(card) => Ok(GameCommand::CardDeclared(card)),
            other => Err(other),
        }
    }
}

impl From<GameCommand> for SignalEvent {
    fn from(cmd: GameCommand) -> Self {
        match cmd {
            GameCommand::PhaseUpdate(phase) => SignalEvent::PhaseUpdate(phase),
            GameCommand::LpUpdate(total) => SignalEvent::LpUpdate(total),
            GameCommand::PassTurn { timestamp } => SignalEvent::PassTurn { timestamp },
            GameCommand::CardDeclared(card) => SignalEvent::CardDeclared(card),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_event_uses_camel_case_payload() {
        let evt = SignalEvent::Ready {
            client_id: ClientId::from("a1"),
            username: "Duelist".into(),
        };
        let json = serde_json::to_value(&evt).unwrap();
        assert_eq!(json["event"], "ready");
        assert_eq!(json["payload"]["clientId"], "a1");
        assert_eq!(json["payload"]["username"], "Duelist");
    }

    #[test]
    fn ice_candidate_event_keeps_browser_field_names() {
        let evt = SignalEvent::IceCandidate(IceCandidateInit {
            candidate: "candidate:1 1 udp 2122260223 192.0.2.1 54400 typ host".into(),
            sdp_mid: Some("0".into()),
            sdp_mline_index: Some(0),
            username_fragment: None,
        });
        let json = serde_json::to_value(&evt).unwrap();
        assert_eq!(json["event"], "ice-candidate");
        assert_eq!(json["payload"]["sdpMid"], "0");
        assert_eq!(json["payload"]["sdpMLineIndex"], 0);
    }

    #[test]
    fn game_commands_map_onto_their_own_event_names() {
        let cmd = GameCommand::LpUpdate(7000);
        let evt = SignalEvent::from(cmd.clone());
        let json = serde_json::to_value(&evt).unwrap();
        assert_eq!(json["event"], cmd.event_name());
        assert_eq!(evt.into_game_command().unwrap(), cmd);
    }

    #[test]
    fn negotiation_events_are_not_game_commands() {
        let evt = SignalEvent::Ready {
            client_id: ClientId::generate(),
            username: "x".into(),
        };
        assert!(evt.into_game_command().is_err());
    }
}
