mod card;
mod command;
mod directory;
mod game;
mod ids;
mod signaling;

pub use card::CardInfo;
pub use command::GameCommand;
pub use directory::{RoomRow, RoomSettings};
pub use game::{GameType, TurnOwner};
pub use ids::{ClientId, RoomId};
pub use signaling::{IceCandidateInit, SdpKind, SessionDescription, SignalEvent};
