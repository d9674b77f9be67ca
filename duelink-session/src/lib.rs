pub mod bus;
pub mod error;
pub mod game;
pub mod media;
pub mod peer;
pub mod session;
pub mod signaling;

pub use bus::CommandBus;
pub use error::SessionError;
pub use game::{Action, GameSnapshot, GameStoreConfig};
pub use media::LocalMedia;
pub use peer::{NegotiationState, PeerSessionConfig, SessionEvent};
pub use session::{GameSession, GameSessionConfig, LocalIdentity};
pub use signaling::{MemoryRelay, RoomChannel};
