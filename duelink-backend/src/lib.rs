//! HTTP collaborators the companion app talks to: the room directory
//! (PostgREST-style CRUD used as the lobby) and the card recognition
//! service. Both are consumed at their interface; traits at the seam keep
//! the rest of the system testable without a network.

pub mod config;
pub mod directory;
pub mod error;
pub mod recognizer;

pub use config::BackendConfig;
pub use directory::{MemoryDirectory, NewRoom, RestDirectory, RoomDirectory, watch_rooms};
pub use error::BackendError;
pub use recognizer::{CardRecognizer, IdentifyOutcome, Recognize, Scanner, spawn_scan_loop};
