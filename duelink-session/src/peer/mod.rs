mod candidate_buffer;
mod connection;
mod negotiator;
mod session_event;

pub use candidate_buffer::CandidateBuffer;
pub use negotiator::{NegotiationState, PeerSession, PeerSessionConfig};
pub use session_event::SessionEvent;

pub(crate) use connection::{PeerConnection, PeerEvent};
