use std::sync::Arc;
use webrtc::track::track_remote::TrackRemote;

/// Observable lifecycle of one peer session, delivered to the embedding
/// application in the order the negotiator saw them.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The peer told us its display name (piggybacked on ready/offer/answer).
    RemoteUsername(String),
    /// The reliable data channel is open on this side; game commands now
    /// prefer the direct path.
    ChannelOpen,
    /// An inbound media track started flowing. Handed over opaquely for
    /// rendering.
    RemoteTrack(Arc<TrackRemote>),
    /// First inbound media arrived: the session is connected.
    Connected { remote_username: Option<String> },
    /// Diagnostic transport status, not load-bearing for correctness.
    ConnectionState(String),
    /// Hard connectivity failure. Not recovered here; the caller tears the
    /// session down and rejoins.
    Failed(String),
}
