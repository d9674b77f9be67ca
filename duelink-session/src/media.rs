use std::sync::Arc;
use webrtc::track::track_local::TrackLocal;

/// Opaque handle to the locally captured media. Capture and device
/// enumeration happen outside this crate; the session only attaches the
/// tracks to the peer connection. An empty handle is valid and degrades the
/// call to data-only (the remote side shows a placeholder).
#[derive(Clone, Default)]
pub struct LocalMedia {
    tracks: Vec<Arc<dyn TrackLocal + Send + Sync>>,
}

impl LocalMedia {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_track(mut self, track: Arc<dyn TrackLocal + Send + Sync>) -> Self {
        self.tracks.push(track);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub(crate) fn tracks(&self) -> &[Arc<dyn TrackLocal + Send + Sync>] {
        &self.tracks
    }
}
