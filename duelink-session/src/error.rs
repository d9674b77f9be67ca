use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("webrtc error: {0}")]
    WebRtc(#[from] webrtc::Error),

    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("signaling channel closed before the session ended")]
    SignalingClosed,

    #[error(transparent)]
    Setup(#[from] anyhow::Error),
}
