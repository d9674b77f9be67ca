use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("missing configuration: {0} is not set")]
    MissingConfig(&'static str),

    #[error("invalid service url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {context}")]
    Status {
        status: reqwest::StatusCode,
        context: &'static str,
    },

    #[error("directory returned no row for {0}")]
    EmptyResponse(&'static str),
}
