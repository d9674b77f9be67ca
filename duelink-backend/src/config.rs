use crate::error::BackendError;

/// The only process-level configuration the system has. Everything else is
/// plain config structs with defaults.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub directory_url: String,
    pub api_key: String,
    pub recognizer_url: String,
}

impl BackendConfig {
    pub fn from_env() -> Result<Self, BackendError> {
        Ok(Self {
            directory_url: require("DUELINK_DIRECTORY_URL")?,
            api_key: require("DUELINK_API_KEY")?,
            recognizer_url: require("DUELINK_RECOGNIZER_URL")?,
        })
    }
}

fn require(name: &'static str) -> Result<String, BackendError> {
    std::env::var(name).map_err(|_| BackendError::MissingConfig(name))
}
