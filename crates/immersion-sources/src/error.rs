use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} returned {status}: {message}")]
    Api {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("video not found: {0}")]
    VideoNotFound(String),

    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    #[error("could not decode response: {0}")]
    Decode(String),

    /// Already phrased for the user
    #[error("{0}")]
    Auth(String),

    #[error("not signed in")]
    NotAuthenticated,
}

impl SourceError {
    pub fn new_decode(message: impl Into<String>) -> Self {
        SourceError::Decode(message.into())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(e: serde_json::Error) -> Self {
        SourceError::Decode(e.to_string())
    }
}
