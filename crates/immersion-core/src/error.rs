use immersion_sources::SourceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Please enter a valid YouTube URL (got '{0}')")]
    InvalidVideoReference(String),

    #[error("not signed in")]
    NotSignedIn,

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}
