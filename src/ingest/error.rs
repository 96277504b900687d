use thiserror::Error;

use crate::errors::AppError;

#[derive(Debug, Error)]
pub enum IngestError {
    /// The results page could not be downloaded.
    #[error("Network error fetching {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    App(#[from] AppError),
}

impl IngestError {
    pub fn is_network(&self) -> bool {
        matches!(self, IngestError::Fetch { .. })
    }
}

pub type IngestResult<T> = Result<T, IngestError>;
