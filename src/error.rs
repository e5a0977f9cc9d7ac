//! Error types for ib-sample-scraper.
//!
//! Missing elements on a fetched page are never errors: they degrade the
//! affected field to its default. The variants here cover the cases where a
//! whole unit of work (a listing, a page, a store call) could not be done.

/// Error type for scraping, parsing and persistence operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request could not be sent or the body could not be read.
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The server answered with a non-success status.
    #[error("request to {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// The markup could not be turned into a navigable document.
    #[error("malformed markup: {0}")]
    MalformedInput(String),

    /// A storage backend rejected an operation.
    #[error("persistence failed: {0}")]
    Persistence(String),

    /// Configuration could not be loaded or is inconsistent.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A batch was requested without any listing URLs.
    #[error("no listing URLs to scrape")]
    NothingToDo,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Coarse classification used in batch reports.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Transport { .. } | Self::HttpStatus { .. } => FailureKind::Transport,
            Self::MalformedInput(_) => FailureKind::MalformedInput,
            _ => FailureKind::Other,
        }
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Why a listing or sample page was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Transport,
    MalformedInput,
    Other,
}

/// Result type alias for crate operations.
pub type Result<T> = std::result::Result<T, Error>;
