use thiserror::Error;

/// Failure reported by a page, full-dataset, or lookup source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server returned status {status}: {message}")]
    Status { status: u16, message: String },
    /// The source answered but reported `success: false`.
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("could not decode response: {0}")]
    Decode(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// A newer request replaced this one before it completed. Never shown to the user.
    #[error("superseded by a newer request")]
    Superseded,
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Whether this error should reach the user-facing notification.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, Error::Superseded)
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
