use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The backend answered but reported `success: false`
    #[error("{0}")]
    Backend(String),

    #[error("invalid response: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;
