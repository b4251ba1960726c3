//! Actuator error types

/// Actuator result type
pub type Result<T> = std::result::Result<T, Error>;

/// Actuator errors
///
/// None of these ever fail a digital operation; callers log and move on.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Actuator not configured")]
    NotConfigured,

    #[error("Actuator request timed out")]
    Timeout,

    #[error("Actuator answered with status {0}")]
    Status(u16),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Error::Timeout
        } else {
            Error::Transport(e.to_string())
        }
    }
}
