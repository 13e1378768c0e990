//! Domain error types.

use thiserror::Error;

/// Failure to acquire or accept the catalogue. Terminal for the session.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The source could not be read or fetched.
    #[error("catalogue unreachable: {0}")]
    Unreachable(String),
    /// The payload was read but does not describe a valid catalogue.
    #[error("catalogue malformed: {0}")]
    Malformed(String),
}

impl From<std::io::Error> for LoadError {
    fn from(err: std::io::Error) -> Self {
        Self::Unreachable(err.to_string())
    }
}

impl From<reqwest::Error> for LoadError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Malformed(err.to_string())
        } else {
            Self::Unreachable(err.to_string())
        }
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

/// Reasons a play attempt in the cabinet is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlayError {
    /// The cabinet is switched off; the attempt is dropped silently.
    #[error("cabinet is powered off")]
    PoweredOff,
    /// No credits left; the user is prompted to insert a coin.
    #[error("insert coin to play")]
    NoCredits,
}
