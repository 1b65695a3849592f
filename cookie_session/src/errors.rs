use thiserror::Error;

use crate::codec::CodecError;

#[derive(Debug, Error, Clone)]
pub enum SessionError {
    /// The request carries no cookie with the requested session name
    #[error("Session cookie not found: {0}")]
    NotFound(String),

    /// The cookie was present but failed verification or decoding
    #[error("Session decode error: {0}")]
    Decode(#[source] CodecError),

    /// The session values could not be turned into a cookie value
    #[error("Session encode error: {0}")]
    Encode(#[source] CodecError),

    #[error("Cookie error: {0}")]
    Cookie(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl SessionError {
    /// True when the request simply had no session yet
    pub fn is_not_found(&self) -> bool {
        matches!(self, SessionError::NotFound(_))
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, SessionError::Decode(_))
    }
}
