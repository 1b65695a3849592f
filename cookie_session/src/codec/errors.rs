use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("No codecs configured")]
    NoCodecs,

    #[error("Hash key is not set")]
    HashKeyNotSet,

    #[error("Invalid block key length: {0} bytes (expected 16 or 32)")]
    InvalidBlockKey(usize),

    #[error("Invalid MAC")]
    MacInvalid,

    #[error("Invalid timestamp: {0}")]
    Timestamp(String),

    #[error("Expired timestamp")]
    Expired,

    #[error("Encoded value is too long: {0} bytes")]
    ValueTooLong(usize),

    #[error("Failed to decode base64url")]
    Base64,

    #[error("Serialize error: {0}")]
    Serialize(String),

    #[error("Deserialize error: {0}")]
    Deserialize(String),

    #[error("Crypto error: {0}")]
    Crypto(String),
}
