//! The boundary between session values and opaque cookie strings.
//!
//! A [`Codec`] authenticates (and may encrypt) an already serialized payload.
//! [`encode_multi`] and [`decode_multi`] add serialization and walk an ordered
//! codec list so keys can be rotated without invalidating live cookies.

mod errors;
mod keys;
mod secure;

use serde::{Serialize, de::DeserializeOwned};

pub use errors::CodecError;
pub use keys::{
    GENERATED_BLOCK_KEY_LEN, GENERATED_HASH_KEY_LEN, KeyPair, codecs_from_pairs, generate_key,
};
pub use secure::{DEFAULT_MAX_AGE_SECS, DEFAULT_MAX_LENGTH, SecureCookie};

pub trait Codec: Send + Sync {
    /// Turn a payload into a cookie-safe token bound to `name`
    fn encode(&self, name: &str, payload: &[u8]) -> Result<String, CodecError>;

    /// Verify a token issued for `name` and return its payload
    fn decode(&self, name: &str, value: &str) -> Result<Vec<u8>, CodecError>;
}

/// Serialize `value` and encode it with the primary (first) codec.
pub fn encode_multi<T>(name: &str, value: &T, codecs: &[Box<dyn Codec>]) -> Result<String, CodecError>
where
    T: Serialize + ?Sized,
{
    let primary = codecs.first().ok_or(CodecError::NoCodecs)?;
    let payload =
        serde_json::to_vec(value).map_err(|e| CodecError::Serialize(e.to_string()))?;
    primary.encode(name, &payload)
}

/// Decode `value` with each codec in order, returning the first success.
///
/// When every codec rejects the token, the primary codec's error is returned.
pub fn decode_multi<T>(name: &str, value: &str, codecs: &[Box<dyn Codec>]) -> Result<T, CodecError>
where
    T: DeserializeOwned,
{
    let mut first_error = None;

    for (index, codec) in codecs.iter().enumerate() {
        let decoded = codec.decode(name, value).and_then(|payload| {
            serde_json::from_slice(&payload).map_err(|e| CodecError::Deserialize(e.to_string()))
        });
        match decoded {
            Ok(decoded) => {
                if index > 0 {
                    tracing::debug!(codec = index, "Cookie verified with a rotated key");
                }
                return Ok(decoded);
            }
            Err(e) => {
                tracing::trace!(codec = index, error = %e, "Codec rejected cookie");
                first_error.get_or_insert(e);
            }
        }
    }

    Err(first_error.unwrap_or(CodecError::NoCodecs))
}
