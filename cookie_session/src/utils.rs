use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use ring::rand::SecureRandom;

use crate::codec::CodecError;

pub(crate) fn base64url_decode(input: &str) -> Result<Vec<u8>, CodecError> {
    URL_SAFE_NO_PAD
        .decode(input)
        .map_err(|_| CodecError::Base64)
}

pub(crate) fn base64url_encode(input: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

pub(crate) fn fill_random(buf: &mut [u8]) -> Result<(), CodecError> {
    let rng = ring::rand::SystemRandom::new();
    rng.fill(buf)
        .map_err(|_| CodecError::Crypto("Failed to generate random bytes".to_string()))
}
