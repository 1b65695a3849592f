//! Signed and optionally encrypted cookie values
//!
//! A token is produced in four steps:
//! 1. the payload is encrypted with AES-GCM when a block key is configured
//!    (random nonce prepended, cookie name bound as associated data);
//! 2. the result is base64url encoded;
//! 3. `name|timestamp|payload` is authenticated with HMAC-SHA256;
//! 4. `timestamp|payload|mac` is base64url encoded into the cookie value.
//!
//! Decoding verifies the MAC before anything else is looked at, so a tampered
//! token never reaches the decryption or deserialization steps.

use std::fmt;

use chrono::Utc;
use hmac::{Hmac, Mac};
use ring::aead::{self, Aad, LessSafeKey, NONCE_LEN, Nonce, UnboundKey};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::{Codec, CodecError};
use crate::utils::{base64url_decode, base64url_encode, fill_random};

type HmacSha256 = Hmac<Sha256>;

/// Tokens older than this are rejected (30 days)
pub const DEFAULT_MAX_AGE_SECS: u64 = 86400 * 30;

/// Browsers cap a single cookie at roughly 4KB
pub const DEFAULT_MAX_LENGTH: usize = 4096;

pub struct SecureCookie {
    hash_key: Vec<u8>,
    block: Option<LessSafeKey>,
    max_age: u64,
    max_length: usize,
}

impl SecureCookie {
    /// Create a codec from a hash key and an optional block key.
    ///
    /// The hash key authenticates values and may be of any non-zero length
    /// (32 or 64 bytes recommended). The block key enables encryption and must
    /// be 16 bytes (AES-128-GCM) or 32 bytes (AES-256-GCM).
    pub fn new(hash_key: &[u8], block_key: Option<&[u8]>) -> Result<Self, CodecError> {
        if hash_key.is_empty() {
            return Err(CodecError::HashKeyNotSet);
        }
        let block = block_key.map(block_cipher).transpose()?;

        Ok(Self {
            hash_key: hash_key.to_vec(),
            block,
            max_age: DEFAULT_MAX_AGE_SECS,
            max_length: DEFAULT_MAX_LENGTH,
        })
    }

    /// Maximum token age in seconds, 0 disables the check
    pub fn with_max_age(mut self, max_age: u64) -> Self {
        self.max_age = max_age;
        self
    }

    /// Maximum encoded length in bytes, 0 disables the check
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn is_encrypting(&self) -> bool {
        self.block.is_some()
    }

    fn mac(&self, name: &[u8], timestamp: &[u8], payload: &[u8]) -> Result<Vec<u8>, CodecError> {
        let mut mac = HmacSha256::new_from_slice(&self.hash_key)
            .map_err(|e| CodecError::Crypto(e.to_string()))?;
        mac.update(name);
        mac.update(b"|");
        mac.update(timestamp);
        mac.update(b"|");
        mac.update(payload);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    pub(crate) fn encode_at(
        &self,
        name: &str,
        payload: &[u8],
        timestamp: i64,
    ) -> Result<String, CodecError> {
        let payload = match &self.block {
            Some(key) => encrypt(key, name, payload)?,
            None => payload.to_vec(),
        };
        let payload = base64url_encode(&payload);
        let timestamp = timestamp.to_string();
        let mac = self.mac(name.as_bytes(), timestamp.as_bytes(), payload.as_bytes())?;

        let mut token = Vec::with_capacity(timestamp.len() + payload.len() + mac.len() + 2);
        token.extend_from_slice(timestamp.as_bytes());
        token.push(b'|');
        token.extend_from_slice(payload.as_bytes());
        token.push(b'|');
        token.extend_from_slice(&mac);

        let encoded = base64url_encode(&token);
        if self.max_length != 0 && encoded.len() > self.max_length {
            return Err(CodecError::ValueTooLong(encoded.len()));
        }
        Ok(encoded)
    }

    pub(crate) fn decode_at(&self, name: &str, value: &str, now: i64) -> Result<Vec<u8>, CodecError> {
        if self.max_length != 0 && value.len() > self.max_length {
            return Err(CodecError::ValueTooLong(value.len()));
        }
        let token = base64url_decode(value)?;

        // The MAC is raw bytes and may itself contain '|', so split at most twice
        let mut parts = token.splitn(3, |b| *b == b'|');
        let (Some(timestamp), Some(payload), Some(mac)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(CodecError::MacInvalid);
        };

        let expected = self.mac(name.as_bytes(), timestamp, payload)?;
        if !bool::from(expected.as_slice().ct_eq(mac)) {
            return Err(CodecError::MacInvalid);
        }

        let timestamp: i64 = std::str::from_utf8(timestamp)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| CodecError::Timestamp("not a unix timestamp".to_string()))?;
        let max_age = i64::try_from(self.max_age).unwrap_or(i64::MAX);
        if self.max_age != 0 && timestamp < now.saturating_sub(max_age) {
            return Err(CodecError::Expired);
        }

        let payload = std::str::from_utf8(payload).map_err(|_| CodecError::Base64)?;
        let payload = base64url_decode(payload)?;
        match &self.block {
            Some(key) => decrypt(key, name, payload),
            None => Ok(payload),
        }
    }
}

impl Codec for SecureCookie {
    fn encode(&self, name: &str, payload: &[u8]) -> Result<String, CodecError> {
        self.encode_at(name, payload, Utc::now().timestamp())
    }

    fn decode(&self, name: &str, value: &str) -> Result<Vec<u8>, CodecError> {
        self.decode_at(name, value, Utc::now().timestamp())
    }
}

impl fmt::Debug for SecureCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureCookie")
            .field("hash_key", &"[redacted]")
            .field("encrypting", &self.is_encrypting())
            .field("max_age", &self.max_age)
            .field("max_length", &self.max_length)
            .finish()
    }
}

fn block_cipher(key: &[u8]) -> Result<LessSafeKey, CodecError> {
    let algorithm = match key.len() {
        16 => &aead::AES_128_GCM,
        32 => &aead::AES_256_GCM,
        len => return Err(CodecError::InvalidBlockKey(len)),
    };
    let unbound =
        UnboundKey::new(algorithm, key).map_err(|_| CodecError::InvalidBlockKey(key.len()))?;
    Ok(LessSafeKey::new(unbound))
}

fn encrypt(key: &LessSafeKey, name: &str, plaintext: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut nonce_bytes = [0u8; NONCE_LEN];
    fill_random(&mut nonce_bytes)?;
    let nonce = Nonce::assume_unique_for_key(nonce_bytes);

    let mut in_out = plaintext.to_vec();
    key.seal_in_place_append_tag(nonce, Aad::from(name.as_bytes()), &mut in_out)
        .map_err(|_| CodecError::Crypto("Failed to encrypt value".to_string()))?;

    let mut sealed = Vec::with_capacity(NONCE_LEN + in_out.len());
    sealed.extend_from_slice(&nonce_bytes);
    sealed.extend_from_slice(&in_out);
    Ok(sealed)
}

fn decrypt(key: &LessSafeKey, name: &str, mut sealed: Vec<u8>) -> Result<Vec<u8>, CodecError> {
    if sealed.len() < NONCE_LEN + key.algorithm().tag_len() {
        return Err(CodecError::Crypto("Ciphertext too short".to_string()));
    }
    let mut ciphertext = sealed.split_off(NONCE_LEN);
    let nonce = Nonce::try_assume_unique_for_key(&sealed)
        .map_err(|_| CodecError::Crypto("Invalid nonce".to_string()))?;

    let plaintext = key
        .open_in_place(nonce, Aad::from(name.as_bytes()), &mut ciphertext)
        .map_err(|_| CodecError::Crypto("Failed to decrypt value".to_string()))?;
    Ok(plaintext.to_vec())
}
