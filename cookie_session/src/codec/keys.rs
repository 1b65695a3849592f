use std::fmt;

use super::{Codec, CodecError, SecureCookie};
use crate::utils::{base64url_decode, base64url_encode, fill_random};

/// Hash key length produced by [`KeyPair::generate`]
pub const GENERATED_HASH_KEY_LEN: usize = 64;
/// Block key length produced by [`KeyPair::generate`] (AES-256-GCM)
pub const GENERATED_BLOCK_KEY_LEN: usize = 32;

/// Key material for one codec: an authentication key and an optional
/// encryption key.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    hash_key: Vec<u8>,
    block_key: Option<Vec<u8>>,
}

impl KeyPair {
    pub fn new(hash_key: impl Into<Vec<u8>>, block_key: Option<Vec<u8>>) -> Self {
        Self {
            hash_key: hash_key.into(),
            block_key,
        }
    }

    /// Key pair that authenticates but does not encrypt
    pub fn signing(hash_key: impl Into<Vec<u8>>) -> Self {
        Self::new(hash_key, None)
    }

    /// Generate random key material, with a block key when `encrypt` is set
    pub fn generate(encrypt: bool) -> Result<Self, CodecError> {
        let hash_key = generate_key(GENERATED_HASH_KEY_LEN)?;
        let block_key = if encrypt {
            Some(generate_key(GENERATED_BLOCK_KEY_LEN)?)
        } else {
            None
        };
        Ok(Self::new(hash_key, block_key))
    }

    /// Parse `hash_key[:block_key]` with both keys in unpadded base64url
    pub fn parse(input: &str) -> Result<Self, CodecError> {
        let input = input.trim();
        let (hash, block) = match input.split_once(':') {
            Some((hash, block)) => (hash, Some(block)),
            None => (input, None),
        };

        let hash_key = base64url_decode(hash)?;
        if hash_key.is_empty() {
            return Err(CodecError::HashKeyNotSet);
        }
        let block_key = match block {
            Some(block) if !block.is_empty() => Some(base64url_decode(block)?),
            _ => None,
        };
        Ok(Self::new(hash_key, block_key))
    }

    /// Inverse of [`KeyPair::parse`]
    pub fn to_encoded(&self) -> String {
        match &self.block_key {
            Some(block) => format!(
                "{}:{}",
                base64url_encode(&self.hash_key),
                base64url_encode(block)
            ),
            None => base64url_encode(&self.hash_key),
        }
    }

    pub fn hash_key(&self) -> &[u8] {
        &self.hash_key
    }

    pub fn block_key(&self) -> Option<&[u8]> {
        self.block_key.as_deref()
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("hash_key", &format_args!("[{} bytes]", self.hash_key.len()))
            .field(
                "block_key",
                &self.block_key.as_ref().map(|k| format!("[{} bytes]", k.len())),
            )
            .finish()
    }
}

/// Build an ordered codec list, one codec per key pair.
///
/// The first pair becomes the primary codec used for every new cookie; the
/// remaining pairs are only consulted when reading.
pub fn codecs_from_pairs(pairs: &[KeyPair]) -> Result<Vec<Box<dyn Codec>>, CodecError> {
    pairs
        .iter()
        .map(|pair| {
            SecureCookie::new(pair.hash_key(), pair.block_key())
                .map(|codec| Box::new(codec) as Box<dyn Codec>)
        })
        .collect()
}

pub fn generate_key(len: usize) -> Result<Vec<u8>, CodecError> {
    let mut key = vec![0u8; len];
    fill_random(&mut key)?;
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_signing_only() {
        let encoded = base64url_encode(b"hash-key-material");
        let pair = KeyPair::parse(&encoded).unwrap();
        assert_eq!(pair.hash_key(), b"hash-key-material");
        assert_eq!(pair.block_key(), None);
    }

    #[test]
    fn test_parse_with_block_key() {
        let encoded = format!(
            " {}:{} ",
            base64url_encode(b"hash-key-material"),
            base64url_encode(&[7u8; 32])
        );
        let pair = KeyPair::parse(&encoded).unwrap();
        assert_eq!(pair.hash_key(), b"hash-key-material");
        assert_eq!(pair.block_key(), Some(&[7u8; 32][..]));
    }

    #[test]
    fn test_parse_trailing_colon_means_no_block_key() {
        let encoded = format!("{}:", base64url_encode(b"hash"));
        assert_eq!(KeyPair::parse(&encoded).unwrap().block_key(), None);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(KeyPair::parse(""), Err(CodecError::HashKeyNotSet));
        assert_eq!(KeyPair::parse("!!!"), Err(CodecError::Base64));
        let bad_block = format!("{}:***", base64url_encode(b"hash"));
        assert_eq!(KeyPair::parse(&bad_block), Err(CodecError::Base64));
    }

    #[test]
    fn test_generate_and_encode_roundtrip() {
        let pair = KeyPair::generate(true).unwrap();
        assert_eq!(pair.hash_key().len(), GENERATED_HASH_KEY_LEN);
        assert_eq!(pair.block_key().map(<[u8]>::len), Some(GENERATED_BLOCK_KEY_LEN));
        assert_eq!(KeyPair::parse(&pair.to_encoded()).unwrap(), pair);

        let pair = KeyPair::generate(false).unwrap();
        assert_eq!(pair.block_key(), None);
        assert_eq!(KeyPair::parse(&pair.to_encoded()).unwrap(), pair);
    }

    #[test]
    fn test_debug_hides_key_material() {
        let pair = KeyPair::new(b"super-secret".to_vec(), Some(vec![1u8; 16]));
        let debug = format!("{pair:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[12 bytes]"));
        assert!(debug.contains("[16 bytes]"));
    }

    #[test]
    fn test_codecs_from_pairs() {
        let pairs = vec![
            KeyPair::signing(b"new-key".to_vec()),
            KeyPair::new(b"old-key".to_vec(), Some(vec![3u8; 32])),
        ];
        let codecs = codecs_from_pairs(&pairs).unwrap();
        assert_eq!(codecs.len(), 2);

        let token = codecs[1].encode("sess", b"payload").unwrap();
        assert!(codecs[0].decode("sess", &token).is_err());
        assert_eq!(codecs[1].decode("sess", &token).unwrap(), b"payload".to_vec());
    }

    #[test]
    fn test_codecs_from_pairs_rejects_invalid_pair() {
        let pairs = vec![
            KeyPair::signing(b"good".to_vec()),
            KeyPair::new(b"good".to_vec(), Some(vec![0u8; 10])),
        ];
        assert_eq!(
            codecs_from_pairs(&pairs).err(),
            Some(CodecError::InvalidBlockKey(10))
        );
    }
}
