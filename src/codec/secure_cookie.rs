//! Signed and optionally encrypted cookie values
//!
//! Wire format: `timestamp.payload.tag`
//!
//! - `timestamp` is the decimal Unix time the value was encoded at
//! - `payload` is unpadded base64url of the JSON values, or of
//!   nonce + AES-GCM ciphertext when a block key is configured
//! - `tag` is unpadded base64url of HMAC-SHA256 over `name|timestamp|payload`
//!
//! Every character is in `[0-9A-Za-z_.-]`, so the value can be placed in a
//! cookie without further escaping.

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::cipher::{BlockCipher, NONCE_SIZE};
use super::key::KeyPair;
use super::{Codec, Values};
use crate::error::{Result, SessionError};

type HmacSha256 = Hmac<Sha256>;

/// Separator between the three wire segments
const SEGMENT_SEPARATOR: char = '.';

/// Domain separation prefix for synthetic nonce derivation
const NONCE_CONTEXT: &[u8] = b"crumbs-nonce";

/// Default maximum length of an encoded value, in bytes
pub const DEFAULT_MAX_LENGTH: usize = 4096;

/// A single key pair codec
///
/// Encoding is deterministic for a given name, values, key pair and
/// timestamp: the AES-GCM nonce is derived from the hash key and the
/// plaintext instead of being drawn at random.
#[derive(Clone)]
pub struct SecureCookie {
    hash_key: Vec<u8>,
    cipher: Option<BlockCipher>,
    max_age: i64,
    max_length: usize,
}

impl SecureCookie {
    /// Create a codec from a key pair
    ///
    /// The codec starts without an expiry policy (`max_age` 0) and with
    /// [`DEFAULT_MAX_LENGTH`].
    ///
    /// # Errors
    ///
    /// Returns `InvalidKey` if the hash key is empty or the block key is not
    /// 16 or 32 bytes long
    pub fn new(keys: &KeyPair) -> Result<Self> {
        if keys.hash_key().is_empty() {
            return Err(SessionError::InvalidKey(
                "hash key must not be empty".to_string(),
            ));
        }

        let cipher = keys.block_key().map(BlockCipher::new).transpose()?;

        Ok(Self {
            hash_key: keys.hash_key().to_vec(),
            cipher,
            max_age: 0,
            max_length: DEFAULT_MAX_LENGTH,
        })
    }

    /// Reject values older than `seconds`; 0 or negative disables the check
    #[must_use]
    pub fn with_max_age(mut self, seconds: i64) -> Self {
        self.set_max_age(seconds);
        self
    }

    /// Limit encoded values to `bytes`; 0 disables the check
    #[must_use]
    pub fn with_max_length(mut self, bytes: usize) -> Self {
        self.max_length = bytes;
        self
    }

    pub fn set_max_age(&mut self, seconds: i64) {
        self.max_age = seconds.max(0);
    }

    pub fn set_max_length(&mut self, bytes: usize) {
        self.max_length = bytes;
    }

    #[must_use]
    pub fn max_age(&self) -> i64 {
        self.max_age
    }

    #[must_use]
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    #[must_use]
    pub fn is_encrypting(&self) -> bool {
        self.cipher.is_some()
    }

    fn mac(&self) -> Result<HmacSha256> {
        <HmacSha256 as Mac>::new_from_slice(&self.hash_key)
            .map_err(|e| SessionError::InvalidKey(format!("Invalid HMAC key: {e}")))
    }

    fn tag(&self, name: &str, timestamp: &str, payload: &str) -> Result<HmacSha256> {
        let mut mac = self.mac()?;
        // Length prefix keeps names containing '|' from shifting field boundaries
        mac.update(&(name.len() as u64).to_be_bytes());
        mac.update(name.as_bytes());
        mac.update(b"|");
        mac.update(timestamp.as_bytes());
        mac.update(b"|");
        mac.update(payload.as_bytes());
        Ok(mac)
    }

    fn synthetic_nonce(&self, name: &str, timestamp: &str, plaintext: &[u8]) -> Result<[u8; NONCE_SIZE]> {
        let mut mac = self.mac()?;
        mac.update(NONCE_CONTEXT);
        mac.update(b"|");
        mac.update(&(name.len() as u64).to_be_bytes());
        mac.update(name.as_bytes());
        mac.update(b"|");
        mac.update(timestamp.as_bytes());
        mac.update(b"|");
        mac.update(plaintext);

        let digest = mac.finalize().into_bytes();
        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&digest[..NONCE_SIZE]);
        Ok(nonce)
    }

    fn check_length(&self, length: usize) -> Result<()> {
        if self.max_length != 0 && length > self.max_length {
            return Err(SessionError::ValueTooLong {
                length,
                max: self.max_length,
            });
        }
        Ok(())
    }
}

impl Codec for SecureCookie {
    fn encode_at(&self, name: &str, values: &Values, now: DateTime<Utc>) -> Result<String> {
        let plaintext = serde_json::to_vec(values)
            .map_err(|e| SessionError::Encoding(format!("Failed to serialize values: {e}")))?;
        let timestamp = now.timestamp().to_string();

        let payload_bytes = match &self.cipher {
            Some(cipher) => {
                let nonce = self.synthetic_nonce(name, &timestamp, &plaintext)?;
                cipher.seal(&nonce, &plaintext, name.as_bytes())?
            }
            None => plaintext,
        };
        let payload = general_purpose::URL_SAFE_NO_PAD.encode(payload_bytes);

        let tag = self.tag(name, &timestamp, &payload)?.finalize().into_bytes();
        let tag = general_purpose::URL_SAFE_NO_PAD.encode(tag);

        let encoded = format!("{timestamp}{SEGMENT_SEPARATOR}{payload}{SEGMENT_SEPARATOR}{tag}");
        self.check_length(encoded.len())?;
        Ok(encoded)
    }

    fn decode_at(&self, name: &str, value: &str, now: DateTime<Utc>) -> Result<Values> {
        self.check_length(value.len())?;

        let mut segments = value.split(SEGMENT_SEPARATOR);
        let (Some(timestamp), Some(payload), Some(tag), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(SessionError::Authentication);
        };

        let tag = general_purpose::URL_SAFE_NO_PAD
            .decode(tag)
            .map_err(|_| SessionError::Authentication)?;
        self.tag(name, timestamp, payload)?
            .verify_slice(&tag)
            .map_err(|_| SessionError::Authentication)?;

        // Authentic from here on; anything that still fails is not tampering.
        let issued_at: i64 = timestamp
            .parse()
            .map_err(|_| SessionError::Authentication)?;
        if self.max_age > 0 {
            let age = now.timestamp() - issued_at;
            if age > self.max_age {
                return Err(SessionError::Expired {
                    age,
                    max_age: self.max_age,
                });
            }
        }

        let payload_bytes = general_purpose::URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| SessionError::Authentication)?;
        let plaintext = match &self.cipher {
            Some(cipher) => cipher.open(&payload_bytes, name.as_bytes())?,
            None => payload_bytes,
        };

        serde_json::from_slice(&plaintext).map_err(|e| SessionError::Decoding(e.to_string()))
    }
}
