// AES-GCM block encryption for cookie payloads

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes128Gcm, Aes256Gcm, Nonce,
};

use super::key::{AES_128_KEY_SIZE, AES_256_KEY_SIZE};
use crate::error::{Result, SessionError};

/// Nonce size for AES-GCM encryption (96 bits)
pub const NONCE_SIZE: usize = 12;

/// AES-GCM cipher selected by block key length
#[derive(Clone)]
pub enum BlockCipher {
    Aes128(Box<Aes128Gcm>),
    Aes256(Box<Aes256Gcm>),
}

impl BlockCipher {
    /// Build a cipher from a 16 or 32 byte block key
    ///
    /// # Errors
    ///
    /// Returns `InvalidKey` for any other key length
    pub fn new(block_key: &[u8]) -> Result<Self> {
        let invalid = |_| {
            SessionError::InvalidKey(format!(
                "block key must be {AES_128_KEY_SIZE} or {AES_256_KEY_SIZE} bytes, got {}",
                block_key.len()
            ))
        };

        match block_key.len() {
            AES_128_KEY_SIZE => Aes128Gcm::new_from_slice(block_key)
                .map(|c| Self::Aes128(Box::new(c)))
                .map_err(invalid),
            AES_256_KEY_SIZE => Aes256Gcm::new_from_slice(block_key)
                .map(|c| Self::Aes256(Box::new(c)))
                .map_err(invalid),
            _ => Err(SessionError::InvalidKey(format!(
                "block key must be {AES_128_KEY_SIZE} or {AES_256_KEY_SIZE} bytes, got {}",
                block_key.len()
            ))),
        }
    }

    /// Encrypt `plaintext`, returning nonce + ciphertext
    ///
    /// `aad` is authenticated but not encrypted.
    ///
    /// # Errors
    ///
    /// Returns `Encoding` if AES encryption fails
    pub fn seal(&self, nonce: &[u8; NONCE_SIZE], plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        let payload = Payload {
            msg: plaintext,
            aad,
        };
        let nonce = Nonce::from_slice(nonce);

        let ciphertext = match self {
            Self::Aes128(cipher) => cipher.encrypt(nonce, payload),
            Self::Aes256(cipher) => cipher.encrypt(nonce, payload),
        }
        .map_err(|e| SessionError::Encoding(format!("AES encryption failed: {e}")))?;

        let mut combined = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        combined.extend_from_slice(nonce);
        combined.extend_from_slice(&ciphertext);
        Ok(combined)
    }

    /// Decrypt nonce + ciphertext produced by [`BlockCipher::seal`]
    ///
    /// # Errors
    ///
    /// Returns `Authentication` if the data is truncated or does not decrypt
    /// under this key
    pub fn open(&self, combined: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        if combined.len() < NONCE_SIZE {
            return Err(SessionError::Authentication);
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);
        let payload = Payload {
            msg: ciphertext,
            aad,
        };

        match self {
            Self::Aes128(cipher) => cipher.decrypt(nonce, payload),
            Self::Aes256(cipher) => cipher.decrypt(nonce, payload),
        }
        .map_err(|_| SessionError::Authentication)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONCE: [u8; NONCE_SIZE] = [3u8; NONCE_SIZE];

    #[test]
    fn test_key_length_selects_cipher() {
        assert!(matches!(BlockCipher::new(&[1u8; 16]), Ok(BlockCipher::Aes128(_))));
        assert!(matches!(BlockCipher::new(&[1u8; 32]), Ok(BlockCipher::Aes256(_))));
        assert!(matches!(
            BlockCipher::new(&[1u8; 24]),
            Err(SessionError::InvalidKey(_))
        ));
        assert!(matches!(BlockCipher::new(&[]), Err(SessionError::InvalidKey(_))));
    }

    #[test]
    fn test_seal_open() {
        let cipher = BlockCipher::new(&[9u8; 32]).unwrap();
        let sealed = cipher.seal(&NONCE, b"{\"uid\":42}", b"sess").unwrap();

        assert_eq!(&sealed[..NONCE_SIZE], &NONCE);
        assert_eq!(cipher.open(&sealed, b"sess").unwrap(), b"{\"uid\":42}");
    }

    #[test]
    fn test_open_rejects_wrong_aad_and_key() {
        let cipher = BlockCipher::new(&[9u8; 16]).unwrap();
        let sealed = cipher.seal(&NONCE, b"payload", b"sess").unwrap();

        assert!(matches!(
            cipher.open(&sealed, b"other"),
            Err(SessionError::Authentication)
        ));

        let other = BlockCipher::new(&[8u8; 16]).unwrap();
        assert!(matches!(
            other.open(&sealed, b"sess"),
            Err(SessionError::Authentication)
        ));
    }

    #[test]
    fn test_open_rejects_truncated_input() {
        let cipher = BlockCipher::new(&[9u8; 32]).unwrap();
        assert!(matches!(
            cipher.open(&[0u8; 4], b"sess"),
            Err(SessionError::Authentication)
        ));
    }
}
