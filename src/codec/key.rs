// Key material for secure cookie codecs

use rand::RngCore;

/// Recommended hash key size for HMAC-SHA256 (256 bits)
pub const HASH_KEY_SIZE: usize = 32;

/// Block key size selecting AES-128-GCM
pub const AES_128_KEY_SIZE: usize = 16;

/// Block key size selecting AES-256-GCM
pub const AES_256_KEY_SIZE: usize = 32;

/// A signing key with an optional encryption key
///
/// The hash key authenticates cookie values. When a block key is present the
/// values are also encrypted, so the cookie no longer carries them in the
/// clear.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    hash_key: Vec<u8>,
    block_key: Option<Vec<u8>>,
}

impl KeyPair {
    /// Key pair that only signs values
    #[must_use]
    pub fn signing(hash_key: impl Into<Vec<u8>>) -> Self {
        Self {
            hash_key: hash_key.into(),
            block_key: None,
        }
    }

    /// Key pair that signs and encrypts values
    #[must_use]
    pub fn encrypting(hash_key: impl Into<Vec<u8>>, block_key: impl Into<Vec<u8>>) -> Self {
        Self {
            hash_key: hash_key.into(),
            block_key: Some(block_key.into()),
        }
    }

    /// Generate a fresh random key pair, encrypting when `encrypt` is set
    #[must_use]
    pub fn generate(encrypt: bool) -> Self {
        let hash_key = generate_key(HASH_KEY_SIZE);
        if encrypt {
            Self::encrypting(hash_key, generate_key(AES_256_KEY_SIZE))
        } else {
            Self::signing(hash_key)
        }
    }

    #[must_use]
    pub fn hash_key(&self) -> &[u8] {
        &self.hash_key
    }

    #[must_use]
    pub fn block_key(&self) -> Option<&[u8]> {
        self.block_key.as_deref()
    }
}

// Keys never show up in logs or panic messages.
impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("hash_key_len", &self.hash_key.len())
            .field("block_key_len", &self.block_key.as_ref().map(Vec::len))
            .finish()
    }
}

/// Generate `length` bytes of cryptographically secure random key material
#[must_use]
pub fn generate_key(length: usize) -> Vec<u8> {
    let mut key = vec![0u8; length];
    rand::rng().fill_bytes(&mut key);
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_key_length_and_randomness() {
        let a = generate_key(32);
        let b = generate_key(32);

        assert_eq!(a.len(), 32);
        assert_ne!(a, b, "two generated keys should differ");
        assert!(generate_key(0).is_empty());
    }

    #[test]
    fn test_generated_key_pair_shape() {
        let signing = KeyPair::generate(false);
        assert_eq!(signing.hash_key().len(), HASH_KEY_SIZE);
        assert!(signing.block_key().is_none());

        let encrypting = KeyPair::generate(true);
        assert_eq!(encrypting.block_key().map(<[u8]>::len), Some(AES_256_KEY_SIZE));
    }

    #[test]
    fn test_debug_hides_key_material() {
        let pair = KeyPair::encrypting(b"super-secret-hash".to_vec(), vec![7u8; 16]);
        let rendered = format!("{pair:?}");

        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("hash_key_len: 17"));
        assert!(rendered.contains("Some(16)"));
    }
}
