//! Session store configuration
//!
//! Settings are read from TOML and can be overridden from the environment:
//!
//! ```toml
//! max_length = 4096
//!
//! [cookie]
//! domain = ""
//! path = "/"
//! max_age = 604800
//! http_only = true
//! secure = true
//! same_site = "lax"
//!
//! [[keys]]
//! hash_key = "base64 signing key"
//! block_key = "base64 encryption key"
//!
//! [[keys]]
//! hash_key = "base64 signing key being rotated out"
//! ```
//!
//! The first `[[keys]]` entry is the primary key pair.

use std::fs;
use std::path::Path;

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

use crate::codec::key::{AES_256_KEY_SIZE, HASH_KEY_SIZE};
use crate::codec::{generate_key, KeyPair, DEFAULT_MAX_LENGTH};
use crate::error::{Result, SessionError};
use crate::store::{CookieAttributes, CookieStore};

/// Environment variable replacing the primary hash key (base64)
pub const ENV_HASH_KEY: &str = "SESSION_HASH_KEY";
/// Environment variable replacing the primary block key (base64)
pub const ENV_BLOCK_KEY: &str = "SESSION_BLOCK_KEY";
/// Environment variable overriding the cookie `Secure` flag
pub const ENV_COOKIE_SECURE: &str = "SESSION_COOKIE_SECURE";
/// Environment variable overriding the cookie max-age in seconds
pub const ENV_MAX_AGE: &str = "SESSION_MAX_AGE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub cookie: CookieAttributes,
    /// Maximum encoded cookie value length in bytes; 0 disables the limit
    pub max_length: usize,
    /// Key pairs in priority order
    pub keys: Vec<KeySettings>,
}

/// One base64-encoded key pair
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySettings {
    pub hash_key: String,
    #[serde(default)]
    pub block_key: Option<String>,
}

impl std::fmt::Debug for KeySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeySettings")
            .field("hash_key", &"<redacted>")
            .field("block_key", &self.block_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            cookie: CookieAttributes::default(),
            max_length: DEFAULT_MAX_LENGTH,
            keys: Vec::new(),
        }
    }
}

impl KeySettings {
    /// Decode into a key pair
    ///
    /// # Errors
    ///
    /// Returns `Settings` if either key is not valid base64
    pub fn to_key_pair(&self) -> Result<KeyPair> {
        let hash_key = decode_key("hash_key", &self.hash_key)?;
        match self.block_key.as_deref().filter(|key| !key.is_empty()) {
            Some(block_key) => Ok(KeyPair::encrypting(hash_key, decode_key("block_key", block_key)?)),
            None => Ok(KeyPair::signing(hash_key)),
        }
    }
}

fn decode_key(field: &str, value: &str) -> Result<Vec<u8>> {
    general_purpose::STANDARD
        .decode(value.trim())
        .map_err(|e| SessionError::Settings(format!("{field} is not valid base64: {e}")))
}

impl SessionSettings {
    /// Parse settings from TOML text
    ///
    /// # Errors
    ///
    /// Returns `Settings` if the TOML cannot be parsed
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        basic_toml::from_str(toml)
            .map_err(|e| SessionError::Settings(format!("Failed to parse settings: {e}")))
    }

    /// Load settings from a TOML file and apply environment overrides
    ///
    /// # Errors
    ///
    /// Returns `Settings` if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let toml = fs::read_to_string(path).map_err(|e| {
            SessionError::Settings(format!("Failed to read {}: {e}", path.display()))
        })?;

        let mut settings = Self::from_toml_str(&toml)?;
        log::info!("Loaded session settings from {}", path.display());

        settings.apply_env_overrides()?;
        Ok(settings)
    }

    /// Apply environment variable overrides
    ///
    /// `SESSION_HASH_KEY` / `SESSION_BLOCK_KEY` replace the primary key pair,
    /// older pairs stay available for rotation.
    ///
    /// # Errors
    ///
    /// Returns `Settings` if a numeric or boolean override does not parse
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(hash_key) = env_value(ENV_HASH_KEY) {
            let primary = KeySettings {
                hash_key,
                block_key: env_value(ENV_BLOCK_KEY),
            };
            match self.keys.first_mut() {
                Some(existing) => *existing = primary,
                None => self.keys.push(primary),
            }
        }

        if let Some(secure) = env_value(ENV_COOKIE_SECURE) {
            self.cookie.secure = secure.parse().map_err(|_| {
                SessionError::Settings(format!("{ENV_COOKIE_SECURE} must be true or false"))
            })?;
        }

        if let Some(max_age) = env_value(ENV_MAX_AGE) {
            self.cookie.max_age = max_age.parse().map_err(|_| {
                SessionError::Settings(format!("{ENV_MAX_AGE} must be an integer"))
            })?;
        }

        Ok(())
    }

    /// Decode every configured key pair, primary first
    ///
    /// # Errors
    ///
    /// Returns `Settings` if a key is not valid base64
    pub fn key_pairs(&self) -> Result<Vec<KeyPair>> {
        self.keys.iter().map(KeySettings::to_key_pair).collect()
    }

    /// Build a store from these settings
    ///
    /// Without configured keys a random key pair is generated; cookies issued
    /// with it become unreadable once the process restarts.
    ///
    /// # Errors
    ///
    /// Returns `Settings` or `InvalidKey` if the key material is unusable
    pub fn build_store(&self) -> Result<CookieStore> {
        let mut key_pairs = self.key_pairs()?;
        if key_pairs.is_empty() {
            log::warn!(
                "No session keys configured; using a generated key pair. \
                 Set {ENV_HASH_KEY} and {ENV_BLOCK_KEY} to keep sessions across restarts"
            );
            key_pairs.push(KeyPair::encrypting(
                generate_key(HASH_KEY_SIZE),
                generate_key(AES_256_KEY_SIZE),
            ));
        }

        if !self.cookie.secure {
            log::warn!("Session cookies are not marked Secure; enable it for HTTPS deployments");
        }

        Ok(CookieStore::new(&key_pairs)?
            .with_attributes(self.cookie.clone())
            .with_max_length(self.max_length))
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::json;
    use serial_test::serial;

    use super::*;
    use crate::codec::Codec;
    use crate::store::SameSitePolicy;
    use crate::testing::constants::{TEST_BLOCK_KEY, TEST_HASH_KEY};

    fn b64(bytes: &[u8]) -> String {
        general_purpose::STANDARD.encode(bytes)
    }

    fn clear_env() {
        for name in [ENV_HASH_KEY, ENV_BLOCK_KEY, ENV_COOKIE_SECURE, ENV_MAX_AGE] {
            std::env::remove_var(name);
        }
    }

    #[test]
    fn test_defaults_when_empty() {
        let settings = SessionSettings::from_toml_str("").unwrap();

        assert_eq!(settings, SessionSettings::default());
        assert_eq!(settings.cookie.max_age, 604_800);
        assert_eq!(settings.max_length, 4096);
        assert!(settings.keys.is_empty());
    }

    #[test]
    fn test_parse_full_settings() {
        let toml = format!(
            r#"
max_length = 2048

[cookie]
domain = "example.com"
path = "/app"
max_age = 3600
http_only = false
secure = true
same_site = "strict"

[[keys]]
hash_key = "{}"
block_key = "{}"

[[keys]]
hash_key = "{}"
"#,
            b64(TEST_HASH_KEY),
            b64(TEST_BLOCK_KEY),
            b64(b"old-signing-key")
        );

        let settings = SessionSettings::from_toml_str(&toml).unwrap();

        assert_eq!(settings.max_length, 2048);
        assert_eq!(settings.cookie.domain, "example.com");
        assert_eq!(settings.cookie.path, "/app");
        assert_eq!(settings.cookie.max_age, 3600);
        assert!(!settings.cookie.http_only);
        assert!(settings.cookie.secure);
        assert_eq!(settings.cookie.same_site, Some(SameSitePolicy::Strict));

        let pairs = settings.key_pairs().unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].hash_key(), TEST_HASH_KEY);
        assert_eq!(pairs[0].block_key(), Some(TEST_BLOCK_KEY));
        assert_eq!(pairs[1].block_key(), None);
    }

    #[test]
    fn test_partial_cookie_section_keeps_defaults() {
        let settings = SessionSettings::from_toml_str("[cookie]\nsecure = true\n").unwrap();

        assert!(settings.cookie.secure);
        assert_eq!(settings.cookie.path, "/");
        assert!(settings.cookie.http_only);
    }

    #[test]
    fn test_invalid_toml_and_keys() {
        assert!(matches!(
            SessionSettings::from_toml_str("max_length = \"big\""),
            Err(SessionError::Settings(_))
        ));

        let settings = SessionSettings {
            keys: vec![KeySettings {
                hash_key: "not base64!".to_string(),
                block_key: None,
            }],
            ..Default::default()
        };
        assert!(matches!(settings.key_pairs(), Err(SessionError::Settings(_))));
        assert!(matches!(settings.build_store(), Err(SessionError::Settings(_))));
    }

    #[test]
    fn test_build_store_applies_settings() {
        let settings = SessionSettings {
            cookie: CookieAttributes {
                max_age: 120,
                secure: true,
                ..Default::default()
            },
            max_length: 1024,
            keys: vec![KeySettings {
                hash_key: b64(TEST_HASH_KEY),
                block_key: Some(b64(TEST_BLOCK_KEY)),
            }],
        };

        let store = settings.build_store().unwrap();

        assert_eq!(store.attributes().max_age, 120);
        assert!(store.attributes().secure);
        assert_eq!(store.codecs().primary().max_age(), 120);
        assert_eq!(store.codecs().primary().max_length(), 1024);
        assert!(store.codecs().primary().is_encrypting());
    }

    #[test]
    fn test_build_store_without_keys_generates_one() {
        let store = SessionSettings::default().build_store().unwrap();

        let mut values = crate::codec::Values::new();
        values.insert("uid".to_string(), json!(1));
        let encoded = store.codecs().encode("sess", &values).unwrap();
        assert_eq!(store.codecs().decode("sess", &encoded).unwrap(), values);
    }

    #[test]
    fn test_debug_redacts_keys() {
        let keys = KeySettings {
            hash_key: "c2VjcmV0".to_string(),
            block_key: Some("c2VjcmV0Mg==".to_string()),
        };
        let rendered = format!("{keys:?}");

        assert!(!rendered.contains("c2VjcmV0"));
        assert!(rendered.contains("redacted"));
    }

    #[test]
    #[serial]
    fn test_env_overrides_replace_primary_key() {
        clear_env();
        std::env::set_var(ENV_HASH_KEY, b64(b"env-hash-key"));
        std::env::set_var(ENV_COOKIE_SECURE, "true");
        std::env::set_var(ENV_MAX_AGE, "900");

        let mut settings = SessionSettings {
            keys: vec![
                KeySettings {
                    hash_key: b64(TEST_HASH_KEY),
                    block_key: Some(b64(TEST_BLOCK_KEY)),
                },
                KeySettings {
                    hash_key: b64(b"old"),
                    block_key: None,
                },
            ],
            ..Default::default()
        };
        settings.apply_env_overrides().unwrap();
        clear_env();

        let pairs = settings.key_pairs().unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].hash_key(), b"env-hash-key");
        assert_eq!(pairs[0].block_key(), None);
        assert_eq!(pairs[1].hash_key(), b"old");
        assert!(settings.cookie.secure);
        assert_eq!(settings.cookie.max_age, 900);
    }

    #[test]
    #[serial]
    fn test_env_override_rejects_bad_values() {
        clear_env();
        std::env::set_var(ENV_COOKIE_SECURE, "sometimes");

        let mut settings = SessionSettings::default();
        let result = settings.apply_env_overrides();
        clear_env();

        assert!(matches!(result, Err(SessionError::Settings(_))));
    }

    #[test]
    #[serial]
    fn test_load_from_file() {
        clear_env();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[cookie]\nmax_age = 60\n\n[[keys]]\nhash_key = \"{}\"",
            b64(TEST_HASH_KEY)
        )
        .unwrap();

        let settings = SessionSettings::load(file.path()).unwrap();

        assert_eq!(settings.cookie.max_age, 60);
        assert_eq!(settings.keys.len(), 1);
        assert!(matches!(
            SessionSettings::load(file.path().with_extension("missing")),
            Err(SessionError::Settings(_))
        ));
    }
}
