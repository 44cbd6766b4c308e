//! Authenticated Cookie Codecs
//!
//! This module turns a session name plus its values into an opaque,
//! tamper-evident cookie value and back.
//!
//! # Modules
//!
//! - [`secure_cookie`] - HMAC-SHA256 signed, optionally AES-GCM encrypted codec
//! - [`cipher`] - AES-GCM block encryption used by the codec
//! - [`key`] - Key pairs and key generation
//!
//! # Key rotation
//!
//! A [`CodecSet`] holds codecs in priority order. New values are always
//! encoded with the first one; decoding tries each in turn so cookies issued
//! under an older key stay valid while a new primary key is rolled out.

pub mod cipher;
pub mod key;
pub mod secure_cookie;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::{Result, SessionError};

pub use key::{generate_key, KeyPair};
pub use secure_cookie::{SecureCookie, DEFAULT_MAX_LENGTH};

/// Session values: string keys mapped to arbitrary nested JSON values
///
/// A `BTreeMap` keeps key order stable so encoding is deterministic.
pub type Values = BTreeMap<String, serde_json::Value>;

/// Converts session values to and from cookie values
pub trait Codec: Send + Sync {
    /// Encode `values` for the cookie `name` as of `now`
    ///
    /// # Errors
    ///
    /// Returns `Encoding` or `ValueTooLong` if the value cannot be produced
    fn encode_at(&self, name: &str, values: &Values, now: DateTime<Utc>) -> Result<String>;

    /// Decode a cookie value previously encoded for `name`, as of `now`
    ///
    /// # Errors
    ///
    /// Returns `Authentication`, `Expired`, `Decoding` or `ValueTooLong`
    fn decode_at(&self, name: &str, value: &str, now: DateTime<Utc>) -> Result<Values>;

    /// Encode using the current time
    ///
    /// # Errors
    ///
    /// See [`Codec::encode_at`]
    fn encode(&self, name: &str, values: &Values) -> Result<String> {
        self.encode_at(name, values, Utc::now())
    }

    /// Decode using the current time
    ///
    /// # Errors
    ///
    /// See [`Codec::decode_at`]
    fn decode(&self, name: &str, value: &str) -> Result<Values> {
        self.decode_at(name, value, Utc::now())
    }
}

/// Ordered, non-empty set of codecs supporting key rotation
#[derive(Clone)]
pub struct CodecSet {
    codecs: Vec<SecureCookie>,
}

impl CodecSet {
    /// Build a codec set from codecs in priority order
    ///
    /// # Errors
    ///
    /// Returns `InvalidKey` if `codecs` is empty
    pub fn new(codecs: Vec<SecureCookie>) -> Result<Self> {
        if codecs.is_empty() {
            return Err(SessionError::InvalidKey(
                "at least one key pair is required".to_string(),
            ));
        }
        Ok(Self { codecs })
    }

    /// Build one codec per key pair, first pair being the primary
    ///
    /// # Errors
    ///
    /// Returns `InvalidKey` if no pairs are given or any pair is unusable
    pub fn from_key_pairs<'a>(pairs: impl IntoIterator<Item = &'a KeyPair>) -> Result<Self> {
        let codecs = pairs
            .into_iter()
            .map(SecureCookie::new)
            .collect::<Result<Vec<_>>>()?;
        Self::new(codecs)
    }

    /// Apply one expiry policy to every codec; 0 disables it
    pub fn set_max_age(&mut self, seconds: i64) {
        for codec in &mut self.codecs {
            codec.set_max_age(seconds);
        }
    }

    /// Apply one length limit to every codec; 0 disables it
    pub fn set_max_length(&mut self, bytes: usize) {
        for codec in &mut self.codecs {
            codec.set_max_length(bytes);
        }
    }

    #[must_use]
    pub fn primary(&self) -> &SecureCookie {
        // Non-empty by construction
        &self.codecs[0]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }
}

impl Codec for CodecSet {
    fn encode_at(&self, name: &str, values: &Values, now: DateTime<Utc>) -> Result<String> {
        self.primary().encode_at(name, values, now)
    }

    fn decode_at(&self, name: &str, value: &str, now: DateTime<Utc>) -> Result<Values> {
        let mut last_error = SessionError::Authentication;

        for (index, codec) in self.codecs.iter().enumerate() {
            match codec.decode_at(name, value, now) {
                Ok(values) => {
                    if index > 0 {
                        log::debug!("Cookie '{name}' decoded with rotated key #{index}");
                    }
                    return Ok(values);
                }
                // Authentic under this key: the answer is final
                Err(err @ (SessionError::Expired { .. } | SessionError::Decoding(_))) => {
                    return Err(err);
                }
                Err(err) => last_error = err,
            }
        }

        Err(last_error)
    }
}
