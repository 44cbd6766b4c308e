//! Test fixtures providing pre-built test objects
//!
//! Commonly used keys, stores and values, so tests don't rebuild them by hand.

use actix_web::cookie::Cookie;
use actix_web::{test, HttpRequest};
use serde_json::json;

use crate::codec::{KeyPair, Values};
use crate::store::{CookieAttributes, CookieStore, SameSitePolicy};

use super::constants::{
    TEST_BLOCK_KEY, TEST_DOMAIN, TEST_HASH_KEY, TEST_OLD_BLOCK_KEY, TEST_OLD_HASH_KEY,
};

/// Central fixture provider for all test data
pub struct TestFixtures;

impl TestFixtures {
    /// Key pair that signs only
    #[must_use]
    pub fn signing_keys() -> KeyPair {
        KeyPair::signing(TEST_HASH_KEY)
    }

    /// Key pair that signs and encrypts (AES-256)
    #[must_use]
    pub fn encrypting_keys() -> KeyPair {
        KeyPair::encrypting(TEST_HASH_KEY, TEST_BLOCK_KEY)
    }

    /// Key pair standing in for a retired key (AES-128)
    #[must_use]
    pub fn old_keys() -> KeyPair {
        KeyPair::encrypting(TEST_OLD_HASH_KEY, TEST_OLD_BLOCK_KEY)
    }

    /// Store with encrypting keys and default attributes
    ///
    /// # Panics
    ///
    /// Panics if the fixture keys are rejected, which would be a fixture bug.
    #[must_use]
    pub fn store() -> CookieStore {
        CookieStore::new([&Self::encrypting_keys()]).expect("fixture keys are valid")
    }

    /// Store that only signs values
    ///
    /// # Panics
    ///
    /// Panics if the fixture keys are rejected.
    #[must_use]
    pub fn signing_store() -> CookieStore {
        CookieStore::new([&Self::signing_keys()]).expect("fixture keys are valid")
    }

    /// Store still accepting cookies issued under [`TestFixtures::old_keys`]
    ///
    /// # Panics
    ///
    /// Panics if the fixture keys are rejected.
    #[must_use]
    pub fn rotated_store() -> CookieStore {
        CookieStore::new([&Self::encrypting_keys(), &Self::old_keys()])
            .expect("fixture keys are valid")
    }

    /// Store that only knows the retired key
    ///
    /// # Panics
    ///
    /// Panics if the fixture keys are rejected.
    #[must_use]
    pub fn legacy_store() -> CookieStore {
        CookieStore::new([&Self::old_keys()]).expect("fixture keys are valid")
    }

    /// Attributes of a production-like deployment
    #[must_use]
    pub fn production_attributes() -> CookieAttributes {
        CookieAttributes {
            domain: TEST_DOMAIN.to_string(),
            path: "/app".to_string(),
            max_age: 3600,
            http_only: true,
            secure: true,
            same_site: Some(SameSitePolicy::Strict),
        }
    }

    /// Nested session values covering every JSON shape
    #[must_use]
    pub fn nested_values() -> Values {
        let mut values = Values::new();
        values.insert("uid".to_string(), json!(42));
        values.insert("name".to_string(), json!("Test User"));
        values.insert("admin".to_string(), json!(false));
        values.insert("score".to_string(), json!(98.5));
        values.insert("last_seen".to_string(), json!(null));
        values.insert(
            "prefs".to_string(),
            json!({"theme": "dark", "langs": ["en-US", "fr"], "limits": {"daily": 10}}),
        );
        values
    }

    /// Actix request carrying one cookie
    #[must_use]
    pub fn request_with_cookie(name: &str, value: &str) -> HttpRequest {
        test::TestRequest::default()
            .cookie(Cookie::new(name.to_owned(), value.to_owned()))
            .to_http_request()
    }

    /// Actix request without cookies
    #[must_use]
    pub fn empty_request() -> HttpRequest {
        test::TestRequest::default().to_http_request()
    }
}
