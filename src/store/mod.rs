//! Cookie Session Store
//!
//! [`CookieStore`] holds the codec set and the default cookie attributes. It
//! is immutable once built and can be shared by every request handler.
//!
//! Per request, the store is bound to a [`CookieTransport`] with
//! [`CookieStore::bind`]; the resulting [`RequestStore`] implements
//! [`SessionStore`]:
//!
//! ```text
//! absent --new/get miss--> transient --save--> persisted
//!    ^                         ^                   |
//!    |                         +-----get-----------+
//!    +-----------------destroy---------------------+
//! ```
//!
//! Every save overwrites the whole cookie; there is no separate update.

pub mod attributes;

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::codec::{Codec, CodecSet, KeyPair};
use crate::error::{Result, SessionError};
use crate::session::Session;
use crate::transport::CookieTransport;

pub use attributes::{CookieAttributes, SameSitePolicy, DEFAULT_MAX_AGE, DEFAULT_PATH};

/// Source of the current time used for expiry checks
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Create, read, save and destroy named sessions
pub trait SessionStore {
    /// A new, empty session; never touches the transport
    fn new_session(&self, name: &str) -> Session<'_>;

    /// Load the named session from the request
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when no cookie is present, a codec error when the
    /// cookie is rejected, or `Transport` when reading fails
    fn get(&self, name: &str) -> Result<Session<'_>>;

    /// Encode the session and write it as a cookie
    ///
    /// # Errors
    ///
    /// Returns a codec error (nothing is written) or `Transport`
    fn save(&self, session: &Session<'_>) -> Result<()>;

    /// Issue an expired cookie for `name`
    ///
    /// # Errors
    ///
    /// Returns `Transport` when writing fails
    fn destroy(&self, name: &str) -> Result<()>;

    /// Load the named session, or start a new one if there is no cookie
    ///
    /// # Errors
    ///
    /// Any error from [`SessionStore::get`] other than `NotFound`
    fn get_or_new(&self, name: &str) -> Result<Session<'_>> {
        match self.get(name) {
            Err(SessionError::NotFound) => Ok(self.new_session(name)),
            result => result,
        }
    }
}

/// Stores sessions in signed, optionally encrypted cookies
#[derive(Clone)]
pub struct CookieStore {
    codecs: Arc<CodecSet>,
    attributes: CookieAttributes,
    clock: Clock,
}

impl CookieStore {
    /// Create a store from key pairs, first pair being the primary
    ///
    /// Uses the default cookie attributes (path `/`, one week max-age,
    /// http-only) and enforces the same max-age when decoding.
    ///
    /// # Errors
    ///
    /// Returns `InvalidKey` if no key pair is given or any pair is unusable
    pub fn new<'a>(key_pairs: impl IntoIterator<Item = &'a KeyPair>) -> Result<Self> {
        Ok(Self::from_codecs(CodecSet::from_key_pairs(key_pairs)?))
    }

    /// Create a store around an existing codec set
    ///
    /// The codec expiry policy is set to the default max-age.
    #[must_use]
    pub fn from_codecs(codecs: CodecSet) -> Self {
        let store = Self {
            codecs: Arc::new(codecs),
            attributes: CookieAttributes::default(),
            clock: Arc::new(Utc::now),
        };
        store.with_max_age(DEFAULT_MAX_AGE)
    }

    /// Replace the cookie attributes, keeping the codec expiry in step
    #[must_use]
    pub fn with_attributes(mut self, attributes: CookieAttributes) -> Self {
        let max_age = attributes.max_age;
        self.attributes = attributes;
        self.with_max_age(max_age)
    }

    /// Set the cookie `Max-Age` and the matching server-side expiry
    ///
    /// Non-positive values send no lifetime (or delete) and disable the
    /// server-side expiry check.
    #[must_use]
    pub fn with_max_age(mut self, seconds: i64) -> Self {
        self.attributes.max_age = seconds;
        Arc::make_mut(&mut self.codecs).set_max_age(seconds);
        self
    }

    /// Limit the encoded cookie value length; 0 disables the limit
    #[must_use]
    pub fn with_max_length(mut self, bytes: usize) -> Self {
        Arc::make_mut(&mut self.codecs).set_max_length(bytes);
        self
    }

    /// Use `clock` instead of the system time for expiry checks
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn attributes(&self) -> &CookieAttributes {
        &self.attributes
    }

    #[must_use]
    pub fn codecs(&self) -> &CodecSet {
        &self.codecs
    }

    /// Bind the store to one request's cookie transport
    ///
    /// Sessions borrow the returned [`RequestStore`], so keep it in a local
    /// for as long as they are used.
    pub fn bind<'a, T: CookieTransport + ?Sized>(&'a self, transport: &'a T) -> RequestStore<'a, T> {
        RequestStore {
            store: self,
            transport,
        }
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }
}

impl std::fmt::Debug for CookieStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieStore")
            .field("codecs", &self.codecs.len())
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}

/// A [`CookieStore`] bound to one request's transport
pub struct RequestStore<'a, T: CookieTransport + ?Sized> {
    store: &'a CookieStore,
    transport: &'a T,
}

impl<T: CookieTransport + ?Sized> RequestStore<'_, T> {
    #[must_use]
    pub fn transport(&self) -> &T {
        self.transport
    }
}

impl<T: CookieTransport + ?Sized> SessionStore for RequestStore<'_, T> {
    fn new_session(&self, name: &str) -> Session<'_> {
        Session::new(name, self)
    }

    fn get(&self, name: &str) -> Result<Session<'_>> {
        let raw = self.transport.read_cookie(name)?;

        let values = self
            .store
            .codecs
            .decode_at(name, &raw, self.store.now())
            .inspect_err(|e| {
                if e.is_rejected_cookie() {
                    log::warn!("Rejected session cookie '{name}': {e}");
                }
            })?;

        log::debug!("Loaded session '{name}' with {} value(s)", values.len());
        Ok(Session::with_values(name, values, self))
    }

    fn save(&self, session: &Session<'_>) -> Result<()> {
        let encoded = self
            .store
            .codecs
            .encode_at(session.name(), session.values(), self.store.now())?;

        self.transport
            .write_cookie(session.name(), &encoded, &self.store.attributes)?;

        log::debug!(
            "Saved session '{}': encoded_len={}",
            session.name(),
            encoded.len()
        );
        Ok(())
    }

    fn destroy(&self, name: &str) -> Result<()> {
        self.transport
            .write_cookie(name, "", &self.store.attributes.expired())?;

        log::debug!("Destroyed session '{name}'");
        Ok(())
    }
}
