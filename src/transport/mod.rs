//! Cookie Transport Boundary
//!
//! The store never touches an HTTP framework directly. Each framework
//! integration implements [`CookieTransport`] once for its per-request
//! handle (request/response pair, context object, ...), and hands that
//! handle to [`crate::CookieStore::bind`].
//!
//! # Modules
//!
//! - [`actix`] - `actix-web` integration
//! - [`memory`] - In-memory cookie jar for tests (feature `testing`)

pub mod actix;
#[cfg(any(test, feature = "testing"))]
pub mod memory;

use thiserror::Error;

use crate::error::SessionError;
use crate::store::CookieAttributes;

pub use actix::ActixTransport;
#[cfg(any(test, feature = "testing"))]
pub use memory::MemoryTransport;

/// Failure reported by a transport
///
/// Transports must map their framework's "cookie absent" condition to
/// [`TransportError::NotFound`]; everything else is passed through.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("cookie not found")]
    NotFound,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<TransportError> for SessionError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::NotFound => Self::NotFound,
            TransportError::Other(source) => Self::Transport(source),
        }
    }
}

/// Raw cookie access for one request
pub trait CookieTransport {
    /// Read the raw value of the cookie `name`
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::NotFound`] when the request carries no such
    /// cookie
    fn read_cookie(&self, name: &str) -> Result<String, TransportError>;

    /// Emit the cookie `name` with `value` and `attributes`
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Other`] if the cookie cannot be written
    fn write_cookie(
        &self,
        name: &str,
        value: &str,
        attributes: &CookieAttributes,
    ) -> Result<(), TransportError>;
}
