#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![deny(warnings)]
#![allow(clippy::multiple_crate_versions)]

//! Signed, optionally encrypted, client-side sessions stored in HTTP cookies.
//!
//! Session values are serialized, authenticated with HMAC-SHA256, optionally
//! encrypted with AES-GCM, and carried entirely in a cookie value. A
//! [`CookieStore`] holds the keys and cookie attributes; each request binds it
//! to a [`CookieTransport`] that reads and writes the raw cookie for the HTTP
//! framework in use.
//!
//! ```rust,ignore
//! let store = CookieStore::new([&KeyPair::generate(true)])?;
//!
//! // per request
//! let transport = ActixTransport::new(&req);
//! let sessions = store.bind(&transport);
//! let mut session = sessions.get_or_new("sess")?;
//! session.insert("uid", 42)?;
//! session.save()?;
//! ```

/// Version of the crumbs library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod codec;
pub mod error;
pub mod session;
pub mod settings;
pub mod store;
pub mod transport;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Re-export commonly used items
pub use codec::{Codec, CodecSet, KeyPair, SecureCookie, Values};
pub use error::{Result, SessionError};
pub use session::Session;
pub use settings::SessionSettings;
pub use store::{Clock, CookieAttributes, CookieStore, RequestStore, SameSitePolicy, SessionStore};
pub use transport::{ActixTransport, CookieTransport, TransportError};
