//! Error types shared by the codec, the store and the transports.

use thiserror::Error;

/// Convenience alias used throughout the crate
pub type Result<T, E = SessionError> = std::result::Result<T, E>;

/// Errors returned by session operations
///
/// The core never recovers from any of these on its own. Callers decide
/// whether a failed `get` means "issue a fresh session", "reject the request"
/// or just a log line.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No cookie was present for the requested session name
    #[error("Session cookie not found")]
    NotFound,

    /// The value did not verify under any configured key
    #[error("Session cookie failed authentication")]
    Authentication,

    /// The value is authentic but older than the configured maximum age
    #[error("Session cookie expired: age {age}s exceeds max age {max_age}s")]
    Expired { age: i64, max_age: i64 },

    /// The value is authentic but does not hold a session values mapping
    #[error("Failed to decode session values: {0}")]
    Decoding(String),

    /// Session values could not be serialized or encrypted
    #[error("Failed to encode session values: {0}")]
    Encoding(String),

    /// The encoded value is longer than the codec accepts
    #[error("Encoded session value too long: {length} bytes (max {max})")]
    ValueTooLong { length: usize, max: usize },

    /// Key material cannot be used by a codec
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// The transport failed for a reason other than a missing cookie
    #[error("Cookie transport error: {0}")]
    Transport(#[source] anyhow::Error),

    /// Session settings could not be read or parsed
    #[error("Invalid session settings: {0}")]
    Settings(String),
}

impl SessionError {
    /// True when the error means "there is no session yet"
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// True for errors that only a rejected or stale cookie produces
    ///
    /// These are the cases where a caller typically starts a fresh session
    /// but may still want to audit the request.
    #[must_use]
    pub fn is_rejected_cookie(&self) -> bool {
        matches!(
            self,
            Self::Authentication
                | Self::Expired { .. }
                | Self::Decoding(_)
                | Self::ValueTooLong { .. }
        )
    }
}
