use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Default session cookie lifetime: one week
pub const DEFAULT_MAX_AGE: i64 = 3600 * 24 * 7;

/// Default cookie path
pub const DEFAULT_PATH: &str = "/";

/// `SameSite` policy for session cookies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSitePolicy {
    Strict,
    Lax,
    None,
}

/// Session cookie properties
///
/// Copied for every cookie the store writes. `max_age` follows the
/// `Max-Age` attribute semantics:
///
/// - `0` means no `Max-Age` attribute is sent (browser session cookie)
/// - negative means delete the cookie now
/// - positive is the lifetime in seconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieAttributes {
    /// Cookie domain; empty means host-only
    pub domain: String,
    pub path: String,
    pub max_age: i64,
    /// Prohibit script access to the cookie
    pub http_only: bool,
    /// Only send the cookie over HTTPS
    pub secure: bool,
    pub same_site: Option<SameSitePolicy>,
}

impl Default for CookieAttributes {
    fn default() -> Self {
        Self {
            domain: String::new(),
            path: DEFAULT_PATH.to_string(),
            max_age: DEFAULT_MAX_AGE,
            http_only: true,
            secure: false, // Should be true in production deployments
            same_site: Some(SameSitePolicy::Lax),
        }
    }
}

impl CookieAttributes {
    /// Attributes that make a browser drop the cookie immediately
    ///
    /// Domain, path and flags are preserved so the browser matches the
    /// cookie it already holds.
    #[must_use]
    pub fn expired(&self) -> Self {
        Self {
            max_age: -1,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn is_deletion(&self) -> bool {
        self.max_age < 0
    }

    /// The `Expires` value implied by `max_age`, if any
    ///
    /// Positive max-age expires `max_age` seconds from `now`; negative
    /// max-age expires at the first second of the Unix epoch; zero sets no
    /// `Expires` attribute.
    #[must_use]
    pub fn expires_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self.max_age {
            0 => None,
            age if age > 0 => {
                Duration::try_seconds(age).and_then(|lifetime| now.checked_add_signed(lifetime))
            }
            _ => DateTime::from_timestamp(1, 0),
        }
    }
}
