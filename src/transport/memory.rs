//! In-memory cookie jar
//!
//! Behaves like a browser holding cookies for one site: written cookies are
//! sent back on later reads until they expire or are deleted. The clock is
//! injectable so expiry can be tested without waiting.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::{CookieTransport, TransportError};
use crate::store::{Clock, CookieAttributes};

/// A cookie as the jar stores it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCookie {
    pub value: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// A write observed by the jar, kept for assertions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenCookie {
    pub name: String,
    pub value: String,
    pub attributes: CookieAttributes,
}

/// Cookie transport backed by an in-memory jar
pub struct MemoryTransport {
    jar: RefCell<HashMap<String, StoredCookie>>,
    writes: RefCell<Vec<WrittenCookie>>,
    clock: Clock,
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTransport {
    /// Empty jar using the system clock
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(Utc::now))
    }

    /// Empty jar using `clock` to decide expiry
    #[must_use]
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            jar: RefCell::new(HashMap::new()),
            writes: RefCell::new(Vec::new()),
            clock,
        }
    }

    /// Place a raw cookie in the jar, as if the client had sent it
    pub fn insert_raw(&self, name: &str, value: &str) {
        self.jar.borrow_mut().insert(
            name.to_string(),
            StoredCookie {
                value: value.to_string(),
                expires_at: None,
            },
        );
    }

    /// Raw value currently held for `name`, ignoring expiry
    #[must_use]
    pub fn raw_value(&self, name: &str) -> Option<String> {
        self.jar.borrow().get(name).map(|cookie| cookie.value.clone())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.read_cookie(name).is_ok()
    }

    /// Every write seen so far, oldest first
    #[must_use]
    pub fn writes(&self) -> Vec<WrittenCookie> {
        self.writes.borrow().clone()
    }

    #[must_use]
    pub fn last_write(&self) -> Option<WrittenCookie> {
        self.writes.borrow().last().cloned()
    }
}

impl CookieTransport for MemoryTransport {
    fn read_cookie(&self, name: &str) -> Result<String, TransportError> {
        let now = (self.clock)();
        let mut jar = self.jar.borrow_mut();

        let cookie = jar.get(name).cloned().ok_or(TransportError::NotFound)?;
        if cookie.expires_at.is_some_and(|expires| expires <= now) {
            jar.remove(name);
            return Err(TransportError::NotFound);
        }
        Ok(cookie.value)
    }

    fn write_cookie(
        &self,
        name: &str,
        value: &str,
        attributes: &CookieAttributes,
    ) -> Result<(), TransportError> {
        self.writes.borrow_mut().push(WrittenCookie {
            name: name.to_string(),
            value: value.to_string(),
            attributes: attributes.clone(),
        });

        let mut jar = self.jar.borrow_mut();
        if attributes.is_deletion() {
            jar.remove(name);
        } else {
            jar.insert(
                name.to_string(),
                StoredCookie {
                    value: value.to_string(),
                    expires_at: attributes.expires_at((self.clock)()),
                },
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ManualClock;

    #[test]
    fn test_write_then_read() {
        let transport = MemoryTransport::new();
        transport
            .write_cookie("sess", "value", &CookieAttributes::default())
            .unwrap();

        assert_eq!(transport.read_cookie("sess").unwrap(), "value");
        assert_eq!(transport.writes().len(), 1);
    }

    #[test]
    fn test_deletion_removes_cookie() {
        let transport = MemoryTransport::new();
        transport.insert_raw("sess", "value");

        transport
            .write_cookie("sess", "", &CookieAttributes::default().expired())
            .unwrap();

        assert!(matches!(
            transport.read_cookie("sess"),
            Err(TransportError::NotFound)
        ));
        assert_eq!(transport.last_write().unwrap().value, "");
    }

    #[test]
    fn test_max_age_elapses() {
        let clock = ManualClock::starting_at(1_000);
        let transport = MemoryTransport::with_clock(clock.clock());
        let attributes = CookieAttributes {
            max_age: 60,
            ..Default::default()
        };

        transport.write_cookie("sess", "value", &attributes).unwrap();

        clock.set(1_059);
        assert!(transport.contains("sess"));

        clock.set(1_060);
        assert!(!transport.contains("sess"));
        assert_eq!(transport.raw_value("sess"), None);
    }

    #[test]
    fn test_browser_session_cookie_never_expires() {
        let clock = ManualClock::starting_at(0);
        let transport = MemoryTransport::with_clock(clock.clock());
        let attributes = CookieAttributes {
            max_age: 0,
            ..Default::default()
        };

        transport.write_cookie("sess", "value", &attributes).unwrap();
        clock.set(i64::from(i32::MAX));

        assert!(transport.contains("sess"));
    }
}
