//! Testing utilities for code built on crumbs
//!
//! Available to this crate's unit tests and, with the `testing` feature, to
//! integration tests and downstream crates.
//!
//! ## Organization
//!
//! - [`fixtures`] - Pre-built keys, stores, values and requests
//! - [`clock`] - Manually advanced clock for expiry tests
//!
//! ## Usage
//!
//! ```rust,ignore
//! use crumbs::testing::{ManualClock, MemoryTransport, TestFixtures};
//! use crumbs::SessionStore;
//!
//! let clock = ManualClock::starting_at(1_700_000_000);
//! let store = TestFixtures::store().with_clock(clock.clock());
//! let browser = MemoryTransport::with_clock(clock.clock());
//!
//! let sessions = store.bind(&browser);
//! let mut session = sessions.get_or_new("sess").unwrap();
//! session.insert("uid", 42).unwrap();
//! session.save().unwrap();
//!
//! clock.advance(60);
//! assert!(sessions.get("sess").is_ok());
//! ```

pub mod clock;
pub mod fixtures;

pub use crate::transport::memory::{MemoryTransport, StoredCookie, WrittenCookie};
pub use clock::ManualClock;
pub use fixtures::TestFixtures;

/// Common test constants
pub mod constants {
    /// Default test session cookie name
    pub const TEST_SESSION_NAME: &str = "sess";

    /// Test HMAC signing key (256 bits)
    pub const TEST_HASH_KEY: &[u8] = b"test_key_32_bytes_long_for_test_";

    /// Test AES-256 block key
    pub const TEST_BLOCK_KEY: &[u8] = b"block_key_32_bytes_long_for_aes!";

    /// Signing key standing in for a key that has been rotated out
    pub const TEST_OLD_HASH_KEY: &[u8] = b"old_key_32_bytes_long_for_tests_";

    /// Block key paired with [`TEST_OLD_HASH_KEY`]
    pub const TEST_OLD_BLOCK_KEY: &[u8] = b"old_block_key_16";

    /// Fixed start time for clock-driven tests
    pub const TEST_EPOCH: i64 = 1_700_000_000;

    /// Test cookie domain
    pub const TEST_DOMAIN: &str = "example.com";
}
