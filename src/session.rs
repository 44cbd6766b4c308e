//! Session entity
//!
//! A [`Session`] is a named bag of values bound to the store that issued it.
//! It lives for one request: the caller mutates it freely and then calls
//! [`Session::save`] or [`Session::destroy`], both of which are plain
//! delegation to the owning store.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::codec::Values;
use crate::error::{Result, SessionError};
use crate::store::SessionStore;

/// A named set of session values
#[derive(Clone)]
pub struct Session<'s> {
    name: String,
    values: Values,
    store: &'s dyn SessionStore,
}

impl<'s> Session<'s> {
    /// Create an empty session bound to `store`
    #[must_use]
    pub fn new(name: &str, store: &'s dyn SessionStore) -> Self {
        Self::with_values(name, Values::new(), store)
    }

    /// Create a session holding already decoded `values`
    #[must_use]
    pub fn with_values(name: &str, values: Values, store: &'s dyn SessionStore) -> Self {
        Self {
            name: name.to_string(),
            values,
            store,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn values(&self) -> &Values {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut Values {
        &mut self.values
    }

    #[must_use]
    pub fn into_values(self) -> Values {
        self.values
    }

    /// Get a value deserialized as `T`
    ///
    /// # Errors
    ///
    /// Returns `Decoding` if the stored value does not have the shape of `T`
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.values
            .get(key)
            .map(|value| {
                T::deserialize(value).map_err(|e| {
                    SessionError::Decoding(format!("Session value '{key}' has unexpected shape: {e}"))
                })
            })
            .transpose()
    }

    /// Insert a serializable value, returning the previous one
    ///
    /// # Errors
    ///
    /// Returns `Encoding` if `value` cannot be represented as JSON
    pub fn insert<T: Serialize>(&mut self, key: impl Into<String>, value: T) -> Result<Option<Value>> {
        let value = serde_json::to_value(value)
            .map_err(|e| SessionError::Encoding(format!("Failed to serialize session value: {e}")))?;
        Ok(self.values.insert(key.into(), value))
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Persist the session through the owning store
    ///
    /// # Errors
    ///
    /// Returns whatever the store's `save` returns
    pub fn save(&self) -> Result<()> {
        self.store.save(self)
    }

    /// Delete the session cookie through the owning store
    ///
    /// # Errors
    ///
    /// Returns whatever the store's `destroy` returns
    pub fn destroy(&self) -> Result<()> {
        self.store.destroy(&self.name)
    }
}

impl std::fmt::Debug for Session<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("name", &self.name)
            .field("values", &self.values)
            .finish_non_exhaustive()
    }
}
