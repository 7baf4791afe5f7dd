//! Session access for controllers and the authorization check.
//!
//! The framework does not store sessions itself: the host provides a
//! [`SessionStore`] for each request, and [`Session`] is a cheap handle on
//! top of it. [`MemoryStore`] is an in-process store suitable for tests and
//! single-process hosts.
//!
//! # Examples
//!
//! ```
//! use winter::session::Session;
//!
//! let session = Session::in_memory();
//! session.add("user_name", "world")?;
//! let name: Option<String> = session.get("user_name")?;
//! assert_eq!(name.as_deref(), Some("world"));
//! # Ok::<(), winter::Error>(())
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use derive_more::with_trait::Debug;
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::Result;

/// A backing store for session attributes.
pub trait SessionStore: Send + Sync {
    /// Returns the attribute stored under `key`.
    fn get(&self, key: &str) -> Option<Value>;

    /// Stores `value` under `key`, replacing any previous value.
    fn insert(&self, key: &str, value: Value);

    /// Removes the attribute stored under `key`, returning it.
    fn remove(&self, key: &str) -> Option<Value>;
}

/// A session store that keeps attributes in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    attributes: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.attributes.lock().get(key).cloned()
    }

    fn insert(&self, key: &str, value: Value) {
        self.attributes.lock().insert(key.to_owned(), value);
    }

    fn remove(&self, key: &str) -> Option<Value> {
        self.attributes.lock().remove(key)
    }
}

/// A handle on the session of the current caller.
///
/// Cloning a `Session` yields another handle on the same store.
#[derive(Clone, Debug)]
pub struct Session {
    #[debug("..")]
    store: Arc<dyn SessionStore>,
}

impl Session {
    /// Creates a session handle on top of the given store.
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Creates a session backed by a fresh [`MemoryStore`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Serializes `value` and stores it under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized.
    pub fn add<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        self.store.insert(key, serde_json::to_value(value)?);
        Ok(())
    }

    /// Replaces the value stored under `key`. Same as [`Session::add`].
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized.
    pub fn update<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        self.add(key, value)
    }

    /// Removes the value stored under `key`.
    pub fn delete(&self, key: &str) {
        self.store.remove(key);
    }

    /// Returns the value stored under `key`, deserialized into `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored value cannot be deserialized into `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.store
            .get(key)
            .map(serde_json::from_value)
            .transpose()
            .map_err(Into::into)
    }

    /// Returns the raw JSON value stored under `key`.
    #[must_use]
    pub fn get_value(&self, key: &str) -> Option<Value> {
        self.store.get(key)
    }

    /// Stores a raw JSON value under `key`.
    pub fn insert_value(&self, key: &str, value: Value) {
        self.store.insert(key, value);
    }

    /// Returns the caller's role, stored as a string under `key`.
    ///
    /// Anything that is not a JSON string counts as no role.
    #[must_use]
    pub fn role(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Some(Value::String(role)) => Some(role),
            _ => None,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_get_delete() {
        let session = Session::in_memory();

        session.add("count", &3).unwrap();
        assert_eq!(session.get::<i32>("count").unwrap(), Some(3));

        session.update("count", &4).unwrap();
        assert_eq!(session.get::<i32>("count").unwrap(), Some(4));

        session.delete("count");
        assert_eq!(session.get::<i32>("count").unwrap(), None);
    }

    #[test]
    fn get_with_wrong_type_fails() {
        let session = Session::in_memory();
        session.add("name", "Ann").unwrap();

        assert!(session.get::<i32>("name").is_err());
    }

    #[test]
    fn clones_share_the_store() {
        let session = Session::in_memory();
        let other = session.clone();

        other.add("auth", "admin").unwrap();

        assert_eq!(session.role("auth").as_deref(), Some("admin"));
    }

    #[test]
    fn role_ignores_non_strings() {
        let session = Session::in_memory();
        session.add("auth", &42).unwrap();

        assert_eq!(session.role("auth"), None);
        assert_eq!(session.role("missing"), None);
    }
}
