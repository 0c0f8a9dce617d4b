//! Key-value persistence for session state.

use crate::Result;

/// A small string key-value store.
///
/// Session tokens live behind this trait so the client never has to ask
/// whether persistence exists in the current environment. Multi-key writes
/// must be applied together: a reader never observes half of a
/// `set_many`.
pub trait KeyValueStore: Send + Sync {
    /// Read a single value.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write several values in one operation.
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()>;

    /// Remove several keys in one operation. Missing keys are ignored.
    fn remove_many(&self, keys: &[&str]) -> Result<()>;

    /// Write a single value.
    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.set_many(&[(key, value)])
    }

    /// Remove a single key.
    fn remove(&self, key: &str) -> Result<()> {
        self.remove_many(&[key])
    }
}
