//! Persistence collaborator.
//!
//! The tracker only needs a synchronous string key/value store. Two backends
//! live here: [`MemoryStore`] for tests and throwaway sessions, and the SQLite
//! backed [`Database`] used by the CLI. [`ProgressStore`] layers the progress
//! record format on top of either.

pub mod db;
pub mod memory;
pub mod progress;

use anyhow::Result;

pub use db::Database;
pub use memory::MemoryStore;
pub use progress::{ProgressError, ProgressStore};

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;

    /// Keys starting with `prefix`, sorted ascending.
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;
}
