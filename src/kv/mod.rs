//! Flat key/value persistence substrate.
//!
//! The secure store encrypts on top of whatever implements [`KvBackend`];
//! the backend stores opaque strings and knows nothing about the cipher.

mod memory;
mod sqlite;

pub use memory::MemoryKv;
pub use sqlite::SqliteKv;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::Result;

/// A flat `String -> String` namespace with batch operations.
#[async_trait]
pub trait KvBackend: Send + Sync {
    /// Fetch the requested keys; absent keys are simply missing from the map.
    async fn get(&self, keys: &[String]) -> Result<HashMap<String, String>>;

    /// Upsert every entry in the map.
    async fn set(&self, entries: HashMap<String, String>) -> Result<()>;

    async fn remove(&self, keys: &[String]) -> Result<()>;

    /// Every entry in the namespace.
    async fn get_all(&self) -> Result<HashMap<String, String>>;
}
