use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::KvBackend;
use crate::error::Result;

/// In-memory backend for tests and ephemeral profiles.
#[derive(Default)]
pub struct MemoryKv {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvBackend for MemoryKv {
    async fn get(&self, keys: &[String]) -> Result<HashMap<String, String>> {
        let entries = self.entries.lock().unwrap();
        Ok(keys
            .iter()
            .filter_map(|key| entries.get(key).map(|value| (key.clone(), value.clone())))
            .collect())
    }

    async fn set(&self, new_entries: HashMap<String, String>) -> Result<()> {
        self.entries.lock().unwrap().extend(new_entries);
        Ok(())
    }

    async fn remove(&self, keys: &[String]) -> Result<()> {
        let mut entries = self.entries.lock().unwrap();
        for key in keys {
            entries.remove(key);
        }
        Ok(())
    }

    async fn get_all(&self) -> Result<HashMap<String, String>> {
        Ok(self.entries.lock().unwrap().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let kv = MemoryKv::new();
        kv.set(HashMap::from([("a".to_string(), "1".to_string())]))
            .await
            .unwrap();

        let found = kv.get(&["a".to_string(), "missing".to_string()]).await.unwrap();
        assert_eq!(found.get("a").map(String::as_str), Some("1"));
        assert!(!found.contains_key("missing"));

        kv.remove(&["a".to_string()]).await.unwrap();
        assert!(kv.get_all().await.unwrap().is_empty());
    }
}
