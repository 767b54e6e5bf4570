//! Encrypted key/value persistence over a flat [`KvBackend`].
//!
//! Values are JSON-serialized, sealed with AES-256-GCM, and written back as
//! JSON sealed records. The symmetric key is generated once at first
//! initialization and stored hex-encoded in the same namespace as plaintext
//! metadata, so confidentiality rests entirely on storage-access control.

mod crypto;

use std::collections::HashMap;
use std::sync::Arc;

use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, VaultError};
use crate::kv::KvBackend;
use crypto::SealedRecord;

/// KV key holding the hex-encoded symmetric key.
pub const ENCRYPTION_KEY: &str = "encryptionKey";

/// Encrypting wrapper around a flat key/value backend.
///
/// Cloning is cheap and clones share the backend and cached key. The store
/// does no internal locking: concurrent writes to the same key are
/// last-write-wins, and read-modify-write callers serialize themselves.
#[derive(Clone)]
pub struct SecureStore {
    kv: Arc<dyn KvBackend>,
    key: [u8; crypto::KEY_LEN],
}

impl SecureStore {
    /// Load the symmetric key from the backend, generating and persisting it
    /// on first use. Safe to call any number of times; every instance over
    /// the same backend ends up with the same key.
    pub async fn init(kv: Arc<dyn KvBackend>) -> Result<Self> {
        let existing = kv.get(&[ENCRYPTION_KEY.to_string()]).await?;
        let key = match existing.get(ENCRYPTION_KEY) {
            Some(hex) => crypto::decode_hex_key(hex)
                .ok_or_else(|| VaultError::Storage("stored encryption key is malformed".into()))?,
            None => {
                let key = crypto::generate_key();
                let entry = HashMap::from([(ENCRYPTION_KEY.to_string(), crypto::encode_hex(&key))]);
                kv.set(entry).await?;
                key
            }
        };
        Ok(Self { kv, key })
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let found = self.kv.get(&[key.to_string()]).await?;
        match found.get(key) {
            Some(raw) => self.unseal(key, raw).map(Some),
            None => Ok(None),
        }
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let plaintext = serde_json::to_vec(value)
            .map_err(|err| VaultError::Storage(format!("value for '{key}' did not serialize: {err}")))?;
        let record = crypto::seal(&self.key, &plaintext)
            .map_err(|err| VaultError::Storage(format!("{err:#}")))?;
        let raw = serde_json::to_string(&record)
            .map_err(|err| VaultError::Storage(format!("sealed record did not serialize: {err}")))?;
        self.kv.set(HashMap::from([(key.to_string(), raw)])).await
    }

    pub async fn remove(&self, key: &str) -> Result<()> {
        self.kv.remove(&[key.to_string()]).await
    }

    /// Decrypt every entry whose key starts with `prefix`.
    ///
    /// Each entry is unsealed independently: one that fails to decrypt or
    /// parse is logged and skipped, and enumeration returns the valid
    /// remainder. Order follows the backend's iteration order; callers sort.
    pub async fn scan_by_prefix<T: DeserializeOwned>(&self, prefix: &str) -> Result<Vec<T>> {
        let all = self.kv.get_all().await?;
        let mut values = Vec::new();
        for (key, raw) in all {
            if key == ENCRYPTION_KEY || !key.starts_with(prefix) {
                continue;
            }
            match self.unseal(&key, &raw) {
                Ok(value) => values.push(value),
                Err(err) => warn!("skipping store entry: {err}"),
            }
        }
        Ok(values)
    }

    fn unseal<T: DeserializeOwned>(&self, key: &str, raw: &str) -> Result<T> {
        let record: SealedRecord = serde_json::from_str(raw).map_err(|err| VaultError::Decryption {
            key: key.to_string(),
            reason: format!("not a sealed record: {err}"),
        })?;
        let plaintext = crypto::open(&self.key, &record).map_err(|err| VaultError::Decryption {
            key: key.to_string(),
            reason: format!("{err:#}"),
        })?;
        serde_json::from_slice(&plaintext).map_err(|err| VaultError::Decryption {
            key: key.to_string(),
            reason: format!("payload did not parse: {err}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKv;

    async fn store_over(kv: Arc<MemoryKv>) -> SecureStore {
        SecureStore::init(kv).await.unwrap()
    }

    #[tokio::test]
    async fn test_set_get_round_trip() {
        let store = store_over(Arc::new(MemoryKv::new())).await;
        store.set("k", &vec!["a".to_string(), "b".to_string()]).await.unwrap();
        let back: Option<Vec<String>> = store.get("k").await.unwrap();
        assert_eq!(back, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let store = store_over(Arc::new(MemoryKv::new())).await;
        let value: Option<String> = store.get("absent").await.unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn test_values_are_not_plaintext_in_backend() {
        let kv = Arc::new(MemoryKv::new());
        let store = store_over(kv.clone()).await;
        store.set("k", &"visible secret".to_string()).await.unwrap();

        let raw = kv.get_all().await.unwrap();
        assert!(!raw.get("k").unwrap().contains("visible secret"));
    }

    #[tokio::test]
    async fn test_init_reuses_persisted_key() {
        let kv = Arc::new(MemoryKv::new());
        let first = store_over(kv.clone()).await;
        first.set("k", &42u32).await.unwrap();

        // A second store over the same backend must decrypt what the first
        // wrote, i.e. it loaded the key instead of generating a new one.
        let second = store_over(kv).await;
        let value: Option<u32> = second.get("k").await.unwrap();
        assert_eq!(value, Some(42));
    }

    #[tokio::test]
    async fn test_scan_skips_corrupted_entries() {
        let kv = Arc::new(MemoryKv::new());
        let store = store_over(kv.clone()).await;
        for idx in 0..5 {
            store
                .set(&format!("item_{idx}"), &format!("value {idx}"))
                .await
                .unwrap();
        }

        // Corrupt one entry behind the store's back.
        kv.set(HashMap::from([(
            "item_2".to_string(),
            "{\"data\":[1,2,3],\"iv\":[0,0,0,0,0,0,0,0,0,0,0,0]}".to_string(),
        )]))
        .await
        .unwrap();

        let mut values: Vec<String> = store.scan_by_prefix("item_").await.unwrap();
        values.sort();
        assert_eq!(values, vec!["value 0", "value 1", "value 3", "value 4"]);
    }

    #[tokio::test]
    async fn test_scan_ignores_other_prefixes_and_key_record() {
        let store = store_over(Arc::new(MemoryKv::new())).await;
        store.set("collection_1", &"a".to_string()).await.unwrap();
        store.set("settings", &"b".to_string()).await.unwrap();

        let values: Vec<String> = store.scan_by_prefix("collection_").await.unwrap();
        assert_eq!(values, vec!["a"]);
    }
}
