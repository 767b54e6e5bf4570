//! AES-256-GCM sealing for store values.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use anyhow::{anyhow, Result};
use rand::RngCore;
use serde::{Deserialize, Serialize};

pub const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;

/// Ciphertext plus the nonce it was sealed with. Serialized as JSON byte
/// arrays (`{"data": [...], "iv": [...]}`), the shape the stored records use.
#[derive(Debug, Serialize, Deserialize)]
pub struct SealedRecord {
    pub data: Vec<u8>,
    pub iv: Vec<u8>,
}

/// Fresh 256-bit key from the OS entropy source.
pub fn generate_key() -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    rand::rngs::OsRng.fill_bytes(&mut key);
    key
}

pub fn seal(key: &[u8; KEY_LEN], plaintext: &[u8]) -> Result<SealedRecord> {
    let cipher =
        Aes256Gcm::new_from_slice(key).map_err(|err| anyhow!("cipher init failed: {err}"))?;
    let mut nonce = [0u8; NONCE_LEN];
    rand::rngs::OsRng.fill_bytes(&mut nonce);
    let data = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|err| anyhow!("encryption failed: {err}"))?;
    Ok(SealedRecord {
        data,
        iv: nonce.to_vec(),
    })
}

pub fn open(key: &[u8; KEY_LEN], record: &SealedRecord) -> Result<Vec<u8>> {
    if record.iv.len() != NONCE_LEN {
        return Err(anyhow!("nonce has wrong length ({})", record.iv.len()));
    }
    let cipher =
        Aes256Gcm::new_from_slice(key).map_err(|err| anyhow!("cipher init failed: {err}"))?;
    cipher
        .decrypt(Nonce::from_slice(&record.iv), record.data.as_slice())
        .map_err(|err| anyhow!("decryption failed: {err}"))
}

pub fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Decode a hex-encoded 32-byte key; `None` on any malformation.
pub fn decode_hex_key(hex: &str) -> Option<[u8; KEY_LEN]> {
    if hex.len() != KEY_LEN * 2 {
        return None;
    }
    let mut key = [0u8; KEY_LEN];
    for (idx, chunk) in hex.as_bytes().chunks_exact(2).enumerate() {
        let hi = (chunk[0] as char).to_digit(16)?;
        let lo = (chunk[1] as char).to_digit(16)?;
        key[idx] = ((hi << 4) | lo) as u8;
    }
    Some(key)
}
