use thiserror::Error;

/// Failure taxonomy shared across the crate.
///
/// Every mutating operation surfaces one of these so a caller can render a
/// notification without string-matching; recoverable failures (a single
/// undecryptable entry, one rejected tab call) are handled where they occur
/// and never reach this type.
#[derive(Debug, Error)]
pub enum VaultError {
    /// A store entry could not be unsealed or its payload did not parse.
    #[error("failed to decrypt store entry '{key}': {reason}")]
    Decryption { key: String, reason: String },

    /// An import document is structurally invalid.
    #[error("invalid import document: {0}")]
    Validation(String),

    /// A collection or rule id that does not exist in the store.
    #[error("'{0}' not found")]
    NotFound(String),

    /// A host collaborator (tabs, bookmarks, history) rejected a call.
    #[error("host call failed: {0}")]
    Collaborator(String),

    /// The key/value backend itself failed.
    #[error("storage backend failure: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, VaultError>;
