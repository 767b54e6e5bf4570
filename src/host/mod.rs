//! Trait seams for everything the host browser owns.
//!
//! The engine never talks to a browser directly; it is handed implementations
//! of these traits. Failures surface as [`VaultError::Collaborator`]
//! rejections, never hangs; no timeouts or cancellation live at this layer.
//!
//! [`VaultError::Collaborator`]: crate::error::VaultError::Collaborator

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{TabId, TabSnapshot};

/// One visited page from the host's history store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub title: String,
    pub url: String,
    /// Epoch milliseconds of the most recent visit.
    pub last_visit_time: i64,
    pub visit_count: u32,
}

/// The host browser's tab primitives.
#[async_trait]
pub trait TabSource: Send + Sync {
    /// Snapshot of every tab in the current window.
    async fn list(&self) -> Result<Vec<TabSnapshot>>;

    /// Open a new tab; returns the host-assigned id.
    async fn create(&self, url: &str) -> Result<TabId>;

    async fn close(&self, id: TabId) -> Result<()>;

    async fn switch_to(&self, id: TabId) -> Result<()>;

    /// Group all `ids` under one labelled tab group; returns the group id.
    async fn group(&self, ids: &[TabId], label: &str) -> Result<u64>;

    async fn mute(&self, id: TabId, muted: bool) -> Result<()>;

    async fn pin(&self, id: TabId, pinned: bool) -> Result<()>;

    /// Capture the visible area of a tab as encoded image bytes.
    async fn screenshot(&self, id: TabId) -> Result<Vec<u8>>;
}

/// Read access to the host's browsing history.
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    async fn search(
        &self,
        text: &str,
        max_results: usize,
        since_ms: i64,
    ) -> Result<Vec<HistoryEntry>>;
}

/// The host's bookmark tree.
#[async_trait]
pub trait BookmarkProvider: Send + Sync {
    /// Create (or reuse) a top-level folder; returns its id.
    async fn create_folder(&self, name: &str) -> Result<String>;

    async fn create_bookmark(&self, folder_id: &str, title: &str, url: &str) -> Result<()>;
}
