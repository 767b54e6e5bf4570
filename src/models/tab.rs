use serde::{Deserialize, Serialize};

/// Host-assigned tab identifier.
pub type TabId = u64;

/// Point-in-time copy of one browser tab's visible state.
///
/// Owned by the host browser and refreshed on every snapshot; never persisted
/// on its own, only embedded in a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabSnapshot {
    #[serde(default)]
    pub id: TabId,
    pub url: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fav_icon_url: Option<String>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub active: bool,
    /// Milliseconds since the Unix epoch of the last time the tab had focus.
    #[serde(default)]
    pub last_accessed: i64,
}

impl TabSnapshot {
    pub fn new(id: TabId, url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
            title: title.into(),
            fav_icon_url: None,
            pinned: false,
            active: false,
            last_accessed: 0,
        }
    }
}
