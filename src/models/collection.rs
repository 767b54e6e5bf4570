use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::tab::TabSnapshot;

/// How a collection came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollectionKind {
    Session,
    Manual,
    AiCluster,
    QuickSave,
    AutoArchive,
}

/// A named, persisted, ordered set of tab snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub name: String,
    pub tabs: Vec<TabSnapshot>,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: CollectionKind,
}

impl Collection {
    pub fn new(name: impl Into<String>, tabs: Vec<TabSnapshot>, kind: CollectionKind) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            tabs,
            created_at: Utc::now(),
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_wire_format() {
        let json = serde_json::to_string(&CollectionKind::AiCluster).unwrap();
        assert_eq!(json, "\"ai-cluster\"");
        let json = serde_json::to_string(&CollectionKind::QuickSave).unwrap();
        assert_eq!(json, "\"quick-save\"");
        let back: CollectionKind = serde_json::from_str("\"auto-archive\"").unwrap();
        assert_eq!(back, CollectionKind::AutoArchive);
    }

    #[test]
    fn test_collection_serializes_kind_as_type() {
        let collection = Collection::new("Work", Vec::new(), CollectionKind::Manual);
        let value = serde_json::to_value(&collection).unwrap();
        assert_eq!(value["type"], "manual");
        assert!(value["createdAt"].is_string());
    }
}
