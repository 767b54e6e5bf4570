use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::collection::Collection;
use super::rule::AutomationRule;
use super::settings::Settings;

pub const EXPORT_VERSION: &str = "1.0.0";

/// On-disk backup document. Export followed by import must reproduce the
/// same collections, settings, and rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub collections: Vec<Collection>,
    pub settings: Settings,
    pub automation_rules: Vec<AutomationRule>,
    pub exported_at: DateTime<Utc>,
    pub version: String,
}
