use serde::{Deserialize, Serialize};

/// User-facing preferences. Stored as a single record; updated
/// field-by-field through [`SettingsPatch`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub auto_archive_idle: bool,
    pub idle_threshold_hours: u32,
    #[serde(rename = "enableAIClustering")]
    pub enable_ai_clustering: bool,
    pub theme: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_archive_idle: true,
            idle_threshold_hours: 24,
            enable_ai_clustering: true,
            theme: "light".into(),
        }
    }
}

/// Partial settings update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub auto_archive_idle: Option<bool>,
    pub idle_threshold_hours: Option<u32>,
    #[serde(rename = "enableAIClustering")]
    pub enable_ai_clustering: Option<bool>,
    pub theme: Option<String>,
}

impl Settings {
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(value) = patch.auto_archive_idle {
            self.auto_archive_idle = value;
        }
        if let Some(value) = patch.idle_threshold_hours {
            self.idle_threshold_hours = value;
        }
        if let Some(value) = patch.enable_ai_clustering {
            self.enable_ai_clustering = value;
        }
        if let Some(value) = patch.theme {
            self.theme = value;
        }
    }
}
