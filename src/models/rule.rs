//! Automation rules: AND-combined conditions plus a single action.
//!
//! Conditions and actions are exhaustive tagged enums so adding a kind is a
//! compile-time-checked change everywhere it is matched.

use serde::{Deserialize, Serialize};

use super::tab::TabSnapshot;
use crate::utils::urls;

/// Comparison applied by the `domain` condition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainOperator {
    #[default]
    Equals,
    Contains,
    StartsWith,
    EndsWith,
}

/// One predicate of a rule. Every condition of a rule must hold for a tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// Tab untouched for more than `value` hours.
    IdleTime { value: f64 },
    /// Compare the tab URL's host against `value`.
    Domain {
        value: String,
        #[serde(default)]
        operator: DomainOperator,
    },
    /// Case-insensitive substring of the title.
    TitleContains { value: String },
    /// Case-insensitive substring of the URL.
    UrlContains { value: String },
    /// More than one tab in the current snapshot shares this exact URL.
    IsDuplicate,
    /// Host memory metric; unimplemented, never matches.
    MemoryUsage {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<f64>,
    },
}

impl Condition {
    /// Evaluate against one tab. `snapshot` is the full current tab set
    /// (`is_duplicate` needs it); `now_ms` is epoch milliseconds.
    pub fn matches(&self, tab: &TabSnapshot, snapshot: &[TabSnapshot], now_ms: i64) -> bool {
        match self {
            Condition::IdleTime { value } => {
                let idle_ms = now_ms.saturating_sub(tab.last_accessed);
                idle_ms as f64 > value * 3_600_000.0
            }
            Condition::Domain { value, operator } => match urls::host(&tab.url) {
                Some(host) => match operator {
                    DomainOperator::Equals => host == *value,
                    DomainOperator::Contains => host.contains(value.as_str()),
                    DomainOperator::StartsWith => host.starts_with(value.as_str()),
                    DomainOperator::EndsWith => host.ends_with(value.as_str()),
                },
                None => false,
            },
            Condition::TitleContains { value } => {
                tab.title.to_lowercase().contains(&value.to_lowercase())
            }
            Condition::UrlContains { value } => {
                tab.url.to_lowercase().contains(&value.to_lowercase())
            }
            Condition::IsDuplicate => snapshot.iter().filter(|t| t.url == tab.url).count() > 1,
            Condition::MemoryUsage { .. } => false,
        }
    }
}

/// What a rule does with its matched tabs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleAction {
    /// Save matched tabs as a new collection, then close them.
    Archive {
        #[serde(
            default,
            rename = "collectionName",
            skip_serializing_if = "Option::is_none"
        )]
        collection_name: Option<String>,
    },
    Close,
    /// One grouping call over all matched tab ids.
    Group {
        #[serde(rename = "groupName")]
        group_name: String,
    },
    /// Create (or reuse) a bookmark folder, then one bookmark per tab.
    Bookmark {
        #[serde(
            default,
            rename = "folderName",
            skip_serializing_if = "Option::is_none"
        )]
        folder_name: Option<String>,
    },
    Mute,
    Pin,
}

/// A named, toggleable condition set plus one action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationRule {
    pub id: String,
    pub name: String,
    pub enabled: bool,
    pub conditions: Vec<Condition>,
    pub action: RuleAction,
}

impl AutomationRule {
    /// All conditions must hold. An empty condition list matches nothing.
    pub fn matches(&self, tab: &TabSnapshot, snapshot: &[TabSnapshot], now_ms: i64) -> bool {
        !self.conditions.is_empty()
            && self
                .conditions
                .iter()
                .all(|condition| condition.matches(tab, snapshot, now_ms))
    }

    pub fn apply(&mut self, update: RuleUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(enabled) = update.enabled {
            self.enabled = enabled;
        }
        if let Some(conditions) = update.conditions {
            self.conditions = conditions;
        }
        if let Some(action) = update.action {
            self.action = action;
        }
    }

    /// Starter rules offered to new profiles. Only the idle archive is
    /// enabled out of the box.
    pub fn default_rules() -> Vec<AutomationRule> {
        vec![
            AutomationRule {
                id: "idle_archive".into(),
                name: "Auto-archive idle tabs".into(),
                enabled: true,
                conditions: vec![Condition::IdleTime { value: 24.0 }],
                action: RuleAction::Archive {
                    collection_name: Some("Auto Archive".into()),
                },
            },
            AutomationRule {
                id: "duplicate_close".into(),
                name: "Close duplicate tabs".into(),
                enabled: false,
                conditions: vec![Condition::IsDuplicate],
                action: RuleAction::Close,
            },
            AutomationRule {
                id: "social_group".into(),
                name: "Group social media tabs".into(),
                enabled: false,
                conditions: vec![Condition::Domain {
                    value: "twitter.com".into(),
                    operator: DomainOperator::Contains,
                }],
                action: RuleAction::Group {
                    group_name: "Social Media".into(),
                },
            },
        ]
    }
}

/// Shallow field merge for `update_rule`; `None` fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleUpdate {
    pub name: Option<String>,
    pub enabled: Option<bool>,
    pub conditions: Option<Vec<Condition>>,
    pub action: Option<RuleAction>,
}
