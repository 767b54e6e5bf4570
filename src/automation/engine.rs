use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{Result, VaultError};
use crate::host::{BookmarkProvider, TabSource};
use crate::models::{
    AutomationRule, Collection, CollectionKind, RuleAction, RuleUpdate, TabId, TabSnapshot,
};
use crate::repository::CollectionRepository;

// Set to false to silence per-pass logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_warn};

const DEFAULT_BOOKMARK_FOLDER: &str = "Auto Bookmarks";

/// Evaluates the persisted rule list against live tab snapshots and
/// dispatches the resulting actions through the host collaborators.
///
/// Clones share the rule list; the scheduler clones one engine per pass.
#[derive(Clone)]
pub struct AutomationEngine {
    tabs: Arc<dyn TabSource>,
    bookmarks: Arc<dyn BookmarkProvider>,
    repo: CollectionRepository,
    rules: Arc<Mutex<Vec<AutomationRule>>>,
}

impl AutomationEngine {
    pub fn new(
        tabs: Arc<dyn TabSource>,
        bookmarks: Arc<dyn BookmarkProvider>,
        repo: CollectionRepository,
    ) -> Self {
        Self {
            tabs,
            bookmarks,
            repo,
            rules: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Replace the in-memory rule list with the persisted one.
    pub async fn load_rules(&self) -> Result<()> {
        let stored = self.repo.rules().await?;
        *self.rules.lock().await = stored;
        Ok(())
    }

    pub async fn rules(&self) -> Vec<AutomationRule> {
        self.rules.lock().await.clone()
    }

    /// Append a rule, generating an id when the caller left it blank, and
    /// persist the full list.
    pub async fn add_rule(&self, mut rule: AutomationRule) -> Result<AutomationRule> {
        if rule.id.is_empty() {
            rule.id = Uuid::new_v4().to_string();
        }
        let mut rules = self.rules.lock().await;
        rules.push(rule.clone());
        self.repo.save_rules(&rules).await?;
        Ok(rule)
    }

    /// Shallow-merge `update` into the rule with this id and persist.
    pub async fn update_rule(&self, id: &str, update: RuleUpdate) -> Result<AutomationRule> {
        let mut rules = self.rules.lock().await;
        let rule = rules
            .iter_mut()
            .find(|rule| rule.id == id)
            .ok_or_else(|| VaultError::NotFound(id.to_string()))?;
        rule.apply(update);
        let updated = rule.clone();
        self.repo.save_rules(&rules).await?;
        Ok(updated)
    }

    /// Drop the rule with this id (a no-op for unknown ids) and persist.
    pub async fn delete_rule(&self, id: &str) -> Result<()> {
        let mut rules = self.rules.lock().await;
        rules.retain(|rule| rule.id != id);
        self.repo.save_rules(&rules).await
    }

    /// One evaluation pass over a fresh tab snapshot.
    ///
    /// Enabled rules run in list order. A failing action is logged and the
    /// pass moves on to the next rule; only failure to obtain the snapshot
    /// itself aborts the pass.
    pub async fn process_rules(&self) -> Result<()> {
        let snapshot = self.tabs.list().await?;
        let rules = self.rules.lock().await.clone();
        let now_ms = Utc::now().timestamp_millis();

        for rule in rules.iter().filter(|rule| rule.enabled) {
            let matching: Vec<TabSnapshot> = snapshot
                .iter()
                .filter(|tab| rule.matches(tab, &snapshot, now_ms))
                .cloned()
                .collect();
            if matching.is_empty() {
                continue;
            }

            if let Err(err) = self.execute_action(&rule.action, &matching).await {
                log_error!("automation rule '{}' failed: {err}", rule.name);
            }
        }

        Ok(())
    }

    async fn execute_action(&self, action: &RuleAction, matched: &[TabSnapshot]) -> Result<()> {
        match action {
            RuleAction::Archive { collection_name } => {
                self.archive_tabs(matched, collection_name.as_deref()).await
            }
            RuleAction::Close => self.close_tabs(matched).await,
            RuleAction::Group { group_name } => {
                let ids: Vec<TabId> = matched.iter().map(|tab| tab.id).collect();
                self.tabs.group(&ids, group_name).await.map(|_| ())
            }
            RuleAction::Bookmark { folder_name } => {
                let folder = self
                    .bookmarks
                    .create_folder(folder_name.as_deref().unwrap_or(DEFAULT_BOOKMARK_FOLDER))
                    .await?;
                for tab in matched {
                    if let Err(err) = self
                        .bookmarks
                        .create_bookmark(&folder, &tab.title, &tab.url)
                        .await
                    {
                        log_warn!("could not bookmark '{}': {err}", tab.url);
                    }
                }
                Ok(())
            }
            RuleAction::Mute => {
                for tab in matched {
                    if let Err(err) = self.tabs.mute(tab.id, true).await {
                        log_warn!("could not mute tab {}: {err}", tab.id);
                    }
                }
                Ok(())
            }
            RuleAction::Pin => {
                for tab in matched {
                    if let Err(err) = self.tabs.pin(tab.id, true).await {
                        log_warn!("could not pin tab {}: {err}", tab.id);
                    }
                }
                Ok(())
            }
        }
    }

    /// Save matched tabs as an `auto-archive` collection, then close them.
    /// A tab that refuses to close stays open but remains archived.
    async fn archive_tabs(&self, matched: &[TabSnapshot], name: Option<&str>) -> Result<()> {
        let name = match name {
            Some(name) => name.to_string(),
            None => format!("Auto Archive {}", Utc::now().format("%Y-%m-%d %H:%M")),
        };
        let collection = Collection::new(name, matched.to_vec(), CollectionKind::AutoArchive);
        self.repo.save(&collection).await?;
        self.close_tabs(matched).await
    }

    /// Close every matched tab, abandoning individual failures so the
    /// remaining tabs are still processed.
    async fn close_tabs(&self, matched: &[TabSnapshot]) -> Result<()> {
        for tab in matched {
            if let Err(err) = self.tabs.close(tab.id).await {
                log_warn!("could not close tab {}: {err}", tab.id);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;

    use super::*;
    use crate::kv::MemoryKv;
    use crate::models::Condition;
    use crate::store::SecureStore;

    /// Recording fake for the host's tabs; individual calls can be set to
    /// reject to exercise failure isolation.
    #[derive(Default)]
    struct FakeTabs {
        tabs: Vec<TabSnapshot>,
        fail_group: bool,
        fail_close: bool,
        closed: StdMutex<Vec<TabId>>,
        muted: StdMutex<Vec<TabId>>,
        pinned: StdMutex<Vec<TabId>>,
        grouped: StdMutex<Vec<(Vec<TabId>, String)>>,
    }

    #[async_trait]
    impl TabSource for FakeTabs {
        async fn list(&self) -> Result<Vec<TabSnapshot>> {
            Ok(self.tabs.clone())
        }

        async fn create(&self, _url: &str) -> Result<TabId> {
            Ok(0)
        }

        async fn close(&self, id: TabId) -> Result<()> {
            if self.fail_close {
                return Err(VaultError::Collaborator("close rejected".into()));
            }
            self.closed.lock().unwrap().push(id);
            Ok(())
        }

        async fn switch_to(&self, _id: TabId) -> Result<()> {
            Ok(())
        }

        async fn group(&self, ids: &[TabId], label: &str) -> Result<u64> {
            if self.fail_group {
                return Err(VaultError::Collaborator("group rejected".into()));
            }
            self.grouped
                .lock()
                .unwrap()
                .push((ids.to_vec(), label.to_string()));
            Ok(1)
        }

        async fn mute(&self, id: TabId, _muted: bool) -> Result<()> {
            self.muted.lock().unwrap().push(id);
            Ok(())
        }

        async fn pin(&self, id: TabId, _pinned: bool) -> Result<()> {
            self.pinned.lock().unwrap().push(id);
            Ok(())
        }

        async fn screenshot(&self, _id: TabId) -> Result<Vec<u8>> {
            Ok(Vec::new())
        }
    }

    #[derive(Default)]
    struct FakeBookmarks {
        folders: StdMutex<Vec<String>>,
        bookmarks: StdMutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl BookmarkProvider for FakeBookmarks {
        async fn create_folder(&self, name: &str) -> Result<String> {
            self.folders.lock().unwrap().push(name.to_string());
            Ok(format!("folder-{name}"))
        }

        async fn create_bookmark(&self, folder_id: &str, _title: &str, url: &str) -> Result<()> {
            self.bookmarks
                .lock()
                .unwrap()
                .push((folder_id.to_string(), url.to_string()));
            Ok(())
        }
    }

    async fn engine_with(tabs: FakeTabs) -> (AutomationEngine, Arc<FakeTabs>, Arc<FakeBookmarks>) {
        let store = SecureStore::init(Arc::new(MemoryKv::new())).await.unwrap();
        let repo = CollectionRepository::new(store);
        let tabs = Arc::new(tabs);
        let bookmarks = Arc::new(FakeBookmarks::default());
        let engine = AutomationEngine::new(tabs.clone(), bookmarks.clone(), repo);
        (engine, tabs, bookmarks)
    }

    fn stale_tab(id: u64, url: &str) -> TabSnapshot {
        let mut tab = TabSnapshot::new(id, url, url);
        tab.last_accessed = 0;
        tab
    }

    fn close_rule(id: &str, domain: &str) -> AutomationRule {
        AutomationRule {
            id: id.into(),
            name: format!("close {domain}"),
            enabled: true,
            conditions: vec![Condition::Domain {
                value: domain.into(),
                operator: Default::default(),
            }],
            action: RuleAction::Close,
        }
    }

    #[tokio::test]
    async fn test_failing_rule_does_not_block_later_rules() {
        let fake = FakeTabs {
            tabs: vec![stale_tab(1, "https://a.com"), stale_tab(2, "https://b.com")],
            fail_group: true,
            ..FakeTabs::default()
        };
        let (engine, tabs, _) = engine_with(fake).await;

        engine
            .add_rule(AutomationRule {
                id: "r1".into(),
                name: "group a".into(),
                enabled: true,
                conditions: vec![Condition::Domain {
                    value: "a.com".into(),
                    operator: Default::default(),
                }],
                action: RuleAction::Group {
                    group_name: "A".into(),
                },
            })
            .await
            .unwrap();
        engine.add_rule(close_rule("r2", "b.com")).await.unwrap();

        engine.process_rules().await.unwrap();

        // Rule 1's grouping call rejected, rule 2 still closed its tab.
        assert!(tabs.grouped.lock().unwrap().is_empty());
        assert_eq!(*tabs.closed.lock().unwrap(), vec![2]);
    }

    #[tokio::test]
    async fn test_disabled_rules_are_skipped() {
        let fake = FakeTabs {
            tabs: vec![stale_tab(1, "https://a.com")],
            ..FakeTabs::default()
        };
        let (engine, tabs, _) = engine_with(fake).await;

        let mut rule = close_rule("r1", "a.com");
        rule.enabled = false;
        engine.add_rule(rule).await.unwrap();

        engine.process_rules().await.unwrap();
        assert!(tabs.closed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_archive_saves_collection_then_closes() {
        let fake = FakeTabs {
            tabs: vec![stale_tab(1, "https://a.com"), stale_tab(2, "https://other.io")],
            ..FakeTabs::default()
        };
        let (engine, tabs, _) = engine_with(fake).await;

        engine
            .add_rule(AutomationRule {
                id: "r1".into(),
                name: "archive a".into(),
                enabled: true,
                conditions: vec![Condition::Domain {
                    value: "a.com".into(),
                    operator: Default::default(),
                }],
                action: RuleAction::Archive {
                    collection_name: Some("Stale".into()),
                },
            })
            .await
            .unwrap();

        engine.process_rules().await.unwrap();

        let collections = engine.repo.list().await.unwrap();
        assert_eq!(collections.len(), 1);
        assert_eq!(collections[0].name, "Stale");
        assert_eq!(collections[0].kind, CollectionKind::AutoArchive);
        assert_eq!(collections[0].tabs.len(), 1);
        assert_eq!(*tabs.closed.lock().unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn test_archive_keeps_collection_when_close_rejected() {
        let fake = FakeTabs {
            tabs: vec![stale_tab(1, "https://a.com")],
            fail_close: true,
            ..FakeTabs::default()
        };
        let (engine, _, _) = engine_with(fake).await;

        engine
            .add_rule(AutomationRule {
                id: "r1".into(),
                name: "archive a".into(),
                enabled: true,
                conditions: vec![Condition::Domain {
                    value: "a.com".into(),
                    operator: Default::default(),
                }],
                action: RuleAction::Archive {
                    collection_name: None,
                },
            })
            .await
            .unwrap();

        engine.process_rules().await.unwrap();
        assert_eq!(engine.repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_bookmark_creates_folder_and_entries() {
        let fake = FakeTabs {
            tabs: vec![stale_tab(1, "https://a.com"), stale_tab(2, "https://a.com/x")],
            ..FakeTabs::default()
        };
        let (engine, _, bookmarks) = engine_with(fake).await;

        engine
            .add_rule(AutomationRule {
                id: "r1".into(),
                name: "bookmark a".into(),
                enabled: true,
                conditions: vec![Condition::Domain {
                    value: "a.com".into(),
                    operator: Default::default(),
                }],
                action: RuleAction::Bookmark { folder_name: None },
            })
            .await
            .unwrap();

        engine.process_rules().await.unwrap();

        assert_eq!(*bookmarks.folders.lock().unwrap(), vec!["Auto Bookmarks"]);
        assert_eq!(bookmarks.bookmarks.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_mute_and_pin_toggle_host_flags() {
        let fake = FakeTabs {
            tabs: vec![stale_tab(1, "https://a.com"), stale_tab(2, "https://b.com")],
            ..FakeTabs::default()
        };
        let (engine, tabs, _) = engine_with(fake).await;

        let mut mute = close_rule("r1", "a.com");
        mute.action = RuleAction::Mute;
        engine.add_rule(mute).await.unwrap();

        let mut pin = close_rule("r2", "b.com");
        pin.action = RuleAction::Pin;
        engine.add_rule(pin).await.unwrap();

        engine.process_rules().await.unwrap();

        assert_eq!(*tabs.muted.lock().unwrap(), vec![1]);
        assert_eq!(*tabs.pinned.lock().unwrap(), vec![2]);
        assert!(tabs.closed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rule_mutators_persist() {
        let fake = FakeTabs::default();
        let (engine, _, _) = engine_with(fake).await;

        let added = engine
            .add_rule(AutomationRule {
                id: String::new(),
                name: "mine".into(),
                enabled: true,
                conditions: vec![Condition::IsDuplicate],
                action: RuleAction::Close,
            })
            .await
            .unwrap();
        assert!(!added.id.is_empty());

        engine
            .update_rule(
                &added.id,
                RuleUpdate {
                    enabled: Some(false),
                    ..RuleUpdate::default()
                },
            )
            .await
            .unwrap();

        // A fresh engine over the same repository sees the persisted state.
        let other = AutomationEngine::new(
            engine.tabs.clone(),
            engine.bookmarks.clone(),
            engine.repo.clone(),
        );
        other.load_rules().await.unwrap();
        let rules = other.rules().await;
        assert_eq!(rules.len(), 1);
        assert!(!rules[0].enabled);

        other.delete_rule(&added.id).await.unwrap();
        assert!(other.rules().await.is_empty());
        assert!(engine.repo.rules().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_unknown_rule_is_not_found() {
        let (engine, _, _) = engine_with(FakeTabs::default()).await;
        let err = engine
            .update_rule("ghost", RuleUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, VaultError::NotFound(_)));
    }
}
