//! CRUD and import/export for collections, settings, and rules on top of
//! the encrypted store.

use chrono::Utc;
use log::warn;
use serde::Serialize;

use crate::error::{Result, VaultError};
use crate::models::{
    AutomationRule, Collection, ExportDocument, Settings, SettingsPatch, EXPORT_VERSION,
};
use crate::store::SecureStore;

const COLLECTION_PREFIX: &str = "collection_";
const SETTINGS_KEY: &str = "settings";
const RULES_KEY: &str = "automationRules";

/// What an import actually applied. Groups are independent: a malformed
/// settings or rules section is skipped without undoing the collections.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub collections: usize,
    pub settings_applied: bool,
    pub rules: usize,
}

#[derive(Clone)]
pub struct CollectionRepository {
    store: SecureStore,
}

impl CollectionRepository {
    pub fn new(store: SecureStore) -> Self {
        Self { store }
    }

    fn collection_key(id: &str) -> String {
        format!("{COLLECTION_PREFIX}{id}")
    }

    /// Upsert by id. The stored tab list is replaced wholesale, never merged
    /// with a prior version.
    pub async fn save(&self, collection: &Collection) -> Result<()> {
        self.store
            .set(&Self::collection_key(&collection.id), collection)
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Option<Collection>> {
        self.store.get(&Self::collection_key(id)).await
    }

    /// All collections, newest first.
    pub async fn list(&self) -> Result<Vec<Collection>> {
        let mut collections: Vec<Collection> =
            self.store.scan_by_prefix(COLLECTION_PREFIX).await?;
        collections.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(collections)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        if self.get(id).await?.is_none() {
            return Err(VaultError::NotFound(id.to_string()));
        }
        self.store.remove(&Self::collection_key(id)).await
    }

    /// Stored settings, or the defaults when none have been saved yet.
    pub async fn settings(&self) -> Result<Settings> {
        Ok(self.store.get(SETTINGS_KEY).await?.unwrap_or_default())
    }

    pub async fn save_settings(&self, settings: &Settings) -> Result<()> {
        self.store.set(SETTINGS_KEY, settings).await
    }

    /// Field-by-field upsert of the settings record.
    pub async fn update_settings(&self, patch: SettingsPatch) -> Result<Settings> {
        let mut settings = self.settings().await?;
        settings.apply(patch);
        self.save_settings(&settings).await?;
        Ok(settings)
    }

    /// Stored rule list, empty when none have been saved yet.
    pub async fn rules(&self) -> Result<Vec<AutomationRule>> {
        Ok(self.store.get(RULES_KEY).await?.unwrap_or_default())
    }

    pub async fn save_rules(&self, rules: &[AutomationRule]) -> Result<()> {
        self.store.set(RULES_KEY, &rules.to_vec()).await
    }

    pub async fn export_all(&self) -> Result<ExportDocument> {
        Ok(ExportDocument {
            collections: self.list().await?,
            settings: self.settings().await?,
            automation_rules: self.rules().await?,
            exported_at: Utc::now(),
            version: EXPORT_VERSION.to_string(),
        })
    }

    /// Apply an export document.
    ///
    /// The collections section is validated up front: if it is missing, not
    /// an array, or fails to parse, the whole import aborts with no partial
    /// collection writes. Settings and rules are applied afterwards as
    /// independent groups; a malformed group is logged and skipped without
    /// touching what was already applied.
    pub async fn import_all(&self, doc: serde_json::Value) -> Result<ImportSummary> {
        let collections_value = doc
            .get("collections")
            .ok_or_else(|| VaultError::Validation("missing 'collections'".into()))?;
        if !collections_value.is_array() {
            return Err(VaultError::Validation("'collections' must be an array".into()));
        }
        let collections: Vec<Collection> = serde_json::from_value(collections_value.clone())
            .map_err(|err| VaultError::Validation(format!("bad collection entry: {err}")))?;

        let mut summary = ImportSummary {
            collections: collections.len(),
            ..ImportSummary::default()
        };
        for collection in &collections {
            self.save(collection).await?;
        }

        if let Some(value) = doc.get("settings") {
            match serde_json::from_value::<Settings>(value.clone()) {
                Ok(settings) => {
                    self.save_settings(&settings).await?;
                    summary.settings_applied = true;
                }
                Err(err) => warn!("import: settings section ignored: {err}"),
            }
        }

        if let Some(value) = doc.get("automationRules") {
            match serde_json::from_value::<Vec<AutomationRule>>(value.clone()) {
                Ok(rules) => {
                    self.save_rules(&rules).await?;
                    summary.rules = rules.len();
                }
                Err(err) => warn!("import: rules section ignored: {err}"),
            }
        }

        Ok(summary)
    }
}
