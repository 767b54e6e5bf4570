//! Session capture and restore: snapshot the current window into a
//! collection, persist clustering output, and reopen stored collections.

use chrono::Utc;
use log::warn;

use crate::clustering::TabCluster;
use crate::error::{Result, VaultError};
use crate::host::TabSource;
use crate::models::{Collection, CollectionKind};
use crate::repository::CollectionRepository;

/// Save every currently open tab as a `quick-save` collection.
pub async fn quick_save(
    tabs: &dyn TabSource,
    repo: &CollectionRepository,
) -> Result<Collection> {
    let snapshot = tabs.list().await?;
    let name = format!("Quick Save {}", Utc::now().format("%Y-%m-%d %H:%M"));
    let collection = Collection::new(name, snapshot, CollectionKind::QuickSave);
    repo.save(&collection).await?;
    Ok(collection)
}

/// Persist clustering output, one `ai-cluster` collection per cluster.
pub async fn save_clusters(
    repo: &CollectionRepository,
    clusters: Vec<TabCluster>,
) -> Result<Vec<Collection>> {
    let mut saved = Vec::with_capacity(clusters.len());
    for cluster in clusters {
        let collection = Collection::new(cluster.topic, cluster.tabs, CollectionKind::AiCluster);
        repo.save(&collection).await?;
        saved.push(collection);
    }
    Ok(saved)
}

/// Reopen every tab of a stored collection.
///
/// Returns the number of tabs actually opened; an individual create failure
/// abandons that tab and the loop continues.
pub async fn restore(
    repo: &CollectionRepository,
    tabs: &dyn TabSource,
    id: &str,
) -> Result<usize> {
    let collection = repo
        .get(id)
        .await?
        .ok_or_else(|| VaultError::NotFound(id.to_string()))?;

    let mut opened = 0;
    for tab in &collection.tabs {
        match tabs.create(&tab.url).await {
            Ok(_) => opened += 1,
            Err(err) => warn!("could not reopen '{}': {err}", tab.url),
        }
    }
    Ok(opened)
}
