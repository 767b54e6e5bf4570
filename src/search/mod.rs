//! Fuzzy ranked search across current tabs, collections, and history.

use serde::Serialize;

use crate::error::Result;
use crate::host::{HistoryEntry, TabSource};
use crate::models::{Collection, TabId, TabSnapshot};
use crate::repository::CollectionRepository;
use crate::sessions;

const SCORE_THRESHOLD: f64 = 0.3;
const MAX_RESULTS: usize = 10;

/// Which pool a result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResultKind {
    CurrentTab,
    Collection,
    SavedTab,
    History,
}

/// What activating a result does. Collections are restored (every saved tab
/// reopened); everything else switches to or opens a single tab.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultAction {
    SwitchToTab(TabId),
    CreateTab(String),
    OpenCollection(String),
}

impl ResultAction {
    pub async fn execute(
        &self,
        tabs: &dyn TabSource,
        repo: &CollectionRepository,
    ) -> Result<()> {
        match self {
            ResultAction::SwitchToTab(id) => tabs.switch_to(*id).await,
            ResultAction::CreateTab(url) => tabs.create(url).await.map(|_| ()),
            ResultAction::OpenCollection(id) => {
                sessions::restore(repo, tabs, id).await.map(|_| ())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchResult {
    pub kind: ResultKind,
    pub title: String,
    pub subtitle: String,
    pub score: f64,
    pub action: ResultAction,
}

/// Candidate pools, assembled by the caller from host and repository state.
#[derive(Debug, Clone, Default)]
pub struct SearchPools {
    pub current_tabs: Vec<TabSnapshot>,
    pub collections: Vec<Collection>,
    pub history: Vec<HistoryEntry>,
}

/// Subsequence match score.
///
/// Both strings are lowercased; the text is walked left to right, consuming
/// the next unmatched query character on equality. A full subsequence match
/// scores `matched / len(text)`; anything less scores exactly zero, with no
/// partial credit.
pub fn fuzzy_score(query: &str, text: &str) -> f64 {
    let query: Vec<char> = query.to_lowercase().chars().collect();
    let text: Vec<char> = text.to_lowercase().chars().collect();
    if query.is_empty() || text.is_empty() {
        return 0.0;
    }

    let mut matched = 0usize;
    for ch in &text {
        if matched < query.len() && *ch == query[matched] {
            matched += 1;
        }
    }

    if matched == query.len() {
        matched as f64 / text.len() as f64
    } else {
        0.0
    }
}

/// Score every candidate, keep those above the threshold, and return the
/// top results sorted by descending score. Collections contribute both a
/// result for the collection itself (matched on its name) and one per saved
/// tab. Ties keep pool order: current tabs, collections, history.
pub fn search(query: &str, pools: &SearchPools) -> Vec<SearchResult> {
    let mut results = Vec::new();

    for tab in &pools.current_tabs {
        let score = fuzzy_score(query, &format!("{} {}", tab.title, tab.url));
        if score > SCORE_THRESHOLD {
            results.push(SearchResult {
                kind: ResultKind::CurrentTab,
                title: tab.title.clone(),
                subtitle: tab.url.clone(),
                score,
                action: ResultAction::SwitchToTab(tab.id),
            });
        }
    }

    for collection in &pools.collections {
        let score = fuzzy_score(query, &collection.name);
        if score > SCORE_THRESHOLD {
            results.push(SearchResult {
                kind: ResultKind::Collection,
                title: collection.name.clone(),
                subtitle: format!("{} tabs", collection.tabs.len()),
                score,
                action: ResultAction::OpenCollection(collection.id.clone()),
            });
        }

        for tab in &collection.tabs {
            let score = fuzzy_score(query, &format!("{} {}", tab.title, tab.url));
            if score > SCORE_THRESHOLD {
                results.push(SearchResult {
                    kind: ResultKind::SavedTab,
                    title: tab.title.clone(),
                    subtitle: format!("From {}", collection.name),
                    score,
                    action: ResultAction::CreateTab(tab.url.clone()),
                });
            }
        }
    }

    for entry in &pools.history {
        let score = fuzzy_score(query, &format!("{} {}", entry.title, entry.url));
        if score > SCORE_THRESHOLD {
            results.push(SearchResult {
                kind: ResultKind::History,
                title: entry.title.clone(),
                subtitle: entry.url.clone(),
                score,
                action: ResultAction::CreateTab(entry.url.clone()),
            });
        }
    }

    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    results.truncate(MAX_RESULTS);
    results
}
