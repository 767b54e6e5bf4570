//! Greedy single-pass clustering of tab snapshots.

use crate::models::TabSnapshot;

use super::config::ClusteringConfig;
use super::features::{self, FeatureVector, GENERAL_CATEGORY};
use super::scoring::{cluster_confidence, similarity};

/// One group of related tabs with a human-readable topic.
#[derive(Debug, Clone)]
pub struct TabCluster {
    pub topic: String,
    pub tabs: Vec<TabSnapshot>,
    /// Mean pairwise similarity between members, in `[0, 1]`.
    pub confidence: f64,
}

/// A cluster open during the pass. Indices point into the shared feature
/// arena; `representative` is the founding tab and never changes.
struct OpenCluster {
    representative: usize,
    members: Vec<usize>,
}

/// Cluster tabs in input order.
///
/// Each tab is scored against every open cluster's representative and joins
/// the best match above the threshold, else founds a new cluster; existing
/// clusters are never merged or re-split. O(n·k) for k open clusters.
/// Output order is cluster-creation order, so identical input yields
/// identical output.
pub fn cluster_tabs(tabs: &[TabSnapshot], config: &ClusteringConfig) -> Vec<TabCluster> {
    let arena: Vec<FeatureVector> = tabs
        .iter()
        .map(|tab| features::extract(tab, config.max_keywords))
        .collect();

    let mut clusters: Vec<OpenCluster> = Vec::new();
    for (index, feature) in arena.iter().enumerate() {
        let mut best: Option<(usize, f64)> = None;
        for (cluster_index, cluster) in clusters.iter().enumerate() {
            let score = similarity(feature, &arena[cluster.representative]);
            if score > config.join_threshold && best.map_or(true, |(_, prev)| score > prev) {
                best = Some((cluster_index, score));
            }
        }

        match best {
            Some((cluster_index, _)) => clusters[cluster_index].members.push(index),
            None => clusters.push(OpenCluster {
                representative: index,
                members: vec![index],
            }),
        }
    }

    clusters
        .into_iter()
        .filter(|cluster| cluster.members.len() >= config.min_cluster_size)
        .map(|cluster| {
            let members: Vec<FeatureVector> = cluster
                .members
                .iter()
                .map(|&index| arena[index].clone())
                .collect();
            TabCluster {
                topic: topic_name(&members),
                tabs: cluster.members.iter().map(|&index| tabs[index].clone()).collect(),
                confidence: cluster_confidence(&members),
            }
        })
        .collect()
}

/// Topic for a surviving cluster, in priority order: dominant non-general
/// category, most frequent keyword, shared domain, fallback label.
fn topic_name(members: &[FeatureVector]) -> String {
    if let Some(category) = most_frequent(members.iter().map(|f| f.category)) {
        if category != GENERAL_CATEGORY {
            return capitalize(category);
        }
    }

    if let Some(keyword) = most_frequent(
        members
            .iter()
            .flat_map(|f| f.keywords.iter().map(String::as_str)),
    ) {
        return capitalize(keyword);
    }

    let first_domain = &members[0].domain;
    if members.iter().all(|f| &f.domain == first_domain) {
        let label = first_domain.split('.').next().unwrap_or(first_domain);
        return capitalize(label);
    }

    "Mixed Collection".to_string()
}

/// Most frequent item; earliest-seen wins ties. `None` on empty input.
fn most_frequent<'a>(items: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for item in items {
        match counts.iter_mut().find(|entry| entry.0 == item) {
            Some(entry) => entry.1 += 1,
            None => counts.push((item, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (item, count) in counts {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((item, count));
        }
    }
    best.map(|(item, _)| item)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
