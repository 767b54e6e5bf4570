/// Tunable thresholds for the clustering pass.
#[derive(Debug, Clone)]
pub struct ClusteringConfig {
    /// Similarity a tab must exceed to join an existing cluster.
    pub join_threshold: f64,

    /// Clusters with fewer members than this are dropped from the output.
    pub min_cluster_size: usize,

    /// Title keywords kept per tab.
    pub max_keywords: usize,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            join_threshold: 0.3,
            min_cluster_size: 2,
            max_keywords: 10,
        }
    }
}
