//! Cluster list view: total count plus the first ten clusters as sent.

use crate::types::{display_value, Cluster};

/// How many clusters the list shows
pub const MAX_LISTED: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterEntry {
    /// 1-based position in the service's order
    pub rank: usize,
    pub size: u64,
    pub nodes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterList {
    pub total: usize,
    pub entries: Vec<ClusterEntry>,
}

impl ClusterList {
    /// No sorting or filtering; the service already ranks them
    pub fn from_clusters(clusters: &[Cluster]) -> Self {
        let entries = clusters
            .iter()
            .take(MAX_LISTED)
            .enumerate()
            .map(|(i, c)| ClusterEntry {
                rank: i + 1,
                size: c.size,
                nodes: c.nodes.iter().map(display_value).collect(),
            })
            .collect();

        Self {
            total: clusters.len(),
            entries,
        }
    }

    pub fn header(&self) -> String {
        format!("Clusters: {}", self.total)
    }

    /// `#1 size=12` per entry
    pub fn lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| format!("#{} size={}", e.rank, e.size))
            .collect()
    }
}
