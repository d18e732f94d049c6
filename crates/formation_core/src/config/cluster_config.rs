//! Clustering parameters

use serde::{Deserialize, Serialize};

/// Lance-Williams linkage rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Linkage {
    Ward,
    Average,
    Complete,
    Single,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    pub linkage: Linkage,
    /// Cluster counts tried during model selection (default: 2, 3, 4)
    pub candidate_ks: Vec<usize>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            linkage: Linkage::Ward,
            candidate_ks: vec![2, 3, 4],
        }
    }
}
