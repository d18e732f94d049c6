use serde::{Deserialize, Serialize};

/// Cluster label per formation, numbered `1..=k` by descending cluster size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterAssignment {
    labels: Vec<usize>,
    /// `sizes[l - 1]` = number of formations with label `l`
    sizes: Vec<usize>,
}

impl ClusterAssignment {
    /// Relabels raw `0..k` labels so that label 1 is the largest cluster.
    /// Equal sizes keep their raw order.
    pub fn canonicalize(raw: &[usize]) -> Self {
        let k = raw.iter().max().map_or(0, |&l| l + 1);
        let mut raw_sizes = vec![0usize; k];
        for &l in raw {
            raw_sizes[l] += 1;
        }

        let mut order: Vec<usize> = (0..k).collect();
        // stable sort keeps raw order between equal sizes
        order.sort_by(|&a, &b| raw_sizes[b].cmp(&raw_sizes[a]));

        let mut rank = vec![0usize; k];
        for (position, &raw_label) in order.iter().enumerate() {
            rank[raw_label] = position + 1;
        }

        Self {
            labels: raw.iter().map(|&l| rank[l]).collect(),
            sizes: order.iter().map(|&l| raw_sizes[l]).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of clusters
    pub fn k(&self) -> usize {
        self.sizes.len()
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn label(&self, formation: usize) -> usize {
        self.labels[formation]
    }

    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    pub fn size(&self, label: usize) -> usize {
        self.sizes[label - 1]
    }

    /// Formation indices carrying `label`, ascending
    pub fn members(&self, label: usize) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|&(_, &l)| l == label)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn singleton_labels(&self) -> Vec<usize> {
        (1..=self.k()).filter(|&l| self.size(l) == 1).collect()
    }
}
