//! # Agglomerative Linkage
//!
//! Builds a dendrogram from a symmetric distance matrix with the
//! Lance-Williams update rule. O(n^3), which is fine for the few hundred
//! windows a match produces.
//!
//! Leaves are numbered `0..n`; the cluster formed by merge `m` is `n + m`.
//! When several pairs share the minimum distance, the pair with the smallest
//! (row, column) position in the working matrix is merged first.

use serde::{Deserialize, Serialize};

use crate::config::Linkage;
use crate::formation::DistanceMatrix;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Merge {
    /// Cluster ids, `left < right`
    pub left: usize,
    pub right: usize,
    /// Linkage distance at which the two clusters were joined
    pub height: f64,
    /// Number of leaves in the merged cluster
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dendrogram {
    leaves: usize,
    merges: Vec<Merge>,
}

impl Dendrogram {
    pub fn build(matrix: &DistanceMatrix, linkage: Linkage) -> Self {
        Self::from_fn(matrix.len(), |i, j| matrix.distance(i, j), linkage)
    }

    /// Dendrogram over `n` leaves whose pairwise distance is `distance(i, j)`.
    pub fn from_fn(n: usize, distance: impl Fn(usize, usize) -> f64, linkage: Linkage) -> Self {
        let mut d: Vec<Vec<f64>> = (0..n)
            .map(|i| (0..n).map(|j| distance(i, j)).collect())
            .collect();
        // working slot -> (cluster id, size); None once absorbed
        let mut clusters: Vec<Option<(usize, usize)>> = (0..n).map(|i| Some((i, 1))).collect();
        let mut merges = Vec::with_capacity(n.saturating_sub(1));

        for step in 0..n.saturating_sub(1) {
            let Some((a, b)) = closest_pair(&d, &clusters) else {
                break;
            };
            let (id_a, size_a) = clusters[a].unwrap_or_default();
            let (id_b, size_b) = clusters[b].unwrap_or_default();
            let d_ab = d[a][b];

            for k in 0..n {
                let Some((_, size_k)) = clusters[k] else {
                    continue;
                };
                if k == a || k == b {
                    continue;
                }
                let updated =
                    lance_williams(linkage, d[k][a], d[k][b], d_ab, size_a, size_b, size_k);
                d[k][a] = updated;
                d[a][k] = updated;
            }

            merges.push(Merge {
                left: id_a.min(id_b),
                right: id_a.max(id_b),
                height: d_ab,
                size: size_a + size_b,
            });
            clusters[a] = Some((n + step, size_a + size_b));
            clusters[b] = None;
        }

        Self { leaves: n, merges }
    }

    pub fn leaves(&self) -> usize {
        self.leaves
    }

    pub fn merges(&self) -> &[Merge] {
        &self.merges
    }

    /// Flat labels for `k` clusters, numbered `0..k` by first appearance
    /// in leaf order. `None` unless `1 <= k <= n`.
    pub fn cut(&self, k: usize) -> Option<Vec<usize>> {
        let n = self.leaves;
        if k == 0 || k > n {
            return None;
        }

        // union-find over all cluster ids, leaves and merged
        let mut parent: Vec<usize> = (0..n + self.merges.len()).collect();
        for (m, merge) in self.merges.iter().take(n - k).enumerate() {
            parent[merge.left] = n + m;
            parent[merge.right] = n + m;
        }
        let root = |mut x: usize| {
            while parent[x] != x {
                x = parent[x];
            }
            x
        };

        let mut numbering: Vec<usize> = Vec::with_capacity(k);
        let labels = (0..n)
            .map(|leaf| {
                let r = root(leaf);
                match numbering.iter().position(|&seen| seen == r) {
                    Some(label) => label,
                    None => {
                        numbering.push(r);
                        numbering.len() - 1
                    }
                }
            })
            .collect();
        Some(labels)
    }
}

fn closest_pair(d: &[Vec<f64>], clusters: &[Option<(usize, usize)>]) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize, f64)> = None;
    for i in 0..d.len() {
        if clusters[i].is_none() {
            continue;
        }
        for j in i + 1..d.len() {
            if clusters[j].is_none() {
                continue;
            }
            if best.map_or(true, |(_, _, dist)| d[i][j] < dist) {
                best = Some((i, j, d[i][j]));
            }
        }
    }
    best.map(|(i, j, _)| (i, j))
}

/// Distance from cluster k to the union of clusters a and b.
fn lance_williams(
    linkage: Linkage,
    d_ka: f64,
    d_kb: f64,
    d_ab: f64,
    size_a: usize,
    size_b: usize,
    size_k: usize,
) -> f64 {
    let (na, nb, nk) = (size_a as f64, size_b as f64, size_k as f64);
    match linkage {
        Linkage::Ward => {
            let total = na + nb + nk;
            let squared = ((nk + na) * d_ka * d_ka + (nk + nb) * d_kb * d_kb - nk * d_ab * d_ab)
                / total;
            squared.max(0.0).sqrt()
        }
        Linkage::Average => (na * d_ka + nb * d_kb) / (na + nb),
        Linkage::Complete => d_ka.max(d_kb),
        Linkage::Single => d_ka.min(d_kb),
    }
}
