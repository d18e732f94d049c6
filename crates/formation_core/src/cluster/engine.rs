//! # Cluster Engine
//!
//! Turns one group's formations and distance matrix into a size-ranked
//! clustering with prototypes.
//!
//! ## Pipeline
//! 1. Build the dendrogram with the configured linkage
//! 2. Cut it at every candidate k with `2 <= k < n`
//! 3. Score each cut with the mean silhouette
//! 4. Keep the best-scoring k (smaller k on ties)
//! 5. Canonicalize labels by cluster size and build prototypes

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::assignment::ClusterAssignment;
use super::linkage::{Dendrogram, Merge};
use super::prototype::Prototype;
use super::silhouette::silhouette_score;
use crate::config::{ClusterConfig, Linkage};
use crate::error::{FormationError, Result};
use crate::formation::{DistanceMatrix, Formation};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub k: usize,
    pub silhouette: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupClustering {
    pub linkage: Linkage,
    pub merges: Vec<Merge>,
    /// Scores of every candidate k that was valid for this group
    pub scores: Vec<CandidateScore>,
    pub k: usize,
    pub assignment: ClusterAssignment,
    /// Ordered by label
    pub prototypes: Vec<Prototype>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClusterOutcome {
    /// Fewer than two formations
    Empty,
    /// No candidate k satisfies `2 <= k < samples`
    InsufficientSamples { samples: usize },
    Clustered(GroupClustering),
}

impl ClusterOutcome {
    pub fn clustering(&self) -> Option<&GroupClustering> {
        match self {
            ClusterOutcome::Clustered(c) => Some(c),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClusterEngine {
    config: ClusterConfig,
}

impl ClusterEngine {
    pub fn new(config: ClusterConfig) -> Self {
        Self { config }
    }

    /// `matrix` must be the distance matrix of `formations`, in the same order.
    pub fn cluster(
        &self,
        formations: &[Formation],
        matrix: &DistanceMatrix,
    ) -> Result<ClusterOutcome> {
        let n = formations.len();
        if matrix.len() != n {
            return Err(FormationError::MatrixSizeMismatch {
                formations: n,
                matrix: matrix.len(),
            });
        }
        if n < 2 {
            return Ok(ClusterOutcome::Empty);
        }

        let dendrogram = Dendrogram::build(matrix, self.config.linkage);

        let mut cuts: Vec<(usize, Vec<usize>)> = Vec::new();
        let mut scores: Vec<CandidateScore> = Vec::new();
        for &k in &self.config.candidate_ks {
            if k < 2 || k >= n {
                continue;
            }
            let Some(labels) = dendrogram.cut(k) else {
                continue;
            };
            let Some(silhouette) = silhouette_score(matrix, &labels) else {
                continue;
            };
            debug!("k = {}: silhouette {:.4}", k, silhouette);
            scores.push(CandidateScore { k, silhouette });
            cuts.push((k, labels));
        }

        let Some(best) = best_candidate(&scores) else {
            return Ok(ClusterOutcome::InsufficientSamples { samples: n });
        };
        let Some((_, labels)) = cuts.into_iter().find(|(k, _)| *k == best.k) else {
            return Ok(ClusterOutcome::InsufficientSamples { samples: n });
        };

        let assignment = ClusterAssignment::canonicalize(&labels);
        for label in assignment.singleton_labels() {
            warn!(
                "Cluster {} of k = {} holds a single formation ({})",
                label,
                best.k,
                assignment.members(label)[0]
            );
        }

        let prototypes = (1..=assignment.k())
            .filter_map(|label| {
                Prototype::build(label, &assignment.members(label), formations, matrix)
            })
            .collect();

        Ok(ClusterOutcome::Clustered(GroupClustering {
            linkage: self.config.linkage,
            merges: dendrogram.merges().to_vec(),
            scores,
            k: best.k,
            assignment,
            prototypes,
        }))
    }
}

/// Highest silhouette; the smaller k wins ties.
fn best_candidate(scores: &[CandidateScore]) -> Option<CandidateScore> {
    scores.iter().copied().fold(None, |best, c| match best {
        Some(b) if b.silhouette > c.silhouette || (b.silhouette == c.silhouette && b.k < c.k) => {
            Some(b)
        }
        _ => Some(c),
    })
}

/// k with the highest mean silhouette over the groups that scored it.
pub fn preferred_k<'a>(outcomes: impl IntoIterator<Item = &'a ClusterOutcome>) -> Option<usize> {
    let mut totals: Vec<(usize, f64, usize)> = Vec::new();
    for clustering in outcomes.into_iter().filter_map(ClusterOutcome::clustering) {
        for score in &clustering.scores {
            match totals.iter_mut().find(|(k, _, _)| *k == score.k) {
                Some(entry) => {
                    entry.1 += score.silhouette;
                    entry.2 += 1;
                }
                None => totals.push((score.k, score.silhouette, 1)),
            }
        }
    }
    totals.sort_by_key(|(k, _, _)| *k);

    let means: Vec<CandidateScore> = totals
        .into_iter()
        .map(|(k, sum, count)| CandidateScore {
            k,
            silhouette: sum / count as f64,
        })
        .collect();
    best_candidate(&means).map(|c| c.k)
}
