//! Pairwise formation distances for one group.

use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::assignment::Correspondence;
use super::distance::{DistanceSolver, FormationDistance};
use super::Formation;

/// Dense n x n store of distances, best log-scales and slot correspondences.
///
/// Entry (i, j) describes formation i compared against formation j. The
/// (j, i) entry holds the same distance, the negated log-scale and the
/// inverse correspondence. The diagonal is zero with identity correspondences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceMatrix {
    n: usize,
    distances: Vec<f64>,
    log_scales: Vec<f64>,
    correspondences: Vec<Correspondence>,
}

impl DistanceMatrix {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            distances: vec![0.0; n * n],
            log_scales: vec![0.0; n * n],
            correspondences: vec![Correspondence::identity(); n * n],
        }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.distances[i * self.n + j]
    }

    pub fn log_scale(&self, i: usize, j: usize) -> f64 {
        self.log_scales[i * self.n + j]
    }

    /// Slot p of formation i matches slot `correspondence(i, j)[p]` of formation j.
    pub fn correspondence(&self, i: usize, j: usize) -> &Correspondence {
        &self.correspondences[i * self.n + j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.distances[i * self.n..(i + 1) * self.n]
    }

    /// Upper triangle in row-major order (scipy's condensed layout)
    pub fn condensed(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.n * self.n.saturating_sub(1) / 2);
        for i in 0..self.n {
            out.extend_from_slice(&self.row(i)[i + 1..]);
        }
        out
    }

    pub fn is_symmetric(&self) -> bool {
        (0..self.n).all(|i| {
            self.distance(i, i) == 0.0
                && (i + 1..self.n).all(|j| self.distance(i, j) == self.distance(j, i))
        })
    }

    /// Store the result of comparing i against j, and its reverse at (j, i).
    pub fn insert(&mut self, i: usize, j: usize, result: &FormationDistance) {
        let (ij, ji) = (i * self.n + j, j * self.n + i);
        self.distances[ij] = result.distance;
        self.distances[ji] = result.distance;
        self.log_scales[ij] = result.log_scale;
        self.log_scales[ji] = -result.log_scale;
        self.correspondences[ij] = result.forward;
        self.correspondences[ji] = result.backward;
    }
}

#[derive(Debug, Clone, Default)]
pub struct DistanceMatrixBuilder {
    solver: DistanceSolver,
}

impl DistanceMatrixBuilder {
    pub fn new(solver: DistanceSolver) -> Self {
        Self { solver }
    }

    /// Compares every unordered pair once, in parallel.
    pub fn build(&self, formations: &[Formation]) -> DistanceMatrix {
        let n = formations.len();
        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
            .collect();

        debug!("Comparing {} formation pairs", pairs.len());

        let results: Vec<(usize, usize, FormationDistance)> = pairs
            .par_iter()
            .map(|&(i, j)| (i, j, self.solver.compare(&formations[i], &formations[j])))
            .collect();

        let mut matrix = DistanceMatrix::new(n);
        for (i, j, result) in &results {
            matrix.insert(*i, *j, result);
        }
        matrix
    }
}
