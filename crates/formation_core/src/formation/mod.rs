//! # Formation Module
//!
//! Statistical team-shape summaries and the distance between them.
//!
//! - `extract` - Window coordinates to [`Formation`]
//! - `gaussian` - Closed-form 2-D Gaussian Wasserstein-2 costs
//! - `assignment` - Optimal slot correspondence (Hungarian algorithm)
//! - `distance` - Scale- and labeling-invariant formation distance
//! - `matrix` - Pairwise distance store for a group of formations

pub mod assignment;
pub mod distance;
pub mod extract;
pub mod gaussian;
pub mod matrix;

pub use assignment::{solve_assignment, Assignment, Correspondence, SlotCosts};
pub use distance::{DistanceSolver, FormationDistance};
pub use extract::{center_frames, extract_formation};
pub use matrix::{DistanceMatrix, DistanceMatrixBuilder};

use nalgebra::{Matrix2, Vector2};
use serde::{Deserialize, Serialize};

use crate::error::{FormationError, Result};

/// Number of on-field positions summarized per formation
pub const SLOTS: usize = 11;

/// Per-slot mean position and 2x2 covariance of a team over one window.
///
/// Slot order is arbitrary but fixed; it carries no tactical meaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Formation {
    pub means: [Vector2<f64>; SLOTS],
    pub covariances: [Matrix2<f64>; SLOTS],
}

impl Formation {
    pub fn new(means: [Vector2<f64>; SLOTS], covariances: [Matrix2<f64>; SLOTS]) -> Self {
        Self { means, covariances }
    }

    /// Build from slices, failing on anything but exactly 11 slots.
    pub fn from_slices(means: &[Vector2<f64>], covariances: &[Matrix2<f64>]) -> Result<Self> {
        let means: [Vector2<f64>; SLOTS] = means
            .try_into()
            .map_err(|_| FormationError::slot_count(means.len()))?;
        let covariances: [Matrix2<f64>; SLOTS] = covariances
            .try_into()
            .map_err(|_| FormationError::slot_count(covariances.len()))?;
        Ok(Self { means, covariances })
    }

    pub fn centroid(&self) -> Vector2<f64> {
        self.means.iter().sum::<Vector2<f64>>() / SLOTS as f64
    }

    /// Translated so the slot means average to the origin
    pub fn centered(&self) -> Formation {
        let c = self.centroid();
        Formation {
            means: self.means.map(|m| m - c),
            covariances: self.covariances,
        }
    }

    /// Means scaled by `factor`, covariances by `factor^2`
    pub fn scaled(&self, factor: f64) -> Formation {
        Formation {
            means: self.means.map(|m| m * factor),
            covariances: self.covariances.map(|c| c * (factor * factor)),
        }
    }

    /// Slot `i` of the result is slot `order[i]` of `self`.
    pub fn permuted(&self, order: &[usize; SLOTS]) -> Formation {
        Formation {
            means: order.map(|i| self.means[i]),
            covariances: order.map(|i| self.covariances[i]),
        }
    }
}
