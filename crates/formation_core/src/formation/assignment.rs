//! # Slot Assignment
//!
//! Minimum-cost perfect matching between the 11 slots of two formations,
//! solved with the Hungarian algorithm on an integer-quantized cost matrix.

use pathfinding::kuhn_munkres::kuhn_munkres_min;
use pathfinding::matrix::Matrix;
use serde::{Deserialize, Serialize};

use super::SLOTS;
use crate::error::{FormationError, Result};

/// Pairwise slot costs, `costs[p][q]` = cost of matching slot p of A with slot q of B
pub type SlotCosts = [[f64; SLOTS]; SLOTS];

/// Costs are matched in micro-units; real totals are summed in f64.
const COST_RESOLUTION: f64 = 1_000_000.0;

/// Bijection between two formations' slots: slot `p` of the source matches
/// slot `self[p]` of the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Correspondence([usize; SLOTS]);

impl Default for Correspondence {
    fn default() -> Self {
        Self::identity()
    }
}

impl Correspondence {
    pub fn identity() -> Self {
        Self(std::array::from_fn(|i| i))
    }

    /// Validates that `map` is a permutation of 0..11.
    pub fn from_slice(map: &[usize]) -> Result<Self> {
        let map: [usize; SLOTS] = map
            .try_into()
            .map_err(|_| FormationError::slot_count(map.len()))?;
        let mut seen = [false; SLOTS];
        for &target in &map {
            if target >= SLOTS || seen[target] {
                return Err(FormationError::InvalidConfig(format!(
                    "slot map {:?} is not a permutation",
                    map
                )));
            }
            seen[target] = true;
        }
        Ok(Self(map))
    }

    pub fn target(&self, slot: usize) -> usize {
        self.0[slot]
    }

    pub fn as_array(&self) -> &[usize; SLOTS] {
        &self.0
    }

    pub fn inverse(&self) -> Self {
        let mut inv = [0; SLOTS];
        for (source, &target) in self.0.iter().enumerate() {
            inv[target] = source;
        }
        Self(inv)
    }

    /// `self` followed by `next`: source slot p maps to `next[self[p]]`.
    pub fn then(&self, next: &Correspondence) -> Self {
        Self(self.0.map(|t| next.0[t]))
    }

    pub fn is_identity(&self) -> bool {
        self.0.iter().enumerate().all(|(i, &t)| i == t)
    }
}

/// Result of one assignment solve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assignment {
    /// Sum of the matched costs
    pub cost: f64,
    pub correspondence: Correspondence,
}

pub fn solve_assignment(costs: &SlotCosts) -> Assignment {
    let weights = Matrix::from_fn(SLOTS, SLOTS, |(p, q)| quantize(costs[p][q]));
    let (_, assignments) = kuhn_munkres_min(&weights);

    let mut map = [0; SLOTS];
    map.copy_from_slice(&assignments);
    let cost = map.iter().enumerate().map(|(p, &q)| costs[p][q]).sum();

    Assignment {
        cost,
        correspondence: Correspondence(map),
    }
}

/// Checked entry point for cost matrices built outside this crate.
pub fn solve_assignment_rows(rows: &[Vec<f64>]) -> Result<Assignment> {
    Ok(solve_assignment(&cost_matrix_from_rows(rows)?))
}

pub fn cost_matrix_from_rows(rows: &[Vec<f64>]) -> Result<SlotCosts> {
    if rows.len() != SLOTS {
        return Err(FormationError::slot_count(rows.len()));
    }
    let mut costs = [[0.0; SLOTS]; SLOTS];
    for (dst, row) in costs.iter_mut().zip(rows) {
        if row.len() != SLOTS {
            return Err(FormationError::slot_count(row.len()));
        }
        dst.copy_from_slice(row);
    }
    Ok(costs)
}

#[inline]
fn quantize(cost: f64) -> i64 {
    (cost * COST_RESOLUTION).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagonal_costs_pick_identity() {
        let costs: SlotCosts =
            std::array::from_fn(|p| std::array::from_fn(|q| if p == q { 0.0 } else { 10.0 }));
        let a = solve_assignment(&costs);
        assert!(a.correspondence.is_identity());
        assert_eq!(a.cost, 0.0);
    }

    #[test]
    fn test_recovers_hidden_permutation() {
        let hidden = [4, 0, 9, 2, 10, 1, 3, 8, 5, 7, 6];
        let costs: SlotCosts = std::array::from_fn(|p| {
            std::array::from_fn(|q| if hidden[p] == q { 0.5 } else { 3.0 + (p + q) as f64 * 0.1 })
        });
        let a = solve_assignment(&costs);
        assert_eq!(a.correspondence.as_array(), &hidden);
        assert!((a.cost - 5.5).abs() < 1e-12);
    }

    #[test]
    fn test_beats_greedy_choice() {
        // Greedy row-by-row takes (0,0)=1 then (1,1)=10; optimum is 2 + 2
        let mut costs: SlotCosts = std::array::from_fn(|p| {
            std::array::from_fn(|q| if p == q { 0.0 } else { 100.0 })
        });
        costs[0][0] = 1.0;
        costs[0][1] = 2.0;
        costs[1][0] = 2.0;
        costs[1][1] = 10.0;
        let a = solve_assignment(&costs);
        assert_eq!(a.correspondence.target(0), 1);
        assert_eq!(a.correspondence.target(1), 0);
        assert!((a.cost - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_inverse_and_composition() {
        let c = Correspondence::from_slice(&[1, 2, 0, 3, 4, 5, 6, 7, 8, 10, 9]).unwrap();
        assert!(c.then(&c.inverse()).is_identity());
        assert!(c.inverse().then(&c).is_identity());
        assert_eq!(c.inverse().target(0), 2);
    }

    #[test]
    fn test_non_permutation_is_rejected() {
        assert!(Correspondence::from_slice(&[0, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9]).is_err());
        assert!(Correspondence::from_slice(&[0, 1, 2]).is_err());
    }

    #[test]
    fn test_wrong_shape_fails_loudly() {
        let rows = vec![vec![0.0; 11]; 10];
        let err = solve_assignment_rows(&rows).unwrap_err();
        assert!(matches!(err, FormationError::InvalidSlotCount { found: 10, .. }));

        let mut rows = vec![vec![0.0; 11]; 11];
        rows[4].push(1.0);
        let err = solve_assignment_rows(&rows).unwrap_err();
        assert!(matches!(err, FormationError::InvalidSlotCount { found: 12, .. }));
    }
}
