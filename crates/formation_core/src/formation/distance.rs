//! # Formation Distance
//!
//! Distance between two formations that ignores translation, overall scale
//! and slot labels.
//!
//! ## Algorithm
//! 1. Re-center both formations on their slot-mean centroid
//! 2. For a log-scale s, scale A by 2^s and B by 2^-s (symmetric in s)
//! 3. Build the 11x11 Gaussian W2 cost matrix in one batch
//! 4. Solve the slot assignment; its total cost is the distance at s
//! 5. Minimize over s in `[log_scale_min, log_scale_max]`
//!
//! The ternary search relies on the objective being close to unimodal in s.
//! That holds empirically for football formations but is not guaranteed, so
//! the best value seen at any evaluated point is kept and a grid search can
//! be configured instead.

use serde::{Deserialize, Serialize};

use super::assignment::{solve_assignment, Assignment, Correspondence};
use super::gaussian::GaussianCostTerms;
use super::Formation;
use crate::config::{DistanceConfig, ScaleSearch};

/// Outcome of comparing formation A with formation B.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FormationDistance {
    /// Minimum total assignment cost
    pub distance: f64,
    /// Best s; A was scaled by 2^s and B by 2^-s
    pub log_scale: f64,
    /// A's slot p matches B's slot `forward[p]`
    pub forward: Correspondence,
    /// B's slot q matches A's slot `backward[q]`
    pub backward: Correspondence,
}

impl FormationDistance {
    /// Relative size of B with respect to A, i.e. 2^(2s)
    pub fn size_ratio(&self) -> f64 {
        (2.0 * self.log_scale).exp2()
    }

    /// The same result seen from B's side
    pub fn reversed(&self) -> FormationDistance {
        FormationDistance {
            distance: self.distance,
            log_scale: -self.log_scale,
            forward: self.backward,
            backward: self.forward,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DistanceSolver {
    config: DistanceConfig,
}

impl DistanceSolver {
    pub fn new(config: DistanceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DistanceConfig {
        &self.config
    }

    pub fn compare(&self, a: &Formation, b: &Formation) -> FormationDistance {
        let terms = GaussianCostTerms::new(a, b);
        let objective = |s: f64| solve_assignment(&terms.costs(s)).cost;

        let cfg = &self.config;
        let (_, log_scale) = match cfg.search {
            ScaleSearch::Ternary => {
                ternary_search(objective, cfg.log_scale_min, cfg.log_scale_max, cfg.precision)
            }
            ScaleSearch::Grid { steps } => {
                grid_search(objective, cfg.log_scale_min, cfg.log_scale_max, steps)
            }
        };

        // re-solve at the optimum so distance and correspondence agree
        let best = solve_assignment(&terms.costs(log_scale));
        FormationDistance {
            distance: best.cost,
            log_scale,
            forward: best.correspondence,
            backward: best.correspondence.inverse(),
        }
    }

    /// Assignment at a fixed log-scale, without searching.
    pub fn assignment_at(&self, a: &Formation, b: &Formation, log_scale: f64) -> Assignment {
        solve_assignment(&GaussianCostTerms::new(a, b).costs(log_scale))
    }
}

pub const MAX_TERNARY_ROUNDS: usize = 100;

/// Tracks the lowest objective value seen; earlier points win ties.
struct Best {
    value: f64,
    arg: f64,
}

impl Best {
    fn offer(&mut self, value: f64, arg: f64) {
        if value < self.value {
            self.value = value;
            self.arg = arg;
        }
    }
}

/// Ternary search for the minimum of `f` on `[lo, hi]`, stopping once the
/// interval is narrower than `precision` or after [`MAX_TERNARY_ROUNDS`].
/// Returns `(value, arg)` of the best point evaluated; the initial midpoint is
/// always among them.
pub fn ternary_search(
    mut f: impl FnMut(f64) -> f64,
    mut lo: f64,
    mut hi: f64,
    precision: f64,
) -> (f64, f64) {
    let mid = 0.5 * (lo + hi);
    let mut best = Best {
        value: f(mid),
        arg: mid,
    };

    for _ in 0..MAX_TERNARY_ROUNDS {
        if hi - lo < precision {
            break;
        }
        let left_third = lo + (hi - lo) / 3.0;
        let right_third = hi - (hi - lo) / 3.0;
        let f_left = f(left_third);
        let f_right = f(right_third);
        best.offer(f_left, left_third);
        best.offer(f_right, right_third);

        if f_left > f_right {
            lo = left_third;
        } else {
            hi = right_third;
        }
    }

    let mid = 0.5 * (lo + hi);
    best.offer(f(mid), mid);
    (best.value, best.arg)
}

/// Evaluates `steps + 1` evenly spaced points on `[lo, hi]` (the midpoint
/// alone when `steps` is 0).
pub fn grid_search(mut f: impl FnMut(f64) -> f64, lo: f64, hi: f64, steps: usize) -> (f64, f64) {
    if steps == 0 {
        let mid = 0.5 * (lo + hi);
        return (f(mid), mid);
    }
    let mut best = Best {
        value: f64::INFINITY,
        arg: lo,
    };
    for i in 0..=steps {
        let s = lo + (hi - lo) * i as f64 / steps as f64;
        best.offer(f(s), s);
    }
    (best.value, best.arg)
}
