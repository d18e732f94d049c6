//! Formation distance parameters

use serde::{Deserialize, Serialize};

/// 1-D minimizer used for the log-scale search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScaleSearch {
    /// Ternary search; assumes the objective is unimodal in s
    Ternary,
    /// Exhaustive scan over `steps + 1` evenly spaced values
    Grid { steps: usize },
}

/// Scale search parameters. The scale factor is k = 2^s.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DistanceConfig {
    pub search: ScaleSearch,
    /// Lower bound for s (default: -0.3)
    pub log_scale_min: f64,
    /// Upper bound for s (default: 0.3)
    pub log_scale_max: f64,
    /// Ternary search stops once the interval is narrower than this (default: 0.05)
    pub precision: f64,
}

impl Default for DistanceConfig {
    fn default() -> Self {
        Self {
            search: ScaleSearch::Ternary,
            log_scale_min: -0.3,
            log_scale_max: 0.3,
            precision: 0.05,
        }
    }
}

impl DistanceConfig {
    /// Ten times finer ternary search
    pub fn precise() -> Self {
        Self {
            precision: 0.005,
            ..Self::default()
        }
    }

    /// A search pinned to s = 0 (plain assignment distance, no scale invariance)
    pub fn unscaled() -> Self {
        Self {
            search: ScaleSearch::Grid { steps: 0 },
            log_scale_min: 0.0,
            log_scale_max: 0.0,
            ..Self::default()
        }
    }
}
