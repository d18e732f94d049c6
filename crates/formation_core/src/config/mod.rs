//! # Pipeline Configuration
//!
//! Every tunable constant of the pipeline lives here, grouped per stage.
//!
//! ## Usage
//! ```rust
//! use formation_core::config::PipelineConfig;
//!
//! let config = PipelineConfig::default();
//! let precise = PipelineConfig::precise();
//! assert!(precise.distance.precision < config.distance.precision);
//! ```
//!
//! ## Environment Variables
//!
//! - `FORMATION_SEARCH_PROFILE`: Select preset (precise, default)

mod cluster_config;
mod distance_config;
mod segmentation_config;

pub use cluster_config::{ClusterConfig, Linkage};
pub use distance_config::{DistanceConfig, ScaleSearch};
pub use segmentation_config::SegmentationConfig;

use serde::{Deserialize, Serialize};
use std::env;

use crate::error::{FormationError, Result};

/// Complete pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Rotate teams so both attack towards +x in every half
    pub normalize_orientation: bool,
    pub segmentation: SegmentationConfig,
    pub distance: DistanceConfig,
    pub clustering: ClusterConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            normalize_orientation: true,
            segmentation: SegmentationConfig::default(),
            distance: DistanceConfig::default(),
            clustering: ClusterConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Finer scale search, for small groups where accuracy beats speed
    pub fn precise() -> Self {
        Self {
            distance: DistanceConfig::precise(),
            ..Self::default()
        }
    }

    pub fn from_env_or_default() -> Self {
        match env::var("FORMATION_SEARCH_PROFILE")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "precise" => Self::precise(),
            _ => Self::default(),
        }
    }

    /// Parse and validate a YAML document. Missing fields take their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: PipelineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        let seg = &self.segmentation;
        if !(seg.window_secs > 0.0) {
            return Err(invalid("segmentation.window_secs must be positive"));
        }
        if seg.min_window_secs < 0.0 || seg.min_window_secs >= seg.window_secs {
            return Err(invalid("segmentation.min_window_secs must lie in [0, window_secs)"));
        }
        if seg.min_phase_secs < 0.0 {
            return Err(invalid("segmentation.min_phase_secs must not be negative"));
        }
        if !(seg.break_gap_factor >= 1.0) {
            return Err(invalid("segmentation.break_gap_factor must be at least 1"));
        }

        let dist = &self.distance;
        if !(dist.log_scale_min <= dist.log_scale_max) {
            return Err(invalid("distance.log_scale_min must not exceed log_scale_max"));
        }
        if dist.search == ScaleSearch::Ternary && !(dist.precision > 0.0) {
            return Err(invalid("distance.precision must be positive"));
        }

        let ks = &self.clustering.candidate_ks;
        if ks.is_empty() {
            return Err(invalid("clustering.candidate_ks is empty"));
        }
        if ks.iter().any(|&k| k < 2) {
            return Err(invalid("clustering.candidate_ks entries must be at least 2"));
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> FormationError {
    FormationError::InvalidConfig(msg.to_string())
}
