//! # formation_core - Team Formation Prototypes from Tracking Data
//!
//! This library discovers the recurring team shapes of a football match from
//! player tracking data and summarizes them as a few canonical prototypes per
//! team and possession role.
//!
//! ## Features
//! - Possession-phase segmentation and fixed-roster windows
//! - Per-slot Gaussian formation summaries (mean + 2x2 covariance)
//! - Formation distance invariant to translation, overall scale and slot labels
//! - Hierarchical clustering with silhouette model selection
//! - Size-ranked, slot-aligned cluster prototypes
//!
//! ## Example
//! ```no_run
//! use formation_core::{FormationPipeline, PipelineConfig, TrackingTable};
//!
//! # fn load() -> TrackingTable { TrackingTable::new(25.0, Vec::new()) }
//! let table = load();
//! let report = FormationPipeline::new(PipelineConfig::default()).run(&table)?;
//! println!("preferred k: {:?}", report.preferred_k);
//! # Ok::<(), formation_core::FormationError>(())
//! ```

// Slot loops index several parallel arrays at once
#![allow(clippy::needless_range_loop)]
// Large enum variants - boxing would change the serialized report
#![allow(clippy::large_enum_variant)]

pub mod cluster;
pub mod config;
pub mod error;
pub mod formation;
pub mod pipeline;
pub mod segment;
pub mod tracking;

pub use error::{FormationError, Result};

// Re-export configuration
pub use config::{
    ClusterConfig, DistanceConfig, Linkage, PipelineConfig, ScaleSearch, SegmentationConfig,
};

// Re-export the tracking input model
pub use tracking::{PlayerSample, Team, TrackingFrame, TrackingTable};

// Re-export formation types
pub use formation::{
    Correspondence, DistanceMatrix, DistanceMatrixBuilder, DistanceSolver, Formation,
    FormationDistance, SLOTS,
};

// Re-export clustering
pub use cluster::{ClusterAssignment, ClusterEngine, ClusterOutcome, GroupClustering, Prototype};

// Re-export the pipeline
pub use pipeline::{FormationPipeline, Group, GroupReport, MatchReport};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_report_json_shape() {
        let report = FormationPipeline::default()
            .run(&TrackingTable::new(25.0, Vec::new()))
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&report.to_json(false).unwrap()).unwrap();

        assert_eq!(json["windows"], 0);
        assert!(json["preferred_k"].is_null());
        assert_eq!(json["groups"].as_array().map(|g| g.len()), Some(4));
        assert_eq!(json["groups"][0]["group"]["team"], "home");
        assert_eq!(json["groups"][0]["group"]["role"], "offensive");
        assert_eq!(json["groups"][0]["outcome"]["status"], "empty");
    }
}
