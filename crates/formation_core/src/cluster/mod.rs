//! # Cluster Module
//!
//! Hierarchical clustering of a group's formations into a few recurring shapes.
//!
//! - `linkage` - Lance-Williams agglomeration and dendrogram cuts
//! - `silhouette` - Cluster quality on the precomputed distance matrix
//! - `assignment` - Size-ranked canonical labels
//! - `prototype` - Aligned per-cluster average formation
//! - `engine` - Model selection over candidate k

pub mod assignment;
pub mod engine;
pub mod linkage;
pub mod prototype;
pub mod silhouette;

pub use assignment::ClusterAssignment;
pub use engine::{preferred_k, CandidateScore, ClusterEngine, ClusterOutcome, GroupClustering};
pub use linkage::{Dendrogram, Merge};
pub use prototype::Prototype;
pub use silhouette::{silhouette_samples, silhouette_score};
