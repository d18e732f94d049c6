//! Formation CLI Library
//!
//! Tracking JSON -> formation pipeline -> report JSON
//! Pipeline configuration YAML loading and export

use anyhow::{Context, Result};
use formation_core::{FormationPipeline, MatchReport, PipelineConfig, TrackingTable};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Per-group line of the run summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub group: String,
    pub formations: usize,
    /// None when the group could not be clustered
    pub k: Option<usize>,
    pub cluster_sizes: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub frames: usize,
    pub windows: usize,
    pub preferred_k: Option<usize>,
    pub groups: Vec<GroupSummary>,
}

impl RunSummary {
    pub fn from_report(report: &MatchReport) -> Self {
        let groups = report
            .groups
            .iter()
            .map(|g| {
                let clustering = g.outcome.clustering();
                GroupSummary {
                    group: g.group.name(),
                    formations: g.len(),
                    k: clustering.map(|c| c.k),
                    cluster_sizes: clustering
                        .map(|c| c.assignment.sizes().to_vec())
                        .unwrap_or_default(),
                }
            })
            .collect();
        Self {
            frames: report.frames,
            windows: report.windows,
            preferred_k: report.preferred_k,
            groups,
        }
    }
}

/// Read a tracking table from a JSON file.
pub fn load_tracking(path: &Path) -> Result<TrackingTable> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read tracking file: {}", path.display()))?;
    let table: TrackingTable = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse tracking JSON: {}", path.display()))?;
    if !(table.frame_rate_hz > 0.0) {
        anyhow::bail!("Tracking file {} has no positive frame rate", path.display());
    }
    info!(
        "Loaded {} frames at {} Hz from {}",
        table.len(),
        table.frame_rate_hz,
        path.display()
    );
    Ok(table)
}

/// Load a YAML pipeline configuration, or fall back to the environment
/// profile (`FORMATION_SEARCH_PROFILE`) when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let Some(path) = path else {
        return Ok(PipelineConfig::from_env_or_default());
    };
    let yaml = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    PipelineConfig::from_yaml_str(&yaml)
        .with_context(|| format!("Invalid pipeline config: {}", path.display()))
}

pub fn run(table: &TrackingTable, config: PipelineConfig) -> Result<MatchReport> {
    FormationPipeline::new(config)
        .run(table)
        .context("Formation pipeline failed")
}

pub fn write_report(path: &Path, report: &MatchReport, pretty: bool) -> Result<()> {
    let json = report.to_json(pretty).context("Failed to serialize report")?;
    create_parent_dir(path)?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write report: {}", path.display()))
}

/// Serialize the default configuration; also written to `path` if given.
pub fn export_default_config(path: Option<&Path>) -> Result<String> {
    let yaml = PipelineConfig::default()
        .to_yaml_string()
        .context("Failed to serialize default config")?;
    if let Some(path) = path {
        create_parent_dir(path)?;
        fs::write(path, &yaml)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
    }
    Ok(yaml)
}

fn create_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }
    Ok(())
}
