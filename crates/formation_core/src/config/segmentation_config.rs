//! Phase and window segmentation parameters

use serde::{Deserialize, Serialize};

/// Timeline segmentation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Phases shorter than this are dropped (default: 5s)
    pub min_phase_secs: f64,
    /// Maximum window length (default: 60s)
    pub window_secs: f64,
    /// A window chunk is kept only if strictly longer than this (default: 30s)
    pub min_window_secs: f64,
    /// Gap between timestamps, in nominal frame intervals, that counts as a break (default: 1.5)
    pub break_gap_factor: f64,
    /// Concatenate same-owner phases of one roster segment before chunking (default: false)
    pub pool_phases: bool,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            min_phase_secs: 5.0,
            window_secs: 60.0,
            min_window_secs: 30.0,
            break_gap_factor: 1.5,
            pool_phases: false,
        }
    }
}

impl SegmentationConfig {
    /// Seconds to whole frames at the given sampling rate.
    pub fn frames(secs: f64, frame_rate_hz: f64) -> usize {
        (secs * frame_rate_hz).round().max(0.0) as usize
    }

    pub fn min_phase_frames(&self, frame_rate_hz: f64) -> usize {
        Self::frames(self.min_phase_secs, frame_rate_hz)
    }

    pub fn window_frames(&self, frame_rate_hz: f64) -> usize {
        Self::frames(self.window_secs, frame_rate_hz).max(1)
    }

    pub fn min_window_frames(&self, frame_rate_hz: f64) -> usize {
        Self::frames(self.min_window_secs, frame_rate_hz)
    }

    /// Largest timestamp step (ms) that still counts as consecutive frames.
    pub fn max_frame_gap_ms(&self, frame_rate_hz: f64) -> f64 {
        1000.0 / frame_rate_hz * self.break_gap_factor
    }
}
