//! # Tracking Table
//!
//! The abstract per-frame input the pipeline consumes. A format-specific
//! reader (TRACAB, Metrica, ...) is expected to produce a [`TrackingTable`];
//! nothing in this crate parses vendor files.
//!
//! Coordinates are meters on a pitch-centered frame (origin at the kick-off
//! spot). Players missing from a frame's sample list count as inactive.

mod orientation;

pub use orientation::{attack_directions, normalize_orientation, AttackDirection};

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Team side. Home is reported as `team_1`, away as `team_2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    Home,
    Away,
}

impl Team {
    pub const BOTH: [Team; 2] = [Team::Home, Team::Away];

    pub fn opponent(self) -> Team {
        match self {
            Team::Home => Team::Away,
            Team::Away => Team::Home,
        }
    }

    /// 1-based team number used in group names
    pub fn number(self) -> u8 {
        match self {
            Team::Home => 1,
            Team::Away => 2,
        }
    }
}

/// One player's sample in one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSample {
    pub id: u32,
    pub team: Team,
    pub x: f64,
    pub y: f64,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl PlayerSample {
    pub fn position(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}

/// One tracking frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingFrame {
    pub timestamp_ms: u64,
    /// Half index (1, 2, extra-time halves...)
    pub half: u8,
    pub players: Vec<PlayerSample>,
    #[serde(default)]
    pub ball: Option<Vector2<f64>>,
    /// Team in possession; `None` while contested or out of play
    pub possession: Option<Team>,
}

impl TrackingFrame {
    pub fn player(&self, id: u32) -> Option<&PlayerSample> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn active_players(&self, team: Team) -> impl Iterator<Item = &PlayerSample> {
        self.players.iter().filter(move |p| p.active && p.team == team)
    }

    /// Sorted ids of the team's active players
    pub fn active_roster(&self, team: Team) -> Vec<u32> {
        let mut ids: Vec<u32> = self.active_players(team).map(|p| p.id).collect();
        ids.sort_unstable();
        ids
    }

    /// Centroid of the team's active players, if any are active
    pub fn team_centroid(&self, team: Team) -> Option<Vector2<f64>> {
        let (sum, count) = self
            .active_players(team)
            .fold((Vector2::zeros(), 0usize), |(sum, n), p| (sum + p.position(), n + 1));
        (count > 0).then(|| sum / count as f64)
    }
}

/// Whole-match tracking data at a nominal sampling rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingTable {
    pub frame_rate_hz: f64,
    pub frames: Vec<TrackingFrame>,
}

impl TrackingTable {
    pub fn new(frame_rate_hz: f64, frames: Vec<TrackingFrame>) -> Self {
        Self {
            frame_rate_hz,
            frames,
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frame(&self, index: usize) -> Option<&TrackingFrame> {
        self.frames.get(index)
    }

    /// Distinct half indices in order of appearance
    pub fn halves(&self) -> Vec<u8> {
        let mut halves: Vec<u8> = Vec::new();
        for frame in &self.frames {
            if !halves.contains(&frame.half) {
                halves.push(frame.half);
            }
        }
        halves
    }
}
