//! # Window Builder
//!
//! Cuts owned phases into bounded-duration windows with a fixed roster and
//! gathers each side's raw `(frames, 11, 2)` coordinates.
//!
//! ## Slot Policy
//! - Slots follow ascending player id of the side's active roster
//! - Sides with fewer than 11 active players are padded with phantom slots
//!   placed at the side's per-frame centroid (zero spread after centering)
//! - Sides with no active players, or more than 11, cannot form a window

use std::collections::BTreeMap;

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use super::phase::Phase;
use crate::config::SegmentationConfig;
use crate::formation::SLOTS;
use crate::tracking::{Team, TrackingFrame, TrackingTable};

/// Possession role of a side within a window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Offensive,
    Defensive,
}

/// Who fills a slot. Display only; distances never look at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotOccupant {
    Player(u32),
    Phantom,
}

/// One team's share of a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideWindow {
    pub team: Team,
    pub role: Role,
    pub occupants: [SlotOccupant; SLOTS],
    /// Per-frame slot coordinates, one row per window frame
    pub coords: Vec<[Vector2<f64>; SLOTS]>,
}

impl SideWindow {
    pub fn phantom_count(&self) -> usize {
        self.occupants
            .iter()
            .filter(|o| matches!(o, SlotOccupant::Phantom))
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub id: usize,
    /// Team in possession throughout the window
    pub owner: Team,
    /// Frame indices into the tracking table, ascending
    pub frames: Vec<usize>,
    pub offensive: SideWindow,
    pub defensive: SideWindow,
}

impl Window {
    pub fn side(&self, team: Team) -> &SideWindow {
        if self.owner == team {
            &self.offensive
        } else {
            &self.defensive
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn duration_secs(&self, frame_rate_hz: f64) -> f64 {
        self.frames.len() as f64 / frame_rate_hz
    }
}

#[derive(Debug, Clone, Default)]
pub struct WindowBuilder {
    config: SegmentationConfig,
}

impl WindowBuilder {
    pub fn new(config: SegmentationConfig) -> Self {
        Self { config }
    }

    /// Windows ordered by first frame, ids assigned in that order.
    pub fn build(&self, table: &TrackingTable, phases: &[Phase]) -> Vec<Window> {
        let rate = table.frame_rate_hz;
        let window_frames = self.config.window_frames(rate);
        let min_frames = self.config.min_window_frames(rate);

        let mut chunks: Vec<(Team, Vec<usize>)> = Vec::new();
        for (owner, frames) in self.owned_runs(phases) {
            chunks.extend(
                chunk_run(&frames, window_frames, min_frames)
                    .into_iter()
                    .map(|chunk| (owner, chunk)),
            );
        }
        chunks.sort_by_key(|(_, frames)| frames[0]);

        let mut windows = Vec::with_capacity(chunks.len());
        for (owner, frames) in chunks {
            let offensive = side_window(table, &frames, owner, Role::Offensive);
            let defensive = side_window(table, &frames, owner.opponent(), Role::Defensive);
            if let (Some(offensive), Some(defensive)) = (offensive, defensive) {
                windows.push(Window {
                    id: windows.len(),
                    owner,
                    frames,
                    offensive,
                    defensive,
                });
            }
        }
        log::debug!("built {} windows from {} phases", windows.len(), phases.len());
        windows
    }

    /// Frame runs to be chunked: one per owned phase, or with pooling one per
    /// (roster segment, owner).
    fn owned_runs(&self, phases: &[Phase]) -> Vec<(Team, Vec<usize>)> {
        let owned = phases.iter().filter_map(|p| p.owner.map(|owner| (owner, p)));
        if !self.config.pool_phases {
            return owned.map(|(owner, p)| (owner, p.frames().collect())).collect();
        }

        let mut pooled: BTreeMap<(usize, Team), Vec<usize>> = BTreeMap::new();
        for (owner, phase) in owned {
            pooled
                .entry((phase.segment, owner))
                .or_default()
                .extend(phase.frames());
        }
        pooled
            .into_iter()
            .map(|((_, owner), frames)| (owner, frames))
            .collect()
    }
}

/// Consecutive chunks of at most `window_frames`; a chunk survives only if
/// strictly more than `min_frames` frames remain from its start.
fn chunk_run(frames: &[usize], window_frames: usize, min_frames: usize) -> Vec<Vec<usize>> {
    (0..frames.len())
        .step_by(window_frames)
        .filter(|&i| frames.len() - i > min_frames)
        .map(|i| frames[i..(i + window_frames).min(frames.len())].to_vec())
        .collect()
}

fn side_window(
    table: &TrackingTable,
    frames: &[usize],
    team: Team,
    role: Role,
) -> Option<SideWindow> {
    let first = &table.frames[frames[0]];
    let roster = first.active_roster(team);

    // ids are assigned only to kept windows, so log by first frame
    if roster.is_empty() || roster.len() > SLOTS {
        log::warn!(
            "window at frame {}: team {} has {} active players, skipping window",
            frames[0],
            team.number(),
            roster.len()
        );
        return None;
    }
    if roster.len() < SLOTS {
        log::warn!(
            "window at frame {}: team {} has {} active players, padding {} phantom slot(s)",
            frames[0],
            team.number(),
            roster.len(),
            SLOTS - roster.len()
        );
    }

    let mut occupants = [SlotOccupant::Phantom; SLOTS];
    for (slot, &id) in roster.iter().enumerate() {
        occupants[slot] = SlotOccupant::Player(id);
    }

    let coords = frames
        .iter()
        .map(|&i| slot_coords(&table.frames[i], team, &occupants))
        .collect();

    Some(SideWindow {
        team,
        role,
        occupants,
        coords,
    })
}

fn slot_coords(
    frame: &TrackingFrame,
    team: Team,
    occupants: &[SlotOccupant; SLOTS],
) -> [Vector2<f64>; SLOTS] {
    let centroid = frame.team_centroid(team).unwrap_or_else(Vector2::zeros);
    let mut row = [centroid; SLOTS];
    for (slot, occupant) in occupants.iter().enumerate() {
        if let SlotOccupant::Player(id) = occupant {
            // the roster is fixed within a window, so the player is present
            if let Some(sample) = frame.player(*id) {
                row[slot] = sample.position();
            }
        }
    }
    row
}
