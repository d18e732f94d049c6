//! # Phase Segmenter
//!
//! Splits the frame timeline into possession-coherent phases.
//!
//! ## Algorithm
//! 1. A boundary falls before frame `i` when the possession owner changes,
//!    either team's active roster changes, or frame `i` follows a break
//!    (half index change or a timestamp gap wider than the break threshold)
//! 2. Roster changes and breaks also open a new roster segment
//! 3. The final frame always closes the running phase
//! 4. Phases shorter than `min_phase_secs` are dropped, not merged

use serde::{Deserialize, Serialize};

use crate::config::SegmentationConfig;
use crate::tracking::{Team, TrackingFrame, TrackingTable};

/// Contiguous run of frames `[start, end)` with one possession owner and a
/// stable active roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub start: usize,
    pub end: usize,
    pub owner: Option<Team>,
    /// Phases separated only by possession changes share a segment
    pub segment: usize,
}

impl Phase {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn frames(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

/// Why a new phase starts at a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    None,
    Possession,
    Roster,
    Break,
}

#[derive(Debug, Clone, Default)]
pub struct PhaseSegmenter {
    config: SegmentationConfig,
}

impl PhaseSegmenter {
    pub fn new(config: SegmentationConfig) -> Self {
        Self { config }
    }

    /// Phases that survive the minimum-duration filter, in timeline order.
    pub fn segment(&self, table: &TrackingTable) -> Vec<Phase> {
        let all = self.segment_all(table);
        let min_frames = self.config.min_phase_frames(table.frame_rate_hz);
        let total = all.len();
        let kept: Vec<Phase> = all.into_iter().filter(|p| p.len() >= min_frames).collect();
        log::debug!(
            "segmented {} frames into {} phases, {} shorter than {} frames dropped",
            table.len(),
            total,
            total - kept.len(),
            min_frames
        );
        kept
    }

    /// Every phase, including the short ones.
    pub fn segment_all(&self, table: &TrackingTable) -> Vec<Phase> {
        let frames = &table.frames;
        if frames.is_empty() {
            return Vec::new();
        }
        let max_gap_ms = self.config.max_frame_gap_ms(table.frame_rate_hz);

        let mut phases = Vec::new();
        let mut start = 0;
        let mut segment = 0;
        let mut prev_rosters = rosters(&frames[0]);

        for i in 1..frames.len() {
            let rosters_now = rosters(&frames[i]);
            let boundary = classify(&frames[i - 1], &frames[i], &prev_rosters, &rosters_now, max_gap_ms);
            prev_rosters = rosters_now;

            if boundary == Boundary::None {
                continue;
            }
            phases.push(Phase {
                start,
                end: i,
                owner: frames[start].possession,
                segment,
            });
            if matches!(boundary, Boundary::Roster | Boundary::Break) {
                segment += 1;
            }
            start = i;
        }

        // final frame flushes the running phase
        phases.push(Phase {
            start,
            end: frames.len(),
            owner: frames[start].possession,
            segment,
        });
        phases
    }
}

fn rosters(frame: &TrackingFrame) -> [Vec<u32>; 2] {
    [frame.active_roster(Team::Home), frame.active_roster(Team::Away)]
}

fn classify(
    prev: &TrackingFrame,
    cur: &TrackingFrame,
    prev_rosters: &[Vec<u32>; 2],
    cur_rosters: &[Vec<u32>; 2],
    max_gap_ms: f64,
) -> Boundary {
    let gap_ms = cur.timestamp_ms.saturating_sub(prev.timestamp_ms) as f64;
    if cur.half != prev.half || gap_ms > max_gap_ms {
        Boundary::Break
    } else if prev_rosters != cur_rosters {
        Boundary::Roster
    } else if prev.possession != cur.possession {
        Boundary::Possession
    } else {
        Boundary::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::PlayerSample;

    const RATE: f64 = 25.0;

    fn frame(i: usize, half: u8, possession: Option<Team>, away_active: bool) -> TrackingFrame {
        TrackingFrame {
            timestamp_ms: i as u64 * 40,
            half,
            players: vec![
                PlayerSample {
                    id: 1,
                    team: Team::Home,
                    x: 0.0,
                    y: 0.0,
                    active: true,
                },
                PlayerSample {
                    id: 2,
                    team: Team::Away,
                    x: 1.0,
                    y: 1.0,
                    active: away_active,
                },
            ],
            ball: None,
            possession,
        }
    }

    fn table_from(frames: Vec<TrackingFrame>) -> TrackingTable {
        TrackingTable::new(RATE, frames)
    }

    #[test]
    fn test_possession_change_splits_phase() {
        let frames = (0..400)
            .map(|i| frame(i, 1, Some(if i < 200 { Team::Home } else { Team::Away }), true))
            .collect();
        let phases = PhaseSegmenter::default().segment(&table_from(frames));

        assert_eq!(phases.len(), 2);
        assert_eq!((phases[0].start, phases[0].end), (0, 200));
        assert_eq!(phases[0].owner, Some(Team::Home));
        assert_eq!((phases[1].start, phases[1].end), (200, 400));
        assert_eq!(phases[1].owner, Some(Team::Away));
        assert_eq!(phases[0].segment, phases[1].segment);
    }

    #[test]
    fn test_short_phases_are_dropped_not_merged() {
        // 100 frames (4s) of away possession between two long home phases
        let frames = (0..500)
            .map(|i| {
                let owner = if (200..300).contains(&i) { Team::Away } else { Team::Home };
                frame(i, 1, Some(owner), true)
            })
            .collect();
        let phases = PhaseSegmenter::default().segment(&table_from(frames));

        assert_eq!(phases.len(), 2);
        assert_eq!(phases[0].end, 200);
        assert_eq!(phases[1].start, 300);
    }

    #[test]
    fn test_roster_change_opens_new_segment() {
        // Away player goes inactive at frame 300 (substitution / dropout)
        let frames = (0..600)
            .map(|i| frame(i, 1, Some(Team::Home), i < 300))
            .collect();
        let phases = PhaseSegmenter::default().segment(&table_from(frames));

        assert_eq!(phases.len(), 2);
        assert_eq!(phases[0].end, 300);
        assert_eq!(phases[1].start, 300);
        assert_eq!(phases[1].segment, phases[0].segment + 1);
    }

    #[test]
    fn test_half_break_and_time_gap_are_boundaries() {
        let mut frames: Vec<TrackingFrame> = (0..600)
            .map(|i| frame(i, if i < 300 { 1 } else { 2 }, Some(Team::Home), true))
            .collect();
        // 2s hole in the middle of the second half
        for f in frames.iter_mut().skip(450) {
            f.timestamp_ms += 2000;
        }
        let phases = PhaseSegmenter::default().segment(&table_from(frames));

        let bounds: Vec<(usize, usize)> = phases.iter().map(|p| (p.start, p.end)).collect();
        assert_eq!(bounds, vec![(0, 300), (300, 450), (450, 600)]);
        assert_eq!(phases[2].segment, 2);
    }

    #[test]
    fn test_final_frame_flushes_and_contested_phases_are_kept() {
        let frames = (0..300).map(|i| frame(i, 1, None, true)).collect();
        let phases = PhaseSegmenter::default().segment(&table_from(frames));
        assert_eq!(phases.len(), 1);
        assert_eq!(phases[0].owner, None);
        assert_eq!(phases[0].len(), 300);
    }

    #[test]
    fn test_empty_table() {
        let phases = PhaseSegmenter::default().segment(&table_from(vec![]));
        assert!(phases.is_empty());
    }
}
