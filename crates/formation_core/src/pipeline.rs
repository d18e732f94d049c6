//! # Formation Pipeline
//!
//! Runs a whole match through the stages:
//!
//! ```text
//! TrackingTable -> orientation -> phases -> windows -> formations
//!               -> distance matrix -> clustering (per group)
//! ```
//!
//! Each window contributes one offensive formation (the team in possession)
//! and one defensive formation (the other team). Formations are pooled into
//! four groups, team x role, and each group is clustered independently.

use std::fmt;

use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cluster::{preferred_k, ClusterEngine, ClusterOutcome};
use crate::config::PipelineConfig;
use crate::error::{FormationError, Result};
use crate::formation::{DistanceMatrix, DistanceMatrixBuilder, DistanceSolver, Formation, SLOTS};
use crate::segment::{PhaseSegmenter, Role, SlotOccupant, Window, WindowBuilder};
use crate::tracking::{normalize_orientation, Team, TrackingTable};

/// One of the four formation pools of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Group {
    pub team: Team,
    pub role: Role,
}

impl Group {
    pub const ALL: [Group; 4] = [
        Group::new(Team::Home, Role::Offensive),
        Group::new(Team::Home, Role::Defensive),
        Group::new(Team::Away, Role::Offensive),
        Group::new(Team::Away, Role::Defensive),
    ];

    pub const fn new(team: Team, role: Role) -> Self {
        Self { team, role }
    }

    /// `team_1_offensive`, `team_2_defensive`, ...
    pub fn name(&self) -> String {
        let role = match self.role {
            Role::Offensive => "offensive",
            Role::Defensive => "defensive",
        };
        format!("team_{}_{}", self.team.number(), role)
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupReport {
    pub group: Group,
    /// Source window of each formation, in formation order
    pub window_ids: Vec<usize>,
    /// Who filled each slot, per formation
    pub occupants: Vec<[SlotOccupant; SLOTS]>,
    pub formations: Vec<Formation>,
    pub distances: DistanceMatrix,
    pub outcome: ClusterOutcome,
}

impl GroupReport {
    pub fn len(&self) -> usize {
        self.formations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formations.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub frame_rate_hz: f64,
    pub frames: usize,
    pub windows: usize,
    /// In [`Group::ALL`] order
    pub groups: Vec<GroupReport>,
    /// Cluster count with the best mean silhouette across groups
    pub preferred_k: Option<usize>,
}

impl MatchReport {
    pub fn group(&self, group: Group) -> Option<&GroupReport> {
        self.groups.iter().find(|g| g.group == group)
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

/// Formations of one group, before distances
struct GroupInput {
    group: Group,
    window_ids: Vec<usize>,
    occupants: Vec<[SlotOccupant; SLOTS]>,
    formations: Vec<Formation>,
}

#[derive(Debug, Clone, Default)]
pub struct FormationPipeline {
    config: PipelineConfig,
}

impl FormationPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn run(&self, table: &TrackingTable) -> Result<MatchReport> {
        self.config.validate()?;
        let rate = table.frame_rate_hz;
        if !(rate.is_finite() && rate > 0.0) {
            return Err(FormationError::InvalidFrameRate(rate));
        }

        let normalized;
        let table = if self.config.normalize_orientation {
            normalized = normalize_orientation(table);
            &normalized
        } else {
            table
        };

        let phases = PhaseSegmenter::new(self.config.segmentation.clone()).segment(table);
        let windows = WindowBuilder::new(self.config.segmentation.clone()).build(table, &phases);
        info!(
            "Segmented {} frames into {} phases and {} windows",
            table.len(),
            phases.len(),
            windows.len()
        );

        let inputs = Group::ALL
            .iter()
            .map(|&group| collect_group(group, &windows))
            .collect::<Result<Vec<_>>>()?;

        let builder = DistanceMatrixBuilder::new(DistanceSolver::new(self.config.distance.clone()));
        let engine = ClusterEngine::new(self.config.clustering.clone());

        let groups = inputs
            .into_par_iter()
            .map(|input| {
                let distances = builder.build(&input.formations);
                let outcome = engine.cluster(&input.formations, &distances)?;
                match outcome.clustering() {
                    Some(c) => debug!(
                        "{}: {} formations, k = {}, sizes {:?}",
                        input.group,
                        input.formations.len(),
                        c.k,
                        c.assignment.sizes()
                    ),
                    None => debug!(
                        "{}: {} formations, not clustered",
                        input.group,
                        input.formations.len()
                    ),
                }
                Ok(GroupReport {
                    group: input.group,
                    window_ids: input.window_ids,
                    occupants: input.occupants,
                    formations: input.formations,
                    distances,
                    outcome,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let preferred_k = preferred_k(groups.iter().map(|g| &g.outcome));
        info!("Clustered {} groups, preferred k = {:?}", groups.len(), preferred_k);

        Ok(MatchReport {
            frame_rate_hz: table.frame_rate_hz,
            frames: table.len(),
            windows: windows.len(),
            groups,
            preferred_k,
        })
    }
}

fn collect_group(group: Group, windows: &[Window]) -> Result<GroupInput> {
    let mut input = GroupInput {
        group,
        window_ids: Vec::with_capacity(windows.len()),
        occupants: Vec::with_capacity(windows.len()),
        formations: Vec::with_capacity(windows.len()),
    };
    for window in windows {
        let side = window.side(group.team);
        if side.role != group.role {
            continue;
        }
        input.formations.push(Formation::from_window(side)?);
        input.window_ids.push(window.id);
        input.occupants.push(side.occupants);
    }
    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::{PlayerSample, TrackingFrame};

    const RATE: f64 = 25.0;

    /// Home players sit in a 4-4-2 on their own half, away players mirror them.
    fn players(home: usize, away: usize, t: usize) -> Vec<PlayerSample> {
        let shape = [
            (-45.0, 0.0),
            (-30.0, -25.0),
            (-32.0, -8.0),
            (-32.0, 8.0),
            (-30.0, 25.0),
            (-15.0, -22.0),
            (-17.0, -7.0),
            (-17.0, 7.0),
            (-15.0, 22.0),
            (-5.0, -6.0),
            (-5.0, 6.0),
        ];
        let wobble = (t as f64 * 0.05).sin();
        let home_players = shape.iter().take(home).enumerate().map(|(k, &(x, y))| PlayerSample {
            id: k as u32 + 1,
            team: Team::Home,
            x: x + wobble,
            y: y + 0.5 * wobble * (k % 3) as f64,
            active: true,
        });
        let away_players = shape.iter().take(away).enumerate().map(|(k, &(x, y))| PlayerSample {
            id: k as u32 + 101,
            team: Team::Away,
            x: -x - wobble,
            y: -y,
            active: true,
        });
        home_players.chain(away_players).collect()
    }

    fn match_table(n: usize, home: usize, away: usize, switch_at: usize) -> TrackingTable {
        let frames = (0..n)
            .map(|i| TrackingFrame {
                timestamp_ms: i as u64 * 40,
                half: 1,
                players: players(home, away, i),
                ball: None,
                possession: Some(if i < switch_at { Team::Home } else { Team::Away }),
            })
            .collect();
        TrackingTable::new(RATE, frames)
    }

    #[test]
    fn test_group_names() {
        let names: Vec<String> = Group::ALL.iter().map(Group::name).collect();
        assert_eq!(
            names,
            vec!["team_1_offensive", "team_1_defensive", "team_2_offensive", "team_2_defensive"]
        );
    }

    #[test]
    fn test_one_possession_change_yields_two_windows() {
        let table = match_table(3000, 11, 11, 1500);
        let report = FormationPipeline::default().run(&table).unwrap();

        assert_eq!(report.windows, 2);
        assert_eq!(report.frames, 3000);
        assert_eq!(report.preferred_k, None);

        // each team is offensive once and defensive once
        for group in Group::ALL {
            let g = report.group(group).unwrap();
            assert_eq!(g.len(), 1, "{group}");
            assert_eq!(g.outcome, ClusterOutcome::Empty);
            assert!(g.formations[0].centroid().norm() < 1e-9);
        }

        let home = report.group(Group::new(Team::Home, Role::Offensive)).unwrap();
        assert_eq!(home.window_ids, vec![0]);
        assert_eq!(home.occupants[0][0], SlotOccupant::Player(1));

        // pooled across roles, the home team's two formations are near-identical
        let home_def = report.group(Group::new(Team::Home, Role::Defensive)).unwrap();
        let formations = vec![home.formations[0].clone(), home_def.formations[0].clone()];
        let m = DistanceMatrixBuilder::default().build(&formations);
        assert_eq!(m.len(), 2);
        assert!(m.is_symmetric());
        assert_eq!(m.distance(0, 0), 0.0);
        assert!(m.distance(0, 1) < 1.0);
    }

    #[test]
    fn test_ten_player_team_is_padded() {
        let table = match_table(3000, 11, 10, 1500);
        let report = FormationPipeline::default().run(&table).unwrap();
        assert_eq!(report.windows, 2);

        let away = report.group(Group::new(Team::Away, Role::Defensive)).unwrap();
        assert_eq!(away.len(), 1);
        let occupants = &away.occupants[0];
        assert_eq!(
            occupants.iter().filter(|o| **o == SlotOccupant::Phantom).count(),
            1
        );
        // the phantom sits on the centroid, so its mean is at the origin
        assert!(away.formations[0].means[10].norm() < 1e-9);
        assert!(away.formations[0].covariances[10].norm() < 1e-9);
    }

    #[test]
    fn test_padded_formations_are_clustered() {
        // alternate possession every 40s: 6 windows, the away side fields 10
        let frames = (0..6 * 1000)
            .map(|i| TrackingFrame {
                timestamp_ms: i as u64 * 40,
                half: 1,
                players: players(11, 10, i),
                ball: None,
                possession: Some(if (i / 1000) % 2 == 0 { Team::Home } else { Team::Away }),
            })
            .collect();
        let table = TrackingTable::new(RATE, frames);
        let report = FormationPipeline::default().run(&table).unwrap();
        assert_eq!(report.windows, 6);

        let away = [
            Group::new(Team::Away, Role::Offensive),
            Group::new(Team::Away, Role::Defensive),
        ];
        for group in away {
            let g = report.group(group).unwrap();
            assert_eq!(g.len(), 3, "{group}");
            assert!(g
                .occupants
                .iter()
                .all(|o| o.iter().filter(|s| **s == SlotOccupant::Phantom).count() == 1));
        }

        for g in &report.groups {
            assert!(g.distances.is_symmetric(), "{}", g.group);
            assert!(g.distances.condensed().iter().all(|d| d.is_finite() && *d >= 0.0));

            let clustering = g.outcome.clustering().unwrap();
            assert_eq!(clustering.k, 2, "{}", g.group);
            assert_eq!(clustering.assignment.sizes().iter().sum::<usize>(), 3);
            assert_eq!(clustering.prototypes.len(), 2);
            for proto in &clustering.prototypes {
                assert_eq!(proto.means.len(), SLOTS);
                assert_eq!(proto.covariances.len(), SLOTS);
                assert!(proto.means.iter().all(|m| m.x.is_finite() && m.y.is_finite()));
            }
        }
    }

    #[test]
    fn test_frame_rate_must_be_positive() {
        let mut table = match_table(100, 11, 11, 50);
        for rate in [0.0, -25.0, f64::NAN, f64::INFINITY] {
            table.frame_rate_hz = rate;
            let err = FormationPipeline::default().run(&table).unwrap_err();
            assert!(matches!(err, FormationError::InvalidFrameRate(_)), "{rate}");
        }
    }

    #[test]
    fn test_many_windows_are_clustered() {
        // alternate possession every 40s: 10 windows, 5 per owner
        let n = 10 * 1000;
        let frames = (0..n)
            .map(|i| TrackingFrame {
                timestamp_ms: i as u64 * 40,
                half: 1,
                players: players(11, 11, i),
                ball: None,
                possession: Some(if (i / 1000) % 2 == 0 { Team::Home } else { Team::Away }),
            })
            .collect();
        let table = TrackingTable::new(RATE, frames);
        let report = FormationPipeline::default().run(&table).unwrap();

        assert_eq!(report.windows, 10);
        for g in &report.groups {
            assert_eq!(g.len(), 5);
            assert!(g.distances.is_symmetric());
            let clustering = g.outcome.clustering().unwrap();
            assert!([2, 3, 4].contains(&clustering.k));
            assert_eq!(clustering.assignment.sizes().iter().sum::<usize>(), 5);
        }
        assert!(report.preferred_k.is_some());
    }

    #[test]
    fn test_empty_table() {
        let table = TrackingTable::new(RATE, Vec::new());
        let report = FormationPipeline::default().run(&table).unwrap();
        assert_eq!(report.windows, 0);
        assert_eq!(report.groups.len(), 4);
        assert!(report.groups.iter().all(|g| g.is_empty()));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = PipelineConfig::default();
        config.clustering.candidate_ks.clear();
        let table = match_table(100, 11, 11, 50);
        assert!(FormationPipeline::new(config).run(&table).is_err());
    }

    #[test]
    fn test_report_serializes() {
        let table = match_table(3000, 11, 11, 1500);
        let report = FormationPipeline::default().run(&table).unwrap();
        let json = report.to_json(false).unwrap();
        let back: MatchReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.windows, report.windows);
        assert_eq!(back.groups.len(), 4);
    }
}
