//! Playing-direction normalization.
//!
//! Teams swap ends at half time, and the two teams always face opposite
//! ways. Shapes are only comparable once every team attacks the same way,
//! so each team is rotated by 180 degrees in the halves where it attacks
//! towards -x. Rotation (not mirroring) keeps left-sided players on the left
//! relative to the attacking direction.

use std::collections::HashMap;

use super::{Team, TrackingFrame, TrackingTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackDirection {
    /// Attacking the goal at +x
    Positive,
    /// Attacking the goal at -x
    Negative,
}

/// Attack direction of the home team per half, judged from the first frame
/// of each half: the team whose deepest player (the goalkeeper) sits at the
/// lower x defends the -x goal.
///
/// Halves where either team has no active players in that frame are omitted.
pub fn attack_directions(table: &TrackingTable) -> HashMap<u8, AttackDirection> {
    let mut directions = HashMap::new();
    for half in table.halves() {
        let Some(first) = table.frames.iter().find(|f| f.half == half) else {
            continue;
        };
        let (Some(home_deepest), Some(away_deepest)) =
            (deepest_x(first, Team::Home), deepest_x(first, Team::Away))
        else {
            log::warn!("half {}: cannot infer playing direction, leaving as is", half);
            continue;
        };
        let home = if home_deepest <= away_deepest {
            AttackDirection::Positive
        } else {
            AttackDirection::Negative
        };
        directions.insert(half, home);
    }
    directions
}

fn deepest_x(frame: &TrackingFrame, team: Team) -> Option<f64> {
    frame
        .active_players(team)
        .map(|p| p.x)
        .fold(None, |acc: Option<f64>, x| Some(acc.map_or(x, |a| a.min(x))))
}

/// Copy of `table` in which both teams attack towards +x in every half.
pub fn normalize_orientation(table: &TrackingTable) -> TrackingTable {
    let directions = attack_directions(table);
    let mut normalized = table.clone();

    for frame in &mut normalized.frames {
        let Some(&home_direction) = directions.get(&frame.half) else {
            continue;
        };
        let flipped = match home_direction {
            AttackDirection::Positive => Team::Away,
            AttackDirection::Negative => Team::Home,
        };
        for player in frame.players.iter_mut().filter(|p| p.team == flipped) {
            player.x = -player.x;
            player.y = -player.y;
        }
    }
    normalized
}
