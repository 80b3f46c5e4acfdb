#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Range validation for movement and attack paths.
//!
//! Ranges are measured in path steps as returned by the pathfinder, never in
//! straight-line distance.

use tactics_sandbox_core::{Tile, Unit};

/// Action a path is being validated for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// The unit walks along the path.
    Move,
    /// An attack travels along the path.
    Attack,
}

impl ActionKind {
    /// Classifies a selection by whether it targets the enemy.
    #[must_use]
    pub const fn for_target(is_attack: bool) -> Self {
        if is_attack {
            Self::Attack
        } else {
            Self::Move
        }
    }
}

/// Range limit the unit has for the provided action.
#[must_use]
pub const fn range_limit(unit: &Unit, kind: ActionKind) -> u32 {
    match kind {
        ActionKind::Move => unit.move_range(),
        ActionKind::Attack => unit.attack_range(),
    }
}

/// Partition of a path into the steps within range and the steps beyond it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RangeSplit {
    /// Leading tiles that fall within the range limit.
    pub in_range: Vec<Tile>,
    /// Remaining tiles beyond the range limit.
    pub out_of_range: Vec<Tile>,
}

impl RangeSplit {
    /// Reports whether every tile of the path is within range.
    #[must_use]
    pub fn fully_in_range(&self) -> bool {
        self.out_of_range.is_empty()
    }
}

/// Splits `path` after its first `min(range_limit, path.len())` tiles.
#[must_use]
pub fn split(path: &[Tile], range_limit: u32) -> RangeSplit {
    let cut = usize::try_from(range_limit)
        .unwrap_or(usize::MAX)
        .min(path.len());
    let (in_range, out_of_range) = path.split_at(cut);
    RangeSplit {
        in_range: in_range.to_vec(),
        out_of_range: out_of_range.to_vec(),
    }
}

/// Reports whether the whole path fits within `range_limit` steps.
#[must_use]
pub fn is_reachable(path: &[Tile], range_limit: u32) -> bool {
    u64::try_from(path.len()).is_ok_and(|steps| steps <= u64::from(range_limit))
}
