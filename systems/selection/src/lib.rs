#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Selection state machine that turns cell clicks into confirmed moves and attacks.
//!
//! The first click on a cell computes a path and exposes it; clicking the same
//! cell again confirms the move or attack if the path fits the relevant range.
//! Clicking elsewhere starts over, and any terrain edit, regeneration or unit
//! relocation discards the pending selection because the stored path may no
//! longer match the grid.

use tactics_sandbox_core::{
    CellCoord, Command, Event, PassableSet, Path, PathOutcome, TerrainView, Unit,
};
use tactics_sandbox_system_pathfinding::find_path;
use tactics_sandbox_system_range::{is_reachable, range_limit, split, ActionKind, RangeSplit};
use tactics_sandbox_world::cycle_type;

/// Observable outcomes of selection intents, consumed by presentation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionEvent {
    /// A first click computed (or failed to find) a path to the target.
    PathComputed {
        /// Cell that was selected.
        target: CellCoord,
        /// Search result for the selection.
        outcome: PathOutcome,
        /// Partition of the path against the applicable range; empty without a path.
        split: RangeSplit,
        /// Whether the target is the enemy's cell.
        is_attack: bool,
    },
    /// The player confirmed a move whose path fits the move range.
    MoveConfirmed {
        /// Path the player walks.
        path: Path,
    },
    /// The player confirmed an attack whose path fits the attack range.
    AttackConfirmed {
        /// Path the attack travels.
        path: Path,
    },
    /// Confirmation failed because the path is longer than the applicable range.
    RangeExceeded {
        /// Cell that was selected.
        target: CellCoord,
        /// Number of steps the path takes.
        path_length: usize,
        /// Range the path was checked against.
        range_limit: u32,
        /// Whether the target is the enemy's cell.
        is_attack: bool,
    },
    /// Confirmation failed because no path leads to the target.
    Unreachable {
        /// Cell that was selected.
        target: CellCoord,
        /// Whether the target is the enemy's cell.
        is_attack: bool,
    },
}

/// Selection awaiting a confirming second click.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingTarget {
    /// Cell that was selected.
    pub target: CellCoord,
    /// Search result computed on the first click.
    pub outcome: PathOutcome,
    /// Whether the target is the enemy's cell.
    pub is_attack: bool,
}

/// Current state of the selection state machine.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SelectionState {
    /// No selection is pending.
    #[default]
    Idle,
    /// A target was selected once and awaits confirmation.
    TargetPending(PendingTarget),
}

/// Pure system that sequences selection, confirmation and invalidation.
#[derive(Clone, Debug, Default)]
pub struct SelectionController {
    state: SelectionState,
}

impl SelectionController {
    /// Creates a controller with no pending selection.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: SelectionState::Idle,
        }
    }

    /// Current state of the controller.
    #[must_use]
    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    /// Consumes world events, discarding the pending selection whenever the
    /// grid or a unit changed underneath it.
    pub fn handle(&mut self, events: &[Event]) {
        let invalidated = events.iter().any(|event| {
            matches!(
                event,
                Event::GridGenerated { .. }
                    | Event::TerrainChanged { .. }
                    | Event::UnitRelocated { .. }
            )
        });
        if invalidated {
            self.reset();
        }
    }

    /// Handles a click on `target`.
    ///
    /// Cells outside the grid are ignored. A second click on the pending
    /// target attempts confirmation; any other click computes a fresh path,
    /// treating the click as an attack when `target` is the enemy's cell.
    pub fn select_cell(
        &mut self,
        target: CellCoord,
        view: TerrainView<'_>,
        player: &Unit,
        enemy_cell: CellCoord,
        out: &mut Vec<SelectionEvent>,
    ) {
        if !view.contains(target) {
            tracing::trace!(%target, "ignoring selection outside the grid");
            return;
        }

        if matches!(&self.state, SelectionState::TargetPending(pending) if pending.target == target)
        {
            if let SelectionState::TargetPending(pending) =
                std::mem::replace(&mut self.state, SelectionState::Idle)
            {
                confirm(pending, player, out);
            }
            return;
        }

        let is_attack = target == enemy_cell;
        let passable = if is_attack {
            PassableSet::attack()
        } else {
            PassableSet::movement()
        };

        let outcome = match find_path(view, player.cell(), target, passable) {
            Ok(outcome) => outcome,
            Err(error) => {
                tracing::warn!(%error, "selection ignored");
                self.reset();
                return;
            }
        };

        let limit = range_limit(player, ActionKind::for_target(is_attack));
        let split = outcome
            .path()
            .map(|path| split(path.tiles(), limit))
            .unwrap_or_default();

        out.push(SelectionEvent::PathComputed {
            target,
            outcome: outcome.clone(),
            split,
            is_attack,
        });
        self.state = SelectionState::TargetPending(PendingTarget {
            target,
            outcome,
            is_attack,
        });
    }

    /// Handles a terrain edit on `cell` by requesting the next terrain in the rotation.
    ///
    /// Cells outside the grid are ignored; otherwise the pending selection is discarded.
    pub fn edit_terrain(&mut self, cell: CellCoord, view: TerrainView<'_>, out: &mut Vec<Command>) {
        let Some(current) = view.terrain(cell) else {
            return;
        };

        self.reset();
        out.push(Command::SetTile {
            cell,
            terrain: cycle_type(current),
        });
    }

    /// Discards the pending selection after a unit moved.
    pub fn unit_relocated(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.state = SelectionState::Idle;
    }
}

fn confirm(pending: PendingTarget, player: &Unit, out: &mut Vec<SelectionEvent>) {
    let PendingTarget {
        target,
        outcome,
        is_attack,
    } = pending;

    let path = match outcome {
        PathOutcome::Found(path) if !path.is_empty() => path,
        _ => {
            tracing::debug!(%target, "nothing to confirm");
            out.push(SelectionEvent::Unreachable { target, is_attack });
            return;
        }
    };

    let kind = ActionKind::for_target(is_attack);
    let limit = range_limit(player, kind);
    if !is_reachable(path.tiles(), limit) {
        tracing::debug!(%target, steps = path.len(), limit, "path exceeds range");
        out.push(SelectionEvent::RangeExceeded {
            target,
            path_length: path.len(),
            range_limit: limit,
            is_attack,
        });
        return;
    }

    tracing::debug!(%target, steps = path.len(), ?kind, "selection confirmed");
    out.push(match kind {
        ActionKind::Move => SelectionEvent::MoveConfirmed { path },
        ActionKind::Attack => SelectionEvent::AttackConfirmed { path },
    });
}
