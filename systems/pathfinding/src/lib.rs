#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! A* shortest-path search over typed terrain.
//!
//! Every orthogonal step costs one and the heuristic is the Manhattan distance
//! to the destination, which is consistent for this cost model: the first time
//! a coordinate is expanded its accumulated cost is optimal. Frontier entries
//! are ordered by ascending `f`, with ties expanded in the order they were
//! pushed. Relaxed nodes are pushed again instead of being updated in place;
//! the closed set turns the stale duplicates into no-ops.

use std::{cmp::Ordering, collections::BinaryHeap};

use tactics_sandbox_core::{
    CellCoord, GridSize, OutOfBounds, PassableSet, Path, PathOutcome, TerrainView,
};

/// Computes a shortest walkable path from `start` to `end`.
///
/// Only cells whose terrain is in `passable` may be entered; the terrain of
/// `start` itself is never checked. The returned path excludes `start` and
/// includes `end`, so `start == end` yields an empty path. Running out of
/// frontier is reported as [`PathOutcome::NoPath`], while endpoints outside
/// the grid fail with [`OutOfBounds`].
pub fn find_path(
    view: TerrainView<'_>,
    start: CellCoord,
    end: CellCoord,
    passable: PassableSet,
) -> Result<PathOutcome, OutOfBounds> {
    let size = view.size();
    for endpoint in [start, end] {
        if !size.contains(endpoint) {
            return Err(OutOfBounds {
                cell: endpoint,
                size,
            });
        }
    }

    let outcome = Search::new(view, end).run(start, passable);
    tracing::debug!(
        %start,
        %end,
        steps = outcome.path().map(Path::len),
        "path search finished"
    );
    Ok(outcome)
}

#[derive(Clone, Copy, Debug, Default)]
struct SearchNode {
    g: u32,
    f: u32,
    parent: Option<CellCoord>,
    discovered: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct OpenEntry {
    f: u32,
    sequence: u64,
    cell: CellCoord,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

struct Search<'a> {
    view: TerrainView<'a>,
    end: CellCoord,
    arena: Vec<SearchNode>,
    closed: Vec<bool>,
    open: BinaryHeap<OpenEntry>,
    next_sequence: u64,
}

impl<'a> Search<'a> {
    fn new(view: TerrainView<'a>, end: CellCoord) -> Self {
        let cell_count = view.size().cell_count();
        Self {
            view,
            end,
            arena: vec![SearchNode::default(); cell_count],
            closed: vec![false; cell_count],
            open: BinaryHeap::new(),
            next_sequence: 0,
        }
    }

    fn run(mut self, start: CellCoord, passable: PassableSet) -> PathOutcome {
        let size = self.view.size();
        let Some(start_index) = size.index(start) else {
            return PathOutcome::NoPath;
        };
        let start_f = start.manhattan_distance(self.end);
        self.arena[start_index] = SearchNode {
            g: 0,
            f: start_f,
            parent: None,
            discovered: true,
        };
        self.push(start, start_f);

        while let Some(entry) = self.open.pop() {
            let Some(index) = size.index(entry.cell) else {
                continue;
            };
            if self.closed[index] {
                continue;
            }

            if entry.cell == self.end {
                return PathOutcome::Found(self.reconstruct());
            }

            self.closed[index] = true;
            let current = self.arena[index];
            tracing::trace!(cell = %entry.cell, g = current.g, f = current.f, "expanding node");

            for neighbor in neighbors(entry.cell, size) {
                let Some(neighbor_index) = size.index(neighbor) else {
                    continue;
                };
                if self.closed[neighbor_index] {
                    continue;
                }

                let passable_here = self
                    .view
                    .terrain(neighbor)
                    .is_some_and(|terrain| passable.allows(terrain));
                if !passable_here {
                    self.closed[neighbor_index] = true;
                    continue;
                }

                let tentative_g = current.g.saturating_add(1);
                let slot = &mut self.arena[neighbor_index];
                if slot.discovered && tentative_g >= slot.g {
                    continue;
                }

                let f = tentative_g.saturating_add(neighbor.manhattan_distance(self.end));
                *slot = SearchNode {
                    g: tentative_g,
                    f,
                    parent: Some(entry.cell),
                    discovered: true,
                };
                self.push(neighbor, f);
            }
        }

        PathOutcome::NoPath
    }

    fn push(&mut self, cell: CellCoord, f: u32) {
        self.open.push(OpenEntry {
            f,
            sequence: self.next_sequence,
            cell,
        });
        self.next_sequence += 1;
    }

    fn reconstruct(&self) -> Path {
        let size = self.view.size();
        let mut tiles = Vec::new();
        let mut cursor = self.end;

        while let Some(index) = size.index(cursor) {
            let Some(parent) = self.arena[index].parent else {
                break;
            };
            if let Some(tile) = self.view.tile(cursor) {
                tiles.push(tile);
            }
            cursor = parent;
        }

        tiles.reverse();
        Path::new(tiles)
    }
}

/// Orthogonal neighbours in expansion order: up, down, left, right.
///
/// "Up" increases the row index.
fn neighbors(cell: CellCoord, size: GridSize) -> impl Iterator<Item = CellCoord> {
    let mut candidates = [None; 4];
    let mut count = 0;

    if let Some(row) = cell.row().checked_add(1) {
        if row < size.height() {
            candidates[count] = Some(CellCoord::new(cell.column(), row));
            count += 1;
        }
    }

    if let Some(row) = cell.row().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(cell.column(), row));
        count += 1;
    }

    if let Some(column) = cell.column().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(column, cell.row()));
        count += 1;
    }

    if let Some(column) = cell.column().checked_add(1) {
        if column < size.width() {
            candidates[count] = Some(CellCoord::new(column, cell.row()));
            count += 1;
        }
    }

    candidates.into_iter().take(count).flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbors_follow_up_down_left_right_order() {
        let found: Vec<_> = neighbors(CellCoord::new(1, 1), GridSize::new(3, 3)).collect();
        assert_eq!(
            found,
            vec![
                CellCoord::new(1, 2),
                CellCoord::new(1, 0),
                CellCoord::new(0, 1),
                CellCoord::new(2, 1),
            ]
        );
    }

    #[test]
    fn neighbors_stay_inside_corner() {
        let found: Vec<_> = neighbors(CellCoord::new(0, 0), GridSize::new(2, 2)).collect();
        assert_eq!(found, vec![CellCoord::new(0, 1), CellCoord::new(1, 0)]);
    }

    #[test]
    fn open_entries_pop_lowest_f_then_earliest_sequence() {
        let mut heap = BinaryHeap::new();
        heap.push(OpenEntry {
            f: 4,
            sequence: 0,
            cell: CellCoord::new(0, 0),
        });
        heap.push(OpenEntry {
            f: 2,
            sequence: 2,
            cell: CellCoord::new(2, 0),
        });
        heap.push(OpenEntry {
            f: 2,
            sequence: 1,
            cell: CellCoord::new(1, 0),
        });

        let order: Vec<_> = std::iter::from_fn(|| heap.pop().map(|entry| entry.cell)).collect();
        assert_eq!(
            order,
            vec![
                CellCoord::new(1, 0),
                CellCoord::new(2, 0),
                CellCoord::new(0, 0),
            ]
        );
    }
}
