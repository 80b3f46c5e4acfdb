#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the tactics sandbox.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to. Systems read the grid exclusively through [`TerrainView`] and
//! never own unit identity; they only propose new positions.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the sandbox boots.
pub const WELCOME_BANNER: &str = "Welcome to the tactics sandbox.";

/// Largest number of cells a generated grid may contain.
pub const MAX_GRID_CELLS: u64 = 1 << 20;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Records new grid dimensions that take effect on the next generation.
    SetDimensions {
        /// Number of columns the next grid should contain.
        width: u32,
        /// Number of rows the next grid should contain.
        height: u32,
    },
    /// Replaces the weights used by subsequent grid generations.
    SetTerrainWeights {
        /// Relative likelihood of each terrain type.
        weights: TerrainWeights,
    },
    /// Updates the player's movement and attack limits.
    SetUnitRanges {
        /// Maximum path length the player may walk in one move.
        move_range: u32,
        /// Maximum path length an attack may travel.
        attack_range: u32,
    },
    /// Regenerates the grid and respawns both units.
    Generate,
    /// Overwrites the terrain of a single cell.
    SetTile {
        /// Cell whose terrain should change.
        cell: CellCoord,
        /// Terrain the cell should carry afterwards.
        terrain: TerrainType,
    },
    /// Moves the player to the destination of a completed move playback.
    RelocatePlayer {
        /// Cell the player occupies after the move.
        cell: CellCoord,
    },
    /// Places the enemy on a fresh traversable cell after an attack.
    RespawnEnemy,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that new dimensions were queued for the next generation.
    DimensionsQueued {
        /// Dimensions awaiting the next generation.
        size: GridSize,
    },
    /// Confirms that generation weights were replaced.
    TerrainWeightsChanged {
        /// Weights used by the next generation.
        weights: TerrainWeights,
    },
    /// Confirms that the player's range limits changed.
    UnitRangesChanged {
        /// Updated movement limit.
        move_range: u32,
        /// Updated attack limit.
        attack_range: u32,
    },
    /// Announces that the grid was replaced wholesale.
    GridGenerated {
        /// Dimensions of the freshly generated grid.
        size: GridSize,
        /// Cell the player spawned on.
        player: CellCoord,
        /// Cell the enemy spawned on.
        enemy: CellCoord,
    },
    /// Reports that a generation request was refused and nothing changed.
    GenerationRejected {
        /// Specific reason the configuration was refused.
        reason: InvalidConfiguration,
    },
    /// Confirms that a single cell changed terrain.
    TerrainChanged {
        /// Cell that was edited.
        cell: CellCoord,
        /// Terrain carried before the edit.
        from: TerrainType,
        /// Terrain carried after the edit.
        to: TerrainType,
    },
    /// Confirms that a unit moved to a new cell.
    UnitRelocated {
        /// Unit that moved.
        role: UnitRole,
        /// Cell the unit occupied before moving.
        from: CellCoord,
        /// Cell the unit occupies now.
        to: CellCoord,
    },
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell, the `x` axis.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell, the `y` axis.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Dimensions of the grid measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    width: u32,
    height: u32,
}

impl GridSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the size describes at least one cell.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Total number of cells, saturating on platforms with a narrow `usize`.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let count = u64::from(self.width) * u64::from(self.height);
        usize::try_from(count).unwrap_or(usize::MAX)
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.width && cell.row() < self.height
    }

    /// Row-major offset of the provided cell, if it lies inside the grid.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }

        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Iterates every cell of the grid in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let width = self.width;
        (0..self.height).flat_map(move |row| (0..width).map(move |column| CellCoord::new(column, row)))
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Category of a grid cell governing passability and attack-line eligibility.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum TerrainType {
    /// Open ground that both units and attacks may cross.
    Traversable,
    /// Impassable terrain.
    Obstacle,
    /// Terrain that blocks movement but lets attacks through.
    Cover,
}

/// A single cell together with its terrain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Tile {
    coord: CellCoord,
    terrain: TerrainType,
}

impl Tile {
    /// Creates a tile at the provided coordinate.
    #[must_use]
    pub const fn new(coord: CellCoord, terrain: TerrainType) -> Self {
        Self { coord, terrain }
    }

    /// Coordinate of the tile.
    #[must_use]
    pub const fn coord(&self) -> CellCoord {
        self.coord
    }

    /// Terrain carried by the tile.
    #[must_use]
    pub const fn terrain(&self) -> TerrainType {
        self.terrain
    }
}

/// Relative likelihood of each terrain type during grid generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TerrainWeights {
    /// Weight assigned to [`TerrainType::Traversable`].
    pub traversable: u32,
    /// Weight assigned to [`TerrainType::Obstacle`].
    pub obstacle: u32,
    /// Weight assigned to [`TerrainType::Cover`].
    pub cover: u32,
}

impl TerrainWeights {
    /// Creates a weight descriptor from explicit values.
    #[must_use]
    pub const fn new(traversable: u32, obstacle: u32, cover: u32) -> Self {
        Self {
            traversable,
            obstacle,
            cover,
        }
    }

    /// Sum of all three weights, computed without overflow.
    #[must_use]
    pub fn total(&self) -> u64 {
        u64::from(self.traversable) + u64::from(self.obstacle) + u64::from(self.cover)
    }
}

impl Default for TerrainWeights {
    fn default() -> Self {
        Self::new(6, 2, 2)
    }
}

bitflags! {
    /// Subset of terrain types a search may traverse.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct PassableSet: u8 {
        /// Open ground is passable.
        const TRAVERSABLE = 1 << 0;
        /// Obstacles are passable.
        const OBSTACLE = 1 << 1;
        /// Cover is passable.
        const COVER = 1 << 2;
    }
}

impl PassableSet {
    /// Terrain a unit may walk across.
    #[must_use]
    pub const fn movement() -> Self {
        Self::TRAVERSABLE
    }

    /// Terrain an attack may travel across; cover does not stop a shot.
    #[must_use]
    pub const fn attack() -> Self {
        Self::TRAVERSABLE.union(Self::COVER)
    }

    /// Flag corresponding to a single terrain type.
    #[must_use]
    pub const fn from_terrain(terrain: TerrainType) -> Self {
        match terrain {
            TerrainType::Traversable => Self::TRAVERSABLE,
            TerrainType::Obstacle => Self::OBSTACLE,
            TerrainType::Cover => Self::COVER,
        }
    }

    /// Reports whether the provided terrain is part of the set.
    #[must_use]
    pub const fn allows(self, terrain: TerrainType) -> bool {
        self.contains(Self::from_terrain(terrain))
    }
}

/// Read-only view into the dense terrain grid.
#[derive(Clone, Copy, Debug)]
pub struct TerrainView<'a> {
    cells: &'a [TerrainType],
    size: GridSize,
}

impl<'a> TerrainView<'a> {
    /// Captures a new terrain view backed by the provided row-major slice.
    #[must_use]
    pub fn new(cells: &'a [TerrainType], size: GridSize) -> Self {
        debug_assert_eq!(cells.len(), size.cell_count(), "terrain slice must be dense");
        Self { cells, size }
    }

    /// Dimensions of the underlying grid.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        self.size.contains(cell)
    }

    /// Terrain stored at the provided cell, if it lies inside the grid.
    #[must_use]
    pub fn terrain(&self, cell: CellCoord) -> Option<TerrainType> {
        self.size
            .index(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Tile stored at the provided cell, if it lies inside the grid.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<Tile> {
        self.terrain(cell).map(|terrain| Tile::new(cell, terrain))
    }

    /// Iterates every tile in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = Tile> + 'a {
        let cells = self.cells;
        self.size
            .cells()
            .zip(cells.iter().copied())
            .map(|(coord, terrain)| Tile::new(coord, terrain))
    }
}

/// Ordered walk across the grid, excluding the start and including the destination.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Path {
    tiles: Vec<Tile>,
}

impl Path {
    /// Wraps tiles that are already in traversal order.
    #[must_use]
    pub fn new(tiles: Vec<Tile>) -> Self {
        Self { tiles }
    }

    /// Tiles in traversal order.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Number of steps the path takes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Reports whether the path takes no steps at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Final tile of the path, if any.
    #[must_use]
    pub fn destination(&self) -> Option<Tile> {
        self.tiles.last().copied()
    }

    /// Consumes the path, yielding the underlying tiles.
    #[must_use]
    pub fn into_tiles(self) -> Vec<Tile> {
        self.tiles
    }
}

/// Result of a search whose endpoints were valid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathOutcome {
    /// A shortest path was found.
    Found(Path),
    /// The open set drained without reaching the destination.
    NoPath,
}

impl PathOutcome {
    /// Borrow the path when one was found.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Found(path) => Some(path),
            Self::NoPath => None,
        }
    }

    /// Reports whether a path was found.
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Identifies which of the two units an event concerns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnitRole {
    /// The unit controlled through cell selection.
    Player,
    /// The unit targeted by attacks.
    Enemy,
}

/// Position and range limits of a unit on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Unit {
    cell: CellCoord,
    move_range: u32,
    attack_range: u32,
}

impl Unit {
    /// Creates a unit standing on the provided cell.
    #[must_use]
    pub const fn new(cell: CellCoord, move_range: u32, attack_range: u32) -> Self {
        Self {
            cell,
            move_range,
            attack_range,
        }
    }

    /// Cell the unit occupies.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Maximum number of steps a move may take.
    #[must_use]
    pub const fn move_range(&self) -> u32 {
        self.move_range
    }

    /// Maximum number of steps an attack may travel.
    #[must_use]
    pub const fn attack_range(&self) -> u32 {
        self.attack_range
    }

    /// Returns a copy of the unit standing on another cell.
    #[must_use]
    pub const fn at(self, cell: CellCoord) -> Self {
        Self { cell, ..self }
    }

    /// Returns a copy of the unit with different range limits.
    #[must_use]
    pub const fn with_ranges(self, move_range: u32, attack_range: u32) -> Self {
        Self {
            move_range,
            attack_range,
            ..self
        }
    }
}

/// Reasons a grid configuration is refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum InvalidConfiguration {
    /// All three terrain weights are zero.
    #[error("terrain weights must sum to a positive value")]
    ZeroTotalWeight,
    /// Width or height is zero.
    #[error("grid dimensions must be positive, received {width}x{height}")]
    EmptyDimensions {
        /// Requested number of columns.
        width: u32,
        /// Requested number of rows.
        height: u32,
    },
    /// Width times height exceeds [`MAX_GRID_CELLS`].
    #[error("grid of {width}x{height} cells exceeds the limit of {limit} cells")]
    TooManyCells {
        /// Requested number of columns.
        width: u32,
        /// Requested number of rows.
        height: u32,
        /// Maximum number of cells accepted.
        limit: u64,
    },
    /// Not enough traversable cells to place both units.
    #[error("grid needs at least two traversable cells to spawn units, found {available}")]
    InsufficientSpawnCells {
        /// Number of traversable cells the generated grid offered.
        available: usize,
    },
}

/// A search endpoint lies outside the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[error("cell {cell} lies outside the {size} grid")]
pub struct OutOfBounds {
    /// Offending endpoint.
    pub cell: CellCoord,
    /// Dimensions of the searched grid.
    pub size: GridSize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn grid_index_is_row_major() {
        let size = GridSize::new(4, 3);
        assert_eq!(size.index(CellCoord::new(0, 0)), Some(0));
        assert_eq!(size.index(CellCoord::new(3, 0)), Some(3));
        assert_eq!(size.index(CellCoord::new(1, 2)), Some(9));
        assert_eq!(size.index(CellCoord::new(4, 0)), None);
        assert_eq!(size.index(CellCoord::new(0, 3)), None);
    }

    #[test]
    fn grid_cells_iterate_row_major() {
        let cells: Vec<_> = GridSize::new(2, 2).cells().collect();
        assert_eq!(
            cells,
            vec![
                CellCoord::new(0, 0),
                CellCoord::new(1, 0),
                CellCoord::new(0, 1),
                CellCoord::new(1, 1),
            ]
        );
    }

    #[test]
    fn attack_set_admits_cover_but_movement_does_not() {
        assert!(PassableSet::attack().allows(TerrainType::Cover));
        assert!(PassableSet::attack().allows(TerrainType::Traversable));
        assert!(!PassableSet::attack().allows(TerrainType::Obstacle));
        assert!(!PassableSet::movement().allows(TerrainType::Cover));
        assert!(PassableSet::movement().allows(TerrainType::Traversable));
    }

    #[test]
    fn terrain_view_resolves_tiles_by_coordinate() {
        let cells = [
            TerrainType::Traversable,
            TerrainType::Obstacle,
            TerrainType::Cover,
            TerrainType::Traversable,
        ];
        let view = TerrainView::new(&cells, GridSize::new(2, 2));

        assert_eq!(view.terrain(CellCoord::new(1, 0)), Some(TerrainType::Obstacle));
        assert_eq!(
            view.tile(CellCoord::new(0, 1)),
            Some(Tile::new(CellCoord::new(0, 1), TerrainType::Cover))
        );
        assert_eq!(view.terrain(CellCoord::new(2, 0)), None);
        assert_eq!(view.tiles().count(), 4);
    }

    #[test]
    fn weight_total_does_not_overflow() {
        let weights = TerrainWeights::new(u32::MAX, u32::MAX, u32::MAX);
        assert_eq!(weights.total(), 3 * u64::from(u32::MAX));
    }

    #[test]
    fn out_of_bounds_reports_cell_and_size() {
        let error = OutOfBounds {
            cell: CellCoord::new(7, 2),
            size: GridSize::new(5, 5),
        };
        assert_eq!(error.to_string(), "cell (7, 2) lies outside the 5x5 grid");
    }

    #[test]
    fn too_many_cells_names_the_limit() {
        let error = InvalidConfiguration::TooManyCells {
            width: 2048,
            height: 1024,
            limit: MAX_GRID_CELLS,
        };
        assert_eq!(
            error.to_string(),
            "grid of 2048x1024 cells exceeds the limit of 1048576 cells"
        );
    }
}
