//! Terrain storage and weighted generation.

use rand::{
    distributions::{Distribution, WeightedIndex},
    Rng,
};
use tactics_sandbox_core::{
    CellCoord, GridSize, InvalidConfiguration, TerrainType, TerrainView, TerrainWeights,
    MAX_GRID_CELLS,
};

const TERRAIN_ORDER: [TerrainType; 3] = [
    TerrainType::Traversable,
    TerrainType::Obstacle,
    TerrainType::Cover,
];

/// Dense row-major terrain grid.
///
/// Every coordinate inside [`Grid::size`] maps to exactly one terrain value.
/// Terrain can only change through [`GridModel::set_tile`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    size: GridSize,
    cells: Vec<TerrainType>,
}

impl Grid {
    /// Creates a grid where every cell carries the same terrain.
    #[must_use]
    pub fn filled(size: GridSize, terrain: TerrainType) -> Self {
        Self {
            size,
            cells: vec![terrain; size.cell_count()],
        }
    }

    /// Dimensions of the grid.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Borrows the grid as a read-only view for systems.
    #[must_use]
    pub fn view(&self) -> TerrainView<'_> {
        TerrainView::new(&self.cells, self.size)
    }

    /// Terrain stored at the provided cell, if it lies inside the grid.
    #[must_use]
    pub fn terrain(&self, cell: CellCoord) -> Option<TerrainType> {
        self.size
            .index(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Cells carrying the provided terrain in row-major order.
    #[must_use]
    pub fn cells_with(&self, terrain: TerrainType) -> Vec<CellCoord> {
        self.size
            .cells()
            .zip(self.cells.iter())
            .filter(|(_, stored)| **stored == terrain)
            .map(|(cell, _)| cell)
            .collect()
    }

    fn replace(&mut self, cell: CellCoord, terrain: TerrainType) -> Option<TerrainType> {
        let index = self.size.index(cell)?;
        let slot = self.cells.get_mut(index)?;
        if *slot == terrain {
            return None;
        }
        Some(std::mem::replace(slot, terrain))
    }
}

/// Freshly generated grid together with the cells eligible for spawning units.
#[derive(Clone, Debug)]
pub struct GeneratedGrid {
    grid: Grid,
    spawnable: Vec<CellCoord>,
}

impl GeneratedGrid {
    /// The generated grid.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Every traversable cell of the grid in row-major order.
    #[must_use]
    pub fn spawnable(&self) -> &[CellCoord] {
        &self.spawnable
    }
}

/// Generates a grid by drawing each cell's terrain from the provided weights.
///
/// Cells are visited row by row and each consumes exactly one draw from `rng`,
/// so the same seed and configuration always produce the same grid. Sizes
/// above [`MAX_GRID_CELLS`] are refused before anything is allocated.
pub fn generate_grid<R>(
    size: GridSize,
    weights: TerrainWeights,
    rng: &mut R,
) -> Result<GeneratedGrid, InvalidConfiguration>
where
    R: Rng + ?Sized,
{
    if size.is_empty() {
        return Err(InvalidConfiguration::EmptyDimensions {
            width: size.width(),
            height: size.height(),
        });
    }

    if u64::from(size.width()) * u64::from(size.height()) > MAX_GRID_CELLS {
        return Err(InvalidConfiguration::TooManyCells {
            width: size.width(),
            height: size.height(),
            limit: MAX_GRID_CELLS,
        });
    }

    if weights.total() == 0 {
        return Err(InvalidConfiguration::ZeroTotalWeight);
    }

    let distribution = WeightedIndex::new([
        u64::from(weights.traversable),
        u64::from(weights.obstacle),
        u64::from(weights.cover),
    ])
    .map_err(|_| InvalidConfiguration::ZeroTotalWeight)?;

    let mut cells = Vec::with_capacity(size.cell_count());
    let mut spawnable = Vec::new();
    for cell in size.cells() {
        let terrain = TERRAIN_ORDER[distribution.sample(rng)];
        if terrain == TerrainType::Traversable {
            spawnable.push(cell);
        }
        cells.push(terrain);
    }

    tracing::debug!(
        %size,
        traversable = spawnable.len(),
        "generated terrain grid"
    );

    Ok(GeneratedGrid {
        grid: Grid { size, cells },
        spawnable,
    })
}

/// Rotates terrain `Traversable → Obstacle → Cover → Traversable`.
///
/// Terrain this rotation does not know about is returned unchanged.
#[must_use]
pub fn cycle_type(terrain: TerrainType) -> TerrainType {
    match terrain {
        TerrainType::Traversable => TerrainType::Obstacle,
        TerrainType::Obstacle => TerrainType::Cover,
        TerrainType::Cover => TerrainType::Traversable,
        other => other,
    }
}

/// Owner of the terrain grid and of any deferred dimension change.
#[derive(Clone, Debug)]
pub struct GridModel {
    grid: Grid,
    pending: Option<GridSize>,
}

impl GridModel {
    /// Wraps an existing grid.
    #[must_use]
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            pending: None,
        }
    }

    /// Current grid.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Dimensions queued for the next generation, if any.
    #[must_use]
    pub fn pending_dimensions(&self) -> Option<GridSize> {
        self.pending
    }

    /// Dimensions the next generation will use.
    #[must_use]
    pub fn next_size(&self) -> GridSize {
        self.pending.unwrap_or(self.grid.size())
    }

    /// Queues new dimensions; the current grid keeps its size until the next generation.
    pub fn set_dimensions(&mut self, width: u32, height: u32) {
        self.pending = Some(GridSize::new(width, height));
    }

    /// Replaces the grid with a freshly generated one once `place` accepts it.
    ///
    /// `place` receives every traversable cell of the candidate grid in
    /// row-major order and may refuse it. Pending dimensions are consumed only
    /// when generation and placement both succeed; on error the grid and the
    /// pending dimensions are left untouched.
    pub fn generate<R, T, F>(
        &mut self,
        weights: TerrainWeights,
        rng: &mut R,
        place: F,
    ) -> Result<T, InvalidConfiguration>
    where
        R: Rng + ?Sized,
        F: FnOnce(&[CellCoord], &mut R) -> Result<T, InvalidConfiguration>,
    {
        let generated = generate_grid(self.next_size(), weights, rng)?;
        let placed = place(generated.spawnable(), rng)?;
        self.pending = None;
        self.grid = generated.grid;
        Ok(placed)
    }

    /// Overwrites the terrain of a single cell.
    ///
    /// Out-of-bounds coordinates are ignored. Returns the previous terrain when
    /// the cell actually changed.
    pub fn set_tile(&mut self, cell: CellCoord, terrain: TerrainType) -> Option<TerrainType> {
        self.grid.replace(cell, terrain)
    }
}
