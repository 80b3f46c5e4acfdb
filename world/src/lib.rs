#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for the tactics sandbox.
//!
//! The world owns the terrain grid, both units and the random number
//! generator that drives generation and respawns. Every mutation arrives as a
//! [`Command`] through [`apply`], which reports what changed as [`Event`]
//! values.

mod grid;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tactics_sandbox_core::{
    CellCoord, Command, Event, GridSize, InvalidConfiguration, TerrainType, TerrainWeights, Unit,
    UnitRole,
};

pub use grid::{cycle_type, generate_grid, GeneratedGrid, Grid, GridModel};

const DEFAULT_GRID_WIDTH: u32 = 10;
const DEFAULT_GRID_HEIGHT: u32 = 10;
const DEFAULT_MOVE_RANGE: u32 = 4;
const DEFAULT_ATTACK_RANGE: u32 = 6;

/// Parameters used to build the initial world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldConfig {
    /// Dimensions of the first generated grid.
    pub size: GridSize,
    /// Weights used for every generation until replaced.
    pub weights: TerrainWeights,
    /// Maximum number of steps the player may move.
    pub move_range: u32,
    /// Maximum number of steps a player attack may travel.
    pub attack_range: u32,
    /// Seed for the world's random number generator.
    pub seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            size: GridSize::new(DEFAULT_GRID_WIDTH, DEFAULT_GRID_HEIGHT),
            weights: TerrainWeights::default(),
            move_range: DEFAULT_MOVE_RANGE,
            attack_range: DEFAULT_ATTACK_RANGE,
            seed: 0,
        }
    }
}

/// Represents the authoritative sandbox world.
#[derive(Debug)]
pub struct World {
    model: GridModel,
    weights: TerrainWeights,
    player: Unit,
    enemy: Unit,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates a world with a freshly generated grid and both units placed.
    pub fn new(config: WorldConfig) -> Result<Self, InvalidConfiguration> {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut model = GridModel::new(Grid::filled(
            GridSize::new(0, 0),
            TerrainType::Traversable,
        ));
        model.set_dimensions(config.size.width(), config.size.height());
        let (player_cell, enemy_cell) =
            model.generate(config.weights, &mut rng, pick_spawn_cells)?;

        tracing::debug!(
            size = %config.size,
            player = %player_cell,
            enemy = %enemy_cell,
            "world created"
        );

        Ok(Self {
            model,
            weights: config.weights,
            player: Unit::new(player_cell, config.move_range, config.attack_range),
            enemy: Unit::new(enemy_cell, 0, 0),
            rng,
        })
    }

    fn regenerate(&mut self) -> Result<(CellCoord, CellCoord), InvalidConfiguration> {
        let spawns = self
            .model
            .generate(self.weights, &mut self.rng, pick_spawn_cells)?;
        self.player = self.player.at(spawns.0);
        self.enemy = self.enemy.at(spawns.1);
        Ok(spawns)
    }

    fn respawn_enemy(&mut self) -> Option<CellCoord> {
        let player_cell = self.player.cell();
        let candidates: Vec<CellCoord> = self
            .model
            .grid()
            .cells_with(TerrainType::Traversable)
            .into_iter()
            .filter(|cell| *cell != player_cell)
            .collect();

        if candidates.is_empty() {
            return None;
        }

        let cell = candidates[self.rng.gen_range(0..candidates.len())];
        self.enemy = self.enemy.at(cell);
        Some(cell)
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SetDimensions { width, height } => {
            world.model.set_dimensions(width, height);
            out_events.push(Event::DimensionsQueued {
                size: GridSize::new(width, height),
            });
        }
        Command::SetTerrainWeights { weights } => {
            world.weights = weights;
            out_events.push(Event::TerrainWeightsChanged { weights });
        }
        Command::SetUnitRanges {
            move_range,
            attack_range,
        } => {
            world.player = world.player.with_ranges(move_range, attack_range);
            out_events.push(Event::UnitRangesChanged {
                move_range,
                attack_range,
            });
        }
        Command::Generate => match world.regenerate() {
            Ok((player, enemy)) => {
                let size = world.model.grid().size();
                tracing::debug!(%size, %player, %enemy, "grid regenerated");
                out_events.push(Event::GridGenerated {
                    size,
                    player,
                    enemy,
                });
            }
            Err(reason) => {
                tracing::warn!(%reason, "grid generation rejected");
                out_events.push(Event::GenerationRejected { reason });
            }
        },
        Command::SetTile { cell, terrain } => {
            if let Some(from) = world.model.set_tile(cell, terrain) {
                tracing::debug!(%cell, ?from, to = ?terrain, "terrain edited");
                out_events.push(Event::TerrainChanged {
                    cell,
                    from,
                    to: terrain,
                });
            }
        }
        Command::RelocatePlayer { cell } => {
            if !world.model.grid().size().contains(cell) {
                tracing::debug!(%cell, "ignoring player relocation outside the grid");
                return;
            }

            let from = world.player.cell();
            world.player = world.player.at(cell);
            out_events.push(Event::UnitRelocated {
                role: UnitRole::Player,
                from,
                to: cell,
            });
        }
        Command::RespawnEnemy => {
            let from = world.enemy.cell();
            match world.respawn_enemy() {
                Some(to) => {
                    tracing::debug!(%from, %to, "enemy respawned");
                    out_events.push(Event::UnitRelocated {
                        role: UnitRole::Enemy,
                        from,
                        to,
                    });
                }
                None => {
                    tracing::warn!("no traversable cell available to respawn the enemy");
                }
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{Grid, World};
    use tactics_sandbox_core::{
        CellCoord, GridSize, TerrainType, TerrainView, TerrainWeights, Unit,
    };

    /// Provides read-only access to the current grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        world.model.grid()
    }

    /// Captures a read-only view of the terrain for systems.
    #[must_use]
    pub fn terrain_view(world: &World) -> TerrainView<'_> {
        world.model.grid().view()
    }

    /// Dimensions of the current grid.
    #[must_use]
    pub fn grid_size(world: &World) -> GridSize {
        world.model.grid().size()
    }

    /// Dimensions queued for the next generation, if any.
    #[must_use]
    pub fn pending_dimensions(world: &World) -> Option<GridSize> {
        world.model.pending_dimensions()
    }

    /// Weights the next generation will use.
    #[must_use]
    pub fn weights(world: &World) -> TerrainWeights {
        world.weights
    }

    /// The player unit.
    #[must_use]
    pub fn player(world: &World) -> Unit {
        world.player
    }

    /// The enemy unit.
    #[must_use]
    pub fn enemy(world: &World) -> Unit {
        world.enemy
    }

    /// Every traversable cell of the current grid in row-major order.
    #[must_use]
    pub fn spawnable_cells(world: &World) -> Vec<CellCoord> {
        world.model.grid().cells_with(TerrainType::Traversable)
    }
}

fn pick_spawn_cells<R>(
    spawnable: &[CellCoord],
    rng: &mut R,
) -> Result<(CellCoord, CellCoord), InvalidConfiguration>
where
    R: Rng + ?Sized,
{
    if spawnable.len() < 2 {
        return Err(InvalidConfiguration::InsufficientSpawnCells {
            available: spawnable.len(),
        });
    }

    let mut remaining = spawnable.to_vec();
    let player = remaining.remove(rng.gen_range(0..remaining.len()));
    let enemy = remaining[rng.gen_range(0..remaining.len())];
    Ok((player, enemy))
}
