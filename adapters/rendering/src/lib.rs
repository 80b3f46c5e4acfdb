#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for tactics sandbox adapters.

use anyhow::Result as AnyResult;
use std::{error::Error, fmt};
use tactics_sandbox_core::{CellCoord, Command, GridSize, Path, TerrainType, TerrainView, Tile};
use tactics_sandbox_system_range::RangeSplit;
use tactics_sandbox_system_selection::SelectionEvent;

/// Visual treatment of a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellAppearance {
    /// Cell drawn with its terrain material.
    Terrain(TerrainType),
    /// Highlighted path step within the applicable range.
    PathInRange,
    /// Highlighted path step beyond the applicable range.
    PathOutOfRange,
}

/// Marker drawn on top of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Marker {
    /// The player's unit.
    Player,
    /// The enemy unit.
    Enemy,
    /// An attack travelling along its path.
    Projectile,
}

/// Frame descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scene {
    /// Dimensions of the presented grid.
    pub size: GridSize,
    /// Row-major cell appearances.
    pub cells: Vec<CellAppearance>,
    /// Cell the player marker is drawn on.
    pub player: CellCoord,
    /// Cell the enemy marker is drawn on.
    pub enemy: CellCoord,
    /// Cell an attack in flight currently occupies.
    pub projectile: Option<CellCoord>,
}

impl Scene {
    /// Composes a scene from the terrain, unit positions and an optional path highlight.
    ///
    /// Highlighted tiles use the range partition computed for the selection, so
    /// tiles at an index below the range limit render as in range.
    #[must_use]
    pub fn compose(
        view: TerrainView<'_>,
        player: CellCoord,
        enemy: CellCoord,
        highlight: Option<&RangeSplit>,
    ) -> Self {
        let size = view.size();
        let mut cells: Vec<_> = view
            .tiles()
            .map(|tile| CellAppearance::Terrain(tile.terrain()))
            .collect();

        if let Some(split) = highlight {
            let mut paint = |tiles: &[Tile], appearance| {
                for tile in tiles {
                    if let Some(index) = size.index(tile.coord()) {
                        cells[index] = appearance;
                    }
                }
            };
            paint(&split.in_range, CellAppearance::PathInRange);
            paint(&split.out_of_range, CellAppearance::PathOutOfRange);
        }

        Self {
            size,
            cells,
            player,
            enemy,
            projectile: None,
        }
    }

    /// Repositions markers to reflect a playback in flight.
    #[must_use]
    pub fn with_playback(mut self, playback: &Playback) -> Self {
        if let Some(position) = playback.position() {
            match playback.kind() {
                PlaybackKind::Move => self.player = position,
                PlaybackKind::Attack => self.projectile = Some(position),
            }
        }
        self
    }

    /// Appearance of the provided cell, if it lies inside the grid.
    #[must_use]
    pub fn appearance(&self, cell: CellCoord) -> Option<CellAppearance> {
        self.size
            .index(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Topmost marker drawn on the provided cell.
    #[must_use]
    pub fn marker(&self, cell: CellCoord) -> Option<Marker> {
        if self.projectile == Some(cell) {
            Some(Marker::Projectile)
        } else if self.player == cell {
            Some(Marker::Player)
        } else if self.enemy == cell {
            Some(Marker::Enemy)
        } else {
            None
        }
    }
}

/// Action a playback animates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlaybackKind {
    /// The player walks along the path.
    Move,
    /// An attack travels along the path.
    Attack,
}

/// Progress reported by [`Playback::advance`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlaybackStep {
    /// The animated object entered the provided cell.
    Advanced(CellCoord),
    /// The path is exhausted; the command must be applied to the world.
    Finished(Command),
}

/// Step-by-step animation of a confirmed path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Playback {
    kind: PlaybackKind,
    tiles: Vec<Tile>,
    destination: CellCoord,
    visited: usize,
}

impl Playback {
    /// Creates a playback for a non-empty path.
    #[must_use]
    pub fn new(kind: PlaybackKind, path: Path) -> Option<Self> {
        let destination = path.destination()?.coord();
        Some(Self {
            kind,
            tiles: path.into_tiles(),
            destination,
            visited: 0,
        })
    }

    /// Creates a playback for a confirmation event; other events yield `None`.
    #[must_use]
    pub fn from_event(event: &SelectionEvent) -> Option<Self> {
        match event {
            SelectionEvent::MoveConfirmed { path } => Self::new(PlaybackKind::Move, path.clone()),
            SelectionEvent::AttackConfirmed { path } => {
                Self::new(PlaybackKind::Attack, path.clone())
            }
            _ => None,
        }
    }

    /// Action being animated.
    #[must_use]
    pub const fn kind(&self) -> PlaybackKind {
        self.kind
    }

    /// Cell most recently entered, or `None` before the first step.
    #[must_use]
    pub fn position(&self) -> Option<CellCoord> {
        self.visited
            .checked_sub(1)
            .and_then(|index| self.tiles.get(index))
            .map(|tile| tile.coord())
    }

    /// Advances the animation by a single tile.
    pub fn advance(&mut self) -> PlaybackStep {
        if let Some(tile) = self.tiles.get(self.visited) {
            self.visited += 1;
            return PlaybackStep::Advanced(tile.coord());
        }

        PlaybackStep::Finished(match self.kind {
            PlaybackKind::Move => Command::RelocatePlayer {
                cell: self.destination,
            },
            PlaybackKind::Attack => Command::RespawnEnemy,
        })
    }
}

/// Guard that refuses selection and terrain edits while a playback is in flight.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputGate {
    in_flight: Option<Playback>,
}

impl InputGate {
    /// Creates an open gate.
    #[must_use]
    pub const fn new() -> Self {
        Self { in_flight: None }
    }

    /// Reports whether intents are currently accepted.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.in_flight.is_none()
    }

    /// Fails while an animation is running.
    pub fn check(&self) -> Result<(), AnimationInFlight> {
        if self.is_open() {
            Ok(())
        } else {
            Err(AnimationInFlight)
        }
    }

    /// Playback currently in flight.
    #[must_use]
    pub fn playback(&self) -> Option<&Playback> {
        self.in_flight.as_ref()
    }

    /// Starts a playback, closing the gate until it finishes.
    pub fn begin(&mut self, playback: Playback) -> Result<(), AnimationInFlight> {
        self.check()?;
        self.in_flight = Some(playback);
        Ok(())
    }

    /// Advances the playback in flight, reopening the gate once it finishes.
    pub fn tick(&mut self) -> Option<PlaybackStep> {
        let step = self.in_flight.as_mut()?.advance();
        if matches!(step, PlaybackStep::Finished(_)) {
            self.in_flight = None;
        }
        Some(step)
    }
}

/// Intent refused because an animation is still running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimationInFlight;

impl fmt::Display for AnimationInFlight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("input is disabled while an animation is in flight")
    }
}

impl Error for AnimationInFlight {}

/// Rendering backend capable of presenting sandbox scenes.
pub trait RenderingBackend {
    /// Presents a single frame.
    fn present(&mut self, scene: &Scene) -> AnyResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tactics_sandbox_system_range::split;

    fn row_path(columns: std::ops::RangeInclusive<u32>) -> Path {
        Path::new(
            columns
                .map(|column| Tile::new(CellCoord::new(column, 0), TerrainType::Traversable))
                .collect(),
        )
    }

    #[test]
    fn compose_paints_terrain_and_highlight() {
        let cells = vec![
            TerrainType::Traversable,
            TerrainType::Traversable,
            TerrainType::Traversable,
            TerrainType::Traversable,
            TerrainType::Obstacle,
            TerrainType::Cover,
            TerrainType::Traversable,
            TerrainType::Traversable,
        ];
        let size = GridSize::new(4, 2);
        let view = TerrainView::new(&cells, size);
        let path = row_path(1..=3);
        let highlight = split(path.tiles(), 2);

        let scene = Scene::compose(
            view,
            CellCoord::new(0, 0),
            CellCoord::new(3, 1),
            Some(&highlight),
        );

        assert_eq!(
            scene.appearance(CellCoord::new(0, 0)),
            Some(CellAppearance::Terrain(TerrainType::Traversable))
        );
        assert_eq!(
            scene.appearance(CellCoord::new(1, 0)),
            Some(CellAppearance::PathInRange)
        );
        assert_eq!(
            scene.appearance(CellCoord::new(2, 0)),
            Some(CellAppearance::PathInRange)
        );
        assert_eq!(
            scene.appearance(CellCoord::new(3, 0)),
            Some(CellAppearance::PathOutOfRange)
        );
        assert_eq!(
            scene.appearance(CellCoord::new(0, 1)),
            Some(CellAppearance::Terrain(TerrainType::Obstacle))
        );
        assert_eq!(
            scene.appearance(CellCoord::new(1, 1)),
            Some(CellAppearance::Terrain(TerrainType::Cover))
        );
        assert_eq!(scene.appearance(CellCoord::new(4, 0)), None);
        assert_eq!(scene.marker(CellCoord::new(0, 0)), Some(Marker::Player));
        assert_eq!(scene.marker(CellCoord::new(3, 1)), Some(Marker::Enemy));
        assert_eq!(scene.marker(CellCoord::new(2, 1)), None);
    }

    #[test]
    fn move_playback_walks_then_relocates_player() {
        let mut playback = Playback::new(PlaybackKind::Move, row_path(1..=2)).expect("non-empty");
        assert_eq!(playback.position(), None);

        assert_eq!(
            playback.advance(),
            PlaybackStep::Advanced(CellCoord::new(1, 0))
        );
        assert_eq!(
            playback.advance(),
            PlaybackStep::Advanced(CellCoord::new(2, 0))
        );
        assert_eq!(playback.position(), Some(CellCoord::new(2, 0)));
        assert_eq!(
            playback.advance(),
            PlaybackStep::Finished(Command::RelocatePlayer {
                cell: CellCoord::new(2, 0)
            })
        );
    }

    #[test]
    fn move_playback_finishes_at_destination_on_every_extra_advance() {
        let mut playback = Playback::new(PlaybackKind::Move, row_path(3..=4)).expect("non-empty");
        for _ in 0..2 {
            let _ = playback.advance();
        }

        for _ in 0..2 {
            assert_eq!(
                playback.advance(),
                PlaybackStep::Finished(Command::RelocatePlayer {
                    cell: CellCoord::new(4, 0)
                })
            );
        }
    }

    #[test]
    fn attack_playback_ends_with_respawn() {
        let event = SelectionEvent::AttackConfirmed {
            path: row_path(1..=1),
        };
        let mut playback = Playback::from_event(&event).expect("confirmation event");

        assert_eq!(playback.kind(), PlaybackKind::Attack);
        let _ = playback.advance();
        assert_eq!(
            playback.advance(),
            PlaybackStep::Finished(Command::RespawnEnemy)
        );
    }

    #[test]
    fn playback_requires_a_confirmation_with_steps() {
        assert!(Playback::new(PlaybackKind::Move, Path::new(Vec::new())).is_none());
        assert!(Playback::from_event(&SelectionEvent::Unreachable {
            target: CellCoord::new(0, 0),
            is_attack: false,
        })
        .is_none());
    }

    #[test]
    fn scene_follows_playback_markers() {
        let cells = vec![TerrainType::Traversable; 3];
        let view = TerrainView::new(&cells, GridSize::new(3, 1));
        let mut walk = Playback::new(PlaybackKind::Move, row_path(1..=2)).expect("non-empty");
        let _ = walk.advance();

        let scene = Scene::compose(view, CellCoord::new(0, 0), CellCoord::new(2, 0), None)
            .with_playback(&walk);
        assert_eq!(scene.player, CellCoord::new(1, 0));
        assert_eq!(scene.projectile, None);

        let mut shot = Playback::new(PlaybackKind::Attack, row_path(1..=2)).expect("non-empty");
        let _ = shot.advance();
        let scene = Scene::compose(view, CellCoord::new(0, 0), CellCoord::new(2, 0), None)
            .with_playback(&shot);
        assert_eq!(scene.player, CellCoord::new(0, 0));
        assert_eq!(scene.marker(CellCoord::new(1, 0)), Some(Marker::Projectile));
    }

    #[test]
    fn gate_refuses_input_until_playback_finishes() {
        let mut gate = InputGate::new();
        assert!(gate.is_open());
        assert_eq!(gate.tick(), None);

        let playback = Playback::new(PlaybackKind::Move, row_path(1..=1)).expect("non-empty");
        gate.begin(playback.clone()).expect("gate is open");
        assert_eq!(gate.check(), Err(AnimationInFlight));
        assert_eq!(gate.begin(playback), Err(AnimationInFlight));

        assert_eq!(
            gate.tick(),
            Some(PlaybackStep::Advanced(CellCoord::new(1, 0)))
        );
        assert!(!gate.is_open());
        assert_eq!(
            gate.tick(),
            Some(PlaybackStep::Finished(Command::RelocatePlayer {
                cell: CellCoord::new(1, 0)
            }))
        );
        assert!(gate.is_open());
        assert_eq!(gate.check(), Ok(()));
    }

    #[test]
    fn animation_in_flight_message_is_descriptive() {
        assert_eq!(
            AnimationInFlight.to_string(),
            "input is disabled while an animation is in flight"
        );
    }
}
