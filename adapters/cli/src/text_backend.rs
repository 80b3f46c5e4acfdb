//! Plain-text rendering backend.

use std::io::Write;

use anyhow::{Context, Result as AnyResult};
use tactics_sandbox_core::{CellCoord, TerrainType};
use tactics_sandbox_rendering::{CellAppearance, Marker, RenderingBackend, Scene};

/// Backend that draws each scene as an ASCII grid, highest row first.
#[derive(Debug)]
pub(crate) struct TextBackend<W> {
    out: W,
}

impl<W: Write> TextBackend<W> {
    pub(crate) fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> RenderingBackend for TextBackend<W> {
    fn present(&mut self, scene: &Scene) -> AnyResult<()> {
        self.out
            .write_all(draw(scene).as_bytes())
            .and_then(|()| self.out.flush())
            .context("failed to write frame")
    }
}

pub(crate) fn draw(scene: &Scene) -> String {
    let size = scene.size;
    let label_width = size.height().saturating_sub(1).to_string().len();
    let mut frame = String::new();

    for row in (0..size.height()).rev() {
        frame.push_str(&format!("{row:>label_width$} "));
        for column in 0..size.width() {
            frame.push(glyph(scene, CellCoord::new(column, row)));
        }
        frame.push('\n');
    }
    frame
}

fn glyph(scene: &Scene, cell: CellCoord) -> char {
    match scene.marker(cell) {
        Some(Marker::Player) => return '@',
        Some(Marker::Enemy) => return 'E',
        Some(Marker::Projectile) => return 'o',
        None => {}
    }

    match scene.appearance(cell) {
        Some(CellAppearance::PathInRange) => '*',
        Some(CellAppearance::PathOutOfRange) => 'x',
        Some(CellAppearance::Terrain(TerrainType::Obstacle)) => '#',
        Some(CellAppearance::Terrain(TerrainType::Cover)) => '+',
        Some(CellAppearance::Terrain(_)) | None => '.',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tactics_sandbox_core::{GridSize, TerrainView, Tile};
    use tactics_sandbox_system_range::split;

    #[test]
    fn draws_terrain_markers_and_highlight() {
        let cells = [
            TerrainType::Traversable,
            TerrainType::Traversable,
            TerrainType::Traversable,
            TerrainType::Traversable,
            TerrainType::Obstacle,
            TerrainType::Cover,
            TerrainType::Traversable,
            TerrainType::Traversable,
        ];
        let view = TerrainView::new(&cells, GridSize::new(4, 2));
        let path: Vec<_> = (1..=3)
            .map(|column| Tile::new(CellCoord::new(column, 0), TerrainType::Traversable))
            .collect();
        let highlight = split(&path, 2);
        let scene = Scene::compose(
            view,
            CellCoord::new(0, 0),
            CellCoord::new(3, 1),
            Some(&highlight),
        );

        assert_eq!(draw(&scene), "1 #+.E\n0 @**x\n");
    }

    #[test]
    fn backend_writes_frames_to_its_sink() {
        let cells = [TerrainType::Traversable; 2];
        let view = TerrainView::new(&cells, GridSize::new(2, 1));
        let scene = Scene::compose(view, CellCoord::new(0, 0), CellCoord::new(1, 0), None);
        let mut backend = TextBackend::new(Vec::new());

        backend.present(&scene).expect("writing to memory succeeds");

        assert_eq!(String::from_utf8(backend.out).expect("utf-8"), "0 @E\n");
    }
}
