//! Dense tile grid tracking bubble occupancy.

use bubble_arena_core::{ArenaDimensions, CellCoord, Rect};

#[derive(Clone, Copy, Debug)]
struct Tile {
    cell: CellCoord,
    has_bubble: bool,
}

/// Square grid of tiles owned by the world.
#[derive(Clone, Debug)]
pub struct TileGrid {
    size: u32,
    tile_size: f32,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// Creates an empty grid with `size` tiles per side.
    #[must_use]
    pub(crate) fn new(size: u32, tile_size: f32) -> Self {
        let mut tiles = Vec::with_capacity(size as usize * size as usize);
        for row in 0..size {
            for column in 0..size {
                tiles.push(Tile {
                    cell: CellCoord::new(row, column),
                    has_bubble: false,
                });
            }
        }
        Self {
            size,
            tile_size,
            tiles,
        }
    }

    /// Number of tiles along each side.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Side length of a single tile in world units.
    #[must_use]
    pub const fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Side length of the arena in world units.
    #[must_use]
    pub fn arena_length(&self) -> f32 {
        self.size as f32 * self.tile_size
    }

    /// Dimensions shared with systems and adapters.
    #[must_use]
    pub const fn dimensions(&self) -> ArenaDimensions {
        ArenaDimensions::new(self.size, self.tile_size)
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.row() < self.size && cell.column() < self.size
    }

    /// Maps a world-space position to the tile whose center it is nearest to.
    ///
    /// Each axis uses `floor((coord + ceil(tile_size / 2)) / tile_size)`, so a
    /// sprite's top-left corner maps to the tile holding the sprite's center.
    #[must_use]
    pub fn get_coord(&self, x: f32, y: f32) -> CellCoord {
        let half = (self.tile_size / 2.0).ceil();
        let row = ((y + half) / self.tile_size).floor().max(0.0) as u32;
        let column = ((x + half) / self.tile_size).floor().max(0.0) as u32;
        CellCoord::new(row, column)
    }

    /// World-space rectangle covered by the tile.
    #[must_use]
    pub fn cell_rect(&self, cell: CellCoord) -> Rect {
        self.dimensions().cell_rect(cell)
    }

    /// Reports whether a bubble sits on the tile. The cell must be in bounds.
    #[must_use]
    pub fn has_bubble(&self, cell: CellCoord) -> bool {
        self.tiles[self.index(cell)].has_bubble
    }

    /// Flips the tile's bubble flag. The cell must be in bounds.
    pub(crate) fn toggle_bubble(&mut self, cell: CellCoord) {
        let index = self.index(cell);
        let tile = &mut self.tiles[index];
        tile.has_bubble = !tile.has_bubble;
    }

    /// Iterator over tiles currently holding a bubble, in row-major order.
    pub fn bubble_cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.tiles
            .iter()
            .filter(|tile| tile.has_bubble)
            .map(|tile| tile.cell)
    }

    fn index(&self, cell: CellCoord) -> usize {
        debug_assert!(
            self.contains(cell),
            "tile {cell:?} outside {size}x{size} grid",
            size = self.size
        );
        cell.row() as usize * self.size as usize + cell.column() as usize
    }
}
