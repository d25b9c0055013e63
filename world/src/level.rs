//! Static level layouts used to seed the obstacle and item registries.

use bubble_arena_core::{BlockVariant, CellCoord, ItemKind, Obstacle};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Content authored for a single cell of the level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum LevelTag {
    /// Permanent post.
    Post,
    /// Destructible block with its visual variant.
    Block {
        /// Variant drawn by the renderer.
        variant: u16,
    },
    /// Item lying in the arena from the start.
    Item {
        /// Kind of the item.
        kind: ItemKind,
    },
}

impl LevelTag {
    /// Obstacle described by the tag, if any.
    #[must_use]
    pub fn obstacle_at(self, cell: CellCoord) -> Option<Obstacle> {
        match self {
            Self::Post => Some(Obstacle::post(cell)),
            Self::Block { variant } => Some(Obstacle::block(cell, BlockVariant::new(variant))),
            Self::Item { .. } => None,
        }
    }
}

/// Problems detected while validating a level layout.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    /// The layout declares no tiles.
    #[error("level layout must be at least one tile wide")]
    Empty,
    /// The number of rows differs from the declared size.
    #[error("level declares {expected} rows but lists {found}")]
    RowCount {
        /// Declared size.
        expected: u32,
        /// Rows present in the layout.
        found: usize,
    },
    /// A row holds the wrong number of cells.
    #[error("row {row} holds {found} cells, expected {expected}")]
    RowLength {
        /// Index of the offending row.
        row: usize,
        /// Declared size.
        expected: u32,
        /// Cells present in the row.
        found: usize,
    },
}

/// Square grid of optional tags, row-major.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelLayout {
    size: u32,
    cells: Vec<Vec<Option<LevelTag>>>,
}

impl LevelLayout {
    /// Creates a layout of `size` tiles per side with no content.
    #[must_use]
    pub fn empty(size: u32) -> Self {
        Self {
            size,
            cells: vec![vec![None; size as usize]; size as usize],
        }
    }

    /// Returns the layout with `tag` placed on `cell`. Cells outside the
    /// layout are ignored.
    #[must_use]
    pub fn with_tag(mut self, cell: CellCoord, tag: LevelTag) -> Self {
        if let Some(slot) = self
            .cells
            .get_mut(cell.row() as usize)
            .and_then(|row| row.get_mut(cell.column() as usize))
        {
            *slot = Some(tag);
        }
        self
    }

    /// Number of tiles per side.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Checks that the rows form a square matching the declared size.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.size == 0 {
            return Err(LayoutError::Empty);
        }
        if self.cells.len() != self.size as usize {
            return Err(LayoutError::RowCount {
                expected: self.size,
                found: self.cells.len(),
            });
        }
        for (row, cells) in self.cells.iter().enumerate() {
            if cells.len() != self.size as usize {
                return Err(LayoutError::RowLength {
                    row,
                    expected: self.size,
                    found: cells.len(),
                });
            }
        }
        Ok(())
    }

    /// Iterator over tagged cells in row-major order.
    pub fn tags(&self) -> impl Iterator<Item = (CellCoord, LevelTag)> + '_ {
        self.cells.iter().enumerate().flat_map(|(row, cells)| {
            cells.iter().enumerate().filter_map(move |(column, tag)| {
                tag.map(|tag| (CellCoord::new(row as u32, column as u32), tag))
            })
        })
    }
}
