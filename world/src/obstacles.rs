//! Sparse obstacle registry keyed by cell.

use std::collections::BTreeMap;

use bubble_arena_core::{CellCoord, Obstacle};
use thiserror::Error;

/// Errors raised when registering an entry on an already occupied cell.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// An obstacle already occupies the cell.
    #[error("cell ({}, {}) already holds an obstacle", .0.row(), .0.column())]
    ObstacleOccupied(CellCoord),
    /// An item already lies on the cell.
    #[error("cell ({}, {}) already holds an item", .0.row(), .0.column())]
    ItemOccupied(CellCoord),
}

/// Registry of obstacles owned by the world.
#[derive(Clone, Debug, Default)]
pub(crate) struct ObstacleRegistry {
    entries: BTreeMap<CellCoord, Obstacle>,
}

impl ObstacleRegistry {
    /// Registers an obstacle, refusing cells that are already occupied.
    pub(crate) fn insert(&mut self, obstacle: Obstacle) -> Result<(), RegistryError> {
        let cell = obstacle.cell();
        if self.entries.contains_key(&cell) {
            return Err(RegistryError::ObstacleOccupied(cell));
        }
        let _ = self.entries.insert(cell, obstacle);
        Ok(())
    }

    pub(crate) fn get(&self, cell: CellCoord) -> Option<&Obstacle> {
        self.entries.get(&cell)
    }

    pub(crate) fn contains(&self, cell: CellCoord) -> bool {
        self.entries.contains_key(&cell)
    }

    pub(crate) fn remove(&mut self, cell: CellCoord) -> Option<Obstacle> {
        self.entries.remove(&cell)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.entries.values()
    }
}
