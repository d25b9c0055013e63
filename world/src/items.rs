//! Item registry and the drop table rolled when blocks shatter.

use std::collections::BTreeMap;

use bubble_arena_core::{CellCoord, ItemKind, DEFAULT_DROP_CHANCE};
use rand::{seq::SliceRandom, Rng};

use crate::obstacles::RegistryError;

/// Registry of items lying in the arena.
#[derive(Clone, Debug, Default)]
pub(crate) struct ItemRegistry {
    entries: BTreeMap<CellCoord, ItemKind>,
}

impl ItemRegistry {
    /// Registers an item, refusing cells that already hold one.
    pub(crate) fn insert(&mut self, cell: CellCoord, kind: ItemKind) -> Result<(), RegistryError> {
        if self.entries.contains_key(&cell) {
            return Err(RegistryError::ItemOccupied(cell));
        }
        let _ = self.entries.insert(cell, kind);
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn get(&self, cell: CellCoord) -> Option<ItemKind> {
        self.entries.get(&cell).copied()
    }

    pub(crate) fn remove(&mut self, cell: CellCoord) -> Option<ItemKind> {
        self.entries.remove(&cell)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (CellCoord, ItemKind)> + '_ {
        self.entries.iter().map(|(cell, kind)| (*cell, *kind))
    }
}

/// Chance and candidate kinds used when a destroyed block may leave an item.
#[derive(Clone, Debug, PartialEq)]
pub struct DropTable {
    chance: f64,
    kinds: Vec<ItemKind>,
}

impl DropTable {
    /// Creates a drop table. The chance is clamped to `0.0..=1.0`.
    #[must_use]
    pub fn new(chance: f64, kinds: Vec<ItemKind>) -> Self {
        let chance = if chance.is_nan() {
            0.0
        } else {
            chance.clamp(0.0, 1.0)
        };
        Self { chance, kinds }
    }

    /// Drop table that never yields an item.
    #[must_use]
    pub fn never() -> Self {
        Self::new(0.0, Vec::new())
    }

    /// Probability that a destroyed block leaves an item.
    #[must_use]
    pub fn chance(&self) -> f64 {
        self.chance
    }

    /// Item kinds chosen uniformly when a drop happens.
    #[must_use]
    pub fn kinds(&self) -> &[ItemKind] {
        &self.kinds
    }

    /// Rolls the table once.
    pub(crate) fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<ItemKind> {
        if self.kinds.is_empty() || self.chance <= 0.0 {
            return None;
        }
        if !rng.gen_bool(self.chance) {
            return None;
        }
        self.kinds.choose(rng).copied()
    }
}

impl Default for DropTable {
    fn default() -> Self {
        Self::new(DEFAULT_DROP_CHANCE, ItemKind::ALL.to_vec())
    }
}
