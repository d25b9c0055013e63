//! Blast propagation and the short-lived explosion groups it leaves behind.

use std::{
    collections::{BTreeMap, BTreeSet},
    time::Duration,
};

use bubble_arena_core::{
    ArenaDimensions, BlastContact, CellCoord, Direction, Event, ExplosionDirection,
    ExplosionGroupId, ExplosionSnapshot,
};
use rand::Rng;

use crate::{bubbles::Bubble, items::ItemRegistry, obstacles::ObstacleRegistry, DropTable};

/// Single hazard cell produced by a detonation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ExplosionCell {
    pub(crate) cell: CellCoord,
    pub(crate) direction: ExplosionDirection,
}

/// Cells produced by one detonation event.
#[derive(Clone, Debug)]
pub(crate) struct ExplosionGroup {
    pub(crate) id: ExplosionGroupId,
    pub(crate) cells: Vec<ExplosionCell>,
    pub(crate) created_at: Duration,
}

/// Owns every live explosion group and allocates their identifiers.
#[derive(Debug)]
pub(crate) struct ExplosionGroups {
    groups: BTreeMap<ExplosionGroupId, ExplosionGroup>,
    next_id: u32,
}

impl ExplosionGroups {
    pub(crate) fn new() -> Self {
        Self {
            groups: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Registers the cells of a detonation as a new group lit at `now`.
    pub(crate) fn spawn(&mut self, cells: Vec<ExplosionCell>, now: Duration) -> ExplosionGroupId {
        let id = ExplosionGroupId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        let _ = self.groups.insert(
            id,
            ExplosionGroup {
                id,
                cells,
                created_at: now,
            },
        );
        id
    }

    /// Removes every group that outlived `lifetime`, returning their identifiers.
    pub(crate) fn take_expired(&mut self, now: Duration, lifetime: Duration) -> Vec<ExplosionGroupId> {
        let expired: Vec<ExplosionGroupId> = self
            .groups
            .values()
            .filter(|group| now.saturating_sub(group.created_at) >= lifetime)
            .map(|group| group.id)
            .collect();
        for id in &expired {
            let _ = self.groups.remove(id);
        }
        expired
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &ExplosionGroup> {
        self.groups.values()
    }

    pub(crate) fn snapshots(&self, dimensions: ArenaDimensions) -> Vec<ExplosionSnapshot> {
        self.iter()
            .flat_map(|group| {
                group.cells.iter().map(move |cell| ExplosionSnapshot {
                    group: group.id,
                    cell: cell.cell,
                    direction: cell.direction,
                    rect: dimensions.cell_rect(cell.cell),
                })
            })
            .collect()
    }
}

/// Registries a blast may mutate while it travels.
pub(crate) struct BlastTerrain<'a> {
    pub(crate) grid_size: u32,
    pub(crate) obstacles: &'a mut ObstacleRegistry,
    pub(crate) items: &'a mut ItemRegistry,
    pub(crate) drop_table: &'a DropTable,
}

/// Accumulates the cells of one detonation event.
///
/// A cell is recorded once per event even when several arms cross it. Blocks
/// shattered earlier in the event keep stopping later arms, so an item dropped
/// by a block survives the event that freed it.
#[derive(Debug, Default)]
struct Blast {
    cells: Vec<ExplosionCell>,
    covered: BTreeSet<CellCoord>,
    shattered: BTreeSet<CellCoord>,
}

impl Blast {
    fn cover(&mut self, cell: CellCoord, direction: ExplosionDirection) {
        if self.covered.insert(cell) {
            self.cells.push(ExplosionCell { cell, direction });
        }
    }
}

/// Detonates `bubbles` as a single event and returns the resulting cells.
///
/// Every bubble covers its own tile, then each arm walks `1..=range` tiles.
/// An arm stops at the grid edge or at the first obstacle; destructible
/// obstacles are removed and may leave an item from the drop table. Items on
/// cells an arm passes through are destroyed.
pub(crate) fn propagate<R>(
    bubbles: &[Bubble],
    terrain: &mut BlastTerrain<'_>,
    rng: &mut R,
    out_events: &mut Vec<Event>,
) -> Vec<ExplosionCell>
where
    R: Rng + ?Sized,
{
    let mut blast = Blast::default();
    for bubble in bubbles {
        blast.cover(bubble.cell, ExplosionDirection::Center);
    }

    for bubble in bubbles {
        for direction in Direction::ALL {
            for offset in 1..=bubble.explosion_range {
                let Some(cell) = bubble.cell.step(direction, offset, terrain.grid_size) else {
                    break;
                };
                if blast.shattered.contains(&cell) {
                    break;
                }

                if let Some(obstacle) = terrain.obstacles.get(cell).copied() {
                    if obstacle.kind().on_blast_contact() == BlastContact::Shatter {
                        let _ = terrain.obstacles.remove(cell);
                        let _ = blast.shattered.insert(cell);
                        out_events.push(Event::ObstacleDestroyed {
                            cell,
                            kind: obstacle.kind(),
                        });
                        drop_item(cell, terrain, rng, out_events);
                    }
                    break;
                }

                if let Some(kind) = terrain.items.remove(cell) {
                    out_events.push(Event::ItemDestroyed { cell, kind });
                }
                blast.cover(cell, direction.into());
            }
        }
    }

    blast.cells
}

fn drop_item<R>(
    cell: CellCoord,
    terrain: &mut BlastTerrain<'_>,
    rng: &mut R,
    out_events: &mut Vec<Event>,
) where
    R: Rng + ?Sized,
{
    let Some(kind) = terrain.drop_table.roll(rng) else {
        return;
    };
    match terrain.items.insert(cell, kind) {
        Ok(()) => out_events.push(Event::ItemDropped { cell, kind }),
        Err(error) => log::warn!("dropped item discarded: {error}"),
    }
}
