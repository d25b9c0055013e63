#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Bubble Arena.

mod bubbles;
mod explosions;
mod grid;
mod items;
mod level;
mod movement;
mod obstacles;
mod players;

use std::{collections::BTreeMap, time::Duration};

use bubble_arena_core::{
    CellCoord, Command, DropRejection, Event, PlayerId, SpawnRejection, EXPLOSION_LIFETIME,
    FUSE_DURATION,
};
use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use bubbles::{Bubble, BubbleGroups};
use explosions::{BlastTerrain, ExplosionGroups};
use movement::Terrain;
use players::PlayerState;

pub use grid::TileGrid;
pub use items::DropTable;
pub use level::{LayoutError, LevelLayout, LevelTag};
pub use obstacles::RegistryError;
pub use players::PlayerDefaults;

const DEFAULT_GRID_SIZE: u32 = 15;
const DEFAULT_TILE_SIZE: f32 = 80.0;
const DEFAULT_RNG_SEED: u64 = 0x0b0b_b1e5_a7e4_a5ed;

/// Tunables applied when the world is created.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldConfig {
    /// Number of tiles per side.
    pub grid_size: u32,
    /// Side length of a tile in world units.
    pub tile_size: f32,
    /// Delay between a group's creation and its detonation.
    pub fuse: Duration,
    /// Lifetime of explosion groups.
    pub explosion_lifetime: Duration,
    /// Item drop rules for shattered blocks.
    pub drop_table: DropTable,
    /// Seed of the random generator used for item drops.
    pub rng_seed: u64,
    /// Starting statistics of spawned players.
    pub player: PlayerDefaults,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            tile_size: DEFAULT_TILE_SIZE,
            fuse: FUSE_DURATION,
            explosion_lifetime: EXPLOSION_LIFETIME,
            drop_table: DropTable::default(),
            rng_seed: DEFAULT_RNG_SEED,
            player: PlayerDefaults::default(),
        }
    }
}

/// Errors raised while assembling a world.
#[derive(Debug, Error, PartialEq)]
pub enum WorldError {
    /// The level layout is malformed.
    #[error(transparent)]
    Layout(#[from] LayoutError),
    /// The level does not match the configured grid.
    #[error("level is {found} tiles wide but the grid holds {expected}")]
    SizeMismatch {
        /// Configured grid size.
        expected: u32,
        /// Size declared by the level.
        found: u32,
    },
    /// The tile size cannot produce a usable arena.
    #[error("tile size must be positive, got {0}")]
    InvalidTileSize(f32),
}

/// Represents the authoritative Bubble Arena world state.
#[derive(Debug)]
pub struct World {
    clock: Duration,
    fuse: Duration,
    explosion_lifetime: Duration,
    drop_table: DropTable,
    player_defaults: PlayerDefaults,
    grid: TileGrid,
    obstacles: obstacles::ObstacleRegistry,
    items: items::ItemRegistry,
    bubbles: BubbleGroups,
    explosions: ExplosionGroups,
    players: BTreeMap<PlayerId, PlayerState>,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates a world from the configuration and seeds it with the level.
    ///
    /// Tags that collide with an existing registry entry are logged and
    /// skipped; the first entry stays.
    pub fn new(config: WorldConfig, layout: &LevelLayout) -> Result<Self, WorldError> {
        layout.validate()?;
        if layout.size() != config.grid_size {
            return Err(WorldError::SizeMismatch {
                expected: config.grid_size,
                found: layout.size(),
            });
        }
        if !(config.tile_size > 0.0) {
            return Err(WorldError::InvalidTileSize(config.tile_size));
        }

        let mut world = Self {
            clock: Duration::ZERO,
            fuse: config.fuse,
            explosion_lifetime: config.explosion_lifetime,
            drop_table: config.drop_table,
            player_defaults: config.player,
            grid: TileGrid::new(config.grid_size, config.tile_size),
            obstacles: obstacles::ObstacleRegistry::default(),
            items: items::ItemRegistry::default(),
            bubbles: BubbleGroups::new(),
            explosions: ExplosionGroups::new(),
            players: BTreeMap::new(),
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        };

        for (cell, tag) in layout.tags() {
            let registered = match tag {
                LevelTag::Item { kind } => world.items.insert(cell, kind),
                _ => match tag.obstacle_at(cell) {
                    Some(obstacle) => world.obstacles.insert(obstacle),
                    None => Ok(()),
                },
            };
            if let Err(error) = registered {
                log::warn!("skipping level tag {tag:?}: {error}");
            }
        }

        log::debug!(
            "world ready: {size}x{size} grid, {obstacles} obstacles, {items} items",
            size = config.grid_size,
            obstacles = world.obstacles.iter().count(),
            items = world.items.iter().count(),
        );
        Ok(world)
    }

    fn detonate_expired(&mut self, out_events: &mut Vec<Event>) {
        let now = self.clock;
        for group in self.bubbles.take_expired(now, self.fuse) {
            let cells: Vec<CellCoord> = group.members.iter().map(|bubble| bubble.cell).collect();
            for cell in &cells {
                self.grid.toggle_bubble(*cell);
            }
            log::debug!("bubble group {} detonated ({} bubbles)", group.id.get(), cells.len());
            out_events.push(Event::BubbleGroupDetonated {
                group: group.id,
                cells,
            });

            let mut refunds: BTreeMap<PlayerId, u32> = BTreeMap::new();
            for bubble in &group.members {
                *refunds.entry(bubble.owner).or_insert(0) += 1;
            }
            for (owner, count) in refunds {
                if let Some(player) = self.players.get_mut(&owner) {
                    player.num_bubbles = player.num_bubbles.saturating_add(count);
                    out_events.push(Event::BubblesRefunded {
                        player: owner,
                        count,
                    });
                }
            }

            let mut terrain = BlastTerrain {
                grid_size: self.grid.size(),
                obstacles: &mut self.obstacles,
                items: &mut self.items,
                drop_table: &self.drop_table,
            };
            let blast = explosions::propagate(&group.members, &mut terrain, &mut self.rng, out_events);
            let cell_count = u32::try_from(blast.len()).unwrap_or(u32::MAX);
            let id = self.explosions.spawn(blast, now);
            out_events.push(Event::ExplosionGroupSpawned {
                group: id,
                cell_count,
            });
        }
    }

    fn clear_expired_explosions(&mut self, out_events: &mut Vec<Event>) {
        for group in self.explosions.take_expired(self.clock, self.explosion_lifetime) {
            out_events.push(Event::ExplosionGroupExpired { group });
        }
    }

    fn spawn_player(&mut self, player: PlayerId, cell: CellCoord) -> Result<Vec2, SpawnRejection> {
        if self.players.contains_key(&player) {
            return Err(SpawnRejection::DuplicatePlayer);
        }
        if !self.grid.contains(cell) {
            return Err(SpawnRejection::OutOfBounds);
        }
        if self.obstacles.contains(cell) {
            return Err(SpawnRejection::Obstructed);
        }

        let rect = self.grid.cell_rect(cell);
        let position = Vec2::new(rect.x, rect.y);
        let size = Vec2::splat(self.grid.tile_size());
        let state = PlayerState::new(player, position, size, &self.player_defaults);
        let _ = self.players.insert(player, state);
        Ok(position)
    }

    fn drop_bubble(&mut self, player: PlayerId, out_events: &mut Vec<Event>) {
        let Some(state) = self.players.get_mut(&player) else {
            return;
        };
        let cell = self.grid.get_coord(state.position.x, state.position.y);

        let rejection = if !self.grid.contains(cell) {
            Some(DropRejection::OutOfBounds)
        } else if state.num_bubbles == 0 {
            Some(DropRejection::NoBubblesLeft)
        } else if self.grid.has_bubble(cell) {
            Some(DropRejection::TileHasBubble)
        } else if self.obstacles.contains(cell) {
            Some(DropRejection::TileHasObstacle)
        } else {
            None
        };
        if let Some(reason) = rejection {
            out_events.push(Event::BubbleRejected {
                player,
                cell,
                reason,
            });
            return;
        }

        state.num_bubbles -= 1;
        self.grid.toggle_bubble(cell);
        let bubble = Bubble {
            cell,
            owner: player,
            explosion_range: state.explosion_range,
        };
        let obstacles = &self.obstacles;
        let placement = self
            .bubbles
            .add_bubble(bubble, self.clock, |cell| obstacles.contains(cell));

        out_events.push(Event::BubblePlaced {
            player,
            cell,
            group: placement.group,
        });
        for absorbed in placement.absorbed {
            log::debug!(
                "bubble group {} absorbed group {}",
                placement.group.get(),
                absorbed.get()
            );
            out_events.push(Event::BubbleGroupsMerged {
                into: placement.group,
                absorbed,
            });
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.clock = world.clock.saturating_add(dt);
            out_events.push(Event::TimeAdvanced {
                dt,
                now: world.clock,
            });
            world.detonate_expired(out_events);
            world.clear_expired_explosions(out_events);
        }
        Command::SpawnPlayer { player, cell } => match world.spawn_player(player, cell) {
            Ok(position) => out_events.push(Event::PlayerSpawned { player, position }),
            Err(reason) => {
                log::warn!("spawn of player {} refused: {reason:?}", player.get());
                out_events.push(Event::PlayerSpawnRejected {
                    player,
                    cell,
                    reason,
                });
            }
        },
        Command::RemovePlayer { player } => {
            if world.players.remove(&player).is_some() {
                out_events.push(Event::PlayerRemoved { player });
            }
        }
        Command::MovePlayer { player, direction } => {
            let Some(state) = world.players.get_mut(&player) else {
                return;
            };
            state.face(direction);
            let terrain = Terrain {
                grid: &world.grid,
                obstacles: &world.obstacles,
            };
            let from = state.position;
            match movement::attempt_step(terrain, from, state.sprite_size, state.speed, direction) {
                Some(to) => {
                    state.position = to;
                    out_events.push(Event::PlayerMoved { player, from, to });
                }
                None => out_events.push(Event::PlayerBlocked { player, direction }),
            }
        }
        Command::HaltPlayer { player } => {
            if let Some(state) = world.players.get_mut(&player) {
                if state.idle() {
                    out_events.push(Event::PlayerIdled { player });
                }
            }
        }
        Command::DropBubble { player } => world.drop_bubble(player, out_events),
        Command::UseItem { player, slot } => {
            let Some(state) = world.players.get_mut(&player) else {
                return;
            };
            match state.use_item(slot) {
                Ok(_) => out_events.push(Event::PlayerFreed { player }),
                Err(reason) => out_events.push(Event::ItemUseRejected {
                    player,
                    slot,
                    reason,
                }),
            }
        }
        Command::TrapPlayer { player } => {
            if let Some(state) = world.players.get_mut(&player) {
                if state.trap(world.clock) {
                    out_events.push(Event::PlayerTrapped { player });
                }
            }
        }
        Command::PickUpItem { player, cell } => {
            let Some(state) = world.players.get_mut(&player) else {
                return;
            };
            // Stale requests for items destroyed or collected earlier are ignored.
            let Some(kind) = world.items.remove(cell) else {
                return;
            };
            state.acquire(kind);
            log::debug!("player {} picked up {kind:?}", player.get());
            out_events.push(Event::ItemAcquired { player, cell, kind });
        }
        Command::SyncPlayerPosition { player, position } => {
            let limit = world.grid.arena_length();
            let Some(state) = world.players.get_mut(&player) else {
                return;
            };
            let max = (Vec2::splat(limit) - state.sprite_size).max(Vec2::ZERO);
            let to = position.clamp(Vec2::ZERO, max);
            let from = state.position;
            if to != from {
                state.position = to;
                out_events.push(Event::PlayerMoved { player, from, to });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use bubble_arena_core::{
        ArenaDimensions, BubbleGroupView, CellCoord, ExplosionView, ItemSnapshot, ItemView,
        Obstacle, PlayerView,
    };

    use super::{TileGrid, World};

    /// Current value of the simulation clock.
    #[must_use]
    pub fn now(world: &World) -> Duration {
        world.clock
    }

    /// Dimensions of the arena.
    #[must_use]
    pub fn dimensions(world: &World) -> ArenaDimensions {
        world.grid.dimensions()
    }

    /// Provides read-only access to the tile grid.
    #[must_use]
    pub fn tile_grid(world: &World) -> &TileGrid {
        &world.grid
    }

    /// Reports whether a bubble rests on the cell. Cells outside the grid
    /// never hold one.
    #[must_use]
    pub fn has_bubble(world: &World, cell: CellCoord) -> bool {
        world.grid.contains(cell) && world.grid.has_bubble(cell)
    }

    /// Captures a read-only view of every player.
    #[must_use]
    pub fn player_view(world: &World) -> PlayerView {
        PlayerView::from_snapshots(
            world
                .players
                .values()
                .map(|player| {
                    let cell = world.grid.get_coord(player.position.x, player.position.y);
                    player.snapshot(cell)
                })
                .collect(),
        )
    }

    /// Captures a read-only view of every live bubble group.
    #[must_use]
    pub fn bubble_group_view(world: &World) -> BubbleGroupView {
        BubbleGroupView::from_snapshots(world.bubbles.snapshots())
    }

    /// Captures a read-only view of every live explosion cell.
    #[must_use]
    pub fn explosion_view(world: &World) -> ExplosionView {
        ExplosionView::from_snapshots(world.explosions.snapshots(world.grid.dimensions()))
    }

    /// Captures a read-only view of the items lying in the arena.
    #[must_use]
    pub fn item_view(world: &World) -> ItemView {
        ItemView::from_snapshots(
            world
                .items
                .iter()
                .map(|(cell, kind)| ItemSnapshot {
                    cell,
                    kind,
                    rect: world.grid.cell_rect(cell),
                })
                .collect(),
        )
    }

    /// Lists every obstacle in cell order.
    #[must_use]
    pub fn obstacles(world: &World) -> Vec<Obstacle> {
        world.obstacles.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bubble_arena_core::{Direction, ItemKind, ItemUseRejection};

    fn world() -> World {
        World::new(WorldConfig::default(), &LevelLayout::empty(15)).expect("world")
    }

    fn spawn(world: &mut World, id: u32, row: u32, column: u32) -> PlayerId {
        let player = PlayerId::new(id);
        let mut events = Vec::new();
        apply(
            world,
            Command::SpawnPlayer {
                player,
                cell: CellCoord::new(row, column),
            },
            &mut events,
        );
        assert!(matches!(events[..], [Event::PlayerSpawned { .. }]));
        player
    }

    #[test]
    fn level_size_must_match_grid() {
        let error = World::new(WorldConfig::default(), &LevelLayout::empty(9)).expect_err("size");
        assert_eq!(
            error,
            WorldError::SizeMismatch {
                expected: 15,
                found: 9,
            }
        );
    }

    #[test]
    fn spawn_rejects_duplicates_and_obstructed_cells() {
        let layout = LevelLayout::empty(15).with_tag(CellCoord::new(0, 0), LevelTag::Post);
        let mut world = World::new(WorldConfig::default(), &layout).expect("world");
        let player = spawn(&mut world, 1, 3, 3);

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnPlayer {
                player,
                cell: CellCoord::new(4, 4),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SpawnPlayer {
                player: PlayerId::new(2),
                cell: CellCoord::new(0, 0),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SpawnPlayer {
                player: PlayerId::new(3),
                cell: CellCoord::new(15, 0),
            },
            &mut events,
        );

        let reasons: Vec<SpawnRejection> = events
            .iter()
            .filter_map(|event| match event {
                Event::PlayerSpawnRejected { reason, .. } => Some(*reason),
                _ => None,
            })
            .collect();
        assert_eq!(
            reasons,
            vec![
                SpawnRejection::DuplicatePlayer,
                SpawnRejection::Obstructed,
                SpawnRejection::OutOfBounds,
            ]
        );
    }

    #[test]
    fn drop_consumes_a_bubble_and_marks_the_tile() {
        let mut world = world();
        let player = spawn(&mut world, 1, 7, 7);
        let mut events = Vec::new();
        apply(&mut world, Command::DropBubble { player }, &mut events);
        apply(&mut world, Command::DropBubble { player }, &mut events);

        assert!(matches!(events[0], Event::BubblePlaced { .. }));
        assert_eq!(
            events[1],
            Event::BubbleRejected {
                player,
                cell: CellCoord::new(7, 7),
                reason: DropRejection::NoBubblesLeft,
            }
        );
        assert!(query::has_bubble(&world, CellCoord::new(7, 7)));
        let view = query::player_view(&world);
        assert_eq!(view.get(player).map(|snapshot| snapshot.num_bubbles), Some(0));
    }

    #[test]
    fn second_bubble_on_same_tile_is_rejected() {
        let mut world = world();
        let player = spawn(&mut world, 1, 7, 7);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PickUpItem {
                player,
                cell: CellCoord::new(0, 0),
            },
            &mut events,
        );
        assert!(events.is_empty());

        world.players.get_mut(&player).expect("player").num_bubbles = 2;
        apply(&mut world, Command::DropBubble { player }, &mut events);
        apply(&mut world, Command::DropBubble { player }, &mut events);
        assert!(matches!(
            events[1],
            Event::BubbleRejected {
                reason: DropRejection::TileHasBubble,
                ..
            }
        ));
    }

    #[test]
    fn movement_reports_moves_and_blocks() {
        let mut world = world();
        let player = spawn(&mut world, 1, 0, 0);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::MovePlayer {
                player,
                direction: Direction::Up,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::MovePlayer {
                player,
                direction: Direction::Right,
            },
            &mut events,
        );
        apply(&mut world, Command::HaltPlayer { player }, &mut events);
        apply(&mut world, Command::HaltPlayer { player }, &mut events);

        assert_eq!(
            events,
            vec![
                Event::PlayerBlocked {
                    player,
                    direction: Direction::Up,
                },
                Event::PlayerMoved {
                    player,
                    from: Vec2::ZERO,
                    to: Vec2::new(4.0, 0.0),
                },
                Event::PlayerIdled { player },
            ]
        );
    }

    #[test]
    fn trap_is_reported_once_and_needle_frees() {
        let mut world = world();
        let player = spawn(&mut world, 1, 2, 2);
        let _ = world.items.insert(CellCoord::new(2, 2), ItemKind::Needle);
        let mut events = Vec::new();

        apply(&mut world, Command::UseItem { player, slot: 0 }, &mut events);
        apply(
            &mut world,
            Command::PickUpItem {
                player,
                cell: CellCoord::new(2, 2),
            },
            &mut events,
        );
        apply(&mut world, Command::UseItem { player, slot: 0 }, &mut events);
        apply(&mut world, Command::TrapPlayer { player }, &mut events);
        apply(&mut world, Command::TrapPlayer { player }, &mut events);
        apply(&mut world, Command::UseItem { player, slot: 0 }, &mut events);

        assert_eq!(
            events,
            vec![
                Event::ItemUseRejected {
                    player,
                    slot: 0,
                    reason: ItemUseRejection::EmptySlot,
                },
                Event::ItemAcquired {
                    player,
                    cell: CellCoord::new(2, 2),
                    kind: ItemKind::Needle,
                },
                Event::ItemUseRejected {
                    player,
                    slot: 0,
                    reason: ItemUseRejection::NoEffect,
                },
                Event::PlayerTrapped { player },
                Event::PlayerFreed { player },
            ]
        );
    }

    #[test]
    fn synced_positions_are_clamped_to_the_arena() {
        let mut world = world();
        let player = spawn(&mut world, 4, 1, 1);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SyncPlayerPosition {
                player,
                position: Vec2::new(5000.0, -20.0),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::PlayerMoved {
                player,
                from: Vec2::new(80.0, 80.0),
                to: Vec2::new(1120.0, 0.0),
            }]
        );
    }

    #[test]
    fn removed_players_are_not_refunded() {
        let mut world = world();
        let player = spawn(&mut world, 1, 7, 7);
        let mut events = Vec::new();
        apply(&mut world, Command::DropBubble { player }, &mut events);
        apply(&mut world, Command::RemovePlayer { player }, &mut events);
        events.clear();

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(3000),
            },
            &mut events,
        );
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::BubblesRefunded { .. })));
        assert!(!query::has_bubble(&world, CellCoord::new(7, 7)));
    }
}
