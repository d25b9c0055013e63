#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Bubble Arena engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! describing what actually happened. Systems consume event streams, query
//! immutable views, and respond exclusively with new command batches.

mod overlap;

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use overlap::{collided, CollisionKind, Rect};

/// Delay between a bubble group's creation and its detonation.
pub const FUSE_DURATION: Duration = Duration::from_millis(3000);

/// Lifetime of an explosion group before its cells are cleared.
pub const EXPLOSION_LIFETIME: Duration = Duration::from_millis(500);

/// Maximum number of items a player can carry.
pub const INVENTORY_CAPACITY: usize = 5;

/// Probability that a destroyed block leaves an item behind.
pub const DEFAULT_DROP_CHANCE: f64 = 0.25;

/// Increase applied to a player's maximum speed by a speed shoe.
pub const SPEED_SHOE_BONUS: f32 = 0.3;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a player entity be created standing on the provided cell.
    SpawnPlayer {
        /// Identifier to assign to the new player.
        player: PlayerId,
        /// Cell whose top-left corner becomes the player's position.
        cell: CellCoord,
    },
    /// Requests removal of a player, for example after a relay disconnect.
    RemovePlayer {
        /// Identifier of the player leaving the arena.
        player: PlayerId,
    },
    /// Requests a single movement step in the provided direction.
    MovePlayer {
        /// Identifier of the player attempting to move.
        player: PlayerId,
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Reports that the player holds no directional key.
    HaltPlayer {
        /// Identifier of the player that stopped moving.
        player: PlayerId,
    },
    /// Requests that the player drop a bubble on its current tile.
    DropBubble {
        /// Identifier of the player dropping the bubble.
        player: PlayerId,
    },
    /// Requests activation of an inventory slot.
    UseItem {
        /// Identifier of the player using the item.
        player: PlayerId,
        /// Zero-based inventory slot, newest item first.
        slot: usize,
    },
    /// Reports that a player's hitbox overlaps a live explosion.
    TrapPlayer {
        /// Identifier of the player caught by the explosion.
        player: PlayerId,
    },
    /// Reports that a player's hitbox overlaps an item lying in the arena.
    PickUpItem {
        /// Identifier of the player collecting the item.
        player: PlayerId,
        /// Cell holding the item.
        cell: CellCoord,
    },
    /// Overwrites a player's position with one reported by a remote peer.
    SyncPlayerPosition {
        /// Identifier of the remote player.
        player: PlayerId,
        /// World-space top-left corner of the player's sprite.
        position: Vec2,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
        /// Simulation clock after the advance.
        now: Duration,
    },
    /// Confirms that a player entered the arena.
    PlayerSpawned {
        /// Identifier of the new player.
        player: PlayerId,
        /// World-space top-left corner of the player's sprite.
        position: Vec2,
    },
    /// Reports that a spawn request was refused.
    PlayerSpawnRejected {
        /// Identifier requested for the player.
        player: PlayerId,
        /// Cell requested as the spawn point.
        cell: CellCoord,
        /// Specific reason the spawn failed.
        reason: SpawnRejection,
    },
    /// Confirms that a player left the arena.
    PlayerRemoved {
        /// Identifier of the removed player.
        player: PlayerId,
    },
    /// Confirms that a player changed position.
    PlayerMoved {
        /// Identifier of the player that moved.
        player: PlayerId,
        /// Position before the move.
        from: Vec2,
        /// Position after the move.
        to: Vec2,
    },
    /// Reports that a movement step was refused.
    PlayerBlocked {
        /// Identifier of the player that could not move.
        player: PlayerId,
        /// Direction of the refused step.
        direction: Direction,
    },
    /// Announces that a player switched to its idle animation.
    PlayerIdled {
        /// Identifier of the idle player.
        player: PlayerId,
    },
    /// Confirms that a bubble was placed on the grid.
    BubblePlaced {
        /// Owner of the bubble.
        player: PlayerId,
        /// Tile holding the bubble.
        cell: CellCoord,
        /// Group the bubble joined after merging.
        group: BubbleGroupId,
    },
    /// Reports that a bubble drop was refused.
    BubbleRejected {
        /// Player that attempted the drop.
        player: PlayerId,
        /// Tile the player was standing on.
        cell: CellCoord,
        /// Specific reason the drop failed.
        reason: DropRejection,
    },
    /// Reports that one bubble group was absorbed into another.
    BubbleGroupsMerged {
        /// Group that survived the merge.
        into: BubbleGroupId,
        /// Group whose bubbles were absorbed.
        absorbed: BubbleGroupId,
    },
    /// Confirms that a bubble group's fuse ran out.
    BubbleGroupDetonated {
        /// Identifier of the detonated group.
        group: BubbleGroupId,
        /// Tiles that held the group's bubbles.
        cells: Vec<CellCoord>,
    },
    /// Confirms that detonated bubbles were returned to their owner.
    BubblesRefunded {
        /// Owner credited with the bubbles.
        player: PlayerId,
        /// Number of bubbles credited.
        count: u32,
    },
    /// Confirms that a blast destroyed an obstacle.
    ObstacleDestroyed {
        /// Cell previously holding the obstacle.
        cell: CellCoord,
        /// Kind of obstacle that was destroyed.
        kind: ObstacleKind,
    },
    /// Confirms that a destroyed block left an item behind.
    ItemDropped {
        /// Cell holding the new item.
        cell: CellCoord,
        /// Kind of item dropped.
        kind: ItemKind,
    },
    /// Confirms that a blast destroyed an item before anyone collected it.
    ItemDestroyed {
        /// Cell previously holding the item.
        cell: CellCoord,
        /// Kind of item destroyed.
        kind: ItemKind,
    },
    /// Confirms that a detonation produced a new explosion group.
    ExplosionGroupSpawned {
        /// Identifier of the new explosion group.
        group: ExplosionGroupId,
        /// Number of cells covered by the group.
        cell_count: u32,
    },
    /// Confirms that an explosion group outlived its lifetime and was cleared.
    ExplosionGroupExpired {
        /// Identifier of the cleared explosion group.
        group: ExplosionGroupId,
    },
    /// Confirms that a player became trapped.
    PlayerTrapped {
        /// Identifier of the trapped player.
        player: PlayerId,
    },
    /// Confirms that a trapped player escaped.
    PlayerFreed {
        /// Identifier of the freed player.
        player: PlayerId,
    },
    /// Confirms that a player collected an item.
    ItemAcquired {
        /// Identifier of the collecting player.
        player: PlayerId,
        /// Cell the item was collected from.
        cell: CellCoord,
        /// Kind of item collected.
        kind: ItemKind,
    },
    /// Reports that an inventory activation was refused.
    ItemUseRejected {
        /// Player that attempted the activation.
        player: PlayerId,
        /// Slot requested for activation.
        slot: usize,
        /// Specific reason the activation failed.
        reason: ItemUseRejection,
    },
}

/// Unique identifier assigned to a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(u32);

impl PlayerId {
    /// Creates a new player identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a bubble group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BubbleGroupId(u32);

impl BubbleGroupId {
    /// Creates a new bubble group identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an explosion group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExplosionGroupId(u32);

impl ExplosionGroupId {
    /// Creates a new explosion group identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid tile expressed as row and column indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    row: u32,
    column: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Returns the cell `distance` tiles away in `direction`, if it lies
    /// inside a square grid of `grid_size` tiles per side.
    #[must_use]
    pub fn step(self, direction: Direction, distance: u32, grid_size: u32) -> Option<CellCoord> {
        let (row_delta, column_delta) = direction.delta();
        let distance = i64::from(distance);
        let row = i64::from(self.row) + row_delta * distance;
        let column = i64::from(self.column) + column_delta * distance;
        let bound = i64::from(grid_size);
        if (0..bound).contains(&row) && (0..bound).contains(&column) {
            Some(CellCoord::new(row as u32, column as u32))
        } else {
            None
        }
    }

    /// Reports the direction and distance from `self` to `other` when both
    /// share a row or a column.
    #[must_use]
    pub fn aligned_offset(self, other: CellCoord) -> Option<(Direction, u32)> {
        if self == other {
            return None;
        }

        if self.column == other.column {
            let distance = self.row.abs_diff(other.row);
            let direction = if other.row > self.row {
                Direction::Down
            } else {
                Direction::Up
            };
            Some((direction, distance))
        } else if self.row == other.row {
            let distance = self.column.abs_diff(other.column);
            let direction = if other.column > self.column {
                Direction::Right
            } else {
                Direction::Left
            };
            Some((direction, distance))
        } else {
            None
        }
    }
}

/// Cardinal directions used for movement and blast propagation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing row indices.
    Up,
    /// Toward increasing row indices.
    Down,
    /// Toward decreasing column indices.
    Left,
    /// Toward increasing column indices.
    Right,
}

impl Direction {
    /// All four directions in propagation order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Row and column deltas of a single step.
    #[must_use]
    pub const fn delta(self) -> (i64, i64) {
        match self {
            Self::Up => (-1, 0),
            Self::Down => (1, 0),
            Self::Left => (0, -1),
            Self::Right => (0, 1),
        }
    }

    /// World-space unit vector of a single step. World `y` grows with rows.
    #[must_use]
    pub fn unit_vector(self) -> Vec2 {
        match self {
            Self::Up => Vec2::new(0.0, -1.0),
            Self::Down => Vec2::new(0.0, 1.0),
            Self::Left => Vec2::new(-1.0, 0.0),
            Self::Right => Vec2::new(1.0, 0.0),
        }
    }

    /// Reports whether the direction runs along the x axis.
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

/// Orientation tag attached to each explosion cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExplosionDirection {
    /// Cell holding the detonated bubble.
    Center,
    /// Arm extending toward decreasing rows.
    Up,
    /// Arm extending toward increasing rows.
    Down,
    /// Arm extending toward decreasing columns.
    Left,
    /// Arm extending toward increasing columns.
    Right,
}

impl From<Direction> for ExplosionDirection {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => Self::Up,
            Direction::Down => Self::Down,
            Direction::Left => Self::Left,
            Direction::Right => Self::Right,
        }
    }
}

/// Visual variant of a destructible block, as authored in the level layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockVariant(u16);

impl BlockVariant {
    /// Creates a new block variant tag.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Retrieves the numeric variant tag.
    #[must_use]
    pub const fn get(&self) -> u16 {
        self.0
    }
}

/// Static world features that block movement and blasts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Permanent post that absorbs blasts.
    Post,
    /// Destructible block that shatters on blast contact.
    Block(BlockVariant),
}

impl ObstacleKind {
    /// Reports whether blasts destroy this kind of obstacle.
    #[must_use]
    pub const fn is_destructible(self) -> bool {
        matches!(self, Self::Block(_))
    }

    /// Describes how the obstacle reacts when a blast reaches its cell.
    #[must_use]
    pub const fn on_blast_contact(self) -> BlastContact {
        match self {
            Self::Post => BlastContact::Absorb,
            Self::Block(_) => BlastContact::Shatter,
        }
    }
}

/// Reaction of an obstacle to a blast reaching its cell.
///
/// Both reactions stop the blast in that direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlastContact {
    /// The obstacle survives.
    Absorb,
    /// The obstacle is removed and may leave an item behind.
    Shatter,
}

/// Obstacle occupying a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Obstacle {
    cell: CellCoord,
    kind: ObstacleKind,
    destructible: bool,
}

impl Obstacle {
    /// Creates an obstacle of the provided kind.
    #[must_use]
    pub const fn new(cell: CellCoord, kind: ObstacleKind) -> Self {
        Self {
            cell,
            kind,
            destructible: kind.is_destructible(),
        }
    }

    /// Creates a permanent post.
    #[must_use]
    pub const fn post(cell: CellCoord) -> Self {
        Self::new(cell, ObstacleKind::Post)
    }

    /// Creates a destructible block.
    #[must_use]
    pub const fn block(cell: CellCoord, variant: BlockVariant) -> Self {
        Self::new(cell, ObstacleKind::Block(variant))
    }

    /// Cell occupied by the obstacle.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Kind of obstacle.
    #[must_use]
    pub const fn kind(&self) -> ObstacleKind {
        self.kind
    }

    /// Reports whether blasts destroy the obstacle.
    #[must_use]
    pub const fn destructible(&self) -> bool {
        self.destructible
    }
}

/// Pickup items that destroyed blocks may leave behind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ItemKind {
    /// Grants one additional bubble.
    Bubble,
    /// Raises the player's maximum speed.
    SpeedShoe,
    /// Stored in the inventory; frees its owner from a trap when used.
    Needle,
}

impl ItemKind {
    /// Every item kind, in declaration order.
    pub const ALL: [ItemKind; 3] = [ItemKind::Bubble, ItemKind::SpeedShoe, ItemKind::Needle];
}

/// Discrete actions a player can trigger during a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerAction {
    /// Drop a bubble on the current tile.
    DropBubble,
    /// Activate an inventory slot.
    UseItem {
        /// Zero-based inventory slot, newest item first.
        slot: usize,
    },
}

/// Input state collected for one player during a single tick.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSnapshot {
    /// Directional keys currently held, most recently pressed last.
    pub held: Vec<Direction>,
    /// Discrete actions triggered since the previous tick.
    pub actions: Vec<PlayerAction>,
}

impl InputSnapshot {
    /// Creates a snapshot from held directions and triggered actions.
    #[must_use]
    pub fn new(held: Vec<Direction>, actions: Vec<PlayerAction>) -> Self {
        Self { held, actions }
    }

    /// Direction that wins when several keys are held.
    #[must_use]
    pub fn latest_direction(&self) -> Option<Direction> {
        self.held.last().copied()
    }
}

/// Animation state exposed by players to the animation provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimationState {
    /// Standing still.
    Idle,
    /// Walking in the provided direction.
    Moving(Direction),
    /// Encased in a trapped bubble.
    Trapped,
}

/// Reasons a spawn request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnRejection {
    /// A player with the same identifier already exists.
    DuplicatePlayer,
    /// The requested cell lies outside the grid.
    OutOfBounds,
    /// The requested cell holds an obstacle.
    Obstructed,
}

/// Reasons a bubble drop may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DropRejection {
    /// The player has no bubbles left to drop.
    NoBubblesLeft,
    /// The tile already holds a bubble.
    TileHasBubble,
    /// The tile holds an obstacle.
    TileHasObstacle,
    /// The player's position maps outside the grid.
    OutOfBounds,
}

/// Reasons an inventory activation may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemUseRejection {
    /// No item occupies the requested slot.
    EmptySlot,
    /// The item has no effect in the player's current state.
    NoEffect,
}

/// Dimensions of the square arena.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArenaDimensions {
    grid_size: u32,
    tile_size: f32,
}

impl ArenaDimensions {
    /// Creates a new arena description.
    #[must_use]
    pub const fn new(grid_size: u32, tile_size: f32) -> Self {
        Self {
            grid_size,
            tile_size,
        }
    }

    /// Number of tiles along each side.
    #[must_use]
    pub const fn grid_size(&self) -> u32 {
        self.grid_size
    }

    /// Side length of a single tile in world units.
    #[must_use]
    pub const fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Side length of the whole arena in world units.
    #[must_use]
    pub fn arena_length(&self) -> f32 {
        self.grid_size as f32 * self.tile_size
    }

    /// World-space rectangle covered by the provided tile.
    #[must_use]
    pub fn cell_rect(&self, cell: CellCoord) -> Rect {
        Rect::new(
            cell.column() as f32 * self.tile_size,
            cell.row() as f32 * self.tile_size,
            self.tile_size,
            self.tile_size,
        )
    }
}

/// Immutable representation of a single player's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Unique identifier of the player.
    pub id: PlayerId,
    /// World-space top-left corner of the sprite.
    pub position: Vec2,
    /// World-space rectangle used for hazard and item overlap tests.
    pub hitbox: Rect,
    /// Full sprite footprint used for obstacle overlap tests.
    pub sprite: Rect,
    /// Tile the player is considered to stand on.
    pub cell: CellCoord,
    /// Bubbles the player may still drop.
    pub num_bubbles: u32,
    /// Blast range of bubbles dropped by the player.
    pub explosion_range: u32,
    /// Distance covered per movement step.
    pub speed: f32,
    /// Speed restored when the player is not trapped.
    pub max_speed: f32,
    /// Whether the player is encased in a trapped bubble.
    pub trapped: bool,
    /// Simulation time at which the player became trapped.
    pub trapped_since: Option<Duration>,
    /// Carried items, newest first.
    pub inventory: Vec<ItemKind>,
    /// Animation state presented to adapters.
    pub animation: AnimationState,
    /// Whether the sprite should be mirrored horizontally.
    pub flip_x: bool,
}

/// Read-only snapshot describing all players in the arena.
#[derive(Clone, Debug, Default)]
pub struct PlayerView {
    snapshots: Vec<PlayerSnapshot>,
}

impl PlayerView {
    /// Creates a new player view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<PlayerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured player snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &PlayerSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a single player.
    #[must_use]
    pub fn get(&self, player: PlayerId) -> Option<&PlayerSnapshot> {
        self.snapshots
            .binary_search_by_key(&player, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<PlayerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a live bubble.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BubbleSnapshot {
    /// Tile holding the bubble.
    pub cell: CellCoord,
    /// Player that dropped the bubble.
    pub owner: PlayerId,
    /// Blast range of the bubble.
    pub explosion_range: u32,
}

/// Immutable representation of a bubble group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BubbleGroupSnapshot {
    /// Identifier of the group.
    pub id: BubbleGroupId,
    /// Simulation time at which the group's fuse was lit.
    pub created_at: Duration,
    /// Bubbles belonging to the group.
    pub bubbles: Vec<BubbleSnapshot>,
}

/// Read-only snapshot describing every live bubble group.
#[derive(Clone, Debug, Default)]
pub struct BubbleGroupView {
    snapshots: Vec<BubbleGroupSnapshot>,
}

impl BubbleGroupView {
    /// Creates a new view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<BubbleGroupSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured groups in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &BubbleGroupSnapshot> {
        self.snapshots.iter()
    }

    /// Number of live groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no group is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<BubbleGroupSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single explosion cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExplosionSnapshot {
    /// Group that produced the cell.
    pub group: ExplosionGroupId,
    /// Tile covered by the explosion.
    pub cell: CellCoord,
    /// Orientation of the explosion arm.
    pub direction: ExplosionDirection,
    /// World-space rectangle covered by the cell.
    pub rect: Rect,
}

/// Read-only snapshot describing every live explosion cell.
#[derive(Clone, Debug, Default)]
pub struct ExplosionView {
    snapshots: Vec<ExplosionSnapshot>,
}

impl ExplosionView {
    /// Creates a new view from the provided snapshots, ordered by group.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ExplosionSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| (snapshot.group, snapshot.cell));
        Self { snapshots }
    }

    /// Iterator over the captured cells.
    pub fn iter(&self) -> impl Iterator<Item = &ExplosionSnapshot> {
        self.snapshots.iter()
    }

    /// Number of live explosion cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no explosion is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ExplosionSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of an item lying in the arena.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ItemSnapshot {
    /// Tile holding the item.
    pub cell: CellCoord,
    /// Kind of item.
    pub kind: ItemKind,
    /// World-space rectangle covered by the item.
    pub rect: Rect,
}

/// Read-only snapshot describing all items lying in the arena.
#[derive(Clone, Debug, Default)]
pub struct ItemView {
    snapshots: Vec<ItemSnapshot>,
}

impl ItemView {
    /// Creates a new view from the provided snapshots, ordered by cell.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ItemSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.cell);
        Self { snapshots }
    }

    /// Iterator over the captured items.
    pub fn iter(&self) -> impl Iterator<Item = &ItemSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the item lying on the provided cell.
    #[must_use]
    pub fn at(&self, cell: CellCoord) -> Option<&ItemSnapshot> {
        self.snapshots
            .binary_search_by_key(&cell, |snapshot| snapshot.cell)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ItemSnapshot> {
        self.snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::{
        BlastContact, BlockVariant, CellCoord, Direction, DropRejection, InputSnapshot, ItemKind,
        Obstacle, ObstacleKind, PlayerAction, PlayerId,
    };
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn input_snapshot_round_trips_through_bincode() {
        let snapshot = InputSnapshot::new(
            vec![Direction::Left, Direction::Up],
            vec![PlayerAction::DropBubble, PlayerAction::UseItem { slot: 2 }],
        );
        assert_round_trip(&snapshot);
    }

    #[test]
    fn obstacle_round_trips_through_bincode() {
        assert_round_trip(&Obstacle::block(CellCoord::new(3, 4), BlockVariant::new(2)));
        assert_round_trip(&PlayerId::new(9));
        assert_round_trip(&DropRejection::TileHasObstacle);
    }

    #[test]
    fn step_stays_inside_grid() {
        let origin = CellCoord::new(0, 14);
        assert_eq!(origin.step(Direction::Up, 1, 15), None);
        assert_eq!(origin.step(Direction::Right, 1, 15), None);
        assert_eq!(
            origin.step(Direction::Down, 3, 15),
            Some(CellCoord::new(3, 14))
        );
        assert_eq!(
            origin.step(Direction::Left, 14, 15),
            Some(CellCoord::new(0, 0))
        );
    }

    #[test]
    fn aligned_offset_reports_direction_and_distance() {
        let origin = CellCoord::new(5, 5);
        assert_eq!(
            origin.aligned_offset(CellCoord::new(5, 8)),
            Some((Direction::Right, 3))
        );
        assert_eq!(
            origin.aligned_offset(CellCoord::new(1, 5)),
            Some((Direction::Up, 4))
        );
        assert_eq!(origin.aligned_offset(CellCoord::new(6, 6)), None);
        assert_eq!(origin.aligned_offset(origin), None);
    }

    #[test]
    fn latest_held_direction_wins() {
        let snapshot = InputSnapshot::new(vec![Direction::Down, Direction::Right], Vec::new());
        assert_eq!(snapshot.latest_direction(), Some(Direction::Right));
        assert_eq!(InputSnapshot::default().latest_direction(), None);
    }

    #[test]
    fn blast_contact_table_matches_destructibility() {
        let post = Obstacle::post(CellCoord::new(1, 1));
        let block = Obstacle::block(CellCoord::new(1, 2), BlockVariant::new(0));
        assert!(!post.destructible());
        assert!(block.destructible());
        assert_eq!(ObstacleKind::Post.on_blast_contact(), BlastContact::Absorb);
        assert_eq!(
            block.kind().on_blast_contact(),
            BlastContact::Shatter
        );
    }

    #[test]
    fn item_kinds_are_listed_once() {
        assert_eq!(ItemKind::ALL.len(), 3);
    }
}
