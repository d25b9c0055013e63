//! Player state machine: animation, trap state, pickups and inventory.

use std::time::Duration;

use bubble_arena_core::{
    AnimationState, CellCoord, Direction, ItemKind, ItemUseRejection, PlayerId, PlayerSnapshot,
    Rect, INVENTORY_CAPACITY, SPEED_SHOE_BONUS,
};
use glam::Vec2;

/// Starting statistics handed to every spawned player.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerDefaults {
    /// Bubbles available right after spawning.
    pub num_bubbles: u32,
    /// Blast range of dropped bubbles.
    pub explosion_range: u32,
    /// Distance covered by a single movement step.
    pub speed: f32,
    /// Step distance while trapped.
    pub trapped_speed: f32,
}

impl Default for PlayerDefaults {
    fn default() -> Self {
        Self {
            num_bubbles: 1,
            explosion_range: 7,
            speed: 4.0,
            trapped_speed: 0.2,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct PlayerState {
    pub(crate) id: PlayerId,
    pub(crate) position: Vec2,
    pub(crate) sprite_size: Vec2,
    pub(crate) speed: f32,
    pub(crate) max_speed: f32,
    trapped_speed: f32,
    pub(crate) num_bubbles: u32,
    pub(crate) explosion_range: u32,
    trapped_since: Option<Duration>,
    inventory: Vec<ItemKind>,
    animation: AnimationState,
    flip_x: bool,
}

impl PlayerState {
    pub(crate) fn new(id: PlayerId, position: Vec2, sprite_size: Vec2, defaults: &PlayerDefaults) -> Self {
        Self {
            id,
            position,
            sprite_size,
            speed: defaults.speed,
            max_speed: defaults.speed,
            trapped_speed: defaults.trapped_speed,
            num_bubbles: defaults.num_bubbles,
            explosion_range: defaults.explosion_range,
            trapped_since: None,
            inventory: Vec::with_capacity(INVENTORY_CAPACITY),
            animation: AnimationState::Idle,
            flip_x: false,
        }
    }

    /// Full sprite footprint.
    pub(crate) fn sprite_rect(&self) -> Rect {
        Rect::from_origin(self.position, self.sprite_size)
    }

    /// Feet region: inset by a seventh of the width on both sides and
    /// covering the bottom quarter of the sprite.
    pub(crate) fn hitbox(&self) -> Rect {
        let Vec2 { x: width, y: height } = self.sprite_size;
        let inset = width / 7.0;
        Rect::new(
            self.position.x + inset,
            self.position.y + height * 0.75,
            width - 2.0 * inset,
            height / 4.0,
        )
    }

    pub(crate) fn is_trapped(&self) -> bool {
        self.trapped_since.is_some()
    }

    /// Turns the player toward `direction`. Trapped players keep their pose.
    pub(crate) fn face(&mut self, direction: Direction) {
        if self.is_trapped() {
            return;
        }
        self.animation = AnimationState::Moving(direction);
        self.flip_x = direction == Direction::Right;
    }

    /// Returns to the idle pose, reporting whether anything changed.
    pub(crate) fn idle(&mut self) -> bool {
        if self.is_trapped() || self.animation == AnimationState::Idle {
            return false;
        }
        self.animation = AnimationState::Idle;
        true
    }

    /// Encases the player, reporting whether it was free before.
    pub(crate) fn trap(&mut self, now: Duration) -> bool {
        if self.is_trapped() {
            return false;
        }
        self.trapped_since = Some(now);
        self.speed = self.trapped_speed;
        self.animation = AnimationState::Trapped;
        true
    }

    fn free(&mut self) {
        self.trapped_since = None;
        self.speed = self.max_speed;
        self.animation = AnimationState::Idle;
    }

    /// Applies the effect of a collected item.
    pub(crate) fn acquire(&mut self, kind: ItemKind) {
        match kind {
            ItemKind::Bubble => self.num_bubbles = self.num_bubbles.saturating_add(1),
            ItemKind::SpeedShoe => {
                self.max_speed += SPEED_SHOE_BONUS;
                if !self.is_trapped() {
                    self.speed = self.max_speed;
                }
            }
            ItemKind::Needle => {
                self.inventory.insert(0, kind);
                self.inventory.truncate(INVENTORY_CAPACITY);
            }
        }
    }

    /// Activates the item held in `slot`, consuming it when it takes effect.
    pub(crate) fn use_item(&mut self, slot: usize) -> Result<ItemKind, ItemUseRejection> {
        let kind = *self.inventory.get(slot).ok_or(ItemUseRejection::EmptySlot)?;
        match kind {
            ItemKind::Needle if self.is_trapped() => {
                let _ = self.inventory.remove(slot);
                self.free();
                Ok(kind)
            }
            _ => Err(ItemUseRejection::NoEffect),
        }
    }

    pub(crate) fn snapshot(&self, cell: CellCoord) -> PlayerSnapshot {
        PlayerSnapshot {
            id: self.id,
            position: self.position,
            hitbox: self.hitbox(),
            sprite: self.sprite_rect(),
            cell,
            num_bubbles: self.num_bubbles,
            explosion_range: self.explosion_range,
            speed: self.speed,
            max_speed: self.max_speed,
            trapped: self.is_trapped(),
            trapped_since: self.trapped_since,
            inventory: self.inventory.clone(),
            animation: self.animation,
            flip_x: self.flip_x,
        }
    }
}
