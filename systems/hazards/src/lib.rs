#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that emits trap and pickup commands from overlap tests.

use bubble_arena_core::{
    collided, CollisionKind, Command, ExplosionView, ItemView, PlayerView, Rect,
};

/// Hazard system that checks player hitboxes against explosions and items.
#[derive(Debug, Default)]
pub struct Hazards {
    explosion_rects: Vec<Rect>,
    item_rects: Vec<Rect>,
    scratch: Vec<Command>,
}

impl Hazards {
    /// Creates a new hazard system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::TrapPlayer` and `Command::PickUpItem` entries.
    ///
    /// Every live explosion cell takes part in a single overlap test per
    /// player, so cells from different groups accumulate together. Players
    /// are visited in identifier order and items in cell order.
    pub fn handle(
        &mut self,
        players: &PlayerView,
        explosions: &ExplosionView,
        items: &ItemView,
        out: &mut Vec<Command>,
    ) {
        self.explosion_rects.clear();
        self.explosion_rects
            .extend(explosions.iter().map(|snapshot| snapshot.rect));
        self.item_rects.clear();
        self.item_rects.extend(items.iter().map(|snapshot| snapshot.rect));

        if self.explosion_rects.is_empty() && self.item_rects.is_empty() {
            return;
        }

        let cells: Vec<_> = items.iter().map(|snapshot| snapshot.cell).collect();
        self.scratch.clear();

        for player in players.iter() {
            if !player.trapped
                && !collided(player.hitbox, &self.explosion_rects, CollisionKind::Explosion)
                    .is_empty()
            {
                self.scratch.push(Command::TrapPlayer { player: player.id });
            }

            for index in collided(player.hitbox, &self.item_rects, CollisionKind::Item) {
                self.scratch.push(Command::PickUpItem {
                    player: player.id,
                    cell: cells[index],
                });
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}
