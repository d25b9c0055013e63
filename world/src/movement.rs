//! Step resolution for players walking between bubbles and obstacles.

use bubble_arena_core::{collided, CellCoord, CollisionKind, Direction, Rect};
use glam::Vec2;

use crate::{grid::TileGrid, obstacles::ObstacleRegistry};

/// Terrain consulted while resolving a step.
#[derive(Clone, Copy)]
pub(crate) struct Terrain<'a> {
    pub(crate) grid: &'a TileGrid,
    pub(crate) obstacles: &'a ObstacleRegistry,
}

impl Terrain<'_> {
    /// Checks arena bounds and bubble tiles for a prospective position.
    ///
    /// Leaving a tile is always allowed; entering a different tile that holds
    /// a bubble is not.
    fn admits(&self, from: Vec2, to: Vec2, size: Vec2) -> bool {
        let limit = Vec2::splat(self.grid.arena_length()) - size;
        if to.x < 0.0 || to.y < 0.0 || to.x > limit.x || to.y > limit.y {
            return false;
        }

        let target = self.grid.get_coord(to.x, to.y);
        if !self.grid.contains(target) {
            return false;
        }
        let origin = self.grid.get_coord(from.x, from.y);
        origin == target || !self.grid.has_bubble(target)
    }

    /// Obstacle rectangles touched by a sprite placed at `position`.
    fn blockers(&self, position: Vec2, size: Vec2) -> Vec<Rect> {
        let sprite = Rect::from_origin(position, size);
        let nearby: Vec<Rect> = self
            .neighbourhood(self.grid.get_coord(position.x, position.y))
            .filter(|cell| self.obstacles.contains(*cell))
            .map(|cell| self.grid.cell_rect(cell))
            .collect();
        collided(sprite, &nearby, CollisionKind::Obstacle)
            .into_iter()
            .map(|index| nearby[index])
            .collect()
    }

    fn neighbourhood(&self, center: CellCoord) -> impl Iterator<Item = CellCoord> + '_ {
        let size = i64::from(self.grid.size());
        let row = i64::from(center.row());
        let column = i64::from(center.column());
        (row - 1..=row + 1)
            .flat_map(move |r| (column - 1..=column + 1).map(move |c| (r, c)))
            .filter(move |(r, c)| (0..size).contains(r) && (0..size).contains(c))
            .map(|(r, c)| CellCoord::new(r as u32, c as u32))
    }
}

/// Resolves one movement step, returning the new position if the player moves.
///
/// When the step runs into obstacles the player is rolled back and nudged one
/// unit perpendicular to travel, provided every blocking obstacle overlaps the
/// sprite by less than half its extent on that axis and all of them agree on
/// the side to slide toward.
pub(crate) fn attempt_step(
    terrain: Terrain<'_>,
    position: Vec2,
    size: Vec2,
    speed: f32,
    direction: Direction,
) -> Option<Vec2> {
    let candidate = position + direction.unit_vector() * speed;
    if !terrain.admits(position, candidate, size) {
        return None;
    }

    let blockers = terrain.blockers(candidate, size);
    if blockers.is_empty() {
        return Some(candidate);
    }

    let sprite = Rect::from_origin(candidate, size);
    let nudge = slide_direction(direction, sprite, &blockers)?;
    let slid = position + nudge;
    if terrain.admits(position, slid, size) && terrain.blockers(slid, size).is_empty() {
        Some(slid)
    } else {
        None
    }
}

fn slide_direction(direction: Direction, sprite: Rect, blockers: &[Rect]) -> Option<Vec2> {
    let mut chosen: Option<Vec2> = None;
    for obstacle in blockers {
        let nudge = if direction.is_horizontal() {
            let overlap = sprite.bottom().min(obstacle.bottom()) - sprite.y.max(obstacle.y);
            if overlap >= obstacle.height / 2.0 {
                return None;
            }
            if sprite.center().y < obstacle.center().y {
                Vec2::NEG_Y
            } else {
                Vec2::Y
            }
        } else {
            let overlap = sprite.right().min(obstacle.right()) - sprite.x.max(obstacle.x);
            if overlap >= obstacle.width / 2.0 {
                return None;
            }
            if sprite.center().x < obstacle.center().x {
                Vec2::NEG_X
            } else {
                Vec2::X
            }
        };

        match chosen {
            Some(previous) if previous != nudge => return None,
            _ => chosen = Some(nudge),
        }
    }
    chosen
}
