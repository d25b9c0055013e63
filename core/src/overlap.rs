//! Rectangle overlap heuristics used for hazard, item and obstacle contact.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle expressed in world units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent.
    pub height: f32,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle from a top-left corner vector and size.
    #[must_use]
    pub fn from_origin(origin: Vec2, size: Vec2) -> Self {
        Self::new(origin.x, origin.y, size.x, size.y)
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Geometric center.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Surface covered by the rectangle.
    #[must_use]
    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Area shared with `other`; zero when the rectangles merely touch.
    #[must_use]
    pub fn intersection_area(&self, other: &Rect) -> f32 {
        let width = self.right().min(other.right()) - self.x.max(other.x);
        let height = self.bottom().min(other.bottom()) - self.y.max(other.y);
        if width <= 0.0 || height <= 0.0 {
            return 0.0;
        }
        width * height
    }

    /// Reports whether the rectangles share a positive area.
    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.intersection_area(other) > 0.0
    }

    /// Returns a copy moved by the provided offset.
    #[must_use]
    pub fn translated(&self, offset: Vec2) -> Rect {
        Rect::new(self.x + offset.x, self.y + offset.y, self.width, self.height)
    }
}

/// Categories of overlap tests, each with its own reporting threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollisionKind {
    /// Player hitbox against explosion cells.
    Explosion,
    /// Player hitbox against items lying in the arena.
    Item,
    /// Player hitbox against bubbles. Movement gates bubbles per tile, so no
    /// simulation path runs this test yet; it is kept for the hitbox check
    /// against placed bubbles.
    Bubble,
    /// Player sprite against obstacles; any touch counts.
    Obstacle,
}

impl CollisionKind {
    /// Fraction of the subject's area that accumulated overlap must exceed.
    #[must_use]
    pub const fn threshold(self) -> f32 {
        match self {
            Self::Explosion | Self::Item => 0.66,
            Self::Bubble => 0.5,
            Self::Obstacle => 0.0,
        }
    }
}

/// Runs the accumulated area-ratio test between `subject` and `candidates`.
///
/// Overlap areas accumulate across all candidates of the call in slice order.
/// Each overlapping candidate encountered once the running total divided by the
/// subject's area strictly exceeds the kind's threshold is reported by index.
#[must_use]
pub fn collided(subject: Rect, candidates: &[Rect], kind: CollisionKind) -> Vec<usize> {
    let area = subject.area();
    if area <= 0.0 {
        return Vec::new();
    }

    let threshold = kind.threshold();
    let mut accumulated = 0.0;
    let mut hits = Vec::new();
    for (index, candidate) in candidates.iter().enumerate() {
        let overlap = subject.intersection_area(candidate);
        if overlap <= 0.0 {
            continue;
        }
        accumulated += overlap;
        if accumulated / area > threshold {
            hits.push(index);
        }
    }
    hits
}
