#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Bubble Arena adapters.

use anyhow::Result as AnyResult;
use bubble_arena_core::{
    AnimationState, ArenaDimensions, BubbleGroupView, CellCoord, ExplosionDirection,
    ExplosionView, ItemKind, ItemView, Obstacle, ObstacleKind, PlayerId, PlayerView, Rect,
};
use std::{error::Error, fmt, time::Duration};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

/// Supplies the sprite frame for an entity's animation state.
///
/// Providers only see the state and the horizontal flip; they never learn
/// which entity is being drawn.
pub trait AnimationProvider {
    /// Backend specific reference to a frame.
    type Handle;

    /// Frame to draw for `state`, mirrored horizontally when `flip` is set.
    fn current_frame(&self, state: AnimationState, flip: bool) -> Self::Handle;
}

/// Describes the square tile grid that backs the arena.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileGridPresentation {
    /// Number of tiles along each side.
    pub size: u32,
    /// Side length of a single tile expressed in world units.
    pub tile_length: f32,
    /// Color used when drawing grid lines.
    pub line_color: Color,
}

impl TileGridPresentation {
    /// Creates a grid descriptor, rejecting non-positive tile lengths.
    pub fn new(
        dimensions: ArenaDimensions,
        line_color: Color,
    ) -> Result<Self, RenderingError> {
        let tile_length = dimensions.tile_size();
        if !(tile_length > 0.0) {
            return Err(RenderingError::InvalidTileLength { tile_length });
        }
        Ok(Self {
            size: dimensions.grid_size(),
            tile_length,
            line_color,
        })
    }

    /// Side length of the arena in world units.
    #[must_use]
    pub fn side_length(&self) -> f32 {
        self.size as f32 * self.tile_length
    }
}

/// Static obstacle drawn on the floor layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneObstacle {
    /// Cell occupied by the obstacle.
    pub cell: CellCoord,
    /// Taxonomy entry of the obstacle.
    pub kind: ObstacleKind,
}

/// Item lying in the arena.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneItem {
    /// Cell holding the item.
    pub cell: CellCoord,
    /// Kind of the item.
    pub kind: ItemKind,
}

/// Placed bubble awaiting detonation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneBubble {
    /// Cell holding the bubble.
    pub cell: CellCoord,
    /// Player that placed the bubble.
    pub owner: PlayerId,
    /// Time left before the bubble's group detonates.
    pub remaining: Duration,
}

/// Live explosion cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneExplosion {
    /// Cell covered by the blast.
    pub cell: CellCoord,
    /// Arm of the blast, used to pick the sprite orientation.
    pub direction: ExplosionDirection,
}

/// Player sprite placement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScenePlayer {
    /// Identifier of the player.
    pub id: PlayerId,
    /// Sprite rectangle in world units.
    pub sprite: Rect,
    /// Animation state driving the frame choice.
    pub animation: AnimationState,
    /// Whether the sprite is mirrored horizontally.
    pub flip_x: bool,
}

/// Layers in the order adapters draw them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    /// Grid lines and floor tiles.
    Floor,
    /// Posts and blocks.
    Obstacles,
    /// Items lying in the arena.
    Items,
    /// Bubbles awaiting detonation.
    Bubbles,
    /// Live explosion cells.
    Explosions,
    /// Player sprites.
    Players,
}

impl Layer {
    /// Every layer, back to front.
    pub const DRAW_ORDER: [Layer; 6] = [
        Layer::Floor,
        Layer::Obstacles,
        Layer::Items,
        Layer::Bubbles,
        Layer::Explosions,
        Layer::Players,
    ];
}

/// Snapshot of everything a frame needs to draw.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Grid backing the arena.
    pub tile_grid: TileGridPresentation,
    /// Obstacles sorted by cell.
    pub obstacles: Vec<SceneObstacle>,
    /// Items sorted by cell.
    pub items: Vec<SceneItem>,
    /// Bubbles sorted by cell.
    pub bubbles: Vec<SceneBubble>,
    /// Explosion cells sorted by cell.
    pub explosions: Vec<SceneExplosion>,
    /// Players sorted back to front.
    pub players: Vec<ScenePlayer>,
}

/// World state a scene is assembled from.
#[derive(Clone, Copy, Debug)]
pub struct SceneSource<'a> {
    /// Current value of the simulation clock.
    pub now: Duration,
    /// Fuse applied to bubble groups.
    pub fuse: Duration,
    /// Obstacles registered in the arena.
    pub obstacles: &'a [Obstacle],
    /// Items lying in the arena.
    pub items: &'a ItemView,
    /// Bubble groups awaiting detonation.
    pub bubbles: &'a BubbleGroupView,
    /// Live explosion cells.
    pub explosions: &'a ExplosionView,
    /// Players in the arena.
    pub players: &'a PlayerView,
}

impl Scene {
    /// Creates an empty scene over the provided grid.
    #[must_use]
    pub fn new(tile_grid: TileGridPresentation) -> Self {
        Self {
            tile_grid,
            obstacles: Vec::new(),
            items: Vec::new(),
            bubbles: Vec::new(),
            explosions: Vec::new(),
            players: Vec::new(),
        }
    }

    /// Replaces the scene contents with the provided world state.
    pub fn refresh(&mut self, source: SceneSource<'_>) {
        self.obstacles = source
            .obstacles
            .iter()
            .map(|obstacle| SceneObstacle {
                cell: obstacle.cell(),
                kind: obstacle.kind(),
            })
            .collect();
        self.obstacles.sort_by_key(|obstacle| obstacle.cell);

        self.items = source
            .items
            .iter()
            .map(|item| SceneItem {
                cell: item.cell,
                kind: item.kind,
            })
            .collect();

        self.bubbles = source
            .bubbles
            .iter()
            .flat_map(|group| {
                let remaining = (group.created_at + source.fuse).saturating_sub(source.now);
                group.bubbles.iter().map(move |bubble| SceneBubble {
                    cell: bubble.cell,
                    owner: bubble.owner,
                    remaining,
                })
            })
            .collect();
        self.bubbles.sort_by_key(|bubble| bubble.cell);

        self.explosions = source
            .explosions
            .iter()
            .map(|explosion| SceneExplosion {
                cell: explosion.cell,
                direction: explosion.direction,
            })
            .collect();
        self.explosions.sort_by_key(|explosion| explosion.cell);

        self.players = source
            .players
            .iter()
            .map(|player| ScenePlayer {
                id: player.id,
                sprite: player.sprite,
                animation: player.animation,
                flip_x: player.flip_x,
            })
            .collect();
        // Lower sprites overlap the ones above them.
        self.players.sort_by(|left, right| {
            left.sprite
                .bottom()
                .total_cmp(&right.sprite.bottom())
                .then(left.id.cmp(&right.id))
        });
    }

    /// Resolves the frame of every player, back to front.
    pub fn player_frames<P>(&self, provider: &P) -> Vec<(&ScenePlayer, P::Handle)>
    where
        P: AnimationProvider,
    {
        self.players
            .iter()
            .map(|player| (player, provider.current_frame(player.animation, player.flip_x)))
            .collect()
    }
}

/// Whether a backend should keep presenting frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameControl {
    /// Present another frame.
    Continue,
    /// Stop presenting and return from [`RenderingBackend::run`].
    Exit,
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title shown by the backend.
    pub title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            title: title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Bubble Arena scenes.
pub trait RenderingBackend {
    /// Runs the backend until `update_scene` asks it to exit.
    ///
    /// The closure receives the frame delta and refreshes the scene before it
    /// is drawn.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, &mut Scene) -> FrameControl;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Tiles must have a positive side length.
    InvalidTileLength {
        /// Provided length that failed validation.
        tile_length: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTileLength { tile_length } => {
                write!(f, "tile length must be positive (received {tile_length})")
            }
        }
    }
}

impl Error for RenderingError {}
