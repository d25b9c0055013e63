//! Text backend that prints scenes as character grids.

use std::{io::Write, time::Duration};

use anyhow::{Context, Result};
use bubble_arena_core::{AnimationState, CellCoord, Direction, ItemKind, ObstacleKind};
use bubble_arena_rendering::{
    AnimationProvider, FrameControl, Layer, Presentation, RenderingBackend, Scene,
};

/// Picks one character per animation state.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct GlyphAnimations;

impl AnimationProvider for GlyphAnimations {
    type Handle = char;

    fn current_frame(&self, state: AnimationState, flip: bool) -> char {
        match state {
            AnimationState::Idle => '@',
            AnimationState::Trapped => 'O',
            AnimationState::Moving(Direction::Up) => '^',
            AnimationState::Moving(Direction::Down) => 'v',
            AnimationState::Moving(Direction::Left | Direction::Right) => {
                if flip {
                    '>'
                } else {
                    '<'
                }
            }
        }
    }
}

/// Draws the scene layer by layer into rows of characters.
pub(crate) fn draw<P>(scene: &Scene, provider: &P) -> String
where
    P: AnimationProvider<Handle = char>,
{
    let size = scene.tile_grid.size as usize;
    let mut canvas = vec![vec!['.'; size]; size];
    let mut put = |cell: CellCoord, glyph: char| {
        if let Some(slot) = canvas
            .get_mut(cell.row() as usize)
            .and_then(|row| row.get_mut(cell.column() as usize))
        {
            *slot = glyph;
        }
    };

    for layer in Layer::DRAW_ORDER {
        match layer {
            Layer::Floor => {}
            Layer::Obstacles => {
                for obstacle in &scene.obstacles {
                    let glyph = match obstacle.kind {
                        ObstacleKind::Post => '#',
                        ObstacleKind::Block(_) => '%',
                    };
                    put(obstacle.cell, glyph);
                }
            }
            Layer::Items => {
                for item in &scene.items {
                    let glyph = match item.kind {
                        ItemKind::Bubble => 'b',
                        ItemKind::SpeedShoe => 's',
                        ItemKind::Needle => 'n',
                    };
                    put(item.cell, glyph);
                }
            }
            Layer::Bubbles => {
                for bubble in &scene.bubbles {
                    put(bubble.cell, 'o');
                }
            }
            Layer::Explosions => {
                for explosion in &scene.explosions {
                    put(explosion.cell, '*');
                }
            }
            Layer::Players => {
                let tile = scene.tile_grid.tile_length;
                let last = scene.tile_grid.size.saturating_sub(1);
                for (player, glyph) in scene.player_frames(provider) {
                    let snap = |value: f32| {
                        (((value + tile / 2.0) / tile).floor().max(0.0) as u32).min(last)
                    };
                    put(
                        CellCoord::new(snap(player.sprite.y), snap(player.sprite.x)),
                        glyph,
                    );
                }
            }
        }
    }

    let mut text = String::with_capacity(size * (size + 1));
    for row in canvas {
        text.extend(row);
        text.push('\n');
    }
    text
}

/// Backend that writes every `render_every`-th frame to `out`.
#[derive(Debug)]
pub(crate) struct TextBackend<W> {
    out: W,
    frame_time: Duration,
    render_every: u64,
}

impl<W: Write> TextBackend<W> {
    pub(crate) fn new(out: W, frame_time: Duration, render_every: u64) -> Self {
        Self {
            out,
            frame_time,
            render_every,
        }
    }

    fn present(&mut self, title: &str, frame: u64, scene: &Scene) -> Result<()> {
        writeln!(self.out, "{title} frame {frame}")?;
        self.out.write_all(draw(scene, &GlyphAnimations).as_bytes())?;
        writeln!(self.out)?;
        Ok(())
    }
}

impl<W: Write> RenderingBackend for TextBackend<W> {
    fn run<F>(mut self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, &mut Scene) -> FrameControl,
    {
        let Presentation { title, scene, .. } = presentation;
        let mut scene = scene;
        let mut frame = 0_u64;
        loop {
            let control = update_scene(self.frame_time, &mut scene);
            frame += 1;
            let exiting = control == FrameControl::Exit;
            if exiting || (self.render_every > 0 && frame % self.render_every == 0) {
                self.present(&title, frame, &scene)
                    .with_context(|| format!("failed to write frame {frame}"))?;
            }
            if exiting {
                self.out.flush().context("failed to flush output")?;
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bubble_arena_core::{ArenaDimensions, BlockVariant, ExplosionDirection, PlayerId, Rect};
    use bubble_arena_rendering::{
        Color, SceneExplosion, SceneItem, SceneObstacle, ScenePlayer, TileGridPresentation,
    };

    fn scene() -> Scene {
        let grid = TileGridPresentation::new(
            ArenaDimensions::new(3, 80.0),
            Color::from_rgb_u8(0, 0, 0),
        )
        .expect("grid");
        Scene::new(grid)
    }

    #[test]
    fn layers_overwrite_in_draw_order() {
        let mut scene = scene();
        scene.obstacles = vec![
            SceneObstacle {
                cell: CellCoord::new(0, 0),
                kind: ObstacleKind::Post,
            },
            SceneObstacle {
                cell: CellCoord::new(0, 2),
                kind: ObstacleKind::Block(BlockVariant::new(1)),
            },
        ];
        scene.items = vec![SceneItem {
            cell: CellCoord::new(1, 1),
            kind: ItemKind::Needle,
        }];
        scene.explosions = vec![SceneExplosion {
            cell: CellCoord::new(1, 1),
            direction: ExplosionDirection::Center,
        }];
        scene.players = vec![ScenePlayer {
            id: PlayerId::new(1),
            sprite: Rect::new(161.0, 150.0, 80.0, 80.0),
            animation: AnimationState::Trapped,
            flip_x: false,
        }];

        assert_eq!(draw(&scene, &GlyphAnimations), "#.%\n.*.\n..O\n");
    }

    #[test]
    fn horizontal_frames_follow_the_flip() {
        let moving = AnimationState::Moving(Direction::Right);
        assert_eq!(GlyphAnimations.current_frame(moving, true), '>');
        assert_eq!(GlyphAnimations.current_frame(moving, false), '<');
    }

    #[test]
    fn backend_renders_selected_frames_and_the_last() {
        let mut out = Vec::new();
        let backend = TextBackend::new(&mut out, Duration::from_millis(16), 2);
        let presentation = Presentation::new("arena", Color::from_rgb_u8(0, 0, 0), scene());
        let mut frames = 0;
        backend
            .run(presentation, |_, _| {
                frames += 1;
                if frames == 3 {
                    FrameControl::Exit
                } else {
                    FrameControl::Continue
                }
            })
            .expect("run");

        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("arena frame 2"));
        assert!(text.contains("arena frame 3"));
        assert!(!text.contains("arena frame 1\n"));
    }
}
