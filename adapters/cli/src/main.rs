#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Bubble Arena headless and prints the arena
//! as text.

mod autopilot;
mod text;

use std::{
    io::{self, BufRead},
    path::{Path, PathBuf},
    thread,
};

use anyhow::{Context, Result};
use bubble_arena_core::Event;
use bubble_arena_rendering::{
    Color, FrameControl, Presentation, RenderingBackend, Scene, SceneSource, TileGridPresentation,
};
use bubble_arena_relay::{RelayInbox, RelaySender};
use bubble_arena_system_bootstrap::{Bootstrap, GameConfig, Session, DEFAULT_CONFIG_FILE};
use bubble_arena_world::query;
use clap::Parser;

use autopilot::Autopilot;
use text::TextBackend;

/// Headless Bubble Arena runner.
#[derive(Debug, Parser)]
#[command(name = "bubble-arena", version, about)]
struct Args {
    /// Configuration file; `bubble-arena.toml` is used when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Level to load instead of the configured one.
    #[arg(long)]
    level: Option<String>,
    /// Directory holding level files.
    #[arg(long)]
    level_dir: Option<PathBuf>,
    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 600)]
    ticks: u64,
    /// Seed for item drops.
    #[arg(long)]
    seed: Option<u64>,
    /// Print the arena every N ticks; 0 prints only the final frame.
    #[arg(long, default_value_t = 60)]
    render_every: u64,
    /// Number of scripted local players.
    #[arg(long, default_value_t = 2)]
    players: u32,
    /// Ticks each scripted player walks before turning.
    #[arg(long, default_value_t = 45)]
    leg_ticks: u64,
    /// Read relay messages as JSON lines from stdin; end of input stops the run.
    #[arg(long)]
    relay: bool,
}

fn load_config(args: &Args) -> Result<GameConfig> {
    let path = match &args.config {
        Some(path) => Some(path.clone()),
        None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|path| path.exists()),
    };
    let mut config = GameConfig::load(path.as_deref())
        .with_context(|| format!("failed to load configuration {}", describe(path.as_deref())))?;

    if let Some(level) = &args.level {
        config.level = Some(level.clone());
    }
    if let Some(level_dir) = &args.level_dir {
        config.level_dir = level_dir.clone();
    }
    if let Some(seed) = args.seed {
        config.rng_seed = seed;
    }
    Ok(config)
}

fn describe(path: Option<&Path>) -> String {
    path.map_or_else(|| "(defaults)".to_owned(), |path| path.display().to_string())
}

fn spawn_stdin_relay() -> RelayInbox {
    let (sender, inbox) = bubble_arena_relay::channel();
    let _ = thread::spawn(move || read_relay_lines(io::stdin().lock(), &sender));
    inbox
}

fn read_relay_lines<R: BufRead>(reader: R, sender: &RelaySender) {
    for line in reader.lines() {
        let Ok(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        if let Err(error) = sender.deliver_line(&line) {
            log::warn!("ignoring relay line: {error}");
        }
    }
    sender.disconnect();
}

#[derive(Debug, Default)]
struct RunSummary {
    ticks: u64,
    detonations: u64,
    trapped: u64,
    pickups: u64,
    disconnected: bool,
}

impl RunSummary {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::BubbleGroupDetonated { .. } => self.detonations += 1,
                Event::PlayerTrapped { .. } => self.trapped += 1,
                Event::ItemAcquired { .. } => self.pickups += 1,
                _ => {}
            }
        }
    }
}

fn step(
    session: &mut Session,
    relay: Option<&RelayInbox>,
    autopilot: &Autopilot,
    tick: u64,
) -> Option<Vec<Event>> {
    let inputs = autopilot.inputs(tick);
    match relay {
        Some(inbox) => bubble_arena_relay::pump(session, inbox, &inputs),
        None => Some(session.step(&inputs)),
    }
}

fn refresh(scene: &mut Scene, session: &Session, bootstrap: &Bootstrap) {
    let world = session.world();
    let obstacles = query::obstacles(world);
    scene.refresh(SceneSource {
        now: query::now(world),
        fuse: bootstrap.config().world_config().fuse,
        obstacles: &obstacles,
        items: &query::item_view(world),
        bubbles: &query::bubble_group_view(world),
        explosions: &query::explosion_view(world),
        players: &query::player_view(world),
    });
}

/// Entry point for the Bubble Arena command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = load_config(&args)?;
    let bootstrap = Bootstrap::new(config);
    let mut session = bootstrap.session().context("failed to prepare the arena")?;

    let dimensions = query::dimensions(session.world());
    let autopilot = Autopilot::new(args.players, args.leg_ticks);
    for command in autopilot.spawns(dimensions.grid_size()) {
        let _ = session.submit(command);
    }

    let relay = args.relay.then(spawn_stdin_relay);
    let grid = TileGridPresentation::new(dimensions, Color::from_rgb_u8(48, 48, 64))?;
    let mut scene = Scene::new(grid);
    refresh(&mut scene, &session, &bootstrap);
    let presentation = Presentation::new("bubble-arena", Color::from_rgb_u8(16, 16, 24), scene);

    let mut summary = RunSummary::default();
    let backend = TextBackend::new(io::stdout().lock(), session.tick(), args.render_every);
    backend.run(presentation, |_, scene| {
        if summary.ticks >= args.ticks {
            return FrameControl::Exit;
        }
        match step(&mut session, relay.as_ref(), &autopilot, summary.ticks) {
            Some(events) => summary.record(&events),
            None => {
                summary.disconnected = true;
                return FrameControl::Exit;
            }
        }
        summary.ticks += 1;
        refresh(scene, &session, &bootstrap);
        if summary.ticks >= args.ticks {
            FrameControl::Exit
        } else {
            FrameControl::Continue
        }
    })?;

    log::info!(
        "finished after {} ticks: {} detonations, {} traps, {} pickups{}",
        summary.ticks,
        summary.detonations,
        summary.trapped,
        summary.pickups,
        if summary.disconnected {
            " (relay disconnected)"
        } else {
            ""
        }
    );
    Ok(())
}
