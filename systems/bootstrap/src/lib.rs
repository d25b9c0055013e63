#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Bootstrap system that assembles the Bubble Arena world and drives ticks.

mod config;
mod level;

use std::{collections::BTreeMap, time::Duration};

use bubble_arena_core::{Command, Event, InputSnapshot, PlayerId};
use bubble_arena_system_controls::Controls;
use bubble_arena_system_hazards::Hazards;
use bubble_arena_world::{apply, query, LevelLayout, World, WorldError};
use thiserror::Error;

pub use config::{ConfigError, DropConfig, GameConfig, PlayerConfig, DEFAULT_CONFIG_FILE};
pub use level::{level_path, load_level, parse_level, LevelError};

/// Errors raised while preparing a session.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The level could not be loaded.
    #[error(transparent)]
    Level(#[from] LevelError),
    /// The world rejected the configuration or the level.
    #[error(transparent)]
    World(#[from] WorldError),
}

/// Prepares sessions from a validated configuration.
#[derive(Debug, Default)]
pub struct Bootstrap {
    config: GameConfig,
}

impl Bootstrap {
    /// Creates a bootstrapper for the provided configuration.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        Self { config }
    }

    /// Configuration used by the bootstrapper.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Loads the configured level, or an empty arena when none is named.
    pub fn level(&self) -> Result<LevelLayout, LevelError> {
        match &self.config.level {
            Some(name) => load_level(&self.config.level_dir, name),
            None => Ok(LevelLayout::empty(self.config.grid_size)),
        }
    }

    /// Builds a session over a freshly created world.
    pub fn session(&self) -> Result<Session, BootstrapError> {
        let layout = self.level()?;
        self.session_with_layout(&layout)
    }

    /// Builds a session over a world seeded with `layout`.
    pub fn session_with_layout(&self, layout: &LevelLayout) -> Result<Session, BootstrapError> {
        let world = World::new(self.config.world_config(), layout)?;
        Ok(Session::new(world, self.config.tick_duration()))
    }
}

/// Owns the world and the systems and runs the per-tick pipeline.
#[derive(Debug)]
pub struct Session {
    world: World,
    controls: Controls,
    hazards: Hazards,
    tick: Duration,
    pending: Vec<Event>,
    commands: Vec<Command>,
}

impl Session {
    /// Creates a session advancing `world` by `tick` per step.
    #[must_use]
    pub fn new(world: World, tick: Duration) -> Self {
        Self {
            world,
            controls: Controls::new(),
            hazards: Hazards::new(),
            tick,
            pending: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// Read-only access to the world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Simulated time covered by one step.
    #[must_use]
    pub fn tick(&self) -> Duration {
        self.tick
    }

    /// Applies a command outside the tick pipeline, such as a spawn or a
    /// removal requested by an adapter. The resulting events are also shown
    /// to the systems on the next step.
    pub fn submit(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        apply(&mut self.world, command, &mut events);
        self.pending.extend(events.iter().cloned());
        events
    }

    /// Runs one tick: the clock advances, inputs become commands, and overlap
    /// checks produce trap and pickup commands. Returns every event raised.
    pub fn step(&mut self, inputs: &BTreeMap<PlayerId, InputSnapshot>) -> Vec<Event> {
        let mut events = Vec::new();
        apply(&mut self.world, Command::Tick { dt: self.tick }, &mut events);

        self.pending.extend(events.iter().cloned());
        self.commands.clear();
        self.controls.handle(&self.pending, inputs, &mut self.commands);
        self.pending.clear();
        self.apply_commands(&mut events);

        let players = query::player_view(&self.world);
        let explosions = query::explosion_view(&self.world);
        let items = query::item_view(&self.world);
        self.hazards
            .handle(&players, &explosions, &items, &mut self.commands);
        self.apply_commands(&mut events);

        events
    }

    fn apply_commands(&mut self, events: &mut Vec<Event>) {
        for command in self.commands.drain(..) {
            apply(&mut self.world, command, events);
        }
    }
}
