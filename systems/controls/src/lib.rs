#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure controls system translating player input snapshots into commands.

use std::collections::{BTreeMap, BTreeSet};

use bubble_arena_core::{Command, Event, InputSnapshot, PlayerAction, PlayerId};

/// Controls system that tracks the roster and emits per-player commands.
#[derive(Debug, Clone, Default)]
pub struct Controls {
    roster: BTreeSet<PlayerId>,
}

impl Controls {
    /// Creates a new controls system with an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes world events and the tick's input snapshots to emit commands.
    ///
    /// Players are visited in identifier order. Discrete actions are issued
    /// first, then a single movement step toward the most recently pressed
    /// direction, or a halt when no direction is held. Players without a
    /// snapshot are treated as holding nothing; snapshots for players that
    /// never spawned are ignored.
    pub fn handle(
        &mut self,
        events: &[Event],
        inputs: &BTreeMap<PlayerId, InputSnapshot>,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::PlayerSpawned { player, .. } => {
                    let _ = self.roster.insert(*player);
                }
                Event::PlayerRemoved { player } => {
                    let _ = self.roster.remove(player);
                }
                _ => {}
            }
        }

        let idle = InputSnapshot::default();
        for &player in &self.roster {
            let input = inputs.get(&player).unwrap_or(&idle);

            for action in &input.actions {
                out.push(match *action {
                    PlayerAction::DropBubble => Command::DropBubble { player },
                    PlayerAction::UseItem { slot } => Command::UseItem { player, slot },
                });
            }

            out.push(match input.latest_direction() {
                Some(direction) => Command::MovePlayer { player, direction },
                None => Command::HaltPlayer { player },
            });
        }
    }

    /// Players currently known to the system.
    pub fn roster(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.roster.iter().copied()
    }
}
