//! Scripted inputs for headless runs.

use std::collections::BTreeMap;

use bubble_arena_core::{CellCoord, Command, Direction, InputSnapshot, PlayerAction, PlayerId};

const ROUTE: [Direction; 4] = [
    Direction::Right,
    Direction::Down,
    Direction::Left,
    Direction::Up,
];

/// Drives local players along a fixed square route, dropping a bubble at
/// the start of every leg.
#[derive(Clone, Debug)]
pub(crate) struct Autopilot {
    players: Vec<PlayerId>,
    leg_ticks: u64,
}

impl Autopilot {
    pub(crate) fn new(count: u32, leg_ticks: u64) -> Self {
        Self {
            players: (1..=count).map(PlayerId::new).collect(),
            leg_ticks: leg_ticks.max(1),
        }
    }

    /// Spawn commands placing players in the corners, then along the middle
    /// row.
    pub(crate) fn spawns(&self, grid_size: u32) -> Vec<Command> {
        let last = grid_size.saturating_sub(1);
        let middle = grid_size / 2;
        let corners = [
            CellCoord::new(0, 0),
            CellCoord::new(last, last),
            CellCoord::new(0, last),
            CellCoord::new(last, 0),
        ];
        self.players
            .iter()
            .enumerate()
            .map(|(index, &player)| {
                let cell = corners.get(index).copied().unwrap_or_else(|| {
                    let column = u32::try_from(index - corners.len()).unwrap_or(0);
                    CellCoord::new(middle, column.min(last))
                });
                Command::SpawnPlayer { player, cell }
            })
            .collect()
    }

    pub(crate) fn inputs(&self, tick: u64) -> BTreeMap<PlayerId, InputSnapshot> {
        let leg = tick / self.leg_ticks;
        let leg_start = tick % self.leg_ticks == 0;
        self.players
            .iter()
            .enumerate()
            .map(|(index, &player)| {
                let step = (leg + index as u64) % ROUTE.len() as u64;
                let direction = ROUTE[step as usize];
                let actions = if leg_start {
                    vec![PlayerAction::DropBubble]
                } else {
                    Vec::new()
                };
                (player, InputSnapshot::new(vec![direction], actions))
            })
            .collect()
    }
}
