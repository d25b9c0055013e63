//! Wire messages exchanged between peers.

use bubble_arena_core::{CellCoord, Direction, InputSnapshot, PlayerAction, PlayerId};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::RelayError;

/// Every message a relay carries, encoded as one JSON document each.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RelayMessage {
    /// A peer entered the room.
    Joined {
        /// Identifier chosen for the peer's player.
        player: PlayerId,
        /// Cell the player spawns on.
        cell: CellCoord,
    },
    /// A peer left the room.
    Left {
        /// Identifier of the departing player.
        player: PlayerId,
    },
    /// Input state and authoritative position of a peer's player.
    Input {
        /// Identifier of the player the input belongs to.
        player: PlayerId,
        /// Held directions, most recent last.
        held: Vec<Direction>,
        /// Discrete actions pressed since the previous message.
        actions: Vec<PlayerAction>,
        /// Top-left corner of the player's sprite on the sender's side.
        position: Vec2,
    },
}

impl RelayMessage {
    /// Builds the broadcast describing the local player's state.
    #[must_use]
    pub fn input(player: PlayerId, snapshot: &InputSnapshot, position: Vec2) -> Self {
        Self::Input {
            player,
            held: snapshot.held.clone(),
            actions: snapshot.actions.clone(),
            position,
        }
    }

    /// Player the message refers to.
    #[must_use]
    pub fn player(&self) -> PlayerId {
        match self {
            Self::Joined { player, .. } | Self::Left { player } | Self::Input { player, .. } => {
                *player
            }
        }
    }

    /// Encodes the message as a single JSON line.
    pub fn encode(&self) -> Result<String, RelayError> {
        serde_json::to_string(self).map_err(RelayError::Encode)
    }

    /// Decodes a message previously produced by [`RelayMessage::encode`].
    pub fn decode(line: &str) -> Result<Self, RelayError> {
        serde_json::from_str(line.trim()).map_err(RelayError::Decode)
    }
}
