//! Inbound queue that hands peer messages to the simulation thread.

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver, Sender, TryRecvError},
        Arc,
    },
};

use bubble_arena_core::{Command, InputSnapshot, PlayerId};

use crate::{RelayError, RelayMessage};

/// Creates a connected sender and inbox pair.
///
/// The sender lives on the network thread; the inbox is drained by the
/// simulation thread once per tick.
#[must_use]
pub fn channel() -> (RelaySender, RelayInbox) {
    let (tx, rx) = mpsc::channel();
    let disconnected = Arc::new(AtomicBool::new(false));
    (
        RelaySender {
            tx,
            disconnected: Arc::clone(&disconnected),
        },
        RelayInbox { rx, disconnected },
    )
}

/// Network-side handle that queues decoded messages.
#[derive(Clone, Debug)]
pub struct RelaySender {
    tx: Sender<RelayMessage>,
    disconnected: Arc<AtomicBool>,
}

impl RelaySender {
    /// Queues a message for the next drain.
    pub fn deliver(&self, message: RelayMessage) -> Result<(), RelayError> {
        self.tx.send(message).map_err(|_| RelayError::Disconnected)
    }

    /// Decodes a JSON line and queues the resulting message.
    pub fn deliver_line(&self, line: &str) -> Result<(), RelayError> {
        let message = RelayMessage::decode(line)?;
        self.deliver(message)
    }

    /// Flags the connection as lost. The simulation loop stops once the
    /// messages already queued have been applied.
    pub fn disconnect(&self) {
        if !self.disconnected.swap(true, Ordering::AcqRel) {
            log::warn!("relay connection lost");
        }
    }
}

/// Commands and inputs collected from one drain of the inbox.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Inbound {
    /// Spawn, removal and position sync commands in arrival order.
    pub commands: Vec<Command>,
    /// Latest input state per remote player.
    pub inputs: BTreeMap<PlayerId, InputSnapshot>,
}

impl Inbound {
    /// Whether the drain found no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.inputs.is_empty()
    }

    fn absorb(&mut self, message: RelayMessage) {
        match message {
            RelayMessage::Joined { player, cell } => {
                self.commands.push(Command::SpawnPlayer { player, cell });
            }
            RelayMessage::Left { player } => {
                let _ = self.inputs.remove(&player);
                self.commands.push(Command::RemovePlayer { player });
            }
            RelayMessage::Input {
                player,
                held,
                actions,
                position,
            } => {
                self.commands
                    .push(Command::SyncPlayerPosition { player, position });
                let input = self.inputs.entry(player).or_default();
                input.held = held;
                input.actions.extend(actions);
            }
        }
    }
}

/// Simulation-side end of the relay.
#[derive(Debug)]
pub struct RelayInbox {
    rx: Receiver<RelayMessage>,
    disconnected: Arc<AtomicBool>,
}

impl RelayInbox {
    /// Whether the connection was flagged as lost.
    #[must_use]
    pub fn is_disconnected(&self) -> bool {
        self.disconnected.load(Ordering::Acquire)
    }

    /// Takes every queued message without blocking.
    ///
    /// Held directions keep the most recent message per player while
    /// actions from all messages are kept in order. Dropping every sender
    /// counts as a disconnect.
    pub fn drain(&self) -> Inbound {
        let mut inbound = Inbound::default();
        loop {
            match self.rx.try_recv() {
                Ok(message) => inbound.absorb(message),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.disconnected.swap(true, Ordering::AcqRel) {
                        log::warn!("relay senders dropped, treating as disconnect");
                    }
                    break;
                }
            }
        }
        inbound
    }
}
