#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Optional network relay for Bubble Arena sessions.
//!
//! The transport itself lives outside this crate. A network thread decodes
//! peer messages into a [`RelaySender`]; the simulation thread drains the
//! matching [`RelayInbox`] once per tick through [`pump`].

mod inbox;
mod messages;

use std::{collections::BTreeMap, sync::mpsc::Sender};

use bubble_arena_core::{Event, InputSnapshot, PlayerId};
use bubble_arena_system_bootstrap::Session;
use thiserror::Error;

pub use inbox::{channel, Inbound, RelayInbox, RelaySender};
pub use messages::RelayMessage;

/// Errors raised by the relay.
#[derive(Debug, Error)]
pub enum RelayError {
    /// A message could not be serialised.
    #[error("failed to encode relay message")]
    Encode(#[source] serde_json::Error),
    /// A line received from a peer is not a valid message.
    #[error("failed to decode relay message")]
    Decode(#[source] serde_json::Error),
    /// The other end of the relay is gone.
    #[error("relay disconnected")]
    Disconnected,
}

/// Outbound side of the relay.
pub trait Broadcast {
    /// Sends `message` to every peer.
    fn broadcast(&mut self, message: &RelayMessage) -> Result<(), RelayError>;
}

impl Broadcast for Sender<String> {
    fn broadcast(&mut self, message: &RelayMessage) -> Result<(), RelayError> {
        let line = message.encode()?;
        self.send(line).map_err(|_| RelayError::Disconnected)
    }
}

/// Applies inbound relay traffic and advances the session by one tick.
///
/// Messages queued before a disconnect are still applied. `None` is
/// returned, without touching the session, only once the relay has
/// disconnected and its queue is empty. Remote inputs override local ones
/// for the same player.
pub fn pump(
    session: &mut Session,
    inbox: &RelayInbox,
    local: &BTreeMap<PlayerId, InputSnapshot>,
) -> Option<Vec<Event>> {
    // The flag is read first: anything sent before the disconnect is then
    // already in the queue.
    let disconnected = inbox.is_disconnected();
    let inbound = inbox.drain();
    if disconnected && inbound.is_empty() {
        return None;
    }

    let mut events = Vec::new();
    for command in inbound.commands {
        events.extend(session.submit(command));
    }

    let mut inputs = local.clone();
    inputs.extend(inbound.inputs);
    events.extend(session.step(&inputs));
    Some(events)
}

/// How a relayed run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelayOutcome {
    /// The requested number of ticks completed.
    Completed {
        /// Ticks simulated.
        ticks: u64,
    },
    /// The relay disconnected first.
    Disconnected {
        /// Ticks simulated before the disconnect was noticed.
        ticks: u64,
    },
}

/// Runs up to `max_ticks` relayed ticks, stopping early on disconnect.
///
/// `local` supplies the local inputs for each tick and `observe` sees the
/// events raised by it.
pub fn run<L, O>(
    session: &mut Session,
    inbox: &RelayInbox,
    max_ticks: u64,
    mut local: L,
    mut observe: O,
) -> RelayOutcome
where
    L: FnMut(u64) -> BTreeMap<PlayerId, InputSnapshot>,
    O: FnMut(u64, &[Event]),
{
    for tick in 0..max_ticks {
        let inputs = local(tick);
        match pump(session, inbox, &inputs) {
            Some(events) => observe(tick, &events),
            None => {
                log::info!("relayed session stopped after {tick} ticks");
                return RelayOutcome::Disconnected { ticks: tick };
            }
        }
    }
    RelayOutcome::Completed { ticks: max_ticks }
}
