//! The collaborator surface seen by protocol handlers.
//!
//! Sender and receiver never touch the channel, the timer or the upper layer
//! directly.  Every handler receives a `&mut dyn Context` and performs all of
//! its effects through it:
//!
//! ```text
//!            to_application             to_channel
//!  upper ◀──────────────────┐      ┌──────────────────▶ channel
//!  layer                    │      │
//!                        ┌──┴──────┴──┐  start_timer / stop_timer
//!                        │  handler   │ ─────────────────────────▶ timer
//!                        └─────┬──────┘
//!                              │ stats()
//!                              ▼
//!                           counters
//! ```
//!
//! [`crate::simulator`] provides the production implementation;
//! [`Recorder`] captures effects in memory for tests.

use std::fmt;
use std::time::Duration;

use crate::packet::{Packet, Payload};
use crate::stats::Stats;

/// The two endpoints.  Data flows from `Sender` to `Receiver` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Sender,
    Receiver,
}

impl Role {
    /// The other endpoint.
    pub fn peer(self) -> Role {
        match self {
            Role::Sender => Role::Receiver,
            Role::Receiver => Role::Sender,
        }
    }

    /// Dense index for per-role arrays.
    pub fn index(self) -> usize {
        match self {
            Role::Sender => 0,
            Role::Receiver => 1,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Sender => write!(f, "A"),
            Role::Receiver => write!(f, "B"),
        }
    }
}

/// Effects a handler may perform.
pub trait Context {
    /// Hand `packet` to the channel, travelling from `from` to its peer.
    fn to_channel(&mut self, from: Role, packet: Packet);

    /// Arm `role`'s single-shot timer.  Must not be called while it runs.
    fn start_timer(&mut self, role: Role, after: Duration);

    /// Disarm `role`'s timer.
    fn stop_timer(&mut self, role: Role);

    /// Deliver a payload to the upper layer at `role`.
    fn to_application(&mut self, role: Role, payload: &Payload);

    /// Counters for this run.
    fn stats(&mut self) -> &mut Stats;
}

// ---------------------------------------------------------------------------
// Recorder
// ---------------------------------------------------------------------------

/// One observable effect, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Sent(Role, Packet),
    TimerStarted(Role, Duration),
    TimerStopped(Role),
    Delivered(Role, Payload),
}

/// A [`Context`] that records every effect and tracks timer state.
///
/// Misuse of the timer (start while running, stop while idle) is counted in
/// `timer_misuse` rather than panicking, so tests can assert on it.
#[derive(Debug, Default)]
pub struct Recorder {
    pub effects: Vec<Effect>,
    pub stats: Stats,
    pub timer_misuse: usize,
    running: [bool; 2],
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` while `role`'s timer is armed.
    pub fn timer_running(&self, role: Role) -> bool {
        self.running[role.index()]
    }

    /// Simulate expiry: the timer disarms itself before the handler runs.
    pub fn expire(&mut self, role: Role) {
        self.running[role.index()] = false;
    }

    /// Drain and return the recorded effects.
    pub fn take(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    /// Packets sent so far by `role`.
    pub fn sent_by(&self, role: Role) -> Vec<Packet> {
        self.effects
            .iter()
            .filter_map(|e| match e {
                Effect::Sent(r, p) if *r == role => Some(*p),
                _ => None,
            })
            .collect()
    }

    /// Payloads delivered so far at `role`.
    pub fn delivered_to(&self, role: Role) -> Vec<Payload> {
        self.effects
            .iter()
            .filter_map(|e| match e {
                Effect::Delivered(r, p) if *r == role => Some(*p),
                _ => None,
            })
            .collect()
    }

    /// Number of timer starts recorded for `role`.
    pub fn timer_starts(&self, role: Role) -> usize {
        self.effects
            .iter()
            .filter(|e| matches!(e, Effect::TimerStarted(r, _) if *r == role))
            .count()
    }
}

impl Context for Recorder {
    fn to_channel(&mut self, from: Role, packet: Packet) {
        self.effects.push(Effect::Sent(from, packet));
    }

    fn start_timer(&mut self, role: Role, after: Duration) {
        if self.running[role.index()] {
            self.timer_misuse += 1;
        }
        self.running[role.index()] = true;
        self.effects.push(Effect::TimerStarted(role, after));
    }

    fn stop_timer(&mut self, role: Role) {
        if !self.running[role.index()] {
            self.timer_misuse += 1;
        }
        self.running[role.index()] = false;
        self.effects.push(Effect::TimerStopped(role));
    }

    fn to_application(&mut self, role: Role, payload: &Payload) {
        self.effects.push(Effect::Delivered(role, *payload));
    }

    fn stats(&mut self) -> &mut Stats {
        &mut self.stats
    }
}
