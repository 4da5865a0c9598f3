//! Discrete-event harness.
//!
//! The [`Simulator`] owns one sender, one receiver and the world between
//! them: the clock, the event queue, the [`Channel`], one [`Timer`] per role
//! and the [`Stats`].  It reacts to exactly three event kinds and runs each
//! handler to completion before taking the next:
//!
//! | Event    | Dispatched to                                         |
//! |----------|-------------------------------------------------------|
//! | Submit   | [`Sender::submit`] with the next upper-layer message  |
//! | Arrival  | [`Receiver::on_packet`] or [`Sender::on_ack`]         |
//! | Expiry   | [`Sender::on_timeout`], if the arming is still live   |
//!
//! Events are ordered by time, then by the order they were scheduled.  The
//! run ends when the queue drains or the next event lies past the horizon.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::channel::{Channel, Fate, FaultConfig};
use crate::config::{ArqConfig, ConfigError, Policy};
use crate::context::{Context, Role};
use crate::packet::{Message, Packet, Payload};
use crate::receiver::{new_receiver, Receiver};
use crate::sender::{new_sender, Sender};
use crate::stats::Stats;
use crate::timer::{Generation, Timer};

/// Parameters of one simulated run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorConfig {
    /// Messages the upper layer hands to the sender.
    pub messages: usize,
    /// Mean gap between upper-layer messages.
    pub mean_interval: Duration,
    pub faults: FaultConfig,
    pub seed: u64,
    /// Events scheduled later than this are not processed.
    pub horizon: Duration,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            messages: 20,
            mean_interval: Duration::from_millis(20),
            faults: FaultConfig::default(),
            seed: 1234,
            horizon: Duration::from_secs(3600),
        }
    }
}

/// The message the upper layer submits as its `n`th.
pub fn message_for(n: usize) -> Message {
    Message::from_bytes(format!("message {n:>12}").as_bytes())
}

// ---------------------------------------------------------------------------
// Event queue
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum Event {
    Submit,
    Arrival { to: Role, packet: Packet },
    Expiry { role: Role, generation: Generation },
}

#[derive(Debug)]
struct Scheduled {
    at: Duration,
    order: u64,
    event: Event,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        (self.at, self.order) == (other.at, other.order)
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.at, self.order).cmp(&(other.at, other.order))
    }
}

// ---------------------------------------------------------------------------
// World: the Context handed to protocol handlers
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct World {
    now: Duration,
    queue: BinaryHeap<Reverse<Scheduled>>,
    scheduled: u64,
    channel: Channel,
    timers: [Timer; 2],
    stats: Stats,
    delivered: Vec<Payload>,
}

impl World {
    fn schedule(&mut self, at: Duration, event: Event) {
        self.scheduled += 1;
        self.queue.push(Reverse(Scheduled {
            at,
            order: self.scheduled,
            event,
        }));
    }
}

impl Context for World {
    fn to_channel(&mut self, from: Role, packet: Packet) {
        match self.channel.transmit(self.now, from, packet) {
            Fate::Lost => {
                log::debug!("[sim] {from}→{} packet lost", from.peer());
                self.stats.lost_in_channel += 1;
            }
            Fate::Arrives {
                at,
                packet,
                corrupted,
            } => {
                if corrupted {
                    log::debug!("[sim] {from}→{} packet corrupted", from.peer());
                    self.stats.corrupted_in_channel += 1;
                }
                self.schedule(
                    at,
                    Event::Arrival {
                        to: from.peer(),
                        packet,
                    },
                );
            }
        }
    }

    fn start_timer(&mut self, role: Role, after: Duration) {
        if let Some((at, generation)) = self.timers[role.index()].start(self.now, after) {
            self.schedule(at, Event::Expiry { role, generation });
        }
    }

    fn stop_timer(&mut self, role: Role) {
        self.timers[role.index()].stop();
    }

    fn to_application(&mut self, role: Role, payload: &Payload) {
        if role == Role::Receiver {
            self.delivered.push(*payload);
        }
    }

    fn stats(&mut self) -> &mut Stats {
        &mut self.stats
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Outcome of a run.
#[derive(Debug, Clone)]
pub struct Report {
    pub policy: Policy,
    pub stats: Stats,
    /// Messages the sender accepted, in submission order.
    pub accepted: Vec<Payload>,
    /// Payloads handed to the receiving upper layer, in delivery order.
    pub delivered: Vec<Payload>,
    /// Simulated time of the last processed event.
    pub finished_at: Duration,
    /// `false` if the horizon cut the run short.
    pub completed: bool,
}

impl Report {
    /// Every accepted message delivered once, in order, and nothing else.
    pub fn is_exactly_once_in_order(&self) -> bool {
        self.accepted == self.delivered
    }
}

// ---------------------------------------------------------------------------
// Simulator
// ---------------------------------------------------------------------------

pub struct Simulator {
    config: SimulatorConfig,
    policy: Policy,
    world: World,
    sender: Box<dyn Sender>,
    receiver: Box<dyn Receiver>,
    /// Drives message inter-arrival times; separate from the channel's.
    rng: SmallRng,
    submitted: usize,
    accepted: Vec<Payload>,
    horizon_hit: bool,
}

impl Simulator {
    pub fn new(arq: ArqConfig, config: SimulatorConfig) -> Result<Self, ConfigError> {
        arq.validate()?;
        config.faults.validate()?;

        let mut world = World {
            now: Duration::ZERO,
            queue: BinaryHeap::new(),
            scheduled: 0,
            channel: Channel::new(config.faults.clone(), config.seed),
            timers: [Timer::new(Role::Sender), Timer::new(Role::Receiver)],
            stats: Stats::default(),
            delivered: Vec::new(),
        };
        let mut rng = SmallRng::seed_from_u64(config.seed.wrapping_add(1));
        if config.messages > 0 {
            let first = interval(&mut rng, config.mean_interval);
            world.schedule(first, Event::Submit);
        }

        log::info!(
            "[sim] {} window={} seqspace={} messages={} loss={} corrupt={}",
            arq.policy,
            arq.window_size,
            arq.seq_space,
            config.messages,
            config.faults.loss_rate,
            config.faults.corrupt_rate
        );

        Ok(Self {
            policy: arq.policy,
            sender: new_sender(&arq),
            receiver: new_receiver(&arq),
            config,
            world,
            rng,
            submitted: 0,
            accepted: Vec::new(),
            horizon_hit: false,
        })
    }

    /// Current simulated time.
    pub fn now(&self) -> Duration {
        self.world.now
    }

    /// Time of the next pending event, if any.
    pub fn next_event_time(&self) -> Option<Duration> {
        self.world.queue.peek().map(|Reverse(s)| s.at)
    }

    pub fn sender(&self) -> &dyn Sender {
        self.sender.as_ref()
    }

    pub fn receiver(&self) -> &dyn Receiver {
        self.receiver.as_ref()
    }

    pub fn stats(&self) -> &Stats {
        &self.world.stats
    }

    /// Process the next event.  Returns `false` once there is nothing left
    /// to do within the horizon.
    pub fn step(&mut self) -> bool {
        let Some(Reverse(next)) = self.world.queue.pop() else {
            return false;
        };
        if next.at > self.config.horizon {
            log::warn!(
                "[sim] horizon {:?} reached with {} event(s) pending",
                self.config.horizon,
                self.world.queue.len() + 1
            );
            self.horizon_hit = true;
            return false;
        }
        self.world.now = next.at;

        match next.event {
            Event::Submit => self.submit(),
            Event::Arrival {
                to: Role::Receiver,
                packet,
            } => self.receiver.on_packet(&mut self.world, &packet),
            Event::Arrival {
                to: Role::Sender,
                packet,
            } => self.sender.on_ack(&mut self.world, &packet),
            Event::Expiry { role, generation } => {
                if self.world.timers[role.index()].fire(generation) {
                    match role {
                        Role::Sender => self.sender.on_timeout(&mut self.world),
                        Role::Receiver => log::debug!("[sim] B timer fired, nothing to do"),
                    }
                }
            }
        }
        true
    }

    /// Run to completion.
    pub fn run(mut self) -> Report {
        while self.step() {}
        self.finish()
    }

    /// Stop and summarise, whatever the state of the queue.
    pub fn finish(self) -> Report {
        let completed = !self.horizon_hit && self.world.queue.is_empty();
        let report = Report {
            policy: self.policy,
            stats: self.world.stats,
            accepted: self.accepted,
            delivered: self.world.delivered,
            finished_at: self.world.now,
            completed,
        };
        log::info!(
            "[sim] finished at {:?}: {} accepted, {} delivered",
            report.finished_at,
            report.accepted.len(),
            report.delivered.len()
        );
        report
    }

    fn submit(&mut self) {
        let message = message_for(self.submitted);
        self.submitted += 1;
        if self.sender.submit(&mut self.world, message) {
            self.accepted.push(message.data);
        }
        if self.submitted < self.config.messages {
            let at = self.world.now + interval(&mut self.rng, self.config.mean_interval);
            self.world.schedule(at, Event::Submit);
        }
    }
}

/// Uniform on `[0, 2 × mean]`.
fn interval(rng: &mut SmallRng, mean: Duration) -> Duration {
    mean.mul_f64(2.0 * rng.gen::<f64>())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean(messages: usize) -> SimulatorConfig {
        SimulatorConfig {
            messages,
            ..SimulatorConfig::default()
        }
    }

    #[test]
    fn messages_are_distinct_and_full_length() {
        let a = message_for(0);
        let b = message_for(1);
        assert_ne!(a, b);
        assert_eq!(&a.data, b"message            0");
    }

    #[test]
    fn scheduled_orders_by_time_then_insertion() {
        let a = Scheduled {
            at: Duration::from_millis(5),
            order: 2,
            event: Event::Submit,
        };
        let b = Scheduled {
            at: Duration::from_millis(5),
            order: 1,
            event: Event::Submit,
        };
        let c = Scheduled {
            at: Duration::from_millis(4),
            order: 9,
            event: Event::Submit,
        };
        assert!(b < a);
        assert!(c < b);
    }

    #[test]
    fn no_messages_no_events() {
        let sim = Simulator::new(ArqConfig::default(), clean(0)).unwrap();
        assert_eq!(sim.next_event_time(), None);
        let report = sim.run();
        assert!(report.completed);
        assert!(report.delivered.is_empty());
    }

    #[test]
    fn clean_channel_delivers_everything() {
        for policy in [Policy::GoBackN, Policy::SelectiveRepeat] {
            let report = Simulator::new(ArqConfig::new(policy), clean(30)).unwrap().run();
            assert!(report.completed);
            assert!(report.is_exactly_once_in_order(), "{policy}");
            assert_eq!(report.stats.lost_in_channel, 0);
            assert_eq!(report.stats.delivered as usize, report.accepted.len());
        }
    }

    #[test]
    fn invalid_config_rejected() {
        let arq = ArqConfig {
            seq_space: 6,
            ..ArqConfig::default()
        };
        assert!(Simulator::new(arq, clean(1)).is_err());
    }

    #[test]
    fn horizon_cuts_run_short() {
        let config = SimulatorConfig {
            messages: 50,
            horizon: Duration::from_millis(30),
            ..SimulatorConfig::default()
        };
        let report = Simulator::new(ArqConfig::default(), config).unwrap().run();
        assert!(!report.completed);
        assert!(report.finished_at <= Duration::from_millis(30));
    }
}
