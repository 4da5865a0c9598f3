//! Fault model of the simulated channel.
//!
//! Real links drop and damage packets.  To exercise the recovery paths
//! without depending on actual network conditions, [`Channel`] decides the
//! fate of every transmission:
//!
//! | Fault      | Description                                                |
//! |------------|------------------------------------------------------------|
//! | Loss       | Drop the packet with probability `loss_rate`.              |
//! | Delay      | Arrive 1–10 time units after the later of *now* and the    |
//! |            | previous arrival in the same direction (never reordered).  |
//! | Corruption | With probability `corrupt_rate`, overwrite payload byte 0  |
//! |            | with `'Z'` (75%), the seqnum (12.5%) or the acknum (12.5%).|
//!
//! Randomness comes from a seeded [`SmallRng`], so runs are reproducible.

use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::{check_probability, ConfigError};
use crate::context::Role;
use crate::packet::Packet;

/// Value written over a header field by the corruption injector.
pub const SCRIBBLE: i32 = 999_999;

/// Fixed part of the one-way delay.
const MIN_DELAY: Duration = Duration::from_millis(1);

/// Upper bound of the random part of the one-way delay.
const JITTER: Duration = Duration::from_millis(9);

/// Probabilities of the fault-injection model.
#[derive(Debug, Clone, PartialEq)]
pub struct FaultConfig {
    /// Probability that a packet is silently dropped.
    pub loss_rate: f64,
    /// Probability that a surviving packet is corrupted.
    pub corrupt_rate: f64,
}

impl Default for FaultConfig {
    fn default() -> Self {
        // No faults by default; the channel only delays.
        Self {
            loss_rate: 0.0,
            corrupt_rate: 0.0,
        }
    }
}

impl FaultConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_probability("loss rate", self.loss_rate)?;
        check_probability("corruption rate", self.corrupt_rate)
    }
}

/// What became of one transmission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fate {
    Lost,
    Arrives {
        at: Duration,
        packet: Packet,
        corrupted: bool,
    },
}

/// Order-preserving, lossy, corrupting channel between the two roles.
#[derive(Debug)]
pub struct Channel {
    config: FaultConfig,
    rng: SmallRng,
    /// Latest scheduled arrival per direction, indexed by sending role.
    last_arrival: [Duration; 2],
}

impl Channel {
    pub fn new(config: FaultConfig, seed: u64) -> Self {
        Self {
            config,
            rng: SmallRng::seed_from_u64(seed),
            last_arrival: [Duration::ZERO; 2],
        }
    }

    /// Decide the fate of `packet` sent by `from` at time `now`.
    pub fn transmit(&mut self, now: Duration, from: Role, mut packet: Packet) -> Fate {
        if self.rng.gen_bool(self.config.loss_rate) {
            return Fate::Lost;
        }

        let after = now.max(self.last_arrival[from.index()]);
        let at = after + MIN_DELAY + JITTER.mul_f64(self.rng.gen::<f64>());
        self.last_arrival[from.index()] = at;

        let corrupted = self.rng.gen_bool(self.config.corrupt_rate);
        if corrupted {
            let x: f64 = self.rng.gen();
            if x < 0.75 {
                packet.payload[0] = b'Z';
            } else if x < 0.875 {
                packet.seqnum = SCRIBBLE;
            } else {
                packet.acknum = SCRIBBLE;
            }
        }

        Fate::Arrives {
            at,
            packet,
            corrupted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::Message;

    fn pkt(seq: u32) -> Packet {
        Packet::data(seq, &Message::from_bytes(b"abc"))
    }

    #[test]
    fn clean_channel_delivers_unchanged() {
        let mut ch = Channel::new(FaultConfig::default(), 1);
        match ch.transmit(Duration::ZERO, Role::Sender, pkt(0)) {
            Fate::Arrives {
                at,
                packet,
                corrupted,
            } => {
                assert!(!corrupted);
                assert_eq!(packet, pkt(0));
                assert!(at >= MIN_DELAY && at <= MIN_DELAY + JITTER);
            }
            Fate::Lost => panic!("lossless channel dropped a packet"),
        }
    }

    #[test]
    fn arrivals_preserve_send_order() {
        let mut ch = Channel::new(FaultConfig::default(), 7);
        let mut last = Duration::ZERO;
        for s in 0..100 {
            let Fate::Arrives { at, .. } = ch.transmit(Duration::ZERO, Role::Sender, pkt(s % 12))
            else {
                panic!("lost");
            };
            assert!(at > last);
            last = at;
        }
    }

    #[test]
    fn directions_are_independent() {
        let mut ch = Channel::new(FaultConfig::default(), 3);
        for s in 0..10 {
            ch.transmit(Duration::ZERO, Role::Sender, pkt(s));
        }
        let Fate::Arrives { at, .. } = ch.transmit(Duration::ZERO, Role::Receiver, Packet::ack(0, 0))
        else {
            panic!("lost");
        };
        assert!(at <= MIN_DELAY + JITTER);
    }

    #[test]
    fn total_loss_drops_everything() {
        let faults = FaultConfig {
            loss_rate: 1.0,
            ..FaultConfig::default()
        };
        let mut ch = Channel::new(faults, 0);
        for s in 0..20 {
            assert_eq!(ch.transmit(Duration::ZERO, Role::Sender, pkt(s)), Fate::Lost);
        }
    }

    #[test]
    fn every_corruption_is_detectable() {
        let faults = FaultConfig {
            corrupt_rate: 1.0,
            ..FaultConfig::default()
        };
        let mut ch = Channel::new(faults, 11);
        for s in 0..200 {
            let Fate::Arrives {
                packet, corrupted, ..
            } = ch.transmit(Duration::ZERO, Role::Sender, pkt(s % 12))
            else {
                panic!("lost");
            };
            assert!(corrupted);
            assert!(packet.is_corrupted());
        }
    }

    #[test]
    fn same_seed_same_fates() {
        let faults = FaultConfig {
            loss_rate: 0.3,
            corrupt_rate: 0.3,
        };
        let mut a = Channel::new(faults.clone(), 42);
        let mut b = Channel::new(faults, 42);
        for s in 0..50 {
            assert_eq!(
                a.transmit(Duration::ZERO, Role::Sender, pkt(s % 12)),
                b.transmit(Duration::ZERO, Role::Sender, pkt(s % 12))
            );
        }
    }

    #[test]
    fn rejects_bad_probabilities() {
        let faults = FaultConfig {
            loss_rate: -0.1,
            ..FaultConfig::default()
        };
        assert!(faults.validate().is_err());
    }
}
