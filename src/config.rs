//! Protocol constants and their validation.
//!
//! The window and sequence-space sizes are fixed at build time.  [`ArqConfig`]
//! bundles them with the selected [`Policy`] so the sizing invariants are
//! checked once, at construction, instead of being assumed by every handler.
//!
//! Time is measured in abstract units; the real-time driver maps one unit to
//! one millisecond, so [`Duration`] is used throughout.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::seq::SeqSpace;

/// Retransmission timeout, one round trip.
pub const RTT: Duration = Duration::from_millis(16);

/// Maximum number of sent-but-unacknowledged packets.
pub const WINDOW_SIZE: usize = 6;

/// Size of the sequence-number ring.
pub const SEQ_SPACE: u32 = 12;

/// Number of out-of-order slots at a Selective Repeat receiver.
pub const RECV_WINDOW_SIZE: usize = 6;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Rejected configuration or argument.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("window size must be at least 1")]
    EmptyWindow,

    #[error("sequence space of {seq_space} is too small for {policy} with window {window} (need at least {required})")]
    SeqSpaceTooSmall {
        policy: Policy,
        window: usize,
        seq_space: u32,
        required: u64,
    },

    #[error("receive window of {recv_window} does not fit a sequence space of {seq_space}")]
    RecvWindowTooLarge { recv_window: usize, seq_space: u32 },

    #[error("{name} must be a probability in [0, 1], got {value}")]
    Probability { name: &'static str, value: f64 },

    #[error("unknown policy `{0}` (expected `gbn` or `sr`)")]
    UnknownPolicy(String),
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Retransmission policy, chosen once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Policy {
    /// Cumulative acknowledgment; resend the whole window on timeout.
    GoBackN,
    /// Per-packet acknowledgment with receiver-side reordering.
    SelectiveRepeat,
}

impl Policy {
    /// Short tag used in log lines.
    pub fn tag(&self) -> &'static str {
        match self {
            Policy::GoBackN => "gbn",
            Policy::SelectiveRepeat => "sr",
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::GoBackN => write!(f, "Go-Back-N"),
            Policy::SelectiveRepeat => write!(f, "Selective Repeat"),
        }
    }
}

impl FromStr for Policy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gbn" | "go-back-n" => Ok(Policy::GoBackN),
            "sr" | "selective-repeat" => Ok(Policy::SelectiveRepeat),
            _ => Err(ConfigError::UnknownPolicy(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// ArqConfig
// ---------------------------------------------------------------------------

/// Sizing and timing for one sender/receiver pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArqConfig {
    pub policy: Policy,
    /// Retransmission timeout.
    pub rtt: Duration,
    /// Sender window (WINDOWSIZE).
    pub window_size: usize,
    /// Sequence-number ring size (SEQSPACE).
    pub seq_space: u32,
    /// Selective Repeat receive buffer (RECV_WINDOWSIZE).  Ignored by GBN.
    pub recv_window_size: usize,
}

impl ArqConfig {
    /// The build-time constants under `policy`.
    pub fn new(policy: Policy) -> Self {
        Self {
            policy,
            rtt: RTT,
            window_size: WINDOW_SIZE,
            seq_space: SEQ_SPACE,
            recv_window_size: RECV_WINDOW_SIZE,
        }
    }

    /// Check the sizing invariants.
    ///
    /// GBN needs `seq_space ≥ window + 1` so a full window never reuses the
    /// number of an unacknowledged packet.  Selective Repeat additionally
    /// needs the receiver to tell a retransmission of a delivered packet from
    /// a new one: `seq_space ≥ window + recv_window`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sr = self.policy == Policy::SelectiveRepeat;
        if self.window_size == 0 || (sr && self.recv_window_size == 0) {
            return Err(ConfigError::EmptyWindow);
        }
        let required = match self.policy {
            Policy::GoBackN => self.window_size as u64 + 1,
            Policy::SelectiveRepeat => self.window_size as u64 + self.recv_window_size as u64,
        };
        if u64::from(self.seq_space) < required {
            return Err(ConfigError::SeqSpaceTooSmall {
                policy: self.policy,
                window: self.window_size,
                seq_space: self.seq_space,
                required,
            });
        }
        if self.recv_window_size as u64 > u64::from(self.seq_space) {
            return Err(ConfigError::RecvWindowTooLarge {
                recv_window: self.recv_window_size,
                seq_space: self.seq_space,
            });
        }
        Ok(())
    }

    pub fn seq(&self) -> SeqSpace {
        SeqSpace::new(self.seq_space)
    }
}

impl Default for ArqConfig {
    fn default() -> Self {
        Self::new(Policy::GoBackN)
    }
}

/// Check that `value` is a probability.
pub(crate) fn check_probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Probability { name, value })
    }
}
