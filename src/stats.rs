//! Observability counters shared by both roles.
//!
//! One [`Stats`] value is owned by the harness and lent to every handler via
//! [`crate::context::Context::stats`], so protocol components never reach for
//! global state and stay testable on their own.

use std::fmt;

/// Event counters for one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Stats {
    // Sender
    /// Submissions rejected because the window was full.
    pub window_full: u64,
    /// First transmissions of data packets.
    pub packets_sent: u64,
    /// Retransmissions of data packets.
    pub packets_resent: u64,
    /// Uncorrupted acknowledgments that reached the sender.
    pub acks_received: u64,
    /// Acknowledgments that moved sender state.
    pub new_acks: u64,
    /// Acknowledgments for numbers already acknowledged or retired.
    pub duplicate_acks: u64,
    /// Acknowledgments dropped on checksum mismatch.
    pub corrupted_acks: u64,
    /// Acknowledgments outside the send window.
    pub ignored_acks: u64,

    // Receiver
    /// Uncorrupted data packets that reached the receiver.
    pub packets_received: u64,
    /// Data packets dropped on checksum mismatch.
    pub corrupted_packets: u64,
    /// Uncorrupted data packets outside the receive window.
    pub out_of_window: u64,
    /// In-window data packets whose slot was already filled.
    pub duplicate_packets: u64,
    /// Payloads handed to the upper layer.
    pub delivered: u64,
    /// Acknowledgments sent by the receiver.
    pub acks_sent: u64,

    // Channel
    pub lost_in_channel: u64,
    pub corrupted_in_channel: u64,
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: [(&str, u64); 16] = [
            ("window full", self.window_full),
            ("packets sent", self.packets_sent),
            ("packets resent", self.packets_resent),
            ("acks received", self.acks_received),
            ("new acks", self.new_acks),
            ("duplicate acks", self.duplicate_acks),
            ("corrupted acks", self.corrupted_acks),
            ("ignored acks", self.ignored_acks),
            ("packets received", self.packets_received),
            ("corrupted packets", self.corrupted_packets),
            ("out of window", self.out_of_window),
            ("duplicate packets", self.duplicate_packets),
            ("delivered", self.delivered),
            ("acks sent", self.acks_sent),
            ("lost in channel", self.lost_in_channel),
            ("corrupted in channel", self.corrupted_in_channel),
        ];
        for (label, value) in rows {
            writeln!(f, "{label:<22}{value:>8}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_lists_every_counter() {
        let stats = Stats {
            packets_resent: 3,
            ..Stats::default()
        };
        let text = stats.to_string();
        assert_eq!(text.lines().count(), 16);
        assert!(text.contains("packets resent"));
        assert!(text.lines().any(|l| l.starts_with("packets resent") && l.ends_with('3')));
    }
}
