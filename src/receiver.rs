//! Receive-side interface.
//!
//! The [`Receiver`] handles everything between a packet arriving from the
//! channel and its payload reaching the upper layer:
//! - Rejecting corrupted packets.
//! - Deciding whether a sequence number falls within the receive window.
//! - Delivering in-order payloads (and, for SR, buffering out-of-order ones).
//! - Answering with acknowledgments.
//!
//! [`GbnReceiver`] accepts only the next expected packet and stays silent on
//! corruption; [`SrReceiver`] buffers a window of packets and answers every
//! arrival.

use crate::config::{ArqConfig, Policy};
use crate::context::Context;
use crate::gbn_receiver::GbnReceiver;
use crate::packet::Packet;
use crate::seq::SeqNum;
use crate::sr_receiver::SrReceiver;

/// Receiving endpoint of a one-way ARQ session.
pub trait Receiver {
    /// Reset to the session-start state.  Called once before anything else.
    fn init(&mut self);

    /// Handle a data packet arriving from the sender.
    fn on_packet(&mut self, ctx: &mut dyn Context, packet: &Packet);

    /// Oldest sequence number not yet delivered to the upper layer.
    fn next_expected(&self) -> SeqNum;

    fn policy(&self) -> Policy;
}

/// Build the receiver for `config.policy`, already initialised.
pub fn new_receiver(config: &ArqConfig) -> Box<dyn Receiver> {
    let mut receiver: Box<dyn Receiver> = match config.policy {
        Policy::GoBackN => Box::new(GbnReceiver::new(config)),
        Policy::SelectiveRepeat => Box::new(SrReceiver::new(config)),
    };
    receiver.init();
    receiver
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_picks_strategy() {
        let gbn = new_receiver(&ArqConfig::new(Policy::GoBackN));
        let sr = new_receiver(&ArqConfig::new(Policy::SelectiveRepeat));
        assert_eq!(gbn.policy(), Policy::GoBackN);
        assert_eq!(sr.policy(), Policy::SelectiveRepeat);
        assert_eq!(gbn.next_expected(), 0);
        assert_eq!(sr.next_expected(), 0);
    }
}
