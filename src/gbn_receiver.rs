//! Go-Back-N receive-side state machine.
//!
//! [`GbnReceiver`] implements the receiver side of Go-Back-N:
//!
//! - Only the packet numbered `expected_seq` is accepted; it is delivered at
//!   once and `expected_seq` advances.
//! - Out-of-order or duplicate packets are **discarded**, and the receiver
//!   re-acknowledges the last in-order number (`expected_seq − 1`) so the
//!   sender's cumulative scheme resynchronizes.
//! - Corrupted packets are dropped **without** an acknowledgment.

use crate::config::{ArqConfig, Policy};
use crate::context::{Context, Role};
use crate::packet::Packet;
use crate::receiver::Receiver;
use crate::seq::{SeqNum, SeqSpace};

/// GBN acknowledgments carry no meaningful sequence number of their own.
const ACK_SEQNUM: i32 = 0;

/// Go-Back-N receive-side state for one session.
#[derive(Debug)]
pub struct GbnReceiver {
    seq: SeqSpace,
    /// Next sequence number to accept and deliver.
    expected_seq: SeqNum,
}

impl GbnReceiver {
    pub fn new(config: &ArqConfig) -> Self {
        Self {
            seq: config.seq(),
            expected_seq: 0,
        }
    }
}

impl Receiver for GbnReceiver {
    fn init(&mut self) {
        self.expected_seq = 0;
    }

    fn on_packet(&mut self, ctx: &mut dyn Context, packet: &Packet) {
        if packet.is_corrupted() {
            log::debug!("[gbn] ← corrupted packet, ignored");
            ctx.stats().corrupted_packets += 1;
            return;
        }
        ctx.stats().packets_received += 1;

        let acknum = if self.seq.index(packet.seqnum) == Some(self.expected_seq) {
            let accepted = self.expected_seq;
            log::debug!("[gbn] ← DATA seq={accepted} in order, delivered");
            ctx.to_application(Role::Receiver, &packet.payload);
            ctx.stats().delivered += 1;
            self.expected_seq = self.seq.next(self.expected_seq);
            accepted
        } else {
            log::debug!(
                "[gbn] ← DATA seq={} not expected ({}), ignored",
                packet.seqnum,
                self.expected_seq
            );
            ctx.stats().out_of_window += 1;
            self.seq.prev(self.expected_seq)
        };

        log::debug!("[gbn] → ACK {acknum}");
        ctx.stats().acks_sent += 1;
        ctx.to_channel(Role::Receiver, Packet::ack(ACK_SEQNUM, acknum as i32));
    }

    fn next_expected(&self) -> SeqNum {
        self.expected_seq
    }

    fn policy(&self) -> Policy {
        Policy::GoBackN
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
