//! Selective Repeat receive-side state machine.
//!
//! The receiver buffers up to `recv_window_size` packets starting at
//! `recv_base`.  Slots are indexed relative to `recv_base`, not by absolute
//! sequence number:
//!
//! ```text
//!   recv_base
//!      │
//!   slot 0   slot 1   slot 2   ...   slot W-1
//!   [    ]   [ p+1]   [ p+2]         [    ]
//! ```
//!
//! Every arrival is answered.  An uncorrupted packet is acknowledged with its
//! own number whether it was cached, already cached, or already delivered
//! (outside the window).  A corrupted packet is echoed back with its received
//! sequence number and `acknum = NOT_IN_USE`: the number cannot be trusted, so
//! the echo must never read as an acceptance at the sender.
//!
//! After each arrival the window slides while slot 0 is filled, delivering in
//! order.

use crate::config::{ArqConfig, Policy};
use crate::context::{Context, Role};
use crate::packet::{Packet, NOT_IN_USE};
use crate::receiver::Receiver;
use crate::seq::{SeqNum, SeqSpace};

#[derive(Debug)]
pub struct SrReceiver {
    seq: SeqSpace,
    /// Oldest sequence number not yet delivered.
    recv_base: SeqNum,
    /// Cached packets; slot `k` holds `recv_base + k`.
    slots: Box<[Option<Packet>]>,
}

impl SrReceiver {
    pub fn new(config: &ArqConfig) -> Self {
        Self {
            seq: config.seq(),
            recv_base: 0,
            slots: vec![None; config.recv_window_size].into_boxed_slice(),
        }
    }

    /// Number of packets cached out of order.
    pub fn buffered(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// `true` when `s` is cached and awaiting delivery.
    pub fn is_buffered(&self, s: SeqNum) -> bool {
        let rel = self.seq.distance(self.recv_base, s) as usize;
        self.slots.get(rel).map_or(false, Option::is_some)
    }

    /// Deliver slot 0 while it is filled, shifting the buffer down.
    fn deliver_in_order(&mut self, ctx: &mut dyn Context) {
        while let Some(packet) = self.slots.first_mut().and_then(Option::take) {
            log::debug!("[sr] deliver seq={}", self.recv_base);
            ctx.to_application(Role::Receiver, &packet.payload);
            ctx.stats().delivered += 1;
            self.slots.rotate_left(1);
            self.recv_base = self.seq.next(self.recv_base);
        }
    }
}

impl Receiver for SrReceiver {
    fn init(&mut self) {
        self.recv_base = 0;
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    fn on_packet(&mut self, ctx: &mut dyn Context, packet: &Packet) {
        let ack = if packet.is_corrupted() {
            log::debug!("[sr] ← corrupted packet, echo {}", packet.seqnum);
            ctx.stats().corrupted_packets += 1;
            Packet::ack(packet.seqnum, NOT_IN_USE)
        } else {
            ctx.stats().packets_received += 1;
            match self.seq.index(packet.seqnum) {
                Some(s) => {
                    let rel = self.seq.distance(self.recv_base, s) as usize;
                    match self.slots.get_mut(rel) {
                        Some(slot) if slot.is_none() => {
                            log::debug!("[sr] ← DATA seq={s} cached in slot {rel}");
                            *slot = Some(*packet);
                        }
                        Some(_) => {
                            log::debug!("[sr] ← DATA seq={s} already cached");
                            ctx.stats().duplicate_packets += 1;
                        }
                        None => {
                            log::debug!("[sr] ← DATA seq={s} outside window, re-ack");
                            ctx.stats().out_of_window += 1;
                        }
                    }
                    Packet::ack(packet.seqnum, packet.seqnum)
                }
                None => {
                    log::debug!("[sr] ← DATA seq={} not a sequence number", packet.seqnum);
                    ctx.stats().out_of_window += 1;
                    Packet::ack(packet.seqnum, NOT_IN_USE)
                }
            }
        };

        log::debug!("[sr] → ACK {}", ack.acknum);
        ctx.stats().acks_sent += 1;
        ctx.to_channel(Role::Receiver, ack);

        self.deliver_in_order(ctx);
    }

    fn next_expected(&self) -> SeqNum {
        self.recv_base
    }

    fn policy(&self) -> Policy {
        Policy::SelectiveRepeat
    }
}
