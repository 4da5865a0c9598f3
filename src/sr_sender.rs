//! Selective Repeat send-side state machine.
//!
//! Every packet is acknowledged individually.  An acknowledgment marks its
//! own sequence number only; the window slides once the oldest outstanding
//! packet is marked.
//!
//! One shared timer drives recovery instead of a timer per packet.  On expiry
//! only the oldest unacknowledged packet is resent and the timer is re-armed;
//! each retransmission draws a fresh acknowledgment, so later gaps are
//! repaired on later expiries.

use crate::config::{ArqConfig, Policy};
use crate::context::{Context, Role};
use crate::packet::{Message, Packet};
use crate::send_window::SendWindow;
use crate::sender::{self, Sender};

#[derive(Debug)]
pub struct SrSender {
    config: ArqConfig,
    window: SendWindow,
}

impl SrSender {
    pub fn new(config: &ArqConfig) -> Self {
        Self {
            config: config.clone(),
            window: SendWindow::new(config),
        }
    }
}

impl Sender for SrSender {
    fn init(&mut self) {
        self.window.reset();
    }

    fn submit(&mut self, ctx: &mut dyn Context, message: Message) -> bool {
        sender::admit(&mut self.window, ctx, &self.config, message)
    }

    fn on_ack(&mut self, ctx: &mut dyn Context, packet: &Packet) {
        if packet.is_corrupted() {
            log::debug!("[sr] ← corrupted ACK, ignored");
            ctx.stats().corrupted_acks += 1;
            return;
        }
        ctx.stats().acks_received += 1;

        // The window is [base, base + window_size); numbers in it that were
        // never sent cannot be acknowledged either.
        let ack = match self.window.seq().index(packet.acknum) {
            Some(ack) if self.window.in_window(ack) && self.window.contains(ack) => ack,
            _ => {
                log::debug!("[sr] ← ACK {} outside window, ignored", packet.acknum);
                ctx.stats().ignored_acks += 1;
                return;
            }
        };

        if !self.window.mark_acked(ack) {
            log::debug!("[sr] ← ACK {ack} (duplicate)");
            ctx.stats().duplicate_acks += 1;
            return;
        }
        ctx.stats().new_acks += 1;

        let retired = self.window.slide();
        log::debug!(
            "[sr] ← ACK {ack} (slid {retired}) base={} in_flight={}",
            self.window.base(),
            self.window.outstanding()
        );

        ctx.stop_timer(Role::Sender);
        if self.window.unacked().next().is_some() {
            ctx.start_timer(Role::Sender, self.config.rtt);
        }
    }

    fn on_timeout(&mut self, ctx: &mut dyn Context) {
        let Some(s) = self.window.unacked().next() else {
            log::debug!("[sr] timeout with nothing outstanding");
            return;
        };
        if let Some(packet) = self.window.retransmit(s) {
            log::debug!("[sr] timeout, → DATA seq={s} (resend)");
            ctx.stats().packets_resent += 1;
            ctx.to_channel(Role::Sender, packet);
        }
        ctx.start_timer(Role::Sender, self.config.rtt);
    }

    fn window(&self) -> &SendWindow {
        &self.window
    }

    fn policy(&self) -> Policy {
        Policy::SelectiveRepeat
    }
}
