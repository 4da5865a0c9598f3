//! Go-Back-N send-side state machine.
//!
//! [`GbnSender`] keeps up to `window_size` packets in flight under a single
//! retransmission timer.
//!
//! # Protocol contract
//!
//! - At most `window_size` packets may be outstanding at once.
//! - ACKs are **cumulative**: an ACK for `s` inside `[base, next_seq)`
//!   acknowledges every packet from `base` through `s`.  The window then
//!   slides past the acknowledged run.
//! - An ACK outside `[base, next_seq)` refers to something already retired
//!   (or never sent) and is counted as a duplicate.
//! - On timeout, every outstanding unacknowledged packet is resent in order
//!   (go back N) and the timer is armed once for the whole batch.

use crate::config::{ArqConfig, Policy};
use crate::context::{Context, Role};
use crate::packet::{Message, Packet};
use crate::send_window::SendWindow;
use crate::sender::{self, Sender};

/// Go-Back-N send-side state for one session.
#[derive(Debug)]
pub struct GbnSender {
    config: ArqConfig,
    window: SendWindow,
}

impl GbnSender {
    pub fn new(config: &ArqConfig) -> Self {
        Self {
            config: config.clone(),
            window: SendWindow::new(config),
        }
    }
}

impl Sender for GbnSender {
    fn init(&mut self) {
        self.window.reset();
    }

    fn submit(&mut self, ctx: &mut dyn Context, message: Message) -> bool {
        sender::admit(&mut self.window, ctx, &self.config, message)
    }

    fn on_ack(&mut self, ctx: &mut dyn Context, packet: &Packet) {
        if packet.is_corrupted() {
            log::debug!("[gbn] ← corrupted ACK, ignored");
            ctx.stats().corrupted_acks += 1;
            return;
        }
        ctx.stats().acks_received += 1;

        let seq = self.window.seq();
        let ack = match seq.index(packet.acknum) {
            Some(ack) if self.window.contains(ack) => ack,
            _ => {
                log::debug!("[gbn] ← ACK {} (duplicate)", packet.acknum);
                ctx.stats().duplicate_acks += 1;
                return;
            }
        };

        // Cumulative: everything from base through `ack` is now acknowledged.
        for s in seq.range(self.window.base(), seq.next(ack)) {
            self.window.mark_acked(s);
        }
        let retired = self.window.slide();
        ctx.stats().new_acks += 1;
        log::debug!(
            "[gbn] ← ACK {ack} (slid {retired}) base={} in_flight={}",
            self.window.base(),
            self.window.outstanding()
        );

        ctx.stop_timer(Role::Sender);
        if !self.window.is_empty() {
            ctx.start_timer(Role::Sender, self.config.rtt);
        }
    }

    fn on_timeout(&mut self, ctx: &mut dyn Context) {
        log::debug!(
            "[gbn] timeout, resending {} packet(s) from {}",
            self.window.outstanding(),
            self.window.base()
        );
        let pending: Vec<_> = self.window.unacked().collect();
        for s in pending {
            if let Some(packet) = self.window.retransmit(s) {
                log::debug!("[gbn] → DATA seq={s} (resend)");
                ctx.stats().packets_resent += 1;
                ctx.to_channel(Role::Sender, packet);
            }
        }
        ctx.start_timer(Role::Sender, self.config.rtt);
    }

    fn window(&self) -> &SendWindow {
        &self.window
    }

    fn policy(&self) -> Policy {
        Policy::GoBackN
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Effect, Recorder};

    fn setup(n: u8) -> (GbnSender, Recorder) {
        let mut s = GbnSender::new(&ArqConfig::new(Policy::GoBackN));
        s.init();
        let mut ctx = Recorder::new();
        for i in 0..n {
            assert!(s.submit(&mut ctx, Message::from_bytes(&[b'a' + i])));
        }
        (s, ctx)
    }

    #[test]
    fn initial_state() {
        let (s, _) = setup(0);
        assert_eq!(s.window().base(), 0);
        assert_eq!(s.window().next_seq(), 0);
        assert!(s.window().is_empty());
    }

    #[test]
    fn ack_for_base_slides_by_one() {
        let (mut s, mut ctx) = setup(2);
        s.on_ack(&mut ctx, &Packet::ack(0, 0));
        assert_eq!(s.window().base(), 1);
        assert_eq!(s.window().outstanding(), 1);
        assert!(ctx.timer_running(Role::Sender));
        assert_eq!(ctx.stats.new_acks, 1);
    }

    #[test]
    fn cumulative_ack_covers_earlier_packets() {
        let (mut s, mut ctx) = setup(4);
        // ACK 0 and 1 were lost; ACK 2 acknowledges all three.
        s.on_ack(&mut ctx, &Packet::ack(0, 2));
        assert_eq!(s.window().base(), 3);
        assert_eq!(s.window().outstanding(), 1);
    }

    #[test]
    fn last_ack_stops_timer() {
        let (mut s, mut ctx) = setup(2);
        s.on_ack(&mut ctx, &Packet::ack(0, 1));
        assert!(s.window().is_empty());
        assert!(!ctx.timer_running(Role::Sender));
        assert_eq!(ctx.timer_misuse, 0);
    }

    #[test]
    fn duplicate_ack_changes_nothing() {
        let (mut s, mut ctx) = setup(3);
        s.on_ack(&mut ctx, &Packet::ack(0, 0));
        let effects = ctx.effects.len();

        s.on_ack(&mut ctx, &Packet::ack(0, 0));
        assert_eq!(s.window().base(), 1);
        assert_eq!(s.window().outstanding(), 2);
        assert_eq!(ctx.effects.len(), effects);
        assert_eq!(ctx.stats.duplicate_acks, 1);
        assert_eq!(ctx.stats.new_acks, 1);
    }

    #[test]
    fn ack_beyond_next_seq_ignored() {
        let (mut s, mut ctx) = setup(2);
        s.on_ack(&mut ctx, &Packet::ack(0, 5));
        assert_eq!(s.window().base(), 0);
        assert_eq!(ctx.stats.duplicate_acks, 1);
    }

    #[test]
    fn corrupted_ack_ignored() {
        let (mut s, mut ctx) = setup(1);
        let mut ack = Packet::ack(0, 0);
        ack.acknum = 999_999;
        s.on_ack(&mut ctx, &ack);
        assert_eq!(s.window().outstanding(), 1);
        assert_eq!(ctx.stats.corrupted_acks, 1);
        assert_eq!(ctx.stats.acks_received, 0);
    }

    #[test]
    fn timeout_resends_whole_window_in_order() {
        let (mut s, mut ctx) = setup(3);
        ctx.take();
        ctx.expire(Role::Sender);

        s.on_timeout(&mut ctx);
        let effects = ctx.take();
        let resent: Vec<i32> = effects
            .iter()
            .filter_map(|e| match e {
                Effect::Sent(Role::Sender, p) => Some(p.seqnum),
                _ => None,
            })
            .collect();
        assert_eq!(resent, vec![0, 1, 2]);
        assert!(matches!(effects.last(), Some(Effect::TimerStarted(Role::Sender, _))));
        assert_eq!(ctx.stats.packets_resent, 3);
        assert_eq!(s.window().entry(1).map(|e| e.tx_count), Some(2));
    }

    #[test]
    fn ack_window_straddling_ring_boundary() {
        let (mut s, mut ctx) = setup(0);
        // Advance base to 10.
        for i in 0..10u8 {
            s.submit(&mut ctx, Message::from_bytes(&[i]));
            s.on_ack(&mut ctx, &Packet::ack(0, i32::from(i)));
        }
        assert_eq!(s.window().base(), 10);
        for i in 0..4u8 {
            s.submit(&mut ctx, Message::from_bytes(&[i]));
        }
        assert_eq!(s.window().next_seq(), 2);

        s.on_ack(&mut ctx, &Packet::ack(0, 0));
        assert_eq!(s.window().base(), 1);
        assert_eq!(s.window().outstanding(), 1);
    }
}
