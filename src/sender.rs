//! Send-side interface.
//!
//! A [`Sender`] reacts to three events: a message from the upper layer, an
//! acknowledgment from the channel, and expiry of its retransmission timer.
//! Each handler runs to completion and performs its effects through the
//! [`Context`] it is handed.  Two strategies implement it:
//!
//! - [`GbnSender`] — cumulative acknowledgment, resend the whole window.
//! - [`SrSender`]  — per-packet acknowledgment, resend the oldest gap.
//!
//! Both keep their state in a [`SendWindow`]; use [`new_sender`] to pick one
//! from a validated [`ArqConfig`].

use crate::config::{ArqConfig, Policy};
use crate::context::{Context, Role};
use crate::gbn_sender::GbnSender;
use crate::packet::{Message, Packet};
use crate::send_window::SendWindow;
use crate::sr_sender::SrSender;

/// Sending endpoint of a one-way ARQ session.
pub trait Sender {
    /// Reset to the session-start state.  Called once before anything else.
    fn init(&mut self);

    /// Offer a message.  Returns `false` (and counts a window-full event)
    /// when the window has no room; the message is then dropped.
    fn submit(&mut self, ctx: &mut dyn Context, message: Message) -> bool;

    /// Handle a packet arriving from the receiver.
    fn on_ack(&mut self, ctx: &mut dyn Context, packet: &Packet);

    /// Handle expiry of the retransmission timer.
    fn on_timeout(&mut self, ctx: &mut dyn Context);

    /// Read-only view of the window, for inspection and tests.
    fn window(&self) -> &SendWindow;

    fn policy(&self) -> Policy;
}

/// Build the sender for `config.policy`, already initialised.
pub fn new_sender(config: &ArqConfig) -> Box<dyn Sender> {
    let mut sender: Box<dyn Sender> = match config.policy {
        Policy::GoBackN => Box::new(GbnSender::new(config)),
        Policy::SelectiveRepeat => Box::new(SrSender::new(config)),
    };
    sender.init();
    sender
}

/// Admission shared by both strategies: window check, packet construction,
/// first transmission, and arming the timer for the first outstanding packet.
pub(crate) fn admit(
    window: &mut SendWindow,
    ctx: &mut dyn Context,
    config: &ArqConfig,
    message: Message,
) -> bool {
    let tag = config.policy.tag();
    if window.is_full() {
        log::debug!("[{tag}] window full ({}), message dropped", window.outstanding());
        ctx.stats().window_full += 1;
        return false;
    }

    let was_idle = window.is_empty();
    let packet = window.admit(&message);
    log::debug!(
        "[{tag}] → DATA seq={} in_flight={}",
        packet.seqnum,
        window.outstanding()
    );
    ctx.stats().packets_sent += 1;
    ctx.to_channel(Role::Sender, packet);

    if was_idle {
        ctx.start_timer(Role::Sender, config.rtt);
    }
    true
}
