//! Outstanding-packet bookkeeping shared by both sender strategies.
//!
//! [`SendWindow`] owns the left edge, the next number to assign, the count of
//! packets not yet retired, and a fixed arena of one slot per sequence number
//! holding the last packet sent under that number.  It performs no I/O and
//! never touches the timer; the strategies in [`crate::gbn_sender`] and
//! [`crate::sr_sender`] decide what an acknowledgment or a timeout means.
//!
//! # Sequence-number layout
//!
//! ```text
//!   base              next_seq
//!     │                   │
//!  ───┼───────────────────┼─────────────┼──────▶ ring
//!     │ <── outstanding ─▶│ <── room ──▶│
//!     └──────────── window_size ────────┘
//! ```
//!
//! Invariant: `count == distance(base, next_seq) ≤ window_size`.

use crate::config::ArqConfig;
use crate::packet::{Message, Packet};
use crate::seq::{SeqNum, SeqSpace};

/// The last packet sent under one sequence number.
#[derive(Debug, Clone)]
pub struct Entry {
    pub packet: Packet,
    /// Transmissions of this packet, 1 on first send.
    pub tx_count: u32,
    /// Individually acknowledged and not yet slid past.
    pub acked: bool,
}

/// Sender-side window state.
#[derive(Debug)]
pub struct SendWindow {
    seq: SeqSpace,
    window_size: usize,
    base: SeqNum,
    next_seq: SeqNum,
    count: usize,
    slots: Box<[Option<Entry>]>,
}

impl SendWindow {
    pub fn new(config: &ArqConfig) -> Self {
        let seq = config.seq();
        Self {
            seq,
            window_size: config.window_size,
            base: 0,
            next_seq: 0,
            count: 0,
            slots: vec![None; seq.size() as usize].into_boxed_slice(),
        }
    }

    /// Return to the session-start state: everything zero, no marks.
    pub fn reset(&mut self) {
        self.base = 0;
        self.next_seq = 0;
        self.count = 0;
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    pub fn seq(&self) -> SeqSpace {
        self.seq
    }

    /// Oldest unacknowledged sequence number.
    pub fn base(&self) -> SeqNum {
        self.base
    }

    /// Sequence number the next admitted message will receive.
    pub fn next_seq(&self) -> SeqNum {
        self.next_seq
    }

    /// Packets sent but not yet retired.
    pub fn outstanding(&self) -> usize {
        self.count
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn is_full(&self) -> bool {
        self.count >= self.window_size
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// `true` for a number that has been sent and not yet retired.
    pub fn contains(&self, s: SeqNum) -> bool {
        self.seq.in_window(s, self.base, self.count)
    }

    /// `true` for a number in `[base, base + window_size)`, sent or not.
    pub fn in_window(&self, s: SeqNum) -> bool {
        self.seq.in_window(s, self.base, self.window_size)
    }

    pub fn entry(&self, s: SeqNum) -> Option<&Entry> {
        self.slots.get(s as usize).and_then(Option::as_ref)
    }

    pub fn is_acked(&self, s: SeqNum) -> bool {
        self.entry(s).map_or(false, |e| e.acked)
    }

    /// Assign `next_seq` to `message`, record the packet and advance.
    ///
    /// Returns the packet to hand to the channel.
    ///
    /// # Panics
    ///
    /// Panics in debug mode if the window is full.  Check [`is_full`] first.
    ///
    /// [`is_full`]: SendWindow::is_full
    pub fn admit(&mut self, message: &Message) -> Packet {
        debug_assert!(
            !self.is_full(),
            "admit called on a full window ({} / {})",
            self.count,
            self.window_size
        );
        let packet = Packet::data(self.next_seq, message);
        self.slots[self.next_seq as usize] = Some(Entry {
            packet,
            tx_count: 1,
            acked: false,
        });
        self.next_seq = self.seq.next(self.next_seq);
        self.count += 1;
        packet
    }

    /// Mark `s` acknowledged.  Returns `false` if it already was, or if `s`
    /// is not outstanding.
    pub fn mark_acked(&mut self, s: SeqNum) -> bool {
        if !self.contains(s) {
            return false;
        }
        match self.slots[s as usize].as_mut() {
            Some(entry) if !entry.acked => {
                entry.acked = true;
                true
            }
            _ => false,
        }
    }

    /// Advance `base` through the contiguous run of acknowledged numbers,
    /// clearing each mark.  Returns how many packets were retired.
    pub fn slide(&mut self) -> usize {
        let mut retired = 0;
        while self.count > 0 {
            match self.slots[self.base as usize].as_mut() {
                Some(entry) if entry.acked => entry.acked = false,
                _ => break,
            }
            self.base = self.seq.next(self.base);
            self.count -= 1;
            retired += 1;
        }
        retired
    }

    /// Outstanding, unacknowledged sequence numbers from oldest to newest.
    pub fn unacked(&self) -> impl Iterator<Item = SeqNum> + '_ {
        self.seq
            .range(self.base, self.next_seq)
            .filter(move |&s| !self.is_acked(s))
    }

    /// Fetch the stored packet for `s` for retransmission and bump its
    /// transmission count.
    pub fn retransmit(&mut self, s: SeqNum) -> Option<Packet> {
        let entry = self.slots.get_mut(s as usize)?.as_mut()?;
        entry.tx_count += 1;
        Some(entry.packet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Policy;

    fn window() -> SendWindow {
        SendWindow::new(&ArqConfig::new(Policy::GoBackN))
    }

    fn msg(tag: u8) -> Message {
        Message::new([tag; crate::packet::PAYLOAD_LEN])
    }

    #[test]
    fn initial_state() {
        let w = window();
        assert_eq!(w.base(), 0);
        assert_eq!(w.next_seq(), 0);
        assert!(w.is_empty());
        assert!(!w.is_full());
    }

    #[test]
    fn admit_assigns_consecutive_numbers() {
        let mut w = window();
        let p0 = w.admit(&msg(b'a'));
        let p1 = w.admit(&msg(b'b'));
        assert_eq!((p0.seqnum, p1.seqnum), (0, 1));
        assert_eq!(w.next_seq(), 2);
        assert_eq!(w.outstanding(), 2);
        assert!(w.contains(1));
        assert!(!w.contains(2));
        assert!(w.in_window(2));
    }

    #[test]
    fn window_fills_at_window_size() {
        let mut w = window();
        for i in 0..6 {
            w.admit(&msg(i));
        }
        assert!(w.is_full());
    }

    #[test]
    fn slide_stops_at_first_gap() {
        let mut w = window();
        for i in 0..4 {
            w.admit(&msg(i));
        }
        assert!(w.mark_acked(0));
        assert!(w.mark_acked(2));
        assert_eq!(w.slide(), 1);
        assert_eq!(w.base(), 1);
        assert_eq!(w.unacked().collect::<Vec<_>>(), vec![1, 3]);

        assert!(w.mark_acked(1));
        assert_eq!(w.slide(), 2);
        assert_eq!(w.base(), 3);
        assert!(!w.is_acked(2), "marks are cleared as the base slides past");
    }

    #[test]
    fn mark_acked_is_idempotent() {
        let mut w = window();
        w.admit(&msg(0));
        w.admit(&msg(1));
        assert!(w.mark_acked(1));
        assert!(!w.mark_acked(1));
    }

    #[test]
    fn mark_rejects_unsent_numbers() {
        let mut w = window();
        w.admit(&msg(0));
        assert!(!w.mark_acked(3));
        assert_eq!(w.slide(), 0);
    }

    #[test]
    fn slide_never_passes_next_seq() {
        let mut w = window();
        w.admit(&msg(0));
        w.mark_acked(0);
        assert_eq!(w.slide(), 1);
        assert_eq!(w.base(), w.next_seq());
        assert_eq!(w.slide(), 0);
    }

    #[test]
    fn retransmit_bumps_tx_count() {
        let mut w = window();
        let p = w.admit(&msg(9));
        assert_eq!(w.retransmit(0), Some(p));
        assert_eq!(w.entry(0).map(|e| e.tx_count), Some(2));
        assert_eq!(w.retransmit(5), None);
    }

    #[test]
    fn wraps_around_the_ring() {
        let mut w = window();
        for round in 0..4u8 {
            for i in 0..5 {
                w.admit(&msg(round * 10 + i));
            }
            for s in w.seq().range(w.base(), w.next_seq()).collect::<Vec<_>>() {
                w.mark_acked(s);
            }
            assert_eq!(w.slide(), 5);
        }
        assert_eq!(w.base(), 20 % 12);
        assert!(w.is_empty());
    }

    #[test]
    fn reset_clears_everything() {
        let mut w = window();
        w.admit(&msg(0));
        w.mark_acked(0);
        w.reset();
        assert_eq!(w.base(), 0);
        assert_eq!(w.next_seq(), 0);
        assert!(w.is_empty());
        assert!(w.entry(0).is_none());
    }
}
