//! Modular arithmetic over a finite ring of sequence numbers.
//!
//! Unlike the 32-bit wrap-around space of a byte stream, the ring here is
//! small (a dozen numbers by default) and every number names one packet.
//! All window tests are phrased as "distance from the window's left edge",
//! which stays correct when a window straddles the wrap point:
//!
//! ```text
//!   base = 10, len = 4, size = 12
//!
//!   0   1   2   3 ...  9  10  11
//!  [x] [x]                [x] [x]     in_window(s) ⇔ distance(10, s) < 4
//! ```

/// A sequence number.  Always `< SeqSpace::size()`.
pub type SeqNum = u32;

/// A ring of `size` sequence numbers, `0..size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeqSpace {
    size: u32,
}

impl SeqSpace {
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn new(size: u32) -> Self {
        assert!(size >= 1, "sequence space must hold at least one number");
        Self { size }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// `s + n` around the ring.
    #[inline]
    pub fn add(&self, s: SeqNum, n: u32) -> SeqNum {
        ((u64::from(s) + u64::from(n)) % u64::from(self.size)) as SeqNum
    }

    /// Successor of `s`.
    #[inline]
    pub fn next(&self, s: SeqNum) -> SeqNum {
        self.add(s, 1)
    }

    /// Predecessor of `s`.
    #[inline]
    pub fn prev(&self, s: SeqNum) -> SeqNum {
        self.add(s, self.size - 1)
    }

    /// Number of steps forward from `from` to reach `to`.
    #[inline]
    pub fn distance(&self, from: SeqNum, to: SeqNum) -> u32 {
        (to + self.size - from) % self.size
    }

    /// `true` when `s` lies in `[base, base + len)` around the ring.
    #[inline]
    pub fn in_window(&self, s: SeqNum, base: SeqNum, len: usize) -> bool {
        (self.distance(base, s) as usize) < len
    }

    /// Validate a raw header field as a sequence number of this ring.
    ///
    /// Returns `None` for [`crate::packet::NOT_IN_USE`] and for anything else
    /// outside `0..size`.
    pub fn index(&self, raw: i32) -> Option<SeqNum> {
        u32::try_from(raw).ok().filter(|&s| s < self.size)
    }

    /// Iterate `[from, to)` around the ring in ascending order.
    pub fn range(&self, from: SeqNum, to: SeqNum) -> impl Iterator<Item = SeqNum> {
        let space = *self;
        (0..self.distance(from, to)).map(move |k| space.add(from, k))
    }
}
