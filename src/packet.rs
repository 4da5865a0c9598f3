//! Packet and message definitions, plus corruption detection.
//!
//! Every unit exchanged between the two roles is a [`Packet`]: three integer
//! header fields and a fixed 20-byte payload.  This module is responsible for:
//! - Building data and acknowledgment packets with a stamped checksum.
//! - Computing the checksum ([`compute_checksum`]).
//! - Detecting corruption ([`is_corrupted`]).
//!
//! No I/O happens here — this is pure data.
//!
//! # Layout
//!
//! ```text
//! +----------+----------+----------+------------------------------+
//! |  seqnum  |  acknum  | checksum |        payload (20 bytes)     |
//! +----------+----------+----------+------------------------------+
//! ```
//!
//! Header fields are `i32` rather than sequence numbers proper: `acknum`
//! carries [`NOT_IN_USE`] on data packets, and the channel is free to scribble
//! arbitrary values over either field.  Consumers validate them with
//! [`crate::seq::SeqSpace::index`] before indexing anything.

/// Length of every payload and message, in bytes.
pub const PAYLOAD_LEN: usize = 20;

/// Filler for header fields that carry no meaning in this packet.
pub const NOT_IN_USE: i32 = -1;

/// Fill byte used for the payload of acknowledgment packets.
const ACK_FILL: u8 = b'0';

/// A fixed-size payload.
pub type Payload = [u8; PAYLOAD_LEN];

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A message handed down by the upper layer at the sending side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    pub data: Payload,
}

impl Message {
    pub fn new(data: Payload) -> Self {
        Self { data }
    }

    /// Build a message from arbitrary bytes.
    ///
    /// Input shorter than [`PAYLOAD_LEN`] is zero-padded; longer input is
    /// truncated.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut data = [0u8; PAYLOAD_LEN];
        let n = bytes.len().min(PAYLOAD_LEN);
        data[..n].copy_from_slice(&bytes[..n]);
        Self { data }
    }
}

impl From<Payload> for Message {
    fn from(data: Payload) -> Self {
        Self::new(data)
    }
}

// ---------------------------------------------------------------------------
// Packet
// ---------------------------------------------------------------------------

/// A packet on the simulated channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet {
    /// Sequence number of a data packet; `0` on GBN acknowledgments, and the
    /// echoed number on SR rejections.
    pub seqnum: i32,
    /// Acknowledged sequence number, or [`NOT_IN_USE`].
    pub acknum: i32,
    /// Sum over the other fields, see [`compute_checksum`].
    pub checksum: i32,
    pub payload: Payload,
}

impl Packet {
    /// Build a packet and stamp its checksum.
    pub fn new(seqnum: i32, acknum: i32, payload: Payload) -> Self {
        let mut packet = Self {
            seqnum,
            acknum,
            checksum: 0,
            payload,
        };
        packet.checksum = compute_checksum(&packet);
        packet
    }

    /// Data packet carrying `message` under sequence number `seqnum`.
    pub fn data(seqnum: u32, message: &Message) -> Self {
        Self::new(seqnum as i32, NOT_IN_USE, message.data)
    }

    /// Acknowledgment packet.  The payload is filled with ASCII `'0'`.
    pub fn ack(seqnum: i32, acknum: i32) -> Self {
        Self::new(seqnum, acknum, [ACK_FILL; PAYLOAD_LEN])
    }

    /// Shorthand for [`is_corrupted`].
    pub fn is_corrupted(&self) -> bool {
        is_corrupted(self)
    }
}

/// Checksum over a packet: `seqnum + acknum + Σ payload bytes`.
///
/// Payload bytes are summed as unsigned values.  The stored `checksum` field
/// itself is ignored.  Arithmetic wraps so scribbled header values cannot
/// overflow.
pub fn compute_checksum(packet: &Packet) -> i32 {
    packet
        .payload
        .iter()
        .fold(packet.seqnum.wrapping_add(packet.acknum), |sum, &b| {
            sum.wrapping_add(i32::from(b))
        })
}

/// `true` when the stored checksum disagrees with a fresh computation.
pub fn is_corrupted(packet: &Packet) -> bool {
    packet.checksum != compute_checksum(packet)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Packet {
        Packet::data(3, &Message::from_bytes(b"abcdefghijklmnopqrst"))
    }

    #[test]
    fn fresh_packet_is_not_corrupted() {
        assert!(!sample().is_corrupted());
        assert!(!Packet::ack(0, 7).is_corrupted());
    }

    #[test]
    fn checksum_is_header_plus_payload_sum() {
        let pkt = Packet::new(2, 5, [1u8; PAYLOAD_LEN]);
        assert_eq!(pkt.checksum, 2 + 5 + PAYLOAD_LEN as i32);
    }

    #[test]
    fn data_packet_leaves_acknum_unused() {
        let pkt = sample();
        assert_eq!(pkt.seqnum, 3);
        assert_eq!(pkt.acknum, NOT_IN_USE);
        assert_eq!(&pkt.payload, b"abcdefghijklmnopqrst");
    }

    #[test]
    fn ack_payload_is_ascii_zero() {
        let pkt = Packet::ack(0, 4);
        assert!(pkt.payload.iter().all(|&b| b == b'0'));
        assert_eq!(pkt.acknum, 4);
    }

    #[test]
    fn payload_overwrite_detected() {
        let mut pkt = sample();
        pkt.payload[0] = b'Z';
        assert!(pkt.is_corrupted());
    }

    #[test]
    fn seqnum_overwrite_detected() {
        let mut pkt = sample();
        pkt.seqnum = 999_999;
        assert!(pkt.is_corrupted());
    }

    #[test]
    fn acknum_overwrite_detected() {
        let mut pkt = Packet::ack(0, 1);
        pkt.acknum = 999_999;
        assert!(pkt.is_corrupted());
    }

    #[test]
    fn single_bit_flips_detected() {
        let clean = sample();
        for byte in 0..PAYLOAD_LEN {
            for bit in 0..8 {
                let mut pkt = clean;
                pkt.payload[byte] ^= 1 << bit;
                assert!(pkt.is_corrupted(), "flip of bit {bit} in byte {byte} missed");
            }
        }
    }

    #[test]
    fn scribbled_headers_do_not_overflow() {
        let pkt = Packet::new(i32::MAX, i32::MAX, [0xff; PAYLOAD_LEN]);
        assert!(!pkt.is_corrupted());
    }

    #[test]
    fn message_from_short_bytes_is_zero_padded() {
        let msg = Message::from_bytes(b"hi");
        assert_eq!(&msg.data[..2], b"hi");
        assert!(msg.data[2..].iter().all(|&b| b == 0));
    }

    #[test]
    fn message_from_long_bytes_is_truncated() {
        let msg = Message::from_bytes(&[7u8; 64]);
        assert_eq!(msg.data, [7u8; PAYLOAD_LEN]);
    }
}
