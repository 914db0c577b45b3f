//! Board link — the framed message layer between the car and fob units.
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌─────────────────────────┐
//! │  Transport   │──▶│    Codec     │──▶│  Framer (typed recv /   │
//! │  (trait)     │   │  (framing)   │   │  receive-by-type wait)  │
//! └──────────────┘   └──────────────┘   └─────────────────────────┘
//! ```
//!
//! The framer performs no retries and owns no policy: credential checks and
//! state transitions live in [`crate::fob`] and [`crate::car`].

pub mod codec;
pub mod framer;
pub mod transport;

pub use framer::Framer;
pub use transport::Transport;

/// Largest payload any message kind carries (the provisioned secret /
/// password buffer size). Bounds every receive-side copy.
pub const MAX_PAYLOAD: usize = 64;

/// Frame header size: kind tag (1 byte) + payload length (1 byte).
pub const HEADER_SIZE: usize = 2;

// ---------------------------------------------------------------------------
// Message kinds
// ---------------------------------------------------------------------------

/// Wire tag for each message type.
///
/// `EnableFeature` is carried on the operator channel only and never
/// crosses the board link, but shares the frame format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MsgKind {
    Ack = 0x54,
    Pair = 0x55,
    Unlock = 0x56,
    EnableFeature = 0x57,
    Start = 0x58,
}

impl MsgKind {
    /// The raw wire tag.
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Parse a wire tag. Unknown tags are malformed input and yield `None`.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x54 => Some(Self::Ack),
            0x55 => Some(Self::Pair),
            0x56 => Some(Self::Unlock),
            0x57 => Some(Self::EnableFeature),
            0x58 => Some(Self::Start),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A complete framed message. Constructed immediately before a send or
/// populated by a receive; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: MsgKind,
    pub payload: heapless::Vec<u8, MAX_PAYLOAD>,
}
