//! Frame codec for the board link.
//!
//! Wire format:
//! ```text
//! ┌──────────┬────────────┬──────────────────┐
//! │ Kind (1B)│ Length (1B)│ Payload (N bytes)│
//! └──────────┴────────────┴──────────────────┘
//! ```
//!
//! The decoder accumulates incoming bytes and yields complete messages.
//! This handles partial reads gracefully — a single `Transport::read` may
//! return part of the header, part of the payload, or several frames
//! concatenated. A header carrying an unknown kind tag or an out-of-range
//! length is dropped and the decoder resynchronises on the following bytes;
//! malformed input never produces a message and never stops the stream.

use super::{HEADER_SIZE, MAX_PAYLOAD, Message, MsgKind};

/// Decoder state machine.
enum DecoderState {
    /// Scanning for a byte that is a valid kind tag.
    AwaitKind,
    /// Kind accepted, waiting for the length byte.
    AwaitLength { kind: MsgKind },
    /// Header accepted, reading payload.
    ReadingPayload {
        kind: MsgKind,
        expected: usize,
        collected: usize,
    },
}

/// Streaming frame decoder.
pub struct FrameDecoder {
    state: DecoderState,
    payload_buf: [u8; MAX_PAYLOAD],
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            state: DecoderState::AwaitKind,
            payload_buf: [0; MAX_PAYLOAD],
        }
    }

    /// Feed bytes into the decoder.
    ///
    /// Returns the number of bytes consumed and, if those bytes completed a
    /// frame, the decoded message. Callers must re-feed any unconsumed tail
    /// (the decoder stops at the first complete frame so that back-to-back
    /// frames in one read are not lost).
    ///
    /// Resynchronisation is byte-wise: junk before a frame is skipped one
    /// byte at a time until a valid kind tag appears, so odd-length garbage
    /// cannot shift the frame boundary.
    pub fn feed(&mut self, data: &[u8]) -> (usize, Option<Message>) {
        let mut offset = 0;

        while offset < data.len() {
            match &mut self.state {
                DecoderState::AwaitKind => {
                    if let Some(kind) = MsgKind::from_tag(data[offset]) {
                        self.state = DecoderState::AwaitLength { kind };
                    }
                    offset += 1;
                }

                DecoderState::AwaitLength { kind } => {
                    let expected = data[offset] as usize;
                    offset += 1;
                    if (1..=MAX_PAYLOAD).contains(&expected) {
                        self.state = DecoderState::ReadingPayload {
                            kind: *kind,
                            expected,
                            collected: 0,
                        };
                    } else {
                        // Out-of-range length — drop the header and resync.
                        self.state = DecoderState::AwaitKind;
                    }
                }

                DecoderState::ReadingPayload {
                    kind,
                    expected,
                    collected,
                } => {
                    let needed = *expected - *collected;
                    let to_copy = needed.min(data.len() - offset);

                    self.payload_buf[*collected..*collected + to_copy]
                        .copy_from_slice(&data[offset..offset + to_copy]);

                    *collected += to_copy;
                    offset += to_copy;

                    if *collected == *expected {
                        let kind = *kind;
                        let len = *expected;
                        self.state = DecoderState::AwaitKind;

                        let mut payload = heapless::Vec::new();
                        // Length already bounded by MAX_PAYLOAD above.
                        payload.extend_from_slice(&self.payload_buf[..len]).ok();
                        return (offset, Some(Message { kind, payload }));
                    }
                }
            }
        }

        (offset, None) // No complete frame yet.
    }

    /// Reset decoder state (e.g. after a transport reconnect).
    pub fn reset(&mut self) {
        self.state = DecoderState::AwaitKind;
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode a message into a framed byte sequence.
///
/// Writes `[kind][len][payload]` into `out_buf`. Returns the total number
/// of bytes written, or `None` if the payload exceeds the format's budget
/// or `out_buf` is too small.
pub fn encode_frame(kind: MsgKind, payload: &[u8], out_buf: &mut [u8]) -> Option<usize> {
    let total = HEADER_SIZE + payload.len();
    if payload.is_empty() || payload.len() > MAX_PAYLOAD || total > out_buf.len() {
        return None;
    }

    out_buf[0] = kind.tag();
    out_buf[1] = payload.len() as u8;
    out_buf[HEADER_SIZE..total].copy_from_slice(payload);

    Some(total)
}


#[cfg(all(test, not(target_os = "espidf")))]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_kind() -> impl Strategy<Value = MsgKind> {
        prop_oneof![
            Just(MsgKind::Ack),
            Just(MsgKind::Pair),
            Just(MsgKind::Unlock),
            Just(MsgKind::EnableFeature),
            Just(MsgKind::Start),
        ]
    }

    proptest! {
        #[test]
        fn encode_decode_roundtrip(
            kind in arb_kind(),
            payload in proptest::collection::vec(any::<u8>(), 1..=MAX_PAYLOAD),
        ) {
            let mut buf = [0u8; HEADER_SIZE + MAX_PAYLOAD];
            let n = encode_frame(kind, &payload, &mut buf).unwrap();

            let mut dec = FrameDecoder::new();
            let (used, msg) = dec.feed(&buf[..n]);
            let msg = msg.unwrap();

            prop_assert_eq!(used, n);
            prop_assert_eq!(msg.kind, kind);
            prop_assert_eq!(msg.payload.as_slice(), payload.as_slice());
        }

        #[test]
        fn roundtrip_survives_arbitrary_chunking(
            kind in arb_kind(),
            payload in proptest::collection::vec(any::<u8>(), 1..=MAX_PAYLOAD),
            split in 1usize..=MAX_PAYLOAD + 1,
        ) {
            let mut buf = [0u8; HEADER_SIZE + MAX_PAYLOAD];
            let n = encode_frame(kind, &payload, &mut buf).unwrap();

            let mut dec = FrameDecoder::new();
            let mut out = None;
            for chunk in buf[..n].chunks(split) {
                let (used, msg) = dec.feed(chunk);
                prop_assert_eq!(used, chunk.len());
                if msg.is_some() {
                    out = msg;
                }
            }
            let msg = out.unwrap();
            prop_assert_eq!(msg.kind, kind);
            prop_assert_eq!(msg.payload.as_slice(), payload.as_slice());
        }
    }
}
