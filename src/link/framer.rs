//! Typed send/receive on top of a [`Transport`].
//!
//! The framer provides the three primitives the device loops are built on:
//! `send`, `receive`, and the reference design's "receive until a specific
//! type arrives" wait. Retry policy, credential checks, and timeouts all
//! live elsewhere — the framer only frames.

use log::debug;

use super::codec::{FrameDecoder, encode_frame};
use super::transport::Transport;
use super::{HEADER_SIZE, MAX_PAYLOAD, Message, MsgKind};
use crate::error::LinkError;

/// Messages decoded but not yet handed to the caller. More than one frame
/// can arrive in a single transport read; the overflow is bounded because
/// the peer only ever has one exchange in flight.
const RX_QUEUE: usize = 4;

/// Framed, typed message channel over a byte transport.
pub struct Framer<T: Transport> {
    transport: T,
    decoder: FrameDecoder,
    queue: heapless::Deque<Message, RX_QUEUE>,
}

impl<T: Transport> Framer<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            decoder: FrameDecoder::new(),
            queue: heapless::Deque::new(),
        }
    }

    /// Access the underlying transport (adapter-level configuration).
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Send one framed message.
    ///
    /// The payload must fit the one-byte length field; a short write to the
    /// transport is a fatal transport error, not a retry condition.
    pub fn send(&mut self, kind: MsgKind, payload: &[u8]) -> Result<(), LinkError> {
        let mut frame = [0u8; HEADER_SIZE + MAX_PAYLOAD];
        let total = encode_frame(kind, payload, &mut frame).ok_or(LinkError::Oversize)?;

        let written = self
            .transport
            .write(&frame[..total])
            .map_err(|_| LinkError::Transport)?;
        if written != total {
            return Err(LinkError::ShortWrite);
        }
        self.transport.flush().map_err(|_| LinkError::Transport)
    }

    /// Block until one complete message has been read.
    ///
    /// A transport failure (or a channel that stops yielding bytes) is an
    /// error condition treated as "no message"; the caller must not act on
    /// a partially received frame.
    pub fn receive(&mut self) -> Result<Message, LinkError> {
        if let Some(msg) = self.queue.pop_front() {
            return Ok(msg);
        }

        let mut buf = [0u8; 32];
        loop {
            let n = self
                .transport
                .read(&mut buf)
                .map_err(|_| LinkError::Transport)?;
            if n == 0 {
                return Err(LinkError::Transport);
            }

            let mut offset = 0;
            while offset < n {
                let (used, msg) = self.decoder.feed(&buf[offset..n]);
                offset += used;
                if let Some(msg) = msg {
                    if self.queue.push_back(msg).is_err() {
                        // Queue full: the peer is violating the one-exchange
                        // protocol. Drop the oldest, keep the newest.
                        let _ = self.queue.pop_front();
                        debug!("link: rx queue overflow, dropping oldest message");
                    }
                }
            }

            if let Some(msg) = self.queue.pop_front() {
                return Ok(msg);
            }
        }
    }

    /// Receive messages, discarding any whose kind does not match, until a
    /// message of `kind` arrives.
    ///
    /// This is an unbounded wait: bounding it is the transport adapter's
    /// job (its read may expire and surface an error, which propagates out
    /// of here as `LinkError::Transport`).
    pub fn receive_by_type(&mut self, kind: MsgKind) -> Result<Message, LinkError> {
        loop {
            let msg = self.receive()?;
            if msg.kind == kind {
                return Ok(msg);
            }
            debug!(
                "link: discarding {:?} while waiting for {:?}",
                msg.kind, kind
            );
        }
    }
}
