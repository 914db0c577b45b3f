//! Transport abstraction — any byte-oriented channel between the boards.
//!
//! Concrete implementations:
//! - UART board link (ESP32-S3, see `adapters::uart`)
//! - in-memory loopback / pipe channels (host tests)
//!
//! The framer is generic over `Transport`, so swapping the physical link
//! requires zero changes to the protocol logic.
//!
//! The protocol itself has no timeouts: `receive_by_type` waits as long as
//! the transport keeps yielding bytes. Bounded waiting is an **adapter**
//! concern — an implementation may cap its internal wait and surface expiry
//! through its `Error` type, which the framer reports as "no message"
//! without changing protocol semantics.

/// Byte-oriented transport channel.
pub trait Transport {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Read up to `buf.len()` bytes into `buf`, blocking until at least one
    /// byte is available. Returns the number of bytes read; `Ok(0)` means
    /// the channel yielded no data (closed or drained) and is treated by
    /// callers the same as an error.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write `data` to the transport.
    /// Returns the number of bytes actually written.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Flush any buffered output.
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// A null transport that discards all writes and never yields data.
/// Useful as a default when no peer is connected.
pub struct NullTransport;

impl Transport for NullTransport {
    type Error = ();

    fn read(&mut self, _buf: &mut [u8]) -> Result<usize, ()> {
        Ok(0)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, ()> {
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), ()> {
        Ok(())
    }
}
