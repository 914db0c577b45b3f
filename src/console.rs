//! Operator command reader for the fob's host channel.
//!
//! The host side speaks a line protocol: a command word terminated by CR,
//! LF, or NUL. Bytes are pushed in one at a time as they arrive from the
//! UART; the reader accumulates until a terminator and then matches the
//! whole word. Unknown words and overlong lines are discarded whole, never
//! partially interpreted.

use log::warn;

/// Longest accepted command word plus slack.
const LINE_CAP: usize = 16;

/// A recognised operator command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorCommand {
    /// Enable an optional feature; the binary request record follows.
    Enable,
    /// Start a pairing exchange (role depends on the fob's paired state).
    Pair,
}

/// Incremental line accumulator. Feed it bytes; it yields a command when a
/// terminator completes a recognised word.
pub struct CommandReader {
    buf: heapless::Vec<u8, LINE_CAP>,
    overflow: bool,
}

impl CommandReader {
    pub const fn new() -> Self {
        Self {
            buf: heapless::Vec::new(),
            overflow: false,
        }
    }

    /// Push one received byte. Returns a command when one completes.
    pub fn push(&mut self, byte: u8) -> Option<OperatorCommand> {
        if !matches!(byte, b'\r' | b'\n' | 0) {
            if self.buf.push(byte).is_err() {
                self.overflow = true;
            }
            return None;
        }

        let overflowed = core::mem::replace(&mut self.overflow, false);
        let line = core::mem::take(&mut self.buf);
        if overflowed {
            warn!("console: line too long, discarded");
            return None;
        }

        match line.as_slice() {
            b"enable" => Some(OperatorCommand::Enable),
            b"pair" => Some(OperatorCommand::Pair),
            b"" => None, // bare terminator (e.g. the LF of a CRLF pair)
            other => {
                warn!(
                    "console: unknown command {:?}",
                    core::str::from_utf8(other).unwrap_or("<non-utf8>")
                );
                None
            }
        }
    }
}

impl Default for CommandReader {
    fn default() -> Self {
        Self::new()
    }
}
