//! Board-link transport over the ESP32 UART driver.
//!
//! Wraps an [`UartDriver`] as the byte [`Transport`] the framer runs on.
//! The read timeout is the one place the otherwise-unbounded protocol waits
//! are bounded: an expired read yields zero bytes, which the framer treats
//! as "no message" and the device loop recovers from.

use esp_idf_hal::delay::TickType;
use esp_idf_hal::uart::UartDriver;
use esp_idf_svc::sys::EspError;

use crate::link::Transport;

/// Default read timeout for one blocking wait on the peer.
const DEFAULT_READ_TIMEOUT_MS: u32 = 2_000;

pub struct BoardLink<'d> {
    uart: UartDriver<'d>,
    read_timeout_ms: u32,
}

impl<'d> BoardLink<'d> {
    pub fn new(uart: UartDriver<'d>) -> Self {
        Self {
            uart,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }

    /// Bound (or effectively unbound, with a large value) the per-read wait.
    pub fn set_read_timeout_ms(&mut self, ms: u32) {
        self.read_timeout_ms = ms;
    }
}

impl Transport for BoardLink<'_> {
    type Error = EspError;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, EspError> {
        // Returns Ok(0) when the timeout expires with nothing received.
        self.uart
            .read(buf, TickType::new_millis(self.read_timeout_ms as u64).ticks())
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, EspError> {
        self.uart.write(data)
    }

    fn flush(&mut self) -> Result<(), EspError> {
        self.uart
            .wait_tx_done(TickType::new_millis(self.read_timeout_ms as u64).ticks())
    }
}
