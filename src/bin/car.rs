//! Car unit entry point.
//!
//! Boots the NVS-backed secret vault and the board-link UART, then runs the
//! responder loop forever: wait for UNLOCK, answer it, and on a grant wait
//! for the follow-up START. Disclosed secrets go out raw on the host UART.

use anyhow::Result;
use log::{info, warn};

use esp_idf_hal::delay::TickType;
use esp_idf_hal::gpio::AnyIOPin;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::uart::{UartDriver, config::Config as UartConfig};
use esp_idf_hal::units::Hertz;

use keyfob::adapters::nvs::NvsStorage;
use keyfob::adapters::uart::BoardLink;
use keyfob::adapters::vault::NvsVault;
use keyfob::car::Car;
use keyfob::error::Error;
use keyfob::link::Framer;
use keyfob::ports::HostPort;
use keyfob::secrets;

const BAUD: u32 = 115_200;
const HOST_WRITE_TIMEOUT_MS: u64 = 500;

/// Host disclosure channel: raw bytes out on the host-facing UART.
/// Disclosure has no reply path, so write failures are only logged.
struct UartHost<'d> {
    uart: UartDriver<'d>,
}

impl HostPort for UartHost<'_> {
    fn disclose(&mut self, data: &[u8]) {
        if self.uart.write(data).is_err() {
            warn!("host: disclosure write failed");
            return;
        }
        let _ = self
            .uart
            .wait_tx_done(TickType::new_millis(HOST_WRITE_TIMEOUT_MS).ticks());
    }
}

fn main() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("keyfob car v{}", env!("CARGO_PKG_VERSION"));

    let peripherals = Peripherals::take()?;
    let uart_config = UartConfig::new().baudrate(Hertz(BAUD));

    // Board link to the fob.
    let board_uart = UartDriver::new(
        peripherals.uart1,
        peripherals.pins.gpio17,
        peripherals.pins.gpio18,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &uart_config,
    )?;
    let mut link = Framer::new(BoardLink::new(board_uart));

    // Host channel for secret disclosure.
    let host_uart = UartDriver::new(
        peripherals.uart0,
        peripherals.pins.gpio43,
        peripherals.pins.gpio44,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &uart_config,
    )?;
    let mut host = UartHost { uart: host_uart };

    let storage = NvsStorage::new().map_err(Error::Storage)?;
    let vault = NvsVault::new(storage);
    let car = Car::new(secrets::car_secrets());

    info!("car: responder ready");
    loop {
        match car.step(&mut link, &vault, &mut host) {
            Ok(()) => {}
            // An expired wait is the idle state, not a fault.
            Err(Error::Link(_)) => {}
            Err(e) => warn!("car: responder cycle failed: {e}"),
        }
    }
}
