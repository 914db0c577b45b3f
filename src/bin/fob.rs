//! Fob unit entry point.
//!
//! Single blocking loop over three input sources:
//!   - the host UART, carrying operator commands (`enable`, `pair`) and
//!     their follow-up bytes,
//!   - the unlock button,
//!   - and, during pairing, the board link to the peer.
//!
//! Each operation runs to completion before the loop polls again; a fob
//! that is mid-pairing does not respond to the button.

use anyhow::Result;
use log::{info, warn};

use esp_idf_hal::delay::TickType;
use esp_idf_hal::gpio::{AnyIOPin, PinDriver, Pull};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::uart::{UartDriver, config::Config as UartConfig};
use esp_idf_hal::units::Hertz;

use keyfob::adapters::nvs::NvsStorage;
use keyfob::adapters::uart::BoardLink;
use keyfob::console::{CommandReader, OperatorCommand};
use keyfob::error::Error;
use keyfob::fob::Fob;
use keyfob::link::Framer;
use keyfob::proto::{ENABLE_LEN, EnableRequest, PIN_LEN};
use keyfob::secrets;

const BAUD: u32 = 115_200;
/// Host poll granularity; also the button debounce interval.
const POLL_MS: u64 = 10;
/// How long to wait for the operator to finish a binary follow-up.
const ENTRY_TIMEOUT_MS: u64 = 10_000;
/// How long the responder listens for a PAIR from the peer.
const PAIR_WAIT_MS: u32 = 30_000;

/// Collect exactly `buf.len()` operator bytes or give up.
fn read_exact(uart: &mut UartDriver<'_>, buf: &mut [u8]) -> bool {
    let mut got = 0;
    let mut waited = 0u64;
    while got < buf.len() {
        match uart.read(&mut buf[got..], TickType::new_millis(POLL_MS).ticks()) {
            Ok(0) | Err(_) => {
                waited += POLL_MS;
                if waited >= ENTRY_TIMEOUT_MS {
                    warn!("fob: operator entry timed out");
                    return false;
                }
            }
            Ok(n) => got += n,
        }
    }
    true
}

fn handle_enable(fob: &mut Fob, storage: &mut NvsStorage, host: &mut UartDriver<'_>) {
    let mut raw = [0u8; ENABLE_LEN];
    if !read_exact(host, &mut raw) {
        return;
    }
    let request = match EnableRequest::decode(&raw) {
        Ok(r) => r,
        Err(e) => {
            warn!("fob: malformed enable request ({e})");
            return;
        }
    };
    match fob.enable_feature(storage, &request) {
        Ok(outcome) => info!("fob: enable -> {outcome:?}"),
        Err(e) => warn!("fob: enable failed: {e}"),
    }
}

fn handle_pair(
    fob: &mut Fob,
    storage: &mut NvsStorage,
    link: &mut Framer<BoardLink<'_>>,
    host: &mut UartDriver<'_>,
) {
    if fob.is_paired() {
        let _ = host.write(b"Enter pin: ");
        let mut pin = [0u8; PIN_LEN];
        if !read_exact(host, &mut pin) {
            return;
        }
        match fob.pair_as_initiator(link, &pin) {
            Ok(outcome) => info!("fob: pair (initiator) -> {outcome:?}"),
            Err(e) => warn!("fob: pair send failed: {e}"),
        }
    } else {
        info!("fob: unpaired, listening for credentials");
        link.transport_mut().set_read_timeout_ms(PAIR_WAIT_MS);
        match fob.pair_as_responder(link, storage) {
            Ok(outcome) => info!("fob: pair (responder) -> {outcome:?}"),
            Err(Error::Link(_)) => warn!("fob: no PAIR received, giving up"),
            Err(e) => warn!("fob: pairing failed: {e}"),
        }
        link.transport_mut().set_read_timeout_ms(2_000);
    }
}

fn main() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("keyfob fob v{}", env!("CARGO_PKG_VERSION"));

    let peripherals = Peripherals::take()?;
    let uart_config = UartConfig::new().baudrate(Hertz(BAUD));

    let board_uart = UartDriver::new(
        peripherals.uart1,
        peripherals.pins.gpio17,
        peripherals.pins.gpio18,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &uart_config,
    )?;
    let mut link = Framer::new(BoardLink::new(board_uart));

    let mut host = UartDriver::new(
        peripherals.uart0,
        peripherals.pins.gpio43,
        peripherals.pins.gpio44,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &uart_config,
    )?;

    let mut button = PinDriver::input(peripherals.pins.gpio0)?;
    button.set_pull(Pull::Up)?;

    let mut storage = NvsStorage::new().map_err(Error::Storage)?;
    let mut fob = Fob::boot(&mut storage, secrets::factory_provisioning().as_ref())
        .map_err(|e| anyhow::anyhow!("boot failed: {e}"))?;
    info!(
        "fob: ready ({})",
        if fob.is_paired() { "paired" } else { "unpaired" }
    );

    let mut reader = CommandReader::new();
    let mut button_was_down = false;

    loop {
        // Operator channel.
        let mut byte = [0u8; 1];
        if let Ok(1) = host.read(&mut byte, TickType::new_millis(POLL_MS).ticks()) {
            match reader.push(byte[0]) {
                Some(OperatorCommand::Enable) => handle_enable(&mut fob, &mut storage, &mut host),
                Some(OperatorCommand::Pair) => {
                    handle_pair(&mut fob, &mut storage, &mut link, &mut host)
                }
                None => {}
            }
        }

        // Unlock button, active low, edge-triggered on press.
        let down = button.is_low();
        if down && !button_was_down {
            match fob.unlock_and_start(&mut link) {
                Ok(Some(ack)) => info!("fob: unlock -> {ack:?}"),
                Ok(None) => info!("fob: not paired, button ignored"),
                Err(e) => warn!("fob: unlock exchange failed: {e}"),
            }
        }
        button_was_down = down;
    }
}
