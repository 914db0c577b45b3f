//! Shared mock hardware for the integration tests.
//!
//! `duplex()` builds a pair of byte pipes standing in for the board-link
//! UART: what one end writes, the other reads, with a bounded blocking
//! wait so a missing peer surfaces as a transport error instead of a hang.

use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use keyfob::adapters::nvs::NvsStorage;
use keyfob::adapters::vault::NvsVault;
use keyfob::link::Transport;
use keyfob::ports::{HostPort, SECRET_LEN};
use keyfob::proto::ID_LEN;

/// Upper bound on one blocking read; generous for same-process peers.
const READ_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug)]
pub struct PipeClosed;

/// One end of an in-process byte pipe.
pub struct PipeTransport {
    tx: Sender<u8>,
    rx: Receiver<u8>,
}

/// Two connected pipe ends, reads on one side drain writes from the other.
pub fn duplex() -> (PipeTransport, PipeTransport) {
    let (a_tx, b_rx) = mpsc::channel();
    let (b_tx, a_rx) = mpsc::channel();
    (
        PipeTransport { tx: a_tx, rx: a_rx },
        PipeTransport { tx: b_tx, rx: b_rx },
    )
}

impl Transport for PipeTransport {
    type Error = PipeClosed;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, PipeClosed> {
        // Block for the first byte, then drain whatever else is pending.
        buf[0] = self.rx.recv_timeout(READ_TIMEOUT).map_err(|_| PipeClosed)?;
        let mut n = 1;
        while n < buf.len() {
            match self.rx.try_recv() {
                Ok(b) => {
                    buf[n] = b;
                    n += 1;
                }
                Err(_) => break,
            }
        }
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, PipeClosed> {
        for &b in data {
            self.tx.send(b).map_err(|_| PipeClosed)?;
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), PipeClosed> {
        Ok(())
    }
}

/// Records every secret the car discloses, in order.
#[derive(Default)]
pub struct CaptureHost {
    pub disclosures: Vec<Vec<u8>>,
}

impl HostPort for CaptureHost {
    fn disclose(&mut self, data: &[u8]) {
        self.disclosures.push(data.to_vec());
    }
}

pub fn id(s: &[u8]) -> [u8; ID_LEN] {
    let mut out = [0u8; ID_LEN];
    out[..s.len()].copy_from_slice(s);
    out
}

/// A vault with the unlock secret and features 1..=3 provisioned, each blob
/// filled with a distinctive byte so disclosures are attributable.
pub fn provisioned_vault() -> NvsVault<NvsStorage> {
    let mut vault = NvsVault::new(NvsStorage::new().unwrap());
    vault.provision("unlock", &[b'U'; SECRET_LEN]).unwrap();
    for feature_id in 1..=3u8 {
        vault
            .provision(
                keyfob::adapters::vault::feature_key(feature_id).as_str(),
                &[feature_id; SECRET_LEN],
            )
            .unwrap();
    }
    vault
}
