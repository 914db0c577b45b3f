//! Persistent fob record — layout, canonicalisation, and save.
//!
//! A fob holds exactly one persistent record. Byte layout (37 bytes):
//!
//! ```text
//! ┌────────────┬──────────────────┬──────────────────────────┐
//! │ paired (1B)│ PairingInfo (24B)│ FeatureState (8+1+3 B)   │
//! └────────────┴──────────────────┴──────────────────────────┘
//! ```
//!
//! The paired sentinel is `0x00` (paired) or `0xFF` (unpaired — the erased-
//! flash value). Anything else means storage was never initialised or is
//! corrupt; the loader replaces it with the canonical initial state and
//! persists that before the caller proceeds.
//!
//! The store is the sole writer of the record, called only at state-machine
//! transition boundaries; saves never interleave because each device runs a
//! single blocking loop.

use log::{info, warn};

use crate::error::StorageError;
use crate::ports::StoragePort;
use crate::proto::{FeatureState, PAIR_LEN, PairingInfo, START_LEN};

/// Total record size.
pub const RECORD_LEN: usize = 1 + PAIR_LEN + START_LEN;

const SENTINEL_PAIRED: u8 = 0x00;
const SENTINEL_UNPAIRED: u8 = 0xFF;

const NAMESPACE: &str = "fob";
const KEY: &str = "state";

// ---------------------------------------------------------------------------
// FobRecord
// ---------------------------------------------------------------------------

/// The single persistent record a fob maintains.
///
/// `paired` transitions `false → true` exactly once; `pairing` is immutable
/// once set; `features` is mutated in place after pairing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FobRecord {
    pub paired: bool,
    pub pairing: PairingInfo,
    pub features: FeatureState,
}

impl FobRecord {
    /// The canonical first-boot state: unpaired, empty feature list.
    pub fn initial() -> Self {
        Self {
            paired: false,
            pairing: PairingInfo::zeroed(),
            features: FeatureState::empty([0; 8]),
        }
    }

    fn encode(&self) -> [u8; RECORD_LEN] {
        let mut out = [0u8; RECORD_LEN];
        out[0] = if self.paired {
            SENTINEL_PAIRED
        } else {
            SENTINEL_UNPAIRED
        };
        out[1..1 + PAIR_LEN].copy_from_slice(&self.pairing.encode());
        out[1 + PAIR_LEN..].copy_from_slice(&self.features.encode());
        out
    }

    fn decode(buf: &[u8; RECORD_LEN]) -> Result<Self, StorageError> {
        let paired = match buf[0] {
            SENTINEL_PAIRED => true,
            SENTINEL_UNPAIRED => false,
            _ => return Err(StorageError::Corrupted),
        };
        let pairing =
            PairingInfo::decode(&buf[1..1 + PAIR_LEN]).map_err(|_| StorageError::Corrupted)?;
        let features =
            FeatureState::decode(&buf[1 + PAIR_LEN..]).map_err(|_| StorageError::Corrupted)?;
        Ok(Self {
            paired,
            pairing,
            features,
        })
    }
}

// ---------------------------------------------------------------------------
// Load / save
// ---------------------------------------------------------------------------

/// Read the fob record, canonicalising uninitialised or corrupt storage.
///
/// A missing blob, a wrong-size blob, an unknown paired sentinel, or an
/// out-of-range feature count (erased flash reads `0xFF`) all collapse to
/// the canonical initial state, which is persisted before returning so the
/// next boot reads a well-formed record.
pub fn load_or_init(storage: &mut impl StoragePort) -> Result<FobRecord, StorageError> {
    let mut buf = [0u8; RECORD_LEN];
    match storage.read(NAMESPACE, KEY, &mut buf) {
        Ok(RECORD_LEN) => match FobRecord::decode(&buf) {
            Ok(record) => return Ok(record),
            Err(_) => warn!("store: stored record invalid, re-initialising"),
        },
        Ok(n) => warn!("store: stored record has wrong size ({n} B), re-initialising"),
        Err(StorageError::NotFound) => info!("store: no record found, first boot"),
        Err(e) => return Err(e),
    }

    let record = FobRecord::initial();
    save(storage, &record)?;
    Ok(record)
}

/// Rewrite the entire record. A storage error is fatal for this save
/// attempt; no recovery path is defined here.
pub fn save(storage: &mut impl StoragePort, record: &FobRecord) -> Result<(), StorageError> {
    storage.write(NAMESPACE, KEY, &record.encode())
}
