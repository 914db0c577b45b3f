//! Port traits — the boundary between the device logic and its external
//! collaborators.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ device state machine
//! ```
//!
//! Driven adapters (non-volatile storage, the provisioned-secret vault, the
//! host disclosure channel) implement these traits. The car responder and
//! fob state machine consume them via generics, so the protocol core never
//! touches hardware directly. The board-link transport trait lives in
//! [`crate::link::transport`].

use crate::error::StorageError;

/// Size of every provisioned secret blob (unlock message, feature records).
pub const SECRET_LEN: usize = 64;

// ───────────────────────────────────────────────────────────────
// Persistent storage (fob record)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value blob storage.
///
/// Write operations MUST be atomic from the caller's perspective — a
/// normally completed `write` never leaves a half-written blob observable.
/// The ESP-IDF NVS API guarantees this natively; the in-memory simulation
/// achieves it trivially. There is no concurrent access: one single-threaded
/// loop per device is the only writer.
pub trait StoragePort {
    /// Read a blob. Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a blob atomically, replacing any previous value.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Check whether a blob exists without reading it.
    fn exists(&self, namespace: &str, key: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Provisioned secrets (car)
// ───────────────────────────────────────────────────────────────

/// Read-only access to the car's provisioned secret blobs.
///
/// Implementations MUST bounds-check the feature index and fail closed: an
/// index with no provisioned blob yields an error and nothing is disclosed.
pub trait SecretVault {
    /// The secret disclosed on a successful unlock.
    fn unlock_secret(&self, out: &mut [u8; SECRET_LEN]) -> Result<(), StorageError>;

    /// The secret disclosed for one enabled feature.
    fn feature_secret(&self, feature_id: u8, out: &mut [u8; SECRET_LEN])
    -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Host disclosure channel (car)
// ───────────────────────────────────────────────────────────────

/// Where the car surfaces disclosed secrets (the host UART on hardware).
/// Infallible by design: disclosure failures have no reply channel.
pub trait HostPort {
    fn disclose(&mut self, data: &[u8]);
}
