//! Unified error types for the access firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! top-level device loops' error handling uniform. All variants are `Copy`
//! so they can be cheaply passed back through the state machines without
//! allocation.
//!
//! Protocol-level failures (malformed frames, credential mismatches) are
//! deliberately *not* errors here: they are silent no-ops or typed outcomes
//! per the protocol's minimal-disclosure policy. Only transport and storage
//! failures surface through this type.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The board link failed at the transport or framing layer.
    Link(LinkError),
    /// Non-volatile storage failed.
    Storage(StorageError),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Link(e) => write!(f, "link: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Board-link errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// The transport failed, closed, or yielded no data mid-message.
    /// The caller must treat the in-flight message as never received.
    Transport,
    /// The transport accepted fewer bytes than a full frame. A short write
    /// is fatal for the send; there is no partial-send retry.
    ShortWrite,
    /// Payload exceeds the frame format's one-byte length budget.
    Oversize,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => write!(f, "transport failed"),
            Self::ShortWrite => write!(f, "short write"),
            Self::Oversize => write!(f, "payload too large"),
        }
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

impl core::error::Error for Error {}
impl core::error::Error for LinkError {}

// ---------------------------------------------------------------------------
// Storage errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested blob does not exist.
    NotFound,
    /// Stored blob failed the layout / sentinel check.
    Corrupted,
    /// Storage partition is full.
    Full,
    /// Generic I/O error from the storage backend. Fatal for the attempted
    /// operation; recovery is delegated to the storage driver.
    IoError,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "blob not found"),
            Self::Corrupted => write!(f, "record corrupted"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl core::error::Error for StorageError {}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
