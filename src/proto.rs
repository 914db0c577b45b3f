//! Typed message payloads and their checked codecs.
//!
//! Every payload that crosses a boundary — board link or operator channel —
//! goes through an explicit decode step that validates the length first and
//! the field content second, and fails closed. Received bytes are never
//! reinterpreted as structured records without passing through here.
//!
//! Identifiers and secrets are fixed 8-byte fields with C-string semantics
//! inherited from the provisioning format: content runs up to the first NUL,
//! the remainder is NUL padding.

use core::fmt;

/// Fixed size of car identifiers and secrets.
pub const ID_LEN: usize = 8;

/// Maximum number of enabled optional features per fob.
pub const MAX_FEATURES: usize = 3;

/// Operator-entered pairing PIN length (digits, no terminator).
pub const PIN_LEN: usize = 6;

/// PAIR payload: car_id ‖ password ‖ pin.
pub const PAIR_LEN: usize = 3 * ID_LEN;

/// ENABLE payload: car_id ‖ feature_id.
pub const ENABLE_LEN: usize = ID_LEN + 1;

/// START payload: car_id ‖ active_count ‖ feature id slots.
pub const START_LEN: usize = ID_LEN + 1 + MAX_FEATURES;

/// The content of a NUL-padded fixed field, up to the first NUL.
pub fn cstr_bytes(field: &[u8; ID_LEN]) -> &[u8] {
    let len = field.iter().position(|&b| b == 0).unwrap_or(ID_LEN);
    &field[..len]
}

// ---------------------------------------------------------------------------
// Decode failure
// ---------------------------------------------------------------------------

/// A payload failed validation. Decoding failure is a first-class outcome:
/// the caller discards the message and keeps waiting, it never acts on a
/// partially valid record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Payload length does not match the type's fixed size.
    BadLength,
    /// A field value is outside its valid range.
    BadValue,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadLength => write!(f, "wrong payload length"),
            Self::BadValue => write!(f, "field out of range"),
        }
    }
}

fn take_id(payload: &[u8], at: usize) -> [u8; ID_LEN] {
    let mut out = [0u8; ID_LEN];
    out.copy_from_slice(&payload[at..at + ID_LEN]);
    out
}

// ---------------------------------------------------------------------------
// PairingInfo — the credential set transferred during pairing
// ---------------------------------------------------------------------------

/// Car identity plus the two secrets a paired fob holds. Owned exclusively
/// by a paired fob; copied verbatim to a newly paired fob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairingInfo {
    pub car_id: [u8; ID_LEN],
    pub password: [u8; ID_LEN],
    pub pin: [u8; ID_LEN],
}

impl PairingInfo {
    pub const fn zeroed() -> Self {
        Self {
            car_id: [0; ID_LEN],
            password: [0; ID_LEN],
            pin: [0; ID_LEN],
        }
    }

    pub fn encode(&self) -> [u8; PAIR_LEN] {
        let mut out = [0u8; PAIR_LEN];
        out[..ID_LEN].copy_from_slice(&self.car_id);
        out[ID_LEN..2 * ID_LEN].copy_from_slice(&self.password);
        out[2 * ID_LEN..].copy_from_slice(&self.pin);
        out
    }

    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        if payload.len() != PAIR_LEN {
            return Err(DecodeError::BadLength);
        }
        Ok(Self {
            car_id: take_id(payload, 0),
            password: take_id(payload, ID_LEN),
            pin: take_id(payload, 2 * ID_LEN),
        })
    }
}

// ---------------------------------------------------------------------------
// FeatureState — which optional features a fob has enabled
// ---------------------------------------------------------------------------

/// The fob's enabled-feature list for one car. The active count is bounded
/// by [`MAX_FEATURES`] at construction and at decode; the active prefix
/// carries no duplicates (enforced by the enable operation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureState {
    pub car_id: [u8; ID_LEN],
    pub features: heapless::Vec<u8, MAX_FEATURES>,
}

impl FeatureState {
    pub fn empty(car_id: [u8; ID_LEN]) -> Self {
        Self {
            car_id,
            features: heapless::Vec::new(),
        }
    }

    pub fn contains(&self, feature_id: u8) -> bool {
        self.features.iter().any(|&f| f == feature_id)
    }

    pub fn is_full(&self) -> bool {
        self.features.is_full()
    }

    pub fn encode(&self) -> [u8; START_LEN] {
        let mut out = [0u8; START_LEN];
        out[..ID_LEN].copy_from_slice(&self.car_id);
        out[ID_LEN] = self.features.len() as u8;
        out[ID_LEN + 1..ID_LEN + 1 + self.features.len()].copy_from_slice(&self.features);
        out
    }

    /// Decode a START payload. A declared count above capacity is rejected
    /// outright rather than trusted or clamped.
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        if payload.len() != START_LEN {
            return Err(DecodeError::BadLength);
        }
        let count = payload[ID_LEN] as usize;
        if count > MAX_FEATURES {
            return Err(DecodeError::BadValue);
        }

        let mut features = heapless::Vec::new();
        features
            .extend_from_slice(&payload[ID_LEN + 1..ID_LEN + 1 + count])
            .map_err(|()| DecodeError::BadValue)?;

        Ok(Self {
            car_id: take_id(payload, 0),
            features,
        })
    }
}

// ---------------------------------------------------------------------------
// EnableRequest — operator-channel feature enablement
// ---------------------------------------------------------------------------

/// A feature-enable request entered on the fob's operator channel. Never
/// crosses the board link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnableRequest {
    pub car_id: [u8; ID_LEN],
    pub feature_id: u8,
}

impl EnableRequest {
    pub fn encode(&self) -> [u8; ENABLE_LEN] {
        let mut out = [0u8; ENABLE_LEN];
        out[..ID_LEN].copy_from_slice(&self.car_id);
        out[ID_LEN] = self.feature_id;
        out
    }

    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        if payload.len() != ENABLE_LEN {
            return Err(DecodeError::BadLength);
        }
        Ok(Self {
            car_id: take_id(payload, 0),
            feature_id: payload[ID_LEN],
        })
    }
}

// ---------------------------------------------------------------------------
// Ack — the single-bit unlock reply
// ---------------------------------------------------------------------------

/// Unlock acknowledgment. The one-bit ACK is the only error-bearing reply
/// the car ever transmits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Ack {
    Failure = 0,
    Success = 1,
}

impl Ack {
    pub fn encode(self) -> [u8; 1] {
        [self as u8]
    }

    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        if payload.len() != 1 {
            return Err(DecodeError::BadLength);
        }
        match payload[0] {
            0 => Ok(Self::Failure),
            1 => Ok(Self::Success),
            _ => Err(DecodeError::BadValue),
        }
    }
}
