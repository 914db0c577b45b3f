//! Fob state machine — pairing, feature enablement, unlock/start requests.
//!
//! Two states, derived from the persistent record at boot:
//!
//! ```text
//!  UNPAIRED ──[PAIR received]──▶ PAIRED        (one-shot, irreversible)
//!
//!  PAIRED:  pair-as-initiator · enable-feature · unlock · start
//! ```
//!
//! Every operation is a synchronous, one-shot exchange; a blocked wait on
//! the board link blocks operator input for its duration by design. State
//! mutation and persistence happen only here: an operation loads nothing it
//! did not already own and saves at its own transition boundary, so saves
//! never interleave.
//!
//! Credential mismatches and capacity violations are silent no-ops on the
//! wire — the typed outcome enums exist for the operator log and for tests,
//! not for the peer.

use log::{info, warn};

use crate::error::{Error, LinkError};
use crate::link::{Framer, MsgKind, Transport};
use crate::ports::StoragePort;
use crate::proto::{Ack, EnableRequest, PIN_LEN, PairingInfo, cstr_bytes};
use crate::store::{self, FobRecord};

// ---------------------------------------------------------------------------
// Operation outcomes
// ---------------------------------------------------------------------------

/// Result of a pair-as-responder attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairOutcome {
    /// Credentials received and persisted; the fob is now paired.
    Paired,
    /// Pairing is consumed exactly once; an already-paired fob refuses.
    AlreadyPaired,
}

/// Result of a pair-as-initiator attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitiateOutcome {
    /// PIN matched; credentials were sent to the listening peer.
    Sent,
    /// Wrong PIN or wrong entry length. Nothing was sent.
    WrongPin,
    /// An unpaired fob has no credentials to offer.
    NotPaired,
}

/// Result of a feature-enable attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnableOutcome {
    Enabled,
    NotPaired,
    /// Request names a different car than the one this fob is paired to.
    WrongCar,
    /// All feature slots are in use.
    ListFull,
    /// Feature already enabled; enabling twice never grows the list.
    AlreadyEnabled,
}

// ---------------------------------------------------------------------------
// Fob
// ---------------------------------------------------------------------------

/// The fob's in-RAM state. The persistent record is loaded once at boot and
/// written back through [`store::save`] at each mutating transition.
pub struct Fob {
    record: FobRecord,
}

impl Fob {
    /// Boot-time initialisation: load (or canonicalise) the stored record,
    /// then apply factory provisioning — a fob built as "factory paired"
    /// seeds its record from the build-time secrets on first boot.
    pub fn boot(
        storage: &mut impl StoragePort,
        provisioning: Option<&PairingInfo>,
    ) -> Result<Self, Error> {
        let mut record = store::load_or_init(storage)?;

        if let Some(info) = provisioning {
            if !record.paired {
                record.pairing = *info;
                record.features.car_id = info.car_id;
                record.paired = true;
                store::save(storage, &record)?;
                info!("fob: factory provisioning applied");
            }
        }

        Ok(Self { record })
    }

    pub fn is_paired(&self) -> bool {
        self.record.paired
    }

    pub fn record(&self) -> &FobRecord {
        &self.record
    }

    // -----------------------------------------------------------------------
    // Pairing
    // -----------------------------------------------------------------------

    /// Pair as responder: block until a PAIR message arrives, copy its
    /// credential set verbatim, persist, and transition to PAIRED.
    ///
    /// No credential check is performed on this side — any peer that can
    /// send PAIR can provision this fob. Pairing is expected to happen only
    /// over a physically secured, short-lived connection; that trust
    /// boundary is part of the protocol contract.
    pub fn pair_as_responder<T: Transport>(
        &mut self,
        link: &mut Framer<T>,
        storage: &mut impl StoragePort,
    ) -> Result<PairOutcome, Error> {
        if self.record.paired {
            return Ok(PairOutcome::AlreadyPaired);
        }

        loop {
            let msg = link.receive_by_type(MsgKind::Pair)?;
            match PairingInfo::decode(&msg.payload) {
                Ok(info) => {
                    self.record.pairing = info;
                    self.record.features.car_id = info.car_id;
                    self.record.features.features.clear();
                    self.record.paired = true;
                    store::save(storage, &self.record)?;
                    info!("fob: paired");
                    return Ok(PairOutcome::Paired);
                }
                Err(e) => warn!("fob: malformed PAIR payload ({e}), still waiting"),
            }
        }
    }

    /// Pair as initiator: on an exact PIN match, send the stored credential
    /// set to whatever peer is listening. Mismatch (or any entry length
    /// other than the PIN's fixed size) sends nothing and reports failure
    /// through the outcome only.
    pub fn pair_as_initiator<T: Transport>(
        &self,
        link: &mut Framer<T>,
        pin_entry: &[u8],
    ) -> Result<InitiateOutcome, LinkError> {
        if !self.record.paired {
            return Ok(InitiateOutcome::NotPaired);
        }
        if pin_entry.len() != PIN_LEN || pin_entry != cstr_bytes(&self.record.pairing.pin) {
            warn!("fob: pairing PIN rejected");
            return Ok(InitiateOutcome::WrongPin);
        }

        link.send(MsgKind::Pair, &self.record.pairing.encode())?;
        info!("fob: credentials sent to peer");
        Ok(InitiateOutcome::Sent)
    }

    // -----------------------------------------------------------------------
    // Feature enablement
    // -----------------------------------------------------------------------

    /// Enable an optional feature from an operator-channel request.
    /// Rejections mutate nothing and persist nothing.
    pub fn enable_feature(
        &mut self,
        storage: &mut impl StoragePort,
        request: &EnableRequest,
    ) -> Result<EnableOutcome, Error> {
        if !self.record.paired {
            return Ok(EnableOutcome::NotPaired);
        }
        if request.car_id != self.record.pairing.car_id {
            return Ok(EnableOutcome::WrongCar);
        }
        if self.record.features.is_full() {
            return Ok(EnableOutcome::ListFull);
        }
        if self.record.features.contains(request.feature_id) {
            return Ok(EnableOutcome::AlreadyEnabled);
        }

        // Capacity was checked above; push cannot fail.
        let _ = self.record.features.features.push(request.feature_id);
        store::save(storage, &self.record)?;
        info!("fob: feature {} enabled", request.feature_id);
        Ok(EnableOutcome::Enabled)
    }

    // -----------------------------------------------------------------------
    // Unlock / start
    // -----------------------------------------------------------------------

    /// Send an UNLOCK request carrying the stored password.
    /// Returns `false` (no-op) when unpaired.
    pub fn request_unlock<T: Transport>(&self, link: &mut Framer<T>) -> Result<bool, LinkError> {
        if !self.record.paired {
            return Ok(false);
        }
        link.send(MsgKind::Unlock, cstr_bytes(&self.record.pairing.password))?;
        Ok(true)
    }

    /// Send a START request carrying the full feature state.
    /// Returns `false` (no-op) when unpaired.
    pub fn request_start<T: Transport>(&self, link: &mut Framer<T>) -> Result<bool, LinkError> {
        if !self.record.paired {
            return Ok(false);
        }
        link.send(MsgKind::Start, &self.record.features.encode())?;
        Ok(true)
    }

    /// Block until a well-formed ACK arrives; malformed ACK payloads are
    /// discarded and the wait continues.
    pub fn receive_ack<T: Transport>(&self, link: &mut Framer<T>) -> Result<Ack, LinkError> {
        loop {
            let msg = link.receive_by_type(MsgKind::Ack)?;
            if let Ok(ack) = Ack::decode(&msg.payload) {
                return Ok(ack);
            }
            warn!("fob: malformed ACK payload, still waiting");
        }
    }

    /// The button-triggered composite: unlock, wait for the ACK, and on
    /// success follow with START. Synchronous and one-shot — there is no
    /// cancellation, and an unanswered car blocks until the transport gives
    /// up. Returns the ACK, or `None` when unpaired.
    pub fn unlock_and_start<T: Transport>(
        &self,
        link: &mut Framer<T>,
    ) -> Result<Option<Ack>, LinkError> {
        if !self.request_unlock(link)? {
            return Ok(None);
        }
        let ack = self.receive_ack(link)?;
        if ack == Ack::Success {
            self.request_start(link)?;
        } else {
            info!("fob: unlock refused by car");
        }
        Ok(Some(ack))
    }
}
