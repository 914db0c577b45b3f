//! Car responder — the passive half of the unlock/start exchange.
//!
//! The car never initiates. It blocks waiting for an UNLOCK, checks the
//! carried password against its provisioned one, and answers with a one-bit
//! ACK. On success it first discloses the unlock secret to the host channel,
//! then waits for the follow-up START and discloses one feature secret per
//! enabled feature, in the fob's listed order.
//!
//! Minimal disclosure on the wire: the ACK is the only reply that carries
//! failure information. A malformed START, a wrong car identity, or a
//! missing feature secret produce no reply at all — only an operator-log
//! line on this side.

use log::{info, warn};

use crate::error::Error;
use crate::link::{Framer, MsgKind, Transport};
use crate::ports::{HostPort, SECRET_LEN, SecretVault};
use crate::proto::{Ack, FeatureState, ID_LEN, cstr_bytes};

/// The car's provisioned identity and unlock password, fixed at build time.
#[derive(Debug, Clone, Copy)]
pub struct CarSecrets {
    pub car_id: [u8; ID_LEN],
    pub password: [u8; ID_LEN],
}

/// Whether an unlock attempt was granted. Drives the responder loop's
/// decision to wait for a START; never sent on the wire beyond the ACK.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    Granted,
    Denied,
}

/// The car-side responder. Stateless between exchanges: every unlock
/// attempt is judged on its own, with no lockout or attempt counting.
pub struct Car {
    secrets: CarSecrets,
}

impl Car {
    pub fn new(secrets: CarSecrets) -> Self {
        Self { secrets }
    }

    /// Block until an UNLOCK arrives and answer it.
    ///
    /// The carried password must equal the provisioned one exactly, length
    /// and content both. On a match the unlock secret goes to the host
    /// *before* the success ACK, so the fob never sees success until the
    /// disclosure is already done.
    pub fn handle_unlock<T: Transport>(
        &self,
        link: &mut Framer<T>,
        vault: &impl SecretVault,
        host: &mut impl HostPort,
    ) -> Result<UnlockOutcome, Error> {
        let msg = link.receive_by_type(MsgKind::Unlock)?;

        if msg.payload.as_slice() != cstr_bytes(&self.secrets.password) {
            warn!("car: unlock refused");
            link.send(MsgKind::Ack, &Ack::Failure.encode())?;
            return Ok(UnlockOutcome::Denied);
        }

        let mut secret = [0u8; SECRET_LEN];
        match vault.unlock_secret(&mut secret) {
            Ok(()) => host.disclose(&secret),
            Err(e) => warn!("car: unlock secret unavailable ({e})"),
        }

        link.send(MsgKind::Ack, &Ack::Success.encode())?;
        info!("car: unlocked");
        Ok(UnlockOutcome::Granted)
    }

    /// Block until a START arrives and disclose the enabled feature secrets.
    ///
    /// A payload that fails to decode, or one naming a different car, is
    /// dropped without any reply. A feature id with no provisioned secret is
    /// skipped; the remaining features still disclose in order.
    pub fn handle_start<T: Transport>(
        &self,
        link: &mut Framer<T>,
        vault: &impl SecretVault,
        host: &mut impl HostPort,
    ) -> Result<(), Error> {
        let msg = link.receive_by_type(MsgKind::Start)?;

        let state = match FeatureState::decode(&msg.payload) {
            Ok(state) => state,
            Err(e) => {
                warn!("car: malformed START payload ({e}), ignored");
                return Ok(());
            }
        };
        if state.car_id != self.secrets.car_id {
            warn!("car: START for a different car, ignored");
            return Ok(());
        }

        let mut secret = [0u8; SECRET_LEN];
        for &feature_id in &state.features {
            match vault.feature_secret(feature_id, &mut secret) {
                Ok(()) => host.disclose(&secret),
                Err(e) => warn!("car: no secret for feature {feature_id} ({e}), skipped"),
            }
        }
        info!("car: started with {} feature(s)", state.features.len());
        Ok(())
    }

    /// One full responder cycle: unlock, and on a grant the follow-up start.
    pub fn step<T: Transport>(
        &self,
        link: &mut Framer<T>,
        vault: &impl SecretVault,
        host: &mut impl HostPort,
    ) -> Result<(), Error> {
        if self.handle_unlock(link, vault, host)? == UnlockOutcome::Granted {
            self.handle_start(link, vault, host)?;
        }
        Ok(())
    }
}
