//! Build-time provisioned secrets.
//!
//! Deployment secrets are baked into each image at build time via `KEYFOB_*`
//! environment variables; development defaults keep host builds and tests
//! self-contained. A fob image built with `KEYFOB_PAIRED` set boots as a
//! factory-paired fob holding the full credential set; without it the fob
//! boots unpaired and must be paired over the board link.

use crate::car::CarSecrets;
use crate::proto::{ID_LEN, PairingInfo};

/// Pack a string into a NUL-padded fixed field. Compile-time failure if the
/// provisioned value does not fit.
const fn fixed8(s: &str) -> [u8; ID_LEN] {
    let bytes = s.as_bytes();
    assert!(bytes.len() <= ID_LEN, "provisioned value longer than 8 bytes");
    let mut out = [0u8; ID_LEN];
    let mut i = 0;
    while i < bytes.len() {
        out[i] = bytes[i];
        i += 1;
    }
    out
}

const fn env_or(value: Option<&'static str>, default: &'static str) -> &'static str {
    match value {
        Some(s) => s,
        None => default,
    }
}

/// Car identity this image is provisioned for.
pub const CAR_ID: [u8; ID_LEN] = fixed8(env_or(option_env!("KEYFOB_CAR_ID"), "000000"));

/// Unlock password shared between the car and its paired fobs.
pub const UNLOCK_PASSWORD: [u8; ID_LEN] =
    fixed8(env_or(option_env!("KEYFOB_PASSWORD"), "unlock"));

/// Pairing PIN a paired fob demands before handing out credentials.
pub const PAIR_PIN: [u8; ID_LEN] = fixed8(env_or(option_env!("KEYFOB_PAIR_PIN"), "123456"));

/// Whether this fob image ships factory-paired.
pub const FACTORY_PAIRED: bool = option_env!("KEYFOB_PAIRED").is_some();

/// The car binary's provisioned secrets.
pub fn car_secrets() -> CarSecrets {
    CarSecrets {
        car_id: CAR_ID,
        password: UNLOCK_PASSWORD,
    }
}

/// The credential set a factory-paired fob image seeds its record from,
/// or `None` for an image built unpaired.
pub fn factory_provisioning() -> Option<PairingInfo> {
    FACTORY_PAIRED.then(|| PairingInfo {
        car_id: CAR_ID,
        password: UNLOCK_PASSWORD,
        pin: PAIR_PIN,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::cstr_bytes;

    #[test]
    fn fixed8_pads_with_nul() {
        let field = fixed8("abc");
        assert_eq!(&field[..3], b"abc");
        assert_eq!(&field[3..], &[0u8; 5]);
        assert_eq!(cstr_bytes(&field), b"abc");
    }

    #[test]
    fn fixed8_full_width() {
        assert_eq!(fixed8("ABCDEFGH"), *b"ABCDEFGH");
    }

    #[test]
    fn defaults_are_consistent() {
        let secrets = car_secrets();
        assert_eq!(secrets.car_id, CAR_ID);
        assert_eq!(secrets.password, UNLOCK_PASSWORD);
    }
}
