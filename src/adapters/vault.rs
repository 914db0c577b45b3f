//! Provisioned-secret vault for the car.
//!
//! The car's disclosure blobs (the unlock message and one record per
//! deployed feature) are written into their own NVS namespace by the
//! deployment tooling; the firmware only ever reads them. A feature id
//! outside the deployable range, or one whose blob was never provisioned,
//! fails closed with nothing disclosed.

use crate::error::StorageError;
use crate::ports::{SECRET_LEN, SecretVault, StoragePort};
use crate::proto::MAX_FEATURES;

const NAMESPACE: &str = "vault";
const UNLOCK_KEY: &str = "unlock";

/// Read-only vault view over a [`StoragePort`].
pub struct NvsVault<S: StoragePort> {
    storage: S,
}

impl<S: StoragePort> NvsVault<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Deployment/test hook: place a blob in the vault namespace.
    pub fn provision(&mut self, key: &str, data: &[u8; SECRET_LEN]) -> Result<(), StorageError> {
        self.storage.write(NAMESPACE, key, data)
    }

    fn read_blob(&self, key: &str, out: &mut [u8; SECRET_LEN]) -> Result<(), StorageError> {
        let len = self.storage.read(NAMESPACE, key, out)?;
        if len != SECRET_LEN {
            return Err(StorageError::Corrupted);
        }
        Ok(())
    }
}

/// Vault key for one feature's secret record.
pub fn feature_key(feature_id: u8) -> heapless::String<8> {
    let mut key = heapless::String::new();
    // "feat" plus a single digit always fits.
    let _ = key.push_str("feat");
    let _ = key.push((b'0' + feature_id % 10) as char);
    key
}

impl<S: StoragePort> SecretVault for NvsVault<S> {
    fn unlock_secret(&self, out: &mut [u8; SECRET_LEN]) -> Result<(), StorageError> {
        self.read_blob(UNLOCK_KEY, out)
    }

    fn feature_secret(
        &self,
        feature_id: u8,
        out: &mut [u8; SECRET_LEN],
    ) -> Result<(), StorageError> {
        if feature_id == 0 || feature_id as usize > MAX_FEATURES {
            return Err(StorageError::NotFound);
        }
        self.read_blob(&feature_key(feature_id), out)
    }
}
