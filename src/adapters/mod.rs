//! Adapters — concrete implementations of the port traits.
//!
//! | Adapter | Implements      | Connects to                       |
//! |---------|-----------------|-----------------------------------|
//! | `nvs`   | StoragePort     | NVS flash / in-memory store       |
//! | `vault` | SecretVault     | Provisioned secret NVS namespace  |
//! | `uart`  | Transport       | ESP32 UART driver (board link)    |
//!
//! `nvs` and `vault` carry an in-memory simulation backend so the protocol
//! logic is testable on the host; `uart` is hardware-only.

pub mod nvs;
pub mod vault;

#[cfg(target_os = "espidf")]
pub mod uart;
