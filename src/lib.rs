//! KeyFob firmware library.
//!
//! Control logic for a two-board vehicle access system: a *car* unit and a
//! *fob* unit connected by a point-to-point UART. The fob authenticates to
//! the car to unlock it and to disclose its enabled optional features; a
//! paired fob can transfer its credentials to an unpaired one over the same
//! link.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within the adapter modules.

#![deny(unused_must_use)]

pub mod car;
pub mod console;
pub mod error;
pub mod fob;
pub mod link;
pub mod ports;
pub mod proto;
pub mod secrets;
pub mod store;

pub mod adapters;
