//! Integration test driver for `tests/integration/`.
//!
//! Each `mod` below maps to a file that exercises one protocol surface
//! against mock adapters. All tests run on the host with no hardware.

mod access_flow_tests;
mod link_tests;
mod mock_hw;
mod pairing_tests;
