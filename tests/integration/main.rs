//! Integration test driver for `tests/integration/` submodules.
//!
//! Each `mod` below exercises the controller against the simulated GPIO
//! bank. All tests run on the host with no real hardware required.

#![cfg(not(target_os = "espidf"))]

mod controller_tests;
mod lifecycle_tests;
mod mock_hw;
