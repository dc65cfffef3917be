//! ButtonLatch firmware library.
//!
//! A push-button on one GPIO drives an LED on another: debounced button
//! edges feed a binary output latch. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]`; everything else runs on the host against
//! the simulated GPIO bank.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod pins;

pub use app::controller::{Controller, ControllerState};
pub use config::ControllerConfig;
pub use drivers::button::{ActiveState, ButtonEvent};
pub use error::{Error, Result, Unavailable};
pub use pins::{LogicLevel, PinId};
