//! ButtonLatch Firmware — Main Entry Point
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  EspGpio (GpioPort)   MonotonicClock   LogEventSink      │
//! │  ─────────────── Port Trait Boundary ──────────────      │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │  Controller: InputMonitor ──▶ OutputLatch          │  │
//! │  └────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```

#![deny(unused_must_use)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::info;

use buttonlatch::adapters::esp_gpio::EspGpio;
use buttonlatch::adapters::log_sink::LogEventSink;
use buttonlatch::adapters::time::MonotonicClock;
use buttonlatch::{Controller, ControllerConfig};

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("ButtonLatch v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Config ─────────────────────────────────────────────
    let config = ControllerConfig::default();
    info!(
        "Config: button={} ({:?}) led={} debounce={}ms",
        config.button_pin, config.button_active, config.led_pin, config.debounce_ms
    );

    // ── 3. Start the control loop ─────────────────────────────
    let mut controller = Controller::new(
        EspGpio::new(),
        Arc::new(MonotonicClock::new()),
        config,
        LogEventSink::new(),
    );
    controller.start().context("controller start failed")?;

    // Button edges are handled on the edge dispatcher and debounce tasks; the main
    // task only has to stay alive.
    loop {
        std::thread::sleep(Duration::from_secs(60));
    }
}
