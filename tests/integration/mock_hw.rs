//! Shared rig for integration tests.
//!
//! Wires a [`Controller`] to a [`SimGpio`] bank with a `BUTTON` input
//! (idle High, pulled up) and an `LED` output, a [`ManualClock`], and a
//! recording event sink the test can inspect after handing it over.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use buttonlatch::adapters::sim_gpio::SimGpio;
use buttonlatch::adapters::time::ManualClock;
use buttonlatch::app::events::ControllerEvent;
use buttonlatch::app::ports::EventSink;
use buttonlatch::{Controller, ControllerConfig, LogicLevel};

// ── Recording sink ────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<ControllerEvent>>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn events(&self) -> Vec<ControllerEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<ControllerEvent> {
        self.events.lock().unwrap().last().cloned()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &ControllerEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

// ── Rig ───────────────────────────────────────────────────────

pub type TestController = Controller<SimGpio, ManualClock, RecordingSink>;

pub struct Rig {
    pub gpio: SimGpio,
    pub clock: Arc<ManualClock>,
    pub sink: RecordingSink,
    pub controller: TestController,
}

/// Debounce timing used by the rig: 20 ms window, 1 ms worker period.
pub fn fast_config() -> ControllerConfig {
    ControllerConfig {
        debounce_ms: 20,
        poll_interval_ms: 1,
        ..ControllerConfig::default()
    }
}

#[allow(dead_code)]
impl Rig {
    pub fn new() -> Self {
        Self::with_config(fast_config())
    }

    pub fn with_config(config: ControllerConfig) -> Self {
        let gpio = SimGpio::new();
        gpio.add_pin("BUTTON", LogicLevel::High);
        gpio.add_pin("LED", LogicLevel::Low);
        let clock = Arc::new(ManualClock::new(0));
        let sink = RecordingSink::default();
        let controller = Controller::new(gpio.clone(), Arc::clone(&clock), config, sink.clone());
        Self {
            gpio,
            clock,
            sink,
            controller,
        }
    }

    pub fn led(&self) -> Option<LogicLevel> {
        self.gpio.level("LED")
    }

    /// Drive the button and let `hold_ms` of simulated time pass.
    pub fn button(&self, level: LogicLevel, hold_ms: u32) {
        self.gpio.drive("BUTTON", level).unwrap();
        self.clock.advance(hold_ms);
    }
}

/// Poll `cond` until it holds or two seconds of wall time pass.
pub fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    cond()
}

/// Give the debounce worker a few periods to act on the current clock.
pub fn settle() {
    std::thread::sleep(Duration::from_millis(20));
}
