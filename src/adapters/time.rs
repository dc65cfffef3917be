//! Clock adapters.
//!
//! - [`MonotonicClock`] — `esp_timer_get_time()` on ESP-IDF (microsecond,
//!   monotonic), `std::time::Instant` elsewhere.
//! - [`ManualClock`] — test clock advanced explicitly.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::app::ports::Clock;

/// Milliseconds since boot, truncated to `u32`.
pub struct MonotonicClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Microseconds since boot.
    #[cfg(target_os = "espidf")]
    pub fn uptime_us(&self) -> u64 {
        // SAFETY: esp_timer_get_time reads the high-resolution timer counter.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    /// Microseconds since the clock was created.
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u32 {
        (self.uptime_us() / 1_000) as u32
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicU32,
}

impl ManualClock {
    pub fn new(start_ms: u32) -> Self {
        Self {
            now_ms: AtomicU32::new(start_ms),
        }
    }

    pub fn set(&self, ms: u32) {
        self.now_ms.store(ms, Ordering::Release);
    }

    pub fn advance(&self, ms: u32) {
        let _ = self
            .now_ms
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |t| Some(t.wrapping_add(ms)));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u32 {
        self.now_ms.load(Ordering::Acquire)
    }
}
