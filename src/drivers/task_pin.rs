//! Named worker threads, core-pinned on the ESP32-S3.
//!
//! ESP-IDF implements `std::thread` via pthreads on top of FreeRTOS tasks.
//! `esp_pthread_set_cfg()` sets thread-local configuration that applies to
//! the *next* `pthread_create()` from the calling thread, so the
//! config→spawn pair must not be interleaved with other thread creation on
//! the same thread. On other targets core and priority are ignored.

use std::thread::JoinHandle;

use crate::error::{Error, Result};

/// CPU core identifiers for the ESP32-S3 dual-core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Core {
    /// Core 0 (PRO_CPU) — protocol stacks.
    Pro = 0,
    /// Core 1 (APP_CPU) — application logic.
    App = 1,
}

/// Placement and sizing for a worker thread.
#[derive(Debug, Clone, Copy)]
pub struct TaskSpec {
    /// Null-terminated on ESP-IDF (e.g. `"debounce\0"`).
    pub name: &'static str,
    pub core: Core,
    pub priority: u8,
    pub stack_kb: usize,
}

impl TaskSpec {
    fn display_name(&self) -> &'static str {
        self.name.trim_end_matches('\0')
    }
}

#[cfg(target_os = "espidf")]
pub fn spawn_worker(spec: TaskSpec, f: impl FnOnce() + Send + 'static) -> Result<JoinHandle<()>> {
    // SAFETY: the config is consumed by the spawn below on this same thread.
    unsafe {
        let mut cfg = esp_idf_sys::esp_create_default_pthread_config();
        cfg.pin_to_core = spec.core as i32;
        cfg.prio = spec.priority as i32;
        cfg.stack_size = (spec.stack_kb * 1024) as i32;
        cfg.thread_name = spec.name.as_ptr() as *const _;
        let ret = esp_idf_sys::esp_pthread_set_cfg(&cfg);
        if ret != esp_idf_sys::ESP_OK as i32 {
            log::error!("esp_pthread_set_cfg failed for '{}': {}", spec.display_name(), ret);
            return Err(Error::Spawn);
        }
    }

    log::debug!(
        "Spawning '{}' on {:?} (pri={}, stack={}KB)",
        spec.display_name(),
        spec.core,
        spec.priority,
        spec.stack_kb
    );

    std::thread::Builder::new()
        .name(spec.display_name().into())
        .spawn(f)
        .map_err(|_| Error::Spawn)
}

#[cfg(not(target_os = "espidf"))]
pub fn spawn_worker(spec: TaskSpec, f: impl FnOnce() + Send + 'static) -> Result<JoinHandle<()>> {
    log::debug!(
        "Spawning '{}' (sim, stack={}KB)",
        spec.display_name(),
        spec.stack_kb
    );

    std::thread::Builder::new()
        .name(spec.display_name().into())
        .stack_size(spec.stack_kb * 1024)
        .spawn(f)
        .map_err(|_| Error::Spawn)
}
