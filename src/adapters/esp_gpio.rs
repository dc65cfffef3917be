//! ESP-IDF GPIO port.
//!
//! Pins are configured with raw `gpio_config()` calls. Ownership is tracked
//! in a process-wide bitmask so a pin can only be held once. Input edges
//! come from a GPIO interrupt that records the level into atomics; a
//! per-input dispatcher task drains them and runs the edge callback in task
//! context, where taking a mutex is legal.

use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use esp_idf_svc::sys::*;
use log::{info, warn};

use crate::app::ports::{EdgeCallback, GpioPort, InputPinHandle, OutputPinHandle};
use crate::drivers::button::DEBOUNCE_TASK;
use crate::drivers::task_pin::{self, Core, TaskSpec};
use crate::error::{Error, Result, Unavailable};
use crate::pins::{self, LogicLevel, PinId};

/// Bit `n` set = GPIO `n` is held by a handle.
static OWNED: AtomicU64 = AtomicU64::new(0);

/// Edge dispatcher: off the application core, below the debounce worker.
const EDGE_TASK: TaskSpec = TaskSpec {
    name: "gpio-edge\0",
    core: Core::Pro,
    priority: 4,
    stack_kb: 4,
};
const _: () = assert!(EDGE_TASK.priority < DEBOUNCE_TASK.priority);

/// One FreeRTOS tick between passes; shorter sleeps busy-wait on ESP-IDF.
const DISPATCH_TICKS: u32 = 1;

fn claim(pin: &PinId) -> Result<i32> {
    let gpio = pins::resolve(pin.as_str()).ok_or(Unavailable::NoSuchPin)?;
    let bit = 1u64 << gpio;
    if OWNED.fetch_or(bit, Ordering::AcqRel) & bit != 0 {
        return Err(Unavailable::AlreadyOwned.into());
    }
    Ok(gpio)
}

fn unclaim(gpio: i32) {
    OWNED.fetch_and(!(1u64 << gpio), Ordering::AcqRel);
}

fn configure(gpio: i32, mode: gpio_mode_t, pull_up: gpio_pullup_t) -> Result<()> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << gpio,
        mode,
        pull_up_en: pull_up,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        ..Default::default()
    };
    // SAFETY: cfg is a fully initialised config for a claimed pin.
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 {
        return Err(Unavailable::Platform(ret).into());
    }
    Ok(())
}

fn reset(gpio: i32) -> Result<()> {
    // SAFETY: resets a pin this process claimed; no other handle uses it.
    let ret = unsafe { gpio_reset_pin(gpio) };
    unclaim(gpio);
    if ret != ESP_OK as i32 {
        return Err(Error::Platform(ret));
    }
    Ok(())
}

fn read_level(gpio: i32) -> LogicLevel {
    // SAFETY: gpio_get_level is a read-only register access.
    LogicLevel::from(unsafe { gpio_get_level(gpio) } != 0)
}

/// GPIO port backed by the ESP-IDF driver.
#[derive(Debug, Default)]
pub struct EspGpio;

impl EspGpio {
    pub fn new() -> Self {
        Self
    }
}

impl GpioPort for EspGpio {
    type Input = EspInput;
    type Output = EspOutput;

    fn acquire_input(&mut self, pin: &PinId) -> Result<EspInput> {
        let gpio = claim(pin)?;
        if let Err(e) = configure(gpio, gpio_mode_t_GPIO_MODE_INPUT, gpio_pullup_t_GPIO_PULLUP_ENABLE) {
            unclaim(gpio);
            return Err(e);
        }
        info!("EspGpio: {} (GPIO{}) configured as input", pin, gpio);
        Ok(EspInput { gpio, dispatcher: None })
    }

    fn acquire_output(&mut self, pin: &PinId) -> Result<EspOutput> {
        let gpio = claim(pin)?;
        if let Err(e) = configure(gpio, gpio_mode_t_GPIO_MODE_OUTPUT, gpio_pullup_t_GPIO_PULLUP_DISABLE) {
            unclaim(gpio);
            return Err(e);
        }
        info!("EspGpio: {} (GPIO{}) configured as output", pin, gpio);
        Ok(EspOutput { gpio })
    }

    fn available_pins(&self) -> Vec<PinId> {
        pins::alias_names().filter_map(|n| PinId::new(n).ok()).collect()
    }
}

// ── GPIO interrupt handoff ────────────────────────────────────

/// Written by the GPIO ISR, drained by the edge dispatcher task.
struct EdgeLatch {
    gpio: i32,
    level: AtomicBool,
    seq: AtomicU32,
}

/// Install the shared GPIO ISR service. Already installed is fine.
fn install_isr_service() -> Result<()> {
    // SAFETY: gpio_install_isr_service is idempotent; ESP_ERR_INVALID_STATE
    // means another handle installed it first.
    let ret = unsafe { gpio_install_isr_service(0) };
    if ret != ESP_OK as i32 && ret != ESP_ERR_INVALID_STATE as i32 {
        return Err(Error::Platform(ret));
    }
    Ok(())
}

unsafe extern "C" fn edge_isr(arg: *mut core::ffi::c_void) {
    // SAFETY: `arg` is the EdgeLatch registered with this handler; the
    // owning EspInput removes the handler before dropping it.
    let latch = unsafe { &*(arg as *const EdgeLatch) };
    // SAFETY: gpio_get_level is a register read; safe in ISR context.
    let high = unsafe { gpio_get_level(latch.gpio) } != 0;
    latch.level.store(high, Ordering::Release);
    latch.seq.fetch_add(1, Ordering::AcqRel);
}

// ── Input handle ──────────────────────────────────────────────

struct Dispatcher {
    stop: Arc<AtomicBool>,
    worker: JoinHandle<()>,
    latch: Arc<EdgeLatch>,
}

impl Dispatcher {
    fn halt(self) {
        // SAFETY: disables and detaches the handler this dispatcher added;
        // after this the ISR no longer touches `latch`.
        unsafe {
            gpio_intr_disable(self.latch.gpio);
            gpio_isr_handler_remove(self.latch.gpio);
        }
        self.stop.store(true, Ordering::Release);
        if self.worker.join().is_err() {
            warn!("EspGpio: edge dispatcher panicked");
        }
    }
}

/// Forward ISR-recorded edges to `callback`. Blocks one tick per pass.
fn dispatch_edges(latch: &EdgeLatch, stop: &AtomicBool, callback: &mut EdgeCallback) {
    // Report the level once up front so an edge that raced the interrupt
    // hookup is not lost; the debouncer ignores a repeat of its level.
    let mut last = read_level(latch.gpio);
    callback(last);
    let mut seen = latch.seq.load(Ordering::Acquire);

    while !stop.load(Ordering::Acquire) {
        // SAFETY: plain FreeRTOS delay from task context.
        unsafe { vTaskDelay(DISPATCH_TICKS) };

        let seq = latch.seq.load(Ordering::Acquire);
        if seq == seen {
            continue;
        }
        seen = seq;
        let level = LogicLevel::from(latch.level.load(Ordering::Acquire));
        if level != last {
            last = level;
            callback(level);
        }
    }
}

pub struct EspInput {
    gpio: i32,
    dispatcher: Option<Dispatcher>,
}

impl ErrorType for EspInput {
    type Error = Error;
}

impl InputPin for EspInput {
    fn is_high(&mut self) -> Result<bool> {
        Ok(read_level(self.gpio).is_high())
    }

    fn is_low(&mut self) -> Result<bool> {
        Ok(!read_level(self.gpio).is_high())
    }
}

impl InputPinHandle for EspInput {
    fn register_edge_callback(&mut self, mut callback: EdgeCallback) -> Result<()> {
        self.unregister_edge_callback();
        install_isr_service()?;

        let gpio = self.gpio;
        let latch = Arc::new(EdgeLatch {
            gpio,
            level: AtomicBool::new(read_level(gpio).is_high()),
            seq: AtomicU32::new(0),
        });

        // SAFETY: the handler argument points into `latch`, which the
        // Dispatcher keeps alive until the handler is removed in `halt`.
        let ret = unsafe {
            gpio_set_intr_type(gpio, gpio_int_type_t_GPIO_INTR_ANYEDGE);
            gpio_isr_handler_add(gpio, Some(edge_isr), Arc::as_ptr(&latch) as *mut _)
        };
        if ret != ESP_OK as i32 {
            return Err(Error::Platform(ret));
        }
        // SAFETY: handler is installed for this claimed pin.
        unsafe { gpio_intr_enable(gpio) };

        let stop = Arc::new(AtomicBool::new(false));
        let worker_stop = Arc::clone(&stop);
        let worker_latch = Arc::clone(&latch);
        let spawned = task_pin::spawn_worker(EDGE_TASK, move || {
            dispatch_edges(&worker_latch, &worker_stop, &mut callback);
        });
        let worker = match spawned {
            Ok(worker) => worker,
            Err(e) => {
                // SAFETY: undo the handler added above.
                unsafe {
                    gpio_intr_disable(gpio);
                    gpio_isr_handler_remove(gpio);
                }
                return Err(e);
            }
        };

        self.dispatcher = Some(Dispatcher { stop, worker, latch });
        Ok(())
    }

    fn unregister_edge_callback(&mut self) {
        if let Some(dispatcher) = self.dispatcher.take() {
            dispatcher.halt();
        }
    }

    fn release(mut self) -> Result<()> {
        self.unregister_edge_callback();
        reset(self.gpio)
    }
}

// ── Output handle ─────────────────────────────────────────────

pub struct EspOutput {
    gpio: i32,
}

impl EspOutput {
    fn set_level(&mut self, high: bool) -> Result<()> {
        // SAFETY: register write to a pin configured as output by this handle.
        let ret = unsafe { gpio_set_level(self.gpio, u32::from(high)) };
        if ret != ESP_OK as i32 {
            return Err(Error::Platform(ret));
        }
        Ok(())
    }
}

impl ErrorType for EspOutput {
    type Error = Error;
}

impl OutputPin for EspOutput {
    fn set_low(&mut self) -> Result<()> {
        self.set_level(false)
    }

    fn set_high(&mut self) -> Result<()> {
        self.set_level(true)
    }
}

impl OutputPinHandle for EspOutput {
    fn release(self) -> Result<()> {
        reset(self.gpio)
    }
}
