//! Peripheral drivers: debounced button input, LED latch, worker threads.

pub mod button;
pub mod debounce;
pub mod led;
pub mod task_pin;
