//! Adapters — concrete implementations of the port traits.
//!
//! | Adapter     | Implements   | Connects to                    |
//! |-------------|--------------|--------------------------------|
//! | `esp_gpio`  | GpioPort     | ESP-IDF GPIO driver            |
//! | `sim_gpio`  | GpioPort     | In-memory pin bank (host)      |
//! | `log_sink`  | EventSink    | `log` facade                   |
//! | `time`      | Clock        | ESP32 system timer / `Instant` |

#[cfg(target_os = "espidf")]
pub mod esp_gpio;
pub mod log_sink;
#[cfg(not(target_os = "espidf"))]
pub mod sim_gpio;
pub mod time;
