//! ESP32 clock backed by the ESP-IDF high-resolution timer.

use crate::traits::Clock;

/// Milliseconds since boot from `esp_timer_get_time()`.
///
/// Drives the battery sampling schedule.
#[derive(Clone, Copy, Debug, Default)]
pub struct Esp32Clock;

impl Esp32Clock {
    /// Creates a new ESP32 clock instance.
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for Esp32Clock {
    #[inline]
    fn now_ms(&self) -> u64 {
        // SAFETY: plain read of the monotonic system timer.
        let micros = unsafe { esp_idf_hal::sys::esp_timer_get_time() };
        (micros / 1000) as u64
    }
}
