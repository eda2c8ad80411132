//! Monotonic clock.
//!
//! - **`target_os = "espidf"`**: `esp_timer_get_time()`, which is also
//!   safe to call from interrupt context.
//! - **host**: `std::time::Instant` from process start.

#[cfg(not(target_os = "espidf"))]
use std::sync::OnceLock;

#[cfg(not(target_os = "espidf"))]
static START: OnceLock<std::time::Instant> = OnceLock::new();

/// Microseconds since boot.
#[cfg(target_os = "espidf")]
pub fn uptime_us() -> u64 {
    // SAFETY: reads the free-running RTC counter; ISR-safe.
    (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
}

/// Microseconds since the first clock query.
#[cfg(not(target_os = "espidf"))]
pub fn uptime_us() -> u64 {
    START.get_or_init(std::time::Instant::now).elapsed().as_micros() as u64
}

/// Milliseconds since boot, truncated to the wrapping u32 used for edge
/// timestamps.
pub fn uptime_ms() -> u32 {
    (uptime_us() / 1_000) as u32
}
