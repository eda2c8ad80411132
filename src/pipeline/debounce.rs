//! Per-pin debounce gate, safe to call from interrupt context.
//!
//! The gate holds the timestamp of the last accepted edge in an atomic.
//! Acceptance is a single compare-exchange, so two edges racing on the
//! same pin cannot both be accepted.  Timestamps are wrapping u32
//! milliseconds; elapsed time is computed with `wrapping_sub`, which
//! stays correct across the ~49-day rollover.

use core::sync::atomic::{AtomicU32, Ordering};

pub struct DebounceGate {
    pin: i32,
    window_ms: u32,
    last_accepted_ms: AtomicU32,
}

impl DebounceGate {
    /// Create a gate that will accept an edge arriving at `now_ms`.
    pub fn new(pin: i32, window_ms: u32, now_ms: u32) -> Self {
        Self {
            pin,
            window_ms,
            last_accepted_ms: AtomicU32::new(now_ms.wrapping_sub(window_ms)),
        }
    }

    pub fn pin(&self) -> i32 {
        self.pin
    }

    pub fn window_ms(&self) -> u32 {
        self.window_ms
    }

    pub fn last_accepted_ms(&self) -> u32 {
        self.last_accepted_ms.load(Ordering::Acquire)
    }

    /// `true` if an edge at `now_ms` is accepted.  Accepting records
    /// `now_ms` as the new reference point; rejecting changes nothing.
    pub fn try_accept(&self, now_ms: u32) -> bool {
        let mut last = self.last_accepted_ms.load(Ordering::Acquire);
        loop {
            if now_ms.wrapping_sub(last) < self.window_ms {
                return false;
            }
            match self.last_accepted_ms.compare_exchange_weak(
                last,
                now_ms,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(current) => last = current,
            }
        }
    }
}
