//! Interrupt-driven event pipeline.
//!
//! ```text
//! ┌──────────┐ rising  ┌────────────┐ accepted ┌─────────────┐ dequeue ┌────────┐
//! │ GPIO ISR │────────▶│ Debounce   │─────────▶│ EventQueue  │────────▶│ Worker │
//! │ (pin, t) │  edge   │ (per pin)  │          │ (depth 10)  │ blocking│        │
//! └──────────┘         └────────────┘          └─────────────┘         └────────┘
//!                       │ rejected                │ full
//!                       ▼                         ▼
//!                    debounced++               dropped++
//! ```
//!
//! Everything on the left of the queue runs in interrupt context: no
//! blocking, no allocation, no logging.  [`EventPipeline::on_rising_edge`]
//! is the single ISR entry point.

pub mod debounce;
pub mod queue;
pub mod worker;

use core::sync::atomic::{AtomicU32, Ordering};

use serde::Serialize;

pub use debounce::DebounceGate;
pub use queue::EventQueue;
pub use worker::{Dispatch, Worker};

use crate::config::{EVENT_QUEUE_DEPTH, MAX_MONITORED_PINS};

/// One accepted rising edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MotionEvent {
    pub source_pin: i32,
    /// Milliseconds since boot when the ISR ran (wrapping).
    pub timestamp_ms: u32,
}

/// What the ISR did with one edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeOutcome {
    Accepted,
    Debounced,
    /// Passed debounce but the queue was full.
    Dropped,
    /// Edge on a pin the pipeline does not watch.
    Unmonitored,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub accepted: u32,
    pub debounced: u32,
    pub dropped: u32,
    pub pending: u32,
}

pub struct EventPipeline {
    gates: heapless::Vec<DebounceGate, MAX_MONITORED_PINS>,
    queue: EventQueue<EVENT_QUEUE_DEPTH>,
    accepted: AtomicU32,
    debounced: AtomicU32,
}

impl EventPipeline {
    /// Build gates for `pins`; each accepts its first edge at or after `now_ms`.
    /// Pins beyond [`MAX_MONITORED_PINS`] are ignored.
    pub fn new(pins: &[i32], window_ms: u32, now_ms: u32) -> Self {
        let gates = pins
            .iter()
            .take(MAX_MONITORED_PINS)
            .map(|&pin| DebounceGate::new(pin, window_ms, now_ms))
            .collect();
        Self {
            gates,
            queue: EventQueue::new(),
            accepted: AtomicU32::new(0),
            debounced: AtomicU32::new(0),
        }
    }

    /// ISR entry point.
    pub fn on_rising_edge(&self, pin: i32, now_ms: u32) -> EdgeOutcome {
        let Some(gate) = self.gates.iter().find(|g| g.pin() == pin) else {
            return EdgeOutcome::Unmonitored;
        };
        if !gate.try_accept(now_ms) {
            self.debounced.fetch_add(1, Ordering::Relaxed);
            return EdgeOutcome::Debounced;
        }
        let event = MotionEvent {
            source_pin: pin,
            timestamp_ms: now_ms,
        };
        if self.queue.try_enqueue(event) {
            self.accepted.fetch_add(1, Ordering::Relaxed);
            EdgeOutcome::Accepted
        } else {
            EdgeOutcome::Dropped
        }
    }

    pub fn queue(&self) -> &EventQueue<EVENT_QUEUE_DEPTH> {
        &self.queue
    }

    pub fn monitored_pins(&self) -> impl Iterator<Item = i32> + '_ {
        self.gates.iter().map(DebounceGate::pin)
    }

    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            accepted: self.accepted.load(Ordering::Relaxed),
            debounced: self.debounced.load(Ordering::Relaxed),
            dropped: self.queue.dropped(),
            pending: self.queue.len() as u32,
        }
    }
}
