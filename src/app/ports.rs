//! Port traits: the hexagonal boundary between node logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Actuators / Worker / CommandService
//! ```
//!
//! Driven adapters (PWM channels, HTTP client, event sinks) implement these
//! traits.  The domain consumes them via generics, so everything above the
//! port line runs unchanged on the host with in-memory implementations.

use std::sync::{Arc, Mutex, PoisonError};

use crate::config::ChannelConfig;
use crate::error::{ActuatorError, Error};
use crate::waveform::{FrequencyClass, PulseReport};

// ───────────────────────────────────────────────────────────────
// PWM port (driven adapter: domain → LEDC hardware)
// ───────────────────────────────────────────────────────────────

/// One configured PWM output.
///
/// Implementations write the duty and latch it in a single call; a duty
/// value above [`max_duty`](Self::max_duty) is a caller bug and adapters
/// may reject it.
pub trait PwmPort {
    /// The channel configuration this output was created with.
    fn config(&self) -> &ChannelConfig;

    /// Write and latch a new duty value.
    fn write_duty(&mut self, duty: u32) -> Result<(), ActuatorError>;

    /// Last duty value successfully latched.
    fn duty(&self) -> u32;

    fn max_duty(&self) -> u32 {
        self.config().max_duty()
    }
}

// ───────────────────────────────────────────────────────────────
// Pulse port (domain → haptic engine)
// ───────────────────────────────────────────────────────────────

/// Anything that can play a haptic pulse by frequency class.
pub trait PulseSink {
    fn pulse(&mut self, freq: FrequencyClass, amplitude: u32, repeat_count: u32) -> Result<PulseReport, Error>;
}

/// Engines are shared between the worker and the command surface.
impl<T: PulseSink + ?Sized> PulseSink for Arc<Mutex<T>> {
    fn pulse(&mut self, freq: FrequencyClass, amplitude: u32, repeat_count: u32) -> Result<PulseReport, Error> {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pulse(freq, amplitude, repeat_count)
    }
}

/// Nodes without haptic channels carry `None`.
impl<T: PulseSink> PulseSink for Option<T> {
    fn pulse(&mut self, freq: FrequencyClass, amplitude: u32, repeat_count: u32) -> Result<PulseReport, Error> {
        match self {
            Some(inner) => inner.pulse(freq, amplitude, repeat_count),
            None => Err(crate::error::CommandError::Unsupported.into()),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Notify port (domain → remote endpoint)
// ───────────────────────────────────────────────────────────────

/// Result of one outbound notification.  Failures are reported, never
/// propagated: the worker logs them and moves on to the next event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    Delivered { status: u16, content_length: Option<u64> },
    Failed(crate::error::CommsError),
}

pub trait NotifyPort {
    /// Fire one empty-body POST at `url` and wait for it to finish.
    fn notify(&mut self, url: &str) -> NotifyOutcome;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`NodeEvent`](super::events::NodeEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::NodeEvent);
}

impl<T: EventSink + ?Sized> EventSink for &mut T {
    fn emit(&mut self, event: &super::events::NodeEvent) {
        (**self).emit(event);
    }
}

// ───────────────────────────────────────────────────────────────
// Connectivity port
// ───────────────────────────────────────────────────────────────

pub trait ConnectivityPort {
    fn is_connected(&self) -> bool;
}
