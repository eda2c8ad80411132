//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing tagged lines to the ESP-IDF logger
//! (UART / USB-CDC in production, stderr under test).

use log::{info, warn};

use crate::app::events::NodeEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`NodeEvent`] to the serial console.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &NodeEvent) {
        match event {
            NodeEvent::Started(profile) => info!("START | profile={:?}", profile),
            NodeEvent::MotionDispatched { pin, timestamp_ms } => {
                info!("EDGE  | pin={} t={}ms", pin, timestamp_ms);
            }
            NodeEvent::MotionIgnored { pin } => info!("EDGE  | pin={} unrouted", pin),
            NodeEvent::PulseCompleted(r) => info!(
                "PULSE | {:?} peak={} x{} writes={}",
                r.class, r.peak_duty, r.repeat_count, r.writes
            ),
            NodeEvent::PulseFailed(e) => warn!("PULSE | failed: {}", e),
            NodeEvent::NotifyDelivered { status, content_length } => match content_length {
                Some(len) => info!("NOTIFY| status={} content_length={}", status, len),
                None => info!("NOTIFY| status={} content_length=-", status),
            },
            NodeEvent::NotifyFailed(e) => warn!("NOTIFY| failed: {}", e),
            NodeEvent::CommandApplied(kind) => info!("CMD   | {:?} applied", kind),
            NodeEvent::CommandRejected { kind, reason } => {
                warn!("CMD   | {:?} rejected: {}", kind, reason);
            }
            NodeEvent::ServoRejected { axis, angle } => {
                warn!("CMD   | {} angle {} out of range", axis, angle);
            }
            NodeEvent::Stats(s) => info!(
                "STATS | accepted={} debounced={} dropped={} pending={}",
                s.accepted, s.debounced, s.dropped, s.pending
            ),
            NodeEvent::Connectivity(up) => {
                info!("NET   | {}", if *up { "connected" } else { "disconnected" });
            }
        }
    }
}
