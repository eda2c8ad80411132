//! Outbound node events.
//!
//! The worker and the [`CommandService`](super::service::CommandService)
//! emit these through the [`EventSink`](super::ports::EventSink) port.
//! Adapters on the other side decide what to do with them.

use crate::config::Profile;
use crate::error::{CommandError, CommsError, Error};
use crate::pipeline::PipelineStats;
use crate::waveform::PulseReport;

use super::commands::CommandKind;

/// Structured events emitted by the node core.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeEvent {
    /// The node finished startup with this profile.
    Started(Profile),

    /// The worker dequeued an event from a routed pin.
    MotionDispatched { pin: i32, timestamp_ms: u32 },

    /// The worker dequeued an event from a pin with no route.
    MotionIgnored { pin: i32 },

    /// A haptic pulse sequence ran to completion.
    PulseCompleted(PulseReport),

    /// A pulse could not be played.
    PulseFailed(Error),

    /// Outbound POST finished.
    NotifyDelivered { status: u16, content_length: Option<u64> },

    /// Outbound POST could not be completed.
    NotifyFailed(CommsError),

    /// A command was applied to the actuators.
    CommandApplied(CommandKind),

    /// A command was refused before touching any actuator.
    CommandRejected { kind: CommandKind, reason: CommandError },

    /// A servo move was outside the travel limits and not executed.
    ServoRejected { axis: &'static str, angle: i32 },

    /// Periodic pipeline counter snapshot.
    Stats(PipelineStats),

    /// Network connectivity changed.
    Connectivity(bool),
}
