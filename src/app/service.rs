//! Command service: the core behind the HTTP command surface.
//!
//! [`CommandService`] owns the command-driven actuators of one node (light,
//! sentry turret) and a handle to the shared haptic engine.  It validates
//! every decoded [`Command`], applies it, and answers with a status
//! document.  A refused command never touches actuator state.
//!
//! ```text
//!   HTTP adapter ──▶ handle_request(path, body)
//!                        │ decode
//!                        ▼
//!                    execute(Command) ──▶ Light / Sentry / PulseSink
//!                        │
//!                        ▼
//!                    Reply { code, StatusReport json }  ──▶ EventSink
//! ```

use log::{info, warn};

use crate::actuators::{BeamTarget, Light, MoveOutcome, Sentry, Servo};
use crate::adapters::device_id::MacString;
use crate::app::ports::{EventSink, PulseSink, PwmPort};
use crate::config::Profile;
use crate::error::{ActuatorError, CommandError, Error};
use crate::waveform::{AMPLITUDE_FULL_SCALE, FrequencyClass};

use super::commands::{BeamCommand, Command, CommandKind, DimCommand, PositionCommand, PulseCommand};
use super::events::NodeEvent;
use super::status::{BeamFlags, SentryStatus, ServoPositions, StatusReport, SystemInfo};

/// Upper bound on `power` (repeat count) for one haptic command.  Pulses
/// block the caller, so this also bounds how long one command can take.
pub const MAX_REPEAT_COUNT: u32 = 100;

/// Response handed back to the HTTP adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub code: u16,
    pub body: String,
}

impl Reply {
    fn error(code: u16, err: &Error) -> Self {
        let body = serde_json::json!({ "error": err.to_string() }).to_string();
        Self { code, body }
    }
}

/// HTTP status for a refused command.
pub fn status_code(err: &Error) -> u16 {
    match err {
        Error::Command(CommandError::MissingToken | CommandError::InvalidToken) => 401,
        Error::Command(CommandError::Unsupported) => 404,
        Error::Command(_) => 400,
        _ => 500,
    }
}

/// Length-independent token comparison.  An empty expected token never
/// matches, so an unset secret cannot open the position command.
pub fn tokens_match(expected: &str, given: &str) -> bool {
    if expected.is_empty() {
        return false;
    }
    let (a, b) = (expected.as_bytes(), given.as_bytes());
    let mut diff = a.len() ^ b.len();
    for (i, &x) in a.iter().enumerate() {
        diff |= usize::from(x ^ b.get(i).copied().unwrap_or(0));
    }
    diff == 0
}

pub struct CommandService<P, S> {
    profile: Profile,
    mac: MacString,
    token: heapless::String<64>,
    haptics: Option<S>,
    light: Option<Light<P>>,
    sentry: Option<Sentry<P>>,
}

impl<P: PwmPort, S: PulseSink> CommandService<P, S> {
    pub fn new(profile: Profile, mac: MacString) -> Self {
        Self {
            profile,
            mac,
            token: heapless::String::new(),
            haptics: None,
            light: None,
            sentry: None,
        }
    }

    pub fn with_haptics(mut self, haptics: S) -> Self {
        self.haptics = Some(haptics);
        self
    }

    pub fn with_light(mut self, light: Light<P>) -> Self {
        self.light = Some(light);
        self
    }

    pub fn with_sentry(mut self, sentry: Sentry<P>, token: &str) -> Self {
        self.sentry = Some(sentry);
        self.token = heapless::String::try_from(token).unwrap_or_default();
        self
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn light(&self) -> Option<&Light<P>> {
        self.light.as_ref()
    }

    pub fn sentry(&self) -> Option<&Sentry<P>> {
        self.sentry.as_ref()
    }

    pub fn status(&self) -> StatusReport {
        match &self.sentry {
            Some(s) => StatusReport::Sentry(SentryStatus {
                system: SystemInfo { mac: self.mac.clone() },
                servos: ServoPositions {
                    pan: s.pan.angle(),
                    tilt: s.tilt.angle(),
                },
                beams: BeamFlags {
                    primary: s.primary.is_active(),
                    secondary: s.secondary.is_active(),
                },
            }),
            None => StatusReport::OK,
        }
    }

    /// Route, decode, execute, and render one request.
    pub fn handle_request(&mut self, path: &str, body: &[u8], sink: &mut impl EventSink) -> Reply {
        let Some(kind) = CommandKind::from_path(path) else {
            return Reply::error(404, &CommandError::Unsupported.into());
        };
        let result = Command::decode(kind, body)
            .map_err(Error::from)
            .and_then(|cmd| self.execute(cmd, sink));
        match result {
            Ok(report) => Reply {
                code: 200,
                body: report.to_json(),
            },
            Err(e) => Reply::error(status_code(&e), &e),
        }
    }

    /// Apply one decoded command and return the resulting status.
    pub fn execute(&mut self, command: Command, sink: &mut impl EventSink) -> Result<StatusReport, Error> {
        let kind = command.kind();
        let result = match command {
            Command::Pulse(c) => self.pulse(&c, sink),
            Command::Dim(c) => self.dim(&c),
            Command::Position(c) => self.position(&c, sink),
            Command::Beam(c) => self.beam(&c),
            Command::Status => Ok(()),
        };
        match result {
            Ok(()) => {
                if kind != CommandKind::Status {
                    sink.emit(&NodeEvent::CommandApplied(kind));
                }
                Ok(self.status())
            }
            Err(Error::Command(reason)) => {
                sink.emit(&NodeEvent::CommandRejected { kind, reason });
                Err(reason.into())
            }
            Err(e) => Err(e),
        }
    }

    fn pulse(&mut self, c: &PulseCommand, sink: &mut impl EventSink) -> Result<(), Error> {
        let haptics = self.haptics.as_mut().ok_or(CommandError::Unsupported)?;
        let freq = FrequencyClass::from_code(c.freq).ok_or(CommandError::OutOfRange("freq"))?;
        if c.power > MAX_REPEAT_COUNT {
            return Err(CommandError::OutOfRange("power").into());
        }
        let amplitude = c.amplitude.clamp(0, i64::from(AMPLITUDE_FULL_SCALE)) as u32;
        let report = haptics.pulse(freq, amplitude, c.power)?;
        sink.emit(&NodeEvent::PulseCompleted(report));
        Ok(())
    }

    fn dim(&mut self, c: &DimCommand) -> Result<(), Error> {
        let light = self.light.as_mut().ok_or(CommandError::Unsupported)?;
        let percent = u8::try_from(c.dim)
            .ok()
            .filter(|p| *p <= 100)
            .ok_or(CommandError::OutOfRange("dim"))?;
        light.set_percent(percent)?;
        info!("light: dim {}%", percent);
        Ok(())
    }

    /// Pan is moved before tilt.  If the tilt write fails, pan is driven
    /// back to its previous angle before the error is returned.
    fn position(&mut self, c: &PositionCommand, sink: &mut impl EventSink) -> Result<(), Error> {
        let sentry = self.sentry.as_mut().ok_or(CommandError::Unsupported)?;
        let token = c.token.as_deref().ok_or(CommandError::MissingToken)?;
        if !tokens_match(&self.token, token) {
            return Err(CommandError::InvalidToken.into());
        }

        let prior_pan = sentry.pan.angle();
        let pan_moved = match c.pan {
            Some(angle) => move_axis("pan", &mut sentry.pan, angle, sink)?,
            None => false,
        };
        if let Some(angle) = c.tilt {
            if let Err(e) = move_axis("tilt", &mut sentry.tilt, angle, sink) {
                if pan_moved && sentry.pan.move_to(prior_pan).is_err() {
                    warn!("sentry: pan could not return to {} after tilt failure", prior_pan);
                }
                return Err(e.into());
            }
        }
        Ok(())
    }

    fn beam(&mut self, c: &BeamCommand) -> Result<(), Error> {
        let sentry = self.sentry.as_mut().ok_or(CommandError::Unsupported)?;
        let target = BeamTarget::from_name(&c.target)?;
        let active = match c.active {
            0 => false,
            1 => true,
            _ => return Err(CommandError::OutOfRange("active").into()),
        };
        sentry.set_beam(target, active, c.power)?;
        info!("beam: {} active={} power={}mW", target.name(), active, c.power);
        Ok(())
    }
}

/// `Ok(true)` if the servo moved; an out-of-range angle is reported, not an error.
fn move_axis<P: PwmPort>(
    axis: &'static str,
    servo: &mut Servo<P>,
    angle: i32,
    sink: &mut impl EventSink,
) -> Result<bool, ActuatorError> {
    match servo.move_to(angle)? {
        MoveOutcome::Moved => Ok(true),
        MoveOutcome::Rejected => {
            sink.emit(&NodeEvent::ServoRejected { axis, angle });
            Ok(false)
        }
    }
}
