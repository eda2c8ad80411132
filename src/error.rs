//! Unified error types for the PulseNode firmware.
//!
//! A single `Error` enum that every subsystem converts into, so the startup
//! path and the command surface handle failures uniformly. All variants are
//! `Copy` and allocation-free so they can be returned from the worker task
//! and HTTP handlers without touching the heap.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A PWM channel or actuator operation failed.
    Actuator(ActuatorError),
    /// A network operation failed.
    Comms(CommsError),
    /// A decoded command could not be applied.
    Command(CommandError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Command(e) => write!(f, "command: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// LEDC timer configuration was rejected by the driver.
    TimerConfigFailed,
    /// LEDC channel configuration was rejected by the driver.
    ChannelConfigFailed,
    /// Resolution outside the 8–14 bit range the LEDC supports.
    UnsupportedResolution(u8),
    /// Duty write or latch failed.
    PwmWriteFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TimerConfigFailed => write!(f, "PWM timer config failed"),
            Self::ChannelConfigFailed => write!(f, "PWM channel config failed"),
            Self::UnsupportedResolution(bits) => write!(f, "unsupported {bits}-bit resolution"),
            Self::PwmWriteFailed => write!(f, "PWM write failed"),
        }
    }
}

impl std::error::Error for ActuatorError {}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    /// No network transport is available (not connected, or host build).
    NoTransport,
    /// The HTTP client could not be created or the request not sent.
    RequestFailed,
    /// The response could not be read back.
    ResponseFailed,
    WifiConnectFailed,
    ServerStartFailed,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoTransport => write!(f, "no transport"),
            Self::RequestFailed => write!(f, "HTTP request failed"),
            Self::ResponseFailed => write!(f, "HTTP response failed"),
            Self::WifiConnectFailed => write!(f, "WiFi connect failed"),
            Self::ServerStartFailed => write!(f, "HTTP server start failed"),
        }
    }
}

impl std::error::Error for CommsError {}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}

// ---------------------------------------------------------------------------
// Command errors
// ---------------------------------------------------------------------------

/// Reasons a decoded command is refused.  None of these touch actuator
/// state; the command surface maps them to an error response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// The body was not valid JSON or a required field was missing.
    Malformed,
    /// A field was present but outside its accepted range.
    OutOfRange(&'static str),
    /// The command needs a token and none was supplied.
    MissingToken,
    /// The supplied token does not match the configured one.
    InvalidToken,
    /// The named target does not exist on this node.
    UnknownTarget,
    /// The command is not supported by this node profile.
    Unsupported,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed command"),
            Self::OutOfRange(field) => write!(f, "{field} out of range"),
            Self::MissingToken => write!(f, "a security token must be provided"),
            Self::InvalidToken => write!(f, "invalid token"),
            Self::UnknownTarget => write!(f, "target does not exist"),
            Self::Unsupported => write!(f, "not supported by this node"),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Self::Command(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
