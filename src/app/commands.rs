//! Inbound commands.
//!
//! The HTTP surface routes a request by path to a [`CommandKind`] and
//! hands the raw JSON body to [`Command::decode`].  Decoding checks field
//! presence and type only; range and token checks happen in the
//! [`CommandService`](super::service::CommandService) so every refusal
//! flows through one place.

use serde::{Deserialize, Serialize};

use crate::error::CommandError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Pulse,
    Dim,
    Position,
    Beam,
    Status,
}

impl CommandKind {
    pub const ALL: [Self; 5] = [Self::Pulse, Self::Dim, Self::Position, Self::Beam, Self::Status];

    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.path() == path)
    }

    pub const fn path(self) -> &'static str {
        match self {
            Self::Pulse => "/pulse",
            Self::Dim => "/dim",
            Self::Position => "/position",
            Self::Beam => "/beam",
            Self::Status => "/status",
        }
    }
}

/// Haptic pulse: `freq` selects the frequency class, `power` is the
/// repeat count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PulseCommand {
    pub freq: u8,
    pub amplitude: i64,
    pub power: u32,
}

/// Light level as a whole percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DimCommand {
    pub dim: i32,
}

/// Servo move.  Either axis may be omitted; the token may not.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PositionCommand {
    #[serde(default)]
    pub pan: Option<i32>,
    #[serde(default)]
    pub tilt: Option<i32>,
    #[serde(default)]
    pub token: Option<heapless::String<64>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BeamCommand {
    pub target: heapless::String<16>,
    pub active: u8,
    pub power: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Pulse(PulseCommand),
    Dim(DimCommand),
    Position(PositionCommand),
    Beam(BeamCommand),
    Status,
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::Pulse(_) => CommandKind::Pulse,
            Self::Dim(_) => CommandKind::Dim,
            Self::Position(_) => CommandKind::Position,
            Self::Beam(_) => CommandKind::Beam,
            Self::Status => CommandKind::Status,
        }
    }

    /// Decode a JSON body for `kind`.  The status query ignores its body.
    pub fn decode(kind: CommandKind, body: &[u8]) -> Result<Self, CommandError> {
        fn parse<'a, T: Deserialize<'a>>(body: &'a [u8]) -> Result<T, CommandError> {
            serde_json::from_slice(body).map_err(|_| CommandError::Malformed)
        }
        Ok(match kind {
            CommandKind::Pulse => Self::Pulse(parse(body)?),
            CommandKind::Dim => Self::Dim(parse(body)?),
            CommandKind::Position => Self::Position(parse(body)?),
            CommandKind::Beam => Self::Beam(parse(body)?),
            CommandKind::Status => Self::Status,
        })
    }
}
