//! Status document returned by the command surface.
//!
//! Sentry nodes report identity, servo angles and beam flags:
//!
//! ```json
//! {"system":{"mac":"de:ad:be:ef:ca:fe"},
//!  "servos":{"pan":0,"tilt":0},
//!  "beams":{"primary":false,"secondary":false}}
//! ```
//!
//! Other profiles answer `{"status":"OK"}`.

use serde::Serialize;

use crate::adapters::device_id::MacString;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemInfo {
    pub mac: MacString,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServoPositions {
    pub pan: i32,
    pub tilt: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BeamFlags {
    pub primary: bool,
    pub secondary: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentryStatus {
    pub system: SystemInfo,
    pub servos: ServoPositions,
    pub beams: BeamFlags,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StatusReport {
    Sentry(SentryStatus),
    Ok { status: &'static str },
}

impl StatusReport {
    pub const OK: Self = Self::Ok { status: "OK" };

    pub fn to_json(&self) -> String {
        // Serialising these plain structs cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}
