//! GPIO / peripheral pin assignments for the three PulseNode boards.
//!
//! Single source of truth: the deployment profiles in [`crate::config`]
//! reference this module rather than hard-coding pin numbers.  Pin mapping is
//! fixed per board; nothing reassigns a pin at runtime.

// ---------------------------------------------------------------------------
// Haptic node (two ERM/LRA motors on one LEDC group)
// ---------------------------------------------------------------------------

/// High-frequency motor ("light" taps).
pub const HAPTIC_HIGH_GPIO: i32 = 12;
/// Low-frequency motor ("heavy" taps).
pub const HAPTIC_LOW_GPIO: i32 = 14;
/// Optional touch/motion trigger that fires a local tap.
pub const HAPTIC_TRIGGER_GPIO: i32 = 4;

pub const HAPTIC_HIGH_FREQ_HZ: u32 = 320;
pub const HAPTIC_LOW_FREQ_HZ: u32 = 160;
pub const HAPTIC_RESOLUTION_BITS: u8 = 13;

// ---------------------------------------------------------------------------
// Motion node (two PIR inputs, one dimmable light)
// ---------------------------------------------------------------------------

pub const MOTION_PRIMARY_GPIO: i32 = 2;
pub const MOTION_SECONDARY_GPIO: i32 = 4;

pub const LIGHT_GPIO: i32 = 12;
pub const LIGHT_FREQ_HZ: u32 = 10_000;
pub const LIGHT_RESOLUTION_BITS: u8 = 12;

// ---------------------------------------------------------------------------
// Sentry turret (pan/tilt servos, two laser beams, RGB indicator)
// ---------------------------------------------------------------------------

pub const SERVO_PAN_GPIO: i32 = 18;
pub const SERVO_TILT_GPIO: i32 = 19;
/// Hobby servo frame rate (20 ms period).
pub const SERVO_FREQ_HZ: u32 = 50;
/// 14-bit at 50 Hz gives ~1.2 µs pulse granularity.
pub const SERVO_RESOLUTION_BITS: u8 = 14;

pub const BEAM_PRIMARY_GPIO: i32 = 25;
pub const BEAM_SECONDARY_GPIO: i32 = 26;
pub const BEAM_FREQ_HZ: u32 = 5_000;
pub const BEAM_RESOLUTION_BITS: u8 = 13;

pub const INDICATOR_R_GPIO: i32 = 21;
pub const INDICATOR_G_GPIO: i32 = 22;
pub const INDICATOR_B_GPIO: i32 = 23;
pub const INDICATOR_FREQ_HZ: u32 = 5_000;
pub const INDICATOR_RESOLUTION_BITS: u8 = 8;
