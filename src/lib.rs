//! PulseNode firmware library.
//!
//! Exposes the hardware-independent core (actuators, waveform synthesis,
//! event pipeline, command service) for integration testing.  All
//! ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module.

#![deny(unused_must_use)]

pub mod actuators;
pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod pins;
pub mod pipeline;
pub mod waveform;
