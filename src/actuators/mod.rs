//! PWM-backed actuators.
//!
//! ```text
//!   Beam / Servo / HapticChannel / Light
//!                 │
//!            Actuator<P>   active flag, pending duty, clamp
//!                 │
//!             P: PwmPort   LEDC channel (or in-memory on host)
//! ```
//!
//! [`Actuator`] owns the activation state machine shared by every output:
//!
//! - `set_output` on an inactive actuator records the duty but does not
//!   latch it; the next `activate` applies it.
//! - `deactivate` forces zero on the hardware before returning.
//! - every duty is clamped to `[0, max_duty]` before it reaches the port.

pub mod beam;
pub mod haptic;
pub mod light;
pub mod sentry;
pub mod servo;

pub use beam::Beam;
pub use haptic::HapticChannel;
pub use light::Light;
pub use sentry::{BeamTarget, Sentry};
pub use servo::{MoveOutcome, Servo};

use crate::app::ports::PwmPort;
use crate::error::ActuatorError;

/// Point-in-time view of an actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorState {
    pub active: bool,
    pub current_duty: u32,
    pub max_duty: u32,
}

pub struct Actuator<P> {
    pwm: P,
    active: bool,
    current_duty: u32,
    pending_duty: u32,
}

impl<P: PwmPort> Actuator<P> {
    /// Wrap a configured channel.  Starts inactive at zero duty.
    pub fn new(pwm: P) -> Self {
        Self {
            pwm,
            active: false,
            current_duty: 0,
            pending_duty: 0,
        }
    }

    /// Wrap a channel that drives its output as soon as it is written.
    pub fn new_active(pwm: P) -> Self {
        Self {
            active: true,
            ..Self::new(pwm)
        }
    }

    pub fn state(&self) -> ActuatorState {
        ActuatorState {
            active: self.active,
            current_duty: self.current_duty,
            max_duty: self.pwm.max_duty(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn max_duty(&self) -> u32 {
        self.pwm.max_duty()
    }

    /// Duty recorded while inactive, applied on the next activation.
    pub fn pending_duty(&self) -> u32 {
        self.pending_duty
    }

    pub fn pwm(&self) -> &P {
        &self.pwm
    }

    pub fn set_output(&mut self, duty: u32) -> Result<(), ActuatorError> {
        let duty = duty.min(self.pwm.max_duty());
        if !self.active {
            self.pending_duty = duty;
            return Ok(());
        }
        self.pwm.write_duty(duty)?;
        self.current_duty = duty;
        Ok(())
    }

    /// Start driving the output.  A duty recorded while inactive is latched.
    pub fn activate(&mut self) -> Result<(), ActuatorError> {
        if self.active {
            return Ok(());
        }
        self.active = true;
        let pending = core::mem::take(&mut self.pending_duty);
        if pending != self.current_duty {
            self.set_output(pending)?;
        }
        Ok(())
    }

    /// Stop driving the output.  Zero is written whatever the prior state.
    pub fn deactivate(&mut self) -> Result<(), ActuatorError> {
        self.active = false;
        self.current_duty = 0;
        self.pending_duty = 0;
        self.pwm.write_duty(0)
    }
}
