//! Laser beam output.
//!
//! Optical power requests are mapped linearly from `[0, rated_mw]` onto
//! `[0, max_duty]` and rounded to the nearest step.  Requests above the
//! rating clamp to full duty.

use crate::app::ports::PwmPort;
use crate::config::BeamConfig;
use crate::error::ActuatorError;

use super::{Actuator, ActuatorState};

pub struct Beam<P> {
    inner: Actuator<P>,
    rated_mw: u32,
}

impl<P: PwmPort> Beam<P> {
    /// Beams start inactive; nothing is emitted until [`activate`](Self::activate).
    pub fn new(pwm: P, config: &BeamConfig) -> Self {
        Self {
            inner: Actuator::new(pwm),
            rated_mw: config.rated_mw,
        }
    }

    pub fn rated_mw(&self) -> u32 {
        self.rated_mw
    }

    pub fn state(&self) -> ActuatorState {
        self.inner.state()
    }

    pub fn is_active(&self) -> bool {
        self.inner.is_active()
    }

    /// Duty that corresponds to `mw` of optical output.
    pub fn duty_for(&self, mw: u32) -> u32 {
        if self.rated_mw == 0 {
            return 0;
        }
        let max = u64::from(self.inner.max_duty());
        let rated = u64::from(self.rated_mw);
        let scaled = (u64::from(mw) * max * 2 + rated) / (rated * 2);
        scaled.min(max) as u32
    }

    pub fn set_optical_output(&mut self, mw: u32) -> Result<(), ActuatorError> {
        let duty = self.duty_for(mw);
        self.inner.set_output(duty)
    }

    pub fn set_output(&mut self, duty: u32) -> Result<(), ActuatorError> {
        self.inner.set_output(duty)
    }

    pub fn activate(&mut self) -> Result<(), ActuatorError> {
        self.inner.activate()
    }

    pub fn deactivate(&mut self) -> Result<(), ActuatorError> {
        self.inner.deactivate()
    }

    pub fn pwm(&self) -> &P {
        self.inner.pwm()
    }
}
