//! Dimmable light.

use crate::app::ports::PwmPort;
use crate::error::ActuatorError;

use super::{Actuator, ActuatorState};

pub struct Light<P> {
    inner: Actuator<P>,
    percent: u8,
}

impl<P: PwmPort> Light<P> {
    pub fn new(pwm: P) -> Self {
        Self {
            inner: Actuator::new_active(pwm),
            percent: 0,
        }
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }

    pub fn state(&self) -> ActuatorState {
        self.inner.state()
    }

    /// `floor(percent * max_duty / 100)`, with `percent` clamped to 100.
    pub fn set_percent(&mut self, percent: u8) -> Result<(), ActuatorError> {
        let percent = percent.min(100);
        let duty = u32::from(percent) * self.inner.max_duty() / 100;
        self.inner.set_output(duty)?;
        self.percent = percent;
        Ok(())
    }

    pub fn pwm(&self) -> &P {
        self.inner.pwm()
    }
}
