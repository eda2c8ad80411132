//! Haptic motor channel.
//!
//! A motor is always driven: there is no standby state between pulses, the
//! synthesizer simply parks it at zero duty.  The on/off times are the
//! motor's half-period at its resonant frequency and set the square-pulse
//! rhythm.

use crate::app::ports::PwmPort;
use crate::config::MotorConfig;
use crate::error::ActuatorError;

use super::{Actuator, ActuatorState};

pub struct HapticChannel<P> {
    inner: Actuator<P>,
    on_time_us: u32,
    off_time_us: u32,
}

impl<P: PwmPort> HapticChannel<P> {
    pub fn new(pwm: P, config: &MotorConfig) -> Self {
        Self {
            inner: Actuator::new_active(pwm),
            on_time_us: config.on_time_us,
            off_time_us: config.off_time_us,
        }
    }

    pub fn on_time_us(&self) -> u32 {
        self.on_time_us
    }

    pub fn off_time_us(&self) -> u32 {
        self.off_time_us
    }

    pub fn max_duty(&self) -> u32 {
        self.inner.max_duty()
    }

    pub fn state(&self) -> ActuatorState {
        self.inner.state()
    }

    pub fn drive(&mut self, duty: u32) -> Result<(), ActuatorError> {
        self.inner.set_output(duty)
    }

    pub fn pwm(&self) -> &P {
        self.inner.pwm()
    }
}
