//! Hobby servo on a 50 Hz PWM channel.
//!
//! Angle is mapped linearly onto the pulse-width range, then the pulse
//! width onto duty.  Moves outside `[-max_angle, +max_angle]` are refused
//! without touching the output.

use log::warn;

use crate::app::ports::PwmPort;
use crate::config::ServoConfig;
use crate::error::ActuatorError;

use super::Actuator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    /// Angle outside the travel limits; no write was issued.
    Rejected,
}

pub struct Servo<P> {
    inner: Actuator<P>,
    max_angle: i32,
    min_pulse_us: u32,
    max_pulse_us: u32,
    angle: i32,
}

impl<P: PwmPort> Servo<P> {
    /// The servo is driven from construction; call [`home`](Self::home)
    /// to put it at a known position.
    pub fn new(pwm: P, config: &ServoConfig) -> Self {
        Self {
            inner: Actuator::new_active(pwm),
            max_angle: config.max_angle,
            min_pulse_us: config.min_pulse_us,
            max_pulse_us: config.max_pulse_us,
            angle: 0,
        }
    }

    /// Last commanded angle.
    pub fn angle(&self) -> i32 {
        self.angle
    }

    pub fn max_angle(&self) -> i32 {
        self.max_angle
    }

    pub fn home(&mut self) -> Result<(), ActuatorError> {
        self.move_to(0).map(|_| ())
    }

    /// Pulse width for `angle`, assuming it is inside the travel limits.
    pub fn pulse_width_us(&self, angle: i32) -> u32 {
        let span = i64::from(self.max_pulse_us - self.min_pulse_us);
        let offset = i64::from(angle + self.max_angle) * span / i64::from(2 * self.max_angle);
        self.min_pulse_us + offset as u32
    }

    /// Duty that produces a `pulse_us` high time at the channel frequency.
    pub fn duty_for_pulse(&self, pulse_us: u32) -> u32 {
        let period = u64::from(self.inner.pwm().config().period_us());
        let max = u64::from(self.inner.max_duty());
        ((u64::from(pulse_us) * max * 2 + period) / (period * 2)) as u32
    }

    pub fn move_to(&mut self, angle: i32) -> Result<MoveOutcome, ActuatorError> {
        if !(-self.max_angle..=self.max_angle).contains(&angle) {
            warn!("servo: angle {} outside ±{}", angle, self.max_angle);
            return Ok(MoveOutcome::Rejected);
        }
        let duty = self.duty_for_pulse(self.pulse_width_us(angle));
        self.inner.set_output(duty)?;
        self.angle = angle;
        Ok(MoveOutcome::Moved)
    }

    pub fn pwm(&self) -> &P {
        self.inner.pwm()
    }
}
