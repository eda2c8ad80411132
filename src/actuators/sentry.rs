//! Sentry turret: pan/tilt servos plus primary and secondary beams.

use log::info;

use crate::app::ports::PwmPort;
use crate::error::{ActuatorError, CommandError};

use super::{Beam, Servo};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeamTarget {
    Primary,
    Secondary,
}

impl BeamTarget {
    pub fn from_name(name: &str) -> Result<Self, CommandError> {
        match name {
            "primary" => Ok(Self::Primary),
            "secondary" => Ok(Self::Secondary),
            _ => Err(CommandError::UnknownTarget),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }
}

pub struct Sentry<P> {
    pub pan: Servo<P>,
    pub tilt: Servo<P>,
    pub primary: Beam<P>,
    pub secondary: Beam<P>,
}

impl<P: PwmPort> Sentry<P> {
    pub fn new(pan: Servo<P>, tilt: Servo<P>, primary: Beam<P>, secondary: Beam<P>) -> Self {
        Self {
            pan,
            tilt,
            primary,
            secondary,
        }
    }

    /// Centre both servos and make sure both beams are dark.
    pub fn home(&mut self) -> Result<(), ActuatorError> {
        self.pan.home()?;
        self.tilt.home()?;
        self.primary.deactivate()?;
        self.secondary.deactivate()?;
        info!("sentry: homed, beams off");
        Ok(())
    }

    pub fn beam_mut(&mut self, target: BeamTarget) -> &mut Beam<P> {
        match target {
            BeamTarget::Primary => &mut self.primary,
            BeamTarget::Secondary => &mut self.secondary,
        }
    }

    /// Apply an on/off + power request to one beam.
    pub fn set_beam(&mut self, target: BeamTarget, active: bool, power_mw: u32) -> Result<(), ActuatorError> {
        let beam = self.beam_mut(target);
        if active {
            beam.set_optical_output(power_mw)?;
            beam.activate()
        } else {
            beam.deactivate()
        }
    }
}
