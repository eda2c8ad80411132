//! RGB status indicator.
//!
//! Three PWM channels drive a common-cathode RGB LED.  Red at boot, green
//! once the network is up; blue is wired but has no assigned meaning yet.
//!
//! ## Dual-target design
//!
//! Generic over [`PwmPort`]; `LedcPwm` drives hardware on ESP-IDF and
//! tracks duty in-memory on the host.

use crate::app::ports::PwmPort;
use crate::error::ActuatorError;

/// Duty for a lit channel (8-bit; a quarter brightness is plenty indoors).
pub const INDICATOR_DUTY: u32 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colour {
    Off,
    Red,
    Green,
    Blue,
}

pub struct Indicator<P> {
    red: P,
    green: P,
    blue: P,
    current: Colour,
}

impl<P: PwmPort> Indicator<P> {
    pub fn new(red: P, green: P, blue: P) -> Self {
        Self {
            red,
            green,
            blue,
            current: Colour::Off,
        }
    }

    pub fn set(&mut self, colour: Colour) -> Result<(), ActuatorError> {
        let on = |c: Colour| if c == colour { INDICATOR_DUTY } else { 0 };
        self.red.write_duty(on(Colour::Red))?;
        self.green.write_duty(on(Colour::Green))?;
        self.blue.write_duty(on(Colour::Blue))?;
        self.current = colour;
        Ok(())
    }

    pub fn off(&mut self) -> Result<(), ActuatorError> {
        self.set(Colour::Off)
    }

    pub fn current(&self) -> Colour {
        self.current
    }

    /// Raw (r, g, b) duties.
    pub fn duties(&self) -> (u32, u32, u32) {
        (self.red.duty(), self.green.duty(), self.blue.duty())
    }
}
