//! Haptic waveform synthesis.
//!
//! A pulse is a deterministic, blocking sequence of duty writes separated
//! by microsecond delays.  Two shapes are supported:
//!
//! ```text
//!   Square          ┌──┐  ┌──┐            on_time at peak, off_time at 0,
//!                   │  │  │  │            repeated repeat_count times
//!               ────┘  └──┘  └────
//!
//!   Half-sine          ▁▃▆█▆▃▁            ENVELOPE_STEPS samples of
//!                  ───┘       └───        peak·cos²θ, θ ∈ [-π/2, π/2),
//!                                         then 0 for off_time
//! ```
//!
//! Every sequence ends with a zero-duty write, including one that aborts on
//! a PWM error.

use embedded_hal::delay::DelayNs;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::actuators::HapticChannel;
use crate::app::ports::{PulseSink, PwmPort};
use crate::error::{ActuatorError, Error};

/// Amplitude is expressed in percent of full output.
pub const AMPLITUDE_FULL_SCALE: u32 = 100;

/// Samples per half-sine envelope.
pub const ENVELOPE_STEPS: u32 = 20;

/// Envelope duration for the low-frequency motor (one 160 Hz half-period).
pub const HALF_SINE_LOW_PERIOD_US: u32 = 3_125;
/// Envelope duration for the high-frequency motor (one 320 Hz half-period).
pub const HALF_SINE_HIGH_PERIOD_US: u32 = 1_563;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaveformClass {
    Square,
    HalfSineLow,
    HalfSineHigh,
}

impl WaveformClass {
    /// Total envelope length, `None` for square pulses.
    pub const fn envelope_period_us(self) -> Option<u32> {
        match self {
            Self::Square => None,
            Self::HalfSineLow => Some(HALF_SINE_LOW_PERIOD_US),
            Self::HalfSineHigh => Some(HALF_SINE_HIGH_PERIOD_US),
        }
    }
}

/// Which motor a frequency class plays on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Motor {
    High,
    Low,
}

/// Wire-level pulse selector (`freq` in haptic commands).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrequencyClass {
    /// 0: square pulse on the high-frequency motor.
    LightTap,
    /// 1: square pulse on the low-frequency motor.
    HeavyTap,
    /// 2: half-sine envelope on the low-frequency motor.
    SmoothLow,
    /// 3: half-sine envelope on the high-frequency motor.
    SmoothHigh,
}

impl FrequencyClass {
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::LightTap),
            1 => Some(Self::HeavyTap),
            2 => Some(Self::SmoothLow),
            3 => Some(Self::SmoothHigh),
            _ => None,
        }
    }

    pub const fn waveform(self) -> WaveformClass {
        match self {
            Self::LightTap | Self::HeavyTap => WaveformClass::Square,
            Self::SmoothLow => WaveformClass::HalfSineLow,
            Self::SmoothHigh => WaveformClass::HalfSineHigh,
        }
    }

    pub const fn motor(self) -> Motor {
        match self {
            Self::LightTap | Self::SmoothHigh => Motor::High,
            Self::HeavyTap | Self::SmoothLow => Motor::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseRequest {
    pub class: WaveformClass,
    /// Percent of full scale; values above 100 are clamped.
    pub amplitude: u32,
    pub repeat_count: u32,
}

impl PulseRequest {
    pub const fn new(class: WaveformClass, amplitude: u32, repeat_count: u32) -> Self {
        Self {
            class,
            amplitude,
            repeat_count,
        }
    }
}

/// What a completed pulse did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseReport {
    pub class: WaveformClass,
    pub peak_duty: u32,
    pub writes: u32,
    pub repeat_count: u32,
}

/// `ceil(max_duty · amplitude / 100)`, amplitude clamped to full scale.
pub fn peak_duty(max_duty: u32, amplitude: u32) -> u32 {
    let amplitude = u64::from(amplitude.min(AMPLITUDE_FULL_SCALE));
    (u64::from(max_duty) * amplitude).div_ceil(u64::from(AMPLITUDE_FULL_SCALE)) as u32
}

/// Sample `step` of a `steps`-long half-sine envelope peaking at `peak`.
pub fn envelope_duty(peak: u32, step: u32, steps: u32) -> u32 {
    let theta = core::f64::consts::PI * (f64::from(step) / f64::from(steps) - 0.5);
    let c = theta.cos();
    (f64::from(peak) * c * c).floor() as u32
}

// ── Synthesizer ───────────────────────────────────────────────

pub struct Synthesizer<D> {
    delay: D,
}

impl<D: DelayNs> Synthesizer<D> {
    pub fn new(delay: D) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> &D {
        &self.delay
    }

    /// Play `request` on `motor`, blocking until the final zero write.
    pub fn play<P: PwmPort>(
        &mut self,
        motor: &mut HapticChannel<P>,
        request: &PulseRequest,
    ) -> Result<PulseReport, ActuatorError> {
        let mut report = PulseReport {
            class: request.class,
            peak_duty: peak_duty(motor.max_duty(), request.amplitude),
            writes: 0,
            repeat_count: request.repeat_count,
        };
        if request.repeat_count == 0 {
            return Ok(report);
        }

        if let Err(e) = self.run(motor, request, &mut report) {
            // Never leave a motor spinning after a failed write.
            let _ = motor.drive(0);
            return Err(e);
        }
        debug!(
            "waveform: {:?} peak={} x{} ({} writes)",
            report.class, report.peak_duty, report.repeat_count, report.writes
        );
        Ok(report)
    }

    fn run<P: PwmPort>(
        &mut self,
        motor: &mut HapticChannel<P>,
        request: &PulseRequest,
        report: &mut PulseReport,
    ) -> Result<(), ActuatorError> {
        let peak = report.peak_duty;
        let off_time = motor.off_time_us();

        for _ in 0..request.repeat_count {
            match request.class.envelope_period_us() {
                None => {
                    motor.drive(peak)?;
                    report.writes += 1;
                    self.delay.delay_us(motor.on_time_us());
                }
                Some(period) => {
                    let step_us = period / ENVELOPE_STEPS;
                    for step in 0..ENVELOPE_STEPS {
                        motor.drive(envelope_duty(peak, step, ENVELOPE_STEPS))?;
                        report.writes += 1;
                        self.delay.delay_us(step_us);
                    }
                }
            }
            motor.drive(0)?;
            report.writes += 1;
            self.delay.delay_us(off_time);
        }
        Ok(())
    }
}

// ── Haptic engine ─────────────────────────────────────────────

/// Two motors plus a synthesizer; the unit commands and routes pulse.
pub struct HapticEngine<P, D> {
    high: HapticChannel<P>,
    low: HapticChannel<P>,
    synth: Synthesizer<D>,
}

impl<P: PwmPort, D: DelayNs> HapticEngine<P, D> {
    pub fn new(high: HapticChannel<P>, low: HapticChannel<P>, delay: D) -> Self {
        Self {
            high,
            low,
            synth: Synthesizer::new(delay),
        }
    }

    pub fn motor(&self, which: Motor) -> &HapticChannel<P> {
        match which {
            Motor::High => &self.high,
            Motor::Low => &self.low,
        }
    }

    pub fn synthesizer(&self) -> &Synthesizer<D> {
        &self.synth
    }
}

impl<P: PwmPort, D: DelayNs> PulseSink for HapticEngine<P, D> {
    fn pulse(&mut self, freq: FrequencyClass, amplitude: u32, repeat_count: u32) -> Result<PulseReport, Error> {
        let request = PulseRequest::new(freq.waveform(), amplitude, repeat_count);
        let motor = match freq.motor() {
            Motor::High => &mut self.high,
            Motor::Low => &mut self.low,
        };
        Ok(self.synth.play(motor, &request)?)
    }
}
