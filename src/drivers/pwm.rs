//! LEDC PWM output.
//!
//! One [`LedcPwm`] per configured channel.  Timers are configured alongside
//! their first channel; channels that share a timer must share frequency and
//! resolution (checked by [`NodeConfig::validate`](crate::config::NodeConfig::validate)).
//!
//! ## Dual-target design
//!
//! On ESP-IDF: configures and drives the LEDC peripheral via raw sys calls.
//! On host/test: tracks the latched duty in-memory only.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;
use log::info;

use crate::app::ports::PwmPort;
use crate::config::ChannelConfig;
use crate::error::ActuatorError;

/// Resolutions the LEDC timer accepts on every ESP32 variant we ship.
pub const SUPPORTED_RESOLUTION_BITS: core::ops::RangeInclusive<u8> = 8..=14;

pub struct LedcPwm {
    config: ChannelConfig,
    duty: u32,
}

impl LedcPwm {
    /// Configure the timer and channel, starting at zero duty.
    pub fn configure(config: ChannelConfig) -> Result<Self, ActuatorError> {
        if !SUPPORTED_RESOLUTION_BITS.contains(&config.resolution_bits) {
            return Err(ActuatorError::UnsupportedResolution(config.resolution_bits));
        }
        hw_configure(&config)?;
        info!(
            "pwm: gpio{} on timer{}/ch{} ({} Hz, {}-bit)",
            config.gpio, config.timer, config.channel, config.frequency_hz, config.resolution_bits
        );
        Ok(Self { config, duty: 0 })
    }
}

impl PwmPort for LedcPwm {
    fn config(&self) -> &ChannelConfig {
        &self.config
    }

    fn write_duty(&mut self, duty: u32) -> Result<(), ActuatorError> {
        if duty > self.config.max_duty() {
            return Err(ActuatorError::PwmWriteFailed);
        }
        hw_write(&self.config, duty)?;
        self.duty = duty;
        Ok(())
    }

    fn duty(&self) -> u32 {
        self.duty
    }
}

// ── Hardware access ───────────────────────────────────────────

#[cfg(target_os = "espidf")]
fn hw_configure(config: &ChannelConfig) -> Result<(), ActuatorError> {
    let timer = ledc_timer_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        timer_num: u32::from(config.timer),
        // ledc_timer_bit_t values equal the bit count.
        duty_resolution: u32::from(config.resolution_bits),
        freq_hz: config.frequency_hz,
        clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
        ..Default::default()
    };
    // SAFETY: plain struct-in config call; LEDC driver copies the struct.
    if unsafe { ledc_timer_config(&timer) } != ESP_OK as i32 {
        return Err(ActuatorError::TimerConfigFailed);
    }

    let channel = ledc_channel_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        channel: u32::from(config.channel),
        timer_sel: u32::from(config.timer),
        gpio_num: config.gpio,
        duty: 0,
        hpoint: 0,
        ..Default::default()
    };
    // SAFETY: as above.
    if unsafe { ledc_channel_config(&channel) } != ESP_OK as i32 {
        return Err(ActuatorError::ChannelConfigFailed);
    }
    Ok(())
}

#[cfg(target_os = "espidf")]
fn hw_write(config: &ChannelConfig, duty: u32) -> Result<(), ActuatorError> {
    let channel = u32::from(config.channel);
    // SAFETY: channel was configured in hw_configure(); each channel is owned
    // by exactly one LedcPwm so duty register writes do not race.
    unsafe {
        if ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel, duty) != ESP_OK as i32 {
            return Err(ActuatorError::PwmWriteFailed);
        }
        if ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel) != ESP_OK as i32 {
            return Err(ActuatorError::PwmWriteFailed);
        }
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
fn hw_configure(_config: &ChannelConfig) -> Result<(), ActuatorError> {
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
fn hw_write(_config: &ChannelConfig, _duty: u32) -> Result<(), ActuatorError> {
    Ok(())
}
