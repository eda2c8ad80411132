//! Node configuration.
//!
//! Every node is built from a static [`NodeConfig`] chosen at startup.
//! Pin mapping, channel timing, thresholds and credentials are fixed for
//! the lifetime of the process; nothing here is reloaded at runtime.

use core::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::pins;
use crate::waveform::FrequencyClass;

/// Depth of the ISR → worker queue.  All deployments use the same depth.
pub const EVENT_QUEUE_DEPTH: usize = 10;

/// Maximum number of monitored input pins per node.
pub const MAX_MONITORED_PINS: usize = 2;

pub type EventName = heapless::String<32>;
pub type NotifyUrl = heapless::String<128>;

/// Which board this firmware image drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Two haptic motors, command-driven taps plus an optional trigger input.
    Haptic,
    /// Two PIR inputs that notify a remote endpoint, plus a dimmable light.
    Motion,
    /// Pan/tilt servos, two laser beams and an RGB indicator.
    Sentry,
}

impl Profile {
    /// Parse a profile name (case-insensitive), as passed through
    /// `PULSENODE_PROFILE` at build time.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "haptic" => Some(Self::Haptic),
            "motion" => Some(Self::Motion),
            "sentry" => Some(Self::Sentry),
            _ => None,
        }
    }
}

/// One LEDC output: pin, timer, channel, resolution and carrier frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub gpio: i32,
    pub timer: u8,
    pub channel: u8,
    pub resolution_bits: u8,
    pub frequency_hz: u32,
}

impl ChannelConfig {
    pub const fn new(gpio: i32, timer: u8, channel: u8, resolution_bits: u8, frequency_hz: u32) -> Self {
        Self {
            gpio,
            timer,
            channel,
            resolution_bits,
            frequency_hz,
        }
    }

    /// Largest duty value representable at this resolution.
    pub const fn max_duty(&self) -> u32 {
        (1u32 << self.resolution_bits) - 1
    }

    /// Length of one PWM period in microseconds.
    pub const fn period_us(&self) -> u32 {
        1_000_000 / self.frequency_hz
    }
}

/// A haptic motor channel and its resonance-derived square-pulse timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorConfig {
    pub channel: ChannelConfig,
    pub on_time_us: u32,
    pub off_time_us: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HapticConfig {
    /// High-frequency motor: light taps and the short envelope.
    pub high: MotorConfig,
    /// Low-frequency motor: heavy taps and the long envelope.
    pub low: MotorConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServoConfig {
    pub channel: ChannelConfig,
    /// Symmetric travel limit in degrees; accepted range is `[-max, +max]`.
    pub max_angle: i32,
    pub min_pulse_us: u32,
    pub max_pulse_us: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeamConfig {
    pub channel: ChannelConfig,
    /// Rated optical output at full duty.
    pub rated_mw: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentryConfig {
    pub pan: ServoConfig,
    pub tilt: ServoConfig,
    pub primary: BeamConfig,
    pub secondary: BeamConfig,
    /// R, G, B indicator channels.
    pub indicator: [ChannelConfig; 3],
    /// Shared secret required by position commands.
    pub token: heapless::String<64>,
}

/// Local pulse fired by the worker when a routed pin triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutePulse {
    pub freq: FrequencyClass,
    pub amplitude: u32,
    pub repeat_count: u32,
}

/// What the worker does when an event from `pin` is dequeued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub pin: i32,
    /// Remote event name; POSTed to `http://<host>:<port>/<event>`.
    pub event: Option<EventName>,
    pub pulse: Option<RoutePulse>,
}

/// Complete node configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    pub profile: Profile,

    // --- Event pipeline ---
    /// Minimum time between two accepted edges on one pin.
    pub debounce_window_ms: u32,
    /// Active pin → reaction table.  Pins not listed are ignored.
    pub routes: heapless::Vec<Route, MAX_MONITORED_PINS>,

    // --- Outbound notifications ---
    pub notify_host: heapless::String<64>,
    pub notify_port: u16,

    // --- Actuators (present per profile) ---
    pub haptic: Option<HapticConfig>,
    pub light: Option<ChannelConfig>,
    pub sentry: Option<SentryConfig>,

    // --- Network ---
    pub wifi_ssid: heapless::String<32>,
    pub wifi_password: heapless::String<64>,
}

impl NodeConfig {
    /// Factory configuration for a board profile.
    pub fn for_profile(profile: Profile) -> Self {
        match profile {
            Profile::Haptic => Self::haptic(),
            Profile::Motion => Self::motion(),
            Profile::Sentry => Self::sentry(),
        }
    }

    pub fn haptic() -> Self {
        let mut routes = heapless::Vec::new();
        let _ = routes.push(Route {
            pin: pins::HAPTIC_TRIGGER_GPIO,
            event: None,
            pulse: Some(RoutePulse {
                freq: FrequencyClass::LightTap,
                amplitude: 100,
                repeat_count: 2,
            }),
        });

        Self {
            profile: Profile::Haptic,
            debounce_window_ms: 500,
            routes,
            haptic: Some(HapticConfig {
                high: MotorConfig {
                    channel: ChannelConfig::new(
                        pins::HAPTIC_HIGH_GPIO,
                        0,
                        0,
                        pins::HAPTIC_RESOLUTION_BITS,
                        pins::HAPTIC_HIGH_FREQ_HZ,
                    ),
                    on_time_us: 1_563,
                    off_time_us: 1_563,
                },
                low: MotorConfig {
                    channel: ChannelConfig::new(
                        pins::HAPTIC_LOW_GPIO,
                        1,
                        1,
                        pins::HAPTIC_RESOLUTION_BITS,
                        pins::HAPTIC_LOW_FREQ_HZ,
                    ),
                    on_time_us: 3_125,
                    off_time_us: 3_125,
                },
            }),
            ..Self::base(Profile::Haptic)
        }
    }

    pub fn motion() -> Self {
        let mut routes = heapless::Vec::new();
        for (pin, name) in [
            (pins::MOTION_PRIMARY_GPIO, "motion-1"),
            (pins::MOTION_SECONDARY_GPIO, "motion-2"),
        ] {
            let _ = routes.push(Route {
                pin,
                event: EventName::try_from(name).ok(),
                pulse: None,
            });
        }

        Self {
            debounce_window_ms: 750,
            routes,
            light: Some(ChannelConfig::new(
                pins::LIGHT_GPIO,
                0,
                0,
                pins::LIGHT_RESOLUTION_BITS,
                pins::LIGHT_FREQ_HZ,
            )),
            ..Self::base(Profile::Motion)
        }
    }

    pub fn sentry() -> Self {
        let servo = |gpio, channel| ServoConfig {
            channel: ChannelConfig::new(gpio, 0, channel, pins::SERVO_RESOLUTION_BITS, pins::SERVO_FREQ_HZ),
            max_angle: 90,
            min_pulse_us: 500,
            max_pulse_us: 2_400,
        };
        let beam = |gpio, channel| BeamConfig {
            channel: ChannelConfig::new(gpio, 1, channel, pins::BEAM_RESOLUTION_BITS, pins::BEAM_FREQ_HZ),
            rated_mw: 15,
        };
        let indicator = |gpio, channel| {
            ChannelConfig::new(gpio, 2, channel, pins::INDICATOR_RESOLUTION_BITS, pins::INDICATOR_FREQ_HZ)
        };

        Self {
            sentry: Some(SentryConfig {
                pan: servo(pins::SERVO_PAN_GPIO, 2),
                tilt: servo(pins::SERVO_TILT_GPIO, 3),
                primary: beam(pins::BEAM_PRIMARY_GPIO, 1),
                secondary: beam(pins::BEAM_SECONDARY_GPIO, 0),
                indicator: [
                    indicator(pins::INDICATOR_R_GPIO, 5),
                    indicator(pins::INDICATOR_G_GPIO, 6),
                    indicator(pins::INDICATOR_B_GPIO, 7),
                ],
                token: heapless::String::try_from("change-me").unwrap_or_default(),
            }),
            ..Self::base(Profile::Sentry)
        }
    }

    fn base(profile: Profile) -> Self {
        Self {
            profile,
            debounce_window_ms: 750,
            routes: heapless::Vec::new(),
            notify_host: heapless::String::try_from("10.0.1.2").unwrap_or_default(),
            notify_port: 5058,
            haptic: None,
            light: None,
            sentry: None,
            wifi_ssid: heapless::String::new(),
            wifi_password: heapless::String::new(),
        }
    }

    /// Apply one site-specific setting baked in at build time.
    pub fn apply_override(&mut self, key: &str, value: &str) -> Result<(), &'static str> {
        fn fit<const N: usize>(value: &str) -> Result<heapless::String<N>, &'static str> {
            heapless::String::try_from(value).map_err(|()| "override value too long")
        }
        match key {
            "wifi_ssid" => self.wifi_ssid = fit(value)?,
            "wifi_password" => self.wifi_password = fit(value)?,
            "notify_host" => self.notify_host = fit(value)?,
            "notify_port" => self.notify_port = value.parse().map_err(|_| "notify_port must be a u16")?,
            "token" => match self.sentry.as_mut() {
                Some(_) if value.is_empty() => return Err("token must not be empty"),
                Some(s) => s.token = fit(value)?,
                None => return Err("token override on a node without a sentry"),
            },
            _ => return Err("unknown override key"),
        }
        Ok(())
    }

    /// Build the outbound URL for a routed event name.
    pub fn notify_url(&self, event: &str) -> Option<NotifyUrl> {
        let mut url = NotifyUrl::new();
        write!(url, "http://{}:{}/{}", self.notify_host, self.notify_port, event).ok()?;
        Some(url)
    }

    /// Pins the ISR must watch.
    pub fn monitored_pins(&self) -> heapless::Vec<i32, MAX_MONITORED_PINS> {
        self.routes.iter().map(|r| r.pin).collect()
    }

    /// Every LEDC channel this configuration will claim.
    pub fn channels(&self) -> heapless::Vec<ChannelConfig, 8> {
        let mut out = heapless::Vec::new();
        if let Some(h) = &self.haptic {
            let _ = out.push(h.high.channel);
            let _ = out.push(h.low.channel);
        }
        if let Some(l) = &self.light {
            let _ = out.push(*l);
        }
        if let Some(s) = &self.sentry {
            for ch in [s.pan.channel, s.tilt.channel, s.primary.channel, s.secondary.channel] {
                let _ = out.push(ch);
            }
            for ch in s.indicator {
                let _ = out.push(ch);
            }
        }
        out
    }

    /// Reject configurations the hardware layer cannot honour.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.debounce_window_ms == 0 {
            return Err("debounce_window_ms must be > 0");
        }

        let channels = self.channels();
        for (i, ch) in channels.iter().enumerate() {
            if !(8..=14).contains(&ch.resolution_bits) {
                return Err("resolution_bits must be 8..=14");
            }
            if ch.frequency_hz == 0 {
                return Err("frequency_hz must be > 0");
            }
            for other in &channels[i + 1..] {
                if other.channel == ch.channel {
                    return Err("LEDC channel assigned twice");
                }
                if other.timer == ch.timer
                    && (other.frequency_hz != ch.frequency_hz || other.resolution_bits != ch.resolution_bits)
                {
                    return Err("channels sharing a timer must share frequency and resolution");
                }
            }
        }

        for (i, route) in self.routes.iter().enumerate() {
            if route.event.is_none() && route.pulse.is_none() {
                return Err("route has neither an event nor a pulse");
            }
            if route.pulse.is_some() && self.haptic.is_none() {
                return Err("route pulse requires haptic channels");
            }
            if self.routes[i + 1..].iter().any(|r| r.pin == route.pin) {
                return Err("pin routed twice");
            }
        }

        if let Some(s) = &self.sentry {
            for servo in [&s.pan, &s.tilt] {
                if servo.max_angle <= 0 {
                    return Err("servo max_angle must be > 0");
                }
                if servo.min_pulse_us >= servo.max_pulse_us {
                    return Err("servo min_pulse_us must be below max_pulse_us");
                }
                if servo.max_pulse_us >= servo.channel.period_us() {
                    return Err("servo pulse exceeds PWM period");
                }
            }
            if s.primary.rated_mw == 0 || s.secondary.rated_mw == 0 {
                return Err("beam rated_mw must be > 0");
            }
            if s.token.is_empty() {
                return Err("sentry token must not be empty");
            }
        }

        Ok(())
    }
}
