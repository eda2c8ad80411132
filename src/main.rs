//! PulseNode firmware: main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  LedcPwm         LogEventSink   HttpNotifier    WifiLink        │
//! │  (PwmPort)       (EventSink)    (NotifyPort)    (Connectivity) │
//! │  edge ISR ──▶ EventPipeline     http_server ──▶ CommandService │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │  Worker (routes)  ·  HapticEngine  ·  Sentry / Light   │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Startup order: config → actuators (fatal on failure) → network →
//! worker task → edge interrupts → command surface.
#![deny(unused_must_use)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::{BLOCK, Ets};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::task::notification::Notification;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::{info, warn};

use pulsenode::actuators::{Beam, HapticChannel, Light, Sentry, Servo};
use pulsenode::adapters::http_client::{EspHttpPost, HttpNotifier};
use pulsenode::adapters::log_sink::LogEventSink;
use pulsenode::adapters::wifi::WifiLink;
use pulsenode::adapters::{device_id, http_server, time};
use pulsenode::app::events::NodeEvent;
use pulsenode::app::ports::{ConnectivityPort, EventSink};
use pulsenode::app::service::CommandService;
use pulsenode::config::{NodeConfig, Profile};
use pulsenode::drivers::hw_init;
use pulsenode::drivers::indicator::{Colour, Indicator};
use pulsenode::drivers::pwm::LedcPwm;
use pulsenode::drivers::task_pin::{self, spawn_on_core};
use pulsenode::error::Error;
use pulsenode::pipeline::{EventPipeline, Worker};
use pulsenode::waveform::HapticEngine;

type SharedEngine = Arc<Mutex<HapticEngine<LedcPwm, Ets>>>;

const STATS_INTERVAL: Duration = Duration::from_secs(60);

fn build_config() -> Result<NodeConfig> {
    let profile = option_env!("PULSENODE_PROFILE")
        .and_then(Profile::from_name)
        .unwrap_or(Profile::Motion);
    let mut config = NodeConfig::for_profile(profile);

    for (key, value) in [
        ("wifi_ssid", option_env!("PULSENODE_WIFI_SSID")),
        ("wifi_password", option_env!("PULSENODE_WIFI_PASSWORD")),
        ("notify_host", option_env!("PULSENODE_NOTIFY_HOST")),
        ("notify_port", option_env!("PULSENODE_NOTIFY_PORT")),
        ("token", option_env!("PULSENODE_TOKEN")),
    ] {
        if let Some(value) = value {
            config.apply_override(key, value).map_err(Error::Config)?;
        }
    }
    config.validate().map_err(Error::Config)?;
    Ok(config)
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("PulseNode v{}", env!("CARGO_PKG_VERSION"));

    let config = build_config()?;
    let mac = device_id::read_mac();
    info!(
        "Profile {:?} | device {} ({})",
        config.profile,
        device_id::device_id(&mac),
        device_id::hostname(&mac)
    );

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take().ok();
    let mut sink = LogEventSink::new();

    // ── 2. Actuators (any failure here is fatal) ──────────────
    let mut indicator = match &config.sentry {
        Some(s) => {
            let [r, g, b] = s.indicator;
            let mut i = Indicator::new(
                LedcPwm::configure(r)?,
                LedcPwm::configure(g)?,
                LedcPwm::configure(b)?,
            );
            i.set(Colour::Red)?;
            Some(i)
        }
        None => None,
    };

    let haptics: Option<SharedEngine> = match &config.haptic {
        Some(h) => Some(Arc::new(Mutex::new(HapticEngine::new(
            HapticChannel::new(LedcPwm::configure(h.high.channel)?, &h.high),
            HapticChannel::new(LedcPwm::configure(h.low.channel)?, &h.low),
            Ets,
        )))),
        None => None,
    };

    let mut service: CommandService<LedcPwm, SharedEngine> =
        CommandService::new(config.profile, device_id::mac_string(&mac));
    if let Some(engine) = &haptics {
        service = service.with_haptics(Arc::clone(engine));
    }
    if let Some(light) = config.light {
        service = service.with_light(Light::new(LedcPwm::configure(light)?));
    }
    if let Some(s) = &config.sentry {
        let mut sentry = Sentry::new(
            Servo::new(LedcPwm::configure(s.pan.channel)?, &s.pan),
            Servo::new(LedcPwm::configure(s.tilt.channel)?, &s.tilt),
            Beam::new(LedcPwm::configure(s.primary.channel)?, &s.primary),
            Beam::new(LedcPwm::configure(s.secondary.channel)?, &s.secondary),
        );
        sentry.home()?;
        service = service.with_sentry(sentry, &s.token);
    }

    // ── 3. Network ────────────────────────────────────────────
    let wifi = match WifiLink::connect(
        peripherals.modem,
        sysloop,
        nvs,
        &config.wifi_ssid,
        &config.wifi_password,
    ) {
        Ok(link) => {
            sink.emit(&NodeEvent::Connectivity(true));
            if let Some(i) = indicator.as_mut() {
                i.set(Colour::Green)?;
            }
            Some(link)
        }
        Err(e) => {
            warn!("Network unavailable ({}); notifications and commands disabled", e);
            sink.emit(&NodeEvent::Connectivity(false));
            None
        }
    };

    // ── 4. Event pipeline + worker ────────────────────────────
    let pipeline: Option<&'static EventPipeline> = if config.routes.is_empty() {
        None
    } else {
        let pins = config.monitored_pins();
        let pipeline: &'static EventPipeline = Box::leak(Box::new(EventPipeline::new(
            &pins,
            config.debounce_window_ms,
            time::uptime_ms(),
        )));

        let worker_config = config.clone();
        let pulser = haptics.clone();
        spawn_on_core(
            task_pin::WORKER_CORE,
            task_pin::WORKER_PRIORITY,
            task_pin::WORKER_STACK_KB,
            task_pin::WORKER_NAME,
            move || {
                let notification = Notification::new();
                hw_init::set_worker_notifier(notification.notifier());
                let worker = Worker::new(
                    pipeline,
                    &worker_config,
                    HttpNotifier::new(EspHttpPost::new()),
                    pulser,
                    LogEventSink::new(),
                );
                worker.run(|| {
                    notification.wait(BLOCK);
                })
            },
        )?;

        hw_init::init_edge_inputs(&pins)?;
        hw_init::attach_edge_isr(pipeline)?;
        Some(pipeline)
    };

    // ── 5. Command surface ────────────────────────────────────
    let service = Arc::new(Mutex::new(service));
    let _server = match &wifi {
        Some(_) => Some(http_server::start(Arc::clone(&service))?),
        None => None,
    };

    sink.emit(&NodeEvent::Started(config.profile));

    // ── 6. Housekeeping loop ──────────────────────────────────
    let mut was_connected = wifi.as_ref().is_some_and(ConnectivityPort::is_connected);
    loop {
        std::thread::sleep(STATS_INTERVAL);
        if let Some(p) = pipeline {
            sink.emit(&NodeEvent::Stats(p.stats()));
        }
        let connected = wifi.as_ref().is_some_and(ConnectivityPort::is_connected);
        if connected != was_connected {
            sink.emit(&NodeEvent::Connectivity(connected));
            if let Some(i) = indicator.as_mut() {
                let _ = i.set(if connected { Colour::Green } else { Colour::Red });
            }
            was_connected = connected;
        }
    }
}
