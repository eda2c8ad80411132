//! Mock hardware for integration tests.
//!
//! Every PWM write and every delay lands on one shared [`Timeline`], so
//! tests can assert on the exact write/delay sequence and on simulated
//! elapsed time without touching LEDC registers or sleeping.

use std::sync::{Arc, Mutex, PoisonError};

use embedded_hal::delay::DelayNs;
use pulsenode::app::events::NodeEvent;
use pulsenode::app::ports::{EventSink, NotifyOutcome, NotifyPort, PulseSink, PwmPort};
use pulsenode::config::ChannelConfig;
use pulsenode::error::{ActuatorError, CommsError, Error};
use pulsenode::waveform::{FrequencyClass, PulseReport, WaveformClass};

// ── Timeline ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Write { channel: u8, duty: u32, at_us: u64 },
    Delay { us: u32 },
}

#[derive(Debug, Default)]
pub struct TimelineInner {
    pub now_us: u64,
    pub steps: Vec<Step>,
}

#[derive(Debug, Default, Clone)]
pub struct Timeline(Arc<Mutex<TimelineInner>>);

#[allow(dead_code)]
impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut TimelineInner) -> R) -> R {
        f(&mut self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn now_us(&self) -> u64 {
        self.with(|t| t.now_us)
    }

    pub fn steps(&self) -> Vec<Step> {
        self.with(|t| t.steps.clone())
    }

    /// Duties written to `channel`, in order.
    pub fn writes(&self, channel: u8) -> Vec<u32> {
        self.with(|t| {
            t.steps
                .iter()
                .filter_map(|s| match *s {
                    Step::Write { channel: c, duty, .. } if c == channel => Some(duty),
                    _ => None,
                })
                .collect()
        })
    }

    pub fn write_count(&self) -> usize {
        self.with(|t| t.steps.iter().filter(|s| matches!(s, Step::Write { .. })).count())
    }

    pub fn delays(&self) -> Vec<u32> {
        self.with(|t| {
            t.steps
                .iter()
                .filter_map(|s| match *s {
                    Step::Delay { us } => Some(us),
                    Step::Write { .. } => None,
                })
                .collect()
        })
    }

    pub fn clear(&self) {
        self.with(|t| t.steps.clear());
    }
}

// ── MockPwm ───────────────────────────────────────────────────

pub struct MockPwm {
    config: ChannelConfig,
    duty: u32,
    timeline: Timeline,
    /// Zero-based index of the one write that fails.
    fail_on: Option<usize>,
    attempts: usize,
}

#[allow(dead_code)]
impl MockPwm {
    pub fn new(config: ChannelConfig, timeline: &Timeline) -> Self {
        Self {
            config,
            duty: 0,
            timeline: timeline.clone(),
            fail_on: None,
            attempts: 0,
        }
    }

    pub fn failing_on(mut self, n: usize) -> Self {
        self.fail_on = Some(n);
        self
    }
}

impl PwmPort for MockPwm {
    fn config(&self) -> &ChannelConfig {
        &self.config
    }

    fn write_duty(&mut self, duty: u32) -> Result<(), ActuatorError> {
        assert!(duty <= self.config.max_duty(), "duty {duty} above max");
        let attempt = self.attempts;
        self.attempts += 1;
        if self.fail_on == Some(attempt) {
            return Err(ActuatorError::PwmWriteFailed);
        }
        self.duty = duty;
        let channel = self.config.channel;
        self.timeline.with(|t| {
            let at_us = t.now_us;
            t.steps.push(Step::Write { channel, duty, at_us });
        });
        Ok(())
    }

    fn duty(&self) -> u32 {
        self.duty
    }
}

// ── MockDelay ─────────────────────────────────────────────────

/// Advances simulated time instead of sleeping.
pub struct MockDelay {
    timeline: Timeline,
}

impl MockDelay {
    pub fn new(timeline: &Timeline) -> Self {
        Self {
            timeline: timeline.clone(),
        }
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.delay_us(ns / 1_000);
    }

    fn delay_us(&mut self, us: u32) {
        self.timeline.with(|t| {
            t.now_us += u64::from(us);
            t.steps.push(Step::Delay { us });
        });
    }
}

// ── Call-order log shared by the notifier and pulser mocks ────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Pulse(FrequencyClass),
    Notify(String),
}

pub type ActionLog = Arc<Mutex<Vec<Action>>>;

pub fn action_log() -> ActionLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn actions(log: &ActionLog) -> Vec<Action> {
    log.lock().unwrap_or_else(PoisonError::into_inner).clone()
}

// ── MockNotifier ──────────────────────────────────────────────

pub struct MockNotifier {
    pub log: ActionLog,
    pub outcome: NotifyOutcome,
}

#[allow(dead_code)]
impl MockNotifier {
    pub fn ok(log: &ActionLog) -> Self {
        Self {
            log: Arc::clone(log),
            outcome: NotifyOutcome::Delivered {
                status: 200,
                content_length: Some(0),
            },
        }
    }

    pub fn failing(log: &ActionLog) -> Self {
        Self {
            log: Arc::clone(log),
            outcome: NotifyOutcome::Failed(CommsError::RequestFailed),
        }
    }
}

impl NotifyPort for MockNotifier {
    fn notify(&mut self, url: &str) -> NotifyOutcome {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Action::Notify(url.to_string()));
        self.outcome
    }
}

// ── MockPulser ────────────────────────────────────────────────

pub struct MockPulser {
    pub log: ActionLog,
}

impl PulseSink for MockPulser {
    fn pulse(&mut self, freq: FrequencyClass, _amplitude: u32, repeat_count: u32) -> Result<PulseReport, Error> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Action::Pulse(freq));
        Ok(PulseReport {
            class: WaveformClass::Square,
            peak_duty: 0,
            writes: 2 * repeat_count,
            repeat_count,
        })
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<NodeEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&NodeEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &NodeEvent) {
        self.events.push(event.clone());
    }
}
