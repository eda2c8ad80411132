//! One-shot GPIO input and interrupt setup for the event pipeline.
//!
//! Configures the monitored pins as pulled-down inputs with rising-edge
//! interrupts and routes every edge into the static [`EventPipeline`].
//! Called once from `main()` after the worker task has been spawned.
//!
//! ```text
//!   GPIO edge ──▶ edge_isr(pin) ──▶ EventPipeline::on_rising_edge
//!                                        │ Accepted
//!                                        ▼
//!                                  Notifier::notify_and_yield ──▶ worker
//! ```

use std::sync::OnceLock;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;
#[cfg(target_os = "espidf")]
use log::info;

use crate::pipeline::EventPipeline;

// ── Error type ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    IsrInstallFailed(i32),
    HandlerAddFailed(i32),
    AlreadyAttached,
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (rc={})", rc),
            Self::HandlerAddFailed(pin) => write!(f, "ISR handler add failed on gpio{}", pin),
            Self::AlreadyAttached => write!(f, "edge ISR already attached"),
        }
    }
}

impl std::error::Error for HwInitError {}

impl From<HwInitError> for crate::error::Error {
    fn from(_: HwInitError) -> Self {
        Self::Init("GPIO/ISR setup failed")
    }
}

/// Pipeline the ISR feeds.  Set once, before interrupts are enabled.
static EDGE_PIPELINE: OnceLock<&'static EventPipeline> = OnceLock::new();

#[cfg(target_os = "espidf")]
static WORKER_NOTIFIER: OnceLock<std::sync::Arc<esp_idf_svc::hal::task::notification::Notifier>> =
    OnceLock::new();

/// Register the worker's wake handle.  Called from the worker task itself.
#[cfg(target_os = "espidf")]
pub fn set_worker_notifier(notifier: std::sync::Arc<esp_idf_svc::hal::task::notification::Notifier>) {
    let _ = WORKER_NOTIFIER.set(notifier);
}

// ── GPIO inputs ───────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn init_edge_inputs(pins: &[i32]) -> Result<(), HwInitError> {
    for &pin in pins {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_ENABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_POSEDGE,
        };
        // SAFETY: single-threaded init path; cfg is fully initialised.
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
    }
    info!("hw_init: {} edge input(s) configured", pins.len());
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_edge_inputs(pins: &[i32]) -> Result<(), HwInitError> {
    log::info!("hw_init(sim): {} edge input(s) skipped", pins.len());
    Ok(())
}

// ── ISR ───────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe extern "C" fn edge_isr(arg: *mut core::ffi::c_void) {
    let pin = arg as usize as i32;
    let now_ms = crate::adapters::time::uptime_ms();
    let Some(pipeline) = EDGE_PIPELINE.get() else {
        return;
    };
    if pipeline.on_rising_edge(pin, now_ms) == crate::pipeline::EdgeOutcome::Accepted {
        if let Some(notifier) = WORKER_NOTIFIER.get() {
            // SAFETY: notify_and_yield is the ISR-safe variant.
            unsafe {
                notifier.notify_and_yield(core::num::NonZeroU32::MIN);
            }
        }
    }
}

/// Install the GPIO ISR service and hook every monitored pin to `pipeline`.
#[cfg(target_os = "espidf")]
pub fn attach_edge_isr(pipeline: &'static EventPipeline) -> Result<(), HwInitError> {
    EDGE_PIPELINE
        .set(pipeline)
        .map_err(|_| HwInitError::AlreadyAttached)?;

    // SAFETY: gpio_install_isr_service tolerates a second call
    // (ESP_ERR_INVALID_STATE).  The handler only touches the lock-free
    // pipeline and the task notifier.
    unsafe {
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK as i32 && ret != ESP_ERR_INVALID_STATE as i32 {
            return Err(HwInitError::IsrInstallFailed(ret));
        }
        for pin in pipeline.monitored_pins() {
            let arg = pin as usize as *mut core::ffi::c_void;
            if gpio_isr_handler_add(pin, Some(edge_isr), arg) != ESP_OK as i32 {
                return Err(HwInitError::HandlerAddFailed(pin));
            }
            gpio_intr_enable(pin);
        }
    }
    info!("hw_init: edge ISR attached");
    Ok(())
}

/// Simulation: remembers the pipeline so host code can inject edges.
#[cfg(not(target_os = "espidf"))]
pub fn attach_edge_isr(pipeline: &'static EventPipeline) -> Result<(), HwInitError> {
    EDGE_PIPELINE
        .set(pipeline)
        .map_err(|_| HwInitError::AlreadyAttached)?;
    log::info!("hw_init(sim): edge ISR attached");
    Ok(())
}

/// Simulation: deliver one rising edge as the ISR would.
#[cfg(not(target_os = "espidf"))]
pub fn inject_edge(pin: i32, now_ms: u32) -> Option<crate::pipeline::EdgeOutcome> {
    EDGE_PIPELINE.get().map(|p| p.on_rising_edge(pin, now_ms))
}
