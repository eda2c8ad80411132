//! Core-pinned thread spawning.
//!
//! Wraps `esp_pthread_set_cfg()` so that `std::thread::spawn` creates a
//! FreeRTOS task pinned to a specific CPU core with explicit priority
//! and stack size.  On non-ESP targets, falls back to a plain thread.
//!
//! `esp_pthread_set_cfg()` applies to the *next* `pthread_create()` from
//! the calling thread, so the config→spawn pair must not be interleaved
//! with other thread creation on the same thread.

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Core {
    /// Core 0 (PRO_CPU): WiFi, lwIP, HTTP server.
    Pro = 0,
    /// Core 1 (APP_CPU): event worker and waveform timing.
    App = 1,
}

/// Worker task parameters.
pub const WORKER_CORE: Core = Core::App;
pub const WORKER_PRIORITY: u8 = 3;
pub const WORKER_STACK_KB: usize = 6;
pub const WORKER_NAME: &str = "pn-worker\0";

/// Spawn a thread pinned to `core`.  `name` must be null-terminated.
#[cfg(target_os = "espidf")]
pub fn spawn_on_core(
    core: Core,
    priority: u8,
    stack_kb: usize,
    name: &'static str,
    f: impl FnOnce() + Send + 'static,
) -> Result<std::thread::JoinHandle<()>, Error> {
    // SAFETY: cfg is a fully-initialised default config; `name` is a
    // 'static null-terminated string that outlives the spawned task.
    unsafe {
        let mut cfg = esp_idf_svc::sys::esp_create_default_pthread_config();
        cfg.pin_to_core = core as i32;
        cfg.prio = i32::from(priority);
        cfg.stack_size = (stack_kb * 1024) as _;
        cfg.thread_name = name.as_ptr().cast();
        if esp_idf_svc::sys::esp_pthread_set_cfg(&cfg) != esp_idf_svc::sys::ESP_OK as i32 {
            return Err(Error::Init("esp_pthread_set_cfg failed"));
        }
    }

    let display_name = name.trim_end_matches('\0');
    log::info!(
        "Spawning '{}' on {:?} (pri={}, stack={}KB)",
        display_name,
        core,
        priority,
        stack_kb
    );

    std::thread::Builder::new()
        .name(display_name.into())
        .spawn(f)
        .map_err(|_| Error::Init("thread creation failed"))
}

/// Simulation fallback: ignores core affinity and priority.
#[cfg(not(target_os = "espidf"))]
pub fn spawn_on_core(
    _core: Core,
    _priority: u8,
    stack_kb: usize,
    name: &'static str,
    f: impl FnOnce() + Send + 'static,
) -> Result<std::thread::JoinHandle<()>, Error> {
    let display_name = name.trim_end_matches('\0');
    log::info!("Spawning '{}' (sim, stack={}KB)", display_name, stack_kb);

    std::thread::Builder::new()
        .name(display_name.into())
        .stack_size(stack_kb.max(64) * 1024)
        .spawn(f)
        .map_err(|_| Error::Init("thread creation failed"))
}
