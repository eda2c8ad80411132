//! Node core: commands, events, ports and the command service.
//!
//! Everything here talks to hardware only through the **port traits** in
//! [`ports`], so the whole layer runs on the host against in-memory
//! adapters.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
pub mod status;
