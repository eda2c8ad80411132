//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to                 |
//! |----------------|--------------------|-----------------------------|
//! | `http_client`  | NotifyPort         | ESP-IDF HTTP client         |
//! | `http_server`  | (command surface)  | ESP-IDF HTTP server         |
//! | `log_sink`     | EventSink          | Serial log output           |
//! | `wifi`         | ConnectivityPort   | ESP-IDF WiFi STA            |
//! | `device_id`    |                    | eFuse MAC                   |
//! | `time`         |                    | ESP32 high-resolution timer |

pub mod device_id;
pub mod http_client;
#[cfg(target_os = "espidf")]
pub mod http_server;
pub mod log_sink;
pub mod time;
pub mod wifi;
