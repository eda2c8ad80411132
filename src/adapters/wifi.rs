//! WiFi station-mode adapter.
//!
//! Implements [`ConnectivityPort`].  The node joins one configured network
//! at startup; there is no provisioning flow and no background reconnect.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::wifi::BlockingWifi` around `EspWifi`.
//! - **all other targets**: in-memory simulation for host-side tests.

use log::{info, warn};

use crate::app::ports::ConnectivityPort;
use crate::error::CommsError;

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

/// SSID must be 1-32 printable ASCII bytes.
pub fn validate_ssid(ssid: &str) -> Result<(), &'static str> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err("SSID must be 1-32 printable ASCII bytes");
    }
    Ok(())
}

/// Empty for an open network, otherwise 8-64 bytes (WPA2).
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.is_empty() || (8..=64).contains(&password.len()) {
        Ok(())
    } else {
        Err("password must be empty or 8-64 bytes")
    }
}

// ───────────────────────────────────────────────────────────────
// Device link
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub struct WifiLink {
    wifi: esp_idf_svc::wifi::BlockingWifi<esp_idf_svc::wifi::EspWifi<'static>>,
}

#[cfg(target_os = "espidf")]
impl WifiLink {
    /// Bring the station up and block until the interface has an address.
    pub fn connect(
        modem: esp_idf_svc::hal::modem::Modem,
        sysloop: esp_idf_svc::eventloop::EspSystemEventLoop,
        nvs: Option<esp_idf_svc::nvs::EspDefaultNvsPartition>,
        ssid: &str,
        password: &str,
    ) -> Result<Self, CommsError> {
        use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};

        validate_ssid(ssid).map_err(|_| CommsError::WifiConnectFailed)?;
        validate_password(password).map_err(|_| CommsError::WifiConnectFailed)?;

        let fail = |e: esp_idf_svc::sys::EspError| {
            warn!("wifi: {:?}", e);
            CommsError::WifiConnectFailed
        };

        let esp_wifi = EspWifi::new(modem, sysloop.clone(), nvs).map_err(fail)?;
        let mut wifi = BlockingWifi::wrap(esp_wifi, sysloop).map_err(fail)?;

        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid: ssid.try_into().map_err(|_| CommsError::WifiConnectFailed)?,
            password: password.try_into().map_err(|_| CommsError::WifiConnectFailed)?,
            auth_method: if password.is_empty() {
                AuthMethod::None
            } else {
                AuthMethod::WPA2Personal
            },
            ..Default::default()
        }))
        .map_err(fail)?;

        wifi.start().map_err(fail)?;
        info!("wifi: connecting to '{}'", ssid);
        wifi.connect().map_err(fail)?;
        wifi.wait_netif_up().map_err(fail)?;

        if let Ok(ip) = wifi.wifi().sta_netif().get_ip_info() {
            info!("wifi: up, ip={}", ip.ip);
        }
        Ok(Self { wifi })
    }
}

#[cfg(target_os = "espidf")]
impl ConnectivityPort for WifiLink {
    fn is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }
}

/// Host stand-in: "connects" whenever the credentials are valid.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug)]
pub struct WifiLink {
    connected: bool,
}

#[cfg(not(target_os = "espidf"))]
impl WifiLink {
    pub fn connect(ssid: &str, password: &str) -> Result<Self, CommsError> {
        if validate_ssid(ssid).is_err() || validate_password(password).is_err() {
            warn!("wifi(sim): invalid credentials");
            return Err(CommsError::WifiConnectFailed);
        }
        info!("wifi(sim): connected to '{}'", ssid);
        Ok(Self { connected: true })
    }
}

#[cfg(not(target_os = "espidf"))]
impl ConnectivityPort for WifiLink {
    fn is_connected(&self) -> bool {
        self.connected
    }
}
