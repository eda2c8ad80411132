//! Device identity derived from the ESP32 factory MAC address.
//!
//! - `mac_string` is the lower-case colon form reported in the sentry
//!   status document (`de:ad:be:ef:ca:fe`).
//! - `device_id` is the short `PN-XXYYZZ` tag used in log lines.
//! - `hostname` is the DHCP hostname (`pulsenode-xxyyzz`).

use core::fmt::Write;

pub type MacAddress = [u8; 6];
pub type MacString = heapless::String<18>;
pub type DeviceIdString = heapless::String<16>;

/// Read the factory MAC address from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    // SAFETY: the buffer is exactly the 6 bytes the call writes.
    unsafe {
        esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Simulation: returns a deterministic fake MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}

pub fn mac_string(mac: &MacAddress) -> MacString {
    let mut s = MacString::new();
    let _ = write!(
        s,
        "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
        mac[0], mac[1], mac[2], mac[3], mac[4], mac[5]
    );
    s
}

pub fn device_id(mac: &MacAddress) -> DeviceIdString {
    let mut id = DeviceIdString::new();
    let _ = write!(id, "PN-{:02X}{:02X}{:02X}", mac[3], mac[4], mac[5]);
    id
}

pub fn hostname(mac: &MacAddress) -> heapless::String<24> {
    let mut name = heapless::String::<24>::new();
    let _ = write!(name, "pulsenode-{:02x}{:02x}{:02x}", mac[3], mac[4], mac[5]);
    name
}
