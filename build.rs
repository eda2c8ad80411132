fn main() {
    // Site settings are baked in with option_env!() in main.rs.
    for var in [
        "PULSENODE_PROFILE",
        "PULSENODE_WIFI_SSID",
        "PULSENODE_WIFI_PASSWORD",
        "PULSENODE_NOTIFY_HOST",
        "PULSENODE_NOTIFY_PORT",
        "PULSENODE_TOKEN",
    ] {
        println!("cargo:rerun-if-env-changed={var}");
    }

    // Only the device build needs the ESP-IDF environment; host test builds
    // compile without the espidf feature and skip this step.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
