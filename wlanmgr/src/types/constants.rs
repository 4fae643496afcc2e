//! Constants for the supplicant D-Bus interface, link layer and element properties.
//!
//! Numeric and string values used across the crate are grouped by the
//! collaborator they belong to.

/// wpa_supplicant D-Bus names.
pub mod supplicant {
    pub const SERVICE: &str = "fi.w1.wpa_supplicant1";

    /// Driver list handed to `CreateInterface` when none is configured.
    pub const DEFAULT_DRIVER: &str = "nl80211,wext";
}

/// Link-layer hardware types (`ARPHRD_*`).
pub mod link_type {
    /// Wireless interfaces present as Ethernet-class at this layer.
    pub const ETHER: u16 = 1;
}

/// rtnetlink multicast groups (`RTNLGRP_*`).
pub mod rtnl_group {
    pub const LINK: u32 = 1;
}

/// Names of the properties published on elements.
pub mod property {
    pub const NAME: &str = "Name";
    pub const INTERFACE: &str = "Interface";
    pub const SSID: &str = "WiFi.SSID";
    pub const SECURITY: &str = "WiFi.Security";
    pub const STRENGTH: &str = "WiFi.Strength";
    pub const PASSPHRASE: &str = "WiFi.Passphrase";
}

/// Prefix for device element names derived from the hardware address.
pub const DEVICE_IDENT_PREFIX: &str = "dev_";

/// Timeout constants.
pub mod timeouts {
    use std::time::Duration;

    /// Grace period before unconfirmed networks are retired (8 seconds).
    const CLEANUP_PENDING_SECS: u64 = 8;

    /// Returns the default cleanup grace period.
    pub fn cleanup_grace() -> Duration {
        Duration::from_secs(CLEANUP_PENDING_SECS)
    }
}

/// Signal conversion constants
pub mod signal {
    /// dBm at or below which quality is reported as 0.
    pub const NOISE_FLOOR_DBM: i16 = -100;
    /// dBm at or above which quality is reported as 100.
    pub const SATURATION_DBM: i16 = -50;
}
