//! wpa_supplicant BSS proxy.

use std::collections::HashMap;
use zbus::{Result, proxy};
use zvariant::OwnedValue;

/// Proxy for one BSS seen by an interface.
#[proxy(
    interface = "fi.w1.wpa_supplicant1.BSS",
    default_service = "fi.w1.wpa_supplicant1"
)]
pub trait WpaBss {
    /// SSID as raw bytes (may not be valid UTF-8, empty when hidden).
    #[zbus(property, name = "SSID")]
    fn ssid(&self) -> Result<Vec<u8>>;

    /// Privacy bit from the capability field.
    #[zbus(property)]
    fn privacy(&self) -> Result<bool>;

    /// WPA information element, parsed. `KeyMgmt` is empty when absent.
    #[zbus(property, name = "WPA")]
    fn wpa(&self) -> Result<HashMap<String, OwnedValue>>;

    /// RSN information element, parsed. `KeyMgmt` is empty when absent.
    #[zbus(property, name = "RSN")]
    fn rsn(&self) -> Result<HashMap<String, OwnedValue>>;

    /// Signal strength in dBm.
    #[zbus(property)]
    fn signal(&self) -> Result<i16>;

    /// Frequency in MHz.
    #[zbus(property)]
    fn frequency(&self) -> Result<u16>;
}
