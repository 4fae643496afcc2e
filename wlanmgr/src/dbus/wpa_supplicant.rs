//! wpa_supplicant root object proxy.

use std::collections::HashMap;
use zbus::{Result, proxy};
use zvariant::OwnedObjectPath;

/// Proxy for the wpa_supplicant root interface.
///
/// Creates, looks up and removes per-interface objects.
#[proxy(
    interface = "fi.w1.wpa_supplicant1",
    default_service = "fi.w1.wpa_supplicant1",
    default_path = "/fi/w1/wpa_supplicant1"
)]
pub trait WpaSupplicant {
    /// Registers a network interface with wpa_supplicant.
    ///
    /// Recognized keys: `Ifname` (required), `Driver`, `ConfigFile`.
    fn create_interface(
        &self,
        args: HashMap<&str, zvariant::Value<'_>>,
    ) -> Result<OwnedObjectPath>;

    /// Deregisters an interface.
    fn remove_interface(&self, path: OwnedObjectPath) -> Result<()>;

    /// Returns the object of an already registered interface.
    fn get_interface(&self, ifname: &str) -> Result<OwnedObjectPath>;
}
