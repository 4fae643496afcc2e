//! wpa_supplicant interface proxy.

use std::collections::HashMap;
use zbus::{Result, proxy};
use zvariant::OwnedObjectPath;

/// Proxy for one interface managed by wpa_supplicant.
///
/// # Signals
///
/// `ScanDone` is emitted when a scan finishes; the `BSSs` property then
/// lists every BSS currently known to the interface.
#[proxy(
    interface = "fi.w1.wpa_supplicant1.Interface",
    default_service = "fi.w1.wpa_supplicant1"
)]
pub trait WpaInterface {
    /// Triggers a scan. `Type` (`"active"` or `"passive"`) is required.
    fn scan(&self, args: HashMap<&str, zvariant::Value<'_>>) -> Result<()>;

    /// Adds a network block and returns its object path.
    fn add_network(&self, args: HashMap<&str, zvariant::Value<'_>>) -> Result<OwnedObjectPath>;

    /// Selects a network block, disabling all others.
    fn select_network(&self, path: OwnedObjectPath) -> Result<()>;

    /// Removes every configured network block.
    fn remove_all_networks(&self) -> Result<()>;

    /// Disassociates from the current BSS.
    fn disconnect(&self) -> Result<()>;

    /// Emitted when a scan completes.
    #[zbus(signal)]
    fn scan_done(&self, success: bool);

    /// Current interface state (e.g., "completed", "disconnected").
    #[zbus(property)]
    fn state(&self) -> Result<String>;

    /// Object paths of all BSSs known to the interface.
    #[zbus(property, name = "BSSs")]
    fn bsss(&self) -> Result<Vec<OwnedObjectPath>>;

    /// Name of the network interface (e.g., "wlan0").
    #[zbus(property)]
    fn ifname(&self) -> Result<String>;
}
