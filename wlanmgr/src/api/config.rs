use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::types::constants::{supplicant, timeouts};

/// Runtime configuration of the plugin.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use wlanmgr::WifiConfig;
///
/// let config = WifiConfig::default()
///     .with_cleanup_grace(Duration::from_secs(15))
///     .with_scan_on_enable(false);
///
/// assert_eq!(config.cleanup_grace, Duration::from_secs(15));
/// assert!(!config.scan_on_enable);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WifiConfig {
    /// How long networks from the previous scan cycle may go unconfirmed
    /// before they are retired.
    pub cleanup_grace: Duration,
    /// Whether enabling a device immediately requests a scan.
    pub scan_on_enable: bool,
    /// Driver list used when asking wpa_supplicant to create an interface.
    pub supplicant_driver: String,
    /// Root of the sysfs network class directory.
    pub sysfs_root: PathBuf,
}

impl Default for WifiConfig {
    fn default() -> Self {
        Self {
            cleanup_grace: timeouts::cleanup_grace(),
            scan_on_enable: true,
            supplicant_driver: supplicant::DEFAULT_DRIVER.to_string(),
            sysfs_root: PathBuf::from("/sys/class/net"),
        }
    }
}

impl WifiConfig {
    /// Sets the grace period for deferred cleanup.
    #[must_use]
    pub fn with_cleanup_grace(mut self, grace: Duration) -> Self {
        self.cleanup_grace = grace;
        self
    }

    /// Sets whether enabling a device triggers a scan.
    #[must_use]
    pub fn with_scan_on_enable(mut self, scan: bool) -> Self {
        self.scan_on_enable = scan;
        self
    }

    /// Sets the wpa_supplicant driver list.
    #[must_use]
    pub fn with_supplicant_driver(mut self, driver: impl Into<String>) -> Self {
        self.supplicant_driver = driver.into();
        self
    }

    /// Sets the sysfs root used by the default link layer.
    #[must_use]
    pub fn with_sysfs_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.sysfs_root = root.into();
        self
    }
}
