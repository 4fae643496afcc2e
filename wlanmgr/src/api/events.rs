//! Events, commands and the handle used to feed the event loop.
//!
//! Every mutation of device state is serialized through one channel:
//! link-layer notifications, supplicant notifications, cleanup timer
//! expiries and consumer commands all arrive as [`WifiEvent`]s and are
//! handled in arrival order by [`WifiPlugin`](crate::WifiPlugin).

use tokio::sync::{mpsc, oneshot};

use crate::api::elements::ElementId;
use crate::api::models::{DeviceInfo, NetworkInfo, ScanResult, SupplicantState, WifiError};
use crate::Result;

/// Link-layer add/remove notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// A link appeared or changed.
    Added {
        index: i32,
        /// Hardware type (`ARPHRD_*`).
        link_type: u16,
    },
    /// A link went away.
    Removed { index: i32 },
}

/// A link as seen by an initial enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkInfo {
    pub index: i32,
    pub link_type: u16,
    pub name: String,
}

/// Notification delivered by the authentication service for one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupplicantEvent {
    /// The interface state changed.
    StateChanged(SupplicantState),
    /// A new batch of scan results is about to be delivered.
    ResultsCleared,
    /// One network seen by the current scan.
    NetworkObserved(ScanResult),
}

/// Availability of the authentication service on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceEvent {
    Appeared,
    Vanished,
}

type Reply<T> = oneshot::Sender<Result<T>>;

/// Consumer request answered by the event loop.
#[derive(Debug)]
pub(crate) enum Command {
    EnableDevice { index: i32, reply: Reply<()> },
    DisableDevice { index: i32, reply: Reply<()> },
    UpdateDevice { index: i32, reply: Reply<()> },
    EnableNetwork { network: ElementId, reply: Reply<()> },
    DisableNetwork { network: ElementId, reply: Reply<()> },
    SetPassphrase {
        network: ElementId,
        passphrase: String,
        reply: Reply<()>,
    },
    Devices { reply: Reply<Vec<DeviceInfo>> },
    Networks { index: i32, reply: Reply<Vec<NetworkInfo>> },
    Shutdown { reply: Reply<()> },
}

#[derive(Debug)]
pub(crate) enum WifiEvent {
    Link(LinkEvent),
    Supplicant { index: i32, event: SupplicantEvent },
    /// A complete scan cycle, handled as one unit.
    ScanResults { index: i32, results: Vec<ScanResult> },
    Service(ServiceEvent),
    CleanupDue { index: i32, token: u64 },
    Command(Command),
}

/// Receiving half of the event channel, consumed by the plugin.
#[derive(Debug)]
pub struct EventReceiver {
    pub(crate) rx: mpsc::UnboundedReceiver<WifiEvent>,
}

/// Creates the event channel shared by the plugin and its collaborators.
///
/// The handle is cloned into every event source (supplicant backend,
/// link monitor) and into consumers that issue commands.
pub fn channel() -> (WifiHandle, EventReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (WifiHandle { tx }, EventReceiver { rx })
}

/// Cloneable sender into the event loop.
///
/// # Example
///
/// ```no_run
/// use wlanmgr::{WifiConfig, WifiPlugin};
///
/// # async fn example() -> wlanmgr::Result<()> {
/// let mut plugin = WifiPlugin::system(WifiConfig::default()).await?;
/// let handle = plugin.handle();
/// tokio::spawn(async move { plugin.run().await });
///
/// for device in handle.devices().await? {
///     handle.enable_device(device.index).await?;
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct WifiHandle {
    tx: mpsc::UnboundedSender<WifiEvent>,
}

impl WifiHandle {
    pub(crate) fn send(&self, event: WifiEvent) -> Result<()> {
        self.tx.send(event).map_err(|_| WifiError::Stopped)
    }

    /// Delivers a link-layer notification.
    pub fn link(&self, event: LinkEvent) -> Result<()> {
        self.send(WifiEvent::Link(event))
    }

    /// Delivers a supplicant notification for the device with `index`.
    pub fn supplicant(&self, index: i32, event: SupplicantEvent) -> Result<()> {
        self.send(WifiEvent::Supplicant { index, event })
    }

    /// Delivers a complete scan cycle for the device with `index`.
    ///
    /// The loop begins the cycle and observes every result without
    /// handling anything in between, so a cleanup expiry cannot land
    /// halfway through the cycle.
    pub fn scan_results(&self, index: i32, results: Vec<ScanResult>) -> Result<()> {
        self.send(WifiEvent::ScanResults { index, results })
    }

    /// Delivers a change in supplicant availability.
    pub fn service(&self, event: ServiceEvent) -> Result<()> {
        self.send(WifiEvent::Service(event))
    }

    async fn request<T>(&self, build: impl FnOnce(Reply<T>) -> Command) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.send(WifiEvent::Command(build(reply)))?;
        rx.await.map_err(|_| WifiError::Stopped)?
    }

    /// Starts the supplicant session for a device and triggers a scan.
    pub async fn enable_device(&self, index: i32) -> Result<()> {
        self.request(|reply| Command::EnableDevice { index, reply })
            .await
    }

    /// Stops the supplicant session and releases every network of the device.
    pub async fn disable_device(&self, index: i32) -> Result<()> {
        self.request(|reply| Command::DisableDevice { index, reply })
            .await
    }

    /// Requests a fresh scan.
    pub async fn update_device(&self, index: i32) -> Result<()> {
        self.request(|reply| Command::UpdateDevice { index, reply })
            .await
    }

    /// Makes `network` the device's target and issues a connect request.
    ///
    /// # Errors
    ///
    /// Returns `WifiError::Busy` if the device is already connected and
    /// `WifiError::MissingProperty` if the network lacks its name or SSID.
    pub async fn enable_network(&self, network: ElementId) -> Result<()> {
        self.request(|reply| Command::EnableNetwork { network, reply })
            .await
    }

    /// Drops the address configuration and disconnects.
    pub async fn disable_network(&self, network: ElementId) -> Result<()> {
        self.request(|reply| Command::DisableNetwork { network, reply })
            .await
    }

    /// Stores the passphrase used by the next connect to `network`.
    pub async fn set_passphrase(&self, network: ElementId, passphrase: &str) -> Result<()> {
        let passphrase = passphrase.to_string();
        self.request(|reply| Command::SetPassphrase {
            network,
            passphrase,
            reply,
        })
        .await
    }

    /// Lists tracked devices.
    pub async fn devices(&self) -> Result<Vec<DeviceInfo>> {
        self.request(|reply| Command::Devices { reply }).await
    }

    /// Lists the networks of one device, current generation first.
    pub async fn networks(&self, index: i32) -> Result<Vec<NetworkInfo>> {
        self.request(|reply| Command::Networks { index, reply })
            .await
    }

    /// Tears down every device and stops the event loop.
    pub async fn shutdown(&self) -> Result<()> {
        self.request(|reply| Command::Shutdown { reply }).await
    }
}
