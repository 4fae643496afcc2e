use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

use crate::api::elements::ElementId;

bitflags! {
    /// Security capabilities announced by an access point in a scan result.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SecurityFlags: u8 {
        /// Privacy bit set without WPA/RSN information elements.
        const WEP = 0x1;
        /// WPA information element present.
        const WPA = 0x2;
        /// RSN (WPA2) information element present.
        const RSN = 0x4;
    }
}

/// Security class of a discovered network.
///
/// Assigned once, when the network is first discovered, and never
/// overwritten by later scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Security {
    /// Open network.
    None,
    /// Static WEP keys.
    Wep,
    /// WPA (TKIP era) pre-shared key.
    Wpa,
    /// WPA2 (RSN) pre-shared key.
    Wpa2,
}

impl Security {
    /// Classifies scan flags by priority: wpa2 > wpa > wep > none.
    ///
    /// # Example
    ///
    /// ```
    /// use wlanmgr::{Security, SecurityFlags};
    ///
    /// assert_eq!(Security::classify(SecurityFlags::RSN | SecurityFlags::WPA), Security::Wpa2);
    /// assert_eq!(Security::classify(SecurityFlags::empty()), Security::None);
    /// ```
    pub fn classify(flags: SecurityFlags) -> Self {
        if flags.contains(SecurityFlags::RSN) {
            Self::Wpa2
        } else if flags.contains(SecurityFlags::WPA) {
            Self::Wpa
        } else if flags.contains(SecurityFlags::WEP) {
            Self::Wep
        } else {
            Self::None
        }
    }

    /// Returns `true` if joining the network needs a passphrase or key.
    pub fn requires_secret(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl Display for Security {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Wep => write!(f, "wep"),
            Self::Wpa => write!(f, "wpa"),
            Self::Wpa2 => write!(f, "wpa2"),
        }
    }
}

impl FromStr for Security {
    type Err = WifiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "wep" => Ok(Self::Wep),
            "wpa" => Ok(Self::Wpa),
            "wpa2" => Ok(Self::Wpa2),
            _ => Err(WifiError::MissingProperty(crate::types::constants::property::SECURITY)),
        }
    }
}

/// One network reported by the authentication service during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    /// Exact announced name, used for matching across scans.
    pub identifier: String,
    /// Raw SSID bytes.
    pub ssid: Vec<u8>,
    /// Announced security capabilities.
    pub flags: SecurityFlags,
    /// Signal quality (0-100).
    pub quality: u8,
}

impl ScanResult {
    /// Creates a scan result whose SSID bytes equal the identifier.
    pub fn new(identifier: impl Into<String>, flags: SecurityFlags, quality: u8) -> Self {
        let identifier = identifier.into();
        Self {
            ssid: identifier.as_bytes().to_vec(),
            identifier,
            flags,
            quality,
        }
    }
}

/// wpa_supplicant interface state.
///
/// Only `Completed`, `Disconnected` and `Inactive` drive the connection
/// state machine; every other state is carried for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupplicantState {
    /// The interface is disabled.
    InterfaceDisabled,
    /// Not associated, not trying to.
    Disconnected,
    /// No enabled networks, nothing to do.
    Inactive,
    /// Searching for a network.
    Scanning,
    /// Authenticating with the selected BSS.
    Authenticating,
    /// Associating with the selected BSS.
    Associating,
    /// Association completed.
    Associated,
    /// WPA 4-way key handshake in progress.
    FourWayHandshake,
    /// WPA group key handshake in progress.
    GroupHandshake,
    /// All authentication completed.
    Completed,
    /// A state string this crate does not know.
    Unknown,
}

impl From<&str> for SupplicantState {
    fn from(s: &str) -> Self {
        match s {
            "interface_disabled" => Self::InterfaceDisabled,
            "disconnected" => Self::Disconnected,
            "inactive" => Self::Inactive,
            "scanning" => Self::Scanning,
            "authenticating" => Self::Authenticating,
            "associating" => Self::Associating,
            "associated" => Self::Associated,
            "4way_handshake" => Self::FourWayHandshake,
            "group_handshake" => Self::GroupHandshake,
            "completed" => Self::Completed,
            _ => Self::Unknown,
        }
    }
}

impl Display for SupplicantState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InterfaceDisabled => write!(f, "interface_disabled"),
            Self::Disconnected => write!(f, "disconnected"),
            Self::Inactive => write!(f, "inactive"),
            Self::Scanning => write!(f, "scanning"),
            Self::Authenticating => write!(f, "authenticating"),
            Self::Associating => write!(f, "associating"),
            Self::Associated => write!(f, "associated"),
            Self::FourWayHandshake => write!(f, "4way_handshake"),
            Self::GroupHandshake => write!(f, "group_handshake"),
            Self::Completed => write!(f, "completed"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Connection state of a wireless device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LinkState {
    /// No connect attempt has been made since the device was enabled.
    #[default]
    Idle,
    /// A target network is set and a connect request was issued.
    Connecting,
    /// Authentication completed on the target network.
    Connected,
    /// A disconnect was requested and not yet confirmed.
    Disconnecting,
    /// The authentication service reported the link as down.
    Disconnected,
}

impl Display for LinkState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
            Self::Disconnecting => write!(f, "disconnecting"),
            Self::Disconnected => write!(f, "disconnected"),
        }
    }
}

/// Which scan generation a network currently belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Generation {
    /// Seen during the running scan cycle.
    Current,
    /// Seen in an earlier cycle and awaiting reconfirmation or retirement.
    Pending,
}

/// Parameters handed to the authentication service for a connect request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectRequest {
    /// Raw SSID bytes of the target network.
    pub ssid: Vec<u8>,
    /// Security class of the target network.
    pub security: Security,
    /// Passphrase or key, if the consumer provided one.
    pub passphrase: Option<String>,
}

/// Snapshot of a tracked wireless device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Link index assigned by the kernel.
    pub index: i32,
    /// Element name (e.g., "dev_00112233aabb").
    pub name: String,
    /// Interface name (e.g., "wlan0").
    pub interface: String,
    /// Whether a supplicant session is running for the device.
    pub enabled: bool,
    /// Connection state.
    pub state: LinkState,
    /// Identifier of the network targeted by the last connect request.
    pub target: Option<String>,
    /// Whether a deferred cleanup is outstanding.
    pub cleanup_armed: bool,
}

impl DeviceInfo {
    /// Returns `true` if the device is connected.
    pub fn is_connected(&self) -> bool {
        self.state == LinkState::Connected
    }
}

/// Snapshot of a discovered network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInfo {
    /// Element identity; stable for as long as the network keeps appearing.
    pub id: ElementId,
    /// Exact announced name.
    pub identifier: String,
    /// Normalized element name.
    pub key: String,
    /// Raw SSID bytes.
    pub ssid: Vec<u8>,
    /// Security class assigned at discovery.
    pub security: Security,
    /// Last reported signal quality (0-100).
    pub quality: u8,
    /// Whether the network was seen by a scan.
    pub available: bool,
    /// Generation the network sits in.
    pub generation: Generation,
}

/// Errors that can occur while tracking devices and networks.
///
/// # Examples
///
/// ```no_run
/// use wlanmgr::{WifiConfig, WifiError, WifiPlugin};
///
/// # async fn example(network: wlanmgr::ElementId) -> wlanmgr::Result<()> {
/// let plugin = WifiPlugin::system(WifiConfig::default()).await?;
/// let handle = plugin.handle();
///
/// match handle.enable_network(network).await {
///     Ok(()) => println!("Connect request issued"),
///     Err(WifiError::Busy) => eprintln!("Disconnect first"),
///     Err(WifiError::MissingProperty(name)) => eprintln!("Network has no {name}"),
///     Err(e) => eprintln!("Error: {e}"),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Error)]
pub enum WifiError {
    /// A D-Bus communication error occurred.
    #[error("D-Bus error: {0}")]
    Dbus(#[from] zbus::Error),

    /// A connect was requested while the device is already connected.
    #[error("device busy: already connected")]
    Busy,

    /// A required element property is absent.
    #[error("missing required property: {0}")]
    MissingProperty(&'static str),

    /// No wireless device is tracked under the link index.
    #[error("no wireless device with link index {0}")]
    NoDevice(i32),

    /// The network element is not tracked by any device.
    #[error("network not found")]
    NotFound,

    /// wpa_supplicant is not on the bus.
    #[error("wpa_supplicant is not available")]
    SupplicantUnavailable,

    /// No supplicant session was started for the link index.
    #[error("no supplicant session for link index {0}")]
    NoSession(i32),

    /// The rtnetlink link watch could not be set up.
    #[error("netlink error: {0}")]
    Netlink(String),

    /// The element registry refused an element.
    #[error("element registration failed: {0}")]
    Registry(String),

    /// The event loop is no longer running.
    #[error("event loop has stopped")]
    Stopped,
}
