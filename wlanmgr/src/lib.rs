//! Wireless device and network tracking on top of wpa_supplicant.
//!
//! This crate keeps the authoritative view of which wireless interfaces
//! exist, which networks each one can see, and which network each one is
//! connected to:
//!
//! - Wireless-capable links are tracked as devices as they come and go
//! - Scan results are reconciled so networks keep a stable identity across
//!   scans and disappear only after a grace period
//! - Authentication-layer state changes drive a small connection state
//!   machine that attaches address configuration once a link is up
//! - Consumers enable and disable devices and networks through a handle
//!
//! # Example
//!
//! ```no_run
//! use wlanmgr::{WifiConfig, WifiPlugin};
//!
//! # async fn example() -> wlanmgr::Result<()> {
//! let mut plugin = WifiPlugin::system(WifiConfig::default()).await?;
//! let handle = plugin.handle();
//! tokio::spawn(async move { plugin.run().await });
//!
//! for device in handle.devices().await? {
//!     handle.enable_device(device.index).await?;
//!     for net in handle.networks(device.index).await? {
//!         println!("{} ({}%, {})", net.identifier, net.quality, net.security);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Event Loop
//!
//! All state lives in [`WifiPlugin`] and is changed only by its event loop.
//! Link notifications, supplicant notifications, cleanup timer expiries and
//! consumer commands are queued on one channel and handled in arrival
//! order, so handlers never observe a half-applied change.
//!
//! # Collaborators
//!
//! The authentication service ([`Supplicant`]), the link layer
//! ([`LinkLayer`]) and the place elements are published to
//! ([`ElementRegistry`]) are traits. [`WpaSupplicant`], [`SysfsLinkLayer`]
//! and [`MemoryRegistry`] are the production implementations;
//! [`WifiPlugin::new`] accepts any other.
//!
//! # Error Handling
//!
//! All operations return `Result<T, WifiError>`. Busy devices, missing
//! element properties and unavailable supplicants have their own variants.
//!
//! # Logging
//!
//! This crate uses the [`log`](https://docs.rs/log) facade for logging. To see
//! log output, add a logging implementation like `env_logger`. For example:
//!
//! ```no_run,ignore
//! env_logger::init();
//! // ...
//! ```

// Internal implementation modules
mod core;
mod dbus;
mod monitoring;
mod types;
mod util;

// Public API modules
pub mod api;

// Re-exported public API
pub use api::backends::{LinkLayer, Supplicant, SupplicantCallback};
pub use api::config::WifiConfig;
pub use api::elements::{
    Element, ElementId, ElementKind, ElementRegistry, MemoryRegistry, PropertyValue,
};
pub use api::events::{
    EventReceiver, LinkEvent, LinkInfo, ServiceEvent, SupplicantEvent, WifiHandle, channel,
};
pub use api::models::{
    ConnectRequest, DeviceInfo, Generation, LinkState, NetworkInfo, ScanResult, Security,
    SecurityFlags, SupplicantState, WifiError,
};
pub use api::plugin::WifiPlugin;
pub use core::link::SysfsLinkLayer;
pub use core::registry::DeviceRegistry;
pub use core::supplicant::WpaSupplicant;
pub use types::constants::property;

/// A specialized `Result` type for wireless operations.
pub type Result<T> = std::result::Result<T, WifiError>;
