//! Driver lifecycle entry points.
//!
//! Enable/disable/update for devices and enable/disable for networks, as
//! invoked by consumers through the event loop. These are the only places
//! that talk to the authentication service.

use log::{debug, error, info, warn};
use std::sync::Arc;

use crate::api::backends::Supplicant;
use crate::api::config::WifiConfig;
use crate::api::elements::{ElementId, ElementRegistry, PropertyValue};
use crate::api::models::{ConnectRequest, Security, WifiError};
use crate::core::registry::DeviceRegistry;
use crate::types::constants::property;
use crate::Result;

pub(crate) struct WifiDriver {
    supplicant: Arc<dyn Supplicant>,
    scan_on_enable: bool,
}

impl WifiDriver {
    pub(crate) fn new(supplicant: Arc<dyn Supplicant>, config: &WifiConfig) -> Self {
        Self {
            supplicant,
            scan_on_enable: config.scan_on_enable,
        }
    }

    /// Starts the supplicant session and requests the first scan.
    ///
    /// A failed start leaves the device disabled.
    pub(crate) async fn enable_device<E: ElementRegistry>(
        &self,
        registry: &mut DeviceRegistry<E>,
        index: i32,
    ) -> Result<()> {
        let device = registry.device_mut(index)?;
        debug!("index {index} interface {}", device.interface);

        if device.enabled {
            return Ok(());
        }

        if let Err(e) = self.supplicant.start(index, &device.interface).await {
            error!("Failed to start supplicant for {}: {e}", device.interface);
            return Err(e);
        }
        device.enabled = true;
        device.reset_connection();
        info!("index {index} enabled");

        if self.scan_on_enable {
            if let Err(e) = self.supplicant.scan(index).await {
                warn!("Initial scan for index {index} failed: {e}");
            }
        }
        Ok(())
    }

    /// Requests a fresh scan.
    pub(crate) async fn update_device<E: ElementRegistry>(
        &self,
        registry: &mut DeviceRegistry<E>,
        index: i32,
    ) -> Result<()> {
        let device = registry.device_mut(index)?;
        if !device.enabled {
            return Err(WifiError::NoSession(index));
        }
        self.supplicant.scan(index).await
    }

    /// Cancels pending cleanup, disconnects, releases both generations and
    /// stops the supplicant session.
    pub(crate) async fn disable_device<E: ElementRegistry>(
        &self,
        registry: &mut DeviceRegistry<E>,
        index: i32,
    ) -> Result<()> {
        let (device, elements) = registry.parts_mut(index)?;
        debug!("index {index} interface {}", device.interface);

        let was_enabled = device.enabled;
        let released = device.release_networks(&mut *elements);
        elements.unregister_children(device.element);
        device.enabled = false;
        device.reset_connection();
        debug!("index {index} released {released} networks");

        if !was_enabled {
            return Ok(());
        }

        if let Err(e) = self.supplicant.disconnect(index).await {
            warn!("Disconnect for index {index} failed: {e}");
        }
        self.supplicant.stop(index).await?;
        info!("index {index} disabled");
        Ok(())
    }

    /// Removes a device after its link went away, closing its session.
    pub(crate) async fn remove_device<E: ElementRegistry>(
        &self,
        registry: &mut DeviceRegistry<E>,
        index: i32,
    ) {
        let Some(device) = registry.on_link_down(index) else {
            return;
        };
        if device.enabled {
            if let Err(e) = self.supplicant.stop(index).await {
                warn!("Failed to stop supplicant for {}: {e}", device.interface);
            }
        }
    }

    /// Makes a network the connect target of its device and submits the
    /// connect request.
    ///
    /// # Errors
    ///
    /// - `WifiError::NotFound` if no device tracks the network
    /// - `WifiError::MissingProperty` if `Name` or `WiFi.SSID` is absent
    /// - `WifiError::Busy` if the device is already connected
    pub(crate) async fn enable_network<E: ElementRegistry>(
        &self,
        registry: &mut DeviceRegistry<E>,
        network: ElementId,
    ) -> Result<()> {
        let index = registry
            .find_network(network)
            .map(|(device, _)| device.index)
            .ok_or(WifiError::NotFound)?;

        let (device, elements) = registry.parts_mut(index)?;

        let name = elements
            .property(network, property::NAME)
            .and_then(PropertyValue::as_str)
            .map(str::to_string)
            .ok_or(WifiError::MissingProperty(property::NAME))?;
        let ssid = elements
            .property(network, property::SSID)
            .and_then(PropertyValue::as_bytes)
            .map(<[u8]>::to_vec)
            .ok_or(WifiError::MissingProperty(property::SSID))?;

        device.begin_connect(&name)?;

        let security = elements
            .property(network, property::SECURITY)
            .and_then(PropertyValue::as_str)
            .and_then(|s| s.parse::<Security>().ok())
            .unwrap_or(Security::None);
        let passphrase = elements
            .property(network, property::PASSPHRASE)
            .and_then(PropertyValue::as_str)
            .map(str::to_string);

        debug!("name {name} security {security} passphrase set {}", passphrase.is_some());

        let request = ConnectRequest {
            ssid,
            security,
            passphrase,
        };
        if let Err(e) = self.supplicant.connect(index, request).await {
            error!("Failed to initiate connect to {name}: {e}");
            device.abort_connect();
            return Err(e);
        }
        Ok(())
    }

    /// Drops the network's address configuration and disconnects.
    pub(crate) async fn disable_network<E: ElementRegistry>(
        &self,
        registry: &mut DeviceRegistry<E>,
        network: ElementId,
    ) -> Result<()> {
        let index = registry
            .find_network(network)
            .map(|(device, _)| device.index)
            .ok_or(WifiError::NotFound)?;

        let (device, elements) = registry.parts_mut(index)?;
        elements.unregister_children(network);
        device.begin_disconnect();

        self.supplicant.disconnect(index).await
    }

    /// Stores a passphrase on a network element.
    pub(crate) fn set_passphrase<E: ElementRegistry>(
        &self,
        registry: &mut DeviceRegistry<E>,
        network: ElementId,
        passphrase: String,
    ) -> Result<()> {
        if registry.find_network(network).is_none() {
            return Err(WifiError::NotFound);
        }
        registry.elements_mut().set_property(
            network,
            property::PASSPHRASE,
            PropertyValue::String(passphrase),
        )
    }
}
