//! Device registry.
//!
//! Tracks which wireless interfaces exist, keyed by link index, and routes
//! supplicant notifications and cleanup expiries to the owning device.

use log::{debug, error, info, warn};
use std::collections::BTreeMap;

use crate::api::backends::{LinkLayer, SupplicantCallback};
use crate::api::elements::{ElementId, ElementRegistry};
use crate::api::events::WifiHandle;
use crate::api::models::{DeviceInfo, NetworkInfo, ScanResult, SupplicantState, WifiError};
use crate::core::cleanup::CleanupScheduler;
use crate::core::device::Device;
use crate::core::network::Network;
use crate::types::constants::{DEVICE_IDENT_PREFIX, link_type};
use crate::Result;

/// Registry of tracked wireless devices.
///
/// Owns every [`Device`] together with the element registry the devices
/// and their networks are published to.
pub struct DeviceRegistry<E: ElementRegistry> {
    devices: BTreeMap<i32, Device>,
    elements: E,
    link: Box<dyn LinkLayer>,
    scheduler: CleanupScheduler,
}

impl<E: ElementRegistry> DeviceRegistry<E> {
    pub(crate) fn new(
        elements: E,
        link: Box<dyn LinkLayer>,
        grace: std::time::Duration,
        events: WifiHandle,
    ) -> Self {
        Self {
            devices: BTreeMap::new(),
            elements,
            link,
            scheduler: CleanupScheduler::new(grace, events),
        }
    }

    /// The element registry devices and networks are published to.
    pub fn elements(&self) -> &E {
        &self.elements
    }

    /// Mutable access to the element registry.
    pub fn elements_mut(&mut self) -> &mut E {
        &mut self.elements
    }

    /// Snapshots of all tracked devices, ordered by link index.
    pub fn devices(&self) -> Vec<DeviceInfo> {
        self.devices.values().map(Device::info).collect()
    }

    /// Snapshot of one device.
    pub fn device(&self, index: i32) -> Option<DeviceInfo> {
        self.devices.get(&index).map(Device::info)
    }

    /// Networks of one device, current generation first.
    pub fn networks(&self, index: i32) -> Option<Vec<NetworkInfo>> {
        self.devices.get(&index).map(Device::network_infos)
    }

    pub(crate) fn device_mut(&mut self, index: i32) -> Result<&mut Device> {
        self.devices
            .get_mut(&index)
            .ok_or(WifiError::NoDevice(index))
    }

    /// Finds the device and network record behind a network element.
    pub(crate) fn find_network(&self, id: ElementId) -> Option<(&Device, &Network)> {
        self.devices
            .values()
            .find_map(|d| d.networks.find_by_id(id).map(|n| (d, n)))
    }

    pub(crate) fn parts_mut(&mut self, index: i32) -> Result<(&mut Device, &mut E)> {
        let device = self
            .devices
            .get_mut(&index)
            .ok_or(WifiError::NoDevice(index))?;
        Ok((device, &mut self.elements))
    }

    /// Handles a link-add notification.
    ///
    /// Ignored unless the link is Ethernet-class, resolves to an interface
    /// name and supports wireless extensions, or if the index is already
    /// tracked. Returns `true` if a device was created.
    pub fn on_link_up(&mut self, index: i32, kind: u16) -> bool {
        debug!("index {index} type {kind}");

        if kind != link_type::ETHER {
            return false;
        }
        let Some(interface) = self.link.interface_name(index) else {
            debug!("index {index} has no interface name");
            return false;
        };
        if !self.link.is_wireless(&interface) {
            return false;
        }
        if self.devices.contains_key(&index) {
            return false;
        }

        let name = self
            .link
            .ident(index)
            .unwrap_or_else(|| format!("{DEVICE_IDENT_PREFIX}{index}"));
        let device = Device::new(index, name, interface);

        if let Err(e) = self.elements.register(device.element()) {
            error!("Failed to register device {}: {e}", device.interface);
            return false;
        }

        info!(
            "Wireless device {} ({}) index {index} added",
            device.interface, device.name
        );
        self.devices.insert(index, device);
        true
    }

    /// Handles a link-remove notification.
    ///
    /// Cancels the device's cleanup timer, retires both network
    /// generations and unregisters the device. Returns the removed device.
    pub fn on_link_down(&mut self, index: i32) -> Option<DeviceInfo> {
        debug!("index {index}");

        let mut device = self.devices.remove(&index)?;
        let released = device.release_networks(&mut self.elements);
        self.elements.unregister(device.element);

        info!(
            "Wireless device {} index {index} removed, released {released} networks",
            device.interface
        );
        Some(device.info())
    }

    /// Feeds every currently present link through [`on_link_up`].
    ///
    /// [`on_link_up`]: DeviceRegistry::on_link_up
    pub fn enumerate_links(&mut self) -> usize {
        let links = self.link.links();
        links
            .into_iter()
            .filter(|link| self.on_link_up(link.index, link.link_type))
            .count()
    }

    /// Removes every tracked device. Returns what was removed.
    pub fn remove_all(&mut self) -> Vec<DeviceInfo> {
        let indices: Vec<i32> = self.devices.keys().copied().collect();
        indices
            .into_iter()
            .filter_map(|index| self.on_link_down(index))
            .collect()
    }

    /// Handles the expiry of a device's cleanup timer.
    pub fn cleanup_due(&mut self, index: i32, token: u64) -> Option<usize> {
        let Some(device) = self.devices.get_mut(&index) else {
            warn!("Cleanup for unknown index {index}");
            return None;
        };
        device.cleanup_due(token, &mut self.elements)
    }
}

impl<E: ElementRegistry> SupplicantCallback for DeviceRegistry<E> {
    fn state_change(&mut self, index: i32, state: SupplicantState) {
        let Some(device) = self.devices.get_mut(&index) else {
            return;
        };
        device.apply_state(state, &mut self.elements);
    }

    fn clear_results(&mut self, index: i32) {
        let Some(device) = self.devices.get_mut(&index) else {
            return;
        };
        device.begin_cycle(&mut self.scheduler);
    }

    fn scan_result(&mut self, index: i32, result: ScanResult) {
        let Some(device) = self.devices.get_mut(&index) else {
            return;
        };
        debug!("index {index} network {}", result.identifier);
        device.observe(result, &mut self.elements);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::elements::{ElementKind, MemoryRegistry};
    use crate::api::events::{LinkInfo, SupplicantEvent, channel};
    use crate::api::models::{Generation, LinkState, SecurityFlags};
    use std::collections::HashMap;
    use std::time::Duration;

    #[derive(Default)]
    struct StaticLinks {
        links: HashMap<i32, (&'static str, bool)>,
    }

    impl StaticLinks {
        fn with(mut self, index: i32, name: &'static str, wireless: bool) -> Self {
            self.links.insert(index, (name, wireless));
            self
        }
    }

    impl LinkLayer for StaticLinks {
        fn interface_name(&self, index: i32) -> Option<String> {
            self.links.get(&index).map(|(name, _)| name.to_string())
        }

        fn is_wireless(&self, interface: &str) -> bool {
            self.links
                .values()
                .any(|(name, wireless)| *name == interface && *wireless)
        }

        fn links(&self) -> Vec<LinkInfo> {
            self.links
                .iter()
                .map(|(index, (name, _))| LinkInfo {
                    index: *index,
                    link_type: link_type::ETHER,
                    name: name.to_string(),
                })
                .collect()
        }
    }

    fn registry(links: StaticLinks) -> DeviceRegistry<MemoryRegistry> {
        let (handle, _events) = channel();
        DeviceRegistry::new(
            MemoryRegistry::new(),
            Box::new(links),
            Duration::from_secs(8),
            handle,
        )
    }

    #[test]
    fn link_up_creates_wireless_device_once() {
        let mut reg = registry(StaticLinks::default().with(3, "wlan0", true));

        assert!(reg.on_link_up(3, link_type::ETHER));
        assert!(!reg.on_link_up(3, link_type::ETHER));

        let devices = reg.devices();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].interface, "wlan0");
        assert_eq!(devices[0].name, "dev_3");
        assert_eq!(devices[0].state, LinkState::Idle);
        assert_eq!(reg.elements().of_kind(ElementKind::Device).count(), 1);
    }

    #[test]
    fn link_up_filters_type_and_capability() {
        let mut reg = registry(
            StaticLinks::default()
                .with(2, "eth0", false)
                .with(3, "wlan0", true),
        );

        assert!(!reg.on_link_up(2, link_type::ETHER));
        assert!(!reg.on_link_up(3, 772));
        assert!(!reg.on_link_up(9, link_type::ETHER));
        assert!(reg.devices().is_empty());
    }

    #[test]
    fn link_down_unknown_index_is_noop() {
        let mut reg = registry(StaticLinks::default());
        assert!(reg.on_link_down(3).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn link_down_releases_everything() {
        let mut reg = registry(StaticLinks::default().with(3, "wlan0", true));
        reg.on_link_up(3, link_type::ETHER);

        reg.dispatch(
            3,
            SupplicantEvent::NetworkObserved(ScanResult::new("A", SecurityFlags::RSN, 50)),
        );
        reg.dispatch(3, SupplicantEvent::ResultsCleared);
        reg.dispatch(
            3,
            SupplicantEvent::NetworkObserved(ScanResult::new("B", SecurityFlags::empty(), 20)),
        );
        assert!(reg.device(3).unwrap().cleanup_armed);

        let removed = reg.on_link_down(3).unwrap();
        assert_eq!(removed.index, 3);
        assert!(reg.elements().is_empty());
        assert!(reg.devices().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn events_for_unknown_devices_are_dropped() {
        let mut reg = registry(StaticLinks::default());
        reg.dispatch(
            7,
            SupplicantEvent::NetworkObserved(ScanResult::new("A", SecurityFlags::empty(), 1)),
        );
        reg.dispatch(7, SupplicantEvent::ResultsCleared);
        reg.dispatch(7, SupplicantEvent::StateChanged(SupplicantState::Completed));
        assert!(reg.elements().is_empty());
        assert_eq!(reg.cleanup_due(7, 1), None);
    }

    #[tokio::test(start_paused = true)]
    async fn results_cleared_moves_current_to_pending() {
        let mut reg = registry(StaticLinks::default().with(3, "wlan0", true));
        reg.on_link_up(3, link_type::ETHER);
        reg.dispatch(
            3,
            SupplicantEvent::NetworkObserved(ScanResult::new("HomeNet", SecurityFlags::RSN, 70)),
        );

        reg.dispatch(3, SupplicantEvent::ResultsCleared);
        let networks = reg.networks(3).unwrap();
        assert_eq!(networks.len(), 1);
        assert_eq!(networks[0].generation, Generation::Pending);
    }

    #[test]
    fn enumerate_links_adds_wireless_only() {
        let mut reg = registry(
            StaticLinks::default()
                .with(2, "eth0", false)
                .with(3, "wlan0", true)
                .with(4, "wlan1", true),
        );
        assert_eq!(reg.enumerate_links(), 2);
        assert_eq!(reg.remove_all().len(), 2);
        assert!(reg.elements().is_empty());
    }
}
