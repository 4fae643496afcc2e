//! Connection state machine.
//!
//! Authentication-layer notifications move a device between
//! [`LinkState`]s. Only `completed`, `disconnected` and `inactive` are
//! acted upon; any other supplicant state leaves the device untouched.

use log::{debug, error, info};

use crate::api::elements::{Element, ElementId, ElementKind, ElementRegistry};
use crate::api::models::{LinkState, SupplicantState, WifiError};
use crate::core::device::Device;
use crate::Result;

/// What a state notification did to a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Transition {
    /// The device became connected; the address-configuration element was
    /// registered under the target network.
    Connected { network: ElementId, address: ElementId },
    /// The device is no longer connected.
    Disconnected,
    /// Nothing changed.
    Unchanged,
}

impl Device {
    /// Applies one supplicant state notification.
    pub(crate) fn apply_state(
        &mut self,
        state: SupplicantState,
        elements: &mut dyn ElementRegistry,
    ) -> Transition {
        debug!("index {} state {state}", self.index);

        match state {
            SupplicantState::Completed => self.on_completed(elements),
            SupplicantState::Disconnected | SupplicantState::Inactive => {
                match self.state {
                    LinkState::Idle | LinkState::Disconnected => Transition::Unchanged,
                    previous => {
                        info!("index {} {previous} -> disconnected", self.index);
                        self.state = LinkState::Disconnected;
                        Transition::Disconnected
                    }
                }
            }
            _ => Transition::Unchanged,
        }
    }

    fn on_completed(&mut self, elements: &mut dyn ElementRegistry) -> Transition {
        let Some(target) = self.target.as_deref() else {
            debug!("index {} completed without a target", self.index);
            return Transition::Unchanged;
        };
        let Some(network) = self.networks.find_current(target) else {
            debug!("index {} target {target} is not current", self.index);
            return Transition::Unchanged;
        };
        if self.state == LinkState::Connected {
            return Transition::Unchanged;
        }

        let network_id = network.id;
        // At most one address configuration per network.
        elements.unregister_children(network_id);

        let address = Element::new(ElementKind::AddressConfig, self.index).with_parent(network_id);
        let address_id = address.id;
        if let Err(e) = elements.register(address) {
            error!("Failed to attach address configuration to {target}: {e}");
        }

        info!("index {} connected to {target}", self.index);
        self.state = LinkState::Connected;
        Transition::Connected {
            network: network_id,
            address: address_id,
        }
    }

    /// Records `identifier` as the connect target.
    ///
    /// # Errors
    ///
    /// Returns `WifiError::Busy` without touching the device if it is
    /// already connected.
    pub(crate) fn begin_connect(&mut self, identifier: &str) -> Result<()> {
        if self.state == LinkState::Connected {
            return Err(WifiError::Busy);
        }
        self.target = Some(identifier.to_string());
        self.state = LinkState::Connecting;
        Ok(())
    }

    /// Reverts a connect attempt whose request could not be submitted.
    pub(crate) fn abort_connect(&mut self) {
        self.target = None;
        self.state = LinkState::Idle;
    }

    pub(crate) fn begin_disconnect(&mut self) {
        if self.state != LinkState::Idle {
            self.state = LinkState::Disconnecting;
        }
    }

    /// Returns the device to its post-enable state.
    pub(crate) fn reset_connection(&mut self) {
        self.target = None;
        self.state = LinkState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::elements::MemoryRegistry;
    use crate::api::models::{ScanResult, SecurityFlags};

    fn device_with_network(elements: &mut MemoryRegistry) -> (Device, ElementId) {
        let mut device = Device::new(3, "dev_3".into(), "wlan0".into());
        elements.register(device.element()).unwrap();
        let obs = device.observe(ScanResult::new("HomeNet", SecurityFlags::RSN, 70), elements);
        let crate::core::reconcile::Observation::Created(id) = obs else {
            panic!("expected creation, got {obs:?}");
        };
        (device, id)
    }

    #[test]
    fn completed_attaches_address_config() {
        let mut elements = MemoryRegistry::new();
        let (mut device, network) = device_with_network(&mut elements);
        device.begin_connect("HomeNet").unwrap();
        assert_eq!(device.state, LinkState::Connecting);

        let transition = device.apply_state(SupplicantState::Completed, &mut elements);
        let Transition::Connected { network: n, address } = transition else {
            panic!("expected connection, got {transition:?}");
        };
        assert_eq!(n, network);
        assert_eq!(device.state, LinkState::Connected);

        let dhcp = elements.get(address).unwrap();
        assert_eq!(dhcp.kind, ElementKind::AddressConfig);
        assert_eq!(dhcp.index, 3);
        assert_eq!(dhcp.parent, Some(network));
    }

    #[test]
    fn completed_without_current_target_is_noop() {
        let mut elements = MemoryRegistry::new();
        let (mut device, _) = device_with_network(&mut elements);
        device.begin_connect("Elsewhere").unwrap();

        let before = elements.len();
        assert_eq!(
            device.apply_state(SupplicantState::Completed, &mut elements),
            Transition::Unchanged
        );
        assert_eq!(device.state, LinkState::Connecting);
        assert_eq!(elements.len(), before);
    }

    #[test]
    fn completed_for_pending_target_is_noop() {
        let mut elements = MemoryRegistry::new();
        let (mut device, _) = device_with_network(&mut elements);
        device.begin_connect("HomeNet").unwrap();
        device.networks.begin_cycle();

        assert_eq!(
            device.apply_state(SupplicantState::Completed, &mut elements),
            Transition::Unchanged
        );
        assert_ne!(device.state, LinkState::Connected);
    }

    #[test]
    fn repeated_completed_keeps_one_address_config() {
        let mut elements = MemoryRegistry::new();
        let (mut device, network) = device_with_network(&mut elements);
        device.begin_connect("HomeNet").unwrap();

        device.apply_state(SupplicantState::Completed, &mut elements);
        assert_eq!(
            device.apply_state(SupplicantState::Completed, &mut elements),
            Transition::Unchanged
        );
        assert_eq!(elements.children(network).count(), 1);
    }

    #[test]
    fn disconnected_and_inactive_clear_connection() {
        let mut elements = MemoryRegistry::new();
        let (mut device, _) = device_with_network(&mut elements);
        device.begin_connect("HomeNet").unwrap();
        device.apply_state(SupplicantState::Completed, &mut elements);

        assert_eq!(
            device.apply_state(SupplicantState::Disconnected, &mut elements),
            Transition::Disconnected
        );
        assert_eq!(device.state, LinkState::Disconnected);

        device.begin_connect("HomeNet").unwrap();
        device.apply_state(SupplicantState::Completed, &mut elements);
        assert_eq!(
            device.apply_state(SupplicantState::Inactive, &mut elements),
            Transition::Disconnected
        );
    }

    #[test]
    fn other_states_change_nothing() {
        let mut elements = MemoryRegistry::new();
        let (mut device, _) = device_with_network(&mut elements);
        device.begin_connect("HomeNet").unwrap();

        for state in [
            SupplicantState::Scanning,
            SupplicantState::Associating,
            SupplicantState::FourWayHandshake,
            SupplicantState::Unknown,
        ] {
            assert_eq!(
                device.apply_state(state, &mut elements),
                Transition::Unchanged
            );
        }
        assert_eq!(device.state, LinkState::Connecting);
    }

    #[test]
    fn connect_while_connected_is_busy() {
        let mut elements = MemoryRegistry::new();
        let (mut device, _) = device_with_network(&mut elements);
        device.begin_connect("HomeNet").unwrap();
        device.apply_state(SupplicantState::Completed, &mut elements);

        assert!(matches!(
            device.begin_connect("Other"),
            Err(WifiError::Busy)
        ));
        assert_eq!(device.target.as_deref(), Some("HomeNet"));
        assert_eq!(device.state, LinkState::Connected);
    }

    #[test]
    fn retargeting_while_connecting_is_allowed() {
        let mut device = Device::new(3, "dev_3".into(), "wlan0".into());
        device.begin_connect("A").unwrap();
        device.begin_connect("B").unwrap();
        assert_eq!(device.target.as_deref(), Some("B"));
    }

    #[test]
    fn disconnect_from_idle_stays_idle() {
        let mut device = Device::new(3, "dev_3".into(), "wlan0".into());
        device.begin_disconnect();
        assert_eq!(device.state, LinkState::Idle);

        device.begin_connect("A").unwrap();
        device.begin_disconnect();
        assert_eq!(device.state, LinkState::Disconnecting);
    }
}
