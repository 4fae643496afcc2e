//! Tracked wireless devices.
//!
//! A [`Device`] owns the networks it discovered and the handle of its
//! cleanup timer, if one is armed.

use log::{debug, info, warn};

use crate::api::elements::{Element, ElementId, ElementKind, ElementRegistry, PropertyValue};
use crate::api::models::{DeviceInfo, Generation, LinkState, NetworkInfo, ScanResult};
use crate::core::cleanup::{CleanupScheduler, CleanupTimer};
use crate::core::reconcile::{NetworkSet, Observation};
use crate::types::constants::property;

#[derive(Debug)]
pub(crate) struct Device {
    pub(crate) index: i32,
    pub(crate) name: String,
    pub(crate) interface: String,
    pub(crate) element: ElementId,
    pub(crate) enabled: bool,
    /// Raw identifier of the network targeted by the last connect request.
    pub(crate) target: Option<String>,
    pub(crate) state: LinkState,
    pub(crate) networks: NetworkSet,
    cleanup: Option<CleanupTimer>,
}

impl Device {
    pub(crate) fn new(index: i32, name: String, interface: String) -> Self {
        Self {
            index,
            name,
            interface,
            element: ElementId::new(),
            enabled: false,
            target: None,
            state: LinkState::Idle,
            networks: NetworkSet::default(),
            cleanup: None,
        }
    }

    /// Builds the element published for this device.
    pub(crate) fn element(&self) -> Element {
        Element {
            id: self.element,
            ..Element::new(ElementKind::Device, self.index)
        }
        .with_name(self.name.clone())
        .with_property(
            property::INTERFACE,
            PropertyValue::String(self.interface.clone()),
        )
    }

    /// Starts a scan cycle and arms the cleanup timer for the resulting
    /// pending generation, unless one is already armed.
    pub(crate) fn begin_cycle(&mut self, scheduler: &mut CleanupScheduler) {
        let pending = self.networks.begin_cycle();
        debug!("index {} begins scan cycle, pending {pending}", self.index);

        if pending == 0 {
            return;
        }
        if self.cleanup.is_some() {
            debug!("index {} cleanup already armed", self.index);
            return;
        }
        self.cleanup = Some(scheduler.arm(self.index));
    }

    pub(crate) fn observe(
        &mut self,
        result: ScanResult,
        elements: &mut dyn ElementRegistry,
    ) -> Observation {
        self.networks
            .observe(self.index, self.element, result, elements)
    }

    /// Retires the pending generation if `token` belongs to the armed timer.
    ///
    /// A device whose target network is retired returns to idle. Returns
    /// `None` for a stale expiry.
    pub(crate) fn cleanup_due(
        &mut self,
        token: u64,
        elements: &mut dyn ElementRegistry,
    ) -> Option<usize> {
        match &self.cleanup {
            Some(timer) if timer.token() == token => {}
            _ => {
                warn!("index {} ignoring stale cleanup {token}", self.index);
                return None;
            }
        }

        self.cleanup = None;
        let target_retired = self
            .target
            .as_deref()
            .is_some_and(|target| self.networks.is_pending(target));
        let retired = self.networks.retire_pending(elements);
        if target_retired {
            info!("index {} target network retired, {} -> idle", self.index, self.state);
            self.reset_connection();
        }
        debug!(
            "index {} retired {retired} pending networks, {} current",
            self.index,
            self.count(Generation::Current)
        );
        Some(retired)
    }

    /// Cancels any armed timer and retires every network.
    pub(crate) fn release_networks(&mut self, elements: &mut dyn ElementRegistry) -> usize {
        if self.cleanup.take().is_some() {
            debug!("index {} cancelled armed cleanup", self.index);
        }
        self.networks.retire_all(elements)
    }

    pub(crate) fn cleanup_armed(&self) -> bool {
        self.cleanup.is_some()
    }

    pub(crate) fn info(&self) -> DeviceInfo {
        DeviceInfo {
            index: self.index,
            name: self.name.clone(),
            interface: self.interface.clone(),
            enabled: self.enabled,
            state: self.state,
            target: self.target.clone(),
            cleanup_armed: self.cleanup_armed(),
        }
    }

    pub(crate) fn network_infos(&self) -> Vec<NetworkInfo> {
        self.networks
            .iter_sorted()
            .into_iter()
            .map(|n| n.info())
            .collect()
    }

    pub(crate) fn count(&self, generation: Generation) -> usize {
        self.networks.count(generation)
    }
}
