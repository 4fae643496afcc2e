//! Scan reconciliation.
//!
//! Each device keeps the networks it discovered in two generations:
//! `current` (confirmed by the running scan cycle) and `pending` (seen in an
//! earlier cycle, not yet reconfirmed). Membership is a field on the
//! network, so a network is in exactly one generation at any instant and
//! moving between them is a transfer by construction.
//!
//! Networks are keyed by their raw identifier. Two identifiers that
//! normalize to the same key stay distinct networks.

use log::{debug, error, warn};
use std::collections::HashMap;

use crate::api::elements::{ElementId, ElementRegistry, PropertyValue};
use crate::api::models::{Generation, ScanResult};
use crate::core::identifier::normalize_identifier;
use crate::core::network::Network;
use crate::types::constants::property;

/// Outcome of feeding one scan result into a [`NetworkSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Observation {
    /// The identifier was empty.
    Ignored,
    /// A new network was created and registered.
    Created(ElementId),
    /// A pending network was moved back to current.
    Reconfirmed(ElementId),
    /// The network was already current in this cycle.
    Refreshed(ElementId),
    /// Registering the new network failed; nothing was tracked.
    Failed,
}

#[derive(Debug, Default)]
pub(crate) struct NetworkSet {
    networks: HashMap<String, Network>,
}

impl NetworkSet {
    /// Starts a new scan cycle: every current network becomes pending.
    ///
    /// Networks that were already pending stay pending, so the new pending
    /// generation is the union of both. Returns its size.
    pub(crate) fn begin_cycle(&mut self) -> usize {
        let mut pending = 0;
        for network in self.networks.values_mut() {
            network.generation = Generation::Pending;
            pending += 1;
        }
        pending
    }

    /// Merges one scan result.
    ///
    /// A known identifier is moved to (or kept in) current with its quality
    /// refreshed; its security class is left as first classified. An
    /// unknown identifier creates a network registered under `parent`.
    pub(crate) fn observe(
        &mut self,
        device: i32,
        parent: ElementId,
        result: ScanResult,
        elements: &mut dyn ElementRegistry,
    ) -> Observation {
        let Some(key) = normalize_identifier(&result.identifier) else {
            return Observation::Ignored;
        };

        if let Some(network) = self.networks.get_mut(&result.identifier) {
            let previous = network.generation;
            network.generation = Generation::Current;
            network.available = true;

            if network.quality != result.quality {
                network.quality = result.quality;
                if let Err(e) = elements.set_property(
                    network.id,
                    property::STRENGTH,
                    PropertyValue::Byte(result.quality),
                ) {
                    warn!("Failed to update strength of {}: {e}", network.identifier);
                }
            }

            debug!(
                "{} ({}) strength {}",
                network.identifier, network.security, network.quality
            );

            return match previous {
                Generation::Pending => Observation::Reconfirmed(network.id),
                Generation::Current => Observation::Refreshed(network.id),
            };
        }

        let network = Network::discovered(device, key, result);
        if let Err(e) = elements.register(network.element(parent)) {
            error!("Failed to register network {}: {e}", network.identifier);
            return Observation::Failed;
        }

        debug!(
            "{} ({}) strength {} discovered",
            network.identifier, network.security, network.quality
        );

        let id = network.id;
        self.networks.insert(network.identifier.clone(), network);
        Observation::Created(id)
    }

    /// Unregisters and drops every pending network. Returns how many were
    /// retired.
    pub(crate) fn retire_pending(&mut self, elements: &mut dyn ElementRegistry) -> usize {
        let mut retired = Vec::new();
        self.networks.retain(|_, network| {
            if network.generation == Generation::Pending {
                retired.push((network.id, network.key.clone()));
                false
            } else {
                true
            }
        });

        for (id, key) in &retired {
            debug!("Retiring network {key}");
            elements.unregister(*id);
        }
        retired.len()
    }

    /// Unregisters and drops every network regardless of generation.
    pub(crate) fn retire_all(&mut self, elements: &mut dyn ElementRegistry) -> usize {
        let count = self.networks.len();
        for (_, network) in self.networks.drain() {
            elements.unregister(network.id);
        }
        count
    }

    /// Looks up a network of the running cycle by raw identifier.
    pub(crate) fn find_current(&self, identifier: &str) -> Option<&Network> {
        self.networks
            .get(identifier)
            .filter(|n| n.generation == Generation::Current)
    }

    /// Whether `identifier` names a network awaiting reconfirmation.
    pub(crate) fn is_pending(&self, identifier: &str) -> bool {
        self.networks
            .get(identifier)
            .is_some_and(|n| n.generation == Generation::Pending)
    }

    pub(crate) fn find_by_id(&self, id: ElementId) -> Option<&Network> {
        self.networks.values().find(|n| n.id == id)
    }

    pub(crate) fn count(&self, generation: Generation) -> usize {
        self.networks
            .values()
            .filter(|n| n.generation == generation)
            .count()
    }

    /// Current networks first, then pending, each sorted by identifier.
    pub(crate) fn iter_sorted(&self) -> Vec<&Network> {
        let mut networks: Vec<&Network> = self.networks.values().collect();
        networks.sort_by(|a, b| {
            let rank = |n: &Network| matches!(n.generation, Generation::Pending);
            rank(a)
                .cmp(&rank(b))
                .then_with(|| a.identifier.cmp(&b.identifier))
        });
        networks
    }
}
