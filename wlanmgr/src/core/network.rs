//! Discovered network records.

use crate::api::elements::{Element, ElementId, ElementKind, PropertyValue};
use crate::api::models::{Generation, NetworkInfo, ScanResult, Security};
use crate::types::constants::property;

/// One discovered access point, scoped to the device that saw it.
///
/// The parent device is referenced by link index and element id, never
/// owned.
#[derive(Debug, Clone)]
pub(crate) struct Network {
    pub(crate) id: ElementId,
    pub(crate) device: i32,
    pub(crate) identifier: String,
    pub(crate) key: String,
    pub(crate) ssid: Vec<u8>,
    pub(crate) security: Security,
    pub(crate) quality: u8,
    pub(crate) available: bool,
    pub(crate) generation: Generation,
}

impl Network {
    /// Creates a network for a first sighting. It starts in the current
    /// generation.
    pub(crate) fn discovered(device: i32, key: String, result: ScanResult) -> Self {
        Self {
            id: ElementId::new(),
            device,
            security: Security::classify(result.flags),
            identifier: result.identifier,
            key,
            ssid: result.ssid,
            quality: result.quality,
            available: true,
            generation: Generation::Current,
        }
    }

    /// Builds the element published for this network under `parent`.
    pub(crate) fn element(&self, parent: ElementId) -> Element {
        Element {
            id: self.id,
            ..Element::new(ElementKind::Network, self.device)
        }
        .with_name(self.key.clone())
        .with_parent(parent)
        .with_property(property::NAME, PropertyValue::String(self.identifier.clone()))
        .with_property(property::SSID, PropertyValue::Bytes(self.ssid.clone()))
        .with_property(
            property::SECURITY,
            PropertyValue::String(self.security.to_string()),
        )
        .with_property(property::STRENGTH, PropertyValue::Byte(self.quality))
    }

    pub(crate) fn info(&self) -> NetworkInfo {
        NetworkInfo {
            id: self.id,
            identifier: self.identifier.clone(),
            key: self.key.clone(),
            ssid: self.ssid.clone(),
            security: self.security,
            quality: self.quality,
            available: self.available,
            generation: self.generation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::SecurityFlags;

    #[test]
    fn discovered_network_is_current_and_classified() {
        let result = ScanResult::new("HomeNet", SecurityFlags::RSN | SecurityFlags::WPA, 70);
        let net = Network::discovered(3, "homenet".into(), result);

        assert_eq!(net.generation, Generation::Current);
        assert_eq!(net.security, Security::Wpa2);
        assert!(net.available);
        assert_eq!(net.device, 3);
    }

    #[test]
    fn element_carries_static_properties() {
        let parent = ElementId::new();
        let net = Network::discovered(
            3,
            "homenet".into(),
            ScanResult::new("HomeNet", SecurityFlags::WEP, 40),
        );
        let element = net.element(parent);

        assert_eq!(element.id, net.id);
        assert_eq!(element.kind, ElementKind::Network);
        assert_eq!(element.name.as_deref(), Some("homenet"));
        assert_eq!(element.parent, Some(parent));
        assert_eq!(
            element.properties.get(property::NAME),
            Some(&PropertyValue::String("HomeNet".into()))
        );
        assert_eq!(
            element.properties.get(property::SECURITY),
            Some(&PropertyValue::String("wep".into()))
        );
        assert_eq!(
            element.properties.get(property::STRENGTH),
            Some(&PropertyValue::Byte(40))
        );
    }
}
