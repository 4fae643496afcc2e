//! Element registry seam.
//!
//! Devices, networks and address-configuration attachments are published to
//! external consumers as opaque elements carrying a handful of named
//! properties. [`ElementRegistry`] is the interface this crate drives;
//! [`MemoryRegistry`] is an in-process implementation.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

use crate::api::models::WifiError;
use crate::Result;

/// Stable identity of a published element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(Uuid);

impl ElementId {
    /// Allocates a fresh identity.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ElementId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What an element represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementKind {
    /// A wireless network interface.
    Device,
    /// A discovered access point.
    Network,
    /// Address configuration (DHCP) attached to a connected network.
    AddressConfig,
}

/// Value of an element property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyValue {
    String(String),
    Bytes(Vec<u8>),
    Byte(u8),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_byte(&self) -> Option<u8> {
        match self {
            Self::Byte(b) => Some(*b),
            _ => None,
        }
    }
}

/// A published element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub id: ElementId,
    pub kind: ElementKind,
    /// External name; address-configuration elements have none.
    pub name: Option<String>,
    /// Link index the element is bound to.
    pub index: i32,
    pub parent: Option<ElementId>,
    pub properties: BTreeMap<String, PropertyValue>,
}

impl Element {
    /// Creates an unnamed, parentless element with a fresh identity.
    pub fn new(kind: ElementKind, index: i32) -> Self {
        Self {
            id: ElementId::new(),
            kind,
            name: None,
            index,
            parent: None,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_parent(mut self, parent: ElementId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_property(mut self, name: &str, value: PropertyValue) -> Self {
        self.properties.insert(name.to_string(), value);
        self
    }
}

/// Registry through which elements are exposed to external consumers.
///
/// All calls happen on the event-loop task.
pub trait ElementRegistry: Send {
    /// Publishes an element. Fails if its parent is not registered.
    fn register(&mut self, element: Element) -> Result<()>;

    /// Withdraws an element together with all of its descendants.
    ///
    /// Unknown ids are ignored.
    fn unregister(&mut self, id: ElementId);

    /// Withdraws every descendant of an element, keeping the element itself.
    fn unregister_children(&mut self, id: ElementId);

    /// Looks up a published element.
    fn get(&self, id: ElementId) -> Option<&Element>;

    /// Reads a property of a published element.
    fn property(&self, id: ElementId, name: &str) -> Option<&PropertyValue> {
        self.get(id).and_then(|e| e.properties.get(name))
    }

    /// Writes a property of a published element.
    fn set_property(&mut self, id: ElementId, name: &str, value: PropertyValue) -> Result<()>;
}

/// In-process [`ElementRegistry`].
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    elements: HashMap<ElementId, Element>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of published elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterates over published elements of one kind.
    pub fn of_kind(&self, kind: ElementKind) -> impl Iterator<Item = &Element> {
        self.elements.values().filter(move |e| e.kind == kind)
    }

    /// Iterates over the direct children of an element.
    pub fn children(&self, id: ElementId) -> impl Iterator<Item = &Element> {
        self.elements
            .values()
            .filter(move |e| e.parent == Some(id))
    }

    fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut found = Vec::new();
        let mut queue = vec![id];
        while let Some(parent) = queue.pop() {
            for child in self.children(parent) {
                found.push(child.id);
                queue.push(child.id);
            }
        }
        found
    }
}

impl ElementRegistry for MemoryRegistry {
    fn register(&mut self, element: Element) -> Result<()> {
        if let Some(parent) = element.parent {
            if !self.elements.contains_key(&parent) {
                return Err(WifiError::Registry(format!(
                    "parent {parent} of {} is not registered",
                    element.id
                )));
            }
        }
        if self.elements.contains_key(&element.id) {
            return Err(WifiError::Registry(format!(
                "{} is already registered",
                element.id
            )));
        }

        debug!(
            "Registered {:?} element {} name {:?}",
            element.kind, element.id, element.name
        );
        self.elements.insert(element.id, element);
        Ok(())
    }

    fn unregister(&mut self, id: ElementId) {
        if !self.elements.contains_key(&id) {
            return;
        }
        self.unregister_children(id);
        if let Some(element) = self.elements.remove(&id) {
            debug!(
                "Unregistered {:?} element {} name {:?}",
                element.kind, element.id, element.name
            );
        }
    }

    fn unregister_children(&mut self, id: ElementId) {
        for child in self.descendants(id) {
            self.elements.remove(&child);
        }
    }

    fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    fn set_property(&mut self, id: ElementId, name: &str, value: PropertyValue) -> Result<()> {
        let element = self
            .elements
            .get_mut(&id)
            .ok_or_else(|| WifiError::Registry(format!("{id} is not registered")))?;
        element.properties.insert(name.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_requires_parent() {
        let mut reg = MemoryRegistry::new();
        let orphan = Element::new(ElementKind::Network, 3).with_parent(ElementId::new());
        assert!(matches!(reg.register(orphan), Err(WifiError::Registry(_))));
        assert!(reg.is_empty());
    }

    #[test]
    fn unregister_is_recursive() {
        let mut reg = MemoryRegistry::new();
        let device = Element::new(ElementKind::Device, 3).with_name("dev_3");
        let device_id = device.id;
        reg.register(device).unwrap();

        let network = Element::new(ElementKind::Network, 3)
            .with_name("homenet")
            .with_parent(device_id);
        let network_id = network.id;
        reg.register(network).unwrap();

        let dhcp = Element::new(ElementKind::AddressConfig, 3).with_parent(network_id);
        reg.register(dhcp).unwrap();
        assert_eq!(reg.len(), 3);

        reg.unregister(device_id);
        assert!(reg.is_empty());
    }

    #[test]
    fn unregister_children_keeps_parent() {
        let mut reg = MemoryRegistry::new();
        let network = Element::new(ElementKind::Network, 3);
        let network_id = network.id;
        reg.register(network).unwrap();
        reg.register(Element::new(ElementKind::AddressConfig, 3).with_parent(network_id))
            .unwrap();

        reg.unregister_children(network_id);
        assert_eq!(reg.len(), 1);
        assert!(reg.get(network_id).is_some());
        assert_eq!(reg.children(network_id).count(), 0);
    }

    #[test]
    fn properties_round_trip() {
        let mut reg = MemoryRegistry::new();
        let network = Element::new(ElementKind::Network, 3)
            .with_property("Name", PropertyValue::String("HomeNet".into()));
        let id = network.id;
        reg.register(network).unwrap();

        assert_eq!(
            reg.property(id, "Name").and_then(PropertyValue::as_str),
            Some("HomeNet")
        );
        reg.set_property(id, "WiFi.Strength", PropertyValue::Byte(42))
            .unwrap();
        assert_eq!(
            reg.property(id, "WiFi.Strength").and_then(PropertyValue::as_byte),
            Some(42)
        );
        assert!(reg
            .set_property(ElementId::new(), "Name", PropertyValue::Byte(0))
            .is_err());
    }
}
