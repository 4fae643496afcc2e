//! Collaborator interfaces.
//!
//! The authentication service and the link layer are reached through these
//! traits so the event loop can run against wpa_supplicant and sysfs in
//! production and against fakes in tests.

use async_trait::async_trait;

use crate::api::events::{LinkInfo, SupplicantEvent};
use crate::api::models::{ConnectRequest, ScanResult, SupplicantState};
use crate::Result;

/// Control interface of the authentication service.
///
/// Calls only submit requests; their outcome is reported later through
/// [`SupplicantEvent`]s sent on the [`WifiHandle`](crate::WifiHandle) the
/// implementation was built with.
#[async_trait]
pub trait Supplicant: Send + Sync {
    /// Opens a session for the interface and starts delivering events.
    async fn start(&self, index: i32, interface: &str) -> Result<()>;

    /// Closes the session for the link index.
    async fn stop(&self, index: i32) -> Result<()>;

    /// Requests a scan.
    async fn scan(&self, index: i32) -> Result<()>;

    /// Requests association with a network.
    async fn connect(&self, index: i32, request: ConnectRequest) -> Result<()>;

    /// Requests disassociation.
    async fn disconnect(&self, index: i32) -> Result<()>;
}

/// Receiver of authentication-service notifications.
pub trait SupplicantCallback {
    /// The interface state changed.
    fn state_change(&mut self, index: i32, state: SupplicantState);

    /// A new scan cycle begins.
    fn clear_results(&mut self, index: i32);

    /// One network was seen by the running scan cycle.
    fn scan_result(&mut self, index: i32, result: ScanResult);

    /// Routes a tagged event to the matching handler.
    fn dispatch(&mut self, index: i32, event: SupplicantEvent) {
        match event {
            SupplicantEvent::StateChanged(state) => self.state_change(index, state),
            SupplicantEvent::ResultsCleared => self.clear_results(index),
            SupplicantEvent::NetworkObserved(result) => self.scan_result(index, result),
        }
    }
}

/// Read-only view of the OS link layer.
pub trait LinkLayer: Send + Sync {
    /// Resolves a link index to its interface name.
    fn interface_name(&self, index: i32) -> Option<String>;

    /// Returns `true` if the interface supports wireless extensions.
    fn is_wireless(&self, interface: &str) -> bool;

    /// Stable element name for the link, usually derived from its
    /// hardware address.
    fn ident(&self, _index: i32) -> Option<String> {
        None
    }

    /// Enumerates links present right now.
    fn links(&self) -> Vec<LinkInfo> {
        Vec::new()
    }
}
