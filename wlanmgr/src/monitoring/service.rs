//! Supplicant availability monitoring.
//!
//! Watches the bus for the wpa_supplicant name gaining or losing an owner.

use futures::StreamExt;
use log::{debug, info, warn};
use zbus::Connection;
use zbus::fdo::DBusProxy;
use zbus::names::BusName;

use crate::api::events::{ServiceEvent, WifiHandle};
use crate::api::models::WifiError;
use crate::types::constants::supplicant;
use crate::Result;

/// Returns `true` if wpa_supplicant currently owns its bus name.
pub(crate) async fn supplicant_present(conn: &Connection) -> Result<bool> {
    let dbus = DBusProxy::new(conn).await?;
    let name = BusName::try_from(supplicant::SERVICE).map_err(zbus::Error::from)?;
    Ok(dbus.name_has_owner(name).await.map_err(zbus::Error::from)?)
}

/// Reports `Appeared`/`Vanished` for every owner change of the supplicant's
/// bus name.
///
/// Runs until the signal stream ends or the event loop goes away. Run it in
/// a background task.
pub(crate) async fn watch_service(conn: &Connection, events: &WifiHandle) -> Result<()> {
    let dbus = DBusProxy::new(conn).await?;
    let mut changes = dbus
        .receive_name_owner_changed_with_args(&[(0, supplicant::SERVICE)])
        .await?;
    debug!("Watching owner of {}", supplicant::SERVICE);

    while let Some(signal) = changes.next().await {
        let args = match signal.args() {
            Ok(args) => args,
            Err(e) => {
                warn!("Failed to parse NameOwnerChanged args: {e}");
                continue;
            }
        };

        let event = if args.new_owner().is_some() {
            info!("{} appeared", supplicant::SERVICE);
            ServiceEvent::Appeared
        } else {
            info!("{} vanished", supplicant::SERVICE);
            ServiceEvent::Vanished
        };
        events.service(event)?;
    }

    warn!("NameOwnerChanged stream ended");
    Err(WifiError::SupplicantUnavailable)
}
