//! wpa_supplicant backend.
//!
//! Implements [`Supplicant`] over the `fi.w1.wpa_supplicant1` D-Bus API.
//! Each enabled device owns a session: the interface object path plus the
//! task monitoring it. Dropping a session stops its monitor.

use async_trait::async_trait;
use log::{debug, info, warn};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use zbus::Connection;
use zvariant::{OwnedObjectPath, Value};

use crate::api::backends::Supplicant;
use crate::api::config::WifiConfig;
use crate::api::events::WifiHandle;
use crate::api::models::{ConnectRequest, Security, WifiError};
use crate::dbus::{WpaInterfaceProxy, WpaSupplicantProxy};
use crate::monitoring::{service, supplicant::monitor_interface};
use crate::types::constants::property;
use crate::Result;

struct Session {
    path: OwnedObjectPath,
    monitor: JoinHandle<()>,
}

impl Drop for Session {
    fn drop(&mut self) {
        self.monitor.abort();
    }
}

/// Authentication service backed by wpa_supplicant on D-Bus.
///
/// Notifications are delivered through the [`WifiHandle`] given at
/// construction.
pub struct WpaSupplicant {
    conn: Connection,
    events: WifiHandle,
    driver: String,
    sessions: Mutex<HashMap<i32, Session>>,
}

impl WpaSupplicant {
    /// Creates a backend on an existing bus connection.
    pub fn new(conn: Connection, events: WifiHandle, config: &WifiConfig) -> Self {
        Self {
            conn,
            events,
            driver: config.supplicant_driver.clone(),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Returns `true` if wpa_supplicant is on the bus right now.
    pub async fn is_present(&self) -> Result<bool> {
        service::supplicant_present(&self.conn).await
    }

    /// Spawns a task reporting supplicant appearance and disappearance.
    pub fn watch_service(&self) -> JoinHandle<()> {
        let conn = self.conn.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            if let Err(e) = service::watch_service(&conn, &events).await {
                warn!("Supplicant service watch stopped: {e}");
            }
        })
    }

    async fn session_path(&self, index: i32) -> Result<OwnedObjectPath> {
        self.sessions
            .lock()
            .await
            .get(&index)
            .map(|s| s.path.clone())
            .ok_or(WifiError::NoSession(index))
    }

    async fn interface(&self, index: i32) -> Result<WpaInterfaceProxy<'static>> {
        let path = self.session_path(index).await?;
        Ok(WpaInterfaceProxy::builder(&self.conn)
            .path(path)?
            .build()
            .await?)
    }

    async fn interface_path(&self, interface: &str) -> Result<OwnedObjectPath> {
        let root = WpaSupplicantProxy::new(&self.conn).await?;
        match root.get_interface(interface).await {
            Ok(path) => {
                debug!("Reusing supplicant interface {path} for {interface}");
                Ok(path)
            }
            Err(e) => {
                debug!("No supplicant interface for {interface} ({e}), creating one");
                let args = HashMap::from([
                    ("Ifname", Value::from(interface)),
                    ("Driver", Value::from(self.driver.as_str())),
                ]);
                Ok(root.create_interface(args).await?)
            }
        }
    }
}

/// Builds the `AddNetwork` arguments for a connect request.
fn network_block(request: &ConnectRequest) -> Result<HashMap<&'static str, Value<'_>>> {
    let mut args = HashMap::from([("ssid", Value::from(request.ssid.clone()))]);

    let secret = match (request.security.requires_secret(), request.passphrase.as_deref()) {
        (false, _) => None,
        (true, Some(secret)) => Some(secret),
        (true, None) => return Err(WifiError::MissingProperty(property::PASSPHRASE)),
    };

    match (request.security, secret) {
        (Security::Wep, Some(key)) => {
            args.insert("key_mgmt", Value::from("NONE"));
            args.insert("wep_key0", Value::from(key));
            args.insert("wep_tx_keyidx", Value::from(0i32));
        }
        (Security::Wpa, Some(psk)) => {
            args.insert("key_mgmt", Value::from("WPA-PSK"));
            args.insert("proto", Value::from("WPA"));
            args.insert("psk", Value::from(psk));
        }
        (Security::Wpa2, Some(psk)) => {
            args.insert("key_mgmt", Value::from("WPA-PSK"));
            args.insert("proto", Value::from("RSN"));
            args.insert("psk", Value::from(psk));
        }
        _ => {
            args.insert("key_mgmt", Value::from("NONE"));
        }
    }
    Ok(args)
}

#[async_trait]
impl Supplicant for WpaSupplicant {
    async fn start(&self, index: i32, interface: &str) -> Result<()> {
        if !self.is_present().await? {
            return Err(WifiError::SupplicantUnavailable);
        }

        let path = self.interface_path(interface).await?;

        let conn = self.conn.clone();
        let events = self.events.clone();
        let monitored = path.clone();
        let monitor = tokio::spawn(async move {
            if let Err(e) = monitor_interface(&conn, monitored, index, &events).await {
                warn!("Monitor for index {index} stopped: {e}");
            }
        });

        info!("Supplicant session for {interface} at {path}");
        self.sessions
            .lock()
            .await
            .insert(index, Session { path, monitor });
        Ok(())
    }

    async fn stop(&self, index: i32) -> Result<()> {
        let Some(session) = self.sessions.lock().await.remove(&index) else {
            return Err(WifiError::NoSession(index));
        };

        let root = WpaSupplicantProxy::new(&self.conn).await?;
        root.remove_interface(session.path.clone()).await?;
        debug!("Removed supplicant interface {}", session.path);
        Ok(())
    }

    async fn scan(&self, index: i32) -> Result<()> {
        let iface = self.interface(index).await?;
        let args = HashMap::from([("Type", Value::from("active"))]);
        iface.scan(args).await?;
        debug!("index {index} scan requested");
        Ok(())
    }

    async fn connect(&self, index: i32, request: ConnectRequest) -> Result<()> {
        let args = network_block(&request)?;
        let iface = self.interface(index).await?;

        iface.remove_all_networks().await?;
        let network = iface.add_network(args).await?;
        iface.select_network(network.clone()).await?;
        debug!("index {index} selected network {network}");
        Ok(())
    }

    async fn disconnect(&self, index: i32) -> Result<()> {
        let iface = self.interface(index).await?;
        iface.disconnect().await?;
        Ok(())
    }
}
