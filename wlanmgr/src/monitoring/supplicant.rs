//! Per-interface supplicant monitoring.
//!
//! Subscribes to the interface's `State` property and `ScanDone` signal and
//! translates both into events for the event loop. A completed scan is
//! read in full and then reported as a single batch.

use futures::{StreamExt, select};
use log::{debug, warn};
use std::collections::HashMap;
use std::pin::pin;
use zbus::Connection;
use zvariant::{OwnedObjectPath, OwnedValue, Value};

use crate::api::events::{SupplicantEvent, WifiHandle};
use crate::api::models::{ScanResult, SecurityFlags, SupplicantState, WifiError};
use crate::dbus::{WpaBssProxy, WpaInterfaceProxy};
use crate::util::utils::{decode_identifier, quality_from_dbm};
use crate::Result;

/// Forwards state changes and scan results of one interface until either
/// signal stream ends or the event loop goes away.
pub(crate) async fn monitor_interface(
    conn: &Connection,
    path: OwnedObjectPath,
    index: i32,
    events: &WifiHandle,
) -> Result<()> {
    let iface = WpaInterfaceProxy::builder(conn)
        .path(path.clone())?
        .build()
        .await?;

    // Subscribe to signals FIRST to avoid missing a scan between setup and loop
    let mut states = pin!(iface.receive_state_changed().await.fuse());
    let mut scans = pin!(iface.receive_scan_done().await?.fuse());
    debug!("Subscribed to State and ScanDone on {path}");

    let state = iface.state().await?;
    events.supplicant(index, SupplicantEvent::StateChanged(state.as_str().into()))?;

    loop {
        select! {
            change = states.next() => {
                let Some(change) = change else {
                    break;
                };
                match change.get().await {
                    Ok(state) => {
                        let state = SupplicantState::from(state.as_str());
                        debug!("index {index} supplicant state {state}");
                        events.supplicant(index, SupplicantEvent::StateChanged(state))?;
                    }
                    Err(e) => warn!("Failed to read State on {path}: {e}"),
                }
            }
            signal = scans.next() => {
                let Some(signal) = signal else {
                    break;
                };
                match signal.args() {
                    Ok(args) if *args.success() => report_scan(conn, &iface, index, events).await?,
                    Ok(_) => debug!("index {index} scan failed"),
                    Err(e) => warn!("Failed to parse ScanDone args: {e}"),
                }
            }
        }
    }

    warn!("Supplicant signal stream for {path} ended");
    Err(WifiError::SupplicantUnavailable)
}

async fn report_scan(
    conn: &Connection,
    iface: &WpaInterfaceProxy<'_>,
    index: i32,
    events: &WifiHandle,
) -> Result<()> {
    let paths = iface.bsss().await?;
    debug!("index {index} scan done, {} BSSs", paths.len());

    // Read everything first; the cycle is delivered as one event.
    let mut results = Vec::with_capacity(paths.len());
    for path in paths {
        if let Some(result) = read_bss(conn, path).await {
            results.push(result);
        }
    }
    events.scan_results(index, results)
}

/// Reads one BSS into a scan result. Unreadable BSSs are skipped.
async fn read_bss(conn: &Connection, path: OwnedObjectPath) -> Option<ScanResult> {
    let builder = crate::try_log!(WpaBssProxy::builder(conn).path(path), "Invalid BSS path");
    let bss = crate::try_log!(builder.build().await, "Failed to create BSS proxy");

    let ssid = crate::try_log!(bss.ssid().await, "Failed to read SSID");
    let dbm = crate::try_log!(bss.signal().await, "Failed to read Signal");

    let mut flags = SecurityFlags::empty();
    if bss.rsn().await.is_ok_and(|ie| has_key_mgmt(&ie)) {
        flags |= SecurityFlags::RSN;
    }
    if bss.wpa().await.is_ok_and(|ie| has_key_mgmt(&ie)) {
        flags |= SecurityFlags::WPA;
    }
    if flags.is_empty() && bss.privacy().await.unwrap_or(false) {
        flags |= SecurityFlags::WEP;
    }

    Some(ScanResult {
        identifier: decode_identifier(&ssid),
        ssid,
        flags,
        quality: quality_from_dbm(dbm),
    })
}

/// An information element is present when it announces key management.
fn has_key_mgmt(ie: &HashMap<String, OwnedValue>) -> bool {
    ie.get("KeyMgmt")
        .is_some_and(|v| matches!(&**v, Value::Array(a) if !a.is_empty()))
}
