//! The plugin event loop.

use log::{debug, info, warn};
use std::sync::Arc;
use zbus::Connection;

use crate::api::backends::{LinkLayer, Supplicant, SupplicantCallback};
use crate::api::config::WifiConfig;
use crate::api::elements::{ElementRegistry, MemoryRegistry};
use crate::api::events::{
    Command, EventReceiver, LinkEvent, ServiceEvent, SupplicantEvent, WifiEvent, WifiHandle,
    channel,
};
use crate::api::models::WifiError;
use crate::core::driver::WifiDriver;
use crate::core::link::SysfsLinkLayer;
use crate::core::registry::DeviceRegistry;
use crate::core::supplicant::WpaSupplicant;
use crate::monitoring::link::watch_links;
use crate::Result;

/// Wireless device plugin.
///
/// Owns the [`DeviceRegistry`] and serializes every change to it: link
/// notifications, supplicant notifications, cleanup expiries and consumer
/// commands are handled one at a time, in arrival order, by [`run`].
///
/// # Creating an Instance
///
/// ```no_run
/// use wlanmgr::{WifiConfig, WifiPlugin};
///
/// # async fn example() -> wlanmgr::Result<()> {
/// let mut plugin = WifiPlugin::system(WifiConfig::default()).await?;
/// let handle = plugin.handle();
/// let lp = tokio::spawn(async move { plugin.run().await });
///
/// let devices = handle.devices().await?;
/// println!("{} wireless devices", devices.len());
///
/// handle.shutdown().await?;
/// lp.await.ok();
/// # Ok(())
/// # }
/// ```
///
/// Tests and embedders can build the plugin around their own collaborators
/// with [`WifiPlugin::new`].
///
/// [`run`]: WifiPlugin::run
pub struct WifiPlugin<E: ElementRegistry = MemoryRegistry> {
    registry: DeviceRegistry<E>,
    driver: WifiDriver,
    events: EventReceiver,
    handle: WifiHandle,
}

impl WifiPlugin<MemoryRegistry> {
    /// Creates a plugin on the system bus, backed by wpa_supplicant and
    /// sysfs.
    ///
    /// Starts watching rtnetlink for links coming and going, and the
    /// supplicant's bus name. If the supplicant is already running, the
    /// links present right now are enumerated once the loop runs.
    pub async fn system(config: WifiConfig) -> Result<Self> {
        let conn = Connection::system().await?;
        let (handle, events) = channel();

        if let Err(e) = watch_links(handle.clone()) {
            warn!("Live link notifications unavailable: {e}");
        }

        let supplicant = WpaSupplicant::new(conn, handle.clone(), &config);
        supplicant.watch_service();
        if supplicant.is_present().await? {
            handle.service(ServiceEvent::Appeared)?;
        } else {
            info!("wpa_supplicant is not running, waiting for it");
        }

        Ok(Self::new(
            &config,
            MemoryRegistry::new(),
            Box::new(SysfsLinkLayer::from_config(&config)),
            Arc::new(supplicant),
            handle,
            events,
        ))
    }
}

impl<E: ElementRegistry> WifiPlugin<E> {
    /// Creates a plugin around the given collaborators.
    ///
    /// `handle` and `events` must come from the same [`channel`] call; the
    /// supplicant reports its notifications through a clone of `handle`.
    pub fn new(
        config: &WifiConfig,
        elements: E,
        link: Box<dyn LinkLayer>,
        supplicant: Arc<dyn Supplicant>,
        handle: WifiHandle,
        events: EventReceiver,
    ) -> Self {
        Self {
            registry: DeviceRegistry::new(elements, link, config.cleanup_grace, handle.clone()),
            driver: WifiDriver::new(supplicant, config),
            events,
            handle,
        }
    }

    /// Returns a handle for sending events and commands to this plugin.
    pub fn handle(&self) -> WifiHandle {
        self.handle.clone()
    }

    /// The registry of tracked devices.
    pub fn registry(&self) -> &DeviceRegistry<E> {
        &self.registry
    }

    /// Handles events until a shutdown command arrives.
    ///
    /// On shutdown every device is disabled and removed before the
    /// shutdown command is answered.
    pub async fn run(&mut self) -> Result<()> {
        info!("Wireless plugin started");
        while let Some(event) = self.events.rx.recv().await {
            if !self.dispatch(event).await {
                break;
            }
        }
        info!("Wireless plugin stopped");
        Ok(())
    }

    /// Handles every event queued right now without waiting for more.
    ///
    /// Returns the number of events handled.
    pub async fn drain(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events.rx.try_recv() {
            handled += 1;
            if !self.dispatch(event).await {
                break;
            }
        }
        handled
    }

    /// Handles one event. Returns `false` once the loop should stop.
    pub(crate) async fn dispatch(&mut self, event: WifiEvent) -> bool {
        match event {
            WifiEvent::Link(LinkEvent::Added { index, link_type }) => {
                self.registry.on_link_up(index, link_type);
            }
            WifiEvent::Link(LinkEvent::Removed { index }) => {
                self.driver.remove_device(&mut self.registry, index).await;
            }
            WifiEvent::Supplicant { index, event } => self.registry.dispatch(index, event),
            WifiEvent::ScanResults { index, results } => {
                self.registry.dispatch(index, SupplicantEvent::ResultsCleared);
                for result in results {
                    self.registry
                        .dispatch(index, SupplicantEvent::NetworkObserved(result));
                }
            }
            WifiEvent::Service(ServiceEvent::Appeared) => {
                let added = self.registry.enumerate_links();
                info!("Supplicant available, {added} wireless devices added");
            }
            WifiEvent::Service(ServiceEvent::Vanished) => {
                warn!("Supplicant went away, removing all devices");
                for device in self.registry.devices() {
                    self.driver.remove_device(&mut self.registry, device.index).await;
                }
            }
            WifiEvent::CleanupDue { index, token } => {
                if let Some(retired) = self.registry.cleanup_due(index, token) {
                    debug!("index {index} cleanup retired {retired} networks");
                }
            }
            WifiEvent::Command(command) => return self.command(command).await,
        }
        true
    }

    async fn command(&mut self, command: Command) -> bool {
        // A dropped reply receiver only means the caller stopped waiting.
        match command {
            Command::EnableDevice { index, reply } => {
                let _ = reply.send(self.driver.enable_device(&mut self.registry, index).await);
            }
            Command::DisableDevice { index, reply } => {
                let _ = reply.send(self.driver.disable_device(&mut self.registry, index).await);
            }
            Command::UpdateDevice { index, reply } => {
                let _ = reply.send(self.driver.update_device(&mut self.registry, index).await);
            }
            Command::EnableNetwork { network, reply } => {
                let _ = reply.send(self.driver.enable_network(&mut self.registry, network).await);
            }
            Command::DisableNetwork { network, reply } => {
                let _ = reply.send(self.driver.disable_network(&mut self.registry, network).await);
            }
            Command::SetPassphrase {
                network,
                passphrase,
                reply,
            } => {
                let _ = reply.send(
                    self.driver
                        .set_passphrase(&mut self.registry, network, passphrase),
                );
            }
            Command::Devices { reply } => {
                let _ = reply.send(Ok(self.registry.devices()));
            }
            Command::Networks { index, reply } => {
                let networks = self
                    .registry
                    .networks(index)
                    .ok_or(WifiError::NoDevice(index));
                let _ = reply.send(networks);
            }
            Command::Shutdown { reply } => {
                self.shutdown().await;
                let _ = reply.send(Ok(()));
                return false;
            }
        }
        true
    }

    async fn shutdown(&mut self) {
        for device in self.registry.devices() {
            if device.enabled {
                if let Err(e) = self
                    .driver
                    .disable_device(&mut self.registry, device.index)
                    .await
                {
                    warn!("Failed to disable {} on shutdown: {e}", device.interface);
                }
            }
        }
        let removed = self.registry.remove_all();
        info!("Removed {} wireless devices", removed.len());
    }
}
