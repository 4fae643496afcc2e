//! Fakes for driving the plugin without D-Bus or sysfs.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use wlanmgr::{
    ConnectRequest, LinkInfo, LinkLayer, MemoryRegistry, Supplicant, WifiConfig, WifiError,
    WifiHandle, WifiPlugin, channel,
};

/// A call received by [`FakeSupplicant`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Start(i32, String),
    Stop(i32),
    Scan(i32),
    Connect(i32, ConnectRequest),
    Disconnect(i32),
}

/// Records every call and fails on demand.
#[derive(Debug, Default)]
pub struct FakeSupplicant {
    calls: Mutex<Vec<Call>>,
    fail_start: AtomicBool,
    fail_connect: AtomicBool,
}

impl FakeSupplicant {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail_start(&self, fail: bool) {
        self.fail_start.store(fail, Ordering::SeqCst);
    }

    pub fn fail_connect(&self, fail: bool) {
        self.fail_connect.store(fail, Ordering::SeqCst);
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Supplicant for FakeSupplicant {
    async fn start(&self, index: i32, interface: &str) -> wlanmgr::Result<()> {
        self.record(Call::Start(index, interface.to_string()));
        if self.fail_start.load(Ordering::SeqCst) {
            return Err(WifiError::SupplicantUnavailable);
        }
        Ok(())
    }

    async fn stop(&self, index: i32) -> wlanmgr::Result<()> {
        self.record(Call::Stop(index));
        Ok(())
    }

    async fn scan(&self, index: i32) -> wlanmgr::Result<()> {
        self.record(Call::Scan(index));
        Ok(())
    }

    async fn connect(&self, index: i32, request: ConnectRequest) -> wlanmgr::Result<()> {
        self.record(Call::Connect(index, request));
        if self.fail_connect.load(Ordering::SeqCst) {
            return Err(WifiError::SupplicantUnavailable);
        }
        Ok(())
    }

    async fn disconnect(&self, index: i32) -> wlanmgr::Result<()> {
        self.record(Call::Disconnect(index));
        Ok(())
    }
}

/// Static link table.
#[derive(Debug, Default)]
pub struct FakeLinks {
    links: HashMap<i32, (String, u16, bool)>,
}

impl FakeLinks {
    pub fn wireless(mut self, index: i32, name: &str) -> Self {
        self.links.insert(index, (name.to_string(), 1, true));
        self
    }

    pub fn wired(mut self, index: i32, name: &str) -> Self {
        self.links.insert(index, (name.to_string(), 1, false));
        self
    }
}

impl LinkLayer for FakeLinks {
    fn interface_name(&self, index: i32) -> Option<String> {
        self.links.get(&index).map(|(name, ..)| name.clone())
    }

    fn is_wireless(&self, interface: &str) -> bool {
        self.links
            .values()
            .any(|(name, _, wireless)| name == interface && *wireless)
    }

    fn links(&self) -> Vec<LinkInfo> {
        self.links
            .iter()
            .map(|(index, (name, link_type, _))| LinkInfo {
                index: *index,
                link_type: *link_type,
                name: name.clone(),
            })
            .collect()
    }
}

pub struct Harness {
    pub plugin: WifiPlugin<MemoryRegistry>,
    pub handle: WifiHandle,
    pub supplicant: Arc<FakeSupplicant>,
}

impl Harness {
    pub fn new(links: FakeLinks) -> Self {
        Self::with_config(links, WifiConfig::default())
    }

    pub fn with_config(links: FakeLinks, config: WifiConfig) -> Self {
        let (handle, events) = channel();
        let supplicant = Arc::new(FakeSupplicant::default());
        let plugin = WifiPlugin::new(
            &config,
            MemoryRegistry::new(),
            Box::new(links),
            supplicant.clone(),
            handle.clone(),
            events,
        );
        Self {
            plugin,
            handle,
            supplicant,
        }
    }

    /// Runs a handle request while the plugin handles queued events.
    pub async fn call<T>(&mut self, request: impl Future<Output = T>) -> T {
        let (out, _) = tokio::join!(request, self.plugin.drain());
        out
    }

    pub async fn settle(&mut self) -> usize {
        self.plugin.drain().await
    }
}
