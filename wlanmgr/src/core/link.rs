//! Link-layer view backed by sysfs.
//!
//! Reads `/sys/class/net/<iface>/{ifindex,type,address}` and decides
//! wireless capability from the presence of `wireless/` or `phy80211/`.

use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

use crate::api::backends::LinkLayer;
use crate::api::config::WifiConfig;
use crate::api::events::LinkInfo;
use crate::util::utils::ident_from_mac;

/// [`LinkLayer`] reading interface attributes from sysfs.
#[derive(Debug, Clone)]
pub struct SysfsLinkLayer {
    root: PathBuf,
}

impl SysfsLinkLayer {
    /// Reads links below `root` (normally `/sys/class/net`).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_config(config: &WifiConfig) -> Self {
        Self::new(config.sysfs_root.clone())
    }

    fn read_attr(&self, interface: &str, attr: &str) -> Option<String> {
        fs::read_to_string(self.root.join(interface).join(attr))
            .ok()
            .map(|s| s.trim().to_string())
    }

    fn read_number<T: std::str::FromStr>(&self, interface: &str, attr: &str) -> Option<T> {
        self.read_attr(interface, attr)?.parse().ok()
    }

    fn interfaces(&self) -> Vec<String> {
        match fs::read_dir(&self.root) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .filter_map(|e| e.file_name().into_string().ok())
                .collect(),
            Err(e) => {
                debug!("Cannot list {}: {e}", self.root.display());
                Vec::new()
            }
        }
    }
}

impl Default for SysfsLinkLayer {
    fn default() -> Self {
        Self::from_config(&WifiConfig::default())
    }
}

fn exists(path: &Path) -> bool {
    path.try_exists().unwrap_or(false)
}

impl LinkLayer for SysfsLinkLayer {
    fn interface_name(&self, index: i32) -> Option<String> {
        self.interfaces()
            .into_iter()
            .find(|name| self.read_number::<i32>(name, "ifindex") == Some(index))
    }

    fn is_wireless(&self, interface: &str) -> bool {
        let dir = self.root.join(interface);
        exists(&dir.join("wireless")) || exists(&dir.join("phy80211"))
    }

    fn ident(&self, index: i32) -> Option<String> {
        let name = self.interface_name(index)?;
        ident_from_mac(&self.read_attr(&name, "address")?)
    }

    fn links(&self) -> Vec<LinkInfo> {
        let mut links: Vec<LinkInfo> = self
            .interfaces()
            .into_iter()
            .filter_map(|name| {
                Some(LinkInfo {
                    index: self.read_number(&name, "ifindex")?,
                    link_type: self.read_number(&name, "type")?,
                    name,
                })
            })
            .collect();
        links.sort_by_key(|l| l.index);
        links
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    struct FakeSysfs {
        root: PathBuf,
    }

    impl FakeSysfs {
        fn new() -> Self {
            let root = std::env::temp_dir().join(format!("wlanmgr-sysfs-{}", Uuid::new_v4()));
            fs::create_dir_all(&root).unwrap();
            Self { root }
        }

        fn link(self, name: &str, index: i32, kind: u16, mac: &str, wireless: bool) -> Self {
            let dir = self.root.join(name);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("ifindex"), format!("{index}\n")).unwrap();
            fs::write(dir.join("type"), format!("{kind}\n")).unwrap();
            fs::write(dir.join("address"), format!("{mac}\n")).unwrap();
            if wireless {
                fs::create_dir_all(dir.join("phy80211")).unwrap();
            }
            self
        }
    }

    impl Drop for FakeSysfs {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.root);
        }
    }

    #[test]
    fn resolves_links_from_sysfs() {
        let sysfs = FakeSysfs::new()
            .link("lo", 1, 772, "00:00:00:00:00:00", false)
            .link("eth0", 2, 1, "52:54:00:12:34:56", false)
            .link("wlan0", 3, 1, "AA:BB:CC:DD:EE:FF", true);
        let layer = SysfsLinkLayer::new(&sysfs.root);

        assert_eq!(layer.interface_name(3).as_deref(), Some("wlan0"));
        assert_eq!(layer.interface_name(9), None);
        assert!(layer.is_wireless("wlan0"));
        assert!(!layer.is_wireless("eth0"));
        assert_eq!(layer.ident(3).as_deref(), Some("dev_aabbccddeeff"));
        assert_eq!(layer.ident(1), None);

        let indices: Vec<i32> = layer.links().iter().map(|l| l.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }

    #[test]
    fn missing_root_has_no_links() {
        let layer = SysfsLinkLayer::new("/nonexistent/wlanmgr");
        assert!(layer.links().is_empty());
        assert_eq!(layer.interface_name(1), None);
    }
}
