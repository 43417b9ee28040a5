//! Records produced by discovery and their cache locations.

use crate::types::DeclaredInterface;
use ipnetwork::Ipv4Network;
use podnet_cache::{CacheError, CacheKey, CacheStore, load, load_or_default, store};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::net::Ipv4Addr;

/// Per-VM record of the pod side of one logical interface.
///
/// Fields this crate does not know about are carried through `extra` so a
/// read-modify-write cycle never drops data written by someone else.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PodInterfaceCacheEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iface: Option<DeclaredInterface>,
    #[serde(default, rename = "podIP", skip_serializing_if = "String::is_empty")]
    pub pod_ip: String,
    #[serde(default, rename = "podIPs", skip_serializing_if = "Vec::is_empty")]
    pub pod_ips: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Static route handed to the guest. A missing destination is the default
/// route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DhcpRoute {
    #[serde(default, rename = "Dst", skip_serializing_if = "Option::is_none")]
    pub destination: Option<Ipv4Network>,
    #[serde(default, rename = "Gw", skip_serializing_if = "Option::is_none")]
    pub gateway: Option<Ipv4Addr>,
}

/// Lease served by the DHCP responder for a bridge-bound interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DhcpConfig {
    #[serde(rename = "IPAMDisabled")]
    pub ipam_disabled: bool,
    #[serde(default, rename = "IP", skip_serializing_if = "Option::is_none")]
    pub ip: Option<Ipv4Network>,
    #[serde(default, rename = "MAC", skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    #[serde(default, rename = "Gateway", skip_serializing_if = "Option::is_none")]
    pub gateway: Option<Ipv4Addr>,
    #[serde(default, rename = "Routes", skip_serializing_if = "Option::is_none")]
    pub routes: Option<Vec<DhcpRoute>>,
}

impl DhcpConfig {
    pub fn ipam_disabled() -> Self {
        Self {
            ipam_disabled: true,
            ..Default::default()
        }
    }
}

fn or_none<T: fmt::Display>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "<none>".to_string())
}

impl fmt::Display for DhcpRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.destination {
            Some(dst) => write!(f, "{} via {}", dst, or_none(&self.gateway)),
            None => write!(f, "default via {}", or_none(&self.gateway)),
        }
    }
}

impl fmt::Display for DhcpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ipam_disabled {
            return write!(f, "IPAMDisabled: true");
        }
        write!(
            f,
            "IP: {}, MAC: {}, Gateway: {}",
            or_none(&self.ip),
            self.mac.as_deref().unwrap_or("<none>"),
            or_none(&self.gateway)
        )?;
        if let Some(routes) = &self.routes {
            let routes: Vec<String> = routes.iter().map(|r| r.to_string()).collect();
            write!(f, ", Routes: [{}]", routes.join(", "))?;
        }
        Ok(())
    }
}

/// Hypervisor domain data for a bridge-bound interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainInterface {
    #[serde(rename = "MAC")]
    pub mac: String,
}

pub fn read_pod_interface(
    cache: &dyn CacheStore,
    vmi_uid: &str,
    iface: &str,
) -> Result<PodInterfaceCacheEntry, CacheError> {
    load(cache, &CacheKey::pod_interface(vmi_uid, iface))
}

/// Like [`read_pod_interface`], with a never-written record read as empty.
pub fn read_pod_interface_or_default(
    cache: &dyn CacheStore,
    vmi_uid: &str,
    iface: &str,
) -> Result<PodInterfaceCacheEntry, CacheError> {
    load_or_default(cache, &CacheKey::pod_interface(vmi_uid, iface))
}

pub fn write_pod_interface(
    cache: &dyn CacheStore,
    vmi_uid: &str,
    iface: &str,
    entry: &PodInterfaceCacheEntry,
) -> Result<(), CacheError> {
    store(cache, &CacheKey::pod_interface(vmi_uid, iface), entry)
}

pub fn read_dhcp_config(cache: &dyn CacheStore, pod_pid: u32, pod_iface: &str) -> Result<DhcpConfig, CacheError> {
    load(cache, &CacheKey::dhcp_config(pod_pid, pod_iface))
}

pub fn write_dhcp_config(
    cache: &dyn CacheStore,
    pod_pid: u32,
    pod_iface: &str,
    config: &DhcpConfig,
) -> Result<(), CacheError> {
    store(cache, &CacheKey::dhcp_config(pod_pid, pod_iface), config)
}

pub fn read_domain_interface(
    cache: &dyn CacheStore,
    pod_pid: u32,
    iface: &str,
) -> Result<DomainInterface, CacheError> {
    load(cache, &CacheKey::domain_interface(pod_pid, iface))
}

pub fn write_domain_interface(
    cache: &dyn CacheStore,
    pod_pid: u32,
    iface: &str,
    domain_iface: &DomainInterface,
) -> Result<(), CacheError> {
    store(cache, &CacheKey::domain_interface(pod_pid, iface), domain_iface)
}

#[cfg(test)]
mod tests {
    use super::*;
    use podnet_cache::MemoryCache;

    #[test]
    fn test_ipam_disabled_serializes_alone() {
        let json = serde_json::to_string(&DhcpConfig::ipam_disabled()).unwrap();
        assert_eq!(json, r#"{"IPAMDisabled":true}"#);
    }

    #[test]
    fn test_dhcp_config_json_layout() {
        let config = DhcpConfig {
            ipam_disabled: false,
            ip: Some(Ipv4Network::new(Ipv4Addr::new(10, 0, 0, 5), 24).unwrap()),
            mac: Some("aa:bb:cc:dd:ee:ff".to_string()),
            gateway: Some(Ipv4Addr::new(10, 0, 0, 1)),
            routes: Some(vec![DhcpRoute {
                destination: None,
                gateway: Some(Ipv4Addr::new(10, 0, 0, 1)),
            }]),
        };

        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["IPAMDisabled"], false);
        assert_eq!(value["IP"], "10.0.0.5/24");
        assert_eq!(value["MAC"], "aa:bb:cc:dd:ee:ff");
        assert_eq!(value["Gateway"], "10.0.0.1");
        assert_eq!(value["Routes"][0]["Gw"], "10.0.0.1");
        assert!(value["Routes"][0].get("Dst").is_none());
    }

    #[test]
    fn test_dhcp_config_display() {
        assert_eq!(DhcpConfig::ipam_disabled().to_string(), "IPAMDisabled: true");

        let config = DhcpConfig {
            ipam_disabled: false,
            ip: Some(Ipv4Network::new(Ipv4Addr::new(10, 0, 0, 5), 24).unwrap()),
            mac: Some("aa:bb:cc:dd:ee:ff".to_string()),
            gateway: Some(Ipv4Addr::new(10, 0, 0, 1)),
            routes: Some(vec![DhcpRoute {
                destination: None,
                gateway: Some(Ipv4Addr::new(10, 0, 0, 1)),
            }]),
        };
        assert_eq!(
            config.to_string(),
            "IP: 10.0.0.5/24, MAC: aa:bb:cc:dd:ee:ff, Gateway: 10.0.0.1, Routes: [default via 10.0.0.1]"
        );
    }

    #[test]
    fn test_pod_interface_entry_preserves_unknown_fields() {
        let cache = MemoryCache::new();
        let key = CacheKey::pod_interface("uid", "default");
        cache
            .write(&key, br#"{"podIP":"10.0.0.9","podIPs":["10.0.0.9"],"migrationSource":true}"#)
            .unwrap();

        let mut entry = read_pod_interface_or_default(&cache, "uid", "default").unwrap();
        assert_eq!(entry.pod_ip, "10.0.0.9");
        entry.pod_ip = "10.0.0.5".to_string();
        entry.pod_ips = vec!["10.0.0.5".to_string()];
        write_pod_interface(&cache, "uid", "default", &entry).unwrap();

        let stored = read_pod_interface(&cache, "uid", "default").unwrap();
        assert_eq!(stored.pod_ip, "10.0.0.5");
        assert_eq!(stored.extra.get("migrationSource"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_missing_pod_interface_reads_as_default() {
        let cache = MemoryCache::new();
        let entry = read_pod_interface_or_default(&cache, "uid", "default").unwrap();
        assert_eq!(entry, PodInterfaceCacheEntry::default());
        assert!(read_pod_interface(&cache, "uid", "default").unwrap_err().is_not_found());
    }
}
