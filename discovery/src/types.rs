use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Mechanism wiring a VM interface to the pod network namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Binding {
    Bridge,
    Masquerade,
    Passt,
    Slirp,
    Sriov,
    Macvtap,
    /// Binding delegated to a named network binding plugin.
    Plugin(String),
}

impl std::fmt::Display for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Binding::Bridge => write!(f, "bridge"),
            Binding::Masquerade => write!(f, "masquerade"),
            Binding::Passt => write!(f, "passt"),
            Binding::Slirp => write!(f, "slirp"),
            Binding::Sriov => write!(f, "sriov"),
            Binding::Macvtap => write!(f, "macvtap"),
            Binding::Plugin(name) => write!(f, "plugin({})", name),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceState {
    #[default]
    Present,
    Absent,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredInterface {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<Binding>,
    #[serde(default, rename = "macAddress", skip_serializing_if = "String::is_empty")]
    pub mac_address: String,
    #[serde(default)]
    pub state: InterfaceState,
}

impl DeclaredInterface {
    pub fn new(name: &str, binding: Binding) -> Self {
        Self {
            name: name.to_string(),
            binding: Some(binding),
            ..Default::default()
        }
    }

    pub fn with_mac(mut self, mac: &str) -> Self {
        self.mac_address = mac.to_string();
        self
    }

    pub fn with_state(mut self, state: InterfaceState) -> Self {
        self.state = state;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkSource {
    Pod {},
    Multus {
        #[serde(rename = "networkName")]
        network_name: String,
        #[serde(default)]
        default: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredNetwork {
    pub name: String,
    pub source: NetworkSource,
}

impl DeclaredNetwork {
    pub fn pod(name: &str) -> Self {
        Self {
            name: name.to_string(),
            source: NetworkSource::Pod {},
        }
    }

    pub fn multus(name: &str, network_name: &str) -> Self {
        Self {
            name: name.to_string(),
            source: NetworkSource::Multus {
                network_name: network_name.to_string(),
                default: false,
            },
        }
    }

    pub fn is_pod(&self) -> bool {
        matches!(self.source, NetworkSource::Pod {})
    }

    pub fn is_default_multus(&self) -> bool {
        matches!(self.source, NetworkSource::Multus { default: true, .. })
    }

    pub fn is_secondary_multus(&self) -> bool {
        matches!(self.source, NetworkSource::Multus { default: false, .. })
    }
}

/// Network declarations of one VM, paired by logical name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmNetworkSpec {
    #[serde(default)]
    pub networks: Vec<DeclaredNetwork>,
    #[serde(default)]
    pub interfaces: Vec<DeclaredInterface>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkState {
    Up,
    Down,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpAddress {
    pub ip: String,
    #[serde(rename = "prefixLength")]
    pub prefix_length: u8,
}

impl IpAddress {
    pub fn new(ip: &str, prefix_length: u8) -> Self {
        Self {
            ip: ip.to_string(),
            prefix_length,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceStatus {
    pub name: String,
    #[serde(default, rename = "macAddress")]
    pub mac_address: String,
    #[serde(default)]
    pub ipv4: Vec<IpAddress>,
    #[serde(default)]
    pub ipv6: Vec<IpAddress>,
    #[serde(default)]
    pub state: LinkState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteStatus {
    pub destination: String,
    #[serde(default, rename = "nextHopAddress")]
    pub next_hop_address: String,
    #[serde(default, rename = "nextHopInterface")]
    pub next_hop_interface: String,
}

impl RouteStatus {
    pub fn new(destination: &str, next_hop_address: &str, next_hop_interface: &str) -> Self {
        Self {
            destination: destination.to_string(),
            next_hop_address: next_hop_address.to_string(),
            next_hop_interface: next_hop_interface.to_string(),
        }
    }
}

/// Point-in-time view of the pod network namespace. One snapshot serves one
/// discovery pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkStatus {
    #[serde(default)]
    pub interfaces: Vec<InterfaceStatus>,
    #[serde(default)]
    pub routes: Vec<RouteStatus>,
}

impl NetworkStatus {
    pub fn interfaces_by_name(&self) -> HashMap<&str, &InterfaceStatus> {
        self.interfaces
            .iter()
            .map(|iface| (iface.name.as_str(), iface))
            .collect()
    }
}
