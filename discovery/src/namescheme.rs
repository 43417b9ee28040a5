//! Mapping of VM logical network names to pod interface names.

use crate::types::{DeclaredNetwork, InterfaceStatus};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Logical network name to pod interface name.
pub type NameSchemeMapping = HashMap<String, String>;

pub const PRIMARY_POD_INTERFACE_NAME: &str = "eth0";

const ORDINAL_INTERFACE_PREFIX: &str = "net";
const HASHED_INTERFACE_PREFIX: &str = "pod";
// "pod" + 11 hex chars stays under the 15 byte kernel interface name limit.
const HASHED_INTERFACE_HASH_LEN: usize = 11;

pub fn filter_multus_non_default_networks(networks: &[DeclaredNetwork]) -> Vec<&DeclaredNetwork> {
    networks
        .iter()
        .filter(|network| network.is_secondary_multus())
        .collect()
}

/// Whether `name` follows the legacy `net<N>` secondary interface naming.
pub fn is_ordinal_secondary_interface_name(name: &str) -> bool {
    match name.strip_prefix(ORDINAL_INTERFACE_PREFIX) {
        Some(index) => !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

pub fn hashed_interface_name(network_name: &str) -> String {
    let hash = hex::encode(Sha256::digest(network_name.as_bytes()));
    format!("{}{}", HASHED_INTERFACE_PREFIX, &hash[..HASHED_INTERFACE_HASH_LEN])
}

fn is_primary(network: &DeclaredNetwork) -> bool {
    network.is_pod() || network.is_default_multus()
}

pub fn create_hashed_network_name_scheme(networks: &[DeclaredNetwork]) -> NameSchemeMapping {
    networks
        .iter()
        .map(|network| {
            let pod_iface = if is_primary(network) {
                PRIMARY_POD_INTERFACE_NAME.to_string()
            } else {
                hashed_interface_name(&network.name)
            };
            (network.name.clone(), pod_iface)
        })
        .collect()
}

/// Primary network on `eth0`, secondary Multus networks on `net1`, `net2`,
/// ... in declaration order.
pub fn create_ordinal_network_name_scheme(networks: &[DeclaredNetwork]) -> NameSchemeMapping {
    let mut mapping: NameSchemeMapping = networks
        .iter()
        .filter(|network| is_primary(network))
        .map(|network| (network.name.clone(), PRIMARY_POD_INTERFACE_NAME.to_string()))
        .collect();

    for (i, network) in filter_multus_non_default_networks(networks).into_iter().enumerate() {
        mapping.insert(
            network.name.clone(),
            format!("{}{}", ORDINAL_INTERFACE_PREFIX, i + 1),
        );
    }
    mapping
}

/// Pods created before hashed naming carry `net<N>` interfaces; keep using
/// ordinal names for them so existing links are found again.
pub fn pod_has_ordinal_interface_name(interfaces: &[InterfaceStatus]) -> bool {
    interfaces
        .iter()
        .any(|iface| is_ordinal_secondary_interface_name(&iface.name))
}

pub fn network_name_scheme(
    networks: &[DeclaredNetwork],
    interfaces: &[InterfaceStatus],
) -> NameSchemeMapping {
    if pod_has_ordinal_interface_name(interfaces) {
        create_ordinal_network_name_scheme(networks)
    } else {
        create_hashed_network_name_scheme(networks)
    }
}
