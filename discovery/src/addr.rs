//! Address family, unicast classification and MAC helpers.

use crate::error::NetPodError;
use crate::types::IpAddress;
use mac_address::MacAddress;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpFamily {
    V4,
    V6,
}

impl IpFamily {
    /// IPv4-mapped IPv6 addresses are classified as IPv4.
    pub fn of(ip: &IpAddr) -> Self {
        match ip {
            IpAddr::V4(_) => IpFamily::V4,
            IpAddr::V6(v6) if v6.to_ipv4_mapped().is_some() => IpFamily::V4,
            IpAddr::V6(_) => IpFamily::V6,
        }
    }
}

impl std::fmt::Display for IpFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IpFamily::V4 => write!(f, "ipv4"),
            IpFamily::V6 => write!(f, "ipv6"),
        }
    }
}

/// Collapse IPv4-mapped IPv6 addresses to plain IPv4.
fn canonical(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map(IpAddr::V4).unwrap_or(IpAddr::V6(v6)),
        v4 => v4,
    }
}

/// Parse an address string as IPv4, accepting the IPv4-mapped IPv6 form.
pub fn parse_ipv4(s: &str) -> Option<Ipv4Addr> {
    match canonical(IpAddr::from_str(s).ok()?) {
        IpAddr::V4(v4) => Some(v4),
        IpAddr::V6(_) => None,
    }
}

/// Routable unicast: not unspecified, loopback, multicast, link-local or the
/// IPv4 limited broadcast address.
pub fn is_global_unicast(ip: &IpAddr) -> bool {
    match canonical(*ip) {
        IpAddr::V4(v4) => {
            !(v4.is_unspecified()
                || v4.is_loopback()
                || v4.is_multicast()
                || v4.is_link_local()
                || v4.is_broadcast())
        }
        IpAddr::V6(v6) => {
            !(v6.is_unspecified()
                || v6.is_loopback()
                || v6.is_multicast()
                || v6.is_unicast_link_local())
        }
    }
}

/// First address of the list, in list order, that is global unicast.
/// Entries that do not parse are skipped.
pub fn first_global_unicast(addresses: &[IpAddress]) -> Option<&IpAddress> {
    addresses.iter().find(|addr| {
        IpAddr::from_str(&addr.ip)
            .map(|ip| is_global_unicast(&ip))
            .unwrap_or(false)
    })
}

/// Cluster primary stack as reported by the pod's assigned IP. Anything that
/// is not a plain IPv6 address counts as an IPv4 primary.
pub fn primary_stack_from_pod_ip(pod_ip: &str) -> IpFamily {
    match IpAddr::from_str(pod_ip.trim()) {
        Ok(ip) => IpFamily::of(&ip),
        Err(_) => IpFamily::V4,
    }
}

/// Order a dual-stack pair so that the primary stack's address comes first.
pub fn sort_by_primary_stack(ipv4: &str, ipv6: &str, primary: IpFamily) -> Vec<String> {
    match primary {
        IpFamily::V4 => vec![ipv4.to_string(), ipv6.to_string()],
        IpFamily::V6 => vec![ipv6.to_string(), ipv4.to_string()],
    }
}

/// Link-layer address of a pod interface. Ethernet MACs are the common
/// case; 8 and 20 octet addresses (EUI-64, InfiniBand) keep their raw octets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HardwareAddr {
    Ethernet(MacAddress),
    Extended(Vec<u8>),
}

const HARDWARE_ADDR_LENGTHS: [usize; 3] = [6, 8, 20];

/// Octets of `s` in one of the forms `aa:bb:cc:dd:ee:ff`,
/// `aa-bb-cc-dd-ee-ff` or `aabb.ccdd.eeff`, for 6, 8 or 20 octet addresses.
fn parse_hardware_addr(s: &str) -> Option<Vec<u8>> {
    let bytes = s.as_bytes();
    let (separator, group_len) = match *bytes.get(2)? {
        b':' => (':', 2),
        b'-' => ('-', 2),
        _ if bytes.get(4) == Some(&b'.') => ('.', 4),
        _ => return None,
    };

    let mut octets = Vec::with_capacity(20);
    for group in s.split(separator) {
        if group.len() != group_len {
            return None;
        }
        octets.extend(hex::decode(group).ok()?);
    }
    HARDWARE_ADDR_LENGTHS.contains(&octets.len()).then_some(octets)
}

/// Resolve the MAC the guest should see: the declared override when set,
/// the observed pod interface MAC otherwise.
pub fn resolve_mac(observed: &str, declared: &str) -> Result<HardwareAddr, NetPodError> {
    let mac = if declared.is_empty() { observed } else { declared };
    let octets = parse_hardware_addr(mac.trim())
        .ok_or_else(|| NetPodError::AddressParse(format!("invalid MAC address {:?}", mac)))?;

    Ok(match <[u8; 6]>::try_from(octets.as_slice()) {
        Ok(eui48) => HardwareAddr::Ethernet(MacAddress::new(eui48)),
        Err(_) => HardwareAddr::Extended(octets),
    })
}

/// Lowercase, colon separated rendering of a hardware address.
pub fn format_mac(mac: &HardwareAddr) -> String {
    let octets = match mac {
        HardwareAddr::Ethernet(mac) => mac.bytes().to_vec(),
        HardwareAddr::Extended(octets) => octets.clone(),
    };
    octets
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(":")
}
