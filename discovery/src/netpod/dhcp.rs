use crate::addr::{first_global_unicast, format_mac, parse_ipv4, resolve_mac};
use crate::error::NetPodError;
use crate::records::{self, DhcpConfig};
use crate::routes::{filter_ipv4_routes_by_interface, filter_routes_by_non_local_destination, to_dhcp_routes};
use crate::types::{DeclaredInterface, InterfaceStatus, RouteStatus};
use ipnetwork::Ipv4Network;
use podnet_cache::CacheStore;

/// Lease data for a bridge-bound interface.
///
/// Without a global unicast IPv4 address on the pod link the guest's IPv4
/// is left unmanaged and only the IPAM-disabled flag is set. Otherwise the
/// gateway is the next hop of the first IPv4 route egressing through the
/// pod link, and the static routes are that link's routes minus the one
/// covering the link's own subnet.
pub fn build_dhcp_config(
    routes: &[RouteStatus],
    pod_iface: &InterfaceStatus,
    iface: &DeclaredInterface,
    pod_iface_name: &str,
) -> Result<DhcpConfig, NetPodError> {
    let Some(ipv4) = first_global_unicast(&pod_iface.ipv4) else {
        return Ok(DhcpConfig::ipam_disabled());
    };

    let ip = parse_ipv4(&ipv4.ip)
        .ok_or_else(|| NetPodError::AddressParse(format!("{:?} is not an IPv4 address", ipv4.ip)))?;
    let addr = Ipv4Network::new(ip, ipv4.prefix_length)
        .map_err(|e| NetPodError::AddressParse(format!("{}/{}: {}", ipv4.ip, ipv4.prefix_length, e)))?;

    let mac = resolve_mac(&pod_iface.mac_address, &iface.mac_address)?;

    let link_routes = filter_ipv4_routes_by_interface(routes, pod_iface_name)?;
    let gateway = parse_ipv4(&link_routes[0].next_hop_address);
    if gateway.is_none() {
        tracing::warn!(
            pod_iface = pod_iface_name,
            next_hop = %link_routes[0].next_hop_address,
            "first route of pod link has no IPv4 next hop"
        );
    }

    let other_routes = filter_routes_by_non_local_destination(&link_routes, &addr)?;
    let dhcp_routes = to_dhcp_routes(&other_routes)?;

    Ok(DhcpConfig {
        ipam_disabled: false,
        ip: Some(addr),
        mac: Some(format_mac(&mac)),
        gateway,
        routes: (!dhcp_routes.is_empty()).then_some(dhcp_routes),
    })
}

pub(super) fn store_bridge_dhcp_config(
    cache: &dyn CacheStore,
    pod_pid: u32,
    routes: &[RouteStatus],
    pod_iface: &InterfaceStatus,
    iface: &DeclaredInterface,
    pod_iface_name: &str,
) -> Result<(), NetPodError> {
    let config = build_dhcp_config(routes, pod_iface, iface, pod_iface_name)?;

    tracing::debug!(pod_iface = pod_iface_name, "generated DHCP config: {}", config);
    records::write_dhcp_config(cache, pod_pid, pod_iface_name, &config).map_err(NetPodError::CacheWrite)
}
