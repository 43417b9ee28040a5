//! Route table filtering and translation into DHCP static routes.

use crate::addr::{IpFamily, parse_ipv4};
use crate::error::NetPodError;
use crate::records::DhcpRoute;
use crate::types::RouteStatus;
use ipnetwork::{IpNetwork, Ipv4Network};
use std::net::IpAddr;
use std::str::FromStr;

/// Destination marker of the IPv4 default route.
pub const DEFAULT_IPV4_DESTINATION: &str = "0.0.0.0/0";

pub fn is_default_route(route: &RouteStatus) -> bool {
    route.destination == DEFAULT_IPV4_DESTINATION
}

/// Destinations must be in CIDR notation; a bare address is not a subnet.
fn parse_destination(route: &RouteStatus) -> Result<IpNetwork, NetPodError> {
    if !route.destination.contains('/') {
        return Err(NetPodError::AddressParse(format!(
            "route destination {:?} has no prefix length",
            route.destination
        )));
    }
    IpNetwork::from_str(&route.destination).map_err(|e| {
        NetPodError::AddressParse(format!("route destination {:?}: {}", route.destination, e))
    })
}

/// Family of a route. A route is IPv6 when either its destination or its
/// next hop is IPv6; an empty or unparsable next hop does not count.
pub fn route_family(route: &RouteStatus) -> Result<IpFamily, NetPodError> {
    let destination = parse_destination(route)?;
    let next_hop = IpAddr::from_str(&route.next_hop_address)
        .ok()
        .map(|ip| IpFamily::of(&ip));

    if IpFamily::of(&destination.ip()) == IpFamily::V6 || next_hop == Some(IpFamily::V6) {
        Ok(IpFamily::V6)
    } else {
        Ok(IpFamily::V4)
    }
}

/// IPv4 routes egressing through `iface`, in table order. Every route in the
/// table must carry a parsable destination.
pub fn filter_ipv4_routes_by_interface<'a>(
    routes: &'a [RouteStatus],
    iface: &str,
) -> Result<Vec<&'a RouteStatus>, NetPodError> {
    let mut link_routes = Vec::new();
    for route in routes {
        if route_family(route)? == IpFamily::V6 {
            continue;
        }
        if route.next_hop_interface == iface {
            link_routes.push(route);
        }
    }

    if link_routes.is_empty() {
        return Err(NetPodError::NoGatewayRoute(iface.to_string()));
    }
    Ok(link_routes)
}

/// Drop routes whose destination subnet holds `addr` (the link's own subnet).
/// The default route always stays.
pub fn filter_routes_by_non_local_destination<'a>(
    routes: &[&'a RouteStatus],
    addr: &Ipv4Network,
) -> Result<Vec<&'a RouteStatus>, NetPodError> {
    let mut other_routes = Vec::new();
    for route in routes {
        let destination = parse_destination(route)?;
        let local = destination.contains(IpAddr::V4(addr.ip()));
        if is_default_route(route) || !local {
            other_routes.push(*route);
        }
    }
    Ok(other_routes)
}

pub fn to_dhcp_routes(routes: &[&RouteStatus]) -> Result<Vec<DhcpRoute>, NetPodError> {
    let mut dhcp_routes = Vec::with_capacity(routes.len());
    for route in routes {
        let destination = if is_default_route(route) {
            None
        } else {
            let network = match parse_destination(route)? {
                IpNetwork::V4(network) => network,
                IpNetwork::V6(_) => {
                    return Err(NetPodError::AddressParse(format!(
                        "route destination {:?} is not IPv4",
                        route.destination
                    )));
                }
            };
            let masked = Ipv4Network::new(network.network(), network.prefix()).map_err(|e| {
                NetPodError::AddressParse(format!("route destination {:?}: {}", route.destination, e))
            })?;
            Some(masked)
        };

        dhcp_routes.push(DhcpRoute {
            destination,
            gateway: parse_ipv4(&route.next_hop_address),
        });
    }
    Ok(dhcp_routes)
}
