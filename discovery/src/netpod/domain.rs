use crate::addr::{format_mac, resolve_mac};
use crate::error::NetPodError;
use crate::records::{self, DomainInterface};
use crate::types::{DeclaredInterface, InterfaceStatus};
use podnet_cache::CacheStore;

pub fn build_domain_interface(
    pod_iface: &InterfaceStatus,
    iface: &DeclaredInterface,
) -> Result<DomainInterface, NetPodError> {
    let mac = resolve_mac(&pod_iface.mac_address, &iface.mac_address)?;
    Ok(DomainInterface { mac: format_mac(&mac) })
}

pub(super) fn store_bridge_domain_interface(
    cache: &dyn CacheStore,
    pod_pid: u32,
    pod_iface: &InterfaceStatus,
    iface: &DeclaredInterface,
) -> Result<(), NetPodError> {
    let domain_iface = build_domain_interface(pod_iface, iface)?;

    tracing::debug!(iface = %iface.name, mac = %domain_iface.mac, "generated domain interface data");
    records::write_domain_interface(cache, pod_pid, &iface.name, &domain_iface)
        .map_err(NetPodError::CacheWrite)
}
