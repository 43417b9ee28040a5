use crate::addr::{IpFamily, first_global_unicast, sort_by_primary_stack};
use crate::error::NetPodError;
use crate::records;
use crate::types::{DeclaredInterface, InterfaceStatus};
use podnet_cache::CacheStore;

/// Pod IPs of an observed interface, primary first. `None` while the
/// interface has no global unicast address yet.
pub fn discovered_pod_ips(
    pod_iface: &InterfaceStatus,
    primary_stack: Option<IpFamily>,
) -> Result<Option<Vec<String>>, NetPodError> {
    let ipv4 = first_global_unicast(&pod_iface.ipv4);
    let ipv6 = first_global_unicast(&pod_iface.ipv6);

    let pod_ips = match (ipv4, ipv6) {
        (Some(ipv4), Some(ipv6)) => {
            let primary = primary_stack.ok_or(NetPodError::MissingStackPreferenceSignal)?;
            sort_by_primary_stack(&ipv4.ip, &ipv6.ip, primary)
        }
        (Some(ipv4), None) => vec![ipv4.ip.clone()],
        (None, Some(ipv6)) => vec![ipv6.ip.clone()],
        (None, None) => return Ok(None),
    };
    Ok(Some(pod_ips))
}

pub(super) fn store_pod_interface_data(
    cache: &dyn CacheStore,
    vmi_uid: &str,
    iface: &DeclaredInterface,
    pod_iface: &InterfaceStatus,
    primary_stack: Option<IpFamily>,
) -> Result<(), NetPodError> {
    let mut entry = records::read_pod_interface_or_default(cache, vmi_uid, &iface.name)
        .map_err(NetPodError::CacheRead)?;

    entry.iface = Some(iface.clone());

    let Some(pod_ips) = discovered_pod_ips(pod_iface, primary_stack)? else {
        tracing::debug!(
            iface = %iface.name,
            pod_iface = %pod_iface.name,
            "no global unicast address on pod interface yet"
        );
        return Ok(());
    };
    entry.pod_ip = pod_ips[0].clone();
    entry.pod_ips = pod_ips;

    records::write_pod_interface(cache, vmi_uid, &iface.name, &entry).map_err(|e| {
        tracing::error!(iface = %iface.name, "failed to write pod interface data to cache: {}", e);
        NetPodError::CacheWrite(e)
    })?;

    tracing::info!(iface = %iface.name, pod_ips = ?entry.pod_ips, "pod interface data stored");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IpAddress;

    fn dual_stack() -> InterfaceStatus {
        InterfaceStatus {
            name: "eth0".to_string(),
            ipv4: vec![IpAddress::new("10.0.0.5", 24)],
            ipv6: vec![IpAddress::new("fe80::1", 64), IpAddress::new("fd00::5", 64)],
            ..Default::default()
        }
    }

    #[test]
    fn test_dual_stack_order() {
        let ips = discovered_pod_ips(&dual_stack(), Some(IpFamily::V4)).unwrap().unwrap();
        assert_eq!(ips, vec!["10.0.0.5", "fd00::5"]);

        let ips = discovered_pod_ips(&dual_stack(), Some(IpFamily::V6)).unwrap().unwrap();
        assert_eq!(ips, vec!["fd00::5", "10.0.0.5"]);
    }

    #[test]
    fn test_dual_stack_requires_primary_stack() {
        let err = discovered_pod_ips(&dual_stack(), None).unwrap_err();
        assert!(matches!(err, NetPodError::MissingStackPreferenceSignal));
    }

    #[test]
    fn test_single_stack_needs_no_primary_stack() {
        let mut status = dual_stack();
        status.ipv6.clear();
        assert_eq!(discovered_pod_ips(&status, None).unwrap().unwrap(), vec!["10.0.0.5"]);

        let mut status = dual_stack();
        status.ipv4.clear();
        assert_eq!(discovered_pod_ips(&status, None).unwrap().unwrap(), vec!["fd00::5"]);
    }

    #[test]
    fn test_no_address_yet() {
        let status = InterfaceStatus {
            name: "eth0".to_string(),
            ipv6: vec![IpAddress::new("fe80::1", 64)],
            ..Default::default()
        };
        assert!(discovered_pod_ips(&status, None).unwrap().is_none());
    }
}
