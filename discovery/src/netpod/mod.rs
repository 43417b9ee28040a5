//! Discovery of the pod network state backing a VM's interfaces.
//!
//! One pass walks the declared interfaces in order, finds the pod link each
//! one is bound to and caches what later stages need to configure the guest:
//! the pod IPs for every pod-networked binding, plus the DHCP lease and the
//! domain MAC for bridge bindings. Every write either fully overwrites its
//! record or merges into it, so re-running a pass is always safe.

mod dhcp;
mod domain;
mod pod_data;

pub use dhcp::build_dhcp_config;
pub use domain::build_domain_interface;
pub use pod_data::discovered_pod_ips;

use crate::addr::{IpFamily, primary_stack_from_pod_ip};
use crate::error::{DiscoveryError, NetPodError};
use crate::namescheme::{self, NameSchemeMapping, is_ordinal_secondary_interface_name};
use crate::types::{
    Binding, DeclaredInterface, DeclaredNetwork, InterfaceState, InterfaceStatus, NetworkStatus,
};
use podnet_cache::CacheStore;
use std::sync::Arc;

/// Settings resolved once by the caller before a pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Cluster primary stack. Only needed to order dual-stack pod IPs.
    pub primary_stack: Option<IpFamily>,
}

impl DiscoveryConfig {
    pub fn from_pod_ip(pod_ip: Option<&str>) -> Self {
        Self {
            primary_stack: pod_ip.map(primary_stack_from_pod_ip),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    PodInterfaceData,
    BridgeDhcpConfig,
    BridgeDomainInterface,
}

const BRIDGE_STEPS: &[Step] = &[
    Step::PodInterfaceData,
    Step::BridgeDhcpConfig,
    Step::BridgeDomainInterface,
];
const POD_DATA_STEPS: &[Step] = &[Step::PodInterfaceData];
const NO_STEPS: &[Step] = &[];

/// Steps to run for an interface. Bindings that do not use a pod link
/// (SR-IOV, macvtap, plugins) have none.
fn discovery_steps(iface: &DeclaredInterface) -> Result<&'static [Step], NetPodError> {
    match &iface.binding {
        Some(Binding::Bridge) => Ok(BRIDGE_STEPS),
        Some(Binding::Masquerade | Binding::Passt | Binding::Slirp) => Ok(POD_DATA_STEPS),
        Some(Binding::Sriov | Binding::Macvtap | Binding::Plugin(_)) => Ok(NO_STEPS),
        None => Err(NetPodError::UnsupportedBinding(iface.name.clone())),
    }
}

pub struct NetPod {
    networks: Vec<DeclaredNetwork>,
    interfaces: Vec<DeclaredInterface>,
    vmi_uid: String,
    pod_pid: u32,
    cache: Arc<dyn CacheStore>,
    config: DiscoveryConfig,
}

impl NetPod {
    pub fn new(
        networks: Vec<DeclaredNetwork>,
        interfaces: Vec<DeclaredInterface>,
        vmi_uid: &str,
        pod_pid: u32,
        cache: Arc<dyn CacheStore>,
        config: DiscoveryConfig,
    ) -> Self {
        Self {
            networks,
            interfaces,
            vmi_uid: vmi_uid.to_string(),
            pod_pid,
            cache,
            config,
        }
    }

    /// Run one discovery pass over `status`, naming pod links with the
    /// default name scheme.
    pub fn discover(&self, status: &NetworkStatus) -> Result<(), DiscoveryError> {
        let name_scheme = namescheme::network_name_scheme(&self.networks, &status.interfaces);
        self.discover_with_name_scheme(status, &name_scheme)
    }

    /// Run one discovery pass with a caller supplied name scheme.
    ///
    /// Stops at the first fatal error. Records written before it stay in the
    /// cache.
    pub fn discover_with_name_scheme(
        &self,
        status: &NetworkStatus,
        name_scheme: &NameSchemeMapping,
    ) -> Result<(), DiscoveryError> {
        let pod_ifaces = status.interfaces_by_name();

        for iface in &self.interfaces {
            let pod_iface_name = name_scheme
                .get(&iface.name)
                .map(String::as_str)
                .unwrap_or_default();

            // TODO: handle removal of hashed-name interfaces in this pass instead of skipping them.
            if iface.state == InterfaceState::Absent && !is_ordinal_secondary_interface_name(&iface.name) {
                tracing::debug!(iface = %iface.name, "skipping interface marked for removal");
                continue;
            }

            let pod_iface = pod_ifaces.get(pod_iface_name).copied();
            self.discover_interface(status, iface, pod_iface_name, pod_iface)
                .map_err(|e| DiscoveryError::new(&iface.name, e))?;
        }

        Ok(())
    }

    fn discover_interface(
        &self,
        status: &NetworkStatus,
        iface: &DeclaredInterface,
        pod_iface_name: &str,
        pod_iface: Option<&InterfaceStatus>,
    ) -> Result<(), NetPodError> {
        let steps = discovery_steps(iface)?;
        if steps.is_empty() {
            tracing::debug!(iface = %iface.name, binding = ?iface.binding, "no pod link discovery for binding");
            return Ok(());
        }

        let pod_iface = pod_iface.ok_or_else(|| NetPodError::MissingPodInterface(pod_iface_name.to_string()))?;
        tracing::info!(iface = %iface.name, pod_iface = pod_iface_name, "discovering pod interface");

        let cache = self.cache.as_ref();
        for step in steps {
            match step {
                Step::PodInterfaceData => pod_data::store_pod_interface_data(
                    cache,
                    &self.vmi_uid,
                    iface,
                    pod_iface,
                    self.config.primary_stack,
                )?,
                Step::BridgeDhcpConfig => dhcp::store_bridge_dhcp_config(
                    cache,
                    self.pod_pid,
                    &status.routes,
                    pod_iface,
                    iface,
                    pod_iface_name,
                )?,
                Step::BridgeDomainInterface => {
                    domain::store_bridge_domain_interface(cache, self.pod_pid, pod_iface, iface)?
                }
            }
        }

        Ok(())
    }
}
