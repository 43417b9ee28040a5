pub mod addr;
mod error;
pub mod namescheme;
mod netpod;
pub mod records;
pub mod routes;
mod types;

pub use addr::IpFamily;
pub use error::{DiscoveryError, NetPodError};
pub use namescheme::NameSchemeMapping;
pub use netpod::{DiscoveryConfig, NetPod, build_dhcp_config, build_domain_interface, discovered_pod_ips};
pub use records::{DhcpConfig, DhcpRoute, DomainInterface, PodInterfaceCacheEntry};
pub use types::*;
