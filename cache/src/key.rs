use std::fmt;
use std::path::PathBuf;

/// Location of a single cached record.
///
/// Pod interface records are owned by the VM and keyed by its UID. DHCP and
/// domain records belong to the launcher process and are keyed by its PID.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CacheKey {
    PodInterface { vmi_uid: String, iface: String },
    DhcpConfig { pod_pid: u32, iface: String },
    DomainInterface { pod_pid: u32, iface: String },
}

impl CacheKey {
    pub fn pod_interface(vmi_uid: &str, iface: &str) -> Self {
        CacheKey::PodInterface {
            vmi_uid: vmi_uid.to_string(),
            iface: iface.to_string(),
        }
    }

    pub fn dhcp_config(pod_pid: u32, iface: &str) -> Self {
        CacheKey::DhcpConfig {
            pod_pid,
            iface: iface.to_string(),
        }
    }

    pub fn domain_interface(pod_pid: u32, iface: &str) -> Self {
        CacheKey::DomainInterface {
            pod_pid,
            iface: iface.to_string(),
        }
    }

    /// Path of the record relative to the cache root.
    pub fn relative_path(&self) -> PathBuf {
        match self {
            CacheKey::PodInterface { vmi_uid, iface } => {
                PathBuf::from(vmi_uid).join(format!("pod-interface-{}.json", iface))
            }
            CacheKey::DhcpConfig { pod_pid, iface } => {
                PathBuf::from(pod_pid.to_string()).join(format!("dhcp-{}.json", iface))
            }
            CacheKey::DomainInterface { pod_pid, iface } => {
                PathBuf::from(pod_pid.to_string()).join(format!("domain-{}.json", iface))
            }
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.relative_path().display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_paths() {
        assert_eq!(
            CacheKey::pod_interface("1234-abcd", "default").relative_path(),
            PathBuf::from("1234-abcd/pod-interface-default.json")
        );
        assert_eq!(
            CacheKey::dhcp_config(42, "eth0").relative_path(),
            PathBuf::from("42/dhcp-eth0.json")
        );
        assert_eq!(
            CacheKey::domain_interface(42, "default").relative_path(),
            PathBuf::from("42/domain-default.json")
        );
    }

    #[test]
    fn test_display() {
        let key = CacheKey::dhcp_config(7, "pod16477688c0e");
        assert_eq!(key.to_string(), "7/dhcp-pod16477688c0e.json");
    }
}
