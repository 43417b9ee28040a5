use crate::utils::load_json;
use clap::Args;
use podnet_cache::FileSystemCache;
use podnet_discovery::{DiscoveryConfig, NetPod, NetworkStatus, VmNetworkSpec};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Args)]
pub struct DiscoverArgs {
    /// JSON file with the VM's declared networks and interfaces
    #[arg(long)]
    spec: PathBuf,

    /// JSON file with the captured pod network status
    #[arg(long)]
    status: PathBuf,

    /// UID of the VM instance
    #[arg(long)]
    vmi_uid: String,

    /// PID of the launcher process inside the pod
    #[arg(long)]
    pod_pid: u32,

    /// IP assigned to the pod; selects the primary stack for dual-stack interfaces
    #[arg(long, env = "MY_POD_IP")]
    pod_ip: Option<String>,
}

pub fn discover(cache_dir: &Path, args: DiscoverArgs) -> Result<(), Box<dyn std::error::Error>> {
    let spec: VmNetworkSpec = load_json(&args.spec)?;
    let status: NetworkStatus = load_json(&args.status)?;

    tracing::info!("Initializing cache at {:?}", cache_dir);
    let cache = Arc::new(FileSystemCache::new(cache_dir)?);

    let config = DiscoveryConfig::from_pod_ip(args.pod_ip.as_deref());
    tracing::info!(
        "Discovering {} interface(s) for VM {} (pod pid: {}, primary stack: {:?})",
        spec.interfaces.len(),
        args.vmi_uid,
        args.pod_pid,
        config.primary_stack
    );

    let netpod = NetPod::new(
        spec.networks,
        spec.interfaces,
        &args.vmi_uid,
        args.pod_pid,
        cache,
        config,
    );
    netpod.discover(&status)?;

    println!("Discovery completed for VM {}", args.vmi_uid);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use podnet_discovery::records::{read_dhcp_config, read_domain_interface, read_pod_interface};
    use tempfile::TempDir;

    #[test]
    fn test_discover_from_files() {
        let dir = TempDir::new().unwrap();
        let spec = dir.path().join("vm.json");
        let status = dir.path().join("status.json");
        let cache_dir = dir.path().join("cache");

        std::fs::write(
            &spec,
            r#"{
                "networks": [{"name": "default", "source": {"pod": {}}}],
                "interfaces": [{"name": "default", "binding": "bridge"}]
            }"#,
        )
        .unwrap();
        std::fs::write(
            &status,
            r#"{
                "interfaces": [{
                    "name": "eth0",
                    "macAddress": "aa:bb:cc:dd:ee:ff",
                    "ipv4": [{"ip": "10.0.0.5", "prefixLength": 24}],
                    "state": "up"
                }],
                "routes": [
                    {"destination": "0.0.0.0/0", "nextHopAddress": "10.0.0.1", "nextHopInterface": "eth0"},
                    {"destination": "10.0.0.0/24", "nextHopAddress": "10.0.0.1", "nextHopInterface": "eth0"}
                ]
            }"#,
        )
        .unwrap();

        let args = DiscoverArgs {
            spec,
            status,
            vmi_uid: "uid-1".to_string(),
            pod_pid: 77,
            pod_ip: None,
        };
        discover(&cache_dir, args).unwrap();

        let cache = FileSystemCache::new(&cache_dir).unwrap();
        assert_eq!(read_pod_interface(&cache, "uid-1", "default").unwrap().pod_ip, "10.0.0.5");
        assert!(!read_dhcp_config(&cache, 77, "eth0").unwrap().ipam_disabled);
        assert_eq!(read_domain_interface(&cache, 77, "default").unwrap().mac, "aa:bb:cc:dd:ee:ff");
    }
}
