use crate::utils::print_json;
use clap::Args;
use podnet_cache::{CacheError, FileSystemCache};
use podnet_discovery::namescheme::PRIMARY_POD_INTERFACE_NAME;
use podnet_discovery::records::{read_dhcp_config, read_domain_interface, read_pod_interface};
use std::path::Path;

#[derive(Args)]
pub struct ShowArgs {
    /// Logical name of the VM interface
    iface: String,

    /// UID of the VM instance
    #[arg(long)]
    vmi_uid: String,

    /// PID of the launcher process inside the pod
    #[arg(long)]
    pod_pid: u32,

    /// Pod interface backing the VM interface, for the DHCP record
    #[arg(long, default_value = PRIMARY_POD_INTERFACE_NAME)]
    pod_iface: String,
}

fn print_record<T: serde::Serialize>(
    label: &str,
    record: Result<T, CacheError>,
) -> Result<(), Box<dyn std::error::Error>> {
    match record {
        Ok(value) => print_json(label, &value),
        Err(CacheError::NotFound(_)) => {
            println!("{}: not cached", label);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

pub fn show(cache_dir: &Path, args: ShowArgs) -> Result<(), Box<dyn std::error::Error>> {
    let cache = FileSystemCache::new(cache_dir)?;

    print_record(
        "Pod interface",
        read_pod_interface(&cache, &args.vmi_uid, &args.iface),
    )?;
    print_record(
        "DHCP config",
        read_dhcp_config(&cache, args.pod_pid, &args.pod_iface),
    )?;
    print_record(
        "Domain interface",
        read_domain_interface(&cache, args.pod_pid, &args.iface),
    )?;

    Ok(())
}
