use podnet_cache::CacheError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NetPodError {
    #[error("pod link ({0}) is missing")]
    MissingPodInterface(String),

    #[error("undefined binding method for interface {0}")]
    UnsupportedBinding(String),

    #[error("failed to read cache: {0}")]
    CacheRead(#[source] CacheError),

    #[error("failed to write cache: {0}")]
    CacheWrite(#[source] CacheError),

    #[error("invalid address: {0}")]
    AddressParse(String),

    #[error("no gateway address found in routes for {0}")]
    NoGatewayRoute(String),

    #[error("dual-stack interface requires the pod IP to determine the primary stack")]
    MissingStackPreferenceSignal,
}

/// First fatal error of a discovery pass, tagged with the logical interface
/// it was raised for.
#[derive(Error, Debug)]
#[error("network discovery failed for interface {iface}: {source}")]
pub struct DiscoveryError {
    pub iface: String,
    #[source]
    pub source: NetPodError,
}

impl DiscoveryError {
    pub fn new(iface: &str, source: NetPodError) -> Self {
        Self {
            iface: iface.to_string(),
            source,
        }
    }

    pub fn kind(&self) -> &NetPodError {
        &self.source
    }
}
