//! Durable key/value cache shared between the network discovery pass and
//! the consumers of its records (DHCP responder, domain builder).

mod error;
mod key;
mod storage;

pub use error::CacheError;
pub use key::CacheKey;
pub use storage::{CacheStore, FileSystemCache, MemoryCache, load, load_or_default, store};
