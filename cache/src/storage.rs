use crate::error::CacheError;
use crate::key::CacheKey;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Raw get/put access to the cache backing store.
///
/// Implementations must report a missing record as [`CacheError::NotFound`]
/// so callers can tell a first discovery apart from a broken store.
pub trait CacheStore: Send + Sync {
    fn read(&self, key: &CacheKey) -> Result<Vec<u8>, CacheError>;

    fn write(&self, key: &CacheKey, data: &[u8]) -> Result<(), CacheError>;
}

pub struct FileSystemCache {
    root: PathBuf,
}

impl FileSystemCache {
    pub fn new(root: impl AsRef<Path>) -> Result<Self, CacheError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, key: &CacheKey) -> PathBuf {
        self.root.join(key.relative_path())
    }
}

impl CacheStore for FileSystemCache {
    fn read(&self, key: &CacheKey) -> Result<Vec<u8>, CacheError> {
        let path = self.record_path(key);
        match fs::read(&path) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(CacheError::NotFound(key.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &CacheKey, data: &[u8]) -> Result<(), CacheError> {
        let path = self.record_path(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&path, data)?;
        tracing::debug!(path = %path.display(), size = data.len(), "cache record written");
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryCache {
    records: RwLock<BTreeMap<CacheKey, Vec<u8>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.records
            .read()
            .map(|r| r.contains_key(key))
            .unwrap_or(false)
    }
}

impl CacheStore for MemoryCache {
    fn read(&self, key: &CacheKey) -> Result<Vec<u8>, CacheError> {
        let records = self
            .records
            .read()
            .map_err(|_| std::io::Error::other("memory cache lock poisoned"))?;
        records
            .get(key)
            .cloned()
            .ok_or_else(|| CacheError::NotFound(key.to_string()))
    }

    fn write(&self, key: &CacheKey, data: &[u8]) -> Result<(), CacheError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| std::io::Error::other("memory cache lock poisoned"))?;
        records.insert(key.clone(), data.to_vec());
        Ok(())
    }
}

/// Read and decode a record.
pub fn load<T: DeserializeOwned>(cache: &dyn CacheStore, key: &CacheKey) -> Result<T, CacheError> {
    let data = cache.read(key)?;
    Ok(serde_json::from_slice(&data)?)
}

/// Read and decode a record, starting from `T::default()` when it was never
/// written. Any other failure is returned unchanged.
pub fn load_or_default<T>(cache: &dyn CacheStore, key: &CacheKey) -> Result<T, CacheError>
where
    T: DeserializeOwned + Default,
{
    match load(cache, key) {
        Ok(value) => Ok(value),
        Err(CacheError::NotFound(_)) => Ok(T::default()),
        Err(e) => Err(e),
    }
}

/// Encode and write a record, replacing whatever was stored under `key`.
pub fn store<T: Serialize>(cache: &dyn CacheStore, key: &CacheKey, value: &T) -> Result<(), CacheError> {
    let data = serde_json::to_vec_pretty(value)?;
    cache.write(key, &data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Record {
        name: String,
        count: u32,
    }

    fn create_test_cache() -> (FileSystemCache, TempDir) {
        let dir = TempDir::new().unwrap();
        let cache = FileSystemCache::new(dir.path().join("cache")).unwrap();
        (cache, dir)
    }

    #[test]
    fn test_filesystem_missing_record_is_not_found() {
        let (cache, _dir) = create_test_cache();
        let err = cache.read(&CacheKey::pod_interface("uid", "default")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_filesystem_write_creates_parent_dirs() {
        let (cache, _dir) = create_test_cache();
        let key = CacheKey::dhcp_config(1234, "eth0");

        cache.write(&key, b"{}").unwrap();

        assert!(cache.root().join("1234").join("dhcp-eth0.json").exists());
        assert_eq!(cache.read(&key).unwrap(), b"{}");
    }

    #[test]
    fn test_filesystem_read_error_is_not_not_found() {
        let (cache, _dir) = create_test_cache();
        let key = CacheKey::domain_interface(1, "default");
        // A directory where the record file should be makes the read fail.
        fs::create_dir_all(cache.root().join(key.relative_path())).unwrap();

        let err = cache.read(&key).unwrap_err();
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_load_or_default_on_missing() {
        let cache = MemoryCache::new();
        let record: Record = load_or_default(&cache, &CacheKey::pod_interface("uid", "a")).unwrap();
        assert_eq!(record, Record::default());
    }

    #[test]
    fn test_load_or_default_propagates_decode_error() {
        let cache = MemoryCache::new();
        let key = CacheKey::pod_interface("uid", "a");
        cache.write(&key, b"not json").unwrap();

        let err = load_or_default::<Record>(&cache, &key).unwrap_err();
        assert!(matches!(err, CacheError::Serialization(_)));
    }

    #[test]
    fn test_store_then_load() {
        let (cache, _dir) = create_test_cache();
        let key = CacheKey::domain_interface(99, "default");
        let record = Record {
            name: "default".to_string(),
            count: 3,
        };

        store(&cache, &key, &record).unwrap();
        let loaded: Record = load(&cache, &key).unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn test_memory_cache_overwrite() {
        let cache = MemoryCache::new();
        let key = CacheKey::dhcp_config(1, "eth0");
        assert!(cache.is_empty());

        cache.write(&key, b"first").unwrap();
        cache.write(&key, b"second").unwrap();

        assert_eq!(cache.len(), 1);
        assert!(cache.contains(&key));
        assert_eq!(cache.read(&key).unwrap(), b"second");
    }
}
