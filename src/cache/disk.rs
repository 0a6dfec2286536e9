//! Persistent, content-addressed cache tier.
//!
//! Each entry is one small JSON file named by [`CacheKey::file_name`]. The
//! blob repeats the key, which is checked on every read, and stores floats as
//! raw IEEE-754 bits so a round trip is exact.
//!
//! Writers never touch the final path directly: the entry is written to a
//! unique temporary file in the same directory and then renamed into place.
//! Readers therefore see either no entry or a complete one, even with several
//! processes writing the same directory.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;
use serde::{Deserialize, Serialize};

use super::CacheKey;
use crate::error::{Result, StirlingError};
use crate::numeric::{LogValue, Value};
use crate::types::ParamsKey;

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum StoredValue {
    Direct { bits: u64 },
    Log { ln_abs_bits: u64, sign: i8 },
}

impl From<Value> for StoredValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Direct(x) => StoredValue::Direct { bits: x.to_bits() },
            Value::Log(v) => StoredValue::Log {
                ln_abs_bits: v.ln_abs().to_bits(),
                sign: v.sign(),
            },
        }
    }
}

impl From<StoredValue> for Value {
    fn from(stored: StoredValue) -> Self {
        match stored {
            StoredValue::Direct { bits } => Value::Direct(f64::from_bits(bits)),
            StoredValue::Log { ln_abs_bits, sign } => {
                Value::Log(LogValue::new(f64::from_bits(ln_abs_bits), sign))
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Entry {
    key: CacheKey,
    value: StoredValue,
}

/// A directory of cached values shared by any number of engines.
#[derive(Debug, Clone)]
pub struct DiskCache {
    dir: PathBuf,
}

impl DiskCache {
    /// Opens (creating if needed) a cache directory.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    /// Reads an entry; `Ok(None)` when it does not exist.
    pub fn load(&self, key: &CacheKey) -> Result<Option<Value>> {
        let path = self.path_for(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let entry: Entry = serde_json::from_slice(&bytes)?;
        if entry.key != *key {
            return Err(StirlingError::CacheIo(format!(
                "{} holds {} instead of {}",
                path.display(),
                entry.key,
                key
            )));
        }
        Ok(Some(entry.value.into()))
    }

    /// Writes an entry atomically (temporary file + rename).
    pub fn store(&self, key: &CacheKey, value: Value) -> Result<()> {
        let bytes = serde_json::to_vec(&Entry {
            key: *key,
            value: value.into(),
        })?;

        let path = self.path_for(key);
        let tmp = self.dir.join(format!(
            ".{}.{}-{}.tmp",
            key.file_name(),
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        let written = File::create(&tmp).and_then(|mut file| {
            file.write_all(&bytes)?;
            file.sync_all()
        });
        if let Err(e) = written.and_then(|_| fs::rename(&tmp, &path)) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        debug!("disk cache: stored {}", key);
        Ok(())
    }

    /// Removes entries, either all of them or only those of one parameter set.
    ///
    /// Returns the number of removed entries.
    pub fn clear(&self, params: Option<&ParamsKey>) -> Result<usize> {
        let suffix = params.map(|p| format!("-{}.json", p));
        let mut removed = 0;
        for name in self.entry_names()? {
            let matches = match &suffix {
                Some(suffix) => name.ends_with(suffix.as_str()),
                None => true,
            };
            if matches {
                fs::remove_file(self.dir.join(&name))?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Number of complete entries currently in the directory.
    pub fn len(&self) -> Result<usize> {
        Ok(self.entry_names()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn entry_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let name = entry?.file_name().to_string_lossy().into_owned();
            if !name.starts_with('.') && name.ends_with(".json") {
                names.push(name);
            }
        }
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use tempfile::TempDir;

    use super::*;
    use crate::types::{Method, Params};

    #[test]
    fn test_store_and_load() {
        let dir = TempDir::new().unwrap();
        let cache = DiskCache::open(dir.path()).unwrap();
        let key = CacheKey::new(Method::Triangular, 5, 3, &Params::lah());

        assert!(cache.load(&key).unwrap().is_none());
        cache.store(&key, Value::Direct(120.0)).unwrap();
        assert_eq!(cache.load(&key).unwrap(), Some(Value::Direct(120.0)));
        assert_eq!(cache.len().unwrap(), 1);

        let big = Value::Log(LogValue::new(1234.5678, -1));
        let big_key = CacheKey::new(Method::BottomUp, 900, 3, &Params::lah());
        cache.store(&big_key, big).unwrap();
        assert_eq!(cache.load(&big_key).unwrap(), Some(big));
    }

    #[test]
    fn test_load_rejects_mismatched_key() {
        let dir = TempDir::new().unwrap();
        let cache = DiskCache::open(dir.path()).unwrap();
        let key = CacheKey::new(Method::Triangular, 5, 3, &Params::lah());
        let other = CacheKey::new(Method::Triangular, 5, 2, &Params::lah());
        cache.store(&other, Value::Direct(240.0)).unwrap();
        fs::rename(cache.path_for(&other), cache.path_for(&key)).unwrap();

        assert!(matches!(cache.load(&key), Err(StirlingError::CacheIo(_))));
    }

    #[test]
    fn test_load_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let cache = DiskCache::open(dir.path()).unwrap();
        let key = CacheKey::new(Method::Explicit, 7, 2, &Params::second_kind());
        fs::write(cache.path_for(&key), b"{ not json").unwrap();

        assert!(matches!(cache.load(&key), Err(StirlingError::CacheIo(_))));
    }

    #[test]
    fn test_clear_by_params() {
        let dir = TempDir::new().unwrap();
        let cache = DiskCache::open(dir.path()).unwrap();
        let lah = Params::lah();
        let second = Params::second_kind();
        for n in 1..=4 {
            cache
                .store(&CacheKey::new(Method::BottomUp, n, 1, &lah), Value::Direct(1.0))
                .unwrap();
            cache
                .store(&CacheKey::new(Method::BottomUp, n, 1, &second), Value::Direct(1.0))
                .unwrap();
        }
        assert_eq!(cache.len().unwrap(), 8);
        assert_eq!(cache.clear(Some(&lah.key())).unwrap(), 4);
        assert_eq!(cache.len().unwrap(), 4);
        assert_eq!(cache.clear(None).unwrap(), 4);
        assert!(cache.is_empty().unwrap());
    }

    #[test]
    fn test_concurrent_writers_same_key() {
        let dir = TempDir::new().unwrap();
        let cache = Arc::new(DiskCache::open(dir.path()).unwrap());
        let key = CacheKey::new(Method::Symmetric, 20, 17, &Params::lah());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for _ in 0..25 {
                        cache.store(&key, Value::Direct(42.0)).unwrap();
                        if let Some(v) = cache.load(&key).unwrap() {
                            assert_eq!(v, Value::Direct(42.0));
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len().unwrap(), 1);
    }
}
