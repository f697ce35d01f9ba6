//! Platform-specific implementations
//!
//! Key-value persistence backing the key custody store and the session
//! repository. Values are plain strings; the layout carries no schema version
//! and no encryption at rest, matching what the mobile shell expects to find.

use crate::shared::error::WalletError;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Persistent string-to-string map
pub trait PlatformStorage: Send + Sync {
    /// Store a value, replacing any previous one
    fn store(&self, key: &str, value: &str) -> Result<(), WalletError>;

    /// Retrieve a value, `None` when absent
    fn retrieve(&self, key: &str) -> Result<Option<String>, WalletError>;

    /// Delete a value; deleting a missing key is not an error
    fn delete(&self, key: &str) -> Result<(), WalletError>;

    /// Check if a value exists
    fn exists(&self, key: &str) -> Result<bool, WalletError> {
        Ok(self.retrieve(key)?.is_some())
    }

    /// List all stored keys
    fn list_keys(&self) -> Result<Vec<String>, WalletError>;
}

/// File-backed storage, one file per key
///
/// File names are derived from a hash of the key; the original key is kept
/// on the first line so keys can be enumerated.
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, WalletError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        log::debug!("File storage rooted at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // Use a hash of the key for the filename so arbitrary keys map to safe names
    fn file_path(&self, key: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        let hash = hasher.finalize();
        let filename = hex::encode(&hash[..16]);
        self.root.join(format!("{}.dat", filename))
    }

    fn read_entry(path: &Path) -> Result<(String, String), WalletError> {
        let contents = fs::read_to_string(path)?;
        let (key, value) = contents
            .split_once('\n')
            .ok_or_else(|| WalletError::storage(format!("Corrupt storage entry: {}", path.display())))?;
        Ok((key.to_string(), value.to_string()))
    }
}

impl PlatformStorage for FileStorage {
    fn store(&self, key: &str, value: &str) -> Result<(), WalletError> {
        if key.is_empty() || key.contains('\n') {
            return Err(WalletError::storage("Storage key must be non-empty and single-line"));
        }

        // Write to a sibling file first so a crash never leaves a torn entry
        let path = self.file_path(key);
        let tmp_path = path.with_extension("tmp");
        {
            let mut file = File::create(&tmp_path)?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                file.set_permissions(fs::Permissions::from_mode(0o600))?;
            }
            file.write_all(key.as_bytes())?;
            file.write_all(b"\n")?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn retrieve(&self, key: &str) -> Result<Option<String>, WalletError> {
        let path = self.file_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let (stored_key, value) = Self::read_entry(&path)?;
        if stored_key != key {
            return Err(WalletError::storage(format!("Storage entry collision for key {}", key)));
        }
        Ok(Some(value))
    }

    fn delete(&self, key: &str) -> Result<(), WalletError> {
        match fs::remove_file(self.file_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn exists(&self, key: &str) -> Result<bool, WalletError> {
        Ok(self.file_path(key).exists())
    }

    fn list_keys(&self) -> Result<Vec<String>, WalletError> {
        let mut keys = vec![];
        for entry in fs::read_dir(&self.root)?.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("dat") {
                match Self::read_entry(&path) {
                    Ok((key, _)) => keys.push(key),
                    Err(e) => log::warn!("Skipping unreadable storage entry: {}", e),
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// In-process storage for tests and ephemeral sessions
#[derive(Default)]
pub struct MemoryStorage {
    data: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlatformStorage for MemoryStorage {
    fn store(&self, key: &str, value: &str) -> Result<(), WalletError> {
        let mut data = self.data.write()
            .map_err(|_| WalletError::storage("Storage lock poisoned"))?;
        data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn retrieve(&self, key: &str) -> Result<Option<String>, WalletError> {
        let data = self.data.read()
            .map_err(|_| WalletError::storage("Storage lock poisoned"))?;
        Ok(data.get(key).cloned())
    }

    fn delete(&self, key: &str) -> Result<(), WalletError> {
        let mut data = self.data.write()
            .map_err(|_| WalletError::storage("Storage lock poisoned"))?;
        data.remove(key);
        Ok(())
    }

    fn list_keys(&self) -> Result<Vec<String>, WalletError> {
        let data = self.data.read()
            .map_err(|_| WalletError::storage("Storage lock poisoned"))?;
        let mut keys: Vec<String> = data.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}
