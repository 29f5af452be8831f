use crate::constants::paths;
use crate::error::DeepChatError;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

/// Where the API credential lives between runs.
pub trait CredentialStore: Send + Sync {
    /// Read the stored key, if any.
    fn load(&self) -> Result<Option<String>, DeepChatError>;

    /// Replace the stored key.
    fn save(&self, key: &str) -> Result<(), DeepChatError>;
}

/// Keeps the credential in a small JSON map on disk, under a fixed key.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Create a store using the default location (<data dir>/deepchat/credentials.json)
    pub fn new() -> Result<Self, DeepChatError> {
        let base = dirs::data_dir().ok_or_else(|| {
            DeepChatError::Credential("Could not determine data directory".to_string())
        })?;
        Ok(Self::with_path(
            base.join(paths::CONFIG_DIR).join(paths::CREDENTIALS_FILE),
        ))
    }

    /// Create a store backed by a specific file (useful for testing)
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, DeepChatError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| {
            DeepChatError::Credential(format!("Failed to read credentials file: {}", e))
        })?;

        serde_json::from_str(&contents).map_err(|e| {
            DeepChatError::Credential(format!("Failed to parse credentials file: {}", e))
        })
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<String>, DeepChatError> {
        let map = self.read_map()?;
        Ok(map
            .get(paths::API_KEY_STORAGE_KEY)
            .filter(|k| !k.is_empty())
            .cloned())
    }

    fn save(&self, key: &str) -> Result<(), DeepChatError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                DeepChatError::Credential(format!("Failed to create credentials directory: {}", e))
            })?;
        }

        // An unreadable file is overwritten rather than blocking the save.
        let mut map = self.read_map().unwrap_or_default();
        map.insert(paths::API_KEY_STORAGE_KEY.to_string(), key.to_string());

        let contents = serde_json::to_string_pretty(&map)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, contents).map_err(|e| {
            DeepChatError::Credential(format!("Failed to write temporary credentials file: {}", e))
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|e| {
            DeepChatError::Credential(format!("Failed to rename credentials file: {}", e))
        })?;

        tracing::info!("Saved API key to {}", self.path.display());
        Ok(())
    }
}

/// In-process store, for embedding hosts that own persistence themselves.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    key: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            key: Mutex::new(Some(key.into())),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<String>, DeepChatError> {
        let guard = self
            .key
            .lock()
            .map_err(|_| DeepChatError::Credential("credential lock poisoned".into()))?;
        Ok(guard.clone())
    }

    fn save(&self, key: &str) -> Result<(), DeepChatError> {
        let mut guard = self
            .key
            .lock()
            .map_err(|_| DeepChatError::Credential("credential lock poisoned".into()))?;
        *guard = Some(key.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryCredentialStore::new();
        assert_eq!(store.load().unwrap(), None);

        store.save("sk-or-1").unwrap();
        assert_eq!(store.load().unwrap(), Some("sk-or-1".to_string()));
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = FileCredentialStore::with_path(dir.path().join("nope.json"));
        assert_eq!(store.load().unwrap(), None);
    }
}
