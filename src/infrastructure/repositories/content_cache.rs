use crate::domain::synthesis::Signature;
use moka::future::Cache;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use super::is_path_component;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("audio not found: {0}")]
    NotFound(String),
    #[error("invalid cache address: {0}")]
    InvalidAddress(String),
    #[error("cache io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Content-addressed audio store.
///
/// Blobs live at `{root}/{volume}/{guid[..2]}/{guid}{suffix}` and are never
/// rewritten once present.
pub struct ContentCache {
    root: PathBuf,
    memory: Option<Cache<String, Arc<Vec<u8>>>>,
}

impl ContentCache {
    pub fn new(root: impl Into<PathBuf>, memory_enabled: bool) -> Self {
        let memory = if memory_enabled {
            Some(
                Cache::builder()
                    .max_capacity(256)
                    .time_to_idle(Duration::from_secs(30 * 60))
                    .build(),
            )
        } else {
            None
        };

        Self {
            root: root.into(),
            memory,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of a signature's blob. Pure, no I/O.
    pub fn path_for(&self, signature: &Signature) -> PathBuf {
        self.guid_path(&signature.volume, &signature.guid, &signature.audio_suffix)
    }

    fn guid_path(&self, volume: &str, guid: &str, audio_suffix: &str) -> PathBuf {
        let shard = guid.get(..2).unwrap_or(guid);
        self.root
            .join(volume)
            .join(shard)
            .join(format!("{}{}", guid, audio_suffix))
    }

    /// Location of a blob addressed by caller-supplied parts (HTTP lookups)
    pub fn checked_guid_path(
        &self,
        volume: &str,
        guid: &str,
        audio_suffix: &str,
    ) -> Result<PathBuf, CacheError> {
        if guid.len() < 2 || !guid.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CacheError::InvalidAddress(format!("guid {}", guid)));
        }
        if !is_path_component(volume) {
            return Err(CacheError::InvalidAddress(format!("volume {}", volume)));
        }
        Ok(self.guid_path(volume, guid, audio_suffix))
    }

    pub async fn contains(&self, signature: &Signature) -> bool {
        tokio::fs::try_exists(self.path_for(signature))
            .await
            .unwrap_or(false)
    }

    /// Store bytes under a signature. Re-putting an existing signature keeps
    /// the stored content and returns its path.
    pub async fn put(&self, bytes: &[u8], signature: &Signature) -> Result<PathBuf, CacheError> {
        let path = self.path_for(signature);
        if tokio::fs::try_exists(&path).await? {
            return Ok(path);
        }
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write then rename so readers never observe a partial blob
        let staging = path.with_extension(format!("{}.tmp", Uuid::new_v4()));
        tokio::fs::write(&staging, bytes).await?;
        if tokio::fs::try_exists(&path).await? {
            tokio::fs::remove_file(&staging).await?;
            return Ok(path);
        }
        tokio::fs::rename(&staging, &path).await?;

        tracing::debug!(
            guid = %signature.guid,
            volume = %signature.volume,
            size = bytes.len(),
            "Audio stored in cache"
        );
        Ok(path)
    }

    pub async fn get(&self, signature: &Signature) -> Result<Vec<u8>, CacheError> {
        self.read(&self.path_for(signature)).await
    }

    pub async fn read(&self, path: &Path) -> Result<Vec<u8>, CacheError> {
        let key = path.to_string_lossy().to_string();
        if let Some(memory) = &self.memory {
            if let Some(bytes) = memory.get(&key).await {
                return Ok(bytes.as_ref().clone());
            }
        }

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CacheError::NotFound(path.display().to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(memory) = &self.memory {
            memory.insert(key, Arc::new(bytes.clone())).await;
        }
        Ok(bytes)
    }

    /// Return the stored blob for a signature, producing and storing it first
    /// when absent. The flag reports whether the blob was already cached.
    pub async fn fetch_or_store<F, Fut, E>(
        &self,
        signature: &Signature,
        produce: F,
    ) -> Result<(PathBuf, bool), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<u8>, E>>,
        E: From<CacheError>,
    {
        if self.contains(signature).await {
            return Ok((self.path_for(signature), true));
        }
        let bytes = produce().await?;
        let path = self.put(&bytes, signature).await?;
        Ok((path, false))
    }
}
