//! Uploaded files: passports, certificates, profile pictures and news media

use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Store `data` under `path`, returning the normalized relative path
    async fn put(&self, path: &str, data: &[u8]) -> StoreResult<String>;

    async fn get(&self, path: &str) -> StoreResult<Option<Vec<u8>>>;

    async fn delete(&self, path: &str) -> StoreResult<bool>;

    async fn exists(&self, path: &str) -> StoreResult<bool>;
}

/// Files below a media root directory
#[derive(Debug, Clone)]
pub struct LocalMediaStorage {
    root: PathBuf,
}

impl LocalMediaStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Drop empty, `.` and `..` segments so paths stay under the root
    fn sanitize_path(path: &str) -> StoreResult<PathBuf> {
        let components: Vec<&str> = path
            .trim_start_matches('/')
            .split('/')
            .filter(|component| !component.is_empty() && *component != "." && *component != "..")
            .collect();

        if components.is_empty() {
            return Err(StoreError::InvalidPath(path.to_string()));
        }
        Ok(components.iter().collect())
    }

    fn full_path(&self, path: &str) -> StoreResult<(PathBuf, PathBuf)> {
        let relative = Self::sanitize_path(path)?;
        Ok((self.root.join(&relative), relative))
    }
}

#[async_trait]
impl MediaStorage for LocalMediaStorage {
    async fn put(&self, path: &str, data: &[u8]) -> StoreResult<String> {
        let (full, relative) = self.full_path(path)?;
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&full).await?;
        file.write_all(data).await?;
        file.flush().await?;

        tracing::debug!("Stored media file {}", full.display());
        Ok(relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/"))
    }

    async fn get(&self, path: &str) -> StoreResult<Option<Vec<u8>>> {
        let (full, _) = self.full_path(path)?;
        match fs::read(&full).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, path: &str) -> StoreResult<bool> {
        let (full, _) = self.full_path(path)?;
        match fs::remove_file(&full).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, path: &str) -> StoreResult<bool> {
        let (full, _) = self.full_path(path)?;
        Ok(fs::try_exists(&full).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_get_delete() {
        let dir = TempDir::new().unwrap();
        let storage = LocalMediaStorage::new(dir.path());

        let stored = storage
            .put("profile_pictures/neema.jpg", b"jpeg bytes")
            .await
            .unwrap();
        assert_eq!(stored, "profile_pictures/neema.jpg");
        assert!(storage.exists(&stored).await.unwrap());
        assert_eq!(
            storage.get(&stored).await.unwrap().as_deref(),
            Some(&b"jpeg bytes"[..])
        );

        assert!(storage.delete(&stored).await.unwrap());
        assert!(!storage.delete(&stored).await.unwrap());
        assert!(storage.get(&stored).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_traversal_stays_under_root() {
        let dir = TempDir::new().unwrap();
        let storage = LocalMediaStorage::new(dir.path());

        let stored = storage.put("../../etc/./passwd", b"x").await.unwrap();
        assert_eq!(stored, "etc/passwd");
        assert!(dir.path().join("etc").join("passwd").exists());

        let err = storage.put("../..", b"x").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidPath(_)));
    }
}
