// src/store/fs.rs
use crate::store::BlobStore;
use crate::utils::error::StoreError;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Filesystem-backed blob store: containers are directories under a root,
/// blob names map to relative file paths.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Creates the store, making the root directory if needed.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        if !root.exists() {
            std::fs::create_dir_all(&root)?;
        }
        Ok(Self { root })
    }

    fn blob_path(&self, container: &str, name: &str) -> PathBuf {
        let mut path = self.root.join(container);
        // Names may carry '/' separators (archive prefixes).
        for part in name.split('/') {
            path.push(part);
        }
        path
    }

    async fn ensure_parent(path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    fn map_read_error(err: std::io::Error, container: &str, name: &str) -> StoreError {
        if err.kind() == ErrorKind::NotFound {
            StoreError::NotFound(format!("{}/{}", container, name))
        } else {
            StoreError::Io(err)
        }
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn list(&self, container: &str) -> Result<Vec<String>, StoreError> {
        let container_root = self.root.join(container);
        if !container_root.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        let mut pending = vec![container_root.clone()];
        while let Some(dir) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                } else {
                    let relative = path.strip_prefix(&container_root).map_err(|e| {
                        StoreError::Io(std::io::Error::new(ErrorKind::Other, e))
                    })?;
                    names.push(
                        relative
                            .components()
                            .map(|c| c.as_os_str().to_string_lossy().into_owned())
                            .collect::<Vec<_>>()
                            .join("/"),
                    );
                }
            }
        }

        names.sort();
        Ok(names)
    }

    async fn put_text(&self, container: &str, name: &str, text: &str) -> Result<(), StoreError> {
        self.put_bytes(container, name, text.as_bytes()).await
    }

    async fn put_bytes(&self, container: &str, name: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.blob_path(container, name);
        Self::ensure_parent(&path).await?;
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!("Wrote blob {}/{} ({} bytes)", container, name, bytes.len());
        Ok(())
    }

    async fn get_text(&self, container: &str, name: &str) -> Result<String, StoreError> {
        let path = self.blob_path(container, name);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| Self::map_read_error(e, container, name))
    }

    async fn get_bytes(&self, container: &str, name: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.blob_path(container, name);
        tokio::fs::read(&path)
            .await
            .map_err(|e| Self::map_read_error(e, container, name))
    }

    async fn delete(&self, container: &str, name: &str) -> Result<(), StoreError> {
        let path = self.blob_path(container, name);
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| Self::map_read_error(e, container, name))
    }

    async fn copy(
        &self,
        src_container: &str,
        src_name: &str,
        dst_container: &str,
        dst_name: &str,
    ) -> Result<(), StoreError> {
        let src = self.blob_path(src_container, src_name);
        let dst = self.blob_path(dst_container, dst_name);
        Self::ensure_parent(&dst).await?;
        tokio::fs::copy(&src, &dst)
            .await
            .map_err(|e| Self::map_read_error(e, src_container, src_name))?;
        Ok(())
    }
}
