// src/store/mod.rs
pub mod archive;
pub mod corpus;
mod fs;

pub use fs::FsBlobStore;

use crate::utils::error::StoreError;
use async_trait::async_trait;

/// Addressable blob storage keyed by `(container, name)`.
///
/// Keys written by the pipeline are iteration-stamped or file-name derived,
/// so concurrent writers never race on the same key and no locking is
/// needed. Implementations must tolerate names containing `/` separators
/// (used for archive prefixes).
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Lists all blob names in a container, in lexicographic order.
    async fn list(&self, container: &str) -> Result<Vec<String>, StoreError>;

    async fn put_text(&self, container: &str, name: &str, text: &str) -> Result<(), StoreError>;

    async fn put_bytes(&self, container: &str, name: &str, bytes: &[u8]) -> Result<(), StoreError>;

    async fn get_text(&self, container: &str, name: &str) -> Result<String, StoreError>;

    async fn get_bytes(&self, container: &str, name: &str) -> Result<Vec<u8>, StoreError>;

    async fn delete(&self, container: &str, name: &str) -> Result<(), StoreError>;

    async fn copy(
        &self,
        src_container: &str,
        src_name: &str,
        dst_container: &str,
        dst_name: &str,
    ) -> Result<(), StoreError>;
}
