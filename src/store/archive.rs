// src/store/archive.rs
//
// Run archival: copies a run's source documents and sectional outputs into
// an archive container under a run-id prefix, for auditing. Copies are
// idempotent and order-independent, so the batch runs unordered.

use crate::store::corpus::list_or_empty;
use crate::store::BlobStore;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Derives a run identifier from the current UTC time.
pub fn new_run_id() -> String {
    format!("run_{}", chrono::Utc::now().format("%Y%m%dT%H%M%SZ"))
}

/// Copies all blobs from `source_container` and `output_container` into
/// `archive_container` under `{run_id}/source_docs/` and `{run_id}/outputs/`.
/// Individual copy failures are logged and skipped.
pub async fn archive_run(
    store: &Arc<dyn BlobStore>,
    run_id: &str,
    source_container: &str,
    output_container: &str,
    archive_container: &str,
) {
    tracing::info!("Archiving artifacts for run '{}'", run_id);

    let mut tasks = JoinSet::new();
    for (container, prefix) in [(source_container, "source_docs"), (output_container, "outputs")] {
        for name in list_or_empty(store.as_ref(), container).await {
            let store = Arc::clone(store);
            let src_container = container.to_string();
            let dst_container = archive_container.to_string();
            let dst_name = format!("{}/{}/{}", run_id, prefix, name);
            tasks.spawn(async move {
                if let Err(e) = store
                    .copy(&src_container, &name, &dst_container, &dst_name)
                    .await
                {
                    tracing::error!(
                        "Failed to archive blob '{}/{}' to '{}': {}",
                        src_container,
                        name,
                        dst_name,
                        e
                    );
                }
            });
        }
    }

    let mut copied = 0usize;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(()) => copied += 1,
            Err(e) => tracing::error!("Archive task panicked: {}", e),
        }
    }
    tracing::info!("Archiving for run '{}' complete ({} copies issued)", run_id, copied);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FsBlobStore;

    #[tokio::test]
    async fn test_archive_copies_sources_and_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn BlobStore> = Arc::new(FsBlobStore::new(dir.path()).unwrap());
        store.put_text("sources", "a.pdf", "raw").await.unwrap();
        store
            .put_text("outputs", "output_s1_i1.md", "draft")
            .await
            .unwrap();

        archive_run(&store, "run_test", "sources", "outputs", "archive").await;

        let archived = store.list("archive").await.unwrap();
        assert_eq!(
            archived,
            vec![
                "run_test/outputs/output_s1_i1.md",
                "run_test/source_docs/a.pdf"
            ]
        );
        // Originals are copied, not moved.
        assert_eq!(store.get_text("sources", "a.pdf").await.unwrap(), "raw");
    }

    #[test]
    fn test_run_id_shape() {
        let id = new_run_id();
        assert!(id.starts_with("run_"));
        assert!(id.ends_with('Z'));
    }
}
