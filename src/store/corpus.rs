// src/store/corpus.rs
//
// Source-corpus assembly and bulk container maintenance. Reads and lists
// here are fail-soft: a transient store failure logs and yields a default
// so one bad blob cannot abort a whole run.

use crate::store::BlobStore;
use crate::utils::text::clean_text;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Lists a container, swallowing failures into an empty listing.
pub async fn list_or_empty(store: &dyn BlobStore, container: &str) -> Vec<String> {
    match store.list(container).await {
        Ok(names) => names,
        Err(e) => {
            tracing::error!("Failed to list container '{}': {}", container, e);
            Vec::new()
        }
    }
}

/// Downloads a blob as text, swallowing failures into an empty string.
pub async fn get_text_or_empty(store: &dyn BlobStore, container: &str, name: &str) -> String {
    match store.get_text(container, name).await {
        Ok(text) => text,
        Err(e) => {
            tracing::error!("Failed to read blob '{}/{}': {}", container, name, e);
            String::new()
        }
    }
}

/// Concatenates every processed source file into one corpus string, with
/// START/END markers around each file and an optional case-insensitive
/// exclusion list.
///
/// Files are read serially, in listing order. Downstream prompt content is
/// order-sensitive, so this step must stay serial even though it is
/// I/O-bound.
pub async fn assemble_corpus(
    store: &dyn BlobStore,
    container: &str,
    exclude_files: &[String],
) -> String {
    tracing::info!("Assembling source corpus from container '{}'", container);

    let names = list_or_empty(store, container).await;
    if names.is_empty() {
        tracing::warn!("No source documents found in container '{}'", container);
        return "ERROR: No source documents found in the specified container.".to_string();
    }

    let exclude_lower: Vec<String> = exclude_files
        .iter()
        .map(|f| f.to_lowercase().replace(".pdf", ""))
        .collect();

    let mut corpus = String::new();
    for name in &names {
        let file_name = name.rsplit('/').next().unwrap_or(name);
        let base = file_name.to_lowercase();
        let base = base.strip_suffix(".txt").unwrap_or(&base);
        if exclude_lower.iter().any(|excluded| base.contains(excluded)) {
            tracing::info!("Skipping excluded source file: {}", file_name);
            continue;
        }

        tracing::info!("Reading source file: {}", name);
        let content = get_text_or_empty(store, container, name).await;
        corpus.push_str(&format!("--- START OF FILE {} ---\n\n", file_name));
        corpus.push_str(&clean_text(&content));
        corpus.push_str(&format!("\n\n--- END OF FILE {} ---\n\n", file_name));
    }

    tracing::info!("Corpus assembled from {} listed file(s)", names.len());
    corpus
}

/// Deletes every blob in a container as an unordered parallel batch.
/// Deletion is idempotent and order-independent; failures are logged and
/// the cleanup continues.
pub async fn clear_container(store: &Arc<dyn BlobStore>, container: &str) {
    let names = list_or_empty(store.as_ref(), container).await;
    if names.is_empty() {
        tracing::info!("Container '{}' is already empty", container);
        return;
    }
    tracing::info!("Deleting {} blob(s) from container '{}'", names.len(), container);

    let mut tasks = JoinSet::new();
    for name in names {
        let store = Arc::clone(store);
        let container = container.to_string();
        tasks.spawn(async move {
            if let Err(e) = store.delete(&container, &name).await {
                tracing::error!("Failed to delete blob '{}/{}': {}", container, name, e);
            }
        });
    }
    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            tracing::error!("Delete task panicked: {}", e);
        }
    }
    tracing::info!("Cleanup of container '{}' complete", container);
}
