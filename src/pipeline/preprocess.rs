// src/pipeline/preprocess.rs
//
// Source preprocessing: route every source file to an extraction profile,
// run structural extraction, reconstruct readable text, and persist it to
// the processed container. Files are independent, so the work fans out.

use crate::engine::DocumentAnalyzer;
use crate::extract::reconstruct;
use crate::extract::router::SourceRouter;
use crate::store::corpus::list_or_empty;
use crate::store::BlobStore;
use crate::utils::error::AppError;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Preprocesses all PDF sources in `source_container` into text blobs named
/// `{source}.txt` in `processed_container`.
///
/// Per-file read and analysis failures are logged and skipped so one bad
/// document cannot sink the batch; a failed write of processed output
/// propagates, since continuing would silently starve the corpus.
pub async fn preprocess_sources(
    store: Arc<dyn BlobStore>,
    analyzer: Arc<dyn DocumentAnalyzer>,
    router: Arc<SourceRouter>,
    source_container: &str,
    processed_container: &str,
) -> Result<(), AppError> {
    let names = list_or_empty(store.as_ref(), source_container).await;
    let pdf_names: Vec<String> = names
        .into_iter()
        .filter(|name| name.to_lowercase().ends_with(".pdf"))
        .collect();

    if pdf_names.is_empty() {
        tracing::warn!("No PDF files found in container '{}'", source_container);
        return Ok(());
    }
    tracing::info!(
        "Preprocessing {} source file(s) from '{}'",
        pdf_names.len(),
        source_container
    );

    let mut tasks = JoinSet::new();
    for name in pdf_names {
        let store = Arc::clone(&store);
        let analyzer = Arc::clone(&analyzer);
        let router = Arc::clone(&router);
        let source_container = source_container.to_string();
        let processed_container = processed_container.to_string();

        tasks.spawn(async move {
            let profile = router.route(&name).to_string();

            let bytes = match store.get_bytes(&source_container, &name).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::error!("Skipping '{}': failed to read source: {}", name, e);
                    return Ok(());
                }
            };

            let result = match analyzer.analyze(&name, &bytes, &profile).await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!(
                        "Skipping '{}': analysis with profile '{}' failed: {}",
                        name,
                        profile,
                        e
                    );
                    return Ok(());
                }
            };

            let reconstruction = reconstruct::reconstruct(&name, &result);
            let output_name = format!("{}.txt", name);
            store
                .put_text(&processed_container, &output_name, &reconstruction.text)
                .await?;
            tracing::info!("Processed '{}' -> '{}'", name, output_name);
            Ok::<(), AppError>(())
        });
    }

    let mut first_error: Option<AppError> = None;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::error!("Preprocessing write failed: {}", e);
                first_error.get_or_insert(e);
            }
            Err(e) => {
                tracing::error!("Preprocessing task panicked: {}", e);
                first_error.get_or_insert(AppError::Pipeline(e.to_string()));
            }
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
