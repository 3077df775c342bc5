// src/pipeline/guidance.rs
//
// Per-section guidance files live on the local filesystem, one writer file
// and one validation file per section under a guidance directory.

use std::path::{Path, PathBuf};

pub fn writer_guidance_path(guidance_dir: &Path, section_id: u32) -> PathBuf {
    guidance_dir.join(format!("section_{}_writer.md", section_id))
}

pub fn validation_guidance_path(guidance_dir: &Path, section_id: u32) -> PathBuf {
    guidance_dir.join(format!("section_{}_validation.md", section_id))
}

/// Reads guidance files serially and concatenates them with START/END
/// markers. A missing file is logged and skipped so a run can proceed with
/// partial guidance.
pub async fn read_guidance_files(paths: &[PathBuf]) -> String {
    let mut content = String::new();
    for path in paths {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                content.push_str(&format!("--- START OF GUIDANCE FILE: {} ---\n", name));
                content.push_str(&text);
                content.push_str("\n--- END OF GUIDANCE FILE ---\n\n");
            }
            Err(e) => {
                tracing::error!("Guidance file not found: {}: {}", path.display(), e);
            }
        }
    }
    content
}
