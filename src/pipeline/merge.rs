// src/pipeline/merge.rs
//
// Iteration tracking and final-document assembly. Draft blobs are named
// `output_s{section}_i{iteration}.md`; only the highest iteration per
// section takes part in the merge, older iterations stay stored but unused.

use crate::store::BlobStore;
use crate::utils::error::MergeError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task::JoinSet;

static DRAFT_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^output_s(\d+)_i(\d+)\.md$").expect("Failed to compile DRAFT_NAME_RE")
});

pub const FINAL_DOCUMENT_NAME: &str = "final_document.md";
pub const SECTION_SEPARATOR: &str = "\n\n---\n\n";

pub fn draft_name(section_id: u32, iteration: u32) -> String {
    format!("output_s{}_i{}.md", section_id, iteration)
}

pub fn feedback_name(section_id: u32, iteration: u32) -> String {
    format!("feedback_s{}_i{}.md", section_id, iteration)
}

/// Parses `(section_id, iteration)` out of a draft blob name. Names that do
/// not follow the pattern (feedback reports, the final document) yield `None`.
pub fn parse_draft_name(name: &str) -> Option<(u32, u32)> {
    let caps = DRAFT_NAME_RE.captures(name)?;
    let section_id = caps[1].parse().ok()?;
    let iteration = caps[2].parse().ok()?;
    Some((section_id, iteration))
}

/// Selects the winning draft per section: the numerically greatest
/// iteration, regardless of discovery order. Fails unless the discovered
/// section ids are exactly `1..=total_sections`.
pub fn plan_merge(blob_names: &[String], total_sections: u32) -> Result<Vec<String>, MergeError> {
    let mut latest: BTreeMap<u32, (u32, &str)> = BTreeMap::new();
    for name in blob_names {
        if let Some((section_id, iteration)) = parse_draft_name(name) {
            let entry = latest.entry(section_id).or_insert((iteration, name.as_str()));
            if iteration > entry.0 {
                *entry = (iteration, name.as_str());
            }
        }
    }

    let complete = latest.len() == total_sections as usize
        && latest.keys().copied().eq(1..=total_sections);
    if !complete {
        tracing::error!(
            "Merge failed: expected sections 1..={}, found {:?}",
            total_sections,
            latest.keys().collect::<Vec<_>>()
        );
        return Err(MergeError::IncompleteSections {
            found: latest.len(),
            expected: total_sections as usize,
        });
    }

    // BTreeMap iteration gives ascending section order.
    Ok(latest.values().map(|(_, name)| name.to_string()).collect())
}

/// Assembles the final document: concurrent retrieval of each winning
/// draft, then serialization by section id with a fixed separator.
pub async fn merge_sections(
    store: &Arc<dyn BlobStore>,
    container: &str,
    total_sections: u32,
) -> Result<String, MergeError> {
    let blob_names = store.list(container).await?;
    let winners = plan_merge(&blob_names, total_sections)?;
    tracing::info!("Merging latest drafts: {:?}", winners);

    let mut tasks = JoinSet::new();
    for (index, name) in winners.iter().enumerate() {
        let store = Arc::clone(store);
        let container = container.to_string();
        let name = name.clone();
        tasks.spawn(async move { (index, store.get_text(&container, &name).await) });
    }

    // Retrieval completes in arbitrary order; the index pins each part to
    // its section slot.
    let mut parts: Vec<Option<String>> = vec![None; winners.len()];
    while let Some(joined) = tasks.join_next().await {
        let (index, result) = joined.map_err(|e| MergeError::Join(e.to_string()))?;
        parts[index] = Some(result?);
    }

    let sections = parts
        .into_iter()
        .map(|part| part.ok_or_else(|| MergeError::Join("missing merge part".to_string())))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(sections.join(SECTION_SEPARATOR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FsBlobStore;

    fn names(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_draft_name_roundtrip() {
        assert_eq!(draft_name(3, 12), "output_s3_i12.md");
        assert_eq!(parse_draft_name("output_s3_i12.md"), Some((3, 12)));
        assert_eq!(parse_draft_name("feedback_s3_i12.md"), None);
        assert_eq!(parse_draft_name("final_document.md"), None);
        assert_eq!(parse_draft_name("output_s3_i12.md.bak"), None);
    }

    #[test]
    fn test_plan_picks_max_iteration_in_any_order() {
        let blobs = names(&[
            "output_s2_i1.md",
            "output_s1_i3.md",
            "output_s1_i1.md",
            "output_s1_i2.md",
            "feedback_s1_i3.md",
        ]);
        let plan = plan_merge(&blobs, 2).unwrap();
        assert_eq!(plan, vec!["output_s1_i3.md", "output_s2_i1.md"]);
    }

    #[test]
    fn test_plan_tolerates_iteration_gaps() {
        let blobs = names(&["output_s1_i1.md", "output_s1_i5.md", "output_s2_i2.md"]);
        let plan = plan_merge(&blobs, 2).unwrap();
        assert_eq!(plan, vec!["output_s1_i5.md", "output_s2_i2.md"]);
    }

    #[test]
    fn test_plan_fails_on_missing_section() {
        let blobs = names(&["output_s1_i1.md", "output_s2_i1.md"]);
        match plan_merge(&blobs, 3) {
            Err(MergeError::IncompleteSections { found, expected }) => {
                assert_eq!(found, 2);
                assert_eq!(expected, 3);
            }
            other => panic!("expected IncompleteSections, got {:?}", other),
        }
    }

    #[test]
    fn test_plan_fails_on_unexpected_section_id() {
        // Section 4 present but section 2 missing: ids are not exactly 1..=3.
        let blobs = names(&["output_s1_i1.md", "output_s3_i1.md", "output_s4_i1.md"]);
        assert!(matches!(
            plan_merge(&blobs, 3),
            Err(MergeError::IncompleteSections { .. })
        ));
    }

    #[tokio::test]
    async fn test_merge_concatenates_latest_in_section_order() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn BlobStore> = Arc::new(FsBlobStore::new(dir.path()).unwrap());
        for (name, body) in [
            ("output_s1_i1.md", "one-old"),
            ("output_s1_i3.md", "one-new"),
            ("output_s2_i1.md", "two"),
        ] {
            store.put_text("outputs", name, body).await.unwrap();
        }

        let merged = merge_sections(&store, "outputs", 2).await.unwrap();
        assert_eq!(merged, format!("one-new{}two", SECTION_SEPARATOR));
    }

    #[tokio::test]
    async fn test_merge_fails_without_all_sections() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn BlobStore> = Arc::new(FsBlobStore::new(dir.path()).unwrap());
        store
            .put_text("outputs", "output_s1_i1.md", "one")
            .await
            .unwrap();

        assert!(matches!(
            merge_sections(&store, "outputs", 2).await,
            Err(MergeError::IncompleteSections { .. })
        ));
    }
}
