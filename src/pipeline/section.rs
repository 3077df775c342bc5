// src/pipeline/section.rs
//
// Per-section state machine: create a draft, validate it, and loop through
// corrections until the feedback is acceptable or the round cap is hit.
// Every iteration is persisted before the machine advances, and a stored
// iteration is never mutated afterwards.

use crate::engine::{
    DraftRequest, ReviseRequest, SectionValidator, SectionWriter, ValidateRequest,
};
use crate::pipeline::feedback::{self, FeedbackSummary};
use crate::pipeline::merge;
use crate::store::BlobStore;
use crate::utils::error::AppError;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Terminal result of one section's pipeline. `MaxRoundsExceeded` is a
/// reported outcome, not an error: the section simply never met the bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionOutcome {
    Accepted { iteration: u32 },
    MaxRoundsExceeded { rounds: u32 },
}

/// Everything one section needs besides the shared source corpus.
#[derive(Debug, Clone)]
pub struct SectionJob {
    pub section_id: u32,
    pub writer_guidance: String,
    pub validation_guidance: String,
}

#[derive(Debug)]
enum SectionState {
    Drafting,
    AwaitingValidation,
    Correcting,
}

/// Result row for one section after its pipeline terminated (or failed).
pub struct SectionReport {
    pub section_id: u32,
    pub outcome: Result<SectionOutcome, AppError>,
}

pub struct SectionPipeline {
    store: Arc<dyn BlobStore>,
    writer: Arc<dyn SectionWriter>,
    validator: Arc<dyn SectionValidator>,
    output_container: String,
    max_rounds: u32,
    max_critical: u32,
    max_standard: u32,
}

impl SectionPipeline {
    pub fn new(
        store: Arc<dyn BlobStore>,
        writer: Arc<dyn SectionWriter>,
        validator: Arc<dyn SectionValidator>,
        output_container: &str,
        max_rounds: u32,
        max_critical: u32,
        max_standard: u32,
    ) -> Self {
        Self {
            store,
            writer,
            validator,
            output_container: output_container.to_string(),
            max_rounds,
            max_critical,
            max_standard,
        }
    }

    /// Drives one section to a terminal state. Within a section every step
    /// is strictly sequential: each step's output is the next step's input.
    pub async fn run_section(
        &self,
        job: &SectionJob,
        source_corpus: &str,
    ) -> Result<SectionOutcome, AppError> {
        let section = job.section_id;
        let mut state = SectionState::Drafting;
        let mut draft = String::new();
        let mut report = String::new();
        let mut iteration = 0u32;

        loop {
            state = match state {
                SectionState::Drafting => {
                    tracing::info!("Section {}: drafting iteration 1", section);
                    draft = self
                        .writer
                        .draft(&DraftRequest {
                            section_id: section,
                            guidance: job.writer_guidance.clone(),
                            source_corpus: source_corpus.to_string(),
                        })
                        .await?;
                    iteration = 1;
                    self.persist_draft(section, iteration, &draft).await?;
                    SectionState::AwaitingValidation
                }

                SectionState::AwaitingValidation => {
                    tracing::info!("Section {}: validating iteration {}", section, iteration);
                    report = self
                        .validator
                        .validate(&ValidateRequest {
                            section_id: section,
                            guidance: job.validation_guidance.clone(),
                            source_corpus: source_corpus.to_string(),
                            draft: draft.clone(),
                        })
                        .await?;
                    self.store
                        .put_text(
                            &self.output_container,
                            &merge::feedback_name(section, iteration),
                            &report,
                        )
                        .await?;

                    let summary = feedback::parse_feedback(&report);
                    tracing::info!(
                        "Section {} iteration {}: critical={}, standard={}",
                        section,
                        iteration,
                        summary.critical,
                        summary.standard
                    );

                    if self.is_acceptable(summary) {
                        tracing::info!(
                            "Section {} accepted at iteration {}",
                            section,
                            iteration
                        );
                        return Ok(SectionOutcome::Accepted { iteration });
                    }
                    if iteration >= self.max_rounds {
                        tracing::warn!(
                            "Section {} hit the round cap ({}) without acceptance",
                            section,
                            self.max_rounds
                        );
                        return Ok(SectionOutcome::MaxRoundsExceeded { rounds: iteration });
                    }
                    SectionState::Correcting
                }

                SectionState::Correcting => {
                    tracing::info!(
                        "Section {}: correcting iteration {} -> {}",
                        section,
                        iteration,
                        iteration + 1
                    );
                    // The prior draft moves into the revision request; the
                    // stored copy of it stays untouched.
                    draft = self
                        .writer
                        .revise(&ReviseRequest {
                            section_id: section,
                            guidance: job.writer_guidance.clone(),
                            source_corpus: source_corpus.to_string(),
                            previous_draft: std::mem::take(&mut draft),
                            revision_request: std::mem::take(&mut report),
                        })
                        .await?;
                    iteration += 1;
                    self.persist_draft(section, iteration, &draft).await?;
                    SectionState::AwaitingValidation
                }
            };
        }
    }

    /// Runs every section's pipeline in parallel; sections are independent.
    /// Per-section failures are reported, never propagated across sections.
    pub async fn run_all(
        self: Arc<Self>,
        jobs: Vec<SectionJob>,
        source_corpus: Arc<String>,
    ) -> Vec<SectionReport> {
        let mut tasks = JoinSet::new();
        for job in jobs {
            let pipeline = Arc::clone(&self);
            let corpus = Arc::clone(&source_corpus);
            tasks.spawn(async move {
                let outcome = pipeline.run_section(&job, &corpus).await;
                SectionReport {
                    section_id: job.section_id,
                    outcome,
                }
            });
        }

        let mut reports = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(report) => reports.push(report),
                Err(e) => tracing::error!("Section task panicked: {}", e),
            }
        }
        reports.sort_by_key(|r| r.section_id);
        reports
    }

    fn is_acceptable(&self, summary: FeedbackSummary) -> bool {
        summary.within(self.max_critical, self.max_standard)
    }

    async fn persist_draft(
        &self,
        section: u32,
        iteration: u32,
        draft: &str,
    ) -> Result<(), AppError> {
        // Write failures abort the section: advancing without the stored
        // iteration would break the append-only versioning contract.
        self.store
            .put_text(
                &self.output_container,
                &merge::draft_name(section, iteration),
                draft,
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FsBlobStore;
    use crate::utils::error::EngineError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct ScriptedWriter;

    #[async_trait]
    impl SectionWriter for ScriptedWriter {
        async fn draft(&self, request: &DraftRequest) -> Result<String, EngineError> {
            Ok(format!("draft-1 for section {}", request.section_id))
        }

        async fn revise(&self, request: &ReviseRequest) -> Result<String, EngineError> {
            assert!(!request.previous_draft.is_empty());
            assert!(!request.revision_request.is_empty());
            Ok(format!("{} (revised)", request.previous_draft))
        }
    }

    /// Emits `failures` failing reports before a clean one.
    struct CountdownValidator {
        failures: AtomicU32,
    }

    impl CountdownValidator {
        fn new(failures: u32) -> Self {
            Self {
                failures: AtomicU32::new(failures),
            }
        }
    }

    #[async_trait]
    impl SectionValidator for CountdownValidator {
        async fn validate(&self, _request: &ValidateRequest) -> Result<String, EngineError> {
            let remaining = self.failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures.store(remaining - 1, Ordering::SeqCst);
                Ok("[FEEDBACK_SUMMARY]\ncritical: 2\nstandard: 1\n[END_FEEDBACK_SUMMARY]"
                    .to_string())
            } else {
                Ok("[FEEDBACK_SUMMARY]\ncritical: 0\nstandard: 0\n[END_FEEDBACK_SUMMARY]"
                    .to_string())
            }
        }
    }

    fn pipeline(
        store: Arc<dyn BlobStore>,
        validator: CountdownValidator,
        max_rounds: u32,
    ) -> Arc<SectionPipeline> {
        Arc::new(SectionPipeline::new(
            store,
            Arc::new(ScriptedWriter),
            Arc::new(validator),
            "outputs",
            max_rounds,
            0,
            0,
        ))
    }

    fn job(section_id: u32) -> SectionJob {
        SectionJob {
            section_id,
            writer_guidance: "guidance".to_string(),
            validation_guidance: "rules".to_string(),
        }
    }

    #[tokio::test]
    async fn test_clean_validation_accepts_first_iteration() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn BlobStore> = Arc::new(FsBlobStore::new(dir.path()).unwrap());
        let p = pipeline(Arc::clone(&store), CountdownValidator::new(0), 3);

        let outcome = p.run_section(&job(1), "corpus").await.unwrap();
        assert_eq!(outcome, SectionOutcome::Accepted { iteration: 1 });

        let blobs = store.list("outputs").await.unwrap();
        assert_eq!(blobs, vec!["feedback_s1_i1.md", "output_s1_i1.md"]);
    }

    #[tokio::test]
    async fn test_correction_loop_until_acceptance() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn BlobStore> = Arc::new(FsBlobStore::new(dir.path()).unwrap());
        let p = pipeline(Arc::clone(&store), CountdownValidator::new(2), 5);

        let outcome = p.run_section(&job(4), "corpus").await.unwrap();
        assert_eq!(outcome, SectionOutcome::Accepted { iteration: 3 });

        // All three iterations persisted; earlier ones untouched.
        assert_eq!(
            store.get_text("outputs", "output_s4_i1.md").await.unwrap(),
            "draft-1 for section 4"
        );
        assert_eq!(
            store.get_text("outputs", "output_s4_i3.md").await.unwrap(),
            "draft-1 for section 4 (revised) (revised)"
        );
    }

    #[tokio::test]
    async fn test_round_cap_yields_max_rounds_exceeded() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn BlobStore> = Arc::new(FsBlobStore::new(dir.path()).unwrap());
        let p = pipeline(Arc::clone(&store), CountdownValidator::new(99), 2);

        let outcome = p.run_section(&job(2), "corpus").await.unwrap();
        assert_eq!(outcome, SectionOutcome::MaxRoundsExceeded { rounds: 2 });

        // The cap bounds the number of stored iterations.
        let drafts: Vec<String> = store
            .list("outputs")
            .await
            .unwrap()
            .into_iter()
            .filter(|n| n.starts_with("output_"))
            .collect();
        assert_eq!(drafts, vec!["output_s2_i1.md", "output_s2_i2.md"]);
    }

    #[tokio::test]
    async fn test_run_all_reports_every_section_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn BlobStore> = Arc::new(FsBlobStore::new(dir.path()).unwrap());
        let p = pipeline(Arc::clone(&store), CountdownValidator::new(0), 3);

        let reports = p
            .run_all(
                vec![job(2), job(1), job(3)],
                Arc::new("corpus".to_string()),
            )
            .await;

        let ids: Vec<u32> = reports.iter().map(|r| r.section_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        for report in &reports {
            assert!(matches!(
                report.outcome,
                Ok(SectionOutcome::Accepted { .. })
            ));
        }
    }
}
