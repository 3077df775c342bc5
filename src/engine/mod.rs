// src/engine/mod.rs
//
// Interfaces to the three external capabilities the pipeline consumes: the
// document structural-extraction engine, the section writer, and the section
// validator. The traits are the seam; `client.rs` provides HTTP-backed
// implementations and tests substitute mocks.

pub mod client;
pub mod models;

use crate::utils::error::EngineError;
use async_trait::async_trait;
use models::AnalysisResult;
use serde::Serialize;

/// Input for an initial section draft.
#[derive(Debug, Clone, Serialize)]
pub struct DraftRequest {
    pub section_id: u32,
    pub guidance: String,
    pub source_corpus: String,
}

/// Input for a correction pass: the prior draft plus the validator's report.
#[derive(Debug, Clone, Serialize)]
pub struct ReviseRequest {
    pub section_id: u32,
    pub guidance: String,
    pub source_corpus: String,
    pub previous_draft: String,
    pub revision_request: String,
}

/// Input for a validation pass over a candidate draft.
#[derive(Debug, Clone, Serialize)]
pub struct ValidateRequest {
    pub section_id: u32,
    pub guidance: String,
    pub source_corpus: String,
    pub draft: String,
}

/// Structural extraction over one source file with a named profile.
#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        file_name: &str,
        bytes: &[u8],
        profile: &str,
    ) -> Result<AnalysisResult, EngineError>;
}

/// Produces section content as text with embedded citation tags.
#[async_trait]
pub trait SectionWriter: Send + Sync {
    async fn draft(&self, request: &DraftRequest) -> Result<String, EngineError>;
    async fn revise(&self, request: &ReviseRequest) -> Result<String, EngineError>;
}

/// Reviews a draft against the source corpus and returns a report text
/// containing a parseable feedback-summary block.
#[async_trait]
pub trait SectionValidator: Send + Sync {
    async fn validate(&self, request: &ValidateRequest) -> Result<String, EngineError>;
}
