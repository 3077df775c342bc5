// src/engine/client.rs
use crate::engine::models::AnalysisResult;
use crate::engine::{
    DocumentAnalyzer, DraftRequest, ReviseRequest, SectionValidator, SectionWriter,
    ValidateRequest,
};
use crate::utils::error::EngineError;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

// A capability call that never returns would stall its section forever, so
// every request carries a hard wall-clock timeout. Generation calls can
// legitimately take minutes.
const CAPABILITY_TIMEOUT_SECS: u64 = 600;

/// Creates a reqwest client configured for capability endpoints.
fn build_capability_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(CAPABILITY_TIMEOUT_SECS))
        .build()
}

/// Text-bearing response shared by the writer and validator endpoints.
#[derive(Debug, Deserialize)]
struct TextResponse {
    content: String,
}

async fn read_text_response(response: reqwest::Response) -> Result<String, EngineError> {
    let status = response.status();
    if !status.is_success() {
        tracing::error!("Capability endpoint returned HTTP {}", status);
        return Err(EngineError::Http(status));
    }
    // An empty body is passed through untouched: the feedback parser treats
    // an empty report as the forced-retry sentinel, not as success.
    let body: TextResponse = response
        .json()
        .await
        .map_err(|e| EngineError::Parse(e.to_string()))?;
    Ok(body.content)
}

// An empty draft must never be persisted as an iteration.
fn reject_empty_draft(content: String, section_id: u32) -> Result<String, EngineError> {
    if content.trim().is_empty() {
        return Err(EngineError::Capability(format!(
            "writer returned an empty draft for section {}",
            section_id
        )));
    }
    Ok(content)
}

/// Structural-extraction engine reached over HTTP. The document bytes are
/// posted raw; the profile and file name travel as query parameters.
pub struct RemoteAnalyzer {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteAnalyzer {
    pub fn new(base_url: &str) -> Result<Self, EngineError> {
        Ok(Self {
            client: build_capability_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl DocumentAnalyzer for RemoteAnalyzer {
    async fn analyze(
        &self,
        file_name: &str,
        bytes: &[u8],
        profile: &str,
    ) -> Result<AnalysisResult, EngineError> {
        let url = format!("{}/analyze", self.base_url);
        tracing::debug!("Analyzing '{}' with profile '{}' via {}", file_name, profile, url);

        let response = self
            .client
            .post(&url)
            .query(&[("profile", profile), ("file", file_name)])
            .body(bytes.to_vec())
            .send()
            .await?; // Propagates reqwest::Error as EngineError::Network

        let status = response.status();
        if !status.is_success() {
            tracing::error!("Analyzer returned HTTP {} for '{}'", status, file_name);
            return Err(EngineError::Http(status));
        }

        response
            .json::<AnalysisResult>()
            .await
            .map_err(|e| EngineError::Parse(e.to_string()))
    }
}

/// Writer capability reached over HTTP: `/draft` and `/revise` endpoints
/// taking the request as a JSON body and returning `{ "content": ... }`.
pub struct RemoteWriter {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteWriter {
    pub fn new(base_url: &str) -> Result<Self, EngineError> {
        Ok(Self {
            client: build_capability_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl SectionWriter for RemoteWriter {
    async fn draft(&self, request: &DraftRequest) -> Result<String, EngineError> {
        let url = format!("{}/draft", self.base_url);
        tracing::info!("Requesting initial draft for section {}", request.section_id);
        let response = self.client.post(&url).json(request).send().await?;
        let content = read_text_response(response).await?;
        reject_empty_draft(content, request.section_id)
    }

    async fn revise(&self, request: &ReviseRequest) -> Result<String, EngineError> {
        let url = format!("{}/revise", self.base_url);
        tracing::info!("Requesting revision for section {}", request.section_id);
        let response = self.client.post(&url).json(request).send().await?;
        let content = read_text_response(response).await?;
        reject_empty_draft(content, request.section_id)
    }
}

/// Validator capability reached over HTTP: a `/validate` endpoint returning
/// the report text, feedback-summary block included.
pub struct RemoteValidator {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteValidator {
    pub fn new(base_url: &str) -> Result<Self, EngineError> {
        Ok(Self {
            client: build_capability_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl SectionValidator for RemoteValidator {
    async fn validate(&self, request: &ValidateRequest) -> Result<String, EngineError> {
        let url = format!("{}/validate", self.base_url);
        tracing::info!("Requesting validation for section {}", request.section_id);
        let response = self.client.post(&url).json(request).send().await?;
        read_text_response(response).await
    }
}
