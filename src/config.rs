// src/config.rs
use crate::extract::router::{RoutingRule, SourceRouter};
use std::path::PathBuf;

/// Profile used when no routing keyword matches a source file name.
pub const DEFAULT_PROFILE: &str = "prebuilt-layout";

pub const DEFAULT_SOURCE_CONTAINER: &str = "sources";
pub const DEFAULT_PROCESSED_CONTAINER: &str = "processed";
pub const DEFAULT_OUTPUT_CONTAINER: &str = "outputs";
pub const DEFAULT_ARCHIVE_CONTAINER: &str = "archive";

/// Resolved configuration for one run, built once in `main` and passed
/// explicitly to every component that needs it.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub source_container: String,
    pub processed_container: String,
    pub output_container: String,
    pub archive_container: String,
    pub total_sections: u32,
    pub max_rounds: u32,
    pub max_critical: u32,
    pub max_standard: u32,
    pub guidance_dir: PathBuf,
    pub exclude_sources: Vec<String>,
    pub routing_rules: Vec<RoutingRule>,
    pub default_profile: String,
}

impl RunConfig {
    pub fn router(&self) -> SourceRouter {
        SourceRouter::new(self.routing_rules.clone(), &self.default_profile)
    }
}
