// src/main.rs
mod config;
mod engine;
mod extract;
mod pipeline;
mod store;
mod utils;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use config::RunConfig;
use engine::client::{RemoteAnalyzer, RemoteValidator, RemoteWriter};
use extract::router::RoutingRule;
use pipeline::section::{SectionJob, SectionOutcome, SectionPipeline};
use pipeline::{guidance, merge, preprocess};
use store::{archive, corpus, BlobStore, FsBlobStore};
use utils::text;
use utils::AppError;

/// Assembles structured documents from scanned sources through an
/// extract / draft / validate / correct / merge pipeline.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Root directory backing the blob store
    #[arg(short, long, default_value = "./data")]
    store_root: PathBuf,

    /// Base URL of the structural-extraction engine
    #[arg(long, default_value = "http://localhost:8081")]
    analyzer_url: String,

    /// Base URL of the writer/validator capability service
    #[arg(long, default_value = "http://localhost:8082")]
    capability_url: String,

    /// Number of sections the final document must contain
    #[arg(long, default_value = "9")]
    total_sections: u32,

    /// Hard cap on draft/correct rounds per section
    #[arg(long, default_value = "3")]
    max_rounds: u32,

    /// Highest acceptable count of critical issues
    #[arg(long, default_value = "0")]
    max_critical: u32,

    /// Highest acceptable count of standard issues
    #[arg(long, default_value = "0")]
    max_standard: u32,

    /// Directory holding per-section guidance files
    #[arg(long, default_value = "./guidance")]
    guidance_dir: PathBuf,

    /// Source files to exclude from the corpus (case-insensitive)
    #[arg(long)]
    exclude: Vec<String>,

    /// Routing rule `keyword=profile`; evaluated in declaration order,
    /// first match wins
    #[arg(long = "route")]
    routes: Vec<RoutingRule>,

    /// Extraction profile used when no routing keyword matches
    #[arg(long, default_value = config::DEFAULT_PROFILE)]
    default_profile: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run structural extraction over every source file
    Preprocess,
    /// Draft, validate, and correct every section
    Generate,
    /// Merge the latest iteration of each section into the final document
    Merge,
    /// Preprocess, generate, and merge end to end
    Run,
    /// Delete everything in the output container
    Clean,
    /// Copy run artifacts into the archive container
    Archive,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting doc_assembler: {:?}", args.command);

    let cfg = RunConfig {
        source_container: config::DEFAULT_SOURCE_CONTAINER.to_string(),
        processed_container: config::DEFAULT_PROCESSED_CONTAINER.to_string(),
        output_container: config::DEFAULT_OUTPUT_CONTAINER.to_string(),
        archive_container: config::DEFAULT_ARCHIVE_CONTAINER.to_string(),
        total_sections: args.total_sections,
        max_rounds: args.max_rounds,
        max_critical: args.max_critical,
        max_standard: args.max_standard,
        guidance_dir: args.guidance_dir.clone(),
        exclude_sources: args.exclude.clone(),
        routing_rules: args.routes.clone(),
        default_profile: args.default_profile.clone(),
    };
    if cfg.total_sections == 0 {
        return Err(AppError::Config("total-sections must be at least 1".to_string()));
    }
    if cfg.max_rounds == 0 {
        return Err(AppError::Config("max-rounds must be at least 1".to_string()));
    }

    // 3. Initialize the store once; every component borrows this handle.
    let store: Arc<dyn BlobStore> = Arc::new(FsBlobStore::new(&args.store_root)?);

    match args.command {
        Command::Preprocess => run_preprocess(&args, &cfg, &store).await?,
        Command::Generate => run_generate(&args, &cfg, &store).await?,
        Command::Merge => run_merge(&cfg, &store).await?,
        Command::Run => {
            run_preprocess(&args, &cfg, &store).await?;
            run_generate(&args, &cfg, &store).await?;
            run_merge(&cfg, &store).await?;
        }
        Command::Clean => corpus::clear_container(&store, &cfg.output_container).await,
        Command::Archive => {
            let run_id = archive::new_run_id();
            archive::archive_run(
                &store,
                &run_id,
                &cfg.source_container,
                &cfg.output_container,
                &cfg.archive_container,
            )
            .await;
        }
    }

    Ok(())
}

async fn run_preprocess(
    args: &Args,
    cfg: &RunConfig,
    store: &Arc<dyn BlobStore>,
) -> Result<(), AppError> {
    let analyzer = Arc::new(RemoteAnalyzer::new(&args.analyzer_url)?);
    preprocess::preprocess_sources(
        Arc::clone(store),
        analyzer,
        Arc::new(cfg.router()),
        &cfg.source_container,
        &cfg.processed_container,
    )
    .await
}

async fn run_generate(
    args: &Args,
    cfg: &RunConfig,
    store: &Arc<dyn BlobStore>,
) -> Result<(), AppError> {
    let source_corpus = Arc::new(
        corpus::assemble_corpus(store.as_ref(), &cfg.processed_container, &cfg.exclude_sources)
            .await,
    );

    let mut jobs = Vec::with_capacity(cfg.total_sections as usize);
    for section_id in 1..=cfg.total_sections {
        jobs.push(SectionJob {
            section_id,
            writer_guidance: guidance::read_guidance_files(&[guidance::writer_guidance_path(
                &cfg.guidance_dir,
                section_id,
            )])
            .await,
            validation_guidance: guidance::read_guidance_files(&[
                guidance::validation_guidance_path(&cfg.guidance_dir, section_id),
            ])
            .await,
        });
    }

    let section_pipeline = Arc::new(SectionPipeline::new(
        Arc::clone(store),
        Arc::new(RemoteWriter::new(&args.capability_url)?),
        Arc::new(RemoteValidator::new(&args.capability_url)?),
        &cfg.output_container,
        cfg.max_rounds,
        cfg.max_critical,
        cfg.max_standard,
    ));

    let reports = section_pipeline.run_all(jobs, source_corpus).await;

    let mut accepted = 0usize;
    for report in &reports {
        match &report.outcome {
            Ok(SectionOutcome::Accepted { iteration }) => {
                tracing::info!(
                    "Section {} accepted at iteration {}",
                    report.section_id,
                    iteration
                );
                accepted += 1;
            }
            Ok(SectionOutcome::MaxRoundsExceeded { rounds }) => {
                tracing::warn!(
                    "Section {} unaccepted after {} round(s); latest iteration will merge",
                    report.section_id,
                    rounds
                );
            }
            Err(e) => {
                tracing::error!("Section {} pipeline failed: {}", report.section_id, e);
            }
        }
    }
    tracing::info!(
        "Generation finished: {}/{} sections accepted",
        accepted,
        reports.len()
    );
    Ok(())
}

async fn run_merge(cfg: &RunConfig, store: &Arc<dyn BlobStore>) -> Result<(), AppError> {
    let merged = merge::merge_sections(store, &cfg.output_container, cfg.total_sections).await?;

    // Three renditions: the cited original, a clean copy for end users, and
    // a copy with normalized citation names for fact mapping.
    store
        .put_text(&cfg.output_container, merge::FINAL_DOCUMENT_NAME, &merged)
        .await?;
    store
        .put_text(
            &cfg.output_container,
            "final_document_clean.md",
            &text::strip_citation_tags(&merged),
        )
        .await?;
    store
        .put_text(
            &cfg.output_container,
            "final_document_fact_map.md",
            &text::normalize_citation_tags(&merged),
        )
        .await?;

    tracing::info!(
        "Merged {} sections into '{}'",
        cfg.total_sections,
        merge::FINAL_DOCUMENT_NAME
    );
    Ok(())
}
