// src/utils/error.rs
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error), // Automatically convert reqwest errors

    #[error("HTTP error: {0}")]
    Http(reqwest::StatusCode), // e.g., 404 Not Found, 503 Service Unavailable

    #[error("Capability returned an unusable response: {0}")]
    Capability(String),

    #[error("Failed to parse capability response: {0}")]
    Parse(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Blob not found: {0}")]
    NotFound(String),
}

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("Incomplete section set: found {found} sections, expected {expected}")]
    IncompleteSections { found: usize, expected: usize },

    #[error("Store access failed during merge: {0}")]
    Store(#[from] StoreError),

    #[error("Merge retrieval task failed: {0}")]
    Join(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Capability invocation failed: {0}")]
    Engine(#[from] EngineError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Merge failed: {0}")]
    Merge(#[from] MergeError),

    #[error("Pipeline failed: {0}")]
    Pipeline(String),
}
