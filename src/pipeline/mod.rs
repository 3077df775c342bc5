// src/pipeline/mod.rs
pub mod feedback;
pub mod guidance;
pub mod merge;
pub mod preprocess;
pub mod section;
