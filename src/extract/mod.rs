// src/extract/mod.rs
pub mod geometry;
pub mod reconstruct;
pub mod router;
pub mod table;
