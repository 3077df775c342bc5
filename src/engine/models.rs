// src/engine/models.rs
use serde::{Deserialize, Serialize};

/// A point in page coordinates, as reported by the extraction engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// The location of an element: a 1-based page number plus the polygon the
/// engine drew around it. The polygon is not guaranteed to be rectangular.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingRegion {
    pub page: u32,
    pub polygon: Vec<Point>,
}

/// A run of body text with its location. Elements without a region cannot
/// be placed in reading order and are dropped during reconstruction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawParagraph {
    pub content: String,
    #[serde(default)]
    pub region: Option<BoundingRegion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableCell {
    pub row_index: usize,
    pub column_index: usize,
    pub content: String,
}

/// An extracted table: a declared grid size plus a sparse cell list. Cells
/// may repeat an index; later cells win. Cells outside the declared grid
/// are dropped by the formatter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTable {
    pub rows: usize,
    pub columns: usize,
    pub cells: Vec<TableCell>,
    #[serde(default)]
    pub region: Option<BoundingRegion>,
}

/// One extracted field of a structured form, in engine-reported order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

/// A structured-form instance recognized by a custom extraction profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormDocument {
    pub doc_type: String,
    pub fields: Vec<FormField>,
}

/// Result of one analysis pass over one source file.
///
/// A custom profile populates `documents` (field-map mode); the fallback
/// layout profile populates `paragraphs` and `tables` (geometric mode).
/// The two modes are mutually exclusive per file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub documents: Vec<FormDocument>,
    #[serde(default)]
    pub paragraphs: Vec<RawParagraph>,
    #[serde(default)]
    pub tables: Vec<RawTable>,
}

impl AnalysisResult {
    pub fn is_form_result(&self) -> bool {
        !self.documents.is_empty()
    }
}
