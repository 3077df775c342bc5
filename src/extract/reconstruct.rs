// src/extract/reconstruct.rs
//
// Turns an engine analysis result back into a single human-readable text
// stream. Layout results are re-ordered geometrically; custom-form results
// are rendered as field lists in engine-reported order.

use crate::engine::models::{AnalysisResult, FormDocument, RawParagraph, RawTable};
use crate::extract::geometry::{overlaps_any, BoundingBox};
use crate::extract::table;

/// Counts of elements lost during reconstruction. Drops are best-effort
/// policy, not errors, but callers should be able to see them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconstructStats {
    /// Paragraphs excluded because their box overlaps a table box.
    pub paragraphs_in_tables: usize,
    /// Paragraphs with no usable bounding region.
    pub unplaced_paragraphs: usize,
    /// Tables with no usable bounding region.
    pub unplaced_tables: usize,
    /// Table cells outside their declared grid.
    pub dropped_cells: usize,
}

#[derive(Debug)]
pub struct Reconstruction {
    pub text: String,
    pub stats: ReconstructStats,
}

enum Element<'a> {
    Paragraph(&'a RawParagraph),
    Table(&'a RawTable),
}

struct Placed<'a> {
    page: u32,
    top: f64,
    element: Element<'a>,
}

/// Reconstructs reading-ordered text for one source file.
pub fn reconstruct(file_name: &str, result: &AnalysisResult) -> Reconstruction {
    let mut text = format!("# Analysis of Document: {}\n\n", file_name);
    let mut stats = ReconstructStats::default();

    if result.is_form_result() {
        tracing::info!(
            "Rendering {} structured-form instance(s) for '{}'",
            result.documents.len(),
            file_name
        );
        for doc in &result.documents {
            render_form_document(&mut text, doc);
        }
    } else {
        reconstruct_layout(&mut text, result, &mut stats);
        if stats != ReconstructStats::default() {
            tracing::warn!(
                "Reconstruction of '{}' dropped elements: {} paragraphs inside tables, \
                 {} unplaced paragraphs, {} unplaced tables, {} out-of-grid cells",
                file_name,
                stats.paragraphs_in_tables,
                stats.unplaced_paragraphs,
                stats.unplaced_tables,
                stats.dropped_cells
            );
        }
    }

    Reconstruction { text, stats }
}

/// One block per detected form instance: `**field:** value` lines in
/// engine-reported order, no geometric sorting.
fn render_form_document(text: &mut String, doc: &FormDocument) {
    text.push_str(&format!("## Form Data (Doc Type: {})\n", doc.doc_type));
    for field in &doc.fields {
        text.push_str(&format!("**{}:** {}\n", field.name, field.value.trim()));
    }
    text.push('\n');
}

fn reconstruct_layout(text: &mut String, result: &AnalysisResult, stats: &mut ReconstructStats) {
    // Collect every table box first so paragraphs can be classified against
    // the full set regardless of element ordering in the result.
    let mut table_boxes: Vec<BoundingBox> = Vec::new();
    let mut placed: Vec<Placed> = Vec::new();

    for raw_table in &result.tables {
        let bbox = raw_table
            .region
            .as_ref()
            .and_then(BoundingBox::from_region);
        match bbox {
            Some(bbox) => {
                table_boxes.push(bbox);
                placed.push(Placed {
                    page: bbox.page,
                    top: bbox.top(),
                    element: Element::Table(raw_table),
                });
            }
            None => stats.unplaced_tables += 1,
        }
    }

    for paragraph in &result.paragraphs {
        let bbox = paragraph
            .region
            .as_ref()
            .and_then(BoundingBox::from_region);
        match bbox {
            Some(bbox) => {
                if overlaps_any(&bbox, &table_boxes) {
                    // Already represented inside a table's cells.
                    stats.paragraphs_in_tables += 1;
                } else {
                    placed.push(Placed {
                        page: bbox.page,
                        top: bbox.top(),
                        element: Element::Paragraph(paragraph),
                    });
                }
            }
            None => stats.unplaced_paragraphs += 1,
        }
    }

    // Stable sort: ties keep the engine's extraction order.
    placed.sort_by(|a, b| a.page.cmp(&b.page).then(a.top.total_cmp(&b.top)));

    for item in &placed {
        match item.element {
            Element::Paragraph(paragraph) => {
                text.push_str(&paragraph.content);
                text.push_str("\n\n");
            }
            Element::Table(raw_table) => {
                let (block, dropped) = table::format_table(raw_table, item.page);
                stats.dropped_cells += dropped;
                text.push_str(&block);
            }
        }
    }
}
