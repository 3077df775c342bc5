// src/extract/geometry.rs
use crate::engine::models::BoundingRegion;

/// Axis-aligned bounding box derived from a polygon, tagged with its page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub page: u32,
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Derives the box from a region's polygon. Returns `None` for an empty
    /// polygon, which marks the element as unplaceable.
    pub fn from_region(region: &BoundingRegion) -> Option<Self> {
        let first = region.polygon.first()?;
        let mut bbox = BoundingBox {
            page: region.page,
            min_x: first.x,
            max_x: first.x,
            min_y: first.y,
            max_y: first.y,
        };
        for point in &region.polygon[1..] {
            bbox.min_x = bbox.min_x.min(point.x);
            bbox.max_x = bbox.max_x.max(point.x);
            bbox.min_y = bbox.min_y.min(point.y);
            bbox.max_y = bbox.max_y.max(point.y);
        }
        Some(bbox)
    }

    /// The top edge of the box: the vertical component of the reading-order key.
    pub fn top(&self) -> f64 {
        self.min_y
    }

    /// Strict-inequality interval intersection on both axes. Boxes on
    /// different pages never overlap; touching edges do not count. A
    /// degenerate (zero-area) box still overlaps anything it sits strictly
    /// inside of.
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        if self.page != other.page {
            return false;
        }
        let x_overlap = self.min_x < other.max_x && self.max_x > other.min_x;
        let y_overlap = self.min_y < other.max_y && self.max_y > other.min_y;
        x_overlap && y_overlap
    }
}

/// True if the element's box overlaps any known table box. A paragraph that
/// does is assumed to be represented inside that table's cells already.
pub fn overlaps_any(element: &BoundingBox, table_boxes: &[BoundingBox]) -> bool {
    table_boxes.iter().any(|table| element.overlaps(table))
}
