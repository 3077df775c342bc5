// src/extract/table.rs
use crate::engine::models::RawTable;

/// Renders a table as a pipe-delimited text block: a title line naming the
/// page, a header row from grid row 0, a separator row, then data rows.
///
/// Cells are placed best-effort: content is trimmed with internal line
/// breaks flattened to spaces, duplicate indices overwrite silently, and
/// out-of-bounds cells are dropped. Returns the block plus the number of
/// dropped cells so callers can surface the loss. An empty grid yields an
/// empty block.
pub fn format_table(table: &RawTable, page: u32) -> (String, usize) {
    if table.rows == 0 || table.columns == 0 {
        return (String::new(), table.cells.len());
    }

    let mut grid = vec![vec![String::new(); table.columns]; table.rows];
    let mut dropped = 0usize;
    for cell in &table.cells {
        if cell.row_index < table.rows && cell.column_index < table.columns {
            grid[cell.row_index][cell.column_index] =
                cell.content.replace('\n', " ").trim().to_string();
        } else {
            dropped += 1;
        }
    }

    let mut block = format!("\n### Table (Page {})\n", page);
    block.push_str(&format!("| {} |\n", grid[0].join(" | ")));
    block.push_str(&format!("| {} |\n", vec!["---"; table.columns].join(" | ")));
    for row in &grid[1..] {
        block.push_str(&format!("| {} |\n", row.join(" | ")));
    }
    block.push('\n');

    (block, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::models::TableCell;

    fn cell(row: usize, col: usize, content: &str) -> TableCell {
        TableCell {
            row_index: row,
            column_index: col,
            content: content.to_string(),
        }
    }

    #[test]
    fn test_basic_table_block() {
        let table = RawTable {
            rows: 2,
            columns: 2,
            cells: vec![
                cell(0, 0, "Name"),
                cell(0, 1, "Value"),
                cell(1, 0, " Assets\ntotal "),
                cell(1, 1, "100"),
            ],
            region: None,
        };
        let (block, dropped) = format_table(&table, 3);
        assert_eq!(dropped, 0);
        assert_eq!(
            block,
            "\n### Table (Page 3)\n| Name | Value |\n| --- | --- |\n| Assets total | 100 |\n\n"
        );
    }

    #[test]
    fn test_out_of_bounds_cells_are_dropped() {
        let table = RawTable {
            rows: 1,
            columns: 1,
            cells: vec![cell(0, 0, "ok"), cell(0, 5, "gone"), cell(9, 0, "gone")],
            region: None,
        };
        let (block, dropped) = format_table(&table, 1);
        assert_eq!(dropped, 2);
        assert!(block.contains("| ok |"));
        assert!(!block.contains("gone"));
    }

    #[test]
    fn test_duplicate_cell_overwrites() {
        let table = RawTable {
            rows: 1,
            columns: 1,
            cells: vec![cell(0, 0, "first"), cell(0, 0, "second")],
            region: None,
        };
        let (block, dropped) = format_table(&table, 1);
        assert_eq!(dropped, 0);
        assert!(block.contains("| second |"));
        assert!(!block.contains("first"));
    }

    #[test]
    fn test_empty_grid_yields_empty_block() {
        let table = RawTable {
            rows: 0,
            columns: 3,
            cells: vec![cell(0, 0, "lost")],
            region: None,
        };
        let (block, dropped) = format_table(&table, 1);
        assert!(block.is_empty());
        assert_eq!(dropped, 1);
    }

    #[test]
    fn test_formatting_is_idempotent() {
        let table = RawTable {
            rows: 2,
            columns: 2,
            cells: vec![cell(0, 0, "a"), cell(0, 1, "b"), cell(1, 1, "c")],
            region: None,
        };
        let (first, _) = format_table(&table, 2);
        let (second, _) = format_table(&table, 2);
        assert_eq!(first, second);
    }
}
