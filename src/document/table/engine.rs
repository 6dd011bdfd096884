//! Structural table mutation: row/column insertion, merging, traversal.
//!
//! Every operation validates its addresses before touching the table, so a
//! rejected call leaves the structure exactly as it was. The one documented
//! exception is `merge_range`, which merges row by row and does not roll
//! back rows already merged when a later row fails.

use crate::error::{Error, Result};

use super::cell::TableCell;
use super::row::TableRow;
use super::types::{CellAddress, GridColumn, VMerge};
use super::Table;

impl Table {
    /// Insert an empty row at `index` (0..=row_count).
    ///
    /// Cell widths and vertical alignment are copied from the adjacent row;
    /// merge state never is.
    pub fn insert_row(&mut self, index: usize) -> Result<()> {
        if index > self.rows.len() {
            return Err(Error::OutOfRange {
                what: "row",
                index,
                len: self.rows.len(),
            });
        }

        let template = if index > 0 {
            self.rows.get(index - 1)
        } else {
            self.rows.first()
        };

        let row = match template {
            Some(template) => TableRow {
                properties: template.properties.clone(),
                cells: template.cells.iter().map(TableCell::placeholder_like).collect(),
            },
            None => TableRow::new(self.column_count().max(1)),
        };

        self.rows.insert(index, row);
        Ok(())
    }

    /// Append an empty row shaped like the last row
    pub fn add_row(&mut self) -> Result<&mut TableRow> {
        self.insert_row(self.rows.len())?;
        match self.rows.last_mut() {
            Some(row) => Ok(row),
            None => unreachable!("insert_row appended a row"),
        }
    }

    /// Remove the row at `index`
    pub fn remove_row(&mut self, index: usize) -> Result<TableRow> {
        if index >= self.rows.len() {
            return Err(Error::OutOfRange {
                what: "row",
                index,
                len: self.rows.len(),
            });
        }
        Ok(self.rows.remove(index))
    }

    /// Insert a column at `index` (0..=column_count).
    ///
    /// The grid width and per-cell width/alignment come from the adjacent
    /// column. Rows narrowed by a horizontal merge get the new cell at the
    /// end of their cell list when `index` is past it.
    pub fn insert_column(&mut self, index: usize) -> Result<()> {
        if index > self.grid.len() {
            return Err(Error::OutOfRange {
                what: "column",
                index,
                len: self.grid.len(),
            });
        }

        let template_col = if index > 0 { index - 1 } else { 0 };
        let width = self.grid.get(template_col).and_then(|c| c.width);
        self.grid.insert(index, GridColumn { width });

        for row in &mut self.rows {
            let at = index.min(row.cells.len());
            let template_cell = if at > 0 {
                row.cells.get(at - 1)
            } else {
                row.cells.first()
            };
            let cell = template_cell
                .map(TableCell::placeholder_like)
                .unwrap_or_else(|| TableCell::new(""));
            row.cells.insert(at, cell);
        }

        Ok(())
    }

    /// Append a column
    pub fn add_column(&mut self) -> Result<()> {
        self.insert_column(self.grid.len())
    }

    /// Remove the column at `index` from the grid and every row
    pub fn remove_column(&mut self, index: usize) -> Result<()> {
        if index >= self.grid.len() {
            return Err(Error::OutOfRange {
                what: "column",
                index,
                len: self.grid.len(),
            });
        }
        self.grid.remove(index);
        for row in &mut self.rows {
            if index < row.cells.len() {
                row.cells.remove(index);
            }
        }
        Ok(())
    }

    /// Merge cells `start..=end` of one row into the cell at `start`.
    ///
    /// The first cell gets `gridSpan = end - start + 1` and the intervening
    /// cells are removed; their content is discarded.
    pub fn merge_cells_horizontal(&mut self, row: usize, start: usize, end: usize) -> Result<()> {
        let row_count = self.rows.len();
        let cells = &mut self
            .rows
            .get_mut(row)
            .ok_or(Error::OutOfRange {
                what: "row",
                index: row,
                len: row_count,
            })?
            .cells;

        if start >= end {
            return Err(Error::InvalidArgument(format!(
                "horizontal merge range must span at least two cells, got {start}..={end}"
            )));
        }
        if end >= cells.len() {
            return Err(Error::OutOfRange {
                what: "cell",
                index: end,
                len: cells.len(),
            });
        }

        let span = (end - start + 1) as u32;
        cells[start].properties.grid_span = Some(span);
        cells.drain(start + 1..=end);
        Ok(())
    }

    /// Undo a horizontal merge at (`row`, `col`).
    ///
    /// Re-inserts `span - 1` placeholder cells that keep only the merged
    /// cell's width and alignment; the merged content stays in the first
    /// cell.
    pub fn unmerge_cells_horizontal(&mut self, row: usize, col: usize) -> Result<()> {
        let row_count = self.rows.len();
        let cells = &mut self
            .rows
            .get_mut(row)
            .ok_or(Error::OutOfRange {
                what: "row",
                index: row,
                len: row_count,
            })?
            .cells;

        let len = cells.len();
        let cell = cells.get_mut(col).ok_or(Error::OutOfRange {
            what: "cell",
            index: col,
            len,
        })?;

        let span = cell.properties.grid_span.take().unwrap_or(1);
        if span <= 1 {
            return Err(Error::InvalidArgument(format!(
                "cell ({row}, {col}) is not horizontally merged"
            )));
        }

        let placeholder = cell.placeholder_like();
        for offset in 1..span as usize {
            cells.insert(col + offset, placeholder.clone());
        }
        Ok(())
    }

    /// Merge column `col` across rows `start_row..=end_row`.
    ///
    /// Validates the whole range before mutating anything. The first cell
    /// becomes the merge origin; continuation cells lose their content.
    pub fn merge_cells_vertical(
        &mut self,
        start_row: usize,
        end_row: usize,
        col: usize,
    ) -> Result<()> {
        if start_row >= end_row {
            return Err(Error::InvalidArgument(format!(
                "vertical merge range must span at least two rows, got {start_row}..={end_row}"
            )));
        }
        if end_row >= self.rows.len() {
            return Err(Error::OutOfRange {
                what: "row",
                index: end_row,
                len: self.rows.len(),
            });
        }
        // Address check for every row in the range, before any mutation.
        for r in start_row..=end_row {
            let len = self.rows[r].cells.len();
            if col >= len {
                return Err(Error::OutOfRange {
                    what: "cell",
                    index: col,
                    len,
                });
            }
        }

        for r in start_row..=end_row {
            let cell = &mut self.rows[r].cells[col];
            if r == start_row {
                cell.properties.v_merge = Some(VMerge::Restart);
            } else {
                cell.properties.v_merge = Some(VMerge::Continue);
                cell.clear();
            }
        }
        Ok(())
    }

    /// Merge a rectangular range: a horizontal merge per row, then one
    /// vertical merge down the first column of the range.
    ///
    /// Not transactional across rows: if a later row fails, earlier rows
    /// stay merged.
    pub fn merge_range(
        &mut self,
        start_row: usize,
        end_row: usize,
        start_col: usize,
        end_col: usize,
    ) -> Result<()> {
        if start_row == end_row && start_col == end_col {
            return Err(Error::InvalidArgument(
                "merge range must span more than one cell".into(),
            ));
        }
        if start_row > end_row || start_col > end_col {
            return Err(Error::InvalidArgument(format!(
                "merge range is inverted: rows {start_row}..={end_row}, cols {start_col}..={end_col}"
            )));
        }

        if start_col < end_col {
            for r in start_row..=end_row {
                self.merge_cells_horizontal(r, start_col, end_col)?;
            }
        }
        if start_row < end_row {
            self.merge_cells_vertical(start_row, end_row, start_col)?;
        }
        Ok(())
    }

    /// Text of the cell at (`row`, `col`)
    pub fn cell_text(&self, row: usize, col: usize) -> Result<String> {
        let table_row = self.rows.get(row).ok_or(Error::OutOfRange {
            what: "row",
            index: row,
            len: self.rows.len(),
        })?;
        let cell = table_row.cells.get(col).ok_or(Error::OutOfRange {
            what: "cell",
            index: col,
            len: table_row.cells.len(),
        })?;
        Ok(cell.text())
    }

    /// Replace the content of the cell at (`row`, `col`) with a single
    /// paragraph of `text`
    pub fn set_cell_text(&mut self, row: usize, col: usize, text: impl Into<String>) -> Result<()> {
        let row_count = self.rows.len();
        let table_row = self.rows.get_mut(row).ok_or(Error::OutOfRange {
            what: "row",
            index: row,
            len: row_count,
        })?;
        let len = table_row.cells.len();
        let cell = table_row.cells.get_mut(col).ok_or(Error::OutOfRange {
            what: "cell",
            index: col,
            len,
        })?;
        cell.set_text(text);
        Ok(())
    }

    /// Row-major walk over every cell
    pub fn walk(&self) -> CellWalk<'_> {
        CellWalk::new(self, None, None)
    }

    /// Walk one row
    pub fn walk_row(&self, row: usize) -> Result<CellWalk<'_>> {
        if row >= self.rows.len() {
            return Err(Error::OutOfRange {
                what: "row",
                index: row,
                len: self.rows.len(),
            });
        }
        Ok(CellWalk::new(self, Some(row), None))
    }

    /// Walk one column, visiting only rows wide enough to have it
    pub fn walk_column(&self, col: usize) -> Result<CellWalk<'_>> {
        if col >= self.column_count() {
            return Err(Error::OutOfRange {
                what: "column",
                index: col,
                len: self.column_count(),
            });
        }
        Ok(CellWalk::new(self, None, Some(col)))
    }

    /// First cell whose full text equals `text`
    pub fn find_cell(&self, text: &str) -> Option<CellAddress> {
        self.walk()
            .find(|(_, cell)| cell.text() == text)
            .map(|(addr, _)| addr)
    }

    /// All cells whose text contains `needle`
    pub fn find_cells(&self, needle: &str) -> Vec<CellAddress> {
        self.walk()
            .filter(|(_, cell)| cell.text().contains(needle))
            .map(|(addr, _)| addr)
            .collect()
    }
}

/// Restartable row-major cell traversal.
///
/// Yields `(CellAddress, &TableCell)` and tracks progress. Built on address
/// lookups so a scope (single row or single column) is just a filter over
/// the same cursor.
pub struct CellWalk<'a> {
    table: &'a Table,
    row_scope: Option<usize>,
    col_scope: Option<usize>,
    row: usize,
    col: usize,
    visited: usize,
    total: usize,
}

impl<'a> CellWalk<'a> {
    fn new(table: &'a Table, row_scope: Option<usize>, col_scope: Option<usize>) -> Self {
        let total = table
            .rows
            .iter()
            .enumerate()
            .filter(|(r, _)| row_scope.map(|scope| *r == scope).unwrap_or(true))
            .map(|(_, row)| match col_scope {
                Some(col) => usize::from(col < row.cells.len()),
                None => row.cells.len(),
            })
            .sum();

        let mut walk = CellWalk {
            table,
            row_scope,
            col_scope,
            row: 0,
            col: 0,
            visited: 0,
            total,
        };
        walk.rewind();
        walk
    }

    /// Progress as (visited, total)
    pub fn progress(&self) -> (usize, usize) {
        (self.visited, self.total)
    }

    /// Reset the cursor to the start of the scope
    pub fn restart(&mut self) {
        self.visited = 0;
        self.rewind();
    }

    fn rewind(&mut self) {
        self.row = self.row_scope.unwrap_or(0);
        self.col = self.col_scope.unwrap_or(0);
    }

    fn advance(&mut self) {
        match (self.row_scope, self.col_scope) {
            (_, Some(_)) => self.row += 1,
            (Some(_), None) => self.col += 1,
            (None, None) => {
                self.col += 1;
                let row_len = self
                    .table
                    .rows
                    .get(self.row)
                    .map(|r| r.cells.len())
                    .unwrap_or(0);
                if self.col >= row_len {
                    self.row += 1;
                    self.col = 0;
                }
            }
        }
    }

    fn done(&self) -> bool {
        match (self.row_scope, self.col_scope) {
            (_, Some(_)) => self.row >= self.table.rows.len(),
            (Some(scope), None) => {
                self.col
                    >= self
                        .table
                        .rows
                        .get(scope)
                        .map(|r| r.cells.len())
                        .unwrap_or(0)
            }
            (None, None) => self.row >= self.table.rows.len(),
        }
    }
}

impl<'a> Iterator for CellWalk<'a> {
    type Item = (CellAddress, &'a TableCell);

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done() {
            let addr = CellAddress::new(self.row, self.col);
            let cell = self.table.cell(addr.row, addr.col);
            self.advance();
            if let Some(cell) = cell {
                self.visited += 1;
                return Some((addr, cell));
            }
            // Column scope over a row narrowed by a merge: skip it.
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::roundtrip;
    use super::*;
    use crate::document::table::VerticalAlignment;

    fn filled(rows: usize, cols: usize) -> Table {
        let mut table = Table::new(rows, cols).unwrap();
        for r in 0..rows {
            for c in 0..cols {
                table.set_cell_text(r, c, format!("r{r}c{c}")).unwrap();
            }
        }
        table
    }

    #[test]
    fn test_horizontal_merge_removes_intervening_cells() {
        let mut table = filled(2, 4);
        table.merge_cells_horizontal(0, 1, 3).unwrap();

        assert_eq!(table.rows[0].cells.len(), 2);
        assert_eq!(table.rows[1].cells.len(), 4);
        assert_eq!(table.cell(0, 1).unwrap().grid_span(), 3);
        assert_eq!(table.cell_text(0, 1).unwrap(), "r0c1");
    }

    #[test]
    fn test_horizontal_merge_rejects_degenerate_range() {
        let mut table = filled(2, 3);
        let err = table.merge_cells_horizontal(0, 1, 1).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        // No mutation happened.
        assert_eq!(table.rows[0].cells.len(), 3);
        assert_eq!(table.cell(0, 1).unwrap().grid_span(), 1);
    }

    #[test]
    fn test_horizontal_merge_out_of_range() {
        let mut table = filled(2, 3);
        assert!(matches!(
            table.merge_cells_horizontal(5, 0, 1),
            Err(Error::OutOfRange { what: "row", .. })
        ));
        assert!(matches!(
            table.merge_cells_horizontal(0, 1, 7),
            Err(Error::OutOfRange { what: "cell", .. })
        ));
    }

    #[test]
    fn test_unmerge_restores_cell_count() {
        let mut table = filled(1, 4);
        table.cell_mut(0, 1).unwrap().set_width(1200);
        table.merge_cells_horizontal(0, 1, 3).unwrap();
        table.unmerge_cells_horizontal(0, 1).unwrap();

        assert_eq!(table.rows[0].cells.len(), 4);
        assert_eq!(table.cell(0, 1).unwrap().grid_span(), 1);
        // Merged content stays in the first cell; placeholders are empty
        // but keep the width.
        assert_eq!(table.cell_text(0, 1).unwrap(), "r0c1");
        assert_eq!(table.cell_text(0, 2).unwrap(), "");
        assert_eq!(table.cell(0, 2).unwrap().width(), Some(1200));
    }

    #[test]
    fn test_unmerge_rejects_unmerged_cell() {
        let mut table = filled(1, 2);
        assert!(matches!(
            table.unmerge_cells_horizontal(0, 0),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_vertical_merge_chain() {
        let mut table = filled(3, 2);
        table.merge_cells_vertical(0, 2, 1).unwrap();

        assert!(table.cell(0, 1).unwrap().is_v_merge_start());
        assert!(table.cell(1, 1).unwrap().is_v_merge_continue());
        assert!(table.cell(2, 1).unwrap().is_v_merge_continue());
        // Continuation cells are cleared, the origin keeps its content.
        assert_eq!(table.cell_text(0, 1).unwrap(), "r0c1");
        assert_eq!(table.cell_text(1, 1).unwrap(), "");
        // The other column is untouched.
        assert_eq!(table.cell_text(1, 0).unwrap(), "r1c0");
    }

    #[test]
    fn test_vertical_merge_validates_before_mutation() {
        let mut table = filled(3, 3);
        // Narrow the middle row so column 2 is missing there.
        table.merge_cells_horizontal(1, 1, 2).unwrap();

        let err = table.merge_cells_vertical(0, 2, 2).unwrap_err();
        assert!(matches!(err, Error::OutOfRange { what: "cell", .. }));
        // Row 0 was not touched even though it precedes the failing row.
        assert_eq!(table.cell(0, 2).unwrap().v_merge(), None);
        assert_eq!(table.cell_text(0, 2).unwrap(), "r0c2");
    }

    #[test]
    fn test_vertical_merge_rejects_single_row() {
        let mut table = filled(2, 2);
        assert!(matches!(
            table.merge_cells_vertical(1, 1, 0),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_merge_range() {
        let mut table = filled(2, 3);
        table.merge_range(0, 1, 0, 2).unwrap();

        // Each row collapsed to one spanning cell, vertically chained.
        assert_eq!(table.rows[0].cells.len(), 1);
        assert_eq!(table.rows[1].cells.len(), 1);
        assert_eq!(table.cell(0, 0).unwrap().grid_span(), 3);
        assert!(table.cell(0, 0).unwrap().is_v_merge_start());
        assert!(table.cell(1, 0).unwrap().is_v_merge_continue());
    }

    #[test]
    fn test_merge_range_rejects_single_cell() {
        let mut table = filled(2, 2);
        assert!(matches!(
            table.merge_range(0, 0, 1, 1),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_merge_survives_roundtrip() {
        let mut table = filled(3, 3);
        table.merge_cells_horizontal(0, 0, 1).unwrap();
        table.merge_cells_vertical(1, 2, 2).unwrap();

        let table2 = roundtrip(&table);
        assert_eq!(table2.cell(0, 0).unwrap().grid_span(), 2);
        assert!(table2.cell(1, 2).unwrap().is_v_merge_start());
        assert!(table2.cell(2, 2).unwrap().is_v_merge_continue());
    }

    #[test]
    fn test_insert_row_copies_shape_not_merges() {
        let mut table = filled(2, 3);
        table.cell_mut(1, 0).unwrap().set_width(999);
        table
            .cell_mut(1, 0)
            .unwrap()
            .set_vertical_alignment(VerticalAlignment::Bottom);
        table.merge_cells_horizontal(1, 1, 2).unwrap();

        table.insert_row(2).unwrap();
        let new_row = &table.rows[2];
        // Shape follows the adjacent (merged) row.
        assert_eq!(new_row.cells.len(), 2);
        assert_eq!(new_row.cells[0].width(), Some(999));
        assert_eq!(
            new_row.cells[0].vertical_alignment(),
            Some(VerticalAlignment::Bottom)
        );
        // Merge state is never copied.
        assert_eq!(new_row.cells[1].grid_span(), 1);
        assert_eq!(new_row.cells[1].v_merge(), None);
    }

    #[test]
    fn test_insert_and_remove_column() {
        let mut table = filled(2, 2);
        table.set_column_width(0, 1111).unwrap();

        table.insert_column(1).unwrap();
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.grid[1].width, Some(1111));
        assert_eq!(table.cell(0, 1).unwrap().width(), Some(1111));
        assert_eq!(table.cell_text(0, 2).unwrap(), "r0c1");

        table.remove_column(1).unwrap();
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.cell_text(0, 1).unwrap(), "r0c1");
    }

    #[test]
    fn test_insert_row_out_of_range() {
        let mut table = filled(1, 1);
        assert!(matches!(
            table.insert_row(5),
            Err(Error::OutOfRange { what: "row", .. })
        ));
    }

    #[test]
    fn test_cell_text_out_of_range() {
        let table = filled(2, 2);
        assert!(matches!(
            table.cell_text(9, 0),
            Err(Error::OutOfRange { what: "row", index: 9, len: 2 })
        ));
        assert!(matches!(
            table.cell_text(0, 9),
            Err(Error::OutOfRange { what: "cell", index: 9, len: 2 })
        ));
    }

    #[test]
    fn test_walk_row_major_with_progress() {
        let table = filled(2, 3);
        let mut walk = table.walk();
        assert_eq!(walk.progress(), (0, 6));

        let first: Vec<_> = walk.by_ref().take(4).map(|(addr, _)| addr).collect();
        assert_eq!(first[0], CellAddress::new(0, 0));
        assert_eq!(first[3], CellAddress::new(1, 0));
        assert_eq!(walk.progress(), (4, 6));

        walk.restart();
        assert_eq!(walk.progress(), (0, 6));
        assert_eq!(walk.count(), 6);
    }

    #[test]
    fn test_walk_scoped() {
        let table = filled(3, 2);

        let row_cells: Vec<_> = table
            .walk_row(1)
            .unwrap()
            .map(|(_, cell)| cell.text())
            .collect();
        assert_eq!(row_cells, vec!["r1c0", "r1c1"]);

        let col_cells: Vec<_> = table
            .walk_column(1)
            .unwrap()
            .map(|(_, cell)| cell.text())
            .collect();
        assert_eq!(col_cells, vec!["r0c1", "r1c1", "r2c1"]);

        assert!(table.walk_row(9).is_err());
        assert!(table.walk_column(9).is_err());
    }

    #[test]
    fn test_walk_column_skips_narrowed_rows() {
        let mut table = filled(3, 3);
        table.merge_cells_horizontal(1, 1, 2).unwrap();

        let walk = table.walk_column(2).unwrap();
        assert_eq!(walk.progress().1, 2);
        let cells: Vec<_> = walk.map(|(addr, _)| addr.row).collect();
        assert_eq!(cells, vec![0, 2]);
    }

    #[test]
    fn test_find_cell_exact_and_substring() {
        let table = filled(2, 2);
        assert_eq!(table.find_cell("r1c0"), Some(CellAddress::new(1, 0)));
        assert_eq!(table.find_cell("r1"), None);

        let hits = table.find_cells("c1");
        assert_eq!(
            hits,
            vec![CellAddress::new(0, 1), CellAddress::new(1, 1)]
        );
    }
}
