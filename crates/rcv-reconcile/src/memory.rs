//! In-memory [`RowSource`].
//!
//! Backs the CSV worksheet adapter and serves as the test double for the
//! engine. Read/write failures can be injected to exercise upstream-failure
//! paths.

use crate::{RowSource, SheetError};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemorySheet {
    rows: Vec<Vec<String>>,
    writes: usize,
    fail_reads: bool,
    /// Writes fail once `writes` reaches this count.
    write_limit: Option<usize>,
}

impl MemorySheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from rows in spreadsheet order (first element = row 1).
    pub fn from_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|r| r.into_iter().map(Into::into).collect())
                .collect(),
            ..Self::default()
        }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of successful `update_cell` calls so far.
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Make every read fail with [`SheetError::Read`].
    pub fn fail_reads(&mut self, on: bool) {
        self.fail_reads = on;
    }

    /// Make every write fail with [`SheetError::Write`].
    pub fn fail_writes(&mut self, on: bool) {
        self.write_limit = on.then_some(self.writes);
    }

    /// Allow `n` more writes, then fail every write after them.
    pub fn fail_writes_after(&mut self, n: usize) {
        self.write_limit = Some(self.writes + n);
    }

    fn check_address(row: usize, col: usize) -> Result<(), SheetError> {
        if row == 0 || col == 0 {
            return Err(SheetError::InvalidAddress { row, col });
        }
        Ok(())
    }

    fn check_readable(&self) -> Result<(), SheetError> {
        if self.fail_reads {
            return Err(SheetError::Read("injected read failure".to_string()));
        }
        Ok(())
    }
}

impl RowSource for MemorySheet {
    fn all_values(&self) -> Result<Vec<Vec<String>>, SheetError> {
        self.check_readable()?;
        Ok(self.rows.clone())
    }

    fn cell(&self, row: usize, col: usize) -> Result<String, SheetError> {
        Self::check_address(row, col)?;
        self.check_readable()?;
        Ok(self
            .rows
            .get(row - 1)
            .and_then(|r| r.get(col - 1))
            .cloned()
            .unwrap_or_default())
    }

    fn update_cell(&mut self, row: usize, col: usize, value: &str) -> Result<(), SheetError> {
        Self::check_address(row, col)?;
        if self.write_limit.is_some_and(|limit| self.writes >= limit) {
            return Err(SheetError::Write {
                row,
                col,
                message: "injected write failure".to_string(),
            });
        }
        if self.rows.len() < row {
            self.rows.resize_with(row, Vec::new);
        }
        let cells = &mut self.rows[row - 1];
        if cells.len() < col {
            cells.resize(col, String::new());
        }
        cells[col - 1] = value.to_string();
        self.writes += 1;
        Ok(())
    }

    fn row_count(&self) -> Result<usize, SheetError> {
        self.check_readable()?;
        Ok(self.rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_past_populated_area_are_empty() {
        let sheet = MemorySheet::from_rows([vec!["a", "b"]]);
        assert_eq!(sheet.cell(1, 2).unwrap(), "b");
        assert_eq!(sheet.cell(1, 9).unwrap(), "");
        assert_eq!(sheet.cell(5, 1).unwrap(), "");
    }

    #[test]
    fn zero_address_is_rejected() {
        let mut sheet = MemorySheet::new();
        assert_eq!(
            sheet.cell(0, 1),
            Err(SheetError::InvalidAddress { row: 0, col: 1 })
        );
        assert!(sheet.update_cell(1, 0, "x").is_err());
        assert_eq!(sheet.writes(), 0);
    }

    #[test]
    fn update_grows_ragged_rows() {
        let mut sheet = MemorySheet::from_rows([vec!["a"]]);
        sheet.update_cell(3, 4, "z").unwrap();
        assert_eq!(sheet.row_count().unwrap(), 3);
        assert_eq!(sheet.rows()[2], vec!["", "", "", "z"]);
        assert_eq!(sheet.rows()[1], Vec::<String>::new());
    }

    #[test]
    fn write_budget_fails_later_writes() {
        let mut sheet = MemorySheet::from_rows([vec!["a"]]);
        sheet.update_cell(1, 1, "b").unwrap();
        sheet.fail_writes_after(1);
        sheet.update_cell(1, 1, "c").unwrap();
        assert!(matches!(
            sheet.update_cell(1, 1, "d"),
            Err(SheetError::Write { row: 1, col: 1, .. })
        ));
        assert_eq!(sheet.cell(1, 1).unwrap(), "c");
        sheet.fail_writes(false);
        sheet.update_cell(1, 1, "e").unwrap();
        assert_eq!(sheet.writes(), 3);
    }

    #[test]
    fn col_values_trims_trailing_empties() {
        let sheet = MemorySheet::from_rows([
            vec!["h1", "Order #"],
            vec!["x", "PO-1"],
            vec!["y", ""],
            vec!["z", "PO-2"],
            vec!["w"],
        ]);
        assert_eq!(sheet.col_values(2).unwrap(), vec!["Order #", "PO-1", "", "PO-2"]);
    }
}
