//! CSV-backed worksheet.
//!
//! Line 1 of the file is spreadsheet row 1; there is no header handling, the
//! header row of the tab is just another row. Rows may have different
//! lengths. A blank line is an empty row: the CSV reader skips it, so the
//! loader puts it back from the bytes between records, and
//! [`CsvWorksheet::save`] writes it out as `""`. Blank lines after the last
//! record are not rows.

use std::fmt;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use rcv_reconcile::{MemorySheet, RowSource, SheetError};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum CsvSheetError {
    /// The file could not be opened, read or written.
    Io { path: PathBuf, message: String },
    /// A record could not be decoded or encoded.
    Csv { path: PathBuf, message: String },
}

impl fmt::Display for CsvSheetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CsvSheetError::Io { path, message } => {
                write!(f, "worksheet io error at {}: {message}", path.display())
            }
            CsvSheetError::Csv { path, message } => {
                write!(f, "worksheet csv error at {}: {message}", path.display())
            }
        }
    }
}

impl std::error::Error for CsvSheetError {}

// ---------------------------------------------------------------------------
// Worksheet
// ---------------------------------------------------------------------------

/// One tab held in memory and written back with [`save`][Self::save].
#[derive(Debug, Clone)]
pub struct CsvWorksheet {
    path: PathBuf,
    sheet: MemorySheet,
}

impl CsvWorksheet {
    /// Load the tab stored at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CsvSheetError> {
        let path = path.as_ref().to_path_buf();
        let file = fs::File::open(&path).map_err(|e| CsvSheetError::Io {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Self::from_reader(path, file)
    }

    /// Load a tab from any reader; `path` is where [`save`][Self::save] writes.
    pub fn from_reader<R: Read>(
        path: impl Into<PathBuf>,
        mut reader: R,
    ) -> Result<Self, CsvSheetError> {
        let path = path.into();
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).map_err(|e| CsvSheetError::Io {
            path: path.clone(),
            message: e.to_string(),
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes.as_slice());

        let mut rows: Vec<Vec<String>> = Vec::new();
        let mut record = csv::StringRecord::new();
        loop {
            // Where the previous record ended; blank lines sit between here
            // and the next record.
            let start = rdr.position().byte() as usize;
            let more = rdr.read_record(&mut record).map_err(|e| CsvSheetError::Csv {
                path: path.clone(),
                message: e.to_string(),
            })?;
            if !more {
                break;
            }
            for _ in 0..blank_lines_at(&bytes, start) {
                rows.push(Vec::new());
            }
            rows.push(record.iter().map(str::to_string).collect());
        }

        tracing::debug!(path = %path.display(), rows = rows.len(), "worksheet loaded");
        Ok(Self {
            path,
            sheet: MemorySheet::from_rows(rows),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows(&self) -> &[Vec<String>] {
        self.sheet.rows()
    }

    /// Number of cell writes since the tab was loaded.
    pub fn writes(&self) -> usize {
        self.sheet.writes()
    }

    pub fn is_dirty(&self) -> bool {
        self.sheet.writes() > 0
    }

    /// Rewrite the file with the current contents.
    pub fn save(&self) -> Result<(), CsvSheetError> {
        let csv_err = |message: String| CsvSheetError::Csv {
            path: self.path.clone(),
            message,
        };

        let mut wtr = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());
        for row in self.sheet.rows() {
            // An empty record would come out as a blank line, which the reader skips.
            if row.is_empty() {
                wtr.write_record([""]).map_err(|e| csv_err(e.to_string()))?;
            } else {
                wtr.write_record(row).map_err(|e| csv_err(e.to_string()))?;
            }
        }
        let bytes = wtr.into_inner().map_err(|e| csv_err(e.to_string()))?;

        fs::write(&self.path, bytes).map_err(|e| CsvSheetError::Io {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        tracing::debug!(
            path = %self.path.display(),
            rows = self.sheet.rows().len(),
            "worksheet saved"
        );
        Ok(())
    }
}

/// Count the empty lines the CSV reader skips from `start`. CR, LF and CRLF
/// each end one line.
fn blank_lines_at(bytes: &[u8], start: usize) -> usize {
    let mut i = start;
    // LF completing the previous record's CRLF.
    if i > 0 && bytes.get(i - 1) == Some(&b'\r') && bytes.get(i) == Some(&b'\n') {
        i += 1;
    }
    let mut blanks = 0;
    while let Some(&b) = bytes.get(i) {
        match b {
            b'\r' => {
                blanks += 1;
                i += 1;
                if bytes.get(i) == Some(&b'\n') {
                    i += 1;
                }
            }
            b'\n' => {
                blanks += 1;
                i += 1;
            }
            _ => break,
        }
    }
    blanks
}

impl RowSource for CsvWorksheet {
    fn all_values(&self) -> Result<Vec<Vec<String>>, SheetError> {
        self.sheet.all_values()
    }

    fn cell(&self, row: usize, col: usize) -> Result<String, SheetError> {
        self.sheet.cell(row, col)
    }

    fn update_cell(&mut self, row: usize, col: usize, value: &str) -> Result<(), SheetError> {
        self.sheet.update_cell(row, col, value)
    }

    fn row_count(&self) -> Result<usize, SheetError> {
        Ok(self.sheet.rows().len())
    }
}
