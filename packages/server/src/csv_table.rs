use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CsvError {
    #[error("No columns to parse from file")]
    Empty,

    #[error("Error tokenizing data. Expected {expected} fields in line {line}, saw {found}")]
    TooManyFields {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("{0}")]
    Parse(#[from] csv::Error),
}

/// A parsed CSV file: one header row plus records padded to its width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsvTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// Parse UTF-8 CSV bytes. The first record is the header. Shorter records
    /// are padded with blank cells; longer ones are an error.
    pub fn parse(bytes: &[u8]) -> Result<Self, CsvError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if columns.is_empty() {
            return Err(CsvError::Empty);
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.len() > columns.len() {
                return Err(CsvError::TooManyFields {
                    line: record.position().map_or(0, |p| p.line()),
                    expected: columns.len(),
                    found: record.len(),
                });
            }
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(columns.len(), String::new());
            rows.push(row);
        }

        Ok(Self { columns, rows })
    }

    /// The first `n` rows (or fewer).
    pub fn head(&self, n: usize) -> &[Vec<String>] {
        &self.rows[..self.rows.len().min(n)]
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}
