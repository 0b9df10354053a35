use serde::Serialize;

use crate::csv_table::CsvTable;
use crate::entity::upload;

/// Rows shown on `/view_file/{id}`.
pub const PREVIEW_ROWS: usize = 10;

/// One entry of the `/preview_data` list.
#[derive(Debug, Serialize)]
pub struct UploadListItem {
    pub id: i32,
    pub filename: String,
    pub uploaded_at: String,
}

impl From<upload::Model> for UploadListItem {
    fn from(upload: upload::Model) -> Self {
        Self {
            id: upload.id,
            filename: upload.filename,
            uploaded_at: upload.uploaded_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        }
    }
}

/// The head of a parsed file, ready for the `data-table` template.
#[derive(Debug, Serialize)]
pub struct TablePreview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub shown: usize,
    pub total: usize,
}

impl TablePreview {
    pub fn from_table(table: &CsvTable, limit: usize) -> Self {
        let rows = table.head(limit).to_vec();
        Self {
            columns: table.columns.clone(),
            shown: rows.len(),
            total: table.row_count(),
            rows,
        }
    }
}
