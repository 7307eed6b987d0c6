//! The assembled analysis table.

use std::collections::HashMap;

use super::columns::COLUMN_ORDER;

/// Finished per-artist analysis: ordered display columns plus rows keyed
/// by display name. Built fresh per request and handed to the delivery
/// layer for rendering; never persisted.
#[derive(Debug, Clone)]
pub struct AnalysisTable {
    pub columns: Vec<String>,
    pub rows: Vec<HashMap<String, String>>,
}

impl AnalysisTable {
    /// A table with the fixed column set and no rows.
    pub fn empty() -> Self {
        Self {
            columns: COLUMN_ORDER.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Render as CSV with a header row, in column order. Cells missing
    /// from a row render empty.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();

        let header: Vec<String> = self.columns.iter().map(|c| csv_escape(c)).collect();
        out.push_str(&header.join(","));
        out.push('\n');

        for row in &self.rows {
            let cells: Vec<String> = self
                .columns
                .iter()
                .map(|column| csv_escape(row.get(column).map(String::as_str).unwrap_or("")))
                .collect();
            out.push_str(&cells.join(","));
            out.push('\n');
        }

        out
    }
}

fn csv_escape(cell: &str) -> String {
    if cell.contains(',') || cell.contains('"') || cell.contains('\n') {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
