//! Data Tool
//!
//! Summaries and descriptive statistics over CSV data, read either from a
//! workspace file or from inline `temp_data` attached to the request.

use async_trait::async_trait;
use sdk::{EngineError, Parameters, Tool};
use serde_json::{json, Value};
use std::path::PathBuf;
use tokio::fs;
use tracing::info;

use crate::fs_guard::FileSystemGuard;

const PREVIEW_ROWS: usize = 5;

/// A parsed CSV document: header row plus records
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Parse CSV text. Quoted fields may contain commas, doubled quotes and
    /// line breaks. Blank lines are skipped.
    pub fn parse(text: &str) -> Result<Self, EngineError> {
        let mut records = parse_records(text)?.into_iter();
        let columns = records
            .next()
            .ok_or_else(|| EngineError::ToolError("CSV data is empty".to_string()))?;
        Ok(Self {
            columns,
            rows: records.collect(),
        })
    }

    /// Values of column `index` that parse as numbers, or `None` when any
    /// non-empty value is not numeric
    fn numeric_column(&self, index: usize) -> Option<Vec<f64>> {
        let mut values = Vec::new();
        for row in &self.rows {
            let cell = row.get(index).map(|c| c.trim()).unwrap_or("");
            if cell.is_empty() {
                continue;
            }
            values.push(cell.parse::<f64>().ok()?);
        }
        (!values.is_empty()).then_some(values)
    }

    /// Rows rendered as a padded text grid
    fn preview(&self, limit: usize) -> String {
        let shown: Vec<&Vec<String>> = self.rows.iter().take(limit).collect();
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        for row in &shown {
            for (i, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(cell.chars().count());
                }
            }
        }

        let render = |cells: &[String]| -> String {
            widths
                .iter()
                .enumerate()
                .map(|(i, w)| format!("{:<width$}", cells.get(i).map(String::as_str).unwrap_or(""), width = *w))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut lines = vec![render(&self.columns)];
        lines.extend(shown.iter().map(|row| render(row)));
        lines.join("\n")
    }

    pub fn summary(&self, label: &str) -> String {
        [
            format!("Summary of {}:", label),
            format!("Rows: {}", self.rows.len()),
            format!("Columns: {}", self.columns.join(", ")),
            String::new(),
            format!("First {} rows:", PREVIEW_ROWS.min(self.rows.len())),
            self.preview(PREVIEW_ROWS),
        ]
        .join("\n")
    }

    pub fn stats(&self, label: &str) -> String {
        let mut lines = vec![format!("Statistics for {}:", label)];

        for (i, column) in self.columns.iter().enumerate() {
            let Some(values) = self.numeric_column(i) else {
                continue;
            };
            let count = values.len();
            let mean = values.iter().sum::<f64>() / count as f64;
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            lines.push(format!(
                "{}: count={}, mean={}, min={}, max={}",
                column,
                count,
                round4(mean),
                round4(min),
                round4(max)
            ));
        }

        if lines.len() == 1 {
            lines.push("No numeric columns found".to_string());
        }
        lines.join("\n")
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

fn parse_records(text: &str) -> Result<Vec<Vec<String>>, EngineError> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                other => field.push(other),
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                if !(record.len() == 1 && record[0].is_empty()) {
                    records.push(std::mem::take(&mut record));
                } else {
                    record.clear();
                }
            }
            other => field.push(other),
        }
    }

    if in_quotes {
        return Err(EngineError::ToolError(
            "CSV data has an unterminated quoted field".to_string(),
        ));
    }

    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    Ok(records)
}

#[derive(Debug)]
pub struct DataTool {
    guard: FileSystemGuard,
}

impl DataTool {
    pub fn new(workspace: PathBuf) -> Result<Self, EngineError> {
        Ok(Self {
            guard: FileSystemGuard::new(workspace)?,
        })
    }

    /// Load the table and a label naming where it came from
    async fn load(&self, params: &Parameters) -> Result<(Table, String), EngineError> {
        if let Some(inline) = params.str_opt("temp_data").filter(|d| !d.trim().is_empty()) {
            return Ok((Table::parse(inline)?, "attached data".to_string()));
        }

        let path = params.str("path")?;
        let resolved = self.guard.resolve(path).map_err(|e| match e {
            EngineError::PathCanonicalization(..) => {
                EngineError::ToolError(format!("File '{}' not found", path))
            }
            other => other,
        })?;

        info!("Loading CSV: {}", resolved.display());
        let text = fs::read_to_string(&resolved).await?;
        Ok((Table::parse(&text)?, path.to_string()))
    }
}

#[async_trait]
impl Tool for DataTool {
    fn name(&self) -> &str {
        "data"
    }

    fn description(&self) -> &str {
        "Summaries and statistics for CSV data"
    }

    async fn execute(&self, params: &Parameters) -> Result<Value, EngineError> {
        let operation = params.str("operation")?;
        let (table, label) = match operation {
            "summarize_csv" | "stats" => self.load(params).await?,
            other => {
                return Err(EngineError::UnknownOperation(format!(
                    "data operation '{}'",
                    other
                )))
            }
        };

        let text = if operation == "stats" {
            table.stats(&label)
        } else {
            table.summary(&label)
        };
        Ok(json!(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SALES: &str = "region,units,price\nnorth,10,2.5\nsouth,30,3.5\n\"east, far\",20,\n";

    #[test]
    fn test_parse_quotes_and_blank_lines() {
        let table = Table::parse("a,b\r\n\"x \"\"y\"\"\",\"1\n2\"\n\n3,4").unwrap();
        assert_eq!(table.columns, vec!["a", "b"]);
        assert_eq!(table.rows[0], vec!["x \"y\"", "1\n2"]);
        assert_eq!(table.rows[1], vec!["3", "4"]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(Table::parse("").is_err());
        assert!(Table::parse("a,b\n\"open,1").is_err());
    }

    #[test]
    fn test_summary() {
        let table = Table::parse(SALES).unwrap();
        let summary = table.summary("sales.csv");
        assert!(summary.starts_with("Summary of sales.csv:\nRows: 3\nColumns: region, units, price"));
        assert!(summary.contains("east, far"));
    }

    #[test]
    fn test_stats_skip_text_columns() {
        let table = Table::parse(SALES).unwrap();
        let stats = table.stats("sales.csv");
        assert!(stats.contains("units: count=3, mean=20, min=10, max=30"));
        assert!(stats.contains("price: count=2, mean=3, min=2.5, max=3.5"));
        assert!(!stats.contains("region:"));
    }

    #[tokio::test]
    async fn test_inline_data_wins_over_path() {
        let temp = TempDir::new().unwrap();
        let tool = DataTool::new(temp.path().to_path_buf()).unwrap();
        let params = Parameters::new()
            .with("operation", "summarize_csv")
            .with("path", "missing.csv")
            .with("temp_data", "x,y\n1,2");

        let result = tool.execute(&params).await.unwrap();
        assert!(result.as_str().unwrap().starts_with("Summary of attached data:"));
    }

    #[tokio::test]
    async fn test_reads_workspace_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("sales.csv"), SALES).unwrap();
        let tool = DataTool::new(temp.path().to_path_buf()).unwrap();

        let params = Parameters::new()
            .with("operation", "stats")
            .with("path", "sales.csv");
        let result = tool.execute(&params).await.unwrap();
        assert!(result.as_str().unwrap().starts_with("Statistics for sales.csv:"));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let temp = TempDir::new().unwrap();
        let tool = DataTool::new(temp.path().to_path_buf()).unwrap();
        let params = Parameters::new()
            .with("operation", "summarize_csv")
            .with("path", "data.csv");

        let err = tool.execute(&params).await.unwrap_err();
        assert_eq!(err.to_string(), "Tool error: File 'data.csv' not found");
    }
}
