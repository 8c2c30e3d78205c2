//! Quotes CSV input and results CSV output

use std::io;
use std::path::Path;

use crate::batch::{ClassificationRecord, TextRecord};
use crate::config::ColumnNames;
use crate::errors::{Result, SentimentError};

/// Read `(id, text)` pairs from the quotes file.
///
/// Missing file or missing columns are fatal. Malformed rows are skipped with
/// a warning.
pub fn load_records(path: &Path, columns: &ColumnNames) -> Result<Vec<TextRecord>> {
    let file = std::fs::File::open(path).map_err(|e| {
        SentimentError::input_with_source(format!("failed to open {}", path.display()), e)
    })?;
    let records = read_records(file, columns)?;
    tracing::info!(path = %path.display(), records = records.len(), "Loaded quotes");
    Ok(records)
}

pub fn read_records(reader: impl io::Read, columns: &ColumnNames) -> Result<Vec<TextRecord>> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader
        .headers()
        .map_err(|e| SentimentError::input_with_source("failed to read CSV header", e))?
        .clone();

    let position = |name: &str| headers.iter().position(|h| h.trim() == name);
    let (id_idx, text_idx) = match (position(&columns.id), position(&columns.text)) {
        (Some(id), Some(text)) => (id, text),
        (id, text) => {
            let missing: Vec<&str> = [(id, columns.id.as_str()), (text, columns.text.as_str())]
                .into_iter()
                .filter(|(idx, _)| idx.is_none())
                .map(|(_, name)| name)
                .collect();
            return Err(SentimentError::input(format!(
                "CSV must contain '{}' and '{}' columns (missing: {})",
                columns.id,
                columns.text,
                missing.join(", ")
            )));
        }
    };

    let mut records = Vec::new();
    for row in reader.records() {
        let row = match row {
            Ok(row) => row,
            Err(err) if is_bad_row(&err) => {
                tracing::warn!(error = %err, "Skipping malformed CSV row");
                continue;
            }
            Err(err) => {
                return Err(SentimentError::input_with_source("failed to read CSV row", err));
            }
        };
        let id = row.get(id_idx).unwrap_or_default().to_string();
        let text = row.get(text_idx).unwrap_or_default().to_string();
        if text.trim().is_empty() {
            tracing::warn!(record_id = %id, "Empty text, classifying anyway");
        }
        records.push(TextRecord { id, text });
    }
    Ok(records)
}

fn is_bad_row(err: &csv::Error) -> bool {
    matches!(
        err.kind(),
        csv::ErrorKind::UnequalLengths { .. } | csv::ErrorKind::Utf8 { .. }
    )
}

/// Write one `(id, score)` row per result; absent scores are empty
/// cells.
pub fn write_results(path: &Path, id_column: &str, results: &[ClassificationRecord]) -> Result<()> {
    let output_error =
        |e: csv::Error| SentimentError::output_with_source(format!("failed to write {}", path.display()), e);
    let writer = csv::Writer::from_path(path).map_err(output_error)?;
    write_results_to(writer, id_column, results).map_err(output_error)?;
    tracing::info!(path = %path.display(), rows = results.len(), "Saved results");
    Ok(())
}

fn write_results_to<W: io::Write>(
    mut writer: csv::Writer<W>,
    id_column: &str,
    results: &[ClassificationRecord],
) -> std::result::Result<(), csv::Error> {
    writer.write_record([id_column, "score"])?;
    for result in results {
        let score = result.score.map(|s| s.to_string()).unwrap_or_default();
        writer.write_record([result.id.as_str(), score.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}
