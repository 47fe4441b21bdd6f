//! CSV ingest for series files.
//!
//! One file per series, named `<id>.csv`, with a `date,value` header. Rows with
//! missing-value markers (`.`, blank, `NA`, `NaN`, anything non-numeric) are
//! skipped silently; rows that cannot be read at all are reported as row errors.
//! No sorting or de-duplication happens here; that is the engine's job.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::data::fred::parse_value;
use crate::domain::TimePoint;
use crate::error::AppError;
use crate::orchestrator::{SeriesInput, SeriesInputs};

/// A row that could not be turned into a point.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct IngestedSeries {
    pub points: Vec<TimePoint>,
    pub rows_read: usize,
    /// Rows carrying a missing-value marker.
    pub rows_missing: usize,
    pub row_errors: Vec<RowError>,
}

/// Path of the CSV file for `id` inside `dir`.
pub fn series_path(dir: &Path, id: &str) -> PathBuf {
    dir.join(format!("{id}.csv"))
}

/// Read a `date,value` CSV file.
pub fn read_series_csv(path: &Path) -> Result<IngestedSeries, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers in '{}': {e}", path.display())))?
        .clone();
    let header_map = build_header_map(&headers);

    let date_idx = *header_map
        .get("date")
        .ok_or_else(|| AppError::new(2, format!("Missing required column `date` in '{}'", path.display())))?;
    let value_idx = *header_map
        .get("value")
        .ok_or_else(|| AppError::new(2, format!("Missing required column `value` in '{}'", path.display())))?;

    let mut points = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;
    let mut rows_missing = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, date_idx, value_idx) {
            Ok(Some(point)) => points.push(point),
            Ok(None) => rows_missing += 1,
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    debug!(
        path = %path.display(),
        rows_read,
        kept = points.len(),
        missing = rows_missing,
        errors = row_errors.len(),
        "series csv read"
    );

    Ok(IngestedSeries {
        points,
        rows_read,
        rows_missing,
        row_errors,
    })
}

/// Load every dataset declared in `config` from `dir`.
///
/// A missing file is not an error: the series is supplied empty and the engine
/// reports it as unavailable.
pub fn load_series_dir(config: &EngineConfig, dir: &Path) -> Result<SeriesInputs, AppError> {
    if !dir.is_dir() {
        return Err(AppError::new(2, format!("Data directory '{}' does not exist.", dir.display())));
    }

    let mut inputs = SeriesInputs::new();
    for descriptor in &config.datasets {
        let path = series_path(dir, &descriptor.id);
        let points = if path.exists() {
            let ingested = read_series_csv(&path)?;
            for err in &ingested.row_errors {
                warn!(series = %descriptor.id, line = err.line, "{}", err.message);
            }
            ingested.points
        } else {
            warn!(series = %descriptor.id, path = %path.display(), "series file not found");
            Vec::new()
        };
        inputs.insert(descriptor.id.clone(), SeriesInput::new(descriptor.clone(), points));
    }
    Ok(inputs)
}

fn parse_row(record: &StringRecord, date_idx: usize, value_idx: usize) -> Result<Option<TimePoint>, String> {
    let raw_date = record.get(date_idx).unwrap_or("");
    let date = parse_date(raw_date)?;
    let Some(value) = parse_value(record.get(value_idx).unwrap_or("")) else {
        return Ok(None);
    };
    Ok(Some(TimePoint::new(date, value)))
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| format!("Invalid date `{raw}` (expected YYYY-MM-DD)."))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports may prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}
