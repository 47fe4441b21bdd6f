//! Write run results and fetched series to disk.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{RegimeSignalsResponse, TimePoint};
use crate::error::AppError;

/// Write the full response as pretty JSON.
pub fn write_response_json(path: &Path, response: &RegimeSignalsResponse) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, response)
        .map_err(|e| AppError::new(2, format!("Failed to write export JSON: {e}")))?;
    Ok(())
}

/// Write a series as a `date,value` CSV readable by `read_series_csv`.
pub fn write_series_csv(path: &Path, points: &[TimePoint]) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create series CSV '{}': {e}", path.display())))?;

    writeln!(file, "date,value").map_err(|e| AppError::new(2, format!("Failed to write series CSV header: {e}")))?;
    for p in points {
        writeln!(file, "{},{}", p.date, p.value)
            .map_err(|e| AppError::new(2, format!("Failed to write series CSV row: {e}")))?;
    }
    Ok(())
}
