//! FRED API collaborator.
//!
//! Fetches raw observations for descriptors carrying a `fred_id`. This sits
//! outside the engine: the orchestrator only ever sees already-fetched points.

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use crate::domain::TimePoint;
use crate::error::AppError;

const BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
const OBS_LIMIT: usize = 100000;

pub struct FredClient {
    client: Client,
    api_key: String,
}

impl FredClient {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var("FRED_API_KEY")
            .map_err(|_| AppError::new(2, "Missing FRED_API_KEY in environment (.env)."))?;
        Ok(Self {
            client: Client::new(),
            api_key,
        })
    }

    /// Fetch all observations of `series_id` on or after `start`, ascending by date.
    ///
    /// Missing-value markers (`.`) and non-numeric values are dropped.
    pub fn fetch_series(&self, series_id: &str, start: Option<NaiveDate>) -> Result<Vec<TimePoint>, AppError> {
        let mut req = self.client.get(BASE_URL).query(&[
            ("series_id", series_id),
            ("api_key", &self.api_key),
            ("file_type", "json"),
            ("sort_order", "asc"),
            ("limit", &OBS_LIMIT.to_string()),
        ]);

        if let Some(date) = start {
            req = req.query(&[("observation_start", &date.to_string())]);
        }

        let resp = req
            .send()
            .map_err(|e| AppError::new(4, format!("FRED request for {series_id} failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("FRED request for {series_id} failed with status {}.", resp.status()),
            ));
        }

        let body: ObservationsResponse = resp
            .json()
            .map_err(|e| AppError::new(4, format!("Failed to parse FRED response for {series_id}: {e}")))?;

        let total = body.observations.len();
        let points = parse_observations(body.observations)?;
        debug!(series_id, total, kept = points.len(), "fred observations parsed");
        Ok(points)
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    value: String,
}

fn parse_observations(observations: Vec<Observation>) -> Result<Vec<TimePoint>, AppError> {
    let mut out = Vec::with_capacity(observations.len());
    for obs in observations {
        let Some(value) = parse_value(&obs.value) else {
            continue;
        };
        let date = NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d")
            .map_err(|e| AppError::new(4, format!("Invalid FRED date '{}': {e}", obs.date)))?;
        out.push(TimePoint::new(date, value));
    }
    out.sort_by_key(|p| p.date);
    Ok(out)
}

/// Parse a raw observation value, treating FRED's `.` marker and blanks as missing.
pub fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed == "." || trimmed.is_empty() {
        return None;
    }
    let v = trimmed.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
