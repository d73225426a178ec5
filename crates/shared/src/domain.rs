use chrono::{DateTime, NaiveDateTime};
use serde::Serialize;
use thiserror::Error;

pub const MEASUREMENT_MIN: f64 = 0.0;
pub const MEASUREMENT_MAX: f64 = 10.0;
/// Inputs are quantized to tenths of a centimetre.
const MEASUREMENT_STEPS_PER_CM: f64 = 10.0;

pub const HISTORY_LIMIT_MIN: u32 = 1;
pub const HISTORY_LIMIT_MAX: u32 = 50;
pub const HISTORY_DEFAULT_LIMIT: u32 = 10;
pub const HISTORY_OFFSET_STEP: u32 = 10;

pub const DISPLAY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const NAIVE_TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
    #[error("{field} must be between 0.0 and 10.0, got {value}")]
    MeasurementOutOfRange { field: &'static str, value: f64 },
    #[error("limit must be between 1 and 50, got {0}")]
    LimitOutOfRange(u32),
}

/// The four flower-part dimensions submitted for classification, in cm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measurement {
    sepal_length: f64,
    sepal_width: f64,
    petal_length: f64,
    petal_width: f64,
}

impl Measurement {
    pub fn new(
        sepal_length: f64,
        sepal_width: f64,
        petal_length: f64,
        petal_width: f64,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            sepal_length: checked_dimension("sepal_length", sepal_length)?,
            sepal_width: checked_dimension("sepal_width", sepal_width)?,
            petal_length: checked_dimension("petal_length", petal_length)?,
            petal_width: checked_dimension("petal_width", petal_width)?,
        })
    }

    pub fn sepal_length(&self) -> f64 {
        self.sepal_length
    }

    pub fn sepal_width(&self) -> f64 {
        self.sepal_width
    }

    pub fn petal_length(&self) -> f64 {
        self.petal_length
    }

    pub fn petal_width(&self) -> f64 {
        self.petal_width
    }
}

impl Default for Measurement {
    fn default() -> Self {
        Self {
            sepal_length: 5.4,
            sepal_width: 3.4,
            petal_length: 1.3,
            petal_width: 0.2,
        }
    }
}

fn checked_dimension(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { field });
    }
    if !(MEASUREMENT_MIN..=MEASUREMENT_MAX).contains(&value) {
        return Err(ValidationError::MeasurementOutOfRange { field, value });
    }
    Ok((value * MEASUREMENT_STEPS_PER_CM).round() / MEASUREMENT_STEPS_PER_CM)
}

/// One page of the prediction history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HistoryQuery {
    limit: u32,
    offset: u32,
}

impl HistoryQuery {
    pub fn new(limit: u32, offset: u32) -> Result<Self, ValidationError> {
        if !(HISTORY_LIMIT_MIN..=HISTORY_LIMIT_MAX).contains(&limit) {
            return Err(ValidationError::LimitOutOfRange(limit));
        }
        Ok(Self { limit, offset })
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn next_page(self) -> Self {
        Self {
            offset: self.offset.saturating_add(HISTORY_OFFSET_STEP),
            ..self
        }
    }

    pub fn previous_page(self) -> Self {
        Self {
            offset: self.offset.saturating_sub(HISTORY_OFFSET_STEP),
            ..self
        }
    }
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            limit: HISTORY_DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// Formats a server timestamp as `YYYY-MM-DD HH:MM:SS`, keeping the wall-clock
/// time of whatever offset the server used. Unrecognized input is returned as-is.
pub fn display_timestamp(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|ts| ts.format(DISPLAY_TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_local());
    }
    if let Ok(ts) = DateTime::parse_from_rfc2822(raw) {
        return Some(ts.naive_local());
    }
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}

/// Species names arrive lowercase; the UI shows them capitalized.
pub fn capitalize_species(species: &str) -> String {
    let mut chars = species.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
