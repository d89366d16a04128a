//! Core data types for the kidney compass tracker.
//!
//! This module defines the shared domain model imported by all other modules:
//! the daily observation, status levels, classification records exchanged
//! with the backend, and the error taxonomy. It contains no I/O.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Status levels
// ---------------------------------------------------------------------------

/// Alert severity, in ascending order: `Green < Yellow < Red`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Green,
    Yellow,
    Red,
}

impl fmt::Display for StatusLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusLevel::Green => write!(f, "green"),
            StatusLevel::Yellow => write!(f, "yellow"),
            StatusLevel::Red => write!(f, "red"),
        }
    }
}

/// A derived status: the level plus the message of the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub level: StatusLevel,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Observation
// ---------------------------------------------------------------------------

/// Which arm the blood pressure was taken on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementSide {
    Left,
    Right,
}

/// One day's recorded vitals and intake.
///
/// Serialized with the field names the backend's `daily_records` use, so a
/// history exported from here can be posted as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    #[serde(rename = "weight")]
    pub weight_kg: f64,
    pub systolic: u32,
    pub diastolic: u32,
    #[serde(rename = "bpHand")]
    pub measurement_side: MeasurementSide,
    #[serde(rename = "edema")]
    pub edema_present: bool,
    #[serde(rename = "hematuria")]
    pub hematuria_present: bool,
    #[serde(rename = "foamyUrine")]
    pub foamy_urine_present: bool,
    #[serde(rename = "waterIntake")]
    pub water_intake_ml: u32,
}

impl Observation {
    /// A fresh observation for `date` with the starting values a new user
    /// sees before their first check-in.
    pub fn with_defaults(date: NaiveDate) -> Self {
        Self {
            date,
            weight_kg: 72.5,
            systolic: 122,
            diastolic: 78,
            measurement_side: MeasurementSide::Left,
            edema_present: false,
            hematuria_present: false,
            foamy_urine_present: false,
            water_intake_ml: 0,
        }
    }

    /// The next day's observation, carrying over weight, pressure and arm.
    /// Symptom flags and water intake start from zero.
    pub fn carried_over(&self, date: NaiveDate) -> Self {
        Self {
            date,
            weight_kg: self.weight_kg,
            systolic: self.systolic,
            diastolic: self.diastolic,
            measurement_side: self.measurement_side,
            edema_present: false,
            hematuria_present: false,
            foamy_urine_present: false,
            water_intake_ml: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Threshold types
// ---------------------------------------------------------------------------

/// Blood pressure cut-offs for the vitals banner, in mmHg.
///
/// A reading at or above either red value is RED; otherwise at or above
/// either yellow value is YELLOW.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VitalsThresholds {
    pub red_systolic: u32,
    pub red_diastolic: u32,
    pub yellow_systolic: u32,
    pub yellow_diastolic: u32,
}

impl Default for VitalsThresholds {
    fn default() -> Self {
        Self {
            red_systolic: 140,
            red_diastolic: 90,
            yellow_systolic: 130,
            yellow_diastolic: 80,
        }
    }
}

// ---------------------------------------------------------------------------
// Classification types (backend contract)
// ---------------------------------------------------------------------------

/// What kind of item a classification query is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Food,
    Activity,
    Medicine,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Food => write!(f, "food"),
            ItemKind::Activity => write!(f, "activity"),
            ItemKind::Medicine => write!(f, "medicine"),
        }
    }
}

/// Risk classification of a food, activity or medicine.
/// Body of `POST /api/classify`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub name: String,
    pub level: StatusLevel,
    pub reason: String,
    pub advice: String,
}

/// One entry of `GET /api/food-whitelist`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhitelistEntry {
    pub category: String,
    pub name: String,
    #[serde(default)]
    pub note: String,
}

/// One entry of `GET /api/food-blacklist`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlacklistEntry {
    pub name: String,
    pub reason: String,
    pub level: StatusLevel,
}

/// A kidney-friendly recipe from `POST /api/recipe`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub dish_name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub nutrition_benefit: String,
}

// ---------------------------------------------------------------------------
// Analysis types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Stable,
    Declining,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthAnalysis {
    pub summary: String,
    pub trend: Trend,
    pub actionable_advice: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Stable,
    Warning,
    Critical,
}

/// Lab indicators read off a medical report, kept as the strings printed on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportIndicators {
    pub creatinine: String,
    pub egfr: String,
    pub uric_acid: String,
    pub proteinuria: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportAnalysis {
    pub date: String,
    pub indicators: ReportIndicators,
    pub status: ReportStatus,
    pub tailored_strategy: String,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Invalid static configuration. Fatal at construction.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigurationError {
    #[error("range must be positive, got {0}")]
    NonPositiveRange(i64),
    #[error("step must be positive, got {0}")]
    NonPositiveStep(i64),
    #[error("range {0} does not fit in a u32")]
    RangeTooLarge(i64),
    #[error("step {0} does not fit in a u32")]
    StepTooLarge(i64),
    #[error("goal marker {goal} is outside [0, {max}]")]
    GoalOutOfRange { goal: i64, max: i64 },
    #[error("could not read config file {path}: {message}")]
    Io { path: String, message: String },
    #[error("could not parse config: {0}")]
    Parse(String),
    #[error("invalid value for {key}: {value}")]
    InvalidOverride { key: String, value: String },
}

/// A field update outside its declared domain. The observation is unchanged.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
    #[error("{field} must be a positive number")]
    NotPositive { field: &'static str },
    #[error("{field} does not accept that kind of value")]
    TypeMismatch { field: &'static str },
    #[error("unknown field: {0}")]
    UnknownField(String),
    #[error("{0} cannot be edited")]
    ImmutableField(&'static str),
    #[error("date {next} must be after the current date {current}")]
    DateNotAfter { current: NaiveDate, next: NaiveDate },
}

/// Network or API failure talking to the backend.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum TransportError {
    /// Non-2xx HTTP response.
    #[error("HTTP error: {0}")]
    Http(u16),
    /// The request could not be sent or timed out.
    #[error("Request failed: {0}")]
    Request(String),
    /// The response body could not be deserialized.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => TransportError::Http(status.as_u16()),
            None => TransportError::Request(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::Parse(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
