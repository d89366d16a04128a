//! The live record-keeping session.
//!
//! `RecordSession` owns today's `Observation`, the water-intake range
//! control, and a shared vitals evaluator. Every successful field update
//! re-runs the evaluator exactly once; a failed update leaves the
//! observation untouched.
//!
//! All operations are synchronous and take `&mut self`. Hosts that reach the
//! session from several threads must wrap it in their own mutex or actor.

use crate::alert::thresholds::{ThresholdEvaluator, vitals_evaluator};
use crate::config::{AppConfig, DEFAULT_LOW_INTAKE_ML};
use crate::input::range::{DragEvent, RangeInputController, SliderState};
use crate::model::{
    ConfigurationError, MeasurementSide, Observation, Status, StatusLevel, ValidationError,
};
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

/// Editable fields of the current observation. `date` is the record's key
/// and is only changed by `roll_over`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Weight,
    Systolic,
    Diastolic,
    MeasurementSide,
    Edema,
    Hematuria,
    FoamyUrine,
    WaterIntake,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::Weight => "weight",
            Field::Systolic => "systolic",
            Field::Diastolic => "diastolic",
            Field::MeasurementSide => "measurementSide",
            Field::Edema => "edemaPresent",
            Field::Hematuria => "hematuriaPresent",
            Field::FoamyUrine => "foamyUrinePresent",
            Field::WaterIntake => "waterIntakeMl",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = ValidationError;

    /// Accepts the observation's field names as the form controls send them.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weight" => Ok(Field::Weight),
            "systolic" => Ok(Field::Systolic),
            "diastolic" => Ok(Field::Diastolic),
            "measurementSide" | "bpHand" => Ok(Field::MeasurementSide),
            "edemaPresent" | "edema" => Ok(Field::Edema),
            "hematuriaPresent" | "hematuria" => Ok(Field::Hematuria),
            "foamyUrinePresent" | "foamyUrine" => Ok(Field::FoamyUrine),
            "waterIntakeMl" | "waterIntake" => Ok(Field::WaterIntake),
            "date" => Err(ValidationError::ImmutableField("date")),
            other => Err(ValidationError::UnknownField(other.to_string())),
        }
    }
}

/// A value submitted for a field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Real(f64),
    Integer(i64),
    Flag(bool),
    Side(MeasurementSide),
}

/// Emitted when an update moves the status to a different level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub previous: StatusLevel,
    pub current: Status,
}

type StatusListener = Box<dyn FnMut(&StatusChange) + Send>;

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub struct RecordSession {
    current: Observation,
    history: Vec<Observation>,
    slider: RangeInputController,
    evaluator: Arc<ThresholdEvaluator<Observation>>,
    status: Status,
    low_intake_ml: u32,
    listeners: Vec<StatusListener>,
}

impl fmt::Debug for RecordSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordSession")
            .field("current", &self.current)
            .field("history", &self.history.len())
            .field("slider", &self.slider)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl RecordSession {
    /// Starts a session on `initial`. Its water intake must already fit the
    /// slider's range. The water reminder uses the default threshold until
    /// `with_low_intake` changes it.
    pub fn new(
        initial: Observation,
        slider: RangeInputController,
        evaluator: Arc<ThresholdEvaluator<Observation>>,
    ) -> Result<Self, ValidationError> {
        validate_water(initial.water_intake_ml.into(), slider.config().max_range())?;
        let status = evaluator.evaluate(&initial);
        Ok(Self {
            current: initial,
            history: Vec::new(),
            slider,
            evaluator,
            status,
            low_intake_ml: DEFAULT_LOW_INTAKE_ML,
            listeners: Vec::new(),
        })
    }

    /// Builds a session for `date` from configuration, starting from default
    /// vitals.
    pub fn from_config(config: &AppConfig, date: NaiveDate) -> Result<Self, ConfigurationError> {
        let slider = RangeInputController::new(config.slider.range_config()?);
        let evaluator = Arc::new(vitals_evaluator(&config.vitals));
        let initial = Observation::with_defaults(date);
        let status = evaluator.evaluate(&initial);
        Ok(Self {
            current: initial,
            history: Vec::new(),
            slider,
            evaluator,
            status,
            low_intake_ml: config.slider.low_intake_ml,
            listeners: Vec::new(),
        })
    }

    /// Sets the intake below which `needs_more_water` reports true.
    pub fn with_low_intake(mut self, low_intake_ml: u32) -> Self {
        self.low_intake_ml = low_intake_ml;
        self
    }

    pub fn observation(&self) -> &Observation {
        &self.current
    }

    /// Archived observations, oldest first.
    pub fn history(&self) -> &[Observation] {
        &self.history
    }

    pub fn evaluator(&self) -> &Arc<ThresholdEvaluator<Observation>> {
        &self.evaluator
    }

    /// The status computed after the last mutation.
    pub fn current_status(&self) -> &Status {
        &self.status
    }

    pub fn slider_state(&self) -> SliderState {
        self.slider.state_for(self.current.water_intake_ml)
    }

    /// Registers a listener called whenever the status level changes.
    pub fn on_status_change(&mut self, listener: impl FnMut(&StatusChange) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Validates `value` for `field` and, on success, writes it and
    /// re-evaluates. Returns the status change if the level moved.
    pub fn update_field(
        &mut self,
        field: Field,
        value: FieldValue,
    ) -> Result<Option<StatusChange>, ValidationError> {
        let max_water = self.slider.config().max_range();
        let mut next = self.current.clone();

        match (field, value) {
            (Field::Weight, FieldValue::Real(kg)) => next.weight_kg = validate_weight(kg)?,
            (Field::Weight, FieldValue::Integer(kg)) => next.weight_kg = validate_weight(kg as f64)?,
            (Field::Systolic, FieldValue::Integer(mmhg)) => {
                next.systolic = validate_pressure("systolic", mmhg)?
            }
            (Field::Diastolic, FieldValue::Integer(mmhg)) => {
                next.diastolic = validate_pressure("diastolic", mmhg)?
            }
            (Field::MeasurementSide, FieldValue::Side(side)) => next.measurement_side = side,
            (Field::Edema, FieldValue::Flag(flag)) => next.edema_present = flag,
            (Field::Hematuria, FieldValue::Flag(flag)) => next.hematuria_present = flag,
            (Field::FoamyUrine, FieldValue::Flag(flag)) => next.foamy_urine_present = flag,
            (Field::WaterIntake, FieldValue::Integer(ml)) => {
                next.water_intake_ml = validate_water(ml, max_water)?
            }
            (field, _) => {
                return Err(ValidationError::TypeMismatch {
                    field: field.name(),
                });
            }
        }

        debug!(field = field.name(), ?value, "field updated");
        self.current = next;
        Ok(self.reevaluate())
    }

    /// Feeds a drag gesture to the range control and writes the resulting
    /// value to `waterIntakeMl`. Stray moves with no drag are ignored.
    pub fn on_drag(&mut self, event: DragEvent) -> Result<Option<StatusChange>, ValidationError> {
        match self.slider.handle(event) {
            Some(changed) => self.update_field(Field::WaterIntake, FieldValue::Integer(changed.value.into())),
            None => Ok(None),
        }
    }

    /// Adds a fixed amount of water, saturating at the slider maximum.
    pub fn add_water(&mut self, amount_ml: u32) -> Result<Option<StatusChange>, ValidationError> {
        let max = self.slider.config().max_range();
        let total = self.current.water_intake_ml.saturating_add(amount_ml).min(max);
        self.update_field(Field::WaterIntake, FieldValue::Integer(total.into()))
    }

    /// True while today's intake is below the reminder threshold.
    pub fn needs_more_water(&self) -> bool {
        self.current.water_intake_ml < self.low_intake_ml
    }

    /// Archives the current observation and starts `next_date` from it.
    ///
    /// When to roll over is the host's decision. Dates must strictly
    /// increase so history stays ordered and keyed by date.
    pub fn roll_over(&mut self, next_date: NaiveDate) -> Result<Option<StatusChange>, ValidationError> {
        if next_date <= self.current.date {
            return Err(ValidationError::DateNotAfter {
                current: self.current.date,
                next: next_date,
            });
        }
        let next = self.current.carried_over(next_date);
        let archived = std::mem::replace(&mut self.current, next);
        info!(date = %archived.date, "archived observation");
        self.history.push(archived);
        Ok(self.reevaluate())
    }

    fn reevaluate(&mut self) -> Option<StatusChange> {
        let previous = self.status.level;
        self.status = self.evaluator.evaluate(&self.current);
        if self.status.level == previous {
            return None;
        }

        info!(from = %previous, to = %self.status.level, "status changed");
        let change = StatusChange {
            previous,
            current: self.status.clone(),
        };
        for listener in &mut self.listeners {
            listener(&change);
        }
        Some(change)
    }
}

// ---------------------------------------------------------------------------
// Field domains
// ---------------------------------------------------------------------------

fn validate_weight(kg: f64) -> Result<f64, ValidationError> {
    if kg.is_finite() && kg > 0.0 {
        Ok(kg)
    } else {
        Err(ValidationError::NotPositive { field: "weight" })
    }
}

fn validate_pressure(field: &'static str, mmhg: i64) -> Result<u32, ValidationError> {
    if mmhg <= 0 {
        return Err(ValidationError::NotPositive { field });
    }
    u32::try_from(mmhg).map_err(|_| ValidationError::OutOfRange {
        field,
        value: mmhg,
        min: 1,
        max: u32::MAX.into(),
    })
}

fn validate_water(ml: i64, max: u32) -> Result<u32, ValidationError> {
    if ml < 0 || ml > i64::from(max) {
        return Err(ValidationError::OutOfRange {
            field: "waterIntakeMl",
            value: ml,
            min: 0,
            max: max.into(),
        });
    }
    Ok(ml as u32)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
