//! Bounded range control with snap-to-grid values.
//!
//! Converts a pointer position along a track (as a ratio in `[0, 1]`) into
//! an integer snapped to the nearest multiple of `step`, and tracks the drag
//! lifecycle: `begin` → any number of `update` → `end`.
//!
//! Stray `update`/`end` calls with no drag in progress are ignored. This
//! mirrors pointer capture, where move events can arrive before a press.

use crate::model::ConfigurationError;
use std::fmt;
use tracing::trace;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Validated track configuration. `goal_marker` is informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeConfig {
    max_range: u32,
    step: u32,
    goal_marker: u32,
}

impl RangeConfig {
    /// Fails with `ConfigurationError` if `max_range` or `step` is not
    /// positive, or if the goal lies outside `[0, max_range]`.
    pub fn new(max_range: i64, step: i64, goal_marker: i64) -> Result<Self, ConfigurationError> {
        if max_range <= 0 {
            return Err(ConfigurationError::NonPositiveRange(max_range));
        }
        if step <= 0 {
            return Err(ConfigurationError::NonPositiveStep(step));
        }
        if goal_marker < 0 || goal_marker > max_range {
            return Err(ConfigurationError::GoalOutOfRange {
                goal: goal_marker,
                max: max_range,
            });
        }
        let max = u32::try_from(max_range).map_err(|_| ConfigurationError::RangeTooLarge(max_range))?;
        let step = u32::try_from(step).map_err(|_| ConfigurationError::StepTooLarge(step))?;

        Ok(Self {
            max_range: max,
            step,
            // goal <= max_range, so it fits once max does
            goal_marker: goal_marker as u32,
        })
    }

    pub fn max_range(&self) -> u32 {
        self.max_range
    }

    pub fn step(&self) -> u32 {
        self.step
    }

    pub fn goal_marker(&self) -> u32 {
        self.goal_marker
    }

    /// Maps a track ratio to a snapped value in `[0, max_range]`.
    ///
    /// The ratio is clamped to `[0, 1]` first (NaN counts as 0). Rounding to
    /// the step can overshoot `max_range` when the step does not divide it,
    /// so the snapped result is clamped again.
    pub fn value_from_ratio(&self, ratio: f64) -> u32 {
        let clamped = if ratio.is_nan() { 0.0 } else { ratio.clamp(0.0, 1.0) };
        let max = f64::from(self.max_range);
        let step = f64::from(self.step);
        let raw = clamped * max;
        let snapped = (raw / step).round() * step;
        snapped.clamp(0.0, max) as u32
    }
}

// ---------------------------------------------------------------------------
// Events and state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Begin,
    Update,
    End,
}

/// Emitted on every `begin`/`update`, and once on `end` with the committed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueChanged {
    pub value: u32,
    pub phase: DragPhase,
}

/// A pointer gesture on the track, as delivered by any input source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragEvent {
    Begin(f64),
    Update(f64),
    End,
}

/// Render-time view of the control. Rebuilt from the stored value each time;
/// never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliderState {
    pub is_dragging: bool,
    pub current_value: u32,
    pub min: u32,
    pub max: u32,
    pub step: u32,
    pub goal: u32,
}

impl SliderState {
    /// Fraction of the track that is filled, capped at 1.0.
    pub fn fill_ratio(&self) -> f64 {
        (f64::from(self.current_value) / f64::from(self.max)).min(1.0)
    }

    /// Where the goal marker sits along the track.
    pub fn goal_ratio(&self) -> f64 {
        f64::from(self.goal) / f64::from(self.max)
    }

    pub fn goal_reached(&self) -> bool {
        self.current_value >= self.goal
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

type ChangeListener = Box<dyn FnMut(&ValueChanged) + Send>;

pub struct RangeInputController {
    config: RangeConfig,
    dragging: bool,
    last_value: Option<u32>,
    listeners: Vec<ChangeListener>,
}

impl fmt::Debug for RangeInputController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RangeInputController")
            .field("config", &self.config)
            .field("dragging", &self.dragging)
            .field("last_value", &self.last_value)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl RangeInputController {
    pub fn new(config: RangeConfig) -> Self {
        Self {
            config,
            dragging: false,
            last_value: None,
            listeners: Vec::new(),
        }
    }

    /// Shorthand for `RangeConfig::new` followed by `new`.
    pub fn with_range(max_range: i64, step: i64, goal_marker: i64) -> Result<Self, ConfigurationError> {
        Ok(Self::new(RangeConfig::new(max_range, step, goal_marker)?))
    }

    pub fn config(&self) -> &RangeConfig {
        &self.config
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Registers a listener called for every emitted `ValueChanged`.
    pub fn on_change(&mut self, listener: impl FnMut(&ValueChanged) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn value_from_ratio(&self, ratio: f64) -> u32 {
        self.config.value_from_ratio(ratio)
    }

    /// Starts a drag and emits the value under the pointer.
    /// A `begin` during an active drag restarts it.
    pub fn begin(&mut self, ratio: f64) -> ValueChanged {
        self.dragging = true;
        self.emit(ratio, DragPhase::Begin)
    }

    /// Moves an active drag. Returns `None` when no drag is in progress.
    pub fn update(&mut self, ratio: f64) -> Option<ValueChanged> {
        if !self.dragging {
            trace!(ratio, "ignoring update with no active drag");
            return None;
        }
        Some(self.emit(ratio, DragPhase::Update))
    }

    /// Ends the drag and re-emits the last value as committed.
    /// Idempotent: a second `end` returns `None` and emits nothing.
    pub fn end(&mut self) -> Option<ValueChanged> {
        if !self.dragging {
            return None;
        }
        self.dragging = false;
        let value = self.last_value?;
        let event = ValueChanged {
            value,
            phase: DragPhase::End,
        };
        self.notify(&event);
        Some(event)
    }

    /// Dispatches a gesture to `begin`/`update`/`end`.
    pub fn handle(&mut self, event: DragEvent) -> Option<ValueChanged> {
        match event {
            DragEvent::Begin(ratio) => Some(self.begin(ratio)),
            DragEvent::Update(ratio) => self.update(ratio),
            DragEvent::End => self.end(),
        }
    }

    /// Builds the render state for a stored value, clamped into range.
    pub fn state_for(&self, value: u32) -> SliderState {
        SliderState {
            is_dragging: self.dragging,
            current_value: value.min(self.config.max_range),
            min: 0,
            max: self.config.max_range,
            step: self.config.step,
            goal: self.config.goal_marker,
        }
    }

    fn emit(&mut self, ratio: f64, phase: DragPhase) -> ValueChanged {
        let value = self.config.value_from_ratio(ratio);
        self.last_value = Some(value);
        let event = ValueChanged { value, phase };
        self.notify(&event);
        event
    }

    fn notify(&mut self, event: &ValueChanged) {
        for listener in &mut self.listeners {
            listener(event);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
