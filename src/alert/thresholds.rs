//! Status threshold evaluation.
//!
//! A `ThresholdEvaluator` holds an ordered list of rules and returns the
//! status of the first rule whose predicate matches. Authoring order is the
//! priority order: the evaluator never re-sorts by severity. When nothing
//! matches it falls back to GREEN with the evaluator's fallback message.
//!
//! The same evaluator type drives both the vitals banner and the risk label
//! shown next to a food/activity classification.

use crate::model::{Classification, Observation, Status, StatusLevel, VitalsThresholds};
use std::fmt;

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

pub const VITALS_RED_MESSAGE: &str =
    "Your body is sending a distress signal. Contact your doctor or rest.";
pub const VITALS_YELLOW_MESSAGE: &str =
    "Blood pressure is elevated. Rest and measure again later.";
pub const VITALS_GREEN_MESSAGE: &str =
    "Good morning. Your kidneys still deserve careful attention today.";

pub const RISK_HIGH_MESSAGE: &str = "High risk";
pub const RISK_MEDIUM_MESSAGE: &str = "Medium risk";
pub const RISK_LOW_MESSAGE: &str = "Low risk";

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

type Predicate<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// One `(predicate, level, message)` rule. Predicates take `&T` through `Fn`,
/// so they cannot mutate captured state between evaluations.
pub struct ThresholdRule<T> {
    level: StatusLevel,
    message: String,
    predicate: Predicate<T>,
}

impl<T> ThresholdRule<T> {
    pub fn new(
        level: StatusLevel,
        message: impl Into<String>,
        predicate: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            level,
            message: message.into(),
            predicate: Box::new(predicate),
        }
    }

    pub fn level(&self) -> StatusLevel {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn matches(&self, subject: &T) -> bool {
        (self.predicate)(subject)
    }
}

impl<T> fmt::Debug for ThresholdRule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThresholdRule")
            .field("level", &self.level)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Evaluator
// ---------------------------------------------------------------------------

/// An immutable, first-match rule set over `T`.
#[derive(Debug)]
pub struct ThresholdEvaluator<T> {
    rules: Vec<ThresholdRule<T>>,
    fallback_message: String,
}

impl<T> ThresholdEvaluator<T> {
    pub fn new(rules: Vec<ThresholdRule<T>>, fallback_message: impl Into<String>) -> Self {
        Self {
            rules,
            fallback_message: fallback_message.into(),
        }
    }

    pub fn rules(&self) -> &[ThresholdRule<T>] {
        &self.rules
    }

    /// Returns the status of the first matching rule, or GREEN.
    pub fn evaluate(&self, subject: &T) -> Status {
        self.rules
            .iter()
            .find(|rule| rule.matches(subject))
            .map(|rule| Status {
                level: rule.level,
                message: rule.message.clone(),
            })
            .unwrap_or_else(|| Status {
                level: StatusLevel::Green,
                message: self.fallback_message.clone(),
            })
    }
}

// ---------------------------------------------------------------------------
// Canonical rule sets
// ---------------------------------------------------------------------------

/// The vitals banner rules:
///
/// 1. RED if systolic ≥ red_systolic, diastolic ≥ red_diastolic, or hematuria.
/// 2. YELLOW if systolic ≥ yellow_systolic or diastolic ≥ yellow_diastolic.
/// 3. GREEN otherwise.
pub fn vitals_evaluator(thresholds: &VitalsThresholds) -> ThresholdEvaluator<Observation> {
    let t = thresholds.clone();
    let red = ThresholdRule::new(StatusLevel::Red, VITALS_RED_MESSAGE, move |o: &Observation| {
        o.systolic >= t.red_systolic || o.diastolic >= t.red_diastolic || o.hematuria_present
    });

    let t = thresholds.clone();
    let yellow = ThresholdRule::new(StatusLevel::Yellow, VITALS_YELLOW_MESSAGE, move |o: &Observation| {
        o.systolic >= t.yellow_systolic || o.diastolic >= t.yellow_diastolic
    });

    ThresholdEvaluator::new(vec![red, yellow], VITALS_GREEN_MESSAGE)
}

/// Risk labels for a classification result, highest severity first.
pub fn classification_evaluator() -> ThresholdEvaluator<Classification> {
    ThresholdEvaluator::new(
        vec![
            ThresholdRule::new(StatusLevel::Red, RISK_HIGH_MESSAGE, |c: &Classification| {
                c.level == StatusLevel::Red
            }),
            ThresholdRule::new(StatusLevel::Yellow, RISK_MEDIUM_MESSAGE, |c: &Classification| {
                c.level == StatusLevel::Yellow
            }),
        ],
        RISK_LOW_MESSAGE,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn vitals(systolic: u32, diastolic: u32, hematuria: bool) -> Observation {
        let mut obs = Observation::with_defaults(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        obs.systolic = systolic;
        obs.diastolic = diastolic;
        obs.hematuria_present = hematuria;
        obs
    }

    fn canonical() -> ThresholdEvaluator<Observation> {
        vitals_evaluator(&VitalsThresholds::default())
    }

    // --- Canonical vitals rules ---------------------------------------------

    #[test]
    fn test_systolic_at_red_threshold_is_red() {
        let status = canonical().evaluate(&vitals(140, 70, false));
        assert_eq!(status.level, StatusLevel::Red);
        assert_eq!(status.message, VITALS_RED_MESSAGE);
    }

    #[test]
    fn test_diastolic_at_red_threshold_is_red() {
        assert_eq!(canonical().evaluate(&vitals(120, 90, false)).level, StatusLevel::Red);
    }

    #[test]
    fn test_elevated_systolic_is_yellow() {
        assert_eq!(canonical().evaluate(&vitals(132, 70, false)).level, StatusLevel::Yellow);
    }

    #[test]
    fn test_elevated_diastolic_is_yellow() {
        assert_eq!(canonical().evaluate(&vitals(118, 80, false)).level, StatusLevel::Yellow);
    }

    #[test]
    fn test_normal_pressure_is_green() {
        let status = canonical().evaluate(&vitals(118, 70, false));
        assert_eq!(status.level, StatusLevel::Green);
        assert_eq!(status.message, VITALS_GREEN_MESSAGE);
    }

    #[test]
    fn test_hematuria_forces_red_regardless_of_pressure() {
        assert_eq!(canonical().evaluate(&vitals(100, 60, true)).level, StatusLevel::Red);
    }

    #[test]
    fn test_just_below_yellow_is_green() {
        assert_eq!(canonical().evaluate(&vitals(129, 79, false)).level, StatusLevel::Green);
    }

    #[test]
    fn test_custom_thresholds_shift_the_bands() {
        let strict = vitals_evaluator(&VitalsThresholds {
            red_systolic: 130,
            red_diastolic: 80,
            yellow_systolic: 120,
            yellow_diastolic: 75,
        });
        assert_eq!(strict.evaluate(&vitals(132, 70, false)).level, StatusLevel::Red);
        assert_eq!(strict.evaluate(&vitals(122, 70, false)).level, StatusLevel::Yellow);
    }

    // --- Evaluation semantics -----------------------------------------------

    #[test]
    fn test_first_match_wins_over_higher_severity() {
        // Authoring order is priority: a YELLOW rule listed first shadows a
        // RED rule that also matches.
        let evaluator = ThresholdEvaluator::new(
            vec![
                ThresholdRule::new(StatusLevel::Yellow, "first", |n: &i32| *n > 0),
                ThresholdRule::new(StatusLevel::Red, "second", |n: &i32| *n > 10),
            ],
            "none",
        );
        let status = evaluator.evaluate(&50);
        assert_eq!(status.level, StatusLevel::Yellow);
        assert_eq!(status.message, "first");
    }

    #[test]
    fn test_empty_rule_set_falls_back_to_green() {
        let evaluator: ThresholdEvaluator<i32> = ThresholdEvaluator::new(Vec::new(), "all clear");
        let status = evaluator.evaluate(&1);
        assert_eq!(status.level, StatusLevel::Green);
        assert_eq!(status.message, "all clear");
    }

    #[test]
    fn test_repeated_evaluation_is_stable() {
        let evaluator = canonical();
        let obs = vitals(135, 85, false);
        let first = evaluator.evaluate(&obs);
        for _ in 0..10 {
            assert_eq!(evaluator.evaluate(&obs), first);
        }
    }

    // --- Classification labels ----------------------------------------------

    #[test]
    fn test_classification_labels_follow_level() {
        let evaluator = classification_evaluator();
        let mut item = Classification {
            name: "crab".to_string(),
            level: StatusLevel::Red,
            reason: String::new(),
            advice: String::new(),
        };
        assert_eq!(evaluator.evaluate(&item).message, RISK_HIGH_MESSAGE);
        item.level = StatusLevel::Yellow;
        assert_eq!(evaluator.evaluate(&item).message, RISK_MEDIUM_MESSAGE);
        item.level = StatusLevel::Green;
        let status = evaluator.evaluate(&item);
        assert_eq!(status.level, StatusLevel::Green);
        assert_eq!(status.message, RISK_LOW_MESSAGE);
    }
}
