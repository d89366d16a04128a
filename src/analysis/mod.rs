//! Health analyses over recorded data.
//!
//! Trend analysis and medical-report reading have no backend contract yet.
//! Both functions here return fixed placeholder results, marked with
//! `is_placeholder`, so hosts can wire up the screens now and swap in the
//! real service later.
//!
//! # Clock injection
//! `analyze_medical_report_at` takes `now` rather than calling `Utc::now()`,
//! which keeps the report date deterministic in tests.

use crate::logging::{Component, log_fallback};
use crate::model::{
    HealthAnalysis, Observation, ReportAnalysis, ReportIndicators, ReportStatus, Trend,
};
use chrono::{DateTime, Utc};

pub const TREND_PLACEHOLDER_SUMMARY: &str = "Trend analysis is being upgraded.";
pub const REPORT_PLACEHOLDER_STRATEGY: &str = "Report image analysis is being upgraded.";

/// Indicator value shown while a report has not really been read.
pub const UNKNOWN_INDICATOR: &str = "?";

/// A result that may be a stand-in for a real analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis<T> {
    pub result: T,
    pub is_placeholder: bool,
}

/// Summarises the trend across `history`. Placeholder: the returned
/// analysis does not depend on the input.
pub fn analyze_health_trends(history: &[Observation]) -> Analysis<HealthAnalysis> {
    log_fallback(Component::Analysis, "health-trends", &format!("{} records", history.len()));
    Analysis {
        result: HealthAnalysis {
            summary: TREND_PLACEHOLDER_SUMMARY.to_string(),
            trend: Trend::Stable,
            actionable_advice: vec![
                "Keep a healthy diet".to_string(),
                "Get enough rest".to_string(),
            ],
        },
        is_placeholder: true,
    }
}

/// Reads lab indicators from a base64 report image. Placeholder: every
/// indicator is `?` and the status is `Warning`.
pub fn analyze_medical_report_at(image_base64: &str, now: DateTime<Utc>) -> Analysis<ReportAnalysis> {
    log_fallback(
        Component::Analysis,
        "medical-report",
        &format!("{} bytes", image_base64.len()),
    );
    Analysis {
        result: ReportAnalysis {
            date: now.to_rfc3339(),
            indicators: ReportIndicators {
                creatinine: UNKNOWN_INDICATOR.to_string(),
                egfr: UNKNOWN_INDICATOR.to_string(),
                uric_acid: UNKNOWN_INDICATOR.to_string(),
                proteinuria: UNKNOWN_INDICATOR.to_string(),
            },
            status: ReportStatus::Warning,
            tailored_strategy: REPORT_PLACEHOLDER_STRATEGY.to_string(),
        },
        is_placeholder: true,
    }
}

/// Convenience wrapper that uses the real current time.
pub fn analyze_medical_report(image_base64: &str) -> Analysis<ReportAnalysis> {
    analyze_medical_report_at(image_base64, Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    #[test]
    fn test_trend_analysis_is_a_placeholder() {
        let history = vec![Observation::with_defaults(NaiveDate::from_ymd_opt(2023, 10, 21).unwrap())];
        let analysis = analyze_health_trends(&history);
        assert!(analysis.is_placeholder);
        assert_eq!(analysis.result.trend, Trend::Stable);
        assert_eq!(analysis.result, analyze_health_trends(&[]).result, "placeholder ignores input");
    }

    #[test]
    fn test_report_analysis_uses_injected_clock() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap();
        let analysis = analyze_medical_report_at("aGVsbG8=", now);
        assert!(analysis.is_placeholder);
        assert_eq!(analysis.result.date, "2024-05-01T13:00:00+00:00");
        assert_eq!(analysis.result.indicators.egfr, UNKNOWN_INDICATOR);
        assert_eq!(analysis.result.status, ReportStatus::Warning);
    }
}
