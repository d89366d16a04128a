//! Kidney compass: daily health tracking core for chronic kidney disease.
//!
//! - `input::range` turns drag gestures into snapped water-intake values.
//! - `alert::thresholds` derives GREEN/YELLOW/RED status from ordered rules.
//! - `session` ties both to the live observation.
//! - `lookup` and `ingest::api` classify foods and activities, local lists
//!   first and the backend last.

pub mod alert;
pub mod analysis;
pub mod config;
pub mod ingest;
pub mod input;
pub mod logging;
pub mod lookup;
pub mod model;
pub mod session;
