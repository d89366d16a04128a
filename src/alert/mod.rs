//! Alert derivation for the tracker.
//!
//! Submodules:
//! - `thresholds`: ordered first-match rules mapping a subject to a
//!   GREEN/YELLOW/RED status and message.

pub mod thresholds;
