//! Pointer-driven input controls.
//!
//! Submodules:
//! - `range`: bounded value control with snap-to-grid and drag lifecycle.

pub mod range;
