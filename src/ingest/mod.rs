//! Remote data sources.
//!
//! Submodules:
//! - `api`: blocking client for the classification backend.

pub mod api;

use crate::model::{Classification, ItemKind, TransportError};

/// Anything that can classify an item remotely. Implemented by
/// `api::ApiClient`; tests substitute their own.
pub trait ClassificationService {
    fn classify(&self, query: &str, kind: ItemKind) -> Result<Classification, TransportError>;
}
