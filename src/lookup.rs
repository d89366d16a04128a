//! Local-first classification lookup.
//!
//! A `LookupChain` asks each step in turn and stops at the first one that
//! returns something: local whitelist, then local blacklist, then the
//! remote classifier. Local steps only ever answer `Some(Ok(_))` or `None`;
//! the remote step can also answer `Some(Err(_))`, which the caller turns
//! into a fallback result.

use crate::alert::thresholds::{ThresholdEvaluator, classification_evaluator};
use crate::ingest::ClassificationService;
use crate::ingest::api::{ApiClient, fallback_classification};
use crate::logging::{Component, log_fallback, log_transport_failure};
use crate::model::{
    BlacklistEntry, Classification, ItemKind, Status, StatusLevel, TransportError, WhitelistEntry,
};
use std::sync::Arc;
use tracing::debug;

pub type LookupResult = Option<Result<Classification, TransportError>>;

/// One link of the chain.
pub trait LookupStep {
    fn name(&self) -> &'static str;
    fn lookup(&self, query: &str, kind: ItemKind) -> LookupResult;
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Case-insensitive test that `field` contains `query`, so "tofu" finds
/// "Silken tofu". A longer query never matches a shorter entry: "rice wine"
/// must not resolve to "Rice". Blank queries and blank fields never match.
fn text_matches(query: &str, field: &str) -> bool {
    let query = query.trim().to_lowercase();
    let field = field.trim().to_lowercase();
    if query.is_empty() || field.is_empty() {
        return false;
    }
    field.contains(&query)
}

// ---------------------------------------------------------------------------
// Local steps
// ---------------------------------------------------------------------------

/// Foods known to be safe. A hit classifies GREEN. Only food queries are
/// looked up locally.
#[derive(Debug, Clone, Default)]
pub struct LocalWhitelist {
    entries: Vec<WhitelistEntry>,
}

impl LocalWhitelist {
    pub fn new(entries: Vec<WhitelistEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl LookupStep for LocalWhitelist {
    fn name(&self) -> &'static str {
        "whitelist"
    }

    fn lookup(&self, query: &str, kind: ItemKind) -> LookupResult {
        if kind != ItemKind::Food {
            return None;
        }
        let entry = self
            .entries
            .iter()
            .find(|e| text_matches(query, &e.name) || text_matches(query, &e.category))?;
        Some(Ok(Classification {
            name: entry.name.clone(),
            level: StatusLevel::Green,
            reason: entry.note.clone(),
            advice: format!("Suitable choice from the {} group.", entry.category),
        }))
    }
}

/// Foods to limit or avoid, each with its own level.
#[derive(Debug, Clone, Default)]
pub struct LocalBlacklist {
    entries: Vec<BlacklistEntry>,
}

impl LocalBlacklist {
    pub fn new(entries: Vec<BlacklistEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl LookupStep for LocalBlacklist {
    fn name(&self) -> &'static str {
        "blacklist"
    }

    fn lookup(&self, query: &str, kind: ItemKind) -> LookupResult {
        if kind != ItemKind::Food {
            return None;
        }
        let entry = self.entries.iter().find(|e| text_matches(query, &e.name))?;
        let advice = match entry.level {
            StatusLevel::Red => "Avoid this item.",
            _ => "Limit the amount and check with your doctor.",
        };
        Some(Ok(Classification {
            name: entry.name.clone(),
            level: entry.level,
            reason: entry.reason.clone(),
            advice: advice.to_string(),
        }))
    }
}

// ---------------------------------------------------------------------------
// Remote step
// ---------------------------------------------------------------------------

/// Delegates to the backend. Always answers, possibly with an error.
pub struct RemoteClassifier {
    service: Arc<dyn ClassificationService + Send + Sync>,
}

impl RemoteClassifier {
    pub fn new(service: Arc<dyn ClassificationService + Send + Sync>) -> Self {
        Self { service }
    }
}

impl LookupStep for RemoteClassifier {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn lookup(&self, query: &str, kind: ItemKind) -> LookupResult {
        Some(self.service.classify(query, kind))
    }
}

// ---------------------------------------------------------------------------
// Chain
// ---------------------------------------------------------------------------

pub struct LookupChain {
    steps: Vec<Box<dyn LookupStep + Send + Sync>>,
    labels: ThresholdEvaluator<Classification>,
}

impl Default for LookupChain {
    fn default() -> Self {
        Self::new()
    }
}

impl LookupChain {
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            labels: classification_evaluator(),
        }
    }

    /// Appends a step; steps are consulted in the order added.
    pub fn with_step(mut self, step: impl LookupStep + Send + Sync + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// whitelist → blacklist → remote.
    pub fn standard(
        whitelist: LocalWhitelist,
        blacklist: LocalBlacklist,
        remote: Arc<dyn ClassificationService + Send + Sync>,
    ) -> Self {
        Self::new()
            .with_step(whitelist)
            .with_step(blacklist)
            .with_step(RemoteClassifier::new(remote))
    }

    /// Builds the standard chain, seeding the local lists from the backend.
    /// A list that cannot be fetched is left empty.
    pub fn from_api(client: Arc<ApiClient>) -> Self {
        let whitelist = client.food_whitelist().unwrap_or_else(|e| {
            log_transport_failure(Component::Lookup, "food-whitelist", &e);
            Vec::new()
        });
        let blacklist = client.food_blacklist().unwrap_or_else(|e| {
            log_transport_failure(Component::Lookup, "food-blacklist", &e);
            Vec::new()
        });
        Self::standard(LocalWhitelist::new(whitelist), LocalBlacklist::new(blacklist), client)
    }

    /// First answer from the chain, or `None` if no step answered.
    pub fn resolve(&self, query: &str, kind: ItemKind) -> LookupResult {
        if query.trim().is_empty() {
            return None;
        }
        self.steps.iter().find_map(|step| {
            let answer = step.lookup(query, kind);
            if answer.is_some() {
                debug!(step = step.name(), query, "lookup answered");
            }
            answer
        })
    }

    /// Like `resolve`, but a failed or missing answer becomes the YELLOW
    /// fallback.
    pub fn resolve_or_fallback(&self, query: &str, kind: ItemKind) -> Classification {
        match self.resolve(query, kind) {
            Some(Ok(result)) => result,
            Some(Err(e)) => {
                log_transport_failure(Component::Lookup, "classify", &e);
                log_fallback(Component::Lookup, "classify", query);
                fallback_classification(query)
            }
            None => {
                log_fallback(Component::Lookup, "classify", query);
                fallback_classification(query)
            }
        }
    }

    /// Risk label for a result, from the shared classification rules.
    pub fn label(&self, result: &Classification) -> Status {
        self.labels.evaluate(result)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
