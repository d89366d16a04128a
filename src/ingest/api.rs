//! Kidney compass backend API client.
//!
//! Thin blocking client for the classification backend. Each endpoint has
//! a `parse_*` function for its response body so the wire format can be
//! tested without a network.
//!
//! Endpoints:
//! - `POST /api/classify {query, type} -> {name, level, reason, advice}`
//! - `GET  /api/food-whitelist -> {whitelist: [{category, name, note}]}`
//! - `GET  /api/food-blacklist -> {blacklist: [{name, reason, level}]}`
//! - `POST /api/recipe -> {dishName, tags, ingredients, steps, nutritionBenefit}`
//! - `GET  /api/health -> {status, message, services}`
//!
//! The client never retries. Callers that need a degraded result on failure
//! use `classify_or_fallback` / `recipe_or_fallback`.

use crate::config::ApiConfig;
use crate::ingest::ClassificationService;
use crate::logging::{Component, log_fallback, log_transport_failure};
use crate::model::{
    BlacklistEntry, Classification, ItemKind, Recipe, StatusLevel, TransportError, WhitelistEntry,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

// ============================================================================
// Wire Structures
// ============================================================================

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    query: &'a str,
    #[serde(rename = "type")]
    kind: ItemKind,
}

#[derive(Debug, Deserialize)]
struct WhitelistResponse {
    whitelist: Vec<WhitelistEntry>,
}

#[derive(Debug, Deserialize)]
struct BlacklistResponse {
    blacklist: Vec<BlacklistEntry>,
}

/// Body of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub services: HashMap<String, String>,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

// ============================================================================
// Response Parsing
// ============================================================================

pub fn parse_classification(body: &str) -> Result<Classification, TransportError> {
    Ok(serde_json::from_str(body)?)
}

pub fn parse_whitelist(body: &str) -> Result<Vec<WhitelistEntry>, TransportError> {
    let response: WhitelistResponse = serde_json::from_str(body)?;
    Ok(response.whitelist)
}

pub fn parse_blacklist(body: &str) -> Result<Vec<BlacklistEntry>, TransportError> {
    let response: BlacklistResponse = serde_json::from_str(body)?;
    Ok(response.blacklist)
}

pub fn parse_recipe(body: &str) -> Result<Recipe, TransportError> {
    Ok(serde_json::from_str(body)?)
}

pub fn parse_health(body: &str) -> Result<HealthStatus, TransportError> {
    Ok(serde_json::from_str(body)?)
}

/// Joins the base URL and an endpoint path without doubling slashes.
pub fn build_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

// ============================================================================
// Fallbacks
// ============================================================================

pub const FALLBACK_REASON: &str = "Could not reach the server, please try again later.";
pub const FALLBACK_ADVICE: &str = "Consult your doctor.";

/// The YELLOW result shown when classification is unavailable.
pub fn fallback_classification(query: &str) -> Classification {
    Classification {
        name: query.to_string(),
        level: StatusLevel::Yellow,
        reason: FALLBACK_REASON.to_string(),
        advice: FALLBACK_ADVICE.to_string(),
    }
}

/// Sample recipe shown when the recipe endpoint is unavailable.
pub fn sample_recipe() -> Recipe {
    Recipe {
        dish_name: "Steamed sea bass (sample)".to_string(),
        tags: vec!["Quality protein".to_string(), "Low oil".to_string()],
        ingredients: vec![
            "1 sea bass".to_string(),
            "Shredded ginger".to_string(),
            "Scallion pieces".to_string(),
            "A little low-sodium soy sauce".to_string(),
        ],
        steps: vec![
            "Clean the fish and score both sides".to_string(),
            "Steam with ginger and scallion for 8 minutes".to_string(),
            "Pour off the liquid, finish with hot oil and soy sauce".to_string(),
        ],
        nutrition_benefit: "Backend unavailable; showing sample data.".to_string(),
    }
}

/// Classifies `query`, substituting the YELLOW fallback on any failure.
pub fn classify_or_fallback(
    service: &dyn ClassificationService,
    query: &str,
    kind: ItemKind,
) -> Classification {
    match service.classify(query, kind) {
        Ok(result) => result,
        Err(e) => {
            log_transport_failure(Component::Api, "classify", &e);
            log_fallback(Component::Api, "classify", query);
            fallback_classification(query)
        }
    }
}

/// Fetches a recipe, substituting the sample on any failure. The flag is
/// `true` when the sample was used.
pub fn recipe_or_fallback(client: &ApiClient) -> (Recipe, bool) {
    match client.recipe() {
        Ok(recipe) => (recipe, false),
        Err(e) => {
            log_transport_failure(Component::Api, "recipe", &e);
            log_fallback(Component::Api, "recipe", "");
            (sample_recipe(), true)
        }
    }
}

// ============================================================================
// API Client
// ============================================================================

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::blocking::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, TransportError> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    /// Attaches an opaque bearer token supplied by the host application.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn food_whitelist(&self) -> Result<Vec<WhitelistEntry>, TransportError> {
        let body = self.get("/api/food-whitelist")?;
        parse_whitelist(&body)
    }

    pub fn food_blacklist(&self) -> Result<Vec<BlacklistEntry>, TransportError> {
        let body = self.get("/api/food-blacklist")?;
        parse_blacklist(&body)
    }

    pub fn recipe(&self) -> Result<Recipe, TransportError> {
        let body = self.post("/api/recipe", None)?;
        parse_recipe(&body)
    }

    pub fn health(&self) -> Result<HealthStatus, TransportError> {
        let body = self.get("/api/health")?;
        parse_health(&body)
    }

    fn get(&self, path: &str) -> Result<String, TransportError> {
        let url = build_url(&self.base_url, path);
        debug!(%url, "GET");
        let request = self.authorize(self.client.get(&url).header("Accept", "application/json"));
        Self::read_body(request.send()?)
    }

    fn post(&self, path: &str, body: Option<String>) -> Result<String, TransportError> {
        let request = self.post_request(path, body);
        Self::read_body(request.send()?)
    }

    /// Only requests that carry a JSON body declare a content type.
    fn post_request(&self, path: &str, body: Option<String>) -> reqwest::blocking::RequestBuilder {
        let url = build_url(&self.base_url, path);
        debug!(%url, "POST");
        let mut request = self.client.post(&url).header("Accept", "application/json");
        if let Some(body) = body {
            request = request.header("Content-Type", "application/json").body(body);
        }
        self.authorize(request)
    }

    fn authorize(
        &self,
        request: reqwest::blocking::RequestBuilder,
    ) -> reqwest::blocking::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn read_body(response: reqwest::blocking::Response) -> Result<String, TransportError> {
        if !response.status().is_success() {
            return Err(TransportError::Http(response.status().as_u16()));
        }
        Ok(response.text()?)
    }
}

impl ClassificationService for ApiClient {
    fn classify(&self, query: &str, kind: ItemKind) -> Result<Classification, TransportError> {
        let payload = serde_json::to_string(&ClassifyRequest { query, kind })?;
        let body = self.post("/api/classify", Some(payload))?;
        parse_classification(&body)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct Unreachable;

    impl ClassificationService for Unreachable {
        fn classify(&self, _query: &str, _kind: ItemKind) -> Result<Classification, TransportError> {
            Err(TransportError::Request("connection refused".to_string()))
        }
    }

    // --- URL building -------------------------------------------------------

    #[test]
    fn test_build_url_joins_without_double_slash() {
        assert_eq!(build_url("http://host/", "/api/classify"), "http://host/api/classify");
        assert_eq!(build_url("http://host", "api/health"), "http://host/api/health");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = ApiClient::new("http://localhost:7860/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:7860");
    }

    // --- Request body -------------------------------------------------------

    #[test]
    fn test_classify_request_uses_type_key() {
        let body = serde_json::to_value(ClassifyRequest {
            query: "tofu",
            kind: ItemKind::Food,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"query": "tofu", "type": "food"}));
    }

    #[test]
    fn test_bodyless_post_has_no_content_type() {
        let client = ApiClient::new("http://localhost:7860", Duration::from_secs(1)).unwrap();
        let request = client.post_request("/api/recipe", None).build().unwrap();
        assert!(request.headers().get("Content-Type").is_none());
        assert!(request.body().is_none());
    }

    #[test]
    fn test_json_post_declares_content_type_and_token() {
        let client = ApiClient::new("http://localhost:7860", Duration::from_secs(1))
            .unwrap()
            .with_token("abc");
        let request = client
            .post_request("/api/classify", Some(r#"{"query":"tofu","type":"food"}"#.to_string()))
            .build()
            .unwrap();
        assert_eq!(request.headers()["Content-Type"], "application/json");
        assert_eq!(request.headers()["Authorization"], "Bearer abc");
    }

    // --- Response parsing ---------------------------------------------------

    #[test]
    fn test_parse_classification() {
        let c = parse_classification(
            r#"{"name":"banana","level":"yellow","reason":"high potassium","advice":"limit"}"#,
        )
        .unwrap();
        assert_eq!(c.name, "banana");
        assert_eq!(c.level, StatusLevel::Yellow);
    }

    #[test]
    fn test_parse_classification_rejects_unknown_level() {
        let result = parse_classification(
            r#"{"name":"banana","level":"orange","reason":"","advice":""}"#,
        );
        assert!(matches!(result, Err(TransportError::Parse(_))));
    }

    #[test]
    fn test_parse_whitelist() {
        let list = parse_whitelist(
            r#"{"whitelist":[
                {"category":"Staples","name":"Rice","note":"low potassium"},
                {"category":"Fruit","name":"Apple"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].category, "Staples");
        assert_eq!(list[1].note, "", "note is optional");
    }

    #[test]
    fn test_parse_blacklist() {
        let list = parse_blacklist(
            r#"{"blacklist":[{"name":"Pork liver","reason":"very high phosphorus","level":"red"}]}"#,
        )
        .unwrap();
        assert_eq!(list[0].level, StatusLevel::Red);
    }

    #[test]
    fn test_parse_recipe_uses_camel_case() {
        let recipe = parse_recipe(
            r#"{"dishName":"Winter melon soup","tags":["Low sodium"],"ingredients":["melon"],
                "steps":["boil"],"nutritionBenefit":"hydrating"}"#,
        )
        .unwrap();
        assert_eq!(recipe.dish_name, "Winter melon soup");
        assert_eq!(recipe.nutrition_benefit, "hydrating");
    }

    #[test]
    fn test_parse_health() {
        let health = parse_health(
            r#"{"status":"partial","message":"running","services":{"database":"disconnected","ai":"available"}}"#,
        )
        .unwrap();
        assert!(!health.is_ok());
        assert_eq!(health.services["ai"], "available");
    }

    // --- Fallbacks ----------------------------------------------------------

    #[test]
    fn test_transport_failure_yields_yellow_fallback() {
        let result = classify_or_fallback(&Unreachable, "hot pot", ItemKind::Food);
        assert_eq!(result.name, "hot pot");
        assert_eq!(result.level, StatusLevel::Yellow);
        assert_eq!(result.reason, FALLBACK_REASON);
    }

    #[test]
    fn test_unreachable_backend_serves_sample_recipe() {
        // Port 9 (discard) on localhost is closed on test machines.
        let client = ApiClient::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let (recipe, is_fallback) = recipe_or_fallback(&client);
        assert!(is_fallback);
        assert_eq!(recipe, sample_recipe());
    }
}
