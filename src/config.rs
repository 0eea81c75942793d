//! Generation input model.
//!
//! The configuration arrives either from the CLI (a JSON file) or from the
//! web UI (`POST /api/generate`). Field names follow the UI's camelCase
//! payloads; every optional array defaults to empty so a minimal config
//! still generates a complete, if small, collection.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::error::ValidationError;
use crate::generators::{GeneratorKind, GeneratorSpec};

/// Top-level configuration for one generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub collection_name: String,
    /// Target API endpoint exercised by the fixed negative-scenario request.
    #[serde(default)]
    pub api_url: String,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub integration_point: Option<String>,
    /// Valid request template; the negative-case mutator derives the
    /// intentionally-invalid body from it.
    #[serde(default)]
    pub request_payload: Option<Value>,
    #[serde(default, alias = "dataQueries")]
    pub db_queries: Vec<QuerySpec>,
    #[serde(default)]
    pub variable_generators: Vec<GeneratorSpec>,
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
    #[serde(default)]
    pub csv_scenarios: Vec<CsvScenario>,
    #[serde(default)]
    pub assertions: Vec<CustomAssertion>,
    #[serde(default)]
    pub auth: Option<AuthSpec>,
    #[serde(default)]
    pub db_config: DbConfig,
    #[serde(default)]
    pub contract: ResponseContract,
}

impl GenerationConfig {
    pub fn new(collection_name: impl Into<String>) -> Self {
        Self {
            collection_name: collection_name.into(),
            api_url: String::new(),
            method: None,
            integration_point: None,
            request_payload: None,
            db_queries: Vec::new(),
            variable_generators: Vec::new(),
            scenarios: Vec::new(),
            csv_scenarios: Vec::new(),
            assertions: Vec::new(),
            auth: None,
            db_config: DbConfig::default(),
            contract: ResponseContract::default(),
        }
    }

    /// Reject invalid generator parameters before any synthesis runs.
    /// Missing parameters fall back to documented defaults and are fine;
    /// present-but-invalid ones are a caller error.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.collection_name.trim().is_empty() {
            return Err(ValidationError::EmptyCollectionName);
        }

        let mut names = HashSet::new();
        for spec in &self.variable_generators {
            if !names.insert(spec.name.as_str()) {
                return Err(ValidationError::DuplicateGeneratorName(spec.name.clone()));
            }
            match spec.kind {
                GeneratorKind::RandomNumber => {
                    if let (Some(min), Some(max)) = (spec.min, spec.max) {
                        if min >= max {
                            return Err(ValidationError::InvalidRange {
                                name: spec.name.clone(),
                                min,
                                max,
                            });
                        }
                    }
                }
                GeneratorKind::RandomString => {
                    if let Some(length) = spec.length {
                        if length <= 0 {
                            return Err(ValidationError::InvalidLength {
                                name: spec.name.clone(),
                                length,
                            });
                        }
                    }
                }
                _ => {}
            }
        }

        for query in &self.db_queries {
            if query.endpoint.trim().is_empty() {
                return Err(ValidationError::MissingEndpoint(query.name.clone()));
            }
        }

        if let Some(AuthSpec::Basic { username, .. }) = &self.auth {
            if username.is_empty() {
                return Err(ValidationError::InvalidAuth(
                    "basic auth requires a username".to_string(),
                ));
            }
        }

        Ok(())
    }

    pub fn request_method(&self) -> &str {
        self.method.as_deref().unwrap_or("POST")
    }
}

/// A data-preparation database lookup exposed as a mock route.
///
/// The query text must return a two-column row set aliased VALUE/KEY; that
/// is a caller contract, not something the generator validates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuerySpec {
    pub name: String,
    pub endpoint: String,
    #[serde(default = "default_get")]
    pub method: String,
    pub query: String,
    #[serde(default)]
    pub params: Vec<String>,
    /// Environment key the first row's VALUE lands under.
    #[serde(default)]
    pub variable_name: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub description: String,
}

fn default_get() -> String {
    "GET".to_string()
}

/// A manually authored test scenario. The URL and body may embed
/// `{{variableName}}` placeholders resolved by Bruno at execution time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub name: String,
    pub url: String,
    #[serde(default = "default_get")]
    pub method: String,
    #[serde(default, alias = "request")]
    pub request_body: Option<String>,
}

/// A bulk-loaded scenario. Each batch execution gets per-run-uniqued
/// variable suffixes (`name_index`) to avoid collisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvScenario {
    pub name: String,
    #[serde(rename = "type", default = "default_get")]
    pub scenario_type: String,
    #[serde(default)]
    pub request_body: String,
}

/// User-defined assertion attached to bulk scenario test scripts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomAssertion {
    #[serde(rename = "type")]
    pub assertion_type: AssertionType,
    #[serde(default)]
    pub expected: Option<Value>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssertionType {
    Status,
    ResponseTime,
    JsonPath,
    Body,
    /// Offered by the UI but without a synthesis rule yet.
    Header,
}

/// Authentication applied to scenario requests. Everything else inherits
/// from the collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AuthSpec {
    None,
    Basic { username: String, password: String },
    Bearer { token: String },
}

/// Relational connection settings embedded verbatim into the generated
/// mock server. Never validated here; the mock server owns the round-trip.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DbConfig {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub server: String,
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub options: DbOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbOptions {
    pub encrypt: bool,
}

impl Default for DbOptions {
    fn default() -> Self {
        Self { encrypt: true }
    }
}

/// The response envelope contract the positive/negative scripts assert
/// against. Defaults match the TXLife API family the tool grew up with;
/// other API families override the paths and sentinels here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseContract {
    pub envelope: String,
    pub response_wrapper: String,
    pub request_wrapper: String,
    pub trans_ref_field: String,
    pub result_field: String,
    /// Accessor appended after the result field, e.g. `ResultCode['@tc']`.
    pub result_code_path: String,
    pub success_code: String,
    pub invalid_sentinel: String,
}

impl Default for ResponseContract {
    fn default() -> Self {
        Self {
            envelope: "TXLife".to_string(),
            response_wrapper: "TXLifeResponse".to_string(),
            request_wrapper: "TXLifeRequest".to_string(),
            trans_ref_field: "TransRefGUID".to_string(),
            result_field: "TransResult".to_string(),
            result_code_path: "ResultCode['@tc']".to_string(),
            success_code: "1".to_string(),
            invalid_sentinel: "INVALID_ID".to_string(),
        }
    }
}

impl ResponseContract {
    /// `response.TXLife.TXLifeResponse` style accessor for scripts.
    pub fn response_path(&self) -> String {
        format!("response.{}.{}", self.envelope, self.response_wrapper)
    }
}
