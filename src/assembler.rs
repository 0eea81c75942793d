//! Document assembly: turns a generation config into the three-folder
//! collection document.
//!
//! Folder order is fixed (Data Preparation, Positive Scenarios, Negative
//! Scenarios) and each folder numbers its items independently from 1.
//! Sequence allocation is local to the call so concurrent generations can
//! never interleave.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::assertions;
use crate::collection::{
    BrunoConfig, CollectionDocument, Environment, EnvironmentVariable, Folder, ItemSettings,
    RequestAuth, RequestBody, RequestDefinition, RequestItem, RequestScript,
};
use crate::config::GenerationConfig;
use crate::packaging::sanitize_name;
use crate::payload;
use crate::script::{synthesize_fragment, EmbeddedDialect};

pub const MOCK_SERVER_BASE_URL: &str = "http://localhost:3000";

/// Per-folder sequence allocator. Deliberately not shared across folders
/// or calls.
struct Sequencer {
    next: u32,
}

impl Sequencer {
    fn new() -> Self {
        Self { next: 1 }
    }

    fn take(&mut self) -> u32 {
        let seq = self.next;
        self.next += 1;
        seq
    }
}

/// Assemble a collection document using the current wall clock.
pub fn assemble(config: &GenerationConfig) -> CollectionDocument {
    assemble_at(config, Utc::now())
}

/// Assemble with an explicit clock; tests freeze it.
pub fn assemble_at(config: &GenerationConfig, now: DateTime<Utc>) -> CollectionDocument {
    CollectionDocument {
        name: config.collection_name.clone(),
        version: "1".to_string(),
        items: vec![
            data_preparation_folder(config),
            positive_scenarios_folder(config),
            negative_scenarios_folder(config),
        ],
        active_environment_uid: Uuid::new_v4().to_string(),
        environments: vec![Environment {
            variables: environment_variables(config, now),
            name: "DEV".to_string(),
        }],
        bruno_config: BrunoConfig::for_collection(&config.collection_name),
    }
}

/// One item per query (mock route target plus the data-prep script),
/// followed by one probe item per generator carrying the embedded-dialect
/// fragment as its pre-request script.
fn data_preparation_folder(config: &GenerationConfig) -> Folder {
    let mut seq = Sequencer::new();
    let mut items = Vec::new();

    for query in &config.db_queries {
        items.push(RequestItem {
            item_type: "http".to_string(),
            name: query.name.clone(),
            filename: format!("{}.bru", sanitize_name(&query.name)),
            seq: seq.take(),
            settings: ItemSettings::default(),
            tags: Vec::new(),
            request: RequestDefinition {
                url: format!("{}{}", MOCK_SERVER_BASE_URL, query.endpoint),
                method: query.method.clone(),
                headers: Vec::new(),
                params: Vec::new(),
                body: if query.method.eq_ignore_ascii_case("POST") {
                    RequestBody::json(query.body.clone().unwrap_or_default())
                } else {
                    RequestBody::none()
                },
                script: RequestScript::default(),
                vars: serde_json::json!({}),
                assertions: Vec::new(),
                tests: assertions::data_prep_script(query),
                docs: query.description.clone(),
                auth: RequestAuth::inherit(),
            },
        });
    }

    for spec in &config.variable_generators {
        items.push(RequestItem {
            item_type: "http".to_string(),
            name: format!("Generate {}", spec.name),
            filename: format!("{}.bru", sanitize_name(&format!("{}_Generator", spec.name))),
            seq: seq.take(),
            settings: ItemSettings::default(),
            tags: vec!["variable-generator".to_string(), "setup".to_string()],
            request: RequestDefinition {
                // A no-op probe; the pre-request script does the real work.
                url: "{{baseUrl}}/health".to_string(),
                method: "GET".to_string(),
                headers: Vec::new(),
                params: Vec::new(),
                body: RequestBody::none(),
                script: RequestScript::pre(synthesize_fragment(spec, &EmbeddedDialect)),
                vars: serde_json::json!({}),
                assertions: Vec::new(),
                tests: assertions::generator_probe_script(spec),
                docs: format!(
                    "Generate {} ({}) using pre-request script",
                    spec.name,
                    spec.kind.as_str()
                ),
                auth: RequestAuth::inherit(),
            },
        });
    }

    Folder::new("DataPreparation", "DataPreparation", 1, items)
}

fn positive_scenarios_folder(config: &GenerationConfig) -> Folder {
    let mut seq = Sequencer::new();
    let mut items = Vec::new();

    for scenario in &config.scenarios {
        items.push(RequestItem {
            item_type: "http".to_string(),
            name: scenario.name.clone(),
            filename: format!("{}.bru", sanitize_name(&scenario.name)),
            seq: seq.take(),
            settings: ItemSettings::default(),
            tags: Vec::new(),
            request: RequestDefinition {
                url: scenario.url.clone(),
                method: scenario.method.clone(),
                headers: Vec::new(),
                params: Vec::new(),
                body: RequestBody::maybe_json(scenario.request_body.as_deref()),
                script: RequestScript::default(),
                vars: serde_json::json!({}),
                assertions: Vec::new(),
                tests: assertions::positive_script(&config.contract),
                docs: format!("Test scenario: {}", scenario.name),
                auth: RequestAuth::from_spec(config.auth.as_ref()),
            },
        });
    }

    for (index, csv) in config.csv_scenarios.iter().enumerate() {
        items.push(RequestItem {
            item_type: "http".to_string(),
            name: csv.name.clone(),
            filename: format!("{}.bru", sanitize_name(&csv.name)),
            seq: seq.take(),
            settings: ItemSettings::default(),
            tags: vec!["csv-scenario".to_string()],
            request: RequestDefinition {
                url: format!(
                    "{{{{baseUrl}}}}/api/{}",
                    sanitize_name(&csv.name.to_lowercase())
                ),
                method: csv.scenario_type.clone(),
                headers: Vec::new(),
                params: Vec::new(),
                body: RequestBody::maybe_json(Some(csv.request_body.as_str())),
                script: RequestScript::pre(assertions::unique_variables_script(
                    &config.variable_generators,
                    index,
                )),
                vars: serde_json::json!({}),
                assertions: Vec::new(),
                tests: assertions::csv_scenario_script(csv, &config.contract, &config.assertions),
                docs: format!(
                    "CSV Test scenario: {} (Type: {})",
                    csv.name, csv.scenario_type
                ),
                auth: RequestAuth::from_spec(config.auth.as_ref()),
            },
        });
    }

    Folder::new("Positive Scenarios", "Positive Scenarios", 2, items)
}

/// Exactly two fixed items: the corrupted-payload request and the failure
/// lookup keyed by the captured transaction reference.
fn negative_scenarios_folder(config: &GenerationConfig) -> Folder {
    let mut seq = Sequencer::new();
    let corrupted = payload::corrupt_optional(config.request_payload.as_ref(), &config.contract);
    let invalid_body = corrupted
        .map(|value| serde_json::to_string_pretty(&value).unwrap_or_default())
        .unwrap_or_default();

    let invalid_item = RequestItem {
        item_type: "http".to_string(),
        name: format!("{} - Invalid Data", config.collection_name),
        filename: format!("{}-invalid.bru", sanitize_name(&config.collection_name)),
        seq: seq.take(),
        settings: ItemSettings::default(),
        tags: Vec::new(),
        request: RequestDefinition {
            url: config.api_url.clone(),
            method: config.request_method().to_string(),
            headers: Vec::new(),
            params: Vec::new(),
            body: RequestBody::maybe_json(Some(invalid_body.as_str())),
            script: RequestScript::default(),
            vars: serde_json::json!({}),
            assertions: Vec::new(),
            tests: assertions::negative_script(&config.contract),
            docs: "Negative scenario with invalid data".to_string(),
            auth: RequestAuth::from_spec(config.auth.as_ref()),
        },
    };

    let verify_item = RequestItem {
        item_type: "http".to_string(),
        name: "Verify Failure Recorded".to_string(),
        filename: "verify-failure-recorded.bru".to_string(),
        seq: seq.take(),
        settings: ItemSettings::default(),
        tags: Vec::new(),
        request: RequestDefinition {
            url: format!(
                "{}/failure-data/{{{{{}}}}}",
                MOCK_SERVER_BASE_URL, config.contract.trans_ref_field
            ),
            method: "GET".to_string(),
            headers: Vec::new(),
            params: Vec::new(),
            body: RequestBody::none(),
            script: RequestScript::default(),
            vars: serde_json::json!({}),
            assertions: Vec::new(),
            tests: assertions::verify_failure_script(),
            docs: "Verify failure was recorded in integration failures table".to_string(),
            auth: RequestAuth::inherit(),
        },
    };

    Folder::new(
        "Negative Scenarios",
        "Negative Scenarios",
        3,
        vec![invalid_item, verify_item],
    )
}

/// One declaration per query variable, one per generator, plus the three
/// fixed entries every collection carries.
fn environment_variables(config: &GenerationConfig, now: DateTime<Utc>) -> Vec<EnvironmentVariable> {
    let mut vars = Vec::new();

    for query in &config.db_queries {
        if !query.variable_name.is_empty() {
            vars.push(EnvironmentVariable::text(query.variable_name.clone(), ""));
        }
    }
    for spec in &config.variable_generators {
        vars.push(EnvironmentVariable::text(spec.name.clone(), ""));
    }

    vars.push(EnvironmentVariable::text("baseUrl", MOCK_SERVER_BASE_URL));
    vars.push(EnvironmentVariable::text(
        config.contract.trans_ref_field.clone(),
        "",
    ));
    vars.push(EnvironmentVariable::text(
        "CurrentTransExeDate",
        now.format("%Y-%m-%d").to_string(),
    ));

    vars
}
