//! End-to-end assembly tests over the collection document.

use brunogen::config::{CsvScenario, GenerationConfig, QuerySpec, Scenario};
use brunogen::generators::{GeneratorKind, GeneratorSpec};
use brunogen::{assemble, assemble_at};
use chrono::{TimeZone, Utc};
use serde_json::json;

fn full_config() -> GenerationConfig {
    let mut config = GenerationConfig::new("Customer Summary");
    config.api_url = "https://api.example.com/tx".to_string();
    config.request_payload = Some(json!({
        "TXLife": {
            "TXLifeRequest": {
                "TransRefGUID": "abc-123",
                "TransType": {"@tc": "228"}
            }
        }
    }));
    config.db_queries = vec![
        QuerySpec {
            name: "Get Client".to_string(),
            endpoint: "/client-data".to_string(),
            method: "GET".to_string(),
            query: "SELECT TOP 1 ClientID AS VALUE, 'clientId' AS KEY FROM Clients".to_string(),
            params: vec![],
            variable_name: "clientId".to_string(),
            body: None,
            description: "Fetch a live client id".to_string(),
        },
        QuerySpec {
            name: "Get Policy".to_string(),
            endpoint: "/policy-data".to_string(),
            method: "GET".to_string(),
            query: "SELECT TOP 1 PolicyID AS VALUE, 'policyId' AS KEY FROM Policies".to_string(),
            params: vec![],
            variable_name: "policyId".to_string(),
            body: None,
            description: String::new(),
        },
    ];
    config.variable_generators = vec![
        GeneratorSpec::new("correlationId", GeneratorKind::CorrelationId),
        GeneratorSpec::new("effectiveDate", GeneratorKind::CurrentDate).with_format("yyyy-MM-dd"),
        GeneratorSpec::new("backDate", GeneratorKind::FuturePastDate),
    ];
    config.scenarios = vec![Scenario {
        name: "Fetch summary for known client".to_string(),
        url: "https://api.example.com/clients/{{clientId}}/summary".to_string(),
        method: "GET".to_string(),
        request_body: None,
    }];
    config.csv_scenarios = vec![CsvScenario {
        name: "Bulk Quote".to_string(),
        scenario_type: "POST".to_string(),
        request_body: r#"{"quoteId": "{{correlationId}}"}"#.to_string(),
    }];
    config
}

#[test]
fn document_has_the_three_fixed_folders_in_order() {
    let doc = assemble(&full_config());
    let names: Vec<&str> = doc.items.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        names,
        ["DataPreparation", "Positive Scenarios", "Negative Scenarios"]
    );
    let seqs: Vec<u32> = doc.items.iter().map(|f| f.seq).collect();
    assert_eq!(seqs, [1, 2, 3]);
}

#[test]
fn data_preparation_numbers_queries_then_generators_without_gaps() {
    let config = full_config();
    let doc = assemble(&config);

    let data_prep = &doc.items[0];
    let expected = config.db_queries.len() + config.variable_generators.len();
    assert_eq!(data_prep.items.len(), expected);

    let seqs: Vec<u32> = data_prep.items.iter().map(|i| i.seq).collect();
    assert_eq!(seqs, (1..=expected as u32).collect::<Vec<_>>());

    // Queries come first, generator probes after.
    assert_eq!(data_prep.items[0].name, "Get Client");
    assert_eq!(data_prep.items[1].name, "Get Policy");
    assert_eq!(data_prep.items[2].name, "Generate correlationId");

    // Each folder restarts numbering from 1.
    assert_eq!(doc.items[1].items[0].seq, 1);
    assert_eq!(doc.items[2].items[0].seq, 1);
}

#[test]
fn query_items_target_the_mock_server_and_bind_their_variable() {
    let doc = assemble(&full_config());
    let item = &doc.items[0].items[0];

    assert_eq!(item.request.url, "http://localhost:3000/client-data");
    assert_eq!(item.request.method, "GET");
    assert!(item.request.tests.contains("clientId"));
    assert!(item.request.tests.contains("bru.setEnvVar"));
}

#[test]
fn generator_probes_carry_embedded_prerequest_scripts() {
    let doc = assemble(&full_config());
    let probe = &doc.items[0].items[2];

    assert_eq!(probe.request.url, "{{baseUrl}}/health");
    let script = probe.request.script.prerequest.as_deref().unwrap();
    // Embedded dialect: local UUID helper, no runtime library calls.
    assert!(script.contains("function generateUUID"));
    assert!(!script.contains("uuidv4()"));
    assert!(script.contains("bru.setEnvVar(\"correlationId\", generatedValue);"));
}

#[test]
fn positive_scenarios_keep_placeholders_and_scenario_auth() {
    let mut config = full_config();
    config.auth = Some(brunogen::AuthSpec::Basic {
        username: "CLIENTUSER".to_string(),
        password: "secret".to_string(),
    });
    let doc = assemble(&config);

    let manual = &doc.items[1].items[0];
    assert_eq!(
        manual.request.url,
        "https://api.example.com/clients/{{clientId}}/summary"
    );
    assert_eq!(manual.request.auth.mode, "basic");

    let bulk = &doc.items[1].items[1];
    assert_eq!(bulk.request.url, "{{baseUrl}}/api/bulk-quote");
    assert_eq!(bulk.request.method, "POST");
    // Bulk runs suffix every generated variable with the 1-based run index.
    let pre = bulk.request.script.prerequest.as_deref().unwrap();
    assert!(pre.contains("correlationId_1"));
}

#[test]
fn negative_folder_has_corruption_then_verification() {
    let config = full_config();
    let doc = assemble(&config);
    let negative = &doc.items[2];

    assert_eq!(negative.items.len(), 2);
    let invalid = &negative.items[0];
    assert_eq!(invalid.name, "Customer Summary - Invalid Data");
    assert_eq!(invalid.request.method, "POST");
    assert!(invalid.request.body.json.contains("\"INVALID_ID\""));
    // The original payload's sibling fields survive the mutation.
    assert!(invalid.request.body.json.contains("\"228\""));

    let verify = &negative.items[1];
    assert_eq!(
        verify.request.url,
        "http://localhost:3000/failure-data/{{TransRefGUID}}"
    );
    assert_eq!(verify.request.method, "GET");
}

#[test]
fn environment_declares_every_runtime_variable() {
    let now = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
    let doc = assemble_at(&full_config(), now);

    assert_eq!(doc.environments.len(), 1);
    let env = &doc.environments[0];
    assert_eq!(env.name, "DEV");

    let names: Vec<&str> = env.variables.iter().map(|v| v.name.as_str()).collect();
    for expected in [
        "clientId",
        "policyId",
        "correlationId",
        "effectiveDate",
        "backDate",
        "baseUrl",
        "TransRefGUID",
        "CurrentTransExeDate",
    ] {
        assert!(names.contains(&expected), "missing variable {}", expected);
    }

    let exe_date = env
        .variables
        .iter()
        .find(|v| v.name == "CurrentTransExeDate")
        .unwrap();
    assert_eq!(exe_date.value, "2026-03-15");

    let base_url = env.variables.iter().find(|v| v.name == "baseUrl").unwrap();
    assert_eq!(base_url.value, "http://localhost:3000");
}

#[test]
fn assembly_is_deterministic_under_a_frozen_clock() {
    let config = full_config();
    let now = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();

    let mut first = serde_json::to_value(assemble_at(&config, now)).unwrap();
    let mut second = serde_json::to_value(assemble_at(&config, now)).unwrap();

    // The environment uid is the only per-call random value.
    first["activeEnvironmentUid"] = json!(null);
    second["activeEnvironmentUid"] = json!(null);
    assert_eq!(first, second);
}

#[test]
fn minimal_config_still_produces_a_complete_document() {
    let doc = assemble(&GenerationConfig::new("Empty"));
    assert_eq!(doc.items.len(), 3);
    assert!(doc.items[0].items.is_empty());
    assert!(doc.items[1].items.is_empty());
    // Negative scenarios exist even with no payload to corrupt.
    assert_eq!(doc.items[2].items.len(), 2);
    assert_eq!(doc.items[2].items[0].request.body.mode, "none");
}
