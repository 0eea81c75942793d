//! Test script synthesis for the three scenario classes plus custom
//! assertions.
//!
//! Scripts express assertions as independent `test(...)` blocks so one
//! failure never stops the rest of the script from reporting.

use crate::config::{AssertionType, CsvScenario, CustomAssertion, QuerySpec, ResponseContract};
use crate::generators::{GeneratorKind, GeneratorSpec};
use crate::script::{render, JsStmt};

/// Post-response script for a data-preparation query: assert 200, assert a
/// body exists, and stash the VALUE column under the query's variable name.
pub fn data_prep_script(query: &QuerySpec) -> String {
    let stmts = vec![
        JsStmt::Raw("let jsonData = res.getBody();".to_string()),
        test_block(
            "Status code is 200",
            &["expect(res.getStatus()).to.equal(200);"],
        ),
        test_block("Response contains data", &["expect(jsonData).to.exist;"]),
        JsStmt::Comment("Store value in environment variable".to_string()),
        JsStmt::If {
            cond: "jsonData.VALUE".to_string(),
            body: vec![
                JsStmt::Raw(format!(
                    "bru.setEnvVar(\"{}\", jsonData.VALUE);",
                    query.variable_name
                )),
                JsStmt::Raw(format!(
                    "console.log(\"{} stored as:\", jsonData.VALUE);",
                    query.variable_name
                )),
            ],
        },
    ];
    render(&stmts, 0)
}

/// Post-response script for positive scenarios. Captures the transaction
/// reference into `TransRefGUID` before asserting, then checks status,
/// envelope shape, and the success result code.
pub fn positive_script(contract: &ResponseContract) -> String {
    let path = contract.response_path();
    let mut stmts = vec![JsStmt::Raw("let response = res.getBody();".to_string())];
    stmts.extend(trans_ref_capture(contract));
    stmts.push(test_block(
        "Status code is 200",
        &["expect(res.getStatus()).to.equal(200);"],
    ));
    stmts.push(test_block(
        &format!("Response has {} structure", contract.envelope),
        &[
            &format!("expect(response.{}).to.exist;", contract.envelope),
            &format!("expect({}).to.exist;", path),
        ],
    ));
    stmts.push(test_block(
        &format!("{} indicates success", contract.result_field),
        &[
            &format!("expect({}.{}).to.exist;", path, contract.result_field),
            &format!(
                "expect({}.{}.{}).to.eql(\"{}\");",
                path, contract.result_field, contract.result_code_path, contract.success_code
            ),
        ],
    ));
    render(&stmts, 0)
}

/// Post-response script for negative scenarios. The transaction reference
/// may still be present on error paths, so the capture runs first; the
/// status must be one of the accepted failure codes.
pub fn negative_script(contract: &ResponseContract) -> String {
    let path = contract.response_path();
    let mut stmts = vec![JsStmt::Raw("let response = res.getBody();".to_string())];
    stmts.extend(trans_ref_capture(contract));
    stmts.push(test_block(
        "Response indicates error",
        &["expect(res.getStatus()).to.be.oneOf([400, 422, 500]);"],
    ));
    stmts.push(test_block(
        "Error result exists",
        &[&format!(
            "expect({}.{}).to.exist;",
            path, contract.result_field
        )],
    ));
    render(&stmts, 0)
}

fn trans_ref_capture(contract: &ResponseContract) -> Vec<JsStmt> {
    let path = contract.response_path();
    let field = &contract.trans_ref_field;
    vec![
        JsStmt::Comment(format!("Extract and store {}", field)),
        JsStmt::If {
            cond: format!(
                "response.{} && {} && {}.{}",
                contract.envelope, path, path, field
            ),
            body: vec![
                JsStmt::Raw(format!("let transRef = {}.{};", path, field)),
                JsStmt::Raw(format!("bru.setEnvVar(\"{}\", transRef);", field)),
                JsStmt::Raw(format!("console.log(\"{} saved:\", transRef);", field)),
            ],
        },
    ]
}

/// Post-response script for the fixed "verify failure recorded" lookup.
pub fn verify_failure_script() -> String {
    let stmts = vec![
        JsStmt::Comment("Parse the JSON response".to_string()),
        JsStmt::Raw("let responseData = res.getBody();".to_string()),
        test_block(
            "Failure record exists",
            &["expect(responseData).to.be.an('array').that.is.not.empty;"],
        ),
        test_block(
            "Status code is 200",
            &["expect(res.getStatus()).to.equal(200);"],
        ),
    ];
    render(&stmts, 0)
}

/// Post-response script asserting that a generator's pre-request script
/// actually populated the environment.
pub fn generator_probe_script(spec: &GeneratorSpec) -> String {
    let stmts = vec![
        JsStmt::Comment(format!(
            "Variable {} generated in pre-request script",
            spec.name
        )),
        test_block(
            &format!("Variable {} is set", spec.name),
            &[
                &format!("const value = bru.getEnvVar(\"{}\");", spec.name),
                "expect(value).to.exist;",
                &format!("console.log(\"{} value:\", value);", spec.name),
            ],
        ),
    ];
    render(&stmts, 0)
}

/// Compile one custom assertion into its statement list. `jsonPath` is only
/// existence-checked and `header` has no rule yet; both gaps are marked in
/// the emitted script rather than guessed at.
pub fn compile_assertion(assertion: &CustomAssertion) -> Vec<JsStmt> {
    let expected = assertion
        .expected
        .as_ref()
        .map(expected_literal)
        .unwrap_or_else(|| "null".to_string());
    match assertion.assertion_type {
        AssertionType::Status => vec![
            JsStmt::Comment("Status code assertion".to_string()),
            JsStmt::Raw(format!("expect(res.getStatus()).to.equal({});", expected)),
        ],
        AssertionType::ResponseTime => vec![
            JsStmt::Comment("Response time assertion".to_string()),
            JsStmt::Raw(format!(
                "expect(res.getResponseTime()).to.be.below({});",
                expected
            )),
        ],
        AssertionType::JsonPath => vec![
            JsStmt::Comment(format!(
                "JSON path assertion (existence only): {}",
                assertion.description
            )),
            JsStmt::Raw("expect(res.getBody()).to.exist;".to_string()),
        ],
        AssertionType::Body => vec![
            JsStmt::Comment("Response body contains assertion".to_string()),
            JsStmt::Raw(format!(
                "expect(JSON.stringify(res.getBody())).to.include({});",
                expected
            )),
        ],
        AssertionType::Header => vec![JsStmt::Comment(
            "Header assertions are not supported yet".to_string(),
        )],
    }
}

fn expected_literal(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => format!("\"{}\"", s.replace('"', "\\\"")),
        other => other.to_string(),
    }
}

/// Post-response script for a bulk-loaded scenario: the positive-style
/// assertions plus whatever custom assertions the caller configured.
pub fn csv_scenario_script(
    scenario: &CsvScenario,
    contract: &ResponseContract,
    assertions: &[CustomAssertion],
) -> String {
    let mut script = positive_script(contract);
    if !assertions.is_empty() {
        let mut body = Vec::new();
        for assertion in assertions {
            body.extend(compile_assertion(assertion));
        }
        let stmts = vec![test_block_from(
            &format!("{} - custom assertions", scenario.name),
            body,
        )];
        script.push('\n');
        script.push_str(&render(&stmts, 0));
    }
    script
}

/// Pre-request script for one bulk scenario run: every configured generator
/// gets a per-index-unique binding (`name_index`) so a batch never collides
/// with itself.
pub fn unique_variables_script(generators: &[GeneratorSpec], run_index: usize) -> String {
    let mut stmts = vec![JsStmt::Comment(format!(
        "Generate unique variables for scenario {}",
        run_index + 1
    ))];
    let mut uuid_helper_emitted = false;

    for spec in generators {
        let var = format!("{}_{}", spec.name, run_index + 1);
        let expr = match spec.kind {
            GeneratorKind::CorrelationId => {
                if !uuid_helper_emitted {
                    stmts.push(JsStmt::Raw(
                        "function generateUUID() {\n    return 'xxxxxxxx-xxxx-4xxx-yxxx-xxxxxxxxxxxx'.replace(/[xy]/g, function(c) {\n        const r = Math.random() * 16 | 0;\n        const v = c == 'x' ? r : (r & 0x3 | 0x8);\n        return v.toString(16);\n    });\n}"
                            .to_string(),
                    ));
                    uuid_helper_emitted = true;
                }
                "generateUUID()".to_string()
            }
            GeneratorKind::CurrentDate | GeneratorKind::FuturePastDate
            | GeneratorKind::ConditionalDate | GeneratorKind::CurrentDateTime => {
                "new Date().toISOString().split('T')[0]".to_string()
            }
            GeneratorKind::Timestamp => "Date.now().toString()".to_string(),
            GeneratorKind::RandomNumber => "Math.floor(Math.random() * 100000)".to_string(),
            GeneratorKind::RandomString => {
                "Math.random().toString(36).substring(2, 15)".to_string()
            }
            GeneratorKind::Other(_) => continue,
        };
        stmts.push(JsStmt::Raw(format!("const {} = {};", var, expr)));
        stmts.push(JsStmt::Raw(format!(
            "bru.setEnvVar(\"{}\", {});",
            var, var
        )));
    }
    render(&stmts, 0)
}

fn test_block(name: &str, lines: &[&str]) -> JsStmt {
    test_block_from(
        name,
        lines.iter().map(|l| JsStmt::Raw((*l).to_string())).collect(),
    )
}

fn test_block_from(name: &str, body: Vec<JsStmt>) -> JsStmt {
    let mut inner = render(&body, 1);
    if inner.ends_with('\n') {
        inner.pop();
    }
    JsStmt::Raw(format!(
        "test(\"{}\", function () {{\n{}\n}});",
        name, inner
    ))
}
