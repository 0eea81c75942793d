//! JavaScript fragment synthesis for variable generators.
//!
//! The value arithmetic lives in one place: `computation` builds a statement
//! list per generator kind, and a [`ScriptDialect`] decides how the result
//! is bound. The runtime dialect leaves `generatedValue` in scope for the
//! surrounding Express handler; the embedded dialect writes it into the
//! Bruno environment. Both must compute the identical value for identical
//! parameters.

use crate::generators::{
    GeneratorKind, GeneratorSpec, UNKNOWN_KIND_SENTINEL, UNSUPPORTED_CONDITION_SENTINEL,
};

/// Minimal JavaScript statement representation. Expressions stay as text;
/// the structure exists so ordering and nesting can be inspected in tests
/// without parsing rendered output.
#[derive(Debug, Clone, PartialEq)]
pub enum JsStmt {
    Comment(String),
    Raw(String),
    If { cond: String, body: Vec<JsStmt> },
    For { head: String, body: Vec<JsStmt> },
    Switch {
        scrutinee: String,
        arms: Vec<(String, Vec<JsStmt>)>,
        default: Vec<JsStmt>,
    },
}

/// Render a statement list with the given indent depth (4 spaces per level).
pub fn render(stmts: &[JsStmt], depth: usize) -> String {
    let mut out = String::new();
    render_into(stmts, depth, &mut out);
    out
}

fn render_into(stmts: &[JsStmt], depth: usize, out: &mut String) {
    let pad = "    ".repeat(depth);
    for stmt in stmts {
        match stmt {
            JsStmt::Comment(text) => {
                for line in text.lines() {
                    out.push_str(&format!("{}// {}\n", pad, line));
                }
            }
            JsStmt::Raw(line) => {
                for l in line.lines() {
                    out.push_str(&format!("{}{}\n", pad, l));
                }
            }
            JsStmt::If { cond, body } => {
                out.push_str(&format!("{}if ({}) {{\n", pad, cond));
                render_into(body, depth + 1, out);
                out.push_str(&format!("{}}}\n", pad));
            }
            JsStmt::For { head, body } => {
                out.push_str(&format!("{}for ({}) {{\n", pad, head));
                render_into(body, depth + 1, out);
                out.push_str(&format!("{}}}\n", pad));
            }
            JsStmt::Switch {
                scrutinee,
                arms,
                default,
            } => {
                out.push_str(&format!("{}switch ({}) {{\n", pad, scrutinee));
                for (case, body) in arms {
                    out.push_str(&format!("{}    case {}:\n", pad, case));
                    render_into(body, depth + 2, out);
                    out.push_str(&format!("{}        break;\n", pad));
                }
                out.push_str(&format!("{}    default:\n", pad));
                render_into(default, depth + 2, out);
                out.push_str(&format!("{}}}\n", pad));
            }
        }
    }
}

/// How a dialect binds the computed `generatedValue`.
pub trait ScriptDialect {
    /// Expression producing a fresh v4 UUID in this dialect.
    fn uuid_expr(&self) -> &'static str;

    /// Statements emitted before the computation (helper definitions).
    fn prelude(&self, spec: &GeneratorSpec) -> Vec<JsStmt>;

    /// Statements emitted after `generatedValue` is computed.
    fn bind_result(&self, spec: &GeneratorSpec) -> Vec<JsStmt>;
}

/// Dialect for the generated mock server routes. The server's `app.js`
/// requires `uuid` at the top, and the route handler consumes
/// `generatedValue` directly, so no binding statements are needed.
pub struct RuntimeDialect;

impl ScriptDialect for RuntimeDialect {
    fn uuid_expr(&self) -> &'static str {
        "uuidv4()"
    }

    fn prelude(&self, _spec: &GeneratorSpec) -> Vec<JsStmt> {
        Vec::new()
    }

    fn bind_result(&self, _spec: &GeneratorSpec) -> Vec<JsStmt> {
        Vec::new()
    }
}

/// Dialect for pre-request scripts embedded in the collection document.
/// Results are stored into the Bruno environment; correlation ids relocate
/// the previous value into `prevCorrelationId` before overwriting.
pub struct EmbeddedDialect;

const UUID_HELPER: &str = r#"function generateUUID() {
    return 'xxxxxxxx-xxxx-4xxx-yxxx-xxxxxxxxxxxx'.replace(/[xy]/g, function(c) {
        const r = Math.random() * 16 | 0;
        const v = c == 'x' ? r : (r & 0x3 | 0x8);
        return v.toString(16);
    });
}"#;

impl ScriptDialect for EmbeddedDialect {
    fn uuid_expr(&self) -> &'static str {
        "generateUUID()"
    }

    fn prelude(&self, spec: &GeneratorSpec) -> Vec<JsStmt> {
        let mut stmts = vec![JsStmt::Comment(describe(spec))];
        if spec.kind == GeneratorKind::CorrelationId {
            stmts.push(JsStmt::Raw(UUID_HELPER.to_string()));
        }
        stmts
    }

    fn bind_result(&self, spec: &GeneratorSpec) -> Vec<JsStmt> {
        let mut stmts = Vec::new();
        if spec.kind == GeneratorKind::CorrelationId {
            // Read-before-write: capture the old id before it is replaced.
            stmts.push(JsStmt::Comment(
                "Relocate the previous correlation id before overwriting".to_string(),
            ));
            stmts.push(JsStmt::Raw(format!(
                "const prevCorrelationId = bru.getEnvVar(\"{}\");",
                spec.name
            )));
            stmts.push(JsStmt::If {
                cond: "prevCorrelationId".to_string(),
                body: vec![JsStmt::Raw(
                    "bru.setEnvVar(\"prevCorrelationId\", prevCorrelationId);".to_string(),
                )],
            });
        }
        stmts.push(JsStmt::Raw(format!(
            "bru.setEnvVar(\"{}\", generatedValue);",
            spec.name
        )));
        stmts.push(JsStmt::Raw(format!(
            "console.log('Generated {}:', generatedValue);",
            spec.name
        )));
        stmts
    }
}

fn describe(spec: &GeneratorSpec) -> String {
    match &spec.kind {
        GeneratorKind::CurrentDate => format!(
            "Generate current date in {} format",
            spec.format.as_deref().unwrap_or("MMddyyyy")
        ),
        GeneratorKind::CurrentDateTime => format!(
            "Generate current date and time in {} format",
            spec.format.as_deref().unwrap_or("yyyy-MM-dd HH:mm:ss")
        ),
        GeneratorKind::FuturePastDate => {
            format!("Generate date with {} days offset", spec.offset_days())
        }
        GeneratorKind::ConditionalDate => "Generate conditional date".to_string(),
        GeneratorKind::CorrelationId => "Generate correlation ID (UUID v4)".to_string(),
        GeneratorKind::RandomNumber => {
            let (min, max) = spec.random_range();
            format!("Generate random number between {} and {}", min, max)
        }
        GeneratorKind::RandomString => {
            format!("Generate random string ({} characters)", spec.string_length())
        }
        GeneratorKind::Timestamp => format!(
            "Generate {} timestamp",
            spec.format.as_deref().unwrap_or("iso")
        ),
        GeneratorKind::Other(name) => format!("Unknown generator type: {}", name),
    }
}

/// Synthesize the full fragment for one generator in one dialect.
pub fn synthesize_fragment(spec: &GeneratorSpec, dialect: &dyn ScriptDialect) -> String {
    let mut stmts = dialect.prelude(spec);
    stmts.extend(computation(spec, dialect));
    stmts.extend(dialect.bind_result(spec));
    render(&stmts, 0)
}

/// Statement list in IR form, for callers that embed the fragment at a
/// deeper indent (the mock server route bodies).
pub fn fragment_stmts(spec: &GeneratorSpec, dialect: &dyn ScriptDialect) -> Vec<JsStmt> {
    let mut stmts = dialect.prelude(spec);
    stmts.extend(computation(spec, dialect));
    stmts.extend(dialect.bind_result(spec));
    stmts
}

/// The shared value arithmetic. Only the UUID expression differs between
/// dialects; everything else must be textually identical so the dialects
/// cannot drift apart.
fn computation(spec: &GeneratorSpec, dialect: &dyn ScriptDialect) -> Vec<JsStmt> {
    match &spec.kind {
        GeneratorKind::CurrentDate => date_switch(
            spec.format.as_deref().unwrap_or("MMddyyyy"),
            &[
                (
                    "'MMddyyyy'",
                    "generatedValue = (date.getMonth() + 1).toString().padStart(2, '0') +\n    date.getDate().toString().padStart(2, '0') +\n    date.getFullYear().toString();",
                ),
                (
                    "'yyyy-MM-dd'",
                    "generatedValue = date.getFullYear() + '-' +\n    (date.getMonth() + 1).toString().padStart(2, '0') + '-' +\n    date.getDate().toString().padStart(2, '0');",
                ),
                (
                    "'dd/MM/yyyy'",
                    "generatedValue = date.getDate().toString().padStart(2, '0') + '/' +\n    (date.getMonth() + 1).toString().padStart(2, '0') + '/' +\n    date.getFullYear();",
                ),
                (
                    "'yyyyMMdd'",
                    "generatedValue = date.getFullYear().toString() +\n    (date.getMonth() + 1).toString().padStart(2, '0') +\n    date.getDate().toString().padStart(2, '0');",
                ),
            ],
            "generatedValue = date.toISOString().split('T')[0];",
            None,
        ),
        GeneratorKind::CurrentDateTime => date_switch(
            spec.format.as_deref().unwrap_or("yyyy-MM-dd HH:mm:ss"),
            &[
                (
                    "'yyyy-MM-dd HH:mm:ss'",
                    "generatedValue = date.getFullYear() + '-' +\n    (date.getMonth() + 1).toString().padStart(2, '0') + '-' +\n    date.getDate().toString().padStart(2, '0') + ' ' +\n    date.getHours().toString().padStart(2, '0') + ':' +\n    date.getMinutes().toString().padStart(2, '0') + ':' +\n    date.getSeconds().toString().padStart(2, '0');",
                ),
                (
                    "'yyyy-MM-dd\\'T\\'HH:mm:ss'",
                    "generatedValue = date.toISOString().slice(0, 19);",
                ),
            ],
            "generatedValue = date.toISOString().slice(0, 19).replace('T', ' ');",
            None,
        ),
        GeneratorKind::FuturePastDate => date_switch(
            spec.format.as_deref().unwrap_or("yyyy-MM-dd"),
            &[
                (
                    "'yyyy-MM-dd'",
                    "generatedValue = date.getFullYear() + '-' +\n    (date.getMonth() + 1).toString().padStart(2, '0') + '-' +\n    date.getDate().toString().padStart(2, '0');",
                ),
                (
                    "'MMddyyyy'",
                    "generatedValue = (date.getMonth() + 1).toString().padStart(2, '0') +\n    date.getDate().toString().padStart(2, '0') +\n    date.getFullYear().toString();",
                ),
            ],
            "generatedValue = date.toISOString().split('T')[0];",
            Some(spec.offset_days()),
        ),
        GeneratorKind::ConditionalDate => match spec.condition.as_deref() {
            Some("endOfMonth") => vec![
                JsStmt::Raw("const date = new Date();".to_string()),
                JsStmt::If {
                    cond: "date.getDate() >= 28".to_string(),
                    body: vec![JsStmt::Raw("date.setDate(date.getDate() - 3);".to_string())],
                },
                JsStmt::Raw(
                    "let generatedValue = date.getFullYear() + '-' +\n    (date.getMonth() + 1).toString().padStart(2, '0') + '-' +\n    date.getDate().toString().padStart(2, '0');"
                        .to_string(),
                ),
            ],
            other => vec![
                JsStmt::Comment(format!(
                    "No synthesis rule for condition '{}'",
                    other.unwrap_or("<none>")
                )),
                JsStmt::Raw(format!(
                    "const generatedValue = '{}';",
                    UNSUPPORTED_CONDITION_SENTINEL
                )),
            ],
        },
        GeneratorKind::CorrelationId => {
            let mut stmts = vec![JsStmt::Raw(format!(
                "let generatedValue = {};",
                dialect.uuid_expr()
            ))];
            match spec.format.as_deref() {
                Some("compact") => stmts.push(JsStmt::Raw(
                    "generatedValue = generatedValue.replace(/-/g, '');".to_string(),
                )),
                Some("short") => stmts.push(JsStmt::Raw(
                    "generatedValue = generatedValue.replace(/-/g, '').substring(0, 8);"
                        .to_string(),
                )),
                _ => {}
            }
            stmts
        }
        GeneratorKind::RandomNumber => {
            let (min, max) = spec.random_range();
            vec![
                JsStmt::Raw(format!("const min = {};", min)),
                JsStmt::Raw(format!("const max = {};", max)),
                JsStmt::Raw(
                    "const generatedValue = min + Math.floor(Math.random() * (max - min + 1));"
                        .to_string(),
                ),
            ]
        }
        GeneratorKind::RandomString => vec![
            JsStmt::Raw(format!("const characters = '{}';", spec.charset_chars())),
            JsStmt::Raw("let generatedValue = '';".to_string()),
            JsStmt::For {
                head: format!("let i = 0; i < {}; i++", spec.string_length()),
                body: vec![JsStmt::Raw(
                    "generatedValue += characters.charAt(Math.floor(Math.random() * characters.length));"
                        .to_string(),
                )],
            },
        ],
        GeneratorKind::Timestamp => match spec.format.as_deref() {
            Some("unix") => vec![JsStmt::Raw(
                "const generatedValue = Math.floor(Date.now() / 1000).toString();".to_string(),
            )],
            Some("unixMs") => vec![JsStmt::Raw(
                "const generatedValue = Date.now().toString();".to_string(),
            )],
            _ => vec![JsStmt::Raw(
                "const generatedValue = new Date().toISOString();".to_string(),
            )],
        },
        GeneratorKind::Other(name) => vec![
            JsStmt::Comment(format!("Unknown generator type: {}", name)),
            JsStmt::Raw(format!(
                "const generatedValue = '{}';",
                UNKNOWN_KIND_SENTINEL
            )),
        ],
    }
}

fn date_switch(
    format: &str,
    arms: &[(&str, &str)],
    default: &str,
    offset_days: Option<i64>,
) -> Vec<JsStmt> {
    let mut stmts = vec![JsStmt::Raw("const date = new Date();".to_string())];
    if let Some(days) = offset_days {
        stmts.push(JsStmt::Raw(format!(
            "date.setDate(date.getDate() + {});",
            days
        )));
    }
    stmts.push(JsStmt::Raw("let generatedValue;".to_string()));
    stmts.push(JsStmt::Switch {
        scrutinee: format!("'{}'", format.replace('\'', "\\'")),
        arms: arms
            .iter()
            .map(|(case, body)| ((*case).to_string(), vec![JsStmt::Raw((*body).to_string())]))
            .collect(),
        default: vec![JsStmt::Raw(default.to_string())],
    });
    stmts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_correlation_reads_before_overwriting() {
        let spec = GeneratorSpec::new("correlationId", GeneratorKind::CorrelationId);
        let script = synthesize_fragment(&spec, &EmbeddedDialect);

        let read = script
            .find("bru.getEnvVar(\"correlationId\")")
            .expect("previous id must be read");
        let relocate = script
            .find("bru.setEnvVar(\"prevCorrelationId\"")
            .expect("previous id must be relocated");
        let write = script
            .find("bru.setEnvVar(\"correlationId\", generatedValue)")
            .expect("new id must be stored");
        assert!(read < relocate, "read must come before relocation");
        assert!(relocate < write, "relocation must come before overwrite");
    }

    #[test]
    fn runtime_dialect_leaves_value_local() {
        let spec = GeneratorSpec::new("corr", GeneratorKind::CorrelationId);
        let script = synthesize_fragment(&spec, &RuntimeDialect);
        assert!(script.contains("uuidv4()"));
        assert!(!script.contains("bru.setEnvVar"));
    }

    #[test]
    fn dialects_share_the_date_arithmetic() {
        let spec =
            GeneratorSpec::new("d", GeneratorKind::CurrentDate).with_format("yyyy-MM-dd");
        let runtime = render(&computation(&spec, &RuntimeDialect), 0);
        let embedded = render(&computation(&spec, &EmbeddedDialect), 0);
        assert_eq!(runtime, embedded);
    }

    #[test]
    fn correlation_formats_transform_the_value() {
        let mut spec = GeneratorSpec::new("c", GeneratorKind::CorrelationId);
        spec.format = Some("compact".into());
        let script = synthesize_fragment(&spec, &EmbeddedDialect);
        assert!(script.contains("replace(/-/g, '')"));
        assert!(!script.contains("substring"));

        spec.format = Some("short".into());
        let script = synthesize_fragment(&spec, &EmbeddedDialect);
        assert!(script.contains("substring(0, 8)"));
    }

    #[test]
    fn unknown_kind_emits_sentinel_without_failing() {
        let spec = GeneratorSpec::new("x", GeneratorKind::Other("mystery".into()));
        for dialect in [&RuntimeDialect as &dyn ScriptDialect, &EmbeddedDialect] {
            let script = synthesize_fragment(&spec, dialect);
            assert!(script.contains(UNKNOWN_KIND_SENTINEL));
            assert!(script.contains("Unknown generator type: mystery"));
        }
    }

    #[test]
    fn unsupported_condition_emits_gap_marker() {
        let mut spec = GeneratorSpec::new("w", GeneratorKind::ConditionalDate);
        spec.condition = Some("weekday".into());
        let script = synthesize_fragment(&spec, &EmbeddedDialect);
        assert!(script.contains(UNSUPPORTED_CONDITION_SENTINEL));
        assert!(script.contains("No synthesis rule for condition 'weekday'"));
    }

    #[test]
    fn embedded_fragment_stores_under_spec_name() {
        let spec = GeneratorSpec::new("TransExeDate", GeneratorKind::CurrentDate);
        let script = synthesize_fragment(&spec, &EmbeddedDialect);
        assert!(script.contains("bru.setEnvVar(\"TransExeDate\", generatedValue);"));
    }

    #[test]
    fn switch_renderer_breaks_every_arm() {
        let spec =
            GeneratorSpec::new("d", GeneratorKind::CurrentDate).with_format("yyyyMMdd");
        let script = synthesize_fragment(&spec, &RuntimeDialect);
        assert_eq!(script.matches("break;").count(), 4);
        assert!(script.contains("switch ('yyyyMMdd')"));
        assert!(script.contains("default:"));
    }
}
