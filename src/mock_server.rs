//! Mock server synthesis.
//!
//! A `MockServerDefinition` is a structured route list built from the
//! configuration; `render` serializes it into the Express/mssql `app.js`
//! text. The route list exists so tests can assert on structure without
//! parsing generated JavaScript.

use serde_json::json;

use crate::config::{CsvScenario, DbConfig, GenerationConfig};
use crate::generators::{GeneratorKind, GeneratorSpec};
use crate::script::{fragment_stmts, render, RuntimeDialect};

#[derive(Debug, Clone)]
pub struct MockServerDefinition {
    pub db_config: DbConfig,
    pub routes: Vec<RouteDefinition>,
    pub csv_scenarios: Vec<CsvScenario>,
    pub generators: Vec<GeneratorSpec>,
}

#[derive(Debug, Clone)]
pub struct RouteDefinition {
    pub method: String,
    pub path: String,
    pub comment: String,
    pub handler: RouteHandler,
}

#[derive(Debug, Clone)]
pub enum RouteHandler {
    /// Fixed liveness probe.
    HealthCheck,
    /// Executes a templated query against the configured connection and
    /// returns the full row set. Driver failures become a 500 with the
    /// failure message; they never reach the client raw.
    Query { query: String, params: Vec<String> },
    /// Computes one generator value per request, wrapped in a failure
    /// guard that converts any computation error into a structured 500.
    Generator(GeneratorSpec),
    /// Sequential batch execution of all bulk scenarios with a pass/fail
    /// tally; a single scenario failure is recorded, not fatal.
    TestSuiteRunAll,
}

impl MockServerDefinition {
    pub fn from_config(config: &GenerationConfig) -> Self {
        let mut routes = vec![RouteDefinition {
            method: "get".to_string(),
            path: "/health".to_string(),
            comment: "Health check endpoint".to_string(),
            handler: RouteHandler::HealthCheck,
        }];

        for query in &config.db_queries {
            routes.push(RouteDefinition {
                method: query.method.to_lowercase(),
                path: query.endpoint.clone(),
                comment: if query.description.is_empty() {
                    query.name.clone()
                } else {
                    query.description.clone()
                },
                handler: RouteHandler::Query {
                    query: query.query.clone(),
                    params: query.params.clone(),
                },
            });
        }

        for spec in &config.variable_generators {
            routes.push(RouteDefinition {
                method: "get".to_string(),
                path: format!("/generate/{}", spec.name),
                comment: format!("Variable Generator: {} ({})", spec.name, spec.kind.as_str()),
                handler: RouteHandler::Generator(spec.clone()),
            });
        }

        if !config.csv_scenarios.is_empty() {
            routes.push(RouteDefinition {
                method: "post".to_string(),
                path: "/test-suite/run-all".to_string(),
                comment: "Run all CSV scenarios with unique variable values".to_string(),
                handler: RouteHandler::TestSuiteRunAll,
            });
        }

        Self {
            db_config: config.db_config.clone(),
            routes,
            csv_scenarios: config.csv_scenarios.clone(),
            generators: config.variable_generators.clone(),
        }
    }

    /// Serialize the definition into the final app.js text.
    pub fn render(&self) -> String {
        let db_config_json = serde_json::to_string_pretty(&self.db_config)
            .unwrap_or_else(|_| "{}".to_string());

        let mut out = String::new();
        out.push_str("const express = require('express');\n");
        out.push_str("const sql = require('mssql');\n");
        out.push_str("const { v4: uuidv4 } = require('uuid');\n");
        out.push_str("const app = express();\n");
        out.push_str("app.use(express.json());\n\n");
        out.push_str("// Database Configuration\n");
        out.push_str(&format!("const config = {};\n\n", db_config_json));

        for route in &self.routes {
            out.push_str(&self.render_route(route));
            out.push('\n');
        }

        if !self.csv_scenarios.is_empty() {
            out.push_str(&self.render_scenario_runner());
            out.push('\n');
        }

        out.push_str(ERROR_MIDDLEWARE);
        out.push('\n');
        out.push_str(SERVER_STARTUP);
        out
    }

    fn render_route(&self, route: &RouteDefinition) -> String {
        match &route.handler {
            RouteHandler::HealthCheck => format!(
                "// {comment}\napp.{method}('{path}', (req, res) => {{\n    res.json({{ status: 'Server is running', timestamp: new Date().toISOString() }});\n}});\n",
                comment = route.comment,
                method = route.method,
                path = route.path,
            ),
            RouteHandler::Query { query, params } => {
                let extraction: String = params
                    .iter()
                    .map(|p| format!("    const {p}Param = req.params.{p};\n"))
                    .collect();
                let inputs: String = params
                    .iter()
                    .map(|p| format!("            .input('{p}', sql.VarChar, {p}Param)\n"))
                    .collect();
                format!(
                    "// {comment}\napp.{method}('{path}', async (req, res) => {{\n{extraction}\n    const query = `{query}`;\n\n    try {{\n        let pool = await sql.connect(config);\n        const result = await pool.request()\n{inputs}            .query(query);\n\n        res.json(result.recordset);\n    }} catch (err) {{\n        console.error('Database error:', err);\n        res.status(500).json({{ error: err.message }});\n    }}\n}});\n",
                    comment = route.comment,
                    method = route.method,
                    path = route.path,
                    extraction = extraction,
                    inputs = inputs,
                    query = query,
                )
            }
            RouteHandler::Generator(spec) => {
                let fragment = render(&fragment_stmts(spec, &RuntimeDialect), 2);
                format!(
                    "// {comment}\napp.get('{path}', (req, res) => {{\n    try {{\n{fragment}        res.json({{\n            key: '{name}',\n            value: generatedValue,\n            type: '{kind}',\n            timestamp: new Date().toISOString()\n        }});\n    }} catch (error) {{\n        console.error('Error generating {name}:', error);\n        res.status(500).json({{\n            error: 'Failed to generate {name}',\n            timestamp: new Date().toISOString()\n        }});\n    }}\n}});\n",
                    comment = route.comment,
                    path = route.path,
                    fragment = fragment,
                    name = spec.name,
                    kind = spec.kind.as_str(),
                )
            }
            RouteHandler::TestSuiteRunAll => format!(
                "// {comment}\napp.post('{path}', async (req, res) => {{\n    console.log('Starting CSV test suite execution...');\n    const results = [];\n\n    try {{\n        for (let i = 0; i < scenarios.length; i++) {{\n            const result = await runScenarioWithUniqueVariables(scenarios[i], i + 1);\n            results.push(result);\n        }}\n\n        const summary = {{\n            totalScenarios: scenarios.length,\n            passed: results.filter(r => r.status === 'passed').length,\n            failed: results.filter(r => r.status === 'failed').length,\n            results: results,\n            timestamp: new Date().toISOString()\n        }};\n\n        console.log('Test suite completed:', summary);\n        res.json(summary);\n    }} catch (error) {{\n        console.error('Test suite failed:', error);\n        res.status(500).json({{\n            error: 'Test suite execution failed',\n            message: error.message,\n            timestamp: new Date().toISOString()\n        }});\n    }}\n}});\n",
                comment = route.comment,
                path = route.path,
            ),
        }
    }

    /// The scenario data plus the per-run unique-variable logic backing the
    /// test-suite endpoint. Scenario failures are caught and tallied.
    fn render_scenario_runner(&self) -> String {
        let scenarios_json = serde_json::to_string_pretty(
            &self
                .csv_scenarios
                .iter()
                .map(|s| {
                    json!({
                        "name": s.name,
                        "type": s.scenario_type,
                        "requestBody": s.request_body,
                    })
                })
                .collect::<Vec<_>>(),
        )
        .unwrap_or_else(|_| "[]".to_string());

        format!(
            "// CSV scenarios data\nconst scenarios = {scenarios};\n\n// Run one scenario with per-run unique variables\nasync function runScenarioWithUniqueVariables(scenario, scenarioIndex) {{\n    console.log(`Running scenario ${{scenarioIndex}}: ${{scenario.name}}`);\n\n    try {{\n        const uniqueVars = {{}};\n{unique_vars}\n        // Substitute per-run variables into the request body\n        let requestBody = scenario.requestBody;\n        Object.keys(uniqueVars).forEach(varName => {{\n            const pattern = new RegExp(`{{{{${{varName}}_${{scenarioIndex}}}}}}`, 'g');\n            requestBody = requestBody.replace(pattern, uniqueVars[varName]);\n        }});\n\n        // Simulated API call; requests are templated, not executed\n        const startTime = Date.now();\n        const mockResponse = {{\n            status: 200,\n            data: {{ success: true, scenarioIndex, variables: uniqueVars }},\n            responseTime: Date.now() - startTime\n        }};\n\n        return {{\n            scenarioIndex,\n            scenarioName: scenario.name,\n            scenarioType: scenario.type,\n            status: 'passed',\n            responseTime: mockResponse.responseTime,\n            variables: uniqueVars,\n            response: mockResponse.data\n        }};\n    }} catch (error) {{\n        console.error(`Scenario ${{scenarioIndex}} failed:`, error);\n\n        return {{\n            scenarioIndex,\n            scenarioName: scenario.name,\n            scenarioType: scenario.type,\n            status: 'failed',\n            error: error.message,\n            variables: {{}}\n        }};\n    }}\n}}\n",
            scenarios = scenarios_json,
            unique_vars = self.render_unique_variable_logic(),
        )
    }

    fn render_unique_variable_logic(&self) -> String {
        if self.generators.is_empty() {
            return "        // No variable generators configured\n".to_string();
        }
        let mut out = String::new();
        for spec in &self.generators {
            let expr = match spec.kind {
                GeneratorKind::CorrelationId => "uuidv4()",
                GeneratorKind::CurrentDate
                | GeneratorKind::CurrentDateTime
                | GeneratorKind::FuturePastDate
                | GeneratorKind::ConditionalDate => "new Date().toISOString().split('T')[0]",
                GeneratorKind::Timestamp => "Date.now().toString()",
                GeneratorKind::RandomNumber => "Math.floor(Math.random() * 100000)",
                GeneratorKind::RandomString => "Math.random().toString(36).substring(2, 15)",
                GeneratorKind::Other(_) => continue,
            };
            out.push_str(&format!(
                "        uniqueVars['{}'] = {};\n",
                spec.name, expr
            ));
        }
        out
    }
}

const ERROR_MIDDLEWARE: &str = "// Error handling middleware\napp.use((err, req, res, next) => {\n    console.error('Error:', err);\n    res.status(500).json({\n        error: err.message,\n        timestamp: new Date().toISOString()\n    });\n});\n";

const SERVER_STARTUP: &str = "// Start server\nconst PORT = process.env.PORT || 3000;\napp.listen(PORT, () => {\n    console.log(`Server running on port ${PORT}`);\n    console.log(`Database: ${config.database || 'In-Memory Variables'}`);\n    console.log(`Health check: http://localhost:${PORT}/health`);\n});\n";
