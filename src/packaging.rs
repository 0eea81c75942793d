//! Output packaging: the final serialization of the four artifacts.
//!
//! No cross-validation happens here; the artifacts stay consistent because
//! they are all rendered from the same in-memory config in one pass.

use chrono::{DateTime, Utc};
use handlebars::Handlebars;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::assembler;
use crate::config::GenerationConfig;
use crate::error::{GeneratorError, Result};
use crate::mock_server::MockServerDefinition;

/// The four textual artifacts of one generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedArtifacts {
    /// Runnable Express/mssql mock server source.
    pub mock_server: String,
    /// The Bruno collection document, serialized.
    pub collection: String,
    /// npm dependency manifest for the mock server.
    pub manifest: String,
    /// Markdown setup instructions.
    pub instructions: String,
    pub collection_file_name: String,
}

impl GeneratedArtifacts {
    pub const MOCK_SERVER_FILE: &'static str = "app.js";
    pub const MANIFEST_FILE: &'static str = "package.json";
    pub const INSTRUCTIONS_FILE: &'static str = "BRUNO_SETUP_INSTRUCTIONS.md";
}

/// Generate all artifacts using the current wall clock.
pub fn generate(config: &GenerationConfig) -> Result<GeneratedArtifacts> {
    generate_at(config, Utc::now())
}

/// Generate with an explicit clock; tests freeze it.
pub fn generate_at(config: &GenerationConfig, now: DateTime<Utc>) -> Result<GeneratedArtifacts> {
    config.validate()?;

    let document = assembler::assemble_at(config, now);
    let collection = serde_json::to_string_pretty(&document)?;
    let mock_server = MockServerDefinition::from_config(config).render();
    let manifest = serde_json::to_string_pretty(&manifest_json(config))?;
    let instructions = render_instructions(config, now)?;

    Ok(GeneratedArtifacts {
        mock_server,
        collection,
        manifest,
        instructions,
        collection_file_name: format!("{}.json", sanitize_name(&config.collection_name)),
    })
}

/// Exactly the two runtime libraries the mock server needs, plus nodemon
/// for development.
fn manifest_json(config: &GenerationConfig) -> serde_json::Value {
    json!({
        "name": sanitize_name(&config.collection_name).to_lowercase(),
        "version": "1.0.0",
        "description": format!("Automated test suite for {}", config.collection_name),
        "main": "app.js",
        "scripts": {
            "start": "node app.js",
            "dev": "nodemon app.js"
        },
        "dependencies": {
            "express": "^4.18.2",
            "mssql": "^10.0.1"
        },
        "devDependencies": {
            "nodemon": "^3.0.1"
        }
    })
}

const INSTRUCTIONS_TEMPLATE: &str = r#"# Bruno Collection Setup Instructions
{{#if integrationPoint}}
**Integration Point**: {{integrationPoint}}
{{/if}}

## Generated Files

- **app.js** - Mock database server with all endpoints
- **{{collectionFile}}** - Bruno collection
- **package.json** - Dependencies configuration
- **This guide** - Setup instructions

## Setup Steps

### 1. Install dependencies

```
npm install
```

### 2. Start the mock server

```
node app.js
```

You should see the server come up on port 3000 with a health check at
`http://localhost:3000/health`.

### 3. Import the collection into Bruno

1. Open Bruno
2. Click "Import Collection"
3. Select `{{collectionFile}}`

## Collection Structure

### 1. Data Preparation
{{#each queries}}
- {{this.name}}: {{this.description}}
{{/each}}

### 2. Positive Scenarios
- Success tests with valid data

### 3. Negative Scenarios
- Invalid data test
- Failure verification

## Database Endpoints

{{#each queries}}
### {{this.name}}
- **Endpoint**: `{{this.method}} http://localhost:3000{{this.endpoint}}`
- **Description**: {{this.description}}

{{/each}}
## Environment Variables

The collection uses these variables (auto-populated at run time):

{{#each variables}}
- **{{this}}**
{{/each}}

## Testing Flow

1. Run Data Preparation to fetch test data and generate variables
2. Run Positive Scenarios to exercise valid API calls
3. Run Negative Scenarios to exercise error handling

---
Generated by brunogen on {{generatedAt}}
"#;

fn render_instructions(config: &GenerationConfig, now: DateTime<Utc>) -> Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars
        .register_template_string("instructions", INSTRUCTIONS_TEMPLATE)
        .map_err(|e| GeneratorError::Template(e.to_string()))?;

    let mut variables: Vec<String> = config
        .db_queries
        .iter()
        .filter(|q| !q.variable_name.is_empty())
        .map(|q| q.variable_name.clone())
        .chain(config.variable_generators.iter().map(|g| g.name.clone()))
        .collect();
    variables.push("baseUrl".to_string());
    variables.push(config.contract.trans_ref_field.clone());
    variables.push("CurrentTransExeDate".to_string());

    let data = json!({
        "collectionFile": format!("{}.json", sanitize_name(&config.collection_name)),
        "integrationPoint": config.integration_point,
        "queries": config.db_queries.iter().map(|q| json!({
            "name": q.name,
            "endpoint": q.endpoint,
            "method": q.method,
            "description": if q.description.is_empty() {
                "Database query endpoint".to_string()
            } else {
                q.description.clone()
            },
        })).collect::<Vec<_>>(),
        "variables": variables,
        "generatedAt": now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
    });

    handlebars
        .render("instructions", &data)
        .map_err(|e| GeneratorError::Template(e.to_string()))
}

/// Replace filename-hostile characters and collapse runs of dashes, the
/// same way collection and .bru filenames are derived everywhere.
pub fn sanitize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            out.push(c);
            last_dash = c == '-';
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_and_collapses() {
        assert_eq!(sanitize_name("Get Customer Summary"), "Get-Customer-Summary");
        assert_eq!(sanitize_name("a/b\\c"), "a-b-c");
        assert_eq!(sanitize_name("a  ::  b"), "a-b");
        assert_eq!(sanitize_name("already_fine-name"), "already_fine-name");
    }

    #[test]
    fn manifest_lists_exactly_the_two_runtime_deps() {
        let config = GenerationConfig::new("My Collection");
        let manifest = manifest_json(&config);
        let deps = manifest["dependencies"].as_object().unwrap();
        assert_eq!(deps.len(), 2);
        assert!(deps.contains_key("express"));
        assert!(deps.contains_key("mssql"));
        assert_eq!(manifest["name"], "my-collection");
    }
}
