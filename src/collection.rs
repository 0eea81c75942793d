//! Bruno collection document model.
//!
//! Mirrors the JSON shape Bruno imports: a root document with folders,
//! request items, environment definitions, and per-request auth overrides.
//! Constructed once per generation call and never mutated after assembly.

use serde::{Deserialize, Serialize};

use crate::config::AuthSpec;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionDocument {
    pub name: String,
    pub version: String,
    pub items: Vec<Folder>,
    pub active_environment_uid: String,
    pub environments: Vec<Environment>,
    pub bruno_config: BrunoConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrunoConfig {
    pub version: String,
    pub name: String,
    #[serde(rename = "type")]
    pub config_type: String,
    pub ignore: Vec<String>,
}

impl BrunoConfig {
    pub fn for_collection(name: &str) -> Self {
        Self {
            version: "1".to_string(),
            name: name.to_string(),
            config_type: "collection".to_string(),
            ignore: vec!["node_modules".to_string(), ".git".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Environment {
    pub variables: Vec<EnvironmentVariable>,
    pub name: String,
}

/// A named, run-scoped key/value slot scripts read and write to pass data
/// between requests within one execution session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentVariable {
    pub name: String,
    pub value: String,
    pub secret: bool,
    pub enabled: bool,
    #[serde(rename = "type")]
    pub var_type: String,
}

impl EnvironmentVariable {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            secret: false,
            enabled: true,
            var_type: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Folder {
    #[serde(rename = "type")]
    pub item_type: String,
    pub name: String,
    pub filename: String,
    pub seq: u32,
    pub root: FolderRoot,
    pub items: Vec<RequestItem>,
}

impl Folder {
    pub fn new(name: &str, filename: &str, seq: u32, items: Vec<RequestItem>) -> Self {
        Self {
            item_type: "folder".to_string(),
            name: name.to_string(),
            filename: filename.to_string(),
            seq,
            root: FolderRoot {
                request: FolderRootRequest {
                    auth: RequestAuth::inherit(),
                },
                meta: FolderMeta {
                    name: name.to_string(),
                    seq,
                },
            },
            items,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderRoot {
    pub request: FolderRootRequest,
    pub meta: FolderMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderRootRequest {
    pub auth: RequestAuth,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderMeta {
    pub name: String,
    pub seq: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestItem {
    #[serde(rename = "type")]
    pub item_type: String,
    pub name: String,
    pub filename: String,
    /// 1-based, unique within the folder; determines display and execution
    /// order.
    pub seq: u32,
    pub settings: ItemSettings,
    pub tags: Vec<String>,
    pub request: RequestDefinition,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSettings {
    pub encode_url: bool,
    pub timeout: u64,
}

impl Default for ItemSettings {
    fn default() -> Self {
        Self {
            encode_url: true,
            timeout: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestDefinition {
    pub url: String,
    pub method: String,
    pub headers: Vec<serde_json::Value>,
    pub params: Vec<serde_json::Value>,
    pub body: RequestBody,
    pub script: RequestScript,
    pub vars: serde_json::Value,
    pub assertions: Vec<serde_json::Value>,
    /// Post-response test script.
    pub tests: String,
    /// Free-form documentation shown in Bruno's docs pane.
    pub docs: String,
    pub auth: RequestAuth,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
    pub mode: String,
    pub json: String,
    pub form_url_encoded: Vec<serde_json::Value>,
    pub multipart_form: Vec<serde_json::Value>,
    pub file: Vec<serde_json::Value>,
}

impl RequestBody {
    pub fn none() -> Self {
        Self {
            mode: "none".to_string(),
            json: String::new(),
            form_url_encoded: Vec::new(),
            multipart_form: Vec::new(),
            file: Vec::new(),
        }
    }

    pub fn json(content: impl Into<String>) -> Self {
        Self {
            mode: "json".to_string(),
            json: content.into(),
            ..Self::none()
        }
    }

    /// json mode when content is present, none otherwise.
    pub fn maybe_json(content: Option<&str>) -> Self {
        match content {
            Some(text) if !text.trim().is_empty() => Self::json(text),
            _ => Self::none(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestScript {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prerequest: Option<String>,
}

impl RequestScript {
    pub fn pre(script: impl Into<String>) -> Self {
        Self {
            prerequest: Some(script.into()),
        }
    }
}

/// Per-request authentication. Defaults to inheriting from the collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestAuth {
    pub mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basic: Option<BasicCredentials>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bearer: Option<BearerCredentials>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BearerCredentials {
    pub token: String,
}

impl RequestAuth {
    pub fn inherit() -> Self {
        Self {
            mode: "inherit".to_string(),
            basic: None,
            bearer: None,
        }
    }

    pub fn none() -> Self {
        Self {
            mode: "none".to_string(),
            basic: None,
            bearer: None,
        }
    }

    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            mode: "basic".to_string(),
            basic: Some(BasicCredentials {
                username: username.into(),
                password: password.into(),
            }),
            bearer: None,
        }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            mode: "bearer".to_string(),
            basic: None,
            bearer: Some(BearerCredentials {
                token: token.into(),
            }),
        }
    }

    /// Scenario-level auth from the top-level config; absent auth means
    /// "none" rather than inherit, matching how scenarios override the
    /// collection default.
    pub fn from_spec(spec: Option<&AuthSpec>) -> Self {
        match spec {
            Some(AuthSpec::Basic { username, password }) => Self::basic(username, password),
            Some(AuthSpec::Bearer { token }) => Self::bearer(token),
            Some(AuthSpec::None) | None => Self::none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_serializes_only_active_mode() {
        let auth = RequestAuth::basic("user", "pass");
        let value = serde_json::to_value(&auth).unwrap();
        assert_eq!(value["mode"], "basic");
        assert_eq!(value["basic"]["username"], "user");
        assert!(value.get("bearer").is_none());

        let inherit = serde_json::to_value(RequestAuth::inherit()).unwrap();
        assert_eq!(inherit, serde_json::json!({"mode": "inherit"}));
    }

    #[test]
    fn body_mode_tracks_content() {
        assert_eq!(RequestBody::maybe_json(None).mode, "none");
        assert_eq!(RequestBody::maybe_json(Some("  ")).mode, "none");
        assert_eq!(RequestBody::maybe_json(Some("{}")).mode, "json");
    }

    #[test]
    fn script_omits_absent_prerequest() {
        let value = serde_json::to_value(RequestScript::default()).unwrap();
        assert_eq!(value, serde_json::json!({}));
        let value = serde_json::to_value(RequestScript::pre("// x")).unwrap();
        assert_eq!(value["prerequest"], "// x");
    }
}
