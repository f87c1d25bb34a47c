//! Scenarios defined in YAML files.
//!
//! ```yaml
//! name: hello-template
//! target: hello.hello
//! operation: create
//! args:
//!   - - name: "bench-{uuid}"
//! kwargs: {}
//! ```
//!
//! String values may contain `{uuid}` (a fresh v4 UUID) and `{rand}` (a random
//! `u32`); both are substituted on every `generate()` call.

use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use crate::error::{ScenarioError, ScenarioResult};
use crate::payload::Payload;
use crate::scenario::Scenario;

const UUID_PLACEHOLDER: &str = "{uuid}";
const RAND_PLACEHOLDER: &str = "{rand}";

/// On-disk layout of a template scenario.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateDefinition {
    #[serde(default)]
    pub name: Option<String>,
    pub target: String,
    pub operation: String,
    #[serde(default)]
    pub args: Vec<Value>,
    #[serde(default)]
    pub kwargs: Map<String, Value>,
}

/// Scenario whose payload is a template rendered per call.
#[derive(Debug, Clone)]
pub struct TemplateScenario {
    name: String,
    definition: TemplateDefinition,
}

impl TemplateScenario {
    /// Parse a template from YAML. `fallback_name` is used when the file has no `name`.
    pub fn from_yaml(content: &str, fallback_name: &str) -> ScenarioResult<Self> {
        let definition: TemplateDefinition = serde_yaml::from_str(content)?;
        Self::from_definition(definition, fallback_name)
    }

    /// Load a template from a YAML file; the file stem is the fallback name.
    pub fn from_file(path: impl AsRef<Path>) -> ScenarioResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("template");

        debug!(path = %path.display(), "Loading template scenario");
        Self::from_yaml(&content, stem)
    }

    fn from_definition(
        definition: TemplateDefinition,
        fallback_name: &str,
    ) -> ScenarioResult<Self> {
        if definition.target.trim().is_empty() {
            return Err(ScenarioError::Invalid("target must not be empty".to_string()));
        }
        if definition.operation.trim().is_empty() {
            return Err(ScenarioError::Invalid(
                "operation must not be empty".to_string(),
            ));
        }

        let name = definition
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| fallback_name.to_string());

        Ok(Self { name, definition })
    }
}

impl Scenario for TemplateScenario {
    fn name(&self) -> &str {
        &self.name
    }

    fn target(&self) -> &str {
        &self.definition.target
    }

    fn operation(&self) -> &str {
        &self.definition.operation
    }

    fn generate(&self) -> Payload {
        Payload {
            args: self.definition.args.iter().map(render).collect(),
            kwargs: self
                .definition
                .kwargs
                .iter()
                .map(|(k, v)| (k.clone(), render(v)))
                .collect(),
        }
    }
}

/// Copy `value`, substituting placeholders in every string leaf.
fn render(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(substitute(s)),
        Value::Array(items) => Value::Array(items.iter().map(render).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), render(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn substitute(s: &str) -> String {
    if !s.contains('{') {
        return s.to_string();
    }

    let mut out = s.to_string();
    while out.contains(UUID_PLACEHOLDER) {
        out = out.replacen(UUID_PLACEHOLDER, &Uuid::new_v4().to_string(), 1);
    }
    while out.contains(RAND_PLACEHOLDER) {
        out = out.replacen(RAND_PLACEHOLDER, &rand::random::<u32>().to_string(), 1);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_substitute_each_occurrence_differs() {
        let out = substitute("{uuid}/{uuid}");
        let parts: Vec<&str> = out.split('/').collect();
        assert_eq!(parts.len(), 2);
        assert_ne!(parts[0], parts[1]);
        assert!(Uuid::parse_str(parts[0]).is_ok());
    }

    #[test]
    fn test_substitute_rand() {
        let out = substitute("n-{rand}");
        assert!(out.starts_with("n-"));
        assert!(out[2..].parse::<u32>().is_ok());
    }

    #[test]
    fn test_substitute_leaves_other_braces() {
        assert_eq!(substitute("{not-a-placeholder}"), "{not-a-placeholder}");
        assert_eq!(substitute("plain"), "plain");
    }

    #[test]
    fn test_render_nested() {
        let template = json!({"a": [{"b": "{uuid}"}], "n": 3, "flag": true});
        let out = render(&template);
        assert_eq!(out["n"], 3);
        assert_eq!(out["flag"], true);
        assert!(Uuid::parse_str(out["a"][0]["b"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn test_fallback_name() {
        let scenario =
            TemplateScenario::from_yaml("target: a.b\noperation: read\n", "from-file").unwrap();
        assert_eq!(scenario.name(), "from-file");
        assert!(scenario.generate().is_empty());
    }

    #[test]
    fn test_empty_target_rejected() {
        let result = TemplateScenario::from_yaml("target: ''\noperation: read\n", "x");
        assert!(matches!(result, Err(ScenarioError::Invalid(_))));
    }
}
