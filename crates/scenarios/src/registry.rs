//! Name-to-scenario resolution.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::builtin::{HelloCreate, HelloCreateKwargs, HelloSearch};
use crate::error::{ScenarioError, ScenarioResult};
use crate::scenario::Scenario;
use crate::template::TemplateScenario;

/// Constructor stored in the registry.
pub type ScenarioFactory = fn() -> Arc<dyn Scenario>;

/// Maps scenario names to constructors.
///
/// Names ending in `.yaml` or `.yml` bypass the map and load a template file.
#[derive(Debug, Clone)]
pub struct ScenarioRegistry {
    factories: BTreeMap<String, ScenarioFactory>,
}

impl ScenarioRegistry {
    /// A registry with no entries.
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// A registry holding the built-in scenarios.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register("hello", || Arc::new(HelloCreate) as Arc<dyn Scenario>);
        registry.register("hello-kwargs", || {
            Arc::new(HelloCreateKwargs) as Arc<dyn Scenario>
        });
        registry.register("hello-search", || Arc::new(HelloSearch) as Arc<dyn Scenario>);
        registry
    }

    /// Add or replace an entry.
    pub fn register(&mut self, name: impl Into<String>, factory: ScenarioFactory) {
        self.factories.insert(name.into(), factory);
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Resolve `name` to a shareable scenario.
    pub fn load(&self, name: &str) -> ScenarioResult<Arc<dyn Scenario>> {
        if is_template_path(name) {
            return Ok(Arc::new(TemplateScenario::from_file(name)?));
        }

        match self.factories.get(name) {
            Some(factory) => {
                debug!(scenario = name, "Resolved built-in scenario");
                Ok(factory())
            }
            None => Err(ScenarioError::NotFound {
                name: name.to_string(),
                available: self.names().join(", "),
            }),
        }
    }
}

impl Default for ScenarioRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

fn is_template_path(name: &str) -> bool {
    matches!(
        Path::new(name).extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_template_path() {
        assert!(is_template_path("scenarios/hello.yaml"));
        assert!(is_template_path("x.yml"));
        assert!(!is_template_path("hello"));
        assert!(!is_template_path("hello.json"));
    }

    #[test]
    fn test_builtin_names_sorted() {
        let registry = ScenarioRegistry::with_builtins();
        assert_eq!(registry.names(), vec!["hello", "hello-kwargs", "hello-search"]);
    }

    #[test]
    fn test_empty_registry_reports_not_found() {
        let err = ScenarioRegistry::empty().load("hello").unwrap_err();
        assert!(matches!(err, ScenarioError::NotFound { .. }));
    }
}
