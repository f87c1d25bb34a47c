//! Payload generators for benchmark runs.
//!
//! A [`Scenario`] names the model and method to call and produces fresh
//! arguments for every call. Scenarios are resolved by name through a
//! [`ScenarioRegistry`], either from the built-in set or from a YAML template.

pub mod builtin;
pub mod error;
pub mod payload;
pub mod registry;
pub mod scenario;
pub mod template;

pub use builtin::{HelloCreate, HelloCreateKwargs, HelloSearch};
pub use error::{ScenarioError, ScenarioResult};
pub use payload::Payload;
pub use registry::{ScenarioFactory, ScenarioRegistry};
pub use scenario::Scenario;
pub use template::{TemplateScenario, TemplateDefinition};
