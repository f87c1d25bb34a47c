//! The scenario interface.

use std::fmt::Debug;

use crate::payload::Payload;

/// A named generator of calls against one model operation.
///
/// `generate` takes `&self` and must not rely on interior mutability, so a single
/// instance can be shared by every worker without coordination.
pub trait Scenario: Debug + Send + Sync {
    /// Name the scenario is registered under.
    fn name(&self) -> &str;

    /// Model the call targets, e.g. `hello.hello`.
    fn target(&self) -> &str;

    /// Method invoked on the model, e.g. `create`.
    fn operation(&self) -> &str;

    /// Fresh arguments for one call.
    fn generate(&self) -> Payload;
}
