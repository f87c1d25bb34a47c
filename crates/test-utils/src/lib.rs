//! Shared test utilities for the rpc-bench workspace.
//!
//! This crate provides common testing infrastructure including:
//! - An in-process mock JSON-RPC server
//! - Template scenario fixtures
//! - Path and temp-file helpers
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{MockBehavior, MockRpcServer};
//! ```

pub mod fixtures;
pub mod mock_server;
pub mod paths;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use mock_server::{LoginBehavior, MockBehavior, MockRpcServer, RecordedRequest};
pub use paths::*;
