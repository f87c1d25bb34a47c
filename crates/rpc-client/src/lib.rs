//! JSON-RPC client for Tryton-style model endpoints.
//!
//! Opens one authenticated session and classifies every call as success or
//! failure from the HTTP status code alone.

pub mod client;
pub mod config;
pub mod error;
pub mod outcome;

pub use client::{Connector, RemoteCall, RpcClient, Session, SessionToken};
pub use config::ClientConfig;
pub use error::{RpcError, RpcResult};
pub use outcome::CallOutcome;
