//! Common test fixtures for rpc-bench tests.

/// Template scenario creating `hello.hello` records with unique names.
pub const HELLO_TEMPLATE_YAML: &str = r#"
name: hello-template
target: hello.hello
operation: create
args:
  - - name: "bench-{uuid}"
      greeting: "hi {rand}"
"#;

/// Template scenario passing its payload only as keyword arguments.
pub const KWARGS_TEMPLATE_YAML: &str = r#"
name: kwargs-template
target: hello.hello
operation: create
kwargs:
  vlist:
    - name: "{uuid}"
"#;

/// Minimal template with neither args nor kwargs.
pub const EMPTY_PAYLOAD_YAML: &str = r#"
name: ping
target: ir.model
operation: search_count
"#;

/// Template missing its required `operation` key.
pub const MISSING_OPERATION_YAML: &str = r#"
name: broken
target: hello.hello
"#;

/// Status code sequences for the mock server.
pub mod statuses {
    /// Every call succeeds.
    pub const ALL_OK: &[u16] = &[200];

    /// Every call fails with an internal server error.
    pub const ALL_SERVER_ERROR: &[u16] = &[500];

    /// Alternating success and client error.
    pub const ALTERNATING: &[u16] = &[200, 404];

    /// Mix of success, redirect, client and server errors: 2 of 5 fail.
    pub const MIXED: &[u16] = &[200, 302, 400, 204, 503];
}
