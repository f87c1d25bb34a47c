//! Scenarios compiled into the binary.

use rand::Rng;
use serde_json::json;
use uuid::Uuid;

use crate::payload::Payload;
use crate::scenario::Scenario;

const HELLO_MODEL: &str = "hello.hello";

fn unique() -> String {
    Uuid::new_v4().to_string()
}

/// Creates one `hello.hello` record per call, passing `vlist` positionally.
#[derive(Debug, Default, Clone, Copy)]
pub struct HelloCreate;

impl Scenario for HelloCreate {
    fn name(&self) -> &str {
        "hello"
    }

    fn target(&self) -> &str {
        HELLO_MODEL
    }

    fn operation(&self) -> &str {
        "create"
    }

    fn generate(&self) -> Payload {
        Payload::new().with_arg(json!([{
            "name": unique(),
            "greeting": unique(),
        }]))
    }
}

/// Same create as [`HelloCreate`] but with `vlist` as a keyword argument.
///
/// The client sends keyword arguments as the trailing positional parameter, so the
/// server receives them in the context slot rather than as `vlist`.
#[derive(Debug, Default, Clone, Copy)]
pub struct HelloCreateKwargs;

impl Scenario for HelloCreateKwargs {
    fn name(&self) -> &str {
        "hello-kwargs"
    }

    fn target(&self) -> &str {
        HELLO_MODEL
    }

    fn operation(&self) -> &str {
        "create"
    }

    fn generate(&self) -> Payload {
        Payload::new().with_kwarg(
            "vlist",
            json!([{
                "name": unique(),
                "greeting": unique(),
            }]),
        )
    }
}

/// Reads a page of `hello.hello` records at a random offset.
#[derive(Debug, Default, Clone, Copy)]
pub struct HelloSearch;

impl HelloSearch {
    pub const PAGE_SIZE: u64 = 10;
    pub const MAX_OFFSET: u64 = 1000;
}

impl Scenario for HelloSearch {
    fn name(&self) -> &str {
        "hello-search"
    }

    fn target(&self) -> &str {
        HELLO_MODEL
    }

    fn operation(&self) -> &str {
        "search_read"
    }

    fn generate(&self) -> Payload {
        let offset = rand::thread_rng().gen_range(0..Self::MAX_OFFSET);
        // search_read(domain, offset, limit, order, fields_names)
        Payload::new()
            .with_arg(json!([]))
            .with_arg(json!(offset))
            .with_arg(json!(Self::PAGE_SIZE))
            .with_arg(json!(null))
            .with_arg(json!(["name", "greeting"]))
    }
}
