//! Full runs against the in-process mock server.

mod common;

use std::sync::Arc;

use common::{assert_milestone_shape, CollectingReporter};
use rpc_bench::{reporter_for, Coordinator, OutputFormat, RunConfig};
use rpc_client::ClientConfig;
use scenarios::{HelloCreateKwargs, Scenario, ScenarioRegistry};
use serde_json::Value;
use test_utils::{statuses, MockBehavior, MockRpcServer};

fn client_config(url: String) -> ClientConfig {
    ClientConfig::new(url, "bench", "admin", "admin").with_pool_size(10)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_mixed_statuses_against_server() {
    let server = MockRpcServer::start_with(
        MockBehavior::default().with_call_statuses(statuses::MIXED.to_vec()),
    )
    .await;
    let scenario = ScenarioRegistry::with_builtins().load("hello").unwrap();
    let mut reporter = CollectingReporter::default();
    let mut coordinator = Coordinator::new(RunConfig::new(server.url(), 100, 10), scenario);

    let summary = coordinator
        .run(&client_config(server.url()), &mut reporter)
        .await
        .unwrap();

    assert_eq!(summary.successful, 60);
    assert_eq!(summary.failed, 40);
    assert_eq!(server.call_count(), 100);
    assert_eq!(server.requests().len(), 101, "one login plus every call");
    assert_milestone_shape(&reporter.milestones());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_every_call_carries_session_and_unique_payload() {
    let server = MockRpcServer::start().await;
    let scenario = ScenarioRegistry::with_builtins().load("hello").unwrap();
    let mut reporter = CollectingReporter::default();
    let mut coordinator = Coordinator::new(RunConfig::new(server.url(), 20, 4), scenario);

    coordinator
        .run(&client_config(server.url()), &mut reporter)
        .await
        .unwrap();

    let calls = server.call_requests();
    assert_eq!(calls.len(), 20);

    let mut names: Vec<String> = Vec::new();
    for call in &calls {
        assert_eq!(call.database, "bench");
        assert_eq!(call.method(), Some("model.hello.hello.create"));
        assert_eq!(call.body["params"][0], 1);
        assert_eq!(call.body["params"][1], "mock-session");
        names.push(call.body["params"][2][0]["name"].as_str().unwrap().to_string());
    }
    names.sort();
    names.dedup();
    assert_eq!(names.len(), 20);
}

#[tokio::test]
async fn test_kwargs_arrive_as_last_positional_param() {
    let server = MockRpcServer::start().await;
    let scenario: Arc<dyn Scenario> = Arc::new(HelloCreateKwargs);
    let mut reporter = CollectingReporter::default();
    let mut coordinator = Coordinator::new(RunConfig::new(server.url(), 2, 1), scenario);

    coordinator
        .run(&client_config(server.url()), &mut reporter)
        .await
        .unwrap();

    for call in server.call_requests() {
        let params = call.body["params"].as_array().unwrap();
        // Session pair followed by the keyword map; no named parameters.
        assert_eq!(params.len(), 3);
        assert!(params[2]["vlist"].is_array());
        assert!(call.body.get("kwargs").is_none());
    }
}

#[tokio::test]
async fn test_url_without_scheme_runs() {
    let server = MockRpcServer::start().await;
    let scenario = ScenarioRegistry::with_builtins().load("hello-search").unwrap();
    let mut reporter = CollectingReporter::default();
    let mut coordinator = Coordinator::new(RunConfig::new(server.host_port(), 10, 2), scenario);

    let summary = coordinator
        .run(&client_config(server.host_port()), &mut reporter)
        .await
        .unwrap();

    assert_eq!(summary.successful, 10);
}

#[tokio::test]
async fn test_json_output_is_one_object_per_line() {
    let server = MockRpcServer::start().await;
    let scenario = ScenarioRegistry::with_builtins().load("hello").unwrap();
    let mut coordinator = Coordinator::new(RunConfig::new(server.url(), 10, 2), scenario);

    let dir = test_utils::temp_test_dir();
    let path = dir.path().join("events.jsonl");
    let file = std::fs::File::create(&path).unwrap();
    let mut reporter = reporter_for(OutputFormat::Json, file);

    coordinator
        .run(&client_config(server.url()), reporter.as_mut())
        .await
        .unwrap();
    drop(reporter);

    let content = std::fs::read_to_string(&path).unwrap();
    let events: Vec<Value> = content
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(events.first().unwrap()["event"], "started");
    let last = events.last().unwrap();
    assert_eq!(last["event"], "finished");
    assert_eq!(last["successful"], 10);
    assert_eq!(last["failed"], 0);
}
