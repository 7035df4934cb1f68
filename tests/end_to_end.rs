//! End-to-end scenarios that do not require Docker.
//!
//! The full stage → load → run → outcome pipeline is exercised with the
//! in-process loaders and a mock launcher; the scoring bridge runs
//! against a loopback server.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;
use tracing::Level;

use scaffold_bridge::ScoringClient;
use scaffold_core::{Scaffold, ScaffoldPackage};
use scaffold_sandbox::{ContainerRun, MockLauncher, SandboxLauncher};
use scaffold_shim::{load_staged, run, FnScaffold};
use scaffold_store::FilePackageStore;

async fn python_available() -> bool {
    tokio::process::Command::new("python3")
        .arg("--version")
        .output()
        .await
        .map(|o| o.status.success())
        .unwrap_or(false)
}

async fn serve_score(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}/score", addr)
}

#[tokio::test]
async fn staged_uppercase_scaffold_yields_uppercased_result() {
    if !python_available().await {
        eprintln!("skipping: python3 not on PATH");
        return;
    }

    let root = tempfile::tempdir().unwrap();
    let store = FilePackageStore::new(root.path());
    store
        .save(
            "upper",
            &ScaffoldPackage::new("def process_input(x):\n    return x.upper()\n"),
        )
        .unwrap();

    let scaffold = Arc::new(load_staged(&store.path("upper")).unwrap());
    let outcome = run(scaffold, "hi", Level::INFO).await;

    assert_eq!(outcome.result.as_deref(), Some("HI"));
    assert!(outcome.error.is_none());
}

struct ScoringScaffold {
    client: ScoringClient,
}

#[async_trait::async_trait]
impl Scaffold for ScoringScaffold {
    async fn process_input(&self, input: &str) -> anyhow::Result<String> {
        let score = self.client.score(input, &HashMap::new()).await?;
        Ok(format!("{score:.1}"))
    }
}

#[tokio::test]
async fn scaffold_calling_scoring_bridge_returns_stringified_score() {
    let url = serve_score(Router::new().route(
        "/score",
        post(|| async { Json(json!({"score": 1.0})) }),
    ))
    .await;

    let scaffold = Arc::new(ScoringScaffold {
        client: ScoringClient::new(url),
    });
    let outcome = run(scaffold, "any attempt", Level::INFO).await;

    assert_eq!(outcome.result.as_deref(), Some("1.0"));
}

#[tokio::test]
async fn scoring_transport_failure_is_contained_by_the_shim() {
    // Nothing listens here; the bridge raises a transport error, the
    // scaffold propagates it, and the shim contains it.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let scaffold = Arc::new(ScoringScaffold {
        client: ScoringClient::new(format!("http://{}/score", addr)),
    });
    let outcome = run(scaffold, "attempt", Level::INFO).await;

    assert!(outcome.result.is_none());
    assert!(outcome.error.unwrap().contains("transport"));
}

#[tokio::test]
async fn in_process_scaffold_round_trip() {
    let scaffold = Arc::new(FnScaffold::new(|input: &str| Ok(input.to_uppercase())));
    let outcome = run(scaffold, "hi", Level::INFO).await;
    assert_eq!(outcome.result.as_deref(), Some("HI"));
}

#[tokio::test]
async fn launcher_contract_round_trip() {
    let root = tempfile::tempdir().unwrap();
    let store = FilePackageStore::new(root.path());
    store
        .save(
            "echo",
            &ScaffoldPackage::new("def process_input(x):\n    return x.upper()\n"),
        )
        .unwrap();

    let launcher = MockLauncher::new(vec![ContainerRun {
        stdout: "HI\n".into(),
        stderr: String::new(),
        exit_code: 0,
        timed_out: false,
        duration: Duration::from_millis(10),
    }]);

    let run_result = launcher.launch(&store.path("echo"), "hi").await.unwrap();
    assert_eq!(run_result.outcome().result.as_deref(), Some("HI"));

    let launches = launcher.launches().await;
    assert_eq!(launches.len(), 1);
    assert_eq!(launches[0].0, store.path("echo"));
    assert_eq!(launches[0].1, "hi");
}
