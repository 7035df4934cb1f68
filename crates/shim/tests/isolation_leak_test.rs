//! The isolation filter's scope is exactly one execution.
//!
//! This lives in its own test binary so no other test can hold a guard
//! while the leak assertions run; the suppression depth is process-wide.

use std::sync::Arc;

use scaffold_core::{logging, Scaffold};
use scaffold_shim::{run, FnScaffold};
use tracing::Level;

#[tokio::test]
async fn runs_leave_no_isolation_behind() {
    assert!(!logging::isolation_active());

    // Success path.
    let ok = Arc::new(FnScaffold::new(|input: &str| Ok(input.to_string())));
    let outcome = run(Arc::clone(&ok) as Arc<dyn Scaffold>, "x", Level::INFO).await;
    assert!(outcome.is_success());
    assert!(!logging::isolation_active());

    // Contained-failure path.
    let failing = Arc::new(FnScaffold::new(|_: &str| -> anyhow::Result<String> {
        anyhow::bail!("boom")
    }));
    let outcome = run(failing, "x", Level::INFO).await;
    assert!(!outcome.is_success());
    assert!(!logging::isolation_active());

    // Contained-panic path.
    let panicking = Arc::new(FnScaffold::new(|_: &str| -> anyhow::Result<String> {
        panic!("boom")
    }));
    let outcome = run(panicking, "x", Level::INFO).await;
    assert!(!outcome.is_success());
    assert!(!logging::isolation_active());
}
