//! Contained invocation of one scaffold.

use std::sync::Arc;

use tracing::Level;

use scaffold_core::{logging, ExecutionOutcome, Scaffold};

/// Run one scaffold on one input with full error containment.
///
/// Logging is configured first; the isolation filter is held for the
/// whole call and released on every exit path. The result, if any, is
/// printed to stdout (the run's output channel) and returned to the
/// caller. Any failure inside the entry function, error return or panic,
/// is logged at error severity and converted into an absent result: a
/// single scaffold's defect never aborts the harness.
pub async fn run(scaffold: Arc<dyn Scaffold>, input: &str, log_level: Level) -> ExecutionOutcome {
    logging::init(log_level);
    let _isolation = logging::isolate();

    tracing::info!(input_len = input.len(), "Running scaffold");

    let task = {
        let scaffold = Arc::clone(&scaffold);
        let input = input.to_string();
        tokio::spawn(async move { scaffold.process_input(&input).await })
    };

    let outcome = match task.await {
        Ok(Ok(result)) => ExecutionOutcome::success(result),
        Ok(Err(e)) => {
            tracing::error!(error = ?e, "Scaffold raised an error");
            ExecutionOutcome::contained(format!("{e:#}"))
        }
        Err(join_error) if join_error.is_panic() => {
            let message = panic_message(join_error.into_panic());
            tracing::error!(panic = %message, "Scaffold panicked");
            ExecutionOutcome::contained(message)
        }
        Err(join_error) => {
            tracing::error!(error = %join_error, "Scaffold task failed");
            ExecutionOutcome::contained(join_error.to_string())
        }
    };

    if let Some(result) = &outcome.result {
        println!("{result}");
    }
    outcome
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "scaffold panicked".to_string()
    }
}
