//! Executor bridge client.
//!
//! The sandboxed scaffold asks the harness for model completions through
//! this client. Which model answers, and with what thinking budget, is
//! process configuration; the caller only supplies prompts.

use std::time::Duration;

use scaffold_core::{logging, Error, LlmClient, Result};

use crate::model_spec::ModelSpec;
use crate::providers::create_client;

/// Environment variable naming the executor model spec.
pub const MODEL_SPEC_ENV: &str = "EXECUTOR_MODEL_SPEC";

/// Environment variable holding the thinking-token budget.
pub const THINKING_BUDGET_ENV: &str = "EXECUTOR_THINKING_BUDGET";

/// Environment variable bounding one executor call, in seconds. Unset
/// leaves the bound to the transport layer's own configuration.
pub const TIMEOUT_ENV: &str = "EXECUTOR_TIMEOUT_SECS";

/// Mediated access to the executor LLM for sandboxed code.
pub struct ExecutorClient {
    client: Box<dyn LlmClient>,
}

impl ExecutorClient {
    /// Build the client from process configuration.
    ///
    /// Reads the model spec, thinking budget, and optional timeout from
    /// the environment; provider credentials are read by the provider
    /// client itself and are only required for the provider selected.
    pub fn from_env() -> Result<Self> {
        let raw_spec = std::env::var(MODEL_SPEC_ENV).unwrap_or_default();
        let spec = ModelSpec::resolve(&raw_spec)?;

        let thinking_budget = match std::env::var(THINKING_BUDGET_ENV) {
            Ok(raw) => Some(raw.parse::<u32>().map_err(|_| {
                Error::config(format!(
                    "{} must be an integer, got {:?}",
                    THINKING_BUDGET_ENV, raw
                ))
            })?),
            Err(_) => None,
        };

        let timeout = match std::env::var(TIMEOUT_ENV) {
            Ok(raw) => {
                let secs = raw.parse::<u64>().map_err(|_| {
                    Error::config(format!("{} must be an integer, got {:?}", TIMEOUT_ENV, raw))
                })?;
                Some(Duration::from_secs(secs))
            }
            Err(_) => None,
        };

        let client = create_client(&spec, thinking_budget, timeout)?;
        tracing::info!(model = %spec, "Executor bridge ready");
        Ok(Self { client })
    }

    /// Wrap an existing provider client (tests, in-process embedding).
    pub fn with_client(client: Box<dyn LlmClient>) -> Self {
        Self { client }
    }

    /// Invoke the executor once and return only the textual content.
    ///
    /// Auxiliary thinking content is logged so operators can inspect it,
    /// never returned. Provider errors propagate unchanged: no retry, no
    /// interpretation beyond logging.
    pub async fn execute(&self, prompt: &str, system_prompt: &str) -> Result<String> {
        // Third-party client chatter stays out of the captured run output.
        let _quiet = logging::isolate();

        let response = match self.client.generate(prompt, system_prompt).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(model = %self.client.model_info(), error = %e, "Executor call failed");
                return Err(e);
            }
        };

        if let Some(thinking) = &response.thinking {
            tracing::info!(model = %self.client.model_info(), thinking = %thinking, "Executor thinking");
        }

        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MockLlm;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::layer::SubscriberExt;

    #[tokio::test]
    async fn returns_content_only() {
        let executor =
            ExecutorClient::with_client(Box::new(MockLlm::new("hello").with_thinking("...")));
        let answer = executor.execute("What is up?", "").await.unwrap();
        // Thinking is logged, never returned.
        assert_eq!(answer, "hello");
    }

    #[derive(Default, Clone)]
    struct ThinkingCapture(Arc<Mutex<Vec<String>>>);

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for ThinkingCapture {
        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            struct Visitor<'a>(&'a Mutex<Vec<String>>);
            impl tracing::field::Visit for Visitor<'_> {
                fn record_debug(
                    &mut self,
                    field: &tracing::field::Field,
                    value: &dyn std::fmt::Debug,
                ) {
                    if field.name() == "thinking" {
                        self.0.lock().unwrap().push(format!("{value:?}"));
                    }
                }
            }
            event.record(&mut Visitor(&self.0));
        }
    }

    #[tokio::test]
    async fn thinking_is_logged_not_returned() {
        use tracing::instrument::WithSubscriber;

        let capture = ThinkingCapture::default();
        let seen = capture.0.clone();
        let subscriber = tracing_subscriber::registry().with(capture);

        let executor = ExecutorClient::with_client(Box::new(
            MockLlm::new("hello").with_thinking("chain of reasoning"),
        ));
        let answer = async { executor.execute("question", "").await.unwrap() }
            .with_subscriber(subscriber)
            .await;

        assert_eq!(answer, "hello");
        let seen = seen.lock().unwrap();
        assert!(seen.iter().any(|t| t.contains("chain of reasoning")));
    }

    #[tokio::test]
    async fn provider_errors_propagate() {
        let executor = ExecutorClient::with_client(Box::new(MockLlm::failing()));
        let err = executor.execute("prompt", "system").await.unwrap_err();
        assert!(matches!(err, Error::ModelProvider(_)));
    }
}
