//! Trait seams between the harness and its collaborators.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::LlmResponse;

/// The untrusted workload under test.
///
/// A scaffold is a single callable taking one text argument and returning
/// one text value. The shim is handed a reference to this trait; how the
/// implementation came to exist (staged source run under an interpreter,
/// an in-process closure, a compiled plugin) is the loader's business,
/// not the shim's.
#[async_trait]
pub trait Scaffold: Send + Sync {
    /// Transform one input into one answer.
    ///
    /// Any error return is treated as a scaffold defect and contained at
    /// the shim boundary.
    async fn process_input(&self, input: &str) -> anyhow::Result<String>;
}

/// Client for the executor LLM.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a response for a prompt.
    async fn generate(&self, prompt: &str, system_prompt: &str) -> Result<LlmResponse>;

    /// Identify the backing model, e.g. `anthropic/claude-3-5-haiku-latest`.
    fn model_info(&self) -> String;
}
