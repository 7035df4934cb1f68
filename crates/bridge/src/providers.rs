//! Executor LLM provider implementations.
//!
//! Providers talk to their HTTP APIs directly through `reqwest`. API keys
//! are read from the environment at construction time; a missing key is
//! only an error for the provider actually selected. None of the clients
//! retry: provider errors propagate to the caller unchanged.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use scaffold_core::{Error, LlmClient, LlmResponse, Result};

use crate::model_spec::{ModelSpec, Provider};

const ANTHROPIC_MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Build the provider client selected by a model spec.
///
/// `timeout` bounds each request when set; unset leaves the bound to the
/// transport layer.
pub fn create_client(
    spec: &ModelSpec,
    thinking_budget: Option<u32>,
    timeout: Option<Duration>,
) -> Result<Box<dyn LlmClient>> {
    match spec.provider {
        Provider::OpenAi => Ok(Box::new(OpenAiClient::new(&spec.model, timeout)?)),
        Provider::Anthropic => Ok(Box::new(AnthropicClient::new(
            &spec.model,
            thinking_budget,
            timeout,
        )?)),
        Provider::Mock => Ok(Box::new(MockLlm::new("Mock executor response"))),
    }
}

fn http_client(timeout: Option<Duration>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| Error::model_provider(format!("Failed to build HTTP client: {}", e)))
}

// =============================================================================
// Anthropic
// =============================================================================

/// Client for Anthropic Claude models.
pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    thinking_budget: Option<u32>,
}

impl AnthropicClient {
    /// Create a client; reads `ANTHROPIC_API_KEY` from the environment.
    pub fn new(
        model: impl Into<String>,
        thinking_budget: Option<u32>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| Error::config("ANTHROPIC_API_KEY not set"))?;
        Ok(Self {
            http: http_client(timeout)?,
            api_key,
            model: model.into(),
            thinking_budget,
        })
    }

    fn max_tokens(&self) -> u32 {
        // Known caps; unknown ids degrade to a conservative bound and let
        // the server enforce its own.
        match self.model.as_str() {
            "claude-opus-4-20250514" => 32_000,
            "claude-sonnet-4-20250514" => 64_000,
            _ => 8_192,
        }
    }

    fn thinking(&self) -> ThinkingParam {
        let supported = matches!(
            self.model.as_str(),
            "claude-opus-4-20250514" | "claude-sonnet-4-20250514"
        );
        match (supported, self.thinking_budget) {
            (false, _) | (_, Some(0)) => ThinkingParam::Disabled,
            (true, Some(budget)) => ThinkingParam::Enabled {
                budget_tokens: budget,
            },
            (true, None) => ThinkingParam::Enabled {
                budget_tokens: 10_000,
            },
        }
    }
}

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
    thinking: ThinkingParam,
}

#[derive(Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ThinkingParam {
    Enabled { budget_tokens: u32 },
    Disabled,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicBlock>,
}

#[derive(Deserialize)]
struct AnthropicBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    thinking: Option<String>,
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn generate(&self, prompt: &str, system_prompt: &str) -> Result<LlmResponse> {
        tracing::debug!(
            model = %self.model,
            prompt_len = prompt.len(),
            "Calling Anthropic"
        );

        let request = AnthropicRequest {
            model: &self.model,
            max_tokens: self.max_tokens(),
            system: system_prompt,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
            thinking: self.thinking(),
        };

        let response = self
            .http
            .post(ANTHROPIC_MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::model_provider(format!("Anthropic request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::model_provider(format!(
                "Anthropic returned {}: {}",
                status,
                body.trim()
            )));
        }

        let body: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| Error::model_provider(format!("Malformed Anthropic response: {}", e)))?;

        let mut content = String::new();
        let mut thinking = String::new();
        for block in body.content {
            match block.kind.as_str() {
                "text" => content.push_str(block.text.as_deref().unwrap_or_default()),
                "thinking" => thinking.push_str(block.thinking.as_deref().unwrap_or_default()),
                _ => {}
            }
        }

        Ok(LlmResponse {
            content,
            thinking: (!thinking.is_empty()).then_some(thinking),
        })
    }

    fn model_info(&self) -> String {
        format!("anthropic/{}", self.model)
    }
}

// =============================================================================
// OpenAI
// =============================================================================

/// Client for OpenAI GPT models.
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    /// Create a client; reads `OPENAI_API_KEY` from the environment.
    pub fn new(model: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let api_key =
            std::env::var("OPENAI_API_KEY").map_err(|_| Error::config("OPENAI_API_KEY not set"))?;
        Ok(Self {
            http: http_client(timeout)?,
            api_key,
            model: model.into(),
        })
    }
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage<'a>>,
}

#[derive(Serialize)]
struct OpenAiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiChoiceMessage,
}

#[derive(Deserialize)]
struct OpenAiChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn generate(&self, prompt: &str, system_prompt: &str) -> Result<LlmResponse> {
        tracing::debug!(model = %self.model, prompt_len = prompt.len(), "Calling OpenAI");

        let mut messages = Vec::new();
        if !system_prompt.is_empty() {
            messages.push(OpenAiMessage {
                role: "system",
                content: system_prompt,
            });
        }
        messages.push(OpenAiMessage {
            role: "user",
            content: prompt,
        });

        let request = OpenAiRequest {
            model: &self.model,
            messages,
        };

        let response = self
            .http
            .post(OPENAI_CHAT_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::model_provider(format!("OpenAI request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::model_provider(format!(
                "OpenAI returned {}: {}",
                status,
                body.trim()
            )));
        }

        let body: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| Error::model_provider(format!("Malformed OpenAI response: {}", e)))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::model_provider("OpenAI response contained no content"))?;

        Ok(LlmResponse {
            content,
            thinking: None,
        })
    }

    fn model_info(&self) -> String {
        format!("openai/{}", self.model)
    }
}

// =============================================================================
// Mock (for testing without API calls)
// =============================================================================

/// Mock executor client returning canned responses.
pub struct MockLlm {
    content: String,
    thinking: Option<String>,
    should_fail: bool,
}

impl MockLlm {
    /// Create a mock returning the given content.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            thinking: None,
            should_fail: false,
        }
    }

    /// Attach thinking text to the canned response.
    pub fn with_thinking(mut self, thinking: impl Into<String>) -> Self {
        self.thinking = Some(thinking.into());
        self
    }

    /// Create a failing mock.
    pub fn failing() -> Self {
        Self {
            content: String::new(),
            thinking: None,
            should_fail: true,
        }
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn generate(&self, _prompt: &str, _system_prompt: &str) -> Result<LlmResponse> {
        if self.should_fail {
            return Err(Error::model_provider("Mock failure"));
        }
        Ok(LlmResponse {
            content: self.content.clone(),
            thinking: self.thinking.clone(),
        })
    }

    fn model_info(&self) -> String {
        "mock/mock".to_string()
    }
}
