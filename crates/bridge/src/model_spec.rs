//! Executor model specification parsing.
//!
//! A spec is canonically `provider/model`. Bare names of well-known models
//! and a few aliases are accepted and resolved; anything else is rejected
//! at construction time rather than at the first call.

use std::fmt;

use scaffold_core::{Error, Result};

/// Default OpenAI model when a spec names none.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1-nano";

/// Default Anthropic model.
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-haiku-latest";

/// Aliases for the latest models.
const MODEL_ALIASES: &[(&str, &str)] = &[
    ("opus", "anthropic/claude-opus-4-20250514"),
    ("sonnet", "anthropic/claude-sonnet-4-20250514"),
    ("haiku", "anthropic/claude-3-5-haiku-latest"),
];

/// Bare model names whose provider is unambiguous.
const KNOWN_MODELS: &[(&str, Provider)] = &[
    ("gpt-4", Provider::OpenAi),
    ("gpt-4o", Provider::OpenAi),
    ("gpt-4o-mini", Provider::OpenAi),
    ("gpt-4.1-nano", Provider::OpenAi),
    ("gpt-3.5-turbo", Provider::OpenAi),
    ("o1", Provider::OpenAi),
    ("o1-mini", Provider::OpenAi),
    ("claude-opus-4-20250514", Provider::Anthropic),
    ("claude-sonnet-4-20250514", Provider::Anthropic),
    ("claude-3-5-sonnet-latest", Provider::Anthropic),
    ("claude-3-5-haiku-latest", Provider::Anthropic),
    ("claude-3-opus-latest", Provider::Anthropic),
    ("mock", Provider::Mock),
];

/// Model providers the executor bridge can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Anthropic,
    Mock,
}

impl Provider {
    fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Mock => "mock",
        }
    }
}

/// A resolved `provider/model` specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub provider: Provider,
    pub model: String,
}

impl ModelSpec {
    /// Resolve a raw spec to canonical form.
    ///
    /// Examples:
    /// - `"haiku"` → `anthropic/claude-3-5-haiku-latest`
    /// - `"gpt-4o"` → `openai/gpt-4o`
    /// - `"anthropic/claude-3-haiku"` → unchanged
    /// - `""` → the OpenAI default
    pub fn resolve(spec: &str) -> Result<Self> {
        if spec.is_empty() {
            return Ok(Self {
                provider: Provider::OpenAi,
                model: DEFAULT_OPENAI_MODEL.to_string(),
            });
        }

        let spec = MODEL_ALIASES
            .iter()
            .find(|(alias, _)| *alias == spec)
            .map(|(_, canonical)| *canonical)
            .unwrap_or(spec);

        if let Some((provider, model)) = spec.split_once('/') {
            let provider = match provider {
                "openai" | "gpt" | "chatgpt" => Provider::OpenAi,
                "anthropic" | "claude" => Provider::Anthropic,
                "mock" => Provider::Mock,
                other => {
                    return Err(Error::config(format!(
                        "Unsupported model provider: {}",
                        other
                    )))
                }
            };
            return Ok(Self {
                provider,
                model: model.to_string(),
            });
        }

        if let Some((_, provider)) = KNOWN_MODELS.iter().find(|(model, _)| *model == spec) {
            return Ok(Self {
                provider: *provider,
                model: spec.to_string(),
            });
        }

        Err(Error::config(format!("Unknown model spec: {}", spec)))
    }
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider.as_str(), self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_aliases() {
        let spec = ModelSpec::resolve("haiku").unwrap();
        assert_eq!(spec.provider, Provider::Anthropic);
        assert_eq!(spec.to_string(), "anthropic/claude-3-5-haiku-latest");

        let spec = ModelSpec::resolve("opus").unwrap();
        assert_eq!(spec.model, "claude-opus-4-20250514");
    }

    #[test]
    fn resolves_known_bare_names() {
        let spec = ModelSpec::resolve("gpt-4o").unwrap();
        assert_eq!(spec.to_string(), "openai/gpt-4o");

        let spec = ModelSpec::resolve("mock").unwrap();
        assert_eq!(spec.provider, Provider::Mock);
    }

    #[test]
    fn canonical_specs_pass_through() {
        let spec = ModelSpec::resolve("anthropic/claude-3-haiku").unwrap();
        assert_eq!(spec.to_string(), "anthropic/claude-3-haiku");
    }

    #[test]
    fn empty_spec_uses_default() {
        let spec = ModelSpec::resolve("").unwrap();
        assert_eq!(spec.to_string(), format!("openai/{}", DEFAULT_OPENAI_MODEL));
    }

    #[test]
    fn unknown_spec_is_rejected() {
        assert!(ModelSpec::resolve("unknown-model").is_err());
        assert!(ModelSpec::resolve("acme/some-model").is_err());
    }
}
