#![deny(unused)]
//! Bridge clients for the scaffold harness.
//!
//! Sandboxed code has exactly two externally-reachable capabilities, both
//! mediated by this crate:
//!
//! - [`ExecutorClient`] invokes the executor LLM (model and thinking
//!   budget come from process configuration, never from the caller);
//! - [`ScoringClient`] requests a numeric score for an attempted answer
//!   from the host-resident bridge server.
//!
//! Both are plain synchronous calls from the scaffold's point of view:
//! each blocks the single sandbox thread until a response or timeout
//! arrives. Transport and server failures surface as typed errors rather
//! than being swallowed, since a missing score is a correctness issue for
//! the evaluation, not a cosmetic one.

pub mod executor;
pub mod model_spec;
pub mod providers;
pub mod scoring;

pub use executor::ExecutorClient;
pub use model_spec::{ModelSpec, Provider};
pub use providers::{create_client, AnthropicClient, MockLlm, OpenAiClient};
pub use scoring::{ScoreRequest, ScoreResponse, ScoringClient, DEFAULT_SCORING_URL, SCORE_TIMEOUT};
