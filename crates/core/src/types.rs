//! Shared data types for the scaffold harness.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A scaffold's code together with its metadata.
///
/// Created once by the orchestrating learning loop, persisted by the
/// package store, and read-only once staged into a sandbox. Code and
/// metadata are always written together; a partial package is never
/// executed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaffoldPackage {
    /// Source text of the scaffold.
    pub code: String,
    /// Structured non-code information accompanying the source
    /// (provenance, executor spec, interpreter override, ...).
    pub metadata: HashMap<String, Value>,
}

impl ScaffoldPackage {
    /// Create a package with empty metadata.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            metadata: HashMap::new(),
        }
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Interpreter requested by the package metadata, if any.
    pub fn interpreter(&self) -> Option<&str> {
        self.metadata.get("interpreter").and_then(Value::as_str)
    }
}

/// Result of one sandboxed execution.
///
/// An absent result together with a logged failure signals a contained
/// scaffold crash, never a propagated process fault.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    /// Text returned by the entry function, if it completed.
    pub result: Option<String>,
    /// Description of the contained failure when `result` is absent.
    pub error: Option<String>,
}

impl ExecutionOutcome {
    /// Outcome of a completed run.
    pub fn success(result: impl Into<String>) -> Self {
        Self {
            result: Some(result.into()),
            error: None,
        }
    }

    /// Outcome of a contained scaffold failure.
    pub fn contained(error: impl Into<String>) -> Self {
        Self {
            result: None,
            error: Some(error.into()),
        }
    }

    /// Whether the entry function produced a result.
    pub fn is_success(&self) -> bool {
        self.result.is_some()
    }
}

/// Response from the executor LLM.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmResponse {
    /// Textual content of the response.
    pub content: String,
    /// Auxiliary reasoning content, when the model produced any.
    pub thinking: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn package_interpreter_from_metadata() {
        let pkg = ScaffoldPackage::new("print('hi')");
        assert_eq!(pkg.interpreter(), None);

        let pkg = pkg.with_metadata("interpreter", json!("python3.11"));
        assert_eq!(pkg.interpreter(), Some("python3.11"));
    }

    #[test]
    fn outcome_success_and_containment() {
        let ok = ExecutionOutcome::success("HI");
        assert!(ok.is_success());
        assert_eq!(ok.result.as_deref(), Some("HI"));
        assert!(ok.error.is_none());

        let crashed = ExecutionOutcome::contained("division by zero");
        assert!(!crashed.is_success());
        assert!(crashed.result.is_none());
        assert_eq!(crashed.error.as_deref(), Some("division by zero"));
    }
}
