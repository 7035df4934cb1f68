//! Scaffold loaders.
//!
//! The shim only ever sees the [`Scaffold`] trait. This module supplies
//! the two implementations the harness ships: in-process closures and the
//! subprocess contract for staged packages.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::Context;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use scaffold_core::{Result, Scaffold};
use scaffold_store::read_package;

/// Default interpreter for staged scaffolds.
pub const DEFAULT_INTERPRETER: &str = "python3";

/// Bootstrap handed to the interpreter: calls the staged module's
/// `process_input` under the subprocess contract (input on stdin, result
/// on stdout). A non-text return is a contract violation and raises rather
/// than being coerced.
const BOOTSTRAP: &str = r#"
import sys
sys.path.insert(0, sys.argv[1])
from scaffold import process_input
result = process_input(sys.stdin.read())
if not isinstance(result, str):
    raise TypeError(f"process_input returned {type(result).__name__}, expected str")
sys.stdout.write(result)
"#;

// =============================================================================
// Closure adapter
// =============================================================================

/// Adapter exposing a closure as a scaffold (tests, in-process embedding).
pub struct FnScaffold<F>(F);

impl<F> FnScaffold<F>
where
    F: Fn(&str) -> anyhow::Result<String> + Send + Sync,
{
    /// Wrap a closure with the entry-function signature.
    pub fn new(entry: F) -> Self {
        Self(entry)
    }
}

#[async_trait]
impl<F> Scaffold for FnScaffold<F>
where
    F: Fn(&str) -> anyhow::Result<String> + Send + Sync,
{
    async fn process_input(&self, input: &str) -> anyhow::Result<String> {
        (self.0)(input)
    }
}

// =============================================================================
// Subprocess contract
// =============================================================================

/// A staged scaffold run as a child process.
///
/// The interpreter named by the package metadata (default `python3`)
/// executes a fixed bootstrap that imports the staged module and calls
/// its `process_input`. The child's stderr is forwarded to this process's
/// stderr so scaffold log output lands in the captured run output.
pub struct ProcessScaffold {
    dir: PathBuf,
    interpreter: String,
}

impl ProcessScaffold {
    /// Create a scaffold for a staged directory with an explicit
    /// interpreter.
    pub fn new(dir: impl Into<PathBuf>, interpreter: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            interpreter: interpreter.into(),
        }
    }

    /// The staged directory this scaffold runs from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Load a staged package as a runnable scaffold.
///
/// Validates that both package artifacts are present; a half-written
/// package must never be executed.
pub fn load_staged(dir: &Path) -> Result<ProcessScaffold> {
    let package = read_package(dir)?;
    let interpreter = package
        .interpreter()
        .unwrap_or(DEFAULT_INTERPRETER)
        .to_string();
    tracing::debug!(dir = %dir.display(), interpreter = %interpreter, "Scaffold loaded");
    Ok(ProcessScaffold::new(dir, interpreter))
}

#[async_trait]
impl Scaffold for ProcessScaffold {
    async fn process_input(&self, input: &str) -> anyhow::Result<String> {
        let mut child = Command::new(&self.interpreter)
            .arg("-c")
            .arg(BOOTSTRAP)
            .arg(&self.dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to spawn interpreter {}", self.interpreter))?;

        let mut stdin = child
            .stdin
            .take()
            .context("scaffold child process has no stdin")?;
        stdin.write_all(input.as_bytes()).await?;
        drop(stdin);

        let output = child.wait_with_output().await?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.is_empty() {
            eprint!("{stderr}");
        }

        if !output.status.success() {
            anyhow::bail!(
                "scaffold process exited with {}: {}",
                output.status,
                stderr.trim()
            );
        }

        String::from_utf8(output.stdout).context("scaffold produced non-UTF-8 output")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scaffold_core::ScaffoldPackage;
    use scaffold_store::FilePackageStore;

    async fn python_available() -> bool {
        Command::new(DEFAULT_INTERPRETER)
            .arg("--version")
            .output()
            .await
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    #[tokio::test]
    async fn fn_scaffold_invokes_closure() {
        let scaffold = FnScaffold::new(|input: &str| Ok(format!("<{input}>")));
        assert_eq!(scaffold.process_input("x").await.unwrap(), "<x>");
    }

    #[tokio::test]
    async fn load_staged_rejects_partial_package() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("scaffold.py"), "code only").unwrap();
        assert!(load_staged(dir.path()).is_err());
    }

    #[tokio::test]
    async fn staged_scaffold_runs_under_interpreter() {
        if !python_available().await {
            eprintln!("skipping: {} not on PATH", DEFAULT_INTERPRETER);
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

        let scaffold = load_staged(&store.path("upper")).unwrap();
        assert_eq!(scaffold.process_input("hi").await.unwrap(), "HI");
    }

    #[tokio::test]
    async fn non_text_return_is_an_error() {
        if !python_available().await {
            eprintln!("skipping: {} not on PATH", DEFAULT_INTERPRETER);
            return;
        }

        let root = tempfile::tempdir().unwrap();
        let store = FilePackageStore::new(root.path());
        store
            .save(
                "bad",
                &ScaffoldPackage::new("def process_input(x):\n    return 42\n"),
            )
            .unwrap();

        let scaffold = load_staged(&store.path("bad")).unwrap();
        let err = scaffold.process_input("hi").await.unwrap_err();
        assert!(err.to_string().contains("exited with"));
    }

    #[tokio::test]
    async fn raising_scaffold_reports_stderr() {
        if !python_available().await {
            eprintln!("skipping: {} not on PATH", DEFAULT_INTERPRETER);
            return;
        }

        let root = tempfile::tempdir().unwrap();
        let store = FilePackageStore::new(root.path());
        store
            .save(
                "raises",
                &ScaffoldPackage::new(
                    "def process_input(x):\n    raise ValueError('no answer found')\n",
                ),
            )
            .unwrap();

        let scaffold = load_staged(&store.path("raises")).unwrap();
        let err = scaffold.process_input("hi").await.unwrap_err();
        assert!(err.to_string().contains("no answer found"));
    }
}
