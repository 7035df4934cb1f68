//! One-shot container launch for scaffold evaluations.
//!
//! This module provides the `SandboxLauncher` trait and a Docker-based
//! implementation using the `bollard` crate. Each launch runs exactly one
//! evaluation: the staged package is bind-mounted read-only, the only
//! reachable host service is the bridge (via the host-loopback alias), and
//! output is streamed until the container exits or the wall-clock bound
//! expires.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use scaffold_core::{Error, ExecutionOutcome, Result};

// =============================================================================
// Launch Types
// =============================================================================

/// Configuration for launching evaluation containers.
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    /// Image tag to run.
    pub image: String,
    /// Wall-clock bound on one evaluation.
    pub timeout: Duration,
    /// Maximum memory in bytes.
    pub memory_limit: i64,
    /// Process count cap inside the container.
    pub pids_limit: i64,
    /// Host environment variables forwarded into the container when set.
    pub forward_env: Vec<String>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            image: "scaffold-runner:latest".to_string(),
            timeout: Duration::from_secs(120),
            memory_limit: 512 * 1024 * 1024, // 512MB
            pids_limit: 100,
            forward_env: [
                "EXECUTOR_MODEL_SPEC",
                "EXECUTOR_THINKING_BUDGET",
                "EXECUTOR_TIMEOUT_SECS",
                "SCORING_URL",
                "LOG_LEVEL",
                "OPENAI_API_KEY",
                "ANTHROPIC_API_KEY",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Result of one container launch.
///
/// On timeout the output collected so far is preserved and `timed_out`
/// set; the partial output is often the only clue to where a scaffold
/// stalled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerRun {
    /// Standard output, the run's result channel.
    pub stdout: String,
    /// Standard error (log output).
    pub stderr: String,
    /// Exit code of the runner process.
    pub exit_code: i64,
    /// Whether the wall-clock bound expired.
    pub timed_out: bool,
    /// Wall-clock duration of the launch.
    pub duration: Duration,
}

impl ContainerRun {
    /// Whether the evaluation completed (exit code 0, no timeout).
    pub fn success(&self) -> bool {
        self.exit_code == 0 && !self.timed_out
    }

    /// Collapse the launch into the run's outcome.
    pub fn outcome(&self) -> ExecutionOutcome {
        if self.success() {
            ExecutionOutcome::success(self.stdout.trim())
        } else if self.timed_out {
            ExecutionOutcome::contained(format!(
                "Execution timed out after {:?}",
                self.duration
            ))
        } else {
            ExecutionOutcome::contained(format!(
                "Sandbox exited with code {}: {}",
                self.exit_code,
                self.stderr.trim()
            ))
        }
    }
}

// =============================================================================
// Launcher Trait
// =============================================================================

/// Trait for sandbox launch backends.
///
/// The default implementation runs Docker containers via `bollard`;
/// `MockLauncher` provides scripted runs for tests.
#[async_trait]
pub trait SandboxLauncher: Send + Sync {
    /// Run one scaffold evaluation to completion.
    async fn launch(&self, scaffold_dir: &Path, input: &str) -> Result<ContainerRun>;

    /// Check that the launch backend is reachable.
    async fn is_available(&self) -> bool;
}

// =============================================================================
// Docker Launcher
// =============================================================================

/// Docker-based launcher using the `bollard` crate.
///
/// Containers are hardened: all capabilities dropped, no privilege
/// escalation, pids/memory limits, read-only bind of the staged package.
/// The bridge server is the only host service reachable, through the
/// `host.docker.internal` alias.
pub struct DockerLauncher {
    docker: bollard::Docker,
    config: LaunchConfig,
}

impl DockerLauncher {
    /// Connect to the local Docker daemon.
    pub fn new(config: LaunchConfig) -> Result<Self> {
        let docker = bollard::Docker::connect_with_local_defaults().map_err(|e| {
            Error::sandbox(format!(
                "Failed to connect to Docker daemon: {}. Is Docker running?",
                e
            ))
        })?;
        Ok(Self { docker, config })
    }

    /// Create from an existing bollard client (for testing).
    pub fn from_client(docker: bollard::Docker, config: LaunchConfig) -> Self {
        Self { docker, config }
    }

    fn environment(&self) -> Vec<String> {
        self.config
            .forward_env
            .iter()
            .filter_map(|key| std::env::var(key).ok().map(|v| format!("{}={}", key, v)))
            .collect()
    }
}

#[async_trait]
impl SandboxLauncher for DockerLauncher {
    async fn launch(&self, scaffold_dir: &Path, input: &str) -> Result<ContainerRun> {
        use bollard::container::{
            Config, CreateContainerOptions, LogOutput, LogsOptions, RemoveContainerOptions,
        };
        use bollard::models::HostConfig;

        let name = format!("scaffold-run-{}", uuid::Uuid::new_v4());
        let scaffold_dir = scaffold_dir.canonicalize().map_err(|e| {
            Error::sandbox(format!(
                "Scaffold directory {} is not usable: {}",
                scaffold_dir.display(),
                e
            ))
        })?;

        let host_config = HostConfig {
            memory: Some(self.config.memory_limit),
            pids_limit: Some(self.config.pids_limit),
            binds: Some(vec![format!(
                "{}:/workspace/scaffold:ro",
                scaffold_dir.display()
            )]),
            // Host-loopback alias: the bridge server is reachable, the rest
            // of the host is not.
            extra_hosts: Some(vec!["host.docker.internal:host-gateway".to_string()]),
            cap_drop: Some(vec!["ALL".to_string()]),
            security_opt: Some(vec!["no-new-privileges:true".to_string()]),
            ..Default::default()
        };

        let container_config = Config {
            image: Some(self.config.image.clone()),
            cmd: Some(vec!["sandbox-runner".to_string(), input.to_string()]),
            env: Some(self.environment()),
            working_dir: Some("/workspace".to_string()),
            host_config: Some(host_config),
            labels: Some(HashMap::from([(
                "managed-by".to_string(),
                "scaffold-harness".to_string(),
            )])),
            ..Default::default()
        };

        let options = CreateContainerOptions {
            name: &name,
            platform: None,
        };

        self.docker
            .create_container(Some(options), container_config)
            .await
            .map_err(|e| Error::sandbox(format!("Failed to create sandbox container: {}", e)))?;

        self.docker
            .start_container::<String>(&name, None)
            .await
            .map_err(|e| Error::sandbox(format!("Failed to start sandbox container: {}", e)))?;

        tracing::info!(container = %name, image = %self.config.image, "Sandbox started");

        let start = Instant::now();
        let mut stdout = String::new();
        let mut stderr = String::new();

        let mut log_stream = Box::pin(self.docker.logs(
            &name,
            Some(LogsOptions::<String> {
                follow: true,
                stdout: true,
                stderr: true,
                ..Default::default()
            }),
        ));

        let collect = async {
            use futures::StreamExt;

            while let Some(msg) = log_stream.next().await {
                match msg {
                    Ok(LogOutput::StdOut { message }) => {
                        stdout.push_str(&String::from_utf8_lossy(&message));
                    }
                    Ok(LogOutput::StdErr { message }) => {
                        stderr.push_str(&String::from_utf8_lossy(&message));
                    }
                    Ok(_) => {} // stdin echoes
                    Err(e) => {
                        stderr.push_str(&format!("\n[sandbox log error: {}]", e));
                        break;
                    }
                }
            }
        };

        let timed_out = tokio::time::timeout(self.config.timeout, collect)
            .await
            .is_err();

        let exit_code = if timed_out {
            tracing::warn!(container = %name, timeout = ?self.config.timeout, "Sandbox run timed out");
            let _ = self.docker.kill_container::<String>(&name, None).await;
            -1
        } else {
            match self.docker.inspect_container(&name, None).await {
                Ok(inspect) => inspect.state.and_then(|s| s.exit_code).unwrap_or(-1),
                Err(e) => {
                    let _ = self
                        .docker
                        .remove_container(
                            &name,
                            Some(RemoveContainerOptions {
                                force: true,
                                ..Default::default()
                            }),
                        )
                        .await;
                    return Err(Error::sandbox(format!(
                        "Failed to inspect sandbox container: {}",
                        e
                    )));
                }
            }
        };

        if let Err(e) = self
            .docker
            .remove_container(
                &name,
                Some(RemoveContainerOptions {
                    force: true,
                    ..Default::default()
                }),
            )
            .await
        {
            tracing::warn!(container = %name, error = %e, "Failed to remove sandbox container");
        }

        Ok(ContainerRun {
            stdout,
            stderr,
            exit_code,
            timed_out,
            duration: start.elapsed(),
        })
    }

    async fn is_available(&self) -> bool {
        self.docker.ping().await.is_ok()
    }
}

// =============================================================================
// Mock Launcher (for testing without Docker)
// =============================================================================

/// In-memory mock launcher for unit testing.
#[derive(Default)]
pub struct MockLauncher {
    runs: Arc<tokio::sync::Mutex<Vec<ContainerRun>>>,
    launches: Arc<tokio::sync::Mutex<Vec<(PathBuf, String)>>>,
}

impl MockLauncher {
    /// Create a mock launcher with scripted runs, served in order.
    pub fn new(runs: Vec<ContainerRun>) -> Self {
        Self {
            runs: Arc::new(tokio::sync::Mutex::new(runs)),
            launches: Default::default(),
        }
    }

    /// The `(scaffold_dir, input)` pairs launched so far.
    pub async fn launches(&self) -> Vec<(PathBuf, String)> {
        self.launches.lock().await.clone()
    }
}

#[async_trait]
impl SandboxLauncher for MockLauncher {
    async fn launch(&self, scaffold_dir: &Path, input: &str) -> Result<ContainerRun> {
        self.launches
            .lock()
            .await
            .push((scaffold_dir.to_path_buf(), input.to_string()));

        let mut runs = self.runs.lock().await;
        if runs.is_empty() {
            // Default behavior: echo the input back.
            Ok(ContainerRun {
                stdout: input.to_string(),
                stderr: String::new(),
                exit_code: 0,
                timed_out: false,
                duration: Duration::from_millis(1),
            })
        } else {
            Ok(runs.remove(0))
        }
    }

    async fn is_available(&self) -> bool {
        true
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_config_defaults() {
        let config = LaunchConfig::default();
        assert_eq!(config.image, "scaffold-runner:latest");
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert!(config
            .forward_env
            .iter()
            .any(|k| k == "EXECUTOR_MODEL_SPEC"));
    }

    #[test]
    fn container_run_success() {
        let run = ContainerRun {
            stdout: "HI\n".into(),
            stderr: String::new(),
            exit_code: 0,
            timed_out: false,
            duration: Duration::from_secs(1),
        };
        assert!(run.success());
        assert_eq!(run.outcome().result.as_deref(), Some("HI"));

        let timed_out = ContainerRun {
            exit_code: 0,
            timed_out: true,
            ..run.clone()
        };
        assert!(!timed_out.success());
        assert!(!timed_out.outcome().is_success());
    }

    #[test]
    fn crashed_run_has_absent_result() {
        let run = ContainerRun {
            stdout: String::new(),
            stderr: "Traceback (most recent call last): ...".into(),
            exit_code: 1,
            timed_out: false,
            duration: Duration::from_secs(1),
        };
        let outcome = run.outcome();
        assert!(outcome.result.is_none());
        assert!(outcome.error.unwrap().contains("exited with code 1"));
    }

    #[tokio::test]
    async fn mock_launcher_scripted_then_echo() {
        let mock = MockLauncher::new(vec![ContainerRun {
            stdout: "1.0".into(),
            stderr: String::new(),
            exit_code: 0,
            timed_out: false,
            duration: Duration::from_millis(5),
        }]);

        let first = mock.launch(Path::new("/tmp/s"), "hi").await.unwrap();
        assert_eq!(first.stdout, "1.0");

        // Scripted runs exhausted: falls back to echoing the input.
        let second = mock.launch(Path::new("/tmp/s"), "echo me").await.unwrap();
        assert_eq!(second.stdout, "echo me");

        let launches = mock.launches().await;
        assert_eq!(launches.len(), 2);
        assert_eq!(launches[0].1, "hi");
    }
}
