#![deny(unused)]
//! scaffold-harness: evaluate one staged scaffold in a sandbox.
//!
//! Environment-driven on purpose; there is no CLI framework here. The
//! binary takes a staged package directory and an input (second argument,
//! stdin as a fallback), makes sure the runtime image exists when a build
//! context is configured, launches one sandbox, and relays its output.
//!
//! Environment:
//! - `SCAFFOLD_IMAGE`: runtime image tag (default `scaffold-runner:latest`)
//! - `SCAFFOLD_BUILD_CONTEXT`: build context; when set, the image is
//!   built if its tag does not resolve yet
//! - `LOG_LEVEL`: harness log level
//! - `EXECUTOR_MODEL_SPEC`, `EXECUTOR_THINKING_BUDGET`, `SCORING_URL`,
//!   provider API keys: forwarded into the sandbox

use std::path::PathBuf;
use std::str::FromStr;

use tracing::Level;

use scaffold_sandbox::{DockerLauncher, ImageManager, LaunchConfig, SandboxLauncher};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let log_level = std::env::var("LOG_LEVEL")
        .ok()
        .and_then(|raw| Level::from_str(&raw).ok())
        .unwrap_or(Level::INFO);
    scaffold_core::logging::init(log_level);

    let mut args = std::env::args().skip(1);
    let scaffold_dir = match args.next() {
        Some(dir) => PathBuf::from(dir),
        None => anyhow::bail!("usage: scaffold-harness <scaffold-dir> [input]"),
    };
    let input = match args.next() {
        Some(input) => input,
        None => {
            use std::io::Read;
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer.trim_end().to_string()
        }
    };

    let mut config = LaunchConfig::default();
    if let Ok(image) = std::env::var("SCAFFOLD_IMAGE") {
        config.image = image;
    }

    if let Ok(context) = std::env::var("SCAFFOLD_BUILD_CONTEXT") {
        ImageManager::new(config.image.clone())
            .ensure(PathBuf::from(context).as_path())
            .await?;
    }

    let launcher = DockerLauncher::new(config)?;
    if !launcher.is_available().await {
        anyhow::bail!("Docker daemon not reachable");
    }

    tracing::info!(scaffold = %scaffold_dir.display(), "Launching sandbox");
    let run = launcher.launch(&scaffold_dir, &input).await?;

    // Relay the sandbox's streams for immediate feedback.
    {
        use std::io::Write;
        eprint!("{}", run.stderr);
        print!("{}", run.stdout);
        std::io::stdout().flush()?;
    }

    let outcome = run.outcome();
    if let Some(error) = &outcome.error {
        tracing::error!(error = %error, "Evaluation did not produce a result");
    }

    let code = if run.success() {
        0
    } else {
        run.exit_code.clamp(1, 125) as i32
    };
    std::process::exit(code);
}
