#![deny(unused)]
//! Sandbox layer for the scaffold harness.
//!
//! This crate owns the runtime image lifecycle and the launch of one-shot
//! evaluation containers via the `bollard` crate. Each container runs
//! exactly one scaffold evaluation with a read-only view of the staged
//! package and no capabilities beyond the host bridge.
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  Host harness                            │
//! │    ImageManager  (build / ensure image)  │
//! │    DockerLauncher                        │
//! │      ↓ Docker API via bollard            │
//! ├──────────────────────────────────────────┤
//! │  Container (isolated, one evaluation)    │
//! │    sandbox-runner <input>                │
//! │    /workspace/scaffold  (bind, ro)       │
//! │    host.docker.internal → bridge only    │
//! └──────────────────────────────────────────┘
//! ```

pub mod image;
pub mod runner;

pub use image::ImageManager;
pub use runner::{ContainerRun, DockerLauncher, LaunchConfig, MockLauncher, SandboxLauncher};
