#![deny(unused)]
//! Sandbox execution shim.
//!
//! Inside the sandbox, this crate loads the staged scaffold's entry
//! function, invokes it on one input with full error containment, and
//! emits the outcome. The shim never sees network credentials or scoring
//! logic; scaffolds get those capabilities through the bridge clients.
//!
//! The shim is handed a reference to a single callable with the fixed
//! signature (the [`scaffold_core::Scaffold`] trait); how that callable
//! came to exist is the loader's concern. Two loaders ship here: closures
//! via [`FnScaffold`] and the subprocess contract via [`ProcessScaffold`].

pub mod process;
pub mod run;

pub use process::{load_staged, FnScaffold, ProcessScaffold, DEFAULT_INTERPRETER};
pub use run::run;
