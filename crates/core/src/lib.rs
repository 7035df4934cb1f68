#![deny(unused)]
//! Core types, traits, and error definitions for the scaffold harness.
//!
//! This crate provides the foundational building blocks shared across the
//! packaging, sandbox, bridge, and shim layers.

pub mod error;
pub mod logging;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use traits::*;
pub use types::*;
