// src/lib.rs

//! Lazy namespace/command resolution for CLI tools, with a declarative option pipeline.

/// The `quiver` driver: clap definitions and dispatch.
pub mod cli;
/// Reserved keys and well-known file names.
pub mod constants;
/// Resolution engine and option pipeline.
pub mod core;
/// TOML manifests as lazy trees.
pub mod manifest;
/// Metadata and parsed option models.
pub mod models;
