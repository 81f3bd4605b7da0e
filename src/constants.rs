// src/constants.rs

/// The reserved key under which bare positional tokens are collected.
pub const POSITIONAL_KEY: &str = "_";

/// The reserved key (and the argv token) after which tokens pass through verbatim.
pub const PASSTHROUGH_KEY: &str = "--";

/// The prefix that negates a boolean flag (`--no-<name>`).
pub const NEGATION_PREFIX: &str = "no-";

/// The name of the manifest file looked up in the working and config directories.
pub const MANIFEST_FILENAME: &str = "quiver.toml";

/// The name of the directory (inside the user's config directory) holding the manifest.
pub const CONFIG_DIR_NAME: &str = "quiver";

/// Environment variable that points the driver at a manifest file.
pub const MANIFEST_ENV_VAR: &str = "QUIVER_MANIFEST";
