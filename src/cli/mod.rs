// src/cli/mod.rs

use clap::Parser;
use std::path::PathBuf;

/// Manifest lookup, resolution and report rendering.
pub mod dispatcher;

/// quiver: resolves command lines against a declarative namespace/command tree.
///
/// Everything after the quiver flags (or after a bare `--`) is resolved against the tree.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    styles = clap::builder::Styles::styled()
        .header(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .usage(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .literal(clap::builder::styling::AnsiColor::Cyan.on_default().bold())
        .placeholder(clap::builder::styling::AnsiColor::Green.on_default()),
)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Path to the manifest. Falls back to $QUIVER_MANIFEST, ./quiver.toml, then the
    /// user config directory.
    #[arg(long, value_name = "PATH")]
    pub manifest: Option<PathBuf>,

    /// List every command in the tree instead of resolving argv.
    #[arg(long)]
    pub list: bool,

    /// Emit the report as JSON.
    #[arg(long)]
    pub json: bool,

    /// Option groups to re-serialize as a forwarded argv (e.g. "cordova,app-scripts").
    #[arg(long, value_delimiter = ',', value_name = "GROUP")]
    pub group: Vec<String>,

    /// Report only the options declared for this intent.
    #[arg(long)]
    pub intent: Option<String>,

    /// The command line to resolve.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}
