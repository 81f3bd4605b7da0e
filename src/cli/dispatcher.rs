// src/cli/dispatcher.rs

use crate::cli::Cli;
use crate::constants::MANIFEST_ENV_VAR;
use crate::core::arg_parser::parse_args;
use crate::core::filter::{filter_command_line_options_by_group, filter_options_by_intent};
use crate::core::schema::metadata_to_schema;
use crate::core::serializer::{ToArgvOptions, to_argv};
use crate::core::tree::{Entity, get_command_metadata_list, locate};
use crate::core::usage::{clean_inputs_for_usage, command_path_string};
use crate::core::validators::validate_inputs;
use crate::manifest::{Manifest, find_manifest};
use crate::models::ParsedOptions;
use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;
use std::env;

/// What the driver should compute besides the resolution itself.
#[derive(Debug, Clone, Default)]
pub struct ReportSettings {
    /// Groups whose options are re-serialized as a forwarded argv. Empty means none.
    pub groups: Vec<String>,
    /// The intent whose options are reported; `None` reports intentless options.
    pub intent: Option<String>,
}

/// The outcome of resolving one command line.
#[derive(Serialize, Debug)]
pub struct Resolution {
    /// `"command"` or `"namespace"`.
    pub kind: &'static str,
    /// Space-joined names from the root down to the resolved entity.
    pub command: String,
    /// The keys as typed on the command line.
    pub keys: Vec<String>,
    /// Tokens left over after resolution.
    pub args: Vec<String>,
    /// Present when a command was reached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<ParsedOptions>,
    /// Options of the requested groups, as argv for a downstream tool.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forwarded: Option<Vec<String>>,
    /// Options selected by intent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent_options: Option<ParsedOptions>,
    /// The scrubbed invocation, safe to report.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Vec<String>>,
}

/// One row of `--list`.
#[derive(Serialize, Debug)]
pub struct ListedCommand {
    /// Space-joined names from the root down to the command.
    pub command: String,
    /// The canonical keys leading to the command.
    pub keys: Vec<String>,
    /// Alias spellings of the command's key.
    pub aliases: Vec<String>,
    /// One-line help text.
    pub description: Option<String>,
}

/// The main application dispatcher: finds the manifest, then lists or resolves.
pub async fn dispatch(cli: Cli) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);

    let cwd = env::current_dir().context("Could not determine the current directory")?;
    let path = find_manifest(
        cli.manifest.as_deref(),
        env::var(MANIFEST_ENV_VAR).ok(),
        &cwd,
        dirs::config_dir(),
    )?;
    let manifest = Manifest::load(&path)?;

    if cli.list {
        let listed = list_commands(&manifest).await?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&listed)?);
        } else {
            print_listing(&listed);
        }
        return Ok(());
    }

    let settings = ReportSettings {
        groups: cli.group,
        intent: cli.intent,
    };
    let resolution = resolve(&manifest, &cli.args, &settings).await?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
    } else {
        print_resolution(&resolution);
    }
    Ok(())
}

/// Resolves `argv` against the manifest tree and, for commands, runs the full option
/// pipeline: parse, validate inputs, run, then project the options.
pub async fn resolve(
    manifest: &Manifest,
    argv: &[String],
    settings: &ReportSettings,
) -> Result<Resolution> {
    let located = locate(manifest.root(), argv).await?;
    let keys: Vec<String> = located.path.iter().map(|(key, _)| key.clone()).collect();
    let command_path = command_path_string(&located.obj);
    log::debug!("Resolved '{}' with args {:?}", command_path, located.args);

    let Entity::Command(command) = &located.obj else {
        return Ok(Resolution {
            kind: "namespace",
            command: command_path,
            keys,
            args: located.args,
            options: None,
            forwarded: None,
            intent_options: None,
            usage: None,
        });
    };

    let metadata = command.metadata();
    let options = parse_args(&metadata_to_schema(&metadata), &located.args);
    validate_inputs(&metadata, &options.positional)
        .with_context(|| format!("Invalid input for '{}'", command_path))?;

    command.run(&options.positional, &options).await?;

    let forwarded = (!settings.groups.is_empty()).then(|| {
        let grouped = filter_command_line_options_by_group(&metadata, &options, &settings.groups);
        to_argv(&grouped, &ToArgvOptions::default())
    });
    let intent_options = filter_options_by_intent(&metadata, &options, settings.intent.as_deref());
    let usage = clean_inputs_for_usage(&metadata, &options.positional, &options);

    Ok(Resolution {
        kind: "command",
        command: command_path,
        keys,
        args: located.args,
        options: Some(options),
        forwarded,
        intent_options: Some(intent_options),
        usage: Some(usage),
    })
}

/// Every command of the manifest, depth-first.
pub async fn list_commands(manifest: &Manifest) -> Result<Vec<ListedCommand>> {
    let entries = get_command_metadata_list(manifest.root()).await?;
    Ok(entries
        .into_iter()
        .map(|entry| {
            let metadata = entry.command.metadata();
            ListedCommand {
                command: command_path_string(&Entity::Command(entry.command.clone())),
                keys: entry.path.iter().map(|(key, _)| key.clone()).collect(),
                aliases: entry.aliases,
                description: metadata.description,
            }
        })
        .collect())
}

// --- Plain-text rendering ---

fn print_resolution(resolution: &Resolution) {
    println!(
        "\n--- {} {} '{}' ---",
        "Resolved".bold(),
        resolution.kind,
        resolution.command.yellow()
    );
    println!("  {:<15} {}", "keys".blue(), resolution.keys.join(" "));
    println!("  {:<15} {:?}", "args".blue(), resolution.args);

    if let Some(options) = &resolution.options {
        println!("  {:<15} {:?}", "inputs".blue(), options.positional);
        for (name, value) in options.named() {
            println!("  {:<15} {} = {:?}", "option".blue(), name.cyan(), value);
        }
        if let Some(passthrough) = &options.passthrough {
            println!("  {:<15} {:?}", "passthrough".blue(), passthrough);
        }
    }
    if let Some(forwarded) = &resolution.forwarded {
        println!("  {:<15} {}", "forwarded".blue(), forwarded.join(" "));
    }
    if let Some(intent_options) = &resolution.intent_options {
        let names: Vec<&str> = intent_options.named().map(|(name, _)| name).collect();
        println!("  {:<15} {}", "intent".blue(), names.join(", ").dimmed());
    }
    if let Some(usage) = &resolution.usage {
        println!("  {:<15} {}", "usage".blue(), usage.join(" ").dimmed());
    }
}

fn print_listing(listed: &[ListedCommand]) {
    println!("\n--- {} ---", "Commands".bold());
    for row in listed {
        let aliases = if row.aliases.is_empty() {
            String::new()
        } else {
            format!(" (aliases: {})", row.aliases.join(", "))
        };
        println!(
            "  {:<30} {}{}",
            row.keys.join(" ").cyan(),
            row.description.as_deref().unwrap_or_default(),
            aliases.dimmed()
        );
    }
}

// MARK: --- UNIT TESTS ---

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OptionValue;

    const MANIFEST: &str = r#"
name = "ionic"

[[namespaces]]
name = "cordova"

[[namespaces.commands]]
name = "run"
aliases = ["r"]
description = "Run on a device"
inputs = [{ name = "platform", validators = ["required"] }]
options = [
    { name = "prod", type = "boolean", groups = ["app-scripts", "cordova"] },
    { name = "target", aliases = ["t"], groups = ["cordova"], intents = ["device"] },
    { name = "livereload", type = "boolean", groups = ["app-scripts"] },
]
"#;

    fn argv(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[tokio::test]
    async fn test_resolve_command_runs_full_pipeline() {
        let manifest = Manifest::from_toml_str(MANIFEST).unwrap();
        let settings = ReportSettings {
            groups: vec!["cordova".to_string()],
            intent: Some("device".to_string()),
        };

        let resolution = resolve(
            &manifest,
            &argv(&["cordova", "r", "ios", "--prod", "-t", "emulator", "--livereload"]),
            &settings,
        )
        .await
        .unwrap();

        assert_eq!(resolution.kind, "command");
        assert_eq!(resolution.command, "ionic cordova run");
        assert_eq!(resolution.keys, vec!["cordova", "r"]);

        let options = resolution.options.unwrap();
        assert_eq!(options.positional, vec!["ios"]);
        assert_eq!(options.get("target"), Some(&OptionValue::from("emulator")));

        assert_eq!(
            resolution.forwarded,
            Some(argv(&["--prod", "--target=emulator"]))
        );
        let intent = resolution.intent_options.unwrap();
        assert!(intent.contains_key("target"));
        assert!(!intent.contains_key("prod"));
        assert_eq!(
            resolution.usage,
            Some(argv(&["ios", "--prod", "--target=emulator", "--livereload"]))
        );
    }

    #[tokio::test]
    async fn test_resolve_rejects_missing_required_input() {
        let manifest = Manifest::from_toml_str(MANIFEST).unwrap();
        let err = resolve(&manifest, &argv(&["cordova", "run"]), &ReportSettings::default())
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("platform must not be empty."));
    }

    #[tokio::test]
    async fn test_resolve_stops_at_namespace() {
        let manifest = Manifest::from_toml_str(MANIFEST).unwrap();
        let resolution = resolve(&manifest, &argv(&["cordova", "build"]), &ReportSettings::default())
            .await
            .unwrap();
        assert_eq!(resolution.kind, "namespace");
        assert_eq!(resolution.command, "ionic cordova");
        assert_eq!(resolution.args, vec!["build"]);
        assert!(resolution.options.is_none());

        let json = serde_json::to_value(&resolution).unwrap();
        assert!(json.get("options").is_none());
    }

    #[tokio::test]
    async fn test_list_commands() {
        let manifest = Manifest::from_toml_str(MANIFEST).unwrap();
        let listed = list_commands(&manifest).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].command, "ionic cordova run");
        assert_eq!(listed[0].keys, vec!["cordova", "run"]);
        assert_eq!(listed[0].aliases, vec!["r"]);
        assert_eq!(listed[0].description.as_deref(), Some("Run on a device"));
    }
}
