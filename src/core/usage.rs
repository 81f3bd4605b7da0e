// src/core/usage.rs

//! Projections of a command invocation that are safe to report outside the process.

use crate::core::serializer::{ToArgvOptions, to_argv};
use crate::core::tree::{Entity, generate_command_path};
use crate::models::{Metadata, ParsedOptions};

/// The entity's path as the space-joined names from the root down, e.g. `"ionic cordova run"`.
pub fn command_path_string(entity: &Entity) -> String {
    generate_command_path(entity)
        .into_iter()
        .map(|(name, _)| name)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Scrubs an invocation down to what may be reported, as a flat argv.
///
/// # Logic:
/// - Inputs: when the command declares inputs, only positions with a declared, non-private
///   input are kept. A command with no declared inputs keeps all of them.
/// - Options typed under an alias spelling are dropped (the canonical key carries the value).
/// - Private options are dropped, and so are options still equal to their declared default.
/// - Options the command does not declare are kept.
/// - The kept options are serialized with quoting and appended after the inputs.
pub fn clean_inputs_for_usage(
    metadata: &Metadata,
    inputs: &[String],
    options: &ParsedOptions,
) -> Vec<String> {
    let mut cleaned: Vec<String> = inputs
        .iter()
        .enumerate()
        .filter(|(i, _)| {
            metadata.inputs.is_empty() || metadata.inputs.get(*i).is_some_and(|input| !input.private)
        })
        .map(|(_, input)| input.clone())
        .collect();

    let mut kept = ParsedOptions::new();
    for (key, value) in options.named() {
        let keep = match metadata.find_option(key) {
            None => true,
            Some(option) if option.aliases.iter().any(|a| a == key) => false,
            Some(option) if option.private => false,
            Some(option) => option.default.as_ref() != Some(value),
        };
        if keep {
            kept.insert(key, value.clone());
        }
    }

    cleaned.extend(to_argv(&kept, &ToArgvOptions::quoted()));
    cleaned
}

// MARK: --- UNIT TESTS ---

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::arg_parser::parse_args;
    use crate::core::schema::metadata_to_schema;
    use crate::core::tree::{Command, Namespace};
    use crate::models::{InputDef, OptionDef};
    use std::sync::Arc;

    struct Named {
        name: &'static str,
        parent: Option<Arc<dyn Namespace>>,
    }

    impl Namespace for Named {
        fn metadata(&self) -> Metadata {
            Metadata::new(self.name)
        }

        fn parent(&self) -> Option<Arc<dyn Namespace>> {
            self.parent.clone()
        }
    }

    struct Run {
        namespace: Arc<dyn Namespace>,
    }

    impl Command for Run {
        fn metadata(&self) -> Metadata {
            run_metadata()
        }

        fn namespace(&self) -> Option<Arc<dyn Namespace>> {
            Some(self.namespace.clone())
        }
    }

    fn run_metadata() -> Metadata {
        Metadata::new("run")
            .with_input(InputDef::new("platform"))
            .with_input(InputDef::new("token").private())
            .with_option(OptionDef::string("target").with_aliases(&["t"]))
            .with_option(OptionDef::string("password").private())
            .with_option(OptionDef::string("port").with_default("8100"))
            .with_option(OptionDef::boolean("prod"))
    }

    fn to_cli_params(params: &[&str]) -> Vec<String> {
        params.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_command_path_string() {
        let root: Arc<dyn Namespace> = Arc::new(Named {
            name: "ionic",
            parent: None,
        });
        let cordova: Arc<dyn Namespace> = Arc::new(Named {
            name: "cordova",
            parent: Some(root.clone()),
        });
        let run = Entity::Command(Arc::new(Run { namespace: cordova.clone() }));

        assert_eq!(command_path_string(&run), "ionic cordova run");
        assert_eq!(command_path_string(&Entity::Namespace(cordova)), "ionic cordova");
        assert_eq!(command_path_string(&Entity::Namespace(root)), "ionic");
    }

    #[test]
    fn test_clean_inputs_scrubs_private_alias_and_default() {
        let metadata = run_metadata();
        let parsed = parse_args(
            &metadata_to_schema(&metadata),
            &to_cli_params(&[
                "ios",
                "s3cr3t",
                "extra",
                "-t",
                "my device",
                "--password",
                "hunter2",
                "--prod",
                "--custom=1",
            ]),
        );

        let cleaned = clean_inputs_for_usage(&metadata, &parsed.positional, &parsed);
        assert_eq!(
            cleaned,
            vec!["ios", "--target=\"my device\"", "--prod", "--custom=1"]
        );
    }

    #[test]
    fn test_clean_inputs_keeps_changed_default_and_all_undeclared_inputs() {
        let metadata = Metadata::new("serve").with_option(OptionDef::string("port").with_default("8100"));
        let parsed = parse_args(
            &metadata_to_schema(&metadata),
            &to_cli_params(&["a", "b", "--port", "8200"]),
        );

        let cleaned = clean_inputs_for_usage(&metadata, &parsed.positional, &parsed);
        assert_eq!(cleaned, vec!["a", "b", "--port=8200"]);
    }
}
