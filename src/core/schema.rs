// src/core/schema.rs

use crate::constants::POSITIONAL_KEY;
use crate::models::{Metadata, OptionDef, OptionType, OptionValue};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Represents configuration defects in a command's option declarations.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SchemaError {
    /// Two options share the same canonical name.
    #[error("Option '--{name}' is declared more than once in command '{command}'.")]
    DuplicateOption {
        /// The command whose metadata holds the duplicates.
        command: String,
        /// The repeated name.
        name: String,
    },
    /// An alias spelling is already taken by another option's name or alias.
    #[error("Alias '{alias}' of option '--{option}' in command '{command}' is already in use.")]
    ConflictingAlias {
        /// The command whose metadata holds the conflict.
        command: String,
        /// The option declaring the alias.
        option: String,
        /// The conflicting spelling.
        alias: String,
    },
}

/// The tokenizer-facing form of a command's options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseSchema {
    /// Keys parsed as strings. Always starts with the positional key.
    pub strings: Vec<String>,
    /// Keys parsed as booleans.
    pub booleans: Vec<String>,
    /// Canonical name -> alternate spellings.
    pub aliases: HashMap<String, Vec<String>>,
    /// Canonical name -> value used when the option is not given.
    pub defaults: HashMap<String, OptionValue>,
}

impl ParseSchema {
    /// Whether `key` is a canonical boolean name. Aliases are not matched.
    pub fn is_boolean(&self, key: &str) -> bool {
        self.booleans.iter().any(|b| b == key)
    }

    /// Whether `key` is a canonical string name. Aliases are not matched.
    pub fn is_string(&self, key: &str) -> bool {
        self.strings.iter().any(|s| s == key)
    }
}

/// Turns option descriptors into a parse schema.
///
/// Every option is classified by type, gets an alias entry (possibly empty), and a
/// default: the declared one, or the type default (`Unset` for strings, `false` for
/// booleans).
pub fn normalize(options: &[OptionDef]) -> ParseSchema {
    let mut schema = ParseSchema {
        strings: vec![POSITIONAL_KEY.to_string()],
        ..Default::default()
    };

    for option in options {
        match option.option_type {
            OptionType::String => schema.strings.push(option.name.clone()),
            OptionType::Boolean => schema.booleans.push(option.name.clone()),
        }
        schema
            .aliases
            .insert(option.name.clone(), option.aliases.clone());
        schema
            .defaults
            .insert(option.name.clone(), option.effective_default());
    }

    schema
}

/// Builds the parse schema for a command's metadata.
pub fn metadata_to_schema(metadata: &Metadata) -> ParseSchema {
    normalize(&metadata.options)
}

/// Checks that option names and alias spellings are unique within one command.
pub fn check_option_names(metadata: &Metadata) -> Result<(), SchemaError> {
    let mut names = HashSet::new();
    for option in &metadata.options {
        if !names.insert(option.name.as_str()) {
            return Err(SchemaError::DuplicateOption {
                command: metadata.name.clone(),
                name: option.name.clone(),
            });
        }
    }

    let mut taken: HashSet<&str> = names;
    for option in &metadata.options {
        for alias in &option.aliases {
            if !taken.insert(alias.as_str()) {
                return Err(SchemaError::ConflictingAlias {
                    command: metadata.name.clone(),
                    option: option.name.clone(),
                    alias: alias.clone(),
                });
            }
        }
    }

    Ok(())
}

// MARK: --- UNIT TESTS ---
