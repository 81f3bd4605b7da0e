// src/models.rs

use crate::constants::{PASSTHROUGH_KEY, POSITIONAL_KEY};
use crate::core::validators::Validator;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

// --- METADATA MODELS ---
// Declared once per namespace or command. These are what a manifest file
// deserializes into, and what every schema/filter operation reads from.

/// The declared metadata of a namespace or command.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct Metadata {
    /// Unique within the parent collection.
    pub name: String,
    /// One-line help text.
    #[serde(default)]
    pub description: Option<String>,
    /// Positional inputs, in order.
    #[serde(default)]
    pub inputs: Vec<InputDef>,
    /// Named options.
    #[serde(default)]
    pub options: Vec<OptionDef>,
}

impl Metadata {
    /// Creates metadata with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sets the help text.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Appends a positional input.
    pub fn with_input(mut self, input: InputDef) -> Self {
        self.inputs.push(input);
        self
    }

    /// Appends a named option.
    pub fn with_option(mut self, option: OptionDef) -> Self {
        self.options.push(option);
        self
    }

    /// Finds the option declared under `key`, either as its canonical name or as an alias.
    pub fn find_option(&self, key: &str) -> Option<&OptionDef> {
        self.options
            .iter()
            .find(|o| o.name == key || o.aliases.iter().any(|a| a == key))
    }
}

/// A positional input expected by a command.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct InputDef {
    /// Used in validation messages.
    pub name: String,
    /// One-line help text.
    #[serde(default)]
    pub description: Option<String>,
    /// Private inputs never leave the process in usage reports.
    #[serde(default)]
    pub private: bool,
    /// Checks run in order; every failure is reported.
    #[serde(default)]
    pub validators: Vec<Validator>,
}

impl InputDef {
    /// An input with no validators.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Keeps the value out of usage reports.
    pub fn private(mut self) -> Self {
        self.private = true;
        self
    }

    /// Appends a validator.
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }
}

/// The value type of an option. Anything not declared boolean is a string.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    /// Takes a value.
    #[default]
    String,
    /// A switch, negatable with `--no-`.
    Boolean,
}

impl OptionType {
    /// The value an option of this type takes when it declares no default.
    pub fn type_default(self) -> OptionValue {
        match self {
            Self::String => OptionValue::Unset,
            Self::Boolean => OptionValue::Bool(false),
        }
    }
}

/// Declaratively describes one named flag.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct OptionDef {
    /// The canonical key.
    pub name: String,
    /// One-line help text.
    #[serde(default)]
    pub description: Option<String>,
    /// Declared as `type` in manifests.
    #[serde(default, rename = "type")]
    pub option_type: OptionType,
    /// The value used when the option is not given.
    #[serde(default)]
    pub default: Option<OptionValue>,
    /// Alternate spellings, usually single letters.
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Downstream tools the option is forwarded to.
    #[serde(default)]
    pub groups: Option<Vec<String>>,
    /// Purposes the option serves. `None` means general-purpose.
    #[serde(default)]
    pub intents: Option<Vec<String>>,
    /// Private options are left out of usage reports.
    #[serde(default)]
    pub private: bool,
}

impl OptionDef {
    /// A string option with no default.
    pub fn string(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// A boolean option, `false` unless given.
    pub fn boolean(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            option_type: OptionType::Boolean,
            ..Default::default()
        }
    }

    /// Sets the declared default.
    pub fn with_default(mut self, value: impl Into<OptionValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Replaces the alias spellings.
    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_string()).collect();
        self
    }

    /// Replaces the groups.
    pub fn with_groups(mut self, groups: &[&str]) -> Self {
        self.groups = Some(groups.iter().map(|g| g.to_string()).collect());
        self
    }

    /// Replaces the intents.
    pub fn with_intents(mut self, intents: &[&str]) -> Self {
        self.intents = Some(intents.iter().map(|i| i.to_string()).collect());
        self
    }

    /// Keeps the value out of usage reports.
    pub fn private(mut self) -> Self {
        self.private = true;
        self
    }

    /// The declared default, or the type default when none is declared.
    pub fn effective_default(&self) -> OptionValue {
        self.default
            .clone()
            .unwrap_or_else(|| self.option_type.type_default())
    }
}

// --- PARSED OPTION MODELS ---

/// The value of a single named option after tokenizing.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum OptionValue {
    /// A switch.
    Bool(bool),
    /// A given string, possibly empty.
    String(String),
    /// A string option that was never given and has no default. Not the same as `""`.
    Unset,
}

impl OptionValue {
    /// The string value, if this is a given string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The boolean value, if this is a switch.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Whether the value counts as "given": a non-empty string or `true`.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::String(s) => !s.is_empty(),
            Self::Unset => false,
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// The structured result of tokenizing argv against a schema: the positional list,
/// the optional pass-through list after a bare `--`, and the named entries in the
/// order they were first set.
#[derive(Debug, Clone, Default)]
pub struct ParsedOptions {
    /// Bare tokens, in order. Reserved key `_`.
    pub positional: Vec<String>,
    /// Tokens after a bare `--`, verbatim. Reserved key `--`.
    pub passthrough: Option<Vec<String>>,
    named: Vec<(String, OptionValue)>,
}

impl ParsedOptions {
    /// An empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// A record holding only the reserved positional and pass-through lists.
    pub fn with_reserved(positional: Vec<String>, passthrough: Option<Vec<String>>) -> Self {
        Self {
            positional,
            passthrough,
            named: Vec::new(),
        }
    }

    /// Builds a record from positional tokens and named entries.
    pub fn from_parts<K, V>(positional: &[&str], named: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<OptionValue>,
    {
        let mut options = Self {
            positional: positional.iter().map(|p| p.to_string()).collect(),
            ..Default::default()
        };
        for (key, value) in named {
            options.insert(key, value);
        }
        options
    }

    /// Sets `key`, keeping its original position if it already exists.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) {
        let key = key.into();
        let value = value.into();
        match self.named.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.named.push((key, value)),
        }
    }

    /// The value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.named.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Whether `key` has a value, `Unset` included.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Named entries in insertion order.
    pub fn named(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.named.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of named entries.
    pub fn named_len(&self) -> usize {
        self.named.len()
    }
}

impl PartialEq for ParsedOptions {
    fn eq(&self, other: &Self) -> bool {
        self.positional == other.positional
            && self.passthrough == other.passthrough
            && self.named.len() == other.named.len()
            && self
                .named
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|ov| ov == v))
    }
}

impl Serialize for ParsedOptions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let extra = usize::from(self.passthrough.is_some());
        let mut map = serializer.serialize_map(Some(self.named.len() + 1 + extra))?;
        map.serialize_entry(POSITIONAL_KEY, &self.positional)?;
        for (key, value) in &self.named {
            map.serialize_entry(key, value)?;
        }
        if let Some(passthrough) = &self.passthrough {
            map.serialize_entry(PASSTHROUGH_KEY, passthrough)?;
        }
        map.end()
    }
}

// MARK: --- UNIT TESTS ---
