// src/core/serializer.rs

use crate::constants::NEGATION_PREFIX;
use crate::models::{OptionValue, ParsedOptions};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // A `--name=value` token whose value holds whitespace between other characters.
    static ref SPACED_VALUE_RE: Regex = Regex::new(r"^(--[A-Za-z0-9-]+)=(.+\s+.+)$").unwrap();
}

/// Controls how a parsed-options record is turned back into argv.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToArgvOptions {
    /// Emit `--name=value` instead of `--name value`.
    pub use_equals: bool,
    /// Wrap values with embedded whitespace in double quotes. Implies `use_equals`.
    pub use_double_quotes: bool,
    /// Leave `false` booleans out instead of emitting `--no-name`.
    pub ignore_false: bool,
}

impl Default for ToArgvOptions {
    fn default() -> Self {
        Self {
            use_equals: true,
            use_double_quotes: false,
            ignore_false: true,
        }
    }
}

impl ToArgvOptions {
    /// The defaults, with values containing whitespace wrapped in double quotes.
    pub fn quoted() -> Self {
        Self {
            use_double_quotes: true,
            ..Default::default()
        }
    }
}

/// Serializes the named entries of `options` back into argv tokens.
///
/// Positional and pass-through tokens are not emitted; callers that forward those do so
/// explicitly. Entries are emitted in the order they were set.
pub fn to_argv(options: &ParsedOptions, config: &ToArgvOptions) -> Vec<String> {
    let use_equals = config.use_equals || config.use_double_quotes;
    let mut argv = Vec::new();

    for (name, value) in options.named() {
        match value {
            OptionValue::Unset => {}
            OptionValue::Bool(true) => argv.push(format!("--{name}")),
            OptionValue::Bool(false) => {
                if !config.ignore_false {
                    argv.push(format!("--{NEGATION_PREFIX}{name}"));
                }
            }
            OptionValue::String(s) if use_equals => {
                let token = format!("--{name}={s}");
                if config.use_double_quotes {
                    argv.push(SPACED_VALUE_RE.replace(&token, "$1=\"$2\"").into_owned());
                } else {
                    argv.push(token);
                }
            }
            OptionValue::String(s) => {
                argv.push(format!("--{name}"));
                argv.push(s.clone());
            }
        }
    }

    argv
}

// MARK: --- UNIT TESTS ---
