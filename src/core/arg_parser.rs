// src/core/arg_parser.rs

use crate::constants::{NEGATION_PREFIX, PASSTHROUGH_KEY};
use crate::core::schema::ParseSchema;
use crate::models::{OptionValue, ParsedOptions};
use std::collections::{HashMap, HashSet};

/// Per-call tokenizer state: the schema expanded so that every alias spelling knows its
/// type and its sibling spellings.
#[derive(Debug)]
struct Tokenizer<'s> {
    schema: &'s ParseSchema,
    /// Every spelling -> all other spellings of the same option.
    aliases: HashMap<String, Vec<String>>,
    booleans: HashSet<String>,
    strings: HashSet<String>,
    parsed: ParsedOptions,
}

impl<'s> Tokenizer<'s> {
    fn new(schema: &'s ParseSchema) -> Self {
        let mut aliases: HashMap<String, Vec<String>> = HashMap::new();
        for (name, spellings) in &schema.aliases {
            let group: Vec<&String> = std::iter::once(name).chain(spellings).collect();
            for &member in &group {
                let others = group
                    .iter()
                    .filter(|&&other| other != member)
                    .map(|&other| other.clone());
                aliases.entry(member.clone()).or_default().extend(others);
            }
        }

        let expand = |keys: &[String]| -> HashSet<String> {
            keys.iter()
                .flat_map(|k| {
                    let siblings = aliases.get(k).cloned().unwrap_or_default();
                    std::iter::once(k.clone()).chain(siblings)
                })
                .collect()
        };
        let booleans = expand(&schema.booleans);
        let strings = expand(&schema.strings);

        Self {
            schema,
            aliases,
            booleans,
            strings,
            parsed: ParsedOptions::new(),
        }
    }

    /// Sets `key` and every alias spelling of it.
    fn set(&mut self, key: &str, value: OptionValue) {
        if let Some(siblings) = self.aliases.get(key) {
            for sibling in siblings {
                self.parsed.insert(sibling.clone(), value.clone());
            }
        }
        self.parsed.insert(key, value);
    }

    /// The value a flag takes when no explicit value follows it.
    fn bare_flag_value(&self, key: &str) -> OptionValue {
        if self.strings.contains(key) && !self.booleans.contains(key) {
            OptionValue::String(String::new())
        } else {
            OptionValue::Bool(true)
        }
    }

    /// Handles a flag that may take the next token as its value. Returns whether the next
    /// token was consumed.
    fn flag_with_lookahead(&mut self, key: &str, next: Option<&str>) -> bool {
        let is_boolean = self.booleans.contains(key);
        match next {
            Some(n) if !is_boolean && !looks_like_flag(n) => {
                self.set(key, OptionValue::String(n.to_string()));
                true
            }
            Some(n @ ("true" | "false")) if is_boolean => {
                self.set(key, OptionValue::Bool(n == "true"));
                true
            }
            _ => {
                let value = self.bare_flag_value(key);
                self.set(key, value);
                false
            }
        }
    }

    fn explicit_value(&self, key: &str, value: &str) -> OptionValue {
        if self.booleans.contains(key) {
            OptionValue::Bool(value != "false")
        } else {
            OptionValue::String(value.to_string())
        }
    }

    /// Fills in schema defaults for every option (and alias) the argv did not set.
    fn apply_defaults(&mut self) {
        let schema = self.schema;
        let mut names: Vec<&String> = schema.defaults.keys().collect();
        names.sort();
        for name in names {
            let Some(default) = schema.defaults.get(name) else {
                continue;
            };
            if !self.parsed.contains_key(name) {
                self.parsed.insert(name.clone(), default.clone());
            }
            for alias in schema.aliases.get(name).into_iter().flatten() {
                if !self.parsed.contains_key(alias) {
                    self.parsed.insert(alias.clone(), default.clone());
                }
            }
        }
    }

    fn run(mut self, argv: &[String]) -> ParsedOptions {
        let mut tokens = argv.iter().map(String::as_str).peekable();

        while let Some(token) = tokens.next() {
            if token == PASSTHROUGH_KEY {
                self.parsed.passthrough = Some(tokens.by_ref().map(str::to_string).collect());
                break;
            }

            if let Some(body) = token.strip_prefix("--") {
                if let Some((key, value)) = body.split_once('=') {
                    let value = self.explicit_value(key, value);
                    self.set(key, value);
                } else if let Some(negated) = body.strip_prefix(NEGATION_PREFIX)
                    && !negated.is_empty()
                {
                    self.set(negated, OptionValue::Bool(false));
                } else if self.flag_with_lookahead(body, tokens.peek().copied()) {
                    tokens.next();
                }
                continue;
            }

            if let Some(letters) = token.strip_prefix('-')
                && !letters.is_empty()
            {
                // `-k=value`
                if let Some((key, value)) = letters.split_once('=')
                    && key.chars().count() == 1
                {
                    let value = self.explicit_value(key, value);
                    self.set(key, value);
                    continue;
                }

                // `-abc`: every letter but the last is a switch; the last may take a value.
                let chars: Vec<String> = letters.chars().map(String::from).collect();
                if let Some((last, switches)) = chars.split_last() {
                    for switch in switches {
                        self.set(switch, OptionValue::Bool(true));
                    }
                    if self.flag_with_lookahead(last, tokens.peek().copied()) {
                        tokens.next();
                    }
                }
                continue;
            }

            self.parsed.positional.push(token.to_string());
        }

        self.apply_defaults();
        self.parsed
    }
}

/// A token that starts another flag rather than being a value. A lone `-` is a value.
fn looks_like_flag(token: &str) -> bool {
    token.starts_with('-') && token != "-"
}

/// Tokenizes argv into a parsed-options record using `schema`.
///
/// # Logic:
/// - Bare tokens accumulate, in order, into the positional list.
/// - `--name value` and `--name=value` set a string option; unknown names are kept verbatim.
/// - A boolean flag sets `true`; it also consumes a following literal `true`/`false`.
/// - `--no-name` sets `false`.
/// - A known string flag with no value becomes the empty string; an unknown one becomes `true`.
/// - `-f value` and grouped short switches (`-abc`) are supported.
/// - Setting any spelling of an option sets all of its alias spellings.
/// - Everything after a bare `--` is kept verbatim in the pass-through list.
/// - Options not given take their schema default.
pub fn parse_args(schema: &ParseSchema, argv: &[String]) -> ParsedOptions {
    log::debug!("Tokenizing argv: {:?}", argv);
    let parsed = Tokenizer::new(schema).run(argv);
    log::debug!(
        "Tokenized {} positional, {} named",
        parsed.positional.len(),
        parsed.named_len()
    );
    parsed
}

// MARK: --- UNIT TESTS ---

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::{metadata_to_schema, normalize};
    use crate::models::{Metadata, OptionDef};

    // --- Helper to create a Vec<String> from &str slices ---
    fn to_cli_params(params: &[&str]) -> Vec<String> {
        params.iter().map(|s| s.to_string()).collect()
    }

    fn bar_schema() -> ParseSchema {
        metadata_to_schema(
            &Metadata::new("bar")
                .with_option(OptionDef::string("foo").with_aliases(&["f"]))
                .with_option(OptionDef::string("bar").with_default("soup"))
                .with_option(OptionDef::boolean("flag1")),
        )
    }

    #[test]
    fn test_parse_empty_argv_applies_defaults() {
        let result = parse_args(&bar_schema(), &[]);
        let expected = ParsedOptions::from_parts(
            &[],
            [
                ("foo", OptionValue::Unset),
                ("f", OptionValue::Unset),
                ("bar", OptionValue::from("soup")),
                ("flag1", OptionValue::Bool(false)),
            ],
        );
        assert_eq!(result, expected);
    }

    #[test]
    fn test_parse_comprehensive_argv() {
        let params = to_cli_params(&[
            "cat",
            "--foo",
            "rabbit",
            "dog",
            "--bar=salad",
            "--unknown",
            "wow",
            "--flag1",
            "extra",
            "--and-again",
        ]);
        let result = parse_args(&bar_schema(), &params);
        let expected = ParsedOptions::from_parts(
            &["cat", "dog", "extra"],
            [
                ("foo", OptionValue::from("rabbit")),
                ("f", OptionValue::from("rabbit")),
                ("bar", OptionValue::from("salad")),
                ("flag1", OptionValue::Bool(true)),
                ("unknown", OptionValue::from("wow")),
                ("and-again", OptionValue::Bool(true)),
            ],
        );
        assert_eq!(result, expected);
    }

    #[test]
    fn test_parse_alias_sets_canonical() {
        let params = to_cli_params(&["-f", "hare"]);
        let result = parse_args(&bar_schema(), &params);
        assert_eq!(result.get("foo"), Some(&OptionValue::from("hare")));
        assert_eq!(result.get("f"), Some(&OptionValue::from("hare")));
    }

    #[test]
    fn test_parse_passthrough_after_double_dash() {
        let params = to_cli_params(&["ios", "--flag1", "--", "--developmentTeam=ABCD", "-d", "x"]);
        let result = parse_args(&bar_schema(), &params);
        assert_eq!(result.positional, vec!["ios"]);
        assert_eq!(result.get("flag1"), Some(&OptionValue::Bool(true)));
        assert_eq!(
            result.passthrough,
            Some(to_cli_params(&["--developmentTeam=ABCD", "-d", "x"]))
        );
        assert!(!result.contains_key("developmentTeam"));
    }

    #[test]
    fn test_parse_boolean_negation_and_literal_values() {
        let schema = normalize(&[OptionDef::boolean("build").with_default(true)]);

        let result = parse_args(&schema, &to_cli_params(&["--no-build"]));
        assert_eq!(result.get("build"), Some(&OptionValue::Bool(false)));

        let result = parse_args(&schema, &to_cli_params(&["--build", "false", "next"]));
        assert_eq!(result.get("build"), Some(&OptionValue::Bool(false)));
        assert_eq!(result.positional, vec!["next"]);

        let result = parse_args(&schema, &to_cli_params(&["--build=false"]));
        assert_eq!(result.get("build"), Some(&OptionValue::Bool(false)));

        let result = parse_args(&schema, &[]);
        assert_eq!(result.get("build"), Some(&OptionValue::Bool(true)));
    }

    #[test]
    fn test_parse_known_string_without_value_is_empty() {
        let result = parse_args(&bar_schema(), &to_cli_params(&["--foo", "--flag1"]));
        assert_eq!(result.get("foo"), Some(&OptionValue::from("")));
        assert_eq!(result.get("flag1"), Some(&OptionValue::Bool(true)));
    }

    #[test]
    fn test_parse_grouped_short_switches() {
        let schema = normalize(&[
            OptionDef::boolean("all").with_aliases(&["a"]),
            OptionDef::string("target").with_aliases(&["t"]),
        ]);
        let result = parse_args(&schema, &to_cli_params(&["-at", "web", "-", "-x"]));
        assert_eq!(result.get("all"), Some(&OptionValue::Bool(true)));
        assert_eq!(result.get("target"), Some(&OptionValue::from("web")));
        assert_eq!(result.get("t"), Some(&OptionValue::from("web")));
        assert_eq!(result.get("x"), Some(&OptionValue::Bool(true)));
        assert_eq!(result.positional, vec!["-"]);
    }

    #[test]
    fn test_parse_short_with_equals() {
        let result = parse_args(&bar_schema(), &to_cli_params(&["-f=fox"]));
        assert_eq!(result.get("foo"), Some(&OptionValue::from("fox")));
    }
}
