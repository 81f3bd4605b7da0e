// src/core/filter.rs

use crate::models::{Metadata, OptionDef, OptionValue, ParsedOptions};
use std::collections::HashMap;

/// Decides whether a known option (with its parsed value) survives a filter.
pub trait OptionPredicate: Fn(&OptionDef, &OptionValue) -> bool {}

impl<F: Fn(&OptionDef, &OptionValue) -> bool> OptionPredicate for F {}

fn intersects(wanted: &[String], declared: &[String]) -> bool {
    wanted.iter().any(|g| declared.contains(g))
}

/// Keeps options that declare at least one of `groups`.
pub fn includes_groups<S: AsRef<str>>(groups: &[S]) -> impl OptionPredicate {
    let wanted: Vec<String> = groups.iter().map(|g| g.as_ref().to_string()).collect();
    move |option: &OptionDef, _: &OptionValue| {
        option
            .groups
            .as_deref()
            .is_some_and(|declared| intersects(&wanted, declared))
    }
}

/// Keeps options with no groups, and options with at least one group outside `groups`.
///
/// Only options whose groups all fall within `groups` are rejected.
pub fn excludes_groups<S: AsRef<str>>(groups: &[S]) -> impl OptionPredicate {
    let excluded: Vec<String> = groups.iter().map(|g| g.as_ref().to_string()).collect();
    move |option: &OptionDef, _: &OptionValue| {
        option
            .groups
            .as_deref()
            .is_none_or(|declared| declared.iter().any(|d| !excluded.contains(d)))
    }
}

/// Narrows `options` to the ones `metadata` declares and `predicate` accepts.
///
/// # Logic:
/// - The positional list and the pass-through list are always kept.
/// - Each named key is looked up by canonical name or alias spelling; unknown keys are dropped.
/// - Surviving entries are stored under the option's canonical name.
pub fn filter_command_line_options(
    metadata: &Metadata,
    options: &ParsedOptions,
    predicate: impl OptionPredicate,
) -> ParsedOptions {
    let mut lookup: HashMap<&str, &OptionDef> = HashMap::new();
    for option in &metadata.options {
        lookup.insert(option.name.as_str(), option);
    }
    for option in &metadata.options {
        for alias in &option.aliases {
            lookup.insert(alias.as_str(), option);
        }
    }

    let mut filtered =
        ParsedOptions::with_reserved(options.positional.clone(), options.passthrough.clone());

    for (key, value) in options.named() {
        if let Some(option) = lookup.get(key).copied()
            && predicate(option, value)
        {
            filtered.insert(option.name.clone(), value.clone());
        }
    }

    filtered
}

/// Keeps only the options belonging to at least one of `groups`.
pub fn filter_command_line_options_by_group<S: AsRef<str>>(
    metadata: &Metadata,
    options: &ParsedOptions,
    groups: &[S],
) -> ParsedOptions {
    filter_command_line_options(metadata, options, includes_groups(groups))
}

/// Selects options by intent.
///
/// Without an intent, options that declare no intents are kept. With an intent, options
/// whose intents contain it are kept. Keys keep the spelling they were parsed under.
pub fn filter_options_by_intent(
    metadata: &Metadata,
    options: &ParsedOptions,
    intent: Option<&str>,
) -> ParsedOptions {
    let mut filtered =
        ParsedOptions::with_reserved(options.positional.clone(), options.passthrough.clone());

    for (key, value) in options.named() {
        let Some(option) = metadata.find_option(key) else {
            continue;
        };
        let keep = match (intent, option.intents.as_deref()) {
            (Some(wanted), Some(intents)) => intents.iter().any(|i| i == wanted),
            (None, None) => true,
            _ => false,
        };
        if keep {
            filtered.insert(key, value.clone());
        }
    }

    filtered
}

// MARK: --- UNIT TESTS ---
