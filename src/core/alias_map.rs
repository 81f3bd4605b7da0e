// src/core/alias_map.rs

use anyhow::Result;
use futures::future::{BoxFuture, FutureExt};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;

/// A zero-argument, lazily invoked constructor for a map value.
pub type Factory<T> = Box<dyn Fn() -> BoxFuture<'static, Result<T>> + Send + Sync>;

/// The key of an entry. `Default` marks the entry selected when no token matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MapKey {
    /// A regular key.
    Name(String),
    /// The fallback entry.
    Default,
}

impl MapKey {
    /// The key as a string, unless it is the default key.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            Self::Default => None,
        }
    }
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Default => f.write_str("<default>"),
        }
    }
}

/// A raw map value: either a constructor, or the name of another key in the same map.
pub enum MapEntry<T> {
    /// Builds the value when the key is looked up.
    Factory(Factory<T>),
    /// Another key of the same map.
    Alias(String),
}

impl<T> fmt::Debug for MapEntry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Factory(_) => f.write_str("Factory(..)"),
            Self::Alias(target) => f.debug_tuple("Alias").field(target).finish(),
        }
    }
}

/// An insertion-ordered association list whose values are factories or aliases.
///
/// Used for both the child namespaces and the commands of a namespace. The map is
/// built once (builder style) and only read afterwards.
pub struct AliasMap<T> {
    entries: Vec<(MapKey, MapEntry<T>)>,
}

impl<T> fmt::Debug for AliasMap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, entry)| (k, entry)))
            .finish()
    }
}

impl<T> Default for AliasMap<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T: Send + 'static> AliasMap<T> {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory under `key`.
    pub fn with_factory<F, Fut>(self, key: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        self.with_entry(MapKey::Name(key.into()), MapEntry::Factory(boxed(factory)))
    }

    /// Registers `alias` as another spelling of `target`.
    pub fn with_alias(self, alias: impl Into<String>, target: impl Into<String>) -> Self {
        self.with_entry(MapKey::Name(alias.into()), MapEntry::Alias(target.into()))
    }

    /// Registers the default entry.
    pub fn with_default<F, Fut>(self, factory: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        self.with_entry(MapKey::Default, MapEntry::Factory(boxed(factory)))
    }

    /// Registers a raw entry. An existing key keeps its position and gets the new entry.
    pub fn with_entry(mut self, key: MapKey, entry: MapEntry<T>) -> Self {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = entry,
            None => self.entries.push((key, entry)),
        }
        self
    }
}

impl<T> AliasMap<T> {
    /// Returns the raw entry stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&MapEntry<T>> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_name() == Some(key))
            .map(|(_, entry)| entry)
    }

    /// Returns the factory reachable from `key`.
    ///
    /// Aliases are followed until a factory is found. A chain that runs into a missing
    /// key, or loops back on itself, resolves to `None`.
    pub fn resolve_aliases(&self, key: &str) -> Option<&Factory<T>> {
        let mut current = key;
        for _ in 0..=self.entries.len() {
            match self.get(current)? {
                MapEntry::Factory(factory) => return Some(factory),
                MapEntry::Alias(target) => current = target,
            }
        }
        log::warn!("Alias cycle detected while resolving '{}'", key);
        None
    }

    /// The factory registered as the default entry, if any.
    pub fn default_entry(&self) -> Option<&Factory<T>> {
        self.entries.iter().find_map(|(k, entry)| match (k, entry) {
            (MapKey::Default, MapEntry::Factory(factory)) => Some(factory),
            _ => None,
        })
    }

    /// Iterates over `(key, entry)` pairs in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&MapKey, &MapEntry<T>)> {
        self.entries.iter().map(|(k, entry)| (k, entry))
    }

    /// Builds the canonical key -> alias spellings index.
    ///
    /// Aliases appear in declaration order. Keys nobody points at are omitted, and a
    /// target does not need a factory of its own to be listed.
    pub fn get_aliases(&self) -> HashMap<String, Vec<String>> {
        let mut aliases: HashMap<String, Vec<String>> = HashMap::new();
        for (key, entry) in self.entries() {
            if let (MapKey::Name(alias), MapEntry::Alias(target)) = (key, entry) {
                aliases.entry(target.clone()).or_default().push(alias.clone());
            }
        }
        aliases
    }

    /// Number of raw entries, aliases and the default entry included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn boxed<T, F, Fut>(factory: F) -> Factory<T>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    Box::new(move || factory().boxed())
}

// MARK: --- UNIT TESTS ---
