// src/core/tree.rs

//! The namespace/command tree and its traversal.
//!
//! Namespaces and commands are created lazily by the factories stored in their parent's
//! maps. Each created entity holds a back-reference to the namespace whose map built it,
//! so the path to any resolved entity can be rebuilt without the original argv.

use crate::core::alias_map::{AliasMap, MapEntry, MapKey};
use crate::models::{Metadata, ParsedOptions};
use anyhow::Result;
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use std::fmt;
use std::sync::Arc;

/// The child namespaces of a namespace.
pub type NamespaceMap = AliasMap<Arc<dyn Namespace>>;

/// The commands of a namespace.
pub type CommandMap = AliasMap<Arc<dyn Command>>;

/// One step of a resolution path: the key that matched, and the entity it produced.
pub type PathItem = (String, Entity);

/// A non-leaf node of the tree.
///
/// Maps are built on demand and receive the namespace as an `Arc` so factories can hand
/// it to the children they construct as their parent.
pub trait Namespace: Send + Sync {
    /// The declared metadata of this namespace.
    fn metadata(&self) -> Metadata;

    /// The namespace whose map constructed this one. `None` for a root.
    fn parent(&self) -> Option<Arc<dyn Namespace>>;

    /// Child namespaces. Empty unless overridden.
    fn namespaces(self: Arc<Self>) -> NamespaceMap {
        NamespaceMap::new()
    }

    /// Child commands. Empty unless overridden.
    fn commands(self: Arc<Self>) -> CommandMap {
        CommandMap::new()
    }
}

/// A leaf of the tree: one invocable operation.
#[async_trait]
pub trait Command: Send + Sync {
    /// The declared metadata of this command.
    fn metadata(&self) -> Metadata;

    /// The namespace whose map constructed this command.
    fn namespace(&self) -> Option<Arc<dyn Namespace>>;

    /// The business logic. The default does nothing.
    async fn run(&self, inputs: &[String], options: &ParsedOptions) -> Result<()> {
        log::debug!(
            "Command '{}' has no run handler ({} inputs, {} options).",
            self.metadata().name,
            inputs.len(),
            options.named_len()
        );
        Ok(())
    }
}

/// Either kind of tree entity.
#[derive(Clone)]
pub enum Entity {
    /// A node with child maps.
    Namespace(Arc<dyn Namespace>),
    /// A leaf.
    Command(Arc<dyn Command>),
}

impl Entity {
    /// The metadata of the wrapped entity.
    pub fn metadata(&self) -> Metadata {
        match self {
            Self::Namespace(ns) => ns.metadata(),
            Self::Command(cmd) => cmd.metadata(),
        }
    }

    /// The back-reference of the entity, whichever kind it is.
    pub fn parent(&self) -> Option<Arc<dyn Namespace>> {
        match self {
            Self::Namespace(ns) => ns.parent(),
            Self::Command(cmd) => cmd.namespace(),
        }
    }

    /// The namespace, if this is one.
    pub fn as_namespace(&self) -> Option<&Arc<dyn Namespace>> {
        match self {
            Self::Namespace(ns) => Some(ns),
            Self::Command(_) => None,
        }
    }

    /// The command, if this is one.
    pub fn as_command(&self) -> Option<&Arc<dyn Command>> {
        match self {
            Self::Command(cmd) => Some(cmd),
            Self::Namespace(_) => None,
        }
    }

    /// Whether this is a leaf.
    pub fn is_command(&self) -> bool {
        matches!(self, Self::Command(_))
    }

    /// Identity comparison: true only for the very same instance.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Namespace(a), Self::Namespace(b)) => Arc::ptr_eq(a, b),
            (Self::Command(a), Self::Command(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Namespace(ns) => f.debug_tuple("Namespace").field(&ns.metadata().name).finish(),
            Self::Command(cmd) => f.debug_tuple("Command").field(&cmd.metadata().name).finish(),
        }
    }
}

/// The outcome of [`locate`].
#[derive(Debug, Clone)]
pub struct Located {
    /// Tokens not consumed as keys.
    pub args: Vec<String>,
    /// The deepest entity reached.
    pub obj: Entity,
    /// Every `(typed key, entity)` pair matched on the way down.
    pub path: Vec<PathItem>,
}

/// Walks argv from `root`, descending while tokens match keys.
///
/// # Logic:
/// - A token matching a child namespace (directly or by alias) descends into it.
/// - A token matching a command returns that command with the rest of argv.
/// - Otherwise, a default command takes all remaining tokens, including the unmatched one.
/// - Otherwise, resolution stops at the current namespace with argv untouched.
///
/// When argv runs out right after entering a namespace that has a default command, the
/// default command takes over that namespace's slot in the path. Calling this with empty
/// argv always returns `root` itself.
///
/// Namespaces are tried before commands. Each factory is awaited before the next step.
pub async fn locate(root: Arc<dyn Namespace>, argv: &[String]) -> Result<Located> {
    let mut current = root;
    let mut path: Vec<PathItem> = Vec::new();
    let mut rest = argv;

    loop {
        let Some((token, remaining)) = rest.split_first() else {
            if !path.is_empty()
                && let Some(factory) = current.clone().commands().default_entry()
            {
                let command = factory().await?;
                log::debug!(
                    "Argv exhausted; default command '{}' takes the namespace slot",
                    command.metadata().name
                );
                if let Some(slot) = path.last_mut() {
                    slot.1 = Entity::Command(command.clone());
                }
                return Ok(Located {
                    args: Vec::new(),
                    obj: Entity::Command(command),
                    path,
                });
            }
            return Ok(Located {
                args: Vec::new(),
                obj: Entity::Namespace(current),
                path,
            });
        };

        if let Some(factory) = current.clone().namespaces().resolve_aliases(token) {
            let child = factory().await?;
            log::debug!("Matched namespace '{}'", token);
            path.push((token.clone(), Entity::Namespace(child.clone())));
            current = child;
            rest = remaining;
            continue;
        }

        let commands = current.clone().commands();
        if let Some(factory) = commands.resolve_aliases(token) {
            let command = factory().await?;
            log::debug!("Matched command '{}'", token);
            path.push((token.clone(), Entity::Command(command.clone())));
            return Ok(Located {
                args: remaining.to_vec(),
                obj: Entity::Command(command),
                path,
            });
        }

        if let Some(factory) = commands.default_entry() {
            let command = factory().await?;
            log::debug!(
                "No key matched '{}'; falling back to default command '{}'",
                token,
                command.metadata().name
            );
            path.push((token.clone(), Entity::Command(command.clone())));
            return Ok(Located {
                args: rest.to_vec(),
                obj: Entity::Command(command),
                path,
            });
        }

        log::debug!("No key matched '{}'; stopping at current namespace", token);
        return Ok(Located {
            args: rest.to_vec(),
            obj: Entity::Namespace(current),
            path,
        });
    }
}

/// Rebuilds the root-to-leaf path of an entity from its back-references.
///
/// Each element is `(metadata name, entity)`; the root comes first.
pub fn generate_command_path(entity: &Entity) -> Vec<PathItem> {
    let mut path = vec![(entity.metadata().name, entity.clone())];
    let mut parent = entity.parent();

    while let Some(ns) = parent {
        parent = ns.parent();
        path.push((ns.metadata().name, Entity::Namespace(ns)));
    }

    path.reverse();
    path
}

/// A command found by [`get_command_metadata_list`].
#[derive(Clone)]
pub struct CommandMetadataEntry {
    /// The command instance, built by its factory.
    pub command: Arc<dyn Command>,
    /// The namespace whose map holds the command.
    pub namespace: Arc<dyn Namespace>,
    /// Keys from the listing root (exclusive) down to the command (inclusive).
    pub path: Vec<PathItem>,
    /// Alias spellings registered for the command's key.
    pub aliases: Vec<String>,
}

impl fmt::Debug for CommandMetadataEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandMetadataEntry")
            .field("command", &self.command.metadata().name)
            .field("namespace", &self.namespace.metadata().name)
            .field("path", &self.path)
            .field("aliases", &self.aliases)
            .finish()
    }
}

/// Lists every command reachable from `root`, depth-first.
///
/// At each level the direct commands come first (in map order), then each child
/// namespace is expanded in turn. Alias entries are not listed on their own. A default
/// command adds no path segment beyond its namespace's.
pub async fn get_command_metadata_list(
    root: Arc<dyn Namespace>,
) -> Result<Vec<CommandMetadataEntry>> {
    let mut found = Vec::new();
    collect_commands(root, Vec::new(), &mut found).await?;
    log::debug!("Listed {} commands", found.len());
    Ok(found)
}

fn collect_commands(
    namespace: Arc<dyn Namespace>,
    prefix: Vec<PathItem>,
    found: &mut Vec<CommandMetadataEntry>,
) -> BoxFuture<'_, Result<()>> {
    async move {
        let commands = namespace.clone().commands();
        let aliases = commands.get_aliases();

        for (key, entry) in commands.entries() {
            let MapEntry::Factory(factory) = entry else {
                continue;
            };
            let command = factory().await?;
            let mut path = prefix.clone();
            if let MapKey::Name(name) = key {
                path.push((name.clone(), Entity::Command(command.clone())));
            }
            let command_aliases = key
                .as_name()
                .and_then(|name| aliases.get(name))
                .cloned()
                .unwrap_or_default();

            found.push(CommandMetadataEntry {
                command,
                namespace: namespace.clone(),
                path,
                aliases: command_aliases,
            });
        }

        let namespaces = namespace.clone().namespaces();
        for (key, entry) in namespaces.entries() {
            let (Some(name), MapEntry::Factory(factory)) = (key.as_name(), entry) else {
                continue;
            };
            let child = factory().await?;
            let mut path = prefix.clone();
            path.push((name.to_string(), Entity::Namespace(child.clone())));
            collect_commands(child, path, found).await?;
        }

        Ok(())
    }
    .boxed()
}

// MARK: --- UNIT TESTS ---
