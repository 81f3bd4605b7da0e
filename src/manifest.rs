// src/manifest.rs

//! Declarative command trees.
//!
//! A manifest is a TOML file describing a root namespace, its nested namespaces, and the
//! commands (with their inputs and options) each one holds:
//!
//! ```toml
//! name = "ionic"
//!
//! [[namespaces]]
//! name = "cordova"
//! aliases = ["c"]
//!
//! [[namespaces.commands]]
//! name = "run"
//! aliases = ["r"]
//! inputs = [{ name = "platform", validators = ["required"] }]
//! options = [{ name = "prod", type = "boolean", groups = ["cordova"] }]
//! ```
//!
//! Loading validates the whole tree up front. The resulting namespaces and commands are
//! only constructed when a traversal asks their parent's map for them.

use crate::constants::{CONFIG_DIR_NAME, MANIFEST_FILENAME};
use crate::core::schema::{SchemaError, check_option_names};
use crate::core::tree::{Command, CommandMap, Namespace, NamespaceMap};
use crate::models::{InputDef, Metadata, OptionDef};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Represents errors that can occur while finding, reading, or validating a manifest.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("Could not read manifest at '{path}': {source}")]
    Io {
        /// The path that was read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The manifest is not valid TOML, or does not have the expected shape.
    #[error("Failed to parse manifest '{origin}': {source}")]
    TomlParse {
        /// The file path, or `<inline>` for manifests parsed from a string.
        origin: String,
        /// The deserialization error.
        #[source]
        source: toml::de::Error,
    },
    /// A namespace or command was declared with an empty name.
    #[error("An entry inside namespace '{namespace}' has an empty name.")]
    EmptyName {
        /// The namespace holding the entry.
        namespace: String,
    },
    /// Two entries of the same map share a key, by name or by alias.
    #[error("Key '{key}' is declared more than once in the {kind} of namespace '{namespace}'.")]
    DuplicateKey {
        /// The namespace holding both entries.
        namespace: String,
        /// `"namespaces"` or `"commands"`.
        kind: &'static str,
        /// The shared key.
        key: String,
    },
    /// More than one command of a namespace is marked as the default.
    #[error("Namespace '{namespace}' declares more than one default command.")]
    MultipleDefaults {
        /// The offending namespace.
        namespace: String,
    },
    /// A default command declared aliases. It is selected by fallback, never by key.
    #[error("Default command '{command}' in namespace '{namespace}' cannot have aliases.")]
    DefaultWithAliases {
        /// The namespace holding the command.
        namespace: String,
        /// The default command.
        command: String,
    },
    /// A command's option declarations are inconsistent.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// No manifest exists at any of the searched locations.
    #[error(
        "No manifest found. Searched: {}",
        .searched.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ")
    )]
    NotFound {
        /// Candidate paths, in lookup order.
        searched: Vec<PathBuf>,
    },
}

// --- FILE MODELS ---

/// A namespace as written in the manifest file.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ManifestNamespace {
    /// The key of the namespace in its parent.
    pub name: String,
    /// One-line help text.
    #[serde(default)]
    pub description: Option<String>,
    /// Extra keys resolving to this namespace.
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Child namespaces.
    #[serde(default)]
    pub namespaces: Vec<ManifestNamespace>,
    /// Child commands.
    #[serde(default)]
    pub commands: Vec<ManifestCommand>,
}

/// A command as written in the manifest file.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ManifestCommand {
    /// The key of the command in its namespace.
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
    /// Extra keys resolving to this command.
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Marks the command run when no key of its namespace matches.
    #[serde(default)]
    pub default: bool,
}

impl ManifestCommand {
    fn metadata(&self) -> Metadata {
        Metadata {
            name: self.name.clone(),
            description: self.description.clone(),
            inputs: self.inputs.clone(),
            options: self.options.clone(),
        }
    }
}

// --- VALIDATED DECLARATIONS ---

#[derive(Debug)]
struct NamespaceDecl {
    metadata: Metadata,
    aliases: Vec<String>,
    namespaces: Vec<Arc<NamespaceDecl>>,
    commands: Vec<Arc<CommandDecl>>,
}

#[derive(Debug)]
struct CommandDecl {
    metadata: Metadata,
    aliases: Vec<String>,
    default: bool,
}

/// Tracks the keys of one map while a namespace is being validated.
struct KeySet<'a> {
    namespace: &'a str,
    kind: &'static str,
    seen: HashSet<&'a str>,
}

impl<'a> KeySet<'a> {
    fn new(namespace: &'a str, kind: &'static str) -> Self {
        Self {
            namespace,
            kind,
            seen: HashSet::new(),
        }
    }

    fn claim(&mut self, key: &'a str) -> Result<(), ManifestError> {
        if key.is_empty() {
            return Err(ManifestError::EmptyName {
                namespace: self.namespace.to_string(),
            });
        }
        if !self.seen.insert(key) {
            return Err(ManifestError::DuplicateKey {
                namespace: self.namespace.to_string(),
                kind: self.kind,
                key: key.to_string(),
            });
        }
        Ok(())
    }
}

fn build_namespace(file: &ManifestNamespace) -> Result<Arc<NamespaceDecl>, ManifestError> {
    let ns_name = file.name.as_str();

    let mut namespace_keys = KeySet::new(ns_name, "namespaces");
    let mut namespaces = Vec::with_capacity(file.namespaces.len());
    for child in &file.namespaces {
        namespace_keys.claim(&child.name)?;
        for alias in &child.aliases {
            namespace_keys.claim(alias)?;
        }
        namespaces.push(build_namespace(child)?);
    }

    let mut command_keys = KeySet::new(ns_name, "commands");
    let mut commands = Vec::with_capacity(file.commands.len());
    let mut has_default = false;
    for command in &file.commands {
        if command.default {
            if has_default {
                return Err(ManifestError::MultipleDefaults {
                    namespace: ns_name.to_string(),
                });
            }
            if !command.aliases.is_empty() {
                return Err(ManifestError::DefaultWithAliases {
                    namespace: ns_name.to_string(),
                    command: command.name.clone(),
                });
            }
            has_default = true;
        } else {
            command_keys.claim(&command.name)?;
            for alias in &command.aliases {
                command_keys.claim(alias)?;
            }
        }

        let metadata = command.metadata();
        check_option_names(&metadata)?;
        commands.push(Arc::new(CommandDecl {
            metadata,
            aliases: command.aliases.clone(),
            default: command.default,
        }));
    }

    Ok(Arc::new(NamespaceDecl {
        metadata: Metadata {
            name: file.name.clone(),
            description: file.description.clone(),
            ..Default::default()
        },
        aliases: file.aliases.clone(),
        namespaces,
        commands,
    }))
}

// --- TREE ENTITIES ---

/// A namespace backed by a manifest declaration.
struct DeclaredNamespace {
    decl: Arc<NamespaceDecl>,
    parent: Option<Arc<dyn Namespace>>,
}

impl Namespace for DeclaredNamespace {
    fn metadata(&self) -> Metadata {
        self.decl.metadata.clone()
    }

    fn parent(&self) -> Option<Arc<dyn Namespace>> {
        self.parent.clone()
    }

    fn namespaces(self: Arc<Self>) -> NamespaceMap {
        let parent: Arc<dyn Namespace> = self.clone();
        let mut map = NamespaceMap::new();
        for child in &self.decl.namespaces {
            let decl = child.clone();
            let parent = parent.clone();
            map = map.with_factory(child.metadata.name.clone(), move || {
                let decl = decl.clone();
                let parent = parent.clone();
                async move {
                    log::trace!("Constructing namespace '{}'", decl.metadata.name);
                    Ok(Arc::new(DeclaredNamespace {
                        decl,
                        parent: Some(parent),
                    }) as Arc<dyn Namespace>)
                }
            });
            for alias in &child.aliases {
                map = map.with_alias(alias.clone(), child.metadata.name.clone());
            }
        }
        map
    }

    fn commands(self: Arc<Self>) -> CommandMap {
        let namespace: Arc<dyn Namespace> = self.clone();
        let mut map = CommandMap::new();
        for command in &self.decl.commands {
            let decl = command.clone();
            let namespace = namespace.clone();
            let factory = move || {
                let decl = decl.clone();
                let namespace = namespace.clone();
                async move {
                    log::trace!("Constructing command '{}'", decl.metadata.name);
                    Ok(Arc::new(DeclaredCommand { decl, namespace }) as Arc<dyn Command>)
                }
            };
            if command.default {
                map = map.with_default(factory);
            } else {
                map = map.with_factory(command.metadata.name.clone(), factory);
                for alias in &command.aliases {
                    map = map.with_alias(alias.clone(), command.metadata.name.clone());
                }
            }
        }
        map
    }
}

/// A command backed by a manifest declaration. Its run handler is the default no-op.
struct DeclaredCommand {
    decl: Arc<CommandDecl>,
    namespace: Arc<dyn Namespace>,
}

impl Command for DeclaredCommand {
    fn metadata(&self) -> Metadata {
        self.decl.metadata.clone()
    }

    fn namespace(&self) -> Option<Arc<dyn Namespace>> {
        Some(self.namespace.clone())
    }
}

// --- PUBLIC API ---

/// A validated manifest, ready to hand out its root namespace.
#[derive(Debug, Clone)]
pub struct Manifest {
    root: Arc<NamespaceDecl>,
    source: Option<PathBuf>,
}

impl Manifest {
    /// Parses and validates a manifest held in memory.
    pub fn from_toml_str(content: &str) -> Result<Self, ManifestError> {
        Self::parse(content, "<inline>")
    }

    /// Reads, parses, and validates the manifest at `path`.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        log::debug!("Loading manifest from '{}'", path.display());
        let content = fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut manifest = Self::parse(&content, &path.display().to_string())?;
        manifest.source = Some(path.to_path_buf());
        Ok(manifest)
    }

    fn parse(content: &str, origin: &str) -> Result<Self, ManifestError> {
        let file: ManifestNamespace =
            toml::from_str(content).map_err(|source| ManifestError::TomlParse {
                origin: origin.to_string(),
                source,
            })?;
        if file.name.is_empty() {
            return Err(ManifestError::EmptyName {
                namespace: "<root>".to_string(),
            });
        }
        let root = build_namespace(&file)?;
        log::debug!("Manifest '{}' validated (root '{}')", origin, root.metadata.name);
        Ok(Self { root, source: None })
    }

    /// A fresh root namespace for one resolution pass.
    pub fn root(&self) -> Arc<dyn Namespace> {
        Arc::new(DeclaredNamespace {
            decl: self.root.clone(),
            parent: None,
        })
    }

    /// The file this manifest was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

/// Picks the manifest file to load.
///
/// # Logic:
/// - An explicit path wins, then a non-empty `env_value`.
/// - Otherwise `quiver.toml` in `cwd`, then `quiver/quiver.toml` under `config_dir`.
pub fn find_manifest(
    explicit: Option<&Path>,
    env_value: Option<String>,
    cwd: &Path,
    config_dir: Option<PathBuf>,
) -> Result<PathBuf, ManifestError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(value) = env_value
        && !value.is_empty()
    {
        return Ok(PathBuf::from(value));
    }

    let mut searched = vec![cwd.join(MANIFEST_FILENAME)];
    if let Some(dir) = config_dir {
        searched.push(dir.join(CONFIG_DIR_NAME).join(MANIFEST_FILENAME));
    }

    match searched.iter().find(|candidate| candidate.is_file()) {
        Some(found) => Ok(found.clone()),
        None => Err(ManifestError::NotFound { searched }),
    }
}

// MARK: --- UNIT TESTS ---
