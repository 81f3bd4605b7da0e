// src/core/mod.rs

/// Ordered maps of lazy factories and alias entries.
pub mod alias_map;
/// Schema-driven argv tokenizer.
pub mod arg_parser;
/// Option selection by group and intent.
pub mod filter;
/// Option declarations to parse schemas.
pub mod schema;
/// Parsed options back to argv.
pub mod serializer;
/// Namespace/command tree and its traversals.
pub mod tree;
/// Usage reporting projections.
pub mod usage;
/// Positional input validation.
pub mod validators;
