//! mkelvis - generate surfraw elvi from compact option declarations.
//!
//! Options are declared as colon-delimited strings such as
//! `sort:relevance:relevance,date`. Each string is checked against the
//! grammar of its kind, collected into a [`Batch`] of unresolved records and
//! linked by the [`Resolver`] into an [`OptionTable`], where flags and
//! aliases point at the options they target. An [`Elvis`] pairs that table
//! with the elvis's metadata and serializes to the manifest consumed by the
//! template stage.

pub mod config;
pub mod kind;
pub mod options;
pub mod output;
pub mod records;
pub mod resolve;
pub mod tokenizer;
pub mod validation;

pub use config::{Config, ConfigError, OptionSpecs, VarDeclaration};
pub use kind::{KindRegistry, ListKind, OptionKind};
pub use options::{Alias, AliasTarget, Flag, FlagValue, Special, VarKind, VarOption};
pub use output::{emit, manifest_string, write_manifest, write_manifest_file, Elvis};
pub use records::{Batch, Record};
pub use resolve::{resolve, Directives, OptionTable, ResolveError, Resolver};
pub use validation::SpecError;
