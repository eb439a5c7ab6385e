//! The closed set of option kinds and the name lookups built from it.

use crate::validation::SpecError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

static STANDARD: LazyLock<KindRegistry> = LazyLock::new(KindRegistry::new);

/// Every kind of option an elvis may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Bool,
    Enum,
    Anything,
    Special,
    List,
    Flag,
    Alias,
}

impl OptionKind {
    /// All kinds, in the order their options are listed in generated help.
    pub const ALL: [OptionKind; 7] = [
        OptionKind::Bool,
        OptionKind::Enum,
        OptionKind::Anything,
        OptionKind::Special,
        OptionKind::List,
        OptionKind::Flag,
        OptionKind::Alias,
    ];

    /// The short name used in declarations, e.g. `enum`.
    pub fn name(self) -> &'static str {
        match self {
            OptionKind::Bool => "bool",
            OptionKind::Enum => "enum",
            OptionKind::Anything => "anything",
            OptionKind::Special => "special",
            OptionKind::List => "list",
            OptionKind::Flag => "flag",
            OptionKind::Alias => "alias",
        }
    }

    /// Whether options of this kind define a shell variable.
    pub fn creates_variable(self) -> bool {
        !matches!(self, OptionKind::Flag | OptionKind::Alias)
    }

    /// Whether aliases may declare this as their target's kind.
    pub fn is_alias_target(self) -> bool {
        self != OptionKind::Alias
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Element kinds a list option may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Enum,
    Anything,
}

impl ListKind {
    pub const ALL: [ListKind; 2] = [ListKind::Enum, ListKind::Anything];

    pub fn kind(self) -> OptionKind {
        match self {
            ListKind::Enum => OptionKind::Enum,
            ListKind::Anything => OptionKind::Anything,
        }
    }

    pub fn name(self) -> &'static str {
        self.kind().name()
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Name-keyed lookups over [`OptionKind`].
///
/// Built once from the closed kind set and handed to whatever needs to turn a
/// kind name back into a kind.
#[derive(Debug, Clone)]
pub struct KindRegistry {
    by_name: BTreeMap<&'static str, OptionKind>,
}

impl KindRegistry {
    pub fn new() -> Self {
        let by_name = OptionKind::ALL
            .iter()
            .map(|kind| (kind.name(), *kind))
            .collect();
        Self { by_name }
    }

    /// The process-wide registry of the standard kinds.
    pub fn standard() -> &'static KindRegistry {
        &STANDARD
    }

    pub fn lookup(&self, name: &str) -> Option<OptionKind> {
        self.by_name.get(name).copied()
    }

    /// Variable-creating kinds, sorted by name.
    pub fn variable_kinds(&self) -> Vec<OptionKind> {
        self.kinds_where(|kind| kind.creates_variable())
    }

    /// Kinds an alias may target, sorted by name.
    pub fn alias_target_kinds(&self) -> Vec<OptionKind> {
        self.kinds_where(|kind| kind.is_alias_target())
    }

    /// Human-readable list of the kinds a flag may target.
    pub fn describe_variable_kinds(&self) -> String {
        join_names(self.variable_kinds().iter().map(|kind| kind.name()))
    }

    /// Parse the element kind of a list option.
    pub fn list_kind(&self, name: &str) -> Result<ListKind, SpecError> {
        ListKind::ALL
            .into_iter()
            .find(|list_kind| self.lookup(name) == Some(list_kind.kind()))
            .ok_or_else(|| {
                let mut names: Vec<&str> = ListKind::ALL.iter().map(|k| k.name()).collect();
                names.sort_unstable();
                SpecError::UnknownKind {
                    subject: "list",
                    given: name.to_string(),
                    expected: join_names(names),
                }
            })
    }

    /// Parse the declared kind of an alias's target.
    ///
    /// `yes-no` is accepted as an older spelling of `bool`.
    pub fn alias_kind(&self, name: &str) -> Result<OptionKind, SpecError> {
        let name = if name == "yes-no" { "bool" } else { name };
        match self.lookup(name) {
            Some(OptionKind::Alias) => Err(SpecError::AliasToAlias),
            Some(kind) => Ok(kind),
            None => Err(SpecError::UnknownKind {
                subject: "alias",
                given: name.to_string(),
                expected: join_names(self.alias_target_kinds().iter().map(|k| k.name())),
            }),
        }
    }

    fn kinds_where(&self, keep: impl Fn(OptionKind) -> bool) -> Vec<OptionKind> {
        // BTreeMap iteration is already sorted by name.
        self.by_name.values().copied().filter(|k| keep(*k)).collect()
    }
}

impl Default for KindRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Join quoted names into a grammatical list: `'a'`, `'a' or 'b'`,
/// `'a', 'b', or 'c'`.
pub fn join_names<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    let quoted: Vec<String> = names.into_iter().map(|n| format!("'{n}'")).collect();
    match quoted.as_slice() {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{first} or {second}"),
        [init @ .., last] => format!("{}, or {last}", init.join(", ")),
    }
}
