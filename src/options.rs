//! Resolved option model.
//!
//! These types are only built by the resolver. Fields that the resolver
//! fills in after construction (flags, aliases, metadata overrides) are
//! private and exposed read-only, so a caller never sees a half-linked option.

use crate::kind::{ListKind, OptionKind};
use crate::resolve::ResolveError;
use crate::validation::{self, SpecError};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

/// Global surfraw option names which elvi cannot override.
pub const RESERVED_NAMES: &[&str] = &[
    "browser",
    "elvi",
    "g",
    "graphical",
    "h",
    "help",
    "lh",
    "p",
    "print",
    "o",
    "new",
    "ns",
    "newscreen",
    "t",
    "text",
    "q",
    "quote",
    "version",
    "bookmark-search-elvis",
    "custom-search",
    "escape-url-args",
    "local-help",
];

/// Reject names that collide with surfraw's global options.
pub fn ensure_not_reserved(name: &str) -> Result<(), ResolveError> {
    if RESERVED_NAMES.contains(&name) {
        return Err(ResolveError::ReservedName(name.to_string()));
    }
    Ok(())
}

/// Description used when nothing more specific applies, e.g.
/// "An enum option for 'sort'".
fn default_description(kind: OptionKind, name: &str) -> String {
    let article = if kind.name().starts_with(['a', 'e', 'i', 'o', 'u']) {
        "An"
    } else {
        "A"
    };
    format!("{article} {kind} option for '{name}'")
}

/// The hard-coded options users may opt into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Special {
    Results,
    Language,
}

impl Special {
    pub fn from_name(name: &str) -> Result<Self, ResolveError> {
        match name {
            "results" => Ok(Special::Results),
            "language" => Ok(Special::Language),
            _ => Err(ResolveError::SpecialName(name.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Special::Results => "results",
            Special::Language => "language",
        }
    }

    /// Shell expression used as the default value.
    pub fn default_value(self) -> &'static str {
        match self {
            Special::Results => "$SURFRAW_results",
            // English when `SURFRAW_lang` is empty or unset.
            Special::Language => "${SURFRAW_lang:=en}",
        }
    }

    fn metavar(self) -> &'static str {
        match self {
            Special::Results => "NUM",
            Special::Language => "ISOCODE",
        }
    }

    fn description(self) -> &'static str {
        match self {
            Special::Results => "Number of search results returned",
            Special::Language => "Two letter language code (resembles ISO country codes)",
        }
    }
}

/// Kind-specific data of a variable-creating option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum VarKind {
    Bool {
        default: String,
    },
    Enum {
        default: String,
        values: Vec<String>,
    },
    Anything {
        default: String,
    },
    List {
        element: ListKind,
        defaults: Vec<String>,
        values: Vec<String>,
    },
    Special {
        special: Special,
        default: String,
    },
}

impl VarKind {
    pub fn kind(&self) -> OptionKind {
        match self {
            VarKind::Bool { .. } => OptionKind::Bool,
            VarKind::Enum { .. } => OptionKind::Enum,
            VarKind::Anything { .. } => OptionKind::Anything,
            VarKind::List { .. } => OptionKind::List,
            VarKind::Special { .. } => OptionKind::Special,
        }
    }
}

/// An option that creates a shell variable in the elvis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VarOption {
    name: String,
    metavar: Option<String>,
    description: String,
    #[serde(flatten)]
    kind: VarKind,
    /// Names of the flags targeting this option, in declaration order.
    flags: Vec<String>,
    /// Names of the aliases targeting this option.
    aliases: BTreeSet<String>,
}

impl VarOption {
    fn new(name: &str, kind: VarKind) -> Result<Self, ResolveError> {
        ensure_not_reserved(name)?;
        let (metavar, description) = match &kind {
            VarKind::Special { special, .. } => {
                (special.metavar().to_string(), special.description().to_string())
            }
            VarKind::Anything { .. } => {
                (name.to_uppercase(), format!("An unchecked option for '{name}'"))
            }
            VarKind::List { element, .. } => (
                name.to_uppercase(),
                format!("A repeatable (cumulative) '{element}' list option for '{name}'"),
            ),
            other => (name.to_uppercase(), default_description(other.kind(), name)),
        };
        Ok(Self {
            name: name.to_string(),
            metavar: Some(metavar),
            description,
            kind,
            flags: Vec::new(),
            aliases: BTreeSet::new(),
        })
    }

    pub fn boolean(name: &str, default: &str) -> Result<Self, ResolveError> {
        Self::new(
            name,
            VarKind::Bool {
                default: default.to_string(),
            },
        )
    }

    pub fn enumeration(name: &str, default: &str, values: &[String]) -> Result<Self, ResolveError> {
        if values.is_empty() {
            return Err(ResolveError::EmptyEnum(name.to_string()));
        }
        if !values.iter().any(|value| value == default) {
            return Err(ResolveError::EnumDefault {
                default: default.to_string(),
                values: values.join(","),
            });
        }
        Self::new(
            name,
            VarKind::Enum {
                default: default.to_string(),
                values: values.to_vec(),
            },
        )
    }

    pub fn anything(name: &str, default: &str) -> Result<Self, ResolveError> {
        Self::new(
            name,
            VarKind::Anything {
                default: default.to_string(),
            },
        )
    }

    pub fn list(
        name: &str,
        element: ListKind,
        defaults: &[String],
        values: &[String],
    ) -> Result<Self, ResolveError> {
        if element == ListKind::Enum {
            if values.is_empty() {
                return Err(ResolveError::EmptyEnum(name.to_string()));
            }
            let valid: HashSet<&String> = values.iter().collect();
            if !defaults.iter().all(|default| valid.contains(default)) {
                return Err(ResolveError::ListDefaults {
                    name: name.to_string(),
                    defaults: defaults.join(","),
                    values: values.join(","),
                });
            }
        }
        Self::new(
            name,
            VarKind::List {
                element,
                defaults: defaults.to_vec(),
                values: values.to_vec(),
            },
        )
    }

    pub fn special(name: &str, default: &str) -> Result<Self, ResolveError> {
        let special = Special::from_name(name)?;
        Self::new(
            name,
            VarKind::Special {
                special,
                default: default.to_string(),
            },
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metavar(&self) -> Option<&str> {
        self.metavar.as_deref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn var_kind(&self) -> &VarKind {
        &self.kind
    }

    pub fn kind(&self) -> OptionKind {
        self.kind.kind()
    }

    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.aliases.iter().map(String::as_str)
    }

    pub fn has_alias(&self, name: &str) -> bool {
        self.aliases.contains(name)
    }

    pub(crate) fn attach_flag(&mut self, name: &str) {
        self.flags.push(name.to_string());
    }

    pub(crate) fn attach_alias(&mut self, name: &str) {
        self.aliases.insert(name.to_string());
    }

    pub(crate) fn set_metavar(&mut self, metavar: &str) {
        self.metavar = Some(metavar.to_string());
    }

    pub(crate) fn set_description(&mut self, description: &str) {
        self.description = description.to_string();
    }

    /// Check a flag's raw value against this option and convert it to the
    /// value type the option uses.
    pub fn validate_flag_value(&self, flag: &str, raw: &str) -> Result<FlagValue, ResolveError> {
        let invalid = |source: SpecError| ResolveError::InvalidFlagValue {
            flag: flag.to_string(),
            source,
        };
        match &self.kind {
            VarKind::Bool { .. } => validation::validate_bool(raw)
                .map(FlagValue::Text)
                .map_err(invalid),
            VarKind::Enum { values, .. } => {
                let value = validation::validate_enum_value(raw).map_err(invalid)?;
                if !values.contains(&value) {
                    return Err(ResolveError::NotInEnum {
                        flag: flag.to_string(),
                        value,
                        target: self.name.clone(),
                        values: values.join(","),
                    });
                }
                Ok(FlagValue::Text(value))
            }
            VarKind::Anything { .. } => Ok(FlagValue::Text(raw.to_string())),
            VarKind::List {
                element: ListKind::Enum,
                values,
                ..
            } => {
                let chosen = validation::list_of(raw, validation::validate_enum_value)
                    .map_err(invalid)?;
                if !chosen.iter().all(|value| values.contains(value)) {
                    return Err(ResolveError::NotSubsetOfList {
                        flag: flag.to_string(),
                        chosen: chosen.join(","),
                        values: values.join(","),
                    });
                }
                Ok(FlagValue::List(chosen))
            }
            VarKind::List {
                element: ListKind::Anything,
                ..
            } => validation::list_of(raw, validation::no_validation)
                .map(FlagValue::List)
                .map_err(invalid),
            VarKind::Special {
                special: Special::Results,
                ..
            } => raw
                .trim()
                .parse::<i64>()
                .map(FlagValue::Integer)
                .map_err(|_| ResolveError::ResultsNotInteger {
                    flag: flag.to_string(),
                    value: raw.to_string(),
                }),
            // Too many ISO language codes to check.
            VarKind::Special {
                special: Special::Language,
                ..
            } => Ok(FlagValue::Text(raw.to_string())),
        }
    }

    /// Description of a flag with `value` targeting this option.
    pub fn flag_description(&self, value: &FlagValue) -> String {
        match &self.kind {
            VarKind::List { element, .. } => format!(
                "An alias for the '{element}' list option '{}' with the values '{value}'",
                self.name
            ),
            _ => format!("An alias for -{}={value}", self.name),
        }
    }
}

/// A flag's value once checked against its target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FlagValue {
    Text(String),
    Integer(i64),
    List(Vec<String>),
}

impl std::fmt::Display for FlagValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlagValue::Text(text) => f.write_str(text),
            FlagValue::Integer(number) => write!(f, "{number}"),
            FlagValue::List(values) => f.write_str(&values.join(",")),
        }
    }
}

/// Alias (with a fixed value) to a variable-creating option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flag {
    name: String,
    target: String,
    value: FlagValue,
    description: String,
    aliases: BTreeSet<String>,
}

impl Flag {
    pub(crate) fn new(name: &str, target: &VarOption, value: FlagValue) -> Result<Self, ResolveError> {
        ensure_not_reserved(name)?;
        Ok(Self {
            name: name.to_string(),
            target: target.name().to_string(),
            description: target.flag_description(&value),
            value,
            aliases: BTreeSet::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the variable option this flag sets.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn value(&self) -> &FlagValue {
        &self.value
    }

    /// Flags take no argument, so they never have a metavar.
    pub fn metavar(&self) -> Option<&str> {
        None
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.aliases.iter().map(String::as_str)
    }

    pub fn has_alias(&self, name: &str) -> bool {
        self.aliases.contains(name)
    }

    pub(crate) fn attach_alias(&mut self, name: &str) {
        self.aliases.insert(name.to_string());
    }
}

/// What an alias points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "name", rename_all = "lowercase")]
pub enum AliasTarget {
    Variable(String),
    Flag(String),
}

impl AliasTarget {
    pub fn name(&self) -> &str {
        match self {
            AliasTarget::Variable(name) | AliasTarget::Flag(name) => name,
        }
    }
}

/// Alias (without a value) to a variable option or a flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alias {
    name: String,
    target: AliasTarget,
    kind: OptionKind,
    description: String,
}

impl Alias {
    pub(crate) fn new(name: &str, target: AliasTarget, kind: OptionKind) -> Result<Self, ResolveError> {
        ensure_not_reserved(name)?;
        Ok(Self {
            name: name.to_string(),
            target,
            kind,
            description: default_description(OptionKind::Alias, name),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> &AliasTarget {
        &self.target
    }

    /// The kind of option this alias was declared to target.
    pub fn kind(&self) -> OptionKind {
        self.kind
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}
