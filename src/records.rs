//! Unresolved declarations, exactly as read from their colon-delimited form.
//!
//! Each record refers to other options by name only. The resolver turns a
//! [`Batch`] of them into a linked [`OptionTable`](crate::resolve::OptionTable).

use crate::kind::{KindRegistry, ListKind, OptionKind};
use crate::options::{Special, VarOption};
use crate::resolve::ResolveError;
use crate::tokenizer::{Check, Field, Grammar, Tokens};
use crate::validation::{self, SpecError};
use serde::Serialize;
use std::str::FromStr;

/// A declaration kind parsed from one colon-delimited string.
pub trait Record: Sized {
    fn grammar() -> Grammar;

    /// Build the record from tokens already checked against [`Record::grammar`].
    fn from_tokens(tokens: Tokens) -> Result<Self, SpecError>;

    fn parse_with(raw: &str, registry: &KindRegistry) -> Result<Self, SpecError> {
        Self::from_tokens(Self::grammar().parse_with(raw, registry)?)
    }
}

macro_rules! record_from_str {
    ($($record:ty),* $(,)?) => {
        $(
            impl FromStr for $record {
                type Err = SpecError;

                fn from_str(raw: &str) -> Result<Self, Self::Err> {
                    Self::parse_with(raw, KindRegistry::standard())
                }
            }
        )*
    };
}

record_from_str!(
    BoolRecord,
    EnumRecord,
    AnythingRecord,
    ListRecord,
    FlagRecord,
    AliasRecord,
    MappingRecord,
    InlineRecord,
    CollapseRecord,
    MetavarRecord,
    DescribeRecord,
);

/// `NAME:DEFAULT`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoolRecord {
    pub name: String,
    pub default: String,
}

impl Record for BoolRecord {
    fn grammar() -> Grammar {
        Grammar::new(vec![Field::one(Check::Name), Field::one(Check::Bool)])
    }

    fn from_tokens(mut tokens: Tokens) -> Result<Self, SpecError> {
        Ok(Self {
            name: tokens.text()?,
            default: tokens.text()?,
        })
    }
}

/// `NAME:DEFAULT:VALUE,...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumRecord {
    pub name: String,
    pub default: String,
    pub values: Vec<String>,
}

impl Record for EnumRecord {
    fn grammar() -> Grammar {
        Grammar::new(vec![
            Field::one(Check::Name),
            Field::one(Check::EnumValue),
            Field::list_of(Check::EnumValue),
        ])
    }

    fn from_tokens(mut tokens: Tokens) -> Result<Self, SpecError> {
        Ok(Self {
            name: tokens.text()?,
            default: tokens.text()?,
            values: tokens.text_list()?,
        })
    }
}

/// `NAME:DEFAULT`, with no check on the default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnythingRecord {
    pub name: String,
    pub default: String,
}

impl Record for AnythingRecord {
    fn grammar() -> Grammar {
        Grammar::new(vec![Field::one(Check::Name), Field::one(Check::Anything)])
    }

    fn from_tokens(mut tokens: Tokens) -> Result<Self, SpecError> {
        Ok(Self {
            name: tokens.text()?,
            default: tokens.text()?,
        })
    }
}

/// `NAME:TYPE:DEFAULTS[:VALUES]`; `VALUES` is required for enum lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRecord {
    pub name: String,
    pub element: ListKind,
    pub defaults: Vec<String>,
    pub values: Vec<String>,
}

impl Record for ListRecord {
    fn grammar() -> Grammar {
        Grammar::new(vec![
            Field::one(Check::Name),
            Field::one(Check::ListKind),
            Field::list_of(Check::Anything),
            Field::optional(vec![Field::list_of(Check::Anything)]),
        ])
    }

    fn from_tokens(mut tokens: Tokens) -> Result<Self, SpecError> {
        let name = tokens.text()?;
        let element = tokens.list_kind()?;
        let defaults = tokens.text_list()?;
        let values = tokens.optional_text_list()?.unwrap_or_default();

        match element {
            ListKind::Enum => {
                if values.is_empty() {
                    return Err(SpecError::MissingEnumListValues(name));
                }
                for value in &values {
                    validation::validate_enum_value(value)?;
                }
            }
            ListKind::Anything => {}
        }

        Ok(Self {
            name,
            element,
            defaults,
            values,
        })
    }
}

/// One of the hard-coded options, opted into with a switch rather than a
/// declaration string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialRecord {
    pub name: String,
    pub default: String,
}

impl SpecialRecord {
    pub fn new(special: Special) -> Self {
        Self {
            name: special.name().to_string(),
            default: special.default_value().to_string(),
        }
    }
}

/// `NAME:TARGET:VALUE`; the value is checked once the target is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagRecord {
    pub name: String,
    pub target: String,
    pub value: String,
}

impl Record for FlagRecord {
    fn grammar() -> Grammar {
        Grammar::new(vec![
            Field::one(Check::Name),
            Field::one(Check::Name),
            Field::one(Check::Anything),
        ])
    }

    fn from_tokens(mut tokens: Tokens) -> Result<Self, SpecError> {
        Ok(Self {
            name: tokens.text()?,
            target: tokens.text()?,
            value: tokens.text()?,
        })
    }
}

/// `NAME:TARGET:TYPE`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasRecord {
    pub name: String,
    pub target: String,
    pub kind: OptionKind,
}

impl Record for AliasRecord {
    fn grammar() -> Grammar {
        Grammar::new(vec![
            Field::one(Check::Name),
            Field::one(Check::Name),
            Field::one(Check::AliasKind),
        ])
    }

    fn from_tokens(mut tokens: Tokens) -> Result<Self, SpecError> {
        Ok(Self {
            name: tokens.text()?,
            target: tokens.text()?,
            kind: tokens.alias_kind()?,
        })
    }
}

/// `VARIABLE:PARAMETER[:URL_ENCODE]` maps a variable to a URL parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingRecord {
    pub target: String,
    pub parameter: String,
    /// Whether to percent-encode the variable's value.
    pub url_encode: bool,
}

impl Record for MappingRecord {
    fn grammar() -> Grammar {
        Grammar::new(vec![
            Field::one(Check::Name),
            Field::one(Check::Anything),
            Field::optional(vec![Field::one(Check::ParseBool)]),
        ])
    }

    fn from_tokens(mut tokens: Tokens) -> Result<Self, SpecError> {
        Ok(Self {
            target: tokens.text()?,
            parameter: tokens.text()?,
            url_encode: tokens.optional_bool()?.unwrap_or(true),
        })
    }
}

/// `VARIABLE:KEYWORD` inlines a variable into the query, e.g. `filetype:pdf`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineRecord {
    pub target: String,
    pub keyword: String,
}

impl Record for InlineRecord {
    fn grammar() -> Grammar {
        Grammar::new(vec![Field::one(Check::Name), Field::one(Check::Name)])
    }

    fn from_tokens(mut tokens: Tokens) -> Result<Self, SpecError> {
        Ok(Self {
            target: tokens.text()?,
            keyword: tokens.text()?,
        })
    }
}

/// `VARIABLE:CASE:CASE...` rewrites a variable with a shell `case`.
///
/// In each case the last value is the replacement and the others are the
/// patterns it replaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollapseRecord {
    pub target: String,
    pub collapses: Vec<Vec<String>>,
}

impl Record for CollapseRecord {
    fn grammar() -> Grammar {
        Grammar::new(vec![
            Field::one(Check::Name),
            Field::optional(vec![Field::list_of(Check::Anything)]),
        ])
        .unlimited()
    }

    fn from_tokens(mut tokens: Tokens) -> Result<Self, SpecError> {
        Ok(Self {
            target: tokens.text()?,
            collapses: tokens.remaining_text_lists()?,
        })
    }
}

/// `VARIABLE:METAVAR`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetavarRecord {
    pub target: String,
    /// Already uppercased.
    pub metavar: String,
}

impl Record for MetavarRecord {
    fn grammar() -> Grammar {
        Grammar::new(vec![Field::one(Check::Name), Field::one(Check::Metavar)])
    }

    fn from_tokens(mut tokens: Tokens) -> Result<Self, SpecError> {
        Ok(Self {
            target: tokens.text()?,
            metavar: tokens.text()?,
        })
    }
}

/// `VARIABLE:DESCRIPTION`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeRecord {
    pub target: String,
    pub description: String,
}

impl Record for DescribeRecord {
    fn grammar() -> Grammar {
        Grammar::new(vec![Field::one(Check::Name), Field::one(Check::Anything)])
    }

    fn from_tokens(mut tokens: Tokens) -> Result<Self, SpecError> {
        Ok(Self {
            target: tokens.text()?,
            description: tokens.text()?,
        })
    }
}

/// Any declaration that creates a variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarRecord {
    Bool(BoolRecord),
    Enum(EnumRecord),
    Anything(AnythingRecord),
    List(ListRecord),
    Special(SpecialRecord),
}

impl VarRecord {
    pub fn name(&self) -> &str {
        match self {
            VarRecord::Bool(record) => &record.name,
            VarRecord::Enum(record) => &record.name,
            VarRecord::Anything(record) => &record.name,
            VarRecord::List(record) => &record.name,
            VarRecord::Special(record) => &record.name,
        }
    }

    /// Build the option, enforcing its kind's invariants.
    pub fn materialize(&self) -> Result<VarOption, ResolveError> {
        match self {
            VarRecord::Bool(r) => VarOption::boolean(&r.name, &r.default),
            VarRecord::Enum(r) => VarOption::enumeration(&r.name, &r.default, &r.values),
            VarRecord::Anything(r) => VarOption::anything(&r.name, &r.default),
            VarRecord::List(r) => VarOption::list(&r.name, r.element, &r.defaults, &r.values),
            VarRecord::Special(r) => VarOption::special(&r.name, &r.default),
        }
    }
}

/// Every declaration of one elvis, in declaration order per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    pub variables: Vec<VarRecord>,
    pub flags: Vec<FlagRecord>,
    pub aliases: Vec<AliasRecord>,
    pub mappings: Vec<MappingRecord>,
    pub list_mappings: Vec<MappingRecord>,
    pub inlines: Vec<InlineRecord>,
    pub list_inlines: Vec<InlineRecord>,
    pub collapses: Vec<CollapseRecord>,
    pub metavars: Vec<MetavarRecord>,
    pub descriptions: Vec<DescribeRecord>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
