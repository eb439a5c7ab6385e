//! Splitting colon-delimited declarations into validated fields.
//!
//! A [`Grammar`] lists the fields of one declaration kind. Plain fields are
//! required. A [`Field::Group`] is optional as a whole, but once its first
//! field has consumed a token the rest of the group becomes required. A
//! group takes over the remainder of the sequence it appears in, so it is
//! always the last field of its enclosing sequence.
//!
//! With [`Grammar::unlimited`], every token left over after the grammar is
//! exhausted is fed to the last validator that was active. Without it,
//! leftover tokens are ignored.

use crate::kind::{KindRegistry, ListKind, OptionKind};
use crate::validation::{self, SpecError};
use std::collections::VecDeque;

/// A check applied to a single token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Name,
    Bool,
    ParseBool,
    EnumValue,
    Anything,
    Metavar,
    ListKind,
    AliasKind,
}

impl Check {
    fn apply(self, token: &str, registry: &KindRegistry) -> Result<Token, SpecError> {
        Ok(match self {
            Check::Name => Token::Text(validation::validate_name(token)?),
            Check::Bool => Token::Text(validation::validate_bool(token)?),
            Check::ParseBool => Token::Bool(validation::parse_bool(token)?),
            Check::EnumValue => Token::Text(validation::validate_enum_value(token)?),
            Check::Anything => Token::Text(validation::no_validation(token)?),
            Check::Metavar => Token::Text(validation::validate_metavar(token)?),
            Check::ListKind => Token::ListKind(registry.list_kind(token)?),
            Check::AliasKind => Token::AliasKind(registry.alias_kind(token)?),
        })
    }
}

/// Validator for one colon-delimited field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validator {
    One(Check),
    /// Comma-delimited list, each element run through the check.
    ListOf(Check),
}

impl Validator {
    pub fn apply(self, token: &str, registry: &KindRegistry) -> Result<Token, SpecError> {
        match self {
            Validator::One(check) => check.apply(token, registry),
            Validator::ListOf(check) => {
                validation::list_of(token, |element| check.apply(element, registry))
                    .map(Token::List)
            }
        }
    }
}

/// One position in a [`Grammar`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Required(Validator),
    /// Optional group; must begin with a [`Field::Required`].
    Group(Vec<Field>),
}

impl Field {
    pub fn one(check: Check) -> Self {
        Field::Required(Validator::One(check))
    }

    pub fn list_of(check: Check) -> Self {
        Field::Required(Validator::ListOf(check))
    }

    pub fn optional(fields: Vec<Field>) -> Self {
        Field::Group(fields)
    }
}

/// The field layout of one declaration kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    fields: Vec<Field>,
    unlimited: bool,
}

impl Grammar {
    pub fn new(fields: Vec<Field>) -> Self {
        Self {
            fields,
            unlimited: false,
        }
    }

    /// Repeat the last active validator over every remaining token.
    pub fn unlimited(mut self) -> Self {
        self.unlimited = true;
        self
    }

    /// [`Grammar::parse_with`] using the standard kinds.
    pub fn parse(&self, raw: &str) -> Result<Tokens, SpecError> {
        self.parse_with(raw, KindRegistry::standard())
    }

    /// Split `raw` on `:` and validate each part against the grammar, looking
    /// kind names up in `registry`.
    pub fn parse_with(&self, raw: &str, registry: &KindRegistry) -> Result<Tokens, SpecError> {
        let mut parts: VecDeque<&str> = raw.split(':').collect();
        let mut parsed = Vec::new();

        let mut current: VecDeque<&Field> = self.fields.iter().collect();
        let mut needed = current.len();
        let mut group = 0;
        let mut last = None;

        while let Some(field) = current.pop_front() {
            let (validator, opens_group) = match field {
                Field::Required(validator) => (*validator, false),
                Field::Group(fields) => {
                    current = fields.iter().collect();
                    needed = current.len();
                    group += 1;
                    match current.pop_front() {
                        Some(Field::Required(validator)) => (*validator, true),
                        _ => return Err(SpecError::MalformedGroup),
                    }
                }
            };
            last = Some(validator);

            let Some(part) = parts.pop_front() else {
                if opens_group {
                    break;
                }
                return Err(SpecError::TooFewParts {
                    group,
                    raw: raw.to_string(),
                    needed,
                });
            };
            parsed.push(validator.apply(part, registry)?);
        }

        if self.unlimited {
            if let Some(validator) = last {
                for part in parts {
                    parsed.push(validator.apply(part, registry)?);
                }
            }
        }

        Ok(Tokens::new(raw, parsed))
    }
}

/// A validated field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Text(String),
    Bool(bool),
    ListKind(ListKind),
    AliasKind(OptionKind),
    List(Vec<Token>),
}

/// The validated fields of one declaration, consumed front to back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokens {
    raw: String,
    tokens: VecDeque<Token>,
    position: usize,
}

impl Tokens {
    fn new(raw: &str, tokens: Vec<Token>) -> Self {
        Self {
            raw: raw.to_string(),
            tokens: tokens.into(),
            position: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn text(&mut self) -> Result<String, SpecError> {
        match self.next_token() {
            Some(Token::Text(text)) => Ok(text),
            _ => Err(self.shape_error("text value")),
        }
    }

    pub fn list_kind(&mut self) -> Result<ListKind, SpecError> {
        match self.next_token() {
            Some(Token::ListKind(kind)) => Ok(kind),
            _ => Err(self.shape_error("list type")),
        }
    }

    pub fn alias_kind(&mut self) -> Result<OptionKind, SpecError> {
        match self.next_token() {
            Some(Token::AliasKind(kind)) => Ok(kind),
            _ => Err(self.shape_error("alias type")),
        }
    }

    pub fn text_list(&mut self) -> Result<Vec<String>, SpecError> {
        match self.next_token() {
            Some(Token::List(items)) => self.texts(items),
            _ => Err(self.shape_error("list")),
        }
    }

    /// The next field if an optional group supplied one.
    pub fn optional_text_list(&mut self) -> Result<Option<Vec<String>>, SpecError> {
        if self.is_empty() {
            return Ok(None);
        }
        self.text_list().map(Some)
    }

    pub fn optional_bool(&mut self) -> Result<Option<bool>, SpecError> {
        match self.next_token() {
            None => Ok(None),
            Some(Token::Bool(value)) => Ok(Some(value)),
            Some(_) => Err(self.shape_error("boolean")),
        }
    }

    /// Every remaining field, each a list.
    pub fn remaining_text_lists(&mut self) -> Result<Vec<Vec<String>>, SpecError> {
        let mut lists = Vec::with_capacity(self.len());
        while !self.is_empty() {
            lists.push(self.text_list()?);
        }
        Ok(lists)
    }

    fn next_token(&mut self) -> Option<Token> {
        self.position += 1;
        self.tokens.pop_front()
    }

    fn texts(&self, items: Vec<Token>) -> Result<Vec<String>, SpecError> {
        items
            .into_iter()
            .map(|item| match item {
                Token::Text(text) => Ok(text),
                _ => Err(self.shape_error("list of text values")),
            })
            .collect()
    }

    fn shape_error(&self, expected: &'static str) -> SpecError {
        SpecError::FieldShape {
            position: self.position,
            raw: self.raw.clone(),
            expected,
        }
    }
}
