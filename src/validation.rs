//! Validators for single colon-delimited fields of an option declaration.
//!
//! Every validator either returns the (possibly transformed) value or a
//! [`SpecError`] describing why the token was rejected.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Pattern for option and variable names.
///
/// Narrower than what the shell allows so that generated variables follow the
/// `SURFRAW_elvisname_onewordvar` convention.
pub const NAME_PATTERN: &str = "^[a-z]+$";
/// Pattern for values of enum options.
pub const ENUM_VALUE_PATTERN: &str = "^[a-z0-9][a-z0-9_+-]*$";
/// Pattern for metavar overrides (before uppercasing).
pub const METAVAR_PATTERN: &str = "^[a-z]+$";

static RE_NAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(NAME_PATTERN).unwrap());
static RE_ENUM_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ENUM_VALUE_PATTERN).unwrap());
static RE_METAVAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(METAVAR_PATTERN).unwrap());

const TRUE_WORDS: &[&str] = &["yes"];
const FALSE_WORDS: &[&str] = &["no"];

/// Errors raised while reading a single declaration string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("name '{0}' is an invalid variable name for an elvis")]
    InvalidName(String),

    #[error("bool '{0}' must be one of the following: {}", bool_words())]
    InvalidBool(String),

    #[error("enum value '{0}' must match the regex '{}'", ENUM_VALUE_PATTERN)]
    InvalidEnumValue(String),

    #[error("metavar '{0}' must match the regex '{}'", METAVAR_PATTERN)]
    InvalidMetavar(String),

    #[error("{subject} type '{given}' must be one of the following: {expected}")]
    UnknownKind {
        subject: &'static str,
        given: String,
        expected: String,
    },

    #[error("aliases may not target other aliases")]
    AliasToAlias,

    #[error("current group {group} for '{raw}' needs at least {needed} colon-delimited parts")]
    TooFewParts {
        group: usize,
        raw: String,
        needed: usize,
    },

    #[error("optional field groups must start with a single field")]
    MalformedGroup,

    #[error("field {position} of '{raw}' does not hold a {expected}")]
    FieldShape {
        position: usize,
        raw: String,
        expected: &'static str,
    },

    #[error("fourth argument to `--list` option must be provided for enum list '{0}'")]
    MissingEnumListValues(String),
}

fn bool_words() -> String {
    let mut words: Vec<&str> = TRUE_WORDS.iter().chain(FALSE_WORDS).copied().collect();
    words.sort_unstable();
    words.join(", ")
}

/// Return `name` unchanged if it may name an option or variable.
pub fn validate_name(name: &str) -> Result<String, SpecError> {
    if !RE_NAME.is_match(name) {
        return Err(SpecError::InvalidName(name.to_string()));
    }
    Ok(name.to_string())
}

/// Return `word` unchanged if it is a boolean word.
pub fn validate_bool(word: &str) -> Result<String, SpecError> {
    parse_bool(word).map(|_| word.to_string())
}

/// Map a boolean word to `true` or `false`.
pub fn parse_bool(word: &str) -> Result<bool, SpecError> {
    if TRUE_WORDS.contains(&word) {
        Ok(true)
    } else if FALSE_WORDS.contains(&word) {
        Ok(false)
    } else {
        Err(SpecError::InvalidBool(word.to_string()))
    }
}

/// Return `value` unchanged if it is a valid enum value.
///
/// Surfraw itself accepts anything here; the restriction keeps generated
/// `case` patterns free of quoting.
pub fn validate_enum_value(value: &str) -> Result<String, SpecError> {
    if !RE_ENUM_VALUE.is_match(value) {
        return Err(SpecError::InvalidEnumValue(value.to_string()));
    }
    Ok(value.to_string())
}

/// Validate a metavar and normalize it to uppercase.
pub fn validate_metavar(metavar: &str) -> Result<String, SpecError> {
    if !RE_METAVAR.is_match(metavar) {
        return Err(SpecError::InvalidMetavar(metavar.to_string()));
    }
    Ok(metavar.to_uppercase())
}

/// Identity validator.
pub fn no_validation(arg: &str) -> Result<String, SpecError> {
    Ok(arg.to_string())
}

/// Run `validator` over every element of a comma-delimited list.
///
/// An empty string is an empty list, not a list holding one empty string.
pub fn list_of<T, F>(arg: &str, validator: F) -> Result<Vec<T>, SpecError>
where
    F: Fn(&str) -> Result<T, SpecError>,
{
    if arg.is_empty() {
        return Ok(Vec::new());
    }
    arg.split(',').map(validator).collect()
}
