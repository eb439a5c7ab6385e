//! Elvis configuration, read from JSON or assembled from command-line flags.

use crate::kind::KindRegistry;
use crate::options::Special;
use crate::records::{
    AliasRecord, AnythingRecord, Batch, BoolRecord, CollapseRecord, DescribeRecord, EnumRecord,
    FlagRecord, InlineRecord, ListRecord, MappingRecord, MetavarRecord, Record, SpecialRecord,
    VarRecord,
};
use crate::resolve::ResolveError;
use crate::validation::SpecError;
use clap::{ArgMatches, Args};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;

/// Pattern an elvis name must match; it ends up in shell variable names.
pub const ELVIS_NAME_PATTERN: &str = "^[a-zA-Z0-9]+$";

static RE_ELVIS_NAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(ELVIS_NAME_PATTERN).unwrap());

/// URL schemes recognised at the start of a base or search URL.
const SCHEMES: [&str; 2] = ["https", "http"];

/// Errors that can occur while loading or validating an elvis configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse JSON config: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error(
        "elvis names must match the regex /{}/ (similar to shell variables), got '{0}'",
        ELVIS_NAME_PATTERN
    )]
    InvalidName(String),

    #[error("there must be at least one tab after elvis name")]
    InvalidNumTabs,

    #[error("the schemes of both URLs must be the same ('{base}' and '{search}')")]
    SchemeMismatch { base: String, search: String },

    #[error("mapping variables without a defined query parameter is forbidden")]
    MappingWithoutQueryParameter,

    #[error("{flag}: {source}")]
    Declaration {
        flag: &'static str,
        source: SpecError,
    },

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// The declaration flags that create a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarDeclaration {
    YesNo,
    Enum,
    Anything,
    List,
}

impl VarDeclaration {
    pub const ALL: [VarDeclaration; 4] = [
        VarDeclaration::YesNo,
        VarDeclaration::Enum,
        VarDeclaration::Anything,
        VarDeclaration::List,
    ];

    /// Command-line spelling, used to prefix parse errors.
    pub fn flag(self) -> &'static str {
        match self {
            VarDeclaration::YesNo => "--yes-no",
            VarDeclaration::Enum => "--enum",
            VarDeclaration::Anything => "--anything",
            VarDeclaration::List => "--list",
        }
    }

    /// Id of the matching field in [`OptionSpecs`]' clap arguments.
    fn arg_id(self) -> &'static str {
        match self {
            VarDeclaration::YesNo => "yes_no",
            VarDeclaration::Enum => "enums",
            VarDeclaration::Anything => "anything",
            VarDeclaration::List => "list",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Option declarations, one colon-delimited string per entry.
///
/// Shared between the JSON `options` table and the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Args, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptionSpecs {
    /// Boolean option: NAME:DEFAULT
    #[arg(short = 'Y', long = "yes-no", value_name = "NAME:DEFAULT")]
    pub yes_no: Vec<String>,

    /// Enum option: NAME:DEFAULT:VALUES
    #[arg(short = 'E', long = "enum", value_name = "NAME:DEFAULT:VALUES")]
    #[serde(rename = "enum")]
    pub enums: Vec<String>,

    /// Unchecked option: NAME:DEFAULT
    #[arg(short = 'A', long, value_name = "NAME:DEFAULT")]
    pub anything: Vec<String>,

    /// List option: NAME:TYPE:DEFAULTS[:VALUES]
    #[arg(long, value_name = "NAME:TYPE:DEFAULTS[:VALUES]")]
    pub list: Vec<String>,

    /// Flag setting a variable to a fixed value: NAME:TARGET:VALUE
    #[arg(short = 'F', long, value_name = "NAME:TARGET:VALUE")]
    pub flag: Vec<String>,

    /// Alias to another option: NAME:TARGET:TYPE
    #[arg(long, value_name = "NAME:TARGET:TYPE")]
    pub alias: Vec<String>,

    /// Map a variable to a URL parameter: VARIABLE:PARAMETER[:URL_ENCODE]
    #[arg(long, value_name = "VARIABLE:PARAMETER[:URL_ENCODE]")]
    pub map: Vec<String>,

    /// Map a list variable to a URL parameter: VARIABLE:PARAMETER[:URL_ENCODE]
    #[arg(long, value_name = "VARIABLE:PARAMETER[:URL_ENCODE]")]
    pub list_map: Vec<String>,

    /// Inline a variable into the query: VARIABLE:KEYWORD
    #[arg(long, value_name = "VARIABLE:KEYWORD")]
    pub inline: Vec<String>,

    /// Inline a list variable into the query: VARIABLE:KEYWORD
    #[arg(long, value_name = "VARIABLE:KEYWORD")]
    pub list_inline: Vec<String>,

    /// Rewrite a variable's values: VARIABLE:VAL1,VAL2,RESULT:...
    #[arg(long, value_name = "VARIABLE:CASES")]
    pub collapse: Vec<String>,

    /// Override a variable's metavar: VARIABLE:METAVAR
    #[arg(long, value_name = "VARIABLE:METAVAR")]
    pub metavar: Vec<String>,

    /// Override a variable's description: VARIABLE:DESCRIPTION
    #[arg(long, value_name = "VARIABLE:DESCRIPTION")]
    pub describe: Vec<String>,

    /// Add the -results=NUM option
    #[arg(long)]
    pub use_results_option: bool,

    /// Add the -language=ISOCODE option
    #[arg(long)]
    pub use_language_option: bool,

    /// Order of the variable declarations across their four lists; the n-th
    /// entry of a kind stands for the n-th string of that kind's list.
    #[arg(skip)]
    #[serde(skip)]
    pub declaration_order: Vec<VarDeclaration>,
}

impl OptionSpecs {
    /// The strings declared with `declaration`.
    pub fn declarations(&self, declaration: VarDeclaration) -> &[String] {
        match declaration {
            VarDeclaration::YesNo => &self.yes_no,
            VarDeclaration::Enum => &self.enums,
            VarDeclaration::Anything => &self.anything,
            VarDeclaration::List => &self.list,
        }
    }

    /// Record the command-line order of the variable declarations in
    /// `matches`.
    pub fn record_order(&mut self, matches: &ArgMatches) {
        let mut indexed: Vec<(usize, VarDeclaration)> = VarDeclaration::ALL
            .into_iter()
            .flat_map(|declaration| {
                matches
                    .indices_of(declaration.arg_id())
                    .into_iter()
                    .flatten()
                    .map(move |index| (index, declaration))
            })
            .collect();
        indexed.sort_by_key(|(index, _)| *index);
        self.declaration_order = indexed.into_iter().map(|(_, d)| d).collect();
    }

    /// Variable declarations in the order they were given.
    ///
    /// Declarations not covered by `declaration_order` (such as those read
    /// from JSON) follow it, grouped by kind.
    pub fn variable_order(&self) -> Vec<VarDeclaration> {
        let mut remaining = VarDeclaration::ALL.map(|d| self.declarations(d).len());
        let mut order = Vec::with_capacity(remaining.iter().sum());
        for &declaration in &self.declaration_order {
            let left = &mut remaining[declaration.index()];
            if *left > 0 {
                *left -= 1;
                order.push(declaration);
            }
        }
        for declaration in VarDeclaration::ALL {
            let left = remaining[declaration.index()];
            order.extend(std::iter::repeat(declaration).take(left));
        }
        order
    }

    /// Append every declaration of `other` after this one's.
    pub fn extend(&mut self, other: OptionSpecs) {
        let mut order = self.variable_order();
        order.extend(other.variable_order());
        self.declaration_order = order;
        self.yes_no.extend(other.yes_no);
        self.enums.extend(other.enums);
        self.anything.extend(other.anything);
        self.list.extend(other.list);
        self.flag.extend(other.flag);
        self.alias.extend(other.alias);
        self.map.extend(other.map);
        self.list_map.extend(other.list_map);
        self.inline.extend(other.inline);
        self.list_inline.extend(other.list_inline);
        self.collapse.extend(other.collapse);
        self.metavar.extend(other.metavar);
        self.describe.extend(other.describe);
        self.use_results_option |= other.use_results_option;
        self.use_language_option |= other.use_language_option;
    }
}

fn default_num_tabs() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

/// Top-level configuration of one elvis.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Name of the elvis, and of the generated file by default
    pub name: String,
    /// URL opened when no search terms are given
    pub base_url: String,
    /// URL the search terms are appended to
    pub search_url: String,
    /// One-line description; the base URL is appended to it
    #[serde(default)]
    pub description: Option<String>,
    /// Use `http` when neither URL names a scheme
    #[serde(default)]
    pub insecure: bool,
    /// Tabs after the elvis name in `sr -elvi` output
    #[serde(default = "default_num_tabs")]
    pub num_tabs: u32,
    /// URL parameter carrying the search terms
    #[serde(default)]
    pub query_parameter: Option<String>,
    #[serde(default = "default_true")]
    pub append_search_args: bool,
    #[serde(default = "default_true")]
    pub append_mappings: bool,
    #[serde(default = "default_true")]
    pub enable_completions: bool,
    #[serde(default)]
    pub options: OptionSpecs,
}

/// The elvis's URLs split into a shared scheme and scheme-less remainders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Urls {
    pub scheme: &'static str,
    pub base: String,
    pub search: String,
}

impl Urls {
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.scheme, self.base)
    }

    pub fn search_url(&self) -> String {
        format!("{}://{}", self.scheme, self.search)
    }
}

/// Strip a leading `http://` or `https://`.
fn split_scheme(url: &str) -> (Option<&'static str>, &str) {
    for scheme in SCHEMES {
        if let Some(rest) = url
            .strip_prefix(scheme)
            .and_then(|rest| rest.strip_prefix("://"))
        {
            return (Some(scheme), rest);
        }
    }
    (None, url)
}

impl Config {
    /// A configuration with every optional setting at its default.
    pub fn new(name: &str, base_url: &str, search_url: &str) -> Self {
        Self {
            name: name.to_string(),
            base_url: base_url.to_string(),
            search_url: search_url.to_string(),
            description: None,
            insecure: false,
            num_tabs: default_num_tabs(),
            query_parameter: None,
            append_search_args: true,
            append_mappings: true,
            enable_completions: true,
            options: OptionSpecs::default(),
        }
    }

    /// Parse a JSON string into a Config.
    pub fn from_json(json: &str) -> Result<Config, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        debug!(name = %config.name, "loaded elvis config");
        Ok(config)
    }

    /// Validate the elvis-level settings. Option declarations are checked by
    /// [`Config::to_batch`] and resolution.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !RE_ELVIS_NAME.is_match(&self.name) {
            return Err(ConfigError::InvalidName(self.name.clone()));
        }
        if self.num_tabs < 1 {
            return Err(ConfigError::InvalidNumTabs);
        }
        self.urls()?;
        Ok(())
    }

    /// Work out the scheme shared by both URLs.
    pub fn urls(&self) -> Result<Urls, ConfigError> {
        let (base_scheme, base) = split_scheme(&self.base_url);
        let (search_scheme, search) = split_scheme(&self.search_url);
        let scheme = match (base_scheme, search_scheme) {
            (None, None) if self.insecure => "http",
            (None, None) => "https",
            (Some(a), Some(b)) if a == b => a,
            _ => {
                return Err(ConfigError::SchemeMismatch {
                    base: self.base_url.clone(),
                    search: self.search_url.clone(),
                })
            }
        };
        Ok(Urls {
            scheme,
            base: base.to_string(),
            search: search.to_string(),
        })
    }

    /// The description shown by `sr -elvi`, e.g. "Search foo (foo.com)".
    pub fn full_description(&self, urls: &Urls) -> String {
        match &self.description {
            Some(description) => format!("{description} ({})", urls.base),
            None => format!("Search {} ({})", self.name, urls.base),
        }
    }

    /// [`Config::to_batch_with`] using the standard kinds.
    pub fn to_batch(&self) -> Result<Batch, ConfigError> {
        self.to_batch_with(KindRegistry::standard())
    }

    /// Parse every declaration into an unresolved record.
    pub fn to_batch_with(&self, registry: &KindRegistry) -> Result<Batch, ConfigError> {
        let specs = &self.options;
        let mut batch = Batch::new();

        if specs.use_results_option {
            batch
                .variables
                .push(VarRecord::Special(SpecialRecord::new(Special::Results)));
        }
        if specs.use_language_option {
            batch
                .variables
                .push(VarRecord::Special(SpecialRecord::new(Special::Language)));
        }
        let mut next = [0usize; 4];
        for declaration in specs.variable_order() {
            let position = &mut next[declaration.index()];
            let raw = &specs.declarations(declaration)[*position];
            *position += 1;
            let flag = declaration.flag();
            let record = match declaration {
                VarDeclaration::YesNo => VarRecord::Bool(parse_one::<BoolRecord>(flag, raw, registry)?),
                VarDeclaration::Enum => VarRecord::Enum(parse_one::<EnumRecord>(flag, raw, registry)?),
                VarDeclaration::Anything => {
                    VarRecord::Anything(parse_one::<AnythingRecord>(flag, raw, registry)?)
                }
                VarDeclaration::List => VarRecord::List(parse_one::<ListRecord>(flag, raw, registry)?),
            };
            batch.variables.push(record);
        }

        batch.flags = parse_all::<FlagRecord>("--flag", &specs.flag, registry)?;
        batch.aliases = parse_all::<AliasRecord>("--alias", &specs.alias, registry)?;
        batch.mappings = parse_all::<MappingRecord>("--map", &specs.map, registry)?;
        batch.list_mappings = parse_all::<MappingRecord>("--list-map", &specs.list_map, registry)?;
        batch.inlines = parse_all::<InlineRecord>("--inline", &specs.inline, registry)?;
        batch.list_inlines = parse_all::<InlineRecord>("--list-inline", &specs.list_inline, registry)?;
        batch.collapses = parse_all::<CollapseRecord>("--collapse", &specs.collapse, registry)?;
        batch.metavars = parse_all::<MetavarRecord>("--metavar", &specs.metavar, registry)?;
        batch.descriptions = parse_all::<DescribeRecord>("--describe", &specs.describe, registry)?;

        if batch.is_empty() {
            debug!("no option declarations");
            return Ok(batch);
        }
        debug!(
            variables = batch.variables.len(),
            flags = batch.flags.len(),
            aliases = batch.aliases.len(),
            "parsed option declarations"
        );
        Ok(batch)
    }
}

fn parse_one<T: Record>(
    flag: &'static str,
    raw: &str,
    registry: &KindRegistry,
) -> Result<T, ConfigError> {
    T::parse_with(raw, registry).map_err(|source| ConfigError::Declaration { flag, source })
}

fn parse_all<T: Record>(
    flag: &'static str,
    raws: &[String],
    registry: &KindRegistry,
) -> Result<Vec<T>, ConfigError> {
    raws.iter().map(|raw| parse_one(flag, raw, registry)).collect()
}
