//! Linking a batch of unresolved declarations into an option table.
//!
//! Resolution runs six passes in a fixed order:
//!
//! 1. build every variable-creating option and register its name;
//! 2. attach flags to the variable they target;
//! 3. check each flag's value against its target;
//! 4. attach aliases to a variable or a flag of the declared kind;
//! 5. apply metavar and description overrides;
//! 6. check that mappings, inlines and collapses name an existing variable.
//!
//! The first error aborts the run and nothing partially linked escapes.

use crate::kind::{KindRegistry, OptionKind};
use crate::options::{self, Alias, AliasTarget, Flag, FlagValue, VarOption};
use crate::records::{Batch, CollapseRecord, FlagRecord, InlineRecord, MappingRecord};
use crate::validation::SpecError;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, trace};

/// Errors raised while linking declarations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("option name '{0}' is global, which cannot be overridden by elvi")]
    ReservedName(String),

    #[error("enum '{0}' must specify its valid values")]
    EmptyEnum(String),

    #[error("enum default value '{default}' must be within '{values}'")]
    EnumDefault { default: String, values: String },

    #[error(
        "enum list option {name}'s defaults ('{defaults}') must be a subset of its valid values ('{values}')"
    )]
    ListDefaults {
        name: String,
        defaults: String,
        values: String,
    },

    #[error("special options cannot have the name '{0}'")]
    SpecialName(String),

    #[error("the variable name '{0}' is duplicated")]
    DuplicateVariable(String),

    #[error("the non-variable-creating option name '{0}' is duplicated")]
    DuplicateNonVariable(String),

    #[error("flag option '{flag}' does not target any existing {kinds} option")]
    DanglingFlag { flag: String, kinds: String },

    #[error("invalid value for flag '{flag}': {source}")]
    InvalidFlagValue { flag: String, source: SpecError },

    #[error("value '{value}' of flag '{flag}' is not contained in its target enum '{target}' ('{values}')")]
    NotInEnum {
        flag: String,
        value: String,
        target: String,
        values: String,
    },

    #[error(
        "enum list flag option {flag}'s value ('{chosen}') must be a subset of its target's values ('{values}')"
    )]
    NotSubsetOfList {
        flag: String,
        chosen: String,
        values: String,
    },

    #[error("value '{value}' of flag '{flag}' for special 'results' option must be an integer")]
    ResultsNotInteger { flag: String, value: String },

    #[error("alias '{alias}' does not target any option of matching type ('{kind}')")]
    DanglingAlias { alias: String, kind: OptionKind },

    #[error("metavar for '{target}' with the value '{metavar}' targets a non-existent variable")]
    DanglingMetavar { target: String, metavar: String },

    #[error("description for '{0}' targets a non-existent variable")]
    DanglingDescription(String),

    #[error("{subject} '{target}' does not target any existing variable")]
    DanglingDirective {
        subject: &'static str,
        target: String,
    },
}

/// Directives whose targets have been confirmed to exist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Directives {
    pub mappings: Vec<MappingRecord>,
    pub list_mappings: Vec<MappingRecord>,
    pub inlines: Vec<InlineRecord>,
    pub list_inlines: Vec<InlineRecord>,
    pub collapses: Vec<CollapseRecord>,
}

impl Directives {
    pub fn has_mappings(&self) -> bool {
        !self.mappings.is_empty() || !self.list_mappings.is_empty()
    }
}

/// The fully linked options of one elvis.
///
/// Options live in declaration-ordered arenas and refer to each other by
/// name; use [`OptionTable::variable`] and [`OptionTable::flag`] to follow a
/// reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OptionTable {
    variables: Vec<VarOption>,
    #[serde(skip)]
    variable_index: HashMap<String, usize>,
    flags: Vec<Flag>,
    #[serde(skip)]
    flag_index: HashMap<String, usize>,
    aliases: Vec<Alias>,
    directives: Directives,
}

impl OptionTable {
    pub fn variables(&self) -> &[VarOption] {
        &self.variables
    }

    /// Variable options of one kind, in declaration order.
    pub fn variables_of(&self, kind: OptionKind) -> impl Iterator<Item = &VarOption> {
        self.variables.iter().filter(move |var| var.kind() == kind)
    }

    pub fn variable(&self, name: &str) -> Option<&VarOption> {
        self.variable_index.get(name).map(|&i| &self.variables[i])
    }

    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }

    pub fn flag(&self, name: &str) -> Option<&Flag> {
        self.flag_index.get(name).map(|&i| &self.flags[i])
    }

    /// Flags targeting `var`, in declaration order.
    pub fn flags_of<'a>(&'a self, var: &'a VarOption) -> impl Iterator<Item = &'a Flag> + 'a {
        var.flags().iter().filter_map(move |name| self.flag(name))
    }

    pub fn aliases(&self) -> &[Alias] {
        &self.aliases
    }

    pub fn alias(&self, name: &str) -> Option<&Alias> {
        self.aliases.iter().find(|alias| alias.name() == name)
    }

    pub fn directives(&self) -> &Directives {
        &self.directives
    }

    /// Aliases and flags only make sense when some variable exists.
    pub fn any_variables(&self) -> bool {
        !self.variables.is_empty()
    }
}

/// Links batches of declarations using one kind registry.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'r> {
    registry: &'r KindRegistry,
}

impl<'r> Resolver<'r> {
    pub fn new(registry: &'r KindRegistry) -> Self {
        Self { registry }
    }

    /// Run every pass over `batch`.
    pub fn resolve(&self, batch: &Batch) -> Result<OptionTable, ResolveError> {
        let mut linker = Linker::new(self.registry);
        linker.materialize_variables(batch)?;
        let pending = linker.attach_flags(&batch.flags)?;
        linker.validate_flags(&batch.flags, &pending)?;
        linker.attach_aliases(batch)?;
        linker.apply_overrides(batch)?;
        linker.check_directives(batch)?;
        Ok(linker.table)
    }
}

/// Resolve `batch` with the standard kind registry.
pub fn resolve(batch: &Batch) -> Result<OptionTable, ResolveError> {
    Resolver::new(KindRegistry::standard()).resolve(batch)
}

/// Resolution state; lives only for one call to [`Resolver::resolve`].
struct Linker<'r> {
    registry: &'r KindRegistry,
    table: OptionTable,
    /// Names of flags and aliases, which share a namespace separate from
    /// variables.
    non_variable_names: HashSet<String>,
}

impl<'r> Linker<'r> {
    fn new(registry: &'r KindRegistry) -> Self {
        Self {
            registry,
            table: OptionTable::default(),
            non_variable_names: HashSet::new(),
        }
    }

    fn materialize_variables(&mut self, batch: &Batch) -> Result<(), ResolveError> {
        debug!(count = batch.variables.len(), "materializing variable options");
        for record in &batch.variables {
            let option = record.materialize()?;
            if self.table.variable_index.contains_key(option.name()) {
                return Err(ResolveError::DuplicateVariable(option.name().to_string()));
            }
            trace!(name = option.name(), kind = %option.kind(), "registered variable");
            self.table
                .variable_index
                .insert(option.name().to_string(), self.table.variables.len());
            self.table.variables.push(option);
        }
        Ok(())
    }

    fn claim_non_variable_name(&mut self, name: &str) -> Result<(), ResolveError> {
        if !self.non_variable_names.insert(name.to_string()) {
            return Err(ResolveError::DuplicateNonVariable(name.to_string()));
        }
        Ok(())
    }

    /// Returns the flags' records keyed by flag name, for pass 3.
    fn attach_flags<'b>(
        &mut self,
        flags: &'b [FlagRecord],
    ) -> Result<HashMap<&'b str, &'b FlagRecord>, ResolveError> {
        debug!(count = flags.len(), "attaching flags");
        let mut pending = HashMap::with_capacity(flags.len());
        for record in flags {
            options::ensure_not_reserved(&record.name)?;
            let Some(&index) = self.table.variable_index.get(&record.target) else {
                return Err(ResolveError::DanglingFlag {
                    flag: record.name.clone(),
                    kinds: self.registry.describe_variable_kinds(),
                });
            };
            self.claim_non_variable_name(&record.name)?;
            self.table.variables[index].attach_flag(&record.name);
            pending.insert(record.name.as_str(), record);
            trace!(flag = %record.name, target = %record.target, "attached flag");
        }
        Ok(pending)
    }

    fn validate_flags(
        &mut self,
        flags: &[FlagRecord],
        pending: &HashMap<&str, &FlagRecord>,
    ) -> Result<(), ResolveError> {
        debug!("validating flag values");
        let mut values: HashMap<&str, FlagValue> = HashMap::with_capacity(pending.len());
        for target in self.table.variables.iter().filter(|v| !v.flags().is_empty()) {
            for name in target.flags() {
                let Some(record) = pending.get(name.as_str()) else {
                    continue;
                };
                let value = target.validate_flag_value(&record.name, &record.value)?;
                values.insert(record.name.as_str(), value);
            }
        }

        for record in flags {
            let Some(value) = values.remove(record.name.as_str()) else {
                continue;
            };
            let Some(target) = self.table.variable(&record.target) else {
                continue;
            };
            let flag = Flag::new(&record.name, target, value)?;
            self.table
                .flag_index
                .insert(record.name.clone(), self.table.flags.len());
            self.table.flags.push(flag);
        }
        Ok(())
    }

    fn attach_aliases(&mut self, batch: &Batch) -> Result<(), ResolveError> {
        debug!(count = batch.aliases.len(), "attaching aliases");
        for record in &batch.aliases {
            let dangling = || ResolveError::DanglingAlias {
                alias: record.name.clone(),
                kind: record.kind,
            };
            let target = if record.kind == OptionKind::Flag {
                self.table
                    .flag_index
                    .get(&record.target)
                    .map(|_| AliasTarget::Flag(record.target.clone()))
            } else {
                self.table
                    .variable(&record.target)
                    .filter(|var| var.kind() == record.kind)
                    .map(|_| AliasTarget::Variable(record.target.clone()))
            }
            .ok_or_else(dangling)?;

            let alias = Alias::new(&record.name, target, record.kind)?;
            self.claim_non_variable_name(&record.name)?;
            match alias.target() {
                AliasTarget::Flag(name) => {
                    if let Some(&index) = self.table.flag_index.get(name) {
                        self.table.flags[index].attach_alias(&record.name);
                    }
                }
                AliasTarget::Variable(name) => {
                    if let Some(&index) = self.table.variable_index.get(name) {
                        self.table.variables[index].attach_alias(&record.name);
                    }
                }
            }
            trace!(alias = %record.name, target = %record.target, "attached alias");
            self.table.aliases.push(alias);
        }
        Ok(())
    }

    fn apply_overrides(&mut self, batch: &Batch) -> Result<(), ResolveError> {
        debug!(
            metavars = batch.metavars.len(),
            descriptions = batch.descriptions.len(),
            "applying metadata overrides"
        );
        for record in &batch.metavars {
            let option = self.variable_mut(&record.target).ok_or_else(|| {
                ResolveError::DanglingMetavar {
                    target: record.target.clone(),
                    metavar: record.metavar.clone(),
                }
            })?;
            option.set_metavar(&record.metavar);
        }
        for record in &batch.descriptions {
            let option = self
                .variable_mut(&record.target)
                .ok_or_else(|| ResolveError::DanglingDescription(record.target.clone()))?;
            option.set_description(&record.description);
        }
        Ok(())
    }

    fn check_directives(&mut self, batch: &Batch) -> Result<(), ResolveError> {
        debug!("checking directive targets");
        let targets = batch
            .mappings
            .iter()
            .chain(&batch.list_mappings)
            .map(|m| ("URL parameter", &m.target))
            .chain(
                batch
                    .inlines
                    .iter()
                    .chain(&batch.list_inlines)
                    .map(|i| ("inlining", &i.target)),
            )
            .chain(batch.collapses.iter().map(|c| ("collapse", &c.target)));
        for (subject, target) in targets {
            if self.table.variable(target).is_none() {
                return Err(ResolveError::DanglingDirective {
                    subject,
                    target: target.clone(),
                });
            }
        }

        self.table.directives = Directives {
            mappings: batch.mappings.clone(),
            list_mappings: batch.list_mappings.clone(),
            inlines: batch.inlines.clone(),
            list_inlines: batch.list_inlines.clone(),
            collapses: batch.collapses.clone(),
        };
        Ok(())
    }

    fn variable_mut(&mut self, name: &str) -> Option<&mut VarOption> {
        let index = *self.table.variable_index.get(name)?;
        self.table.variables.get_mut(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{Special, VarKind};
    use crate::records::{SpecialRecord, VarRecord};

    fn batch() -> BatchBuilder {
        BatchBuilder(Batch::new())
    }

    struct BatchBuilder(Batch);

    impl BatchBuilder {
        fn bool(mut self, raw: &str) -> Self {
            self.0.variables.push(VarRecord::Bool(raw.parse().unwrap()));
            self
        }
        fn enumeration(mut self, raw: &str) -> Self {
            self.0.variables.push(VarRecord::Enum(raw.parse().unwrap()));
            self
        }
        fn anything(mut self, raw: &str) -> Self {
            self.0.variables.push(VarRecord::Anything(raw.parse().unwrap()));
            self
        }
        fn list(mut self, raw: &str) -> Self {
            self.0.variables.push(VarRecord::List(raw.parse().unwrap()));
            self
        }
        fn special(mut self, special: Special) -> Self {
            self.0
                .variables
                .push(VarRecord::Special(SpecialRecord::new(special)));
            self
        }
        fn flag(mut self, raw: &str) -> Self {
            self.0.flags.push(raw.parse().unwrap());
            self
        }
        fn alias(mut self, raw: &str) -> Self {
            self.0.aliases.push(raw.parse().unwrap());
            self
        }
        fn mapping(mut self, raw: &str) -> Self {
            self.0.mappings.push(raw.parse().unwrap());
            self
        }
        fn list_mapping(mut self, raw: &str) -> Self {
            self.0.list_mappings.push(raw.parse().unwrap());
            self
        }
        fn inline(mut self, raw: &str) -> Self {
            self.0.inlines.push(raw.parse().unwrap());
            self
        }
        fn collapse(mut self, raw: &str) -> Self {
            self.0.collapses.push(raw.parse().unwrap());
            self
        }
        fn metavar(mut self, raw: &str) -> Self {
            self.0.metavars.push(raw.parse().unwrap());
            self
        }
        fn describe(mut self, raw: &str) -> Self {
            self.0.descriptions.push(raw.parse().unwrap());
            self
        }
        fn resolve(&self) -> Result<OptionTable, ResolveError> {
            resolve(&self.0)
        }
    }

    fn sort_enum() -> BatchBuilder {
        batch().enumeration("sort:relevance:relevance,date")
    }

    #[test]
    fn test_empty_batch_resolves() {
        let table = batch().resolve().unwrap();
        assert!(!table.any_variables());
        assert!(table.flags().is_empty());
    }

    #[test]
    fn test_variables_keep_declaration_order() {
        let table = batch()
            .bool("safe:yes")
            .enumeration("sort:a:a,b")
            .anything("site:")
            .list("tags:anything:")
            .special(Special::Results)
            .resolve()
            .unwrap();
        let names: Vec<&str> = table.variables().iter().map(|v| v.name()).collect();
        assert_eq!(names, vec!["safe", "sort", "site", "tags", "results"]);
        assert_eq!(table.variables_of(OptionKind::Enum).count(), 1);
    }

    #[test]
    fn test_duplicate_variable_name() {
        let err = batch().bool("safe:yes").anything("safe:x").resolve().unwrap_err();
        assert_eq!(err, ResolveError::DuplicateVariable("safe".to_string()));
    }

    #[test]
    fn test_construction_error_aborts() {
        let err = batch()
            .enumeration("sort:size:date,name")
            .resolve()
            .unwrap_err();
        assert!(matches!(err, ResolveError::EnumDefault { .. }));
    }

    #[test]
    fn test_reserved_name_aborts() {
        let err = batch().bool("help:yes").resolve().unwrap_err();
        assert_eq!(err, ResolveError::ReservedName("help".to_string()));
    }

    #[test]
    fn test_flag_resolves_to_enum() {
        let table = sort_enum().flag("bydate:sort:date").resolve().unwrap();
        let sort = table.variable("sort").unwrap();
        assert_eq!(sort.flags(), ["bydate".to_string()]);

        let flag = table.flag("bydate").unwrap();
        assert_eq!(flag.target(), "sort");
        assert_eq!(flag.value(), &FlagValue::Text("date".to_string()));
        assert_eq!(table.flags_of(sort).count(), 1);
    }

    #[test]
    fn test_flag_value_not_in_enum() {
        let err = sort_enum()
            .flag("bydate:sort:date")
            .flag("bynum:sort:popularity")
            .resolve()
            .unwrap_err();
        assert!(matches!(err, ResolveError::NotInEnum { ref flag, .. } if flag == "bynum"));
        assert!(err
            .to_string()
            .starts_with("value 'popularity' of flag 'bynum' is not contained in its target enum"));
    }

    #[test]
    fn test_flag_to_missing_target() {
        let err = batch().flag("fast:speed:high").resolve().unwrap_err();
        assert_eq!(
            err.to_string(),
            "flag option 'fast' does not target any existing \
             'anything', 'bool', 'enum', 'list', or 'special' option"
        );
    }

    #[test]
    fn test_flag_cannot_target_flag() {
        let err = batch()
            .bool("safe:yes")
            .flag("unsafe:safe:no")
            .flag("reallyunsafe:unsafe:no")
            .resolve()
            .unwrap_err();
        assert!(matches!(err, ResolveError::DanglingFlag { .. }));
    }

    #[test]
    fn test_flags_keep_declaration_order_per_target() {
        let table = sort_enum()
            .bool("safe:yes")
            .flag("unsafe:safe:no")
            .flag("bydate:sort:date")
            .flag("byrel:sort:relevance")
            .resolve()
            .unwrap();
        assert_eq!(
            table.variable("sort").unwrap().flags(),
            ["bydate".to_string(), "byrel".to_string()]
        );
        let names: Vec<&str> = table.flags().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["unsafe", "bydate", "byrel"]);
    }

    #[test]
    fn test_bool_flag_value_checked() {
        let err = batch()
            .bool("safe:yes")
            .flag("unsafe:safe:off")
            .resolve()
            .unwrap_err();
        assert!(matches!(err, ResolveError::InvalidFlagValue { .. }));
    }

    #[test]
    fn test_results_flag_coerced() {
        let table = batch()
            .special(Special::Results)
            .flag("many:results:100")
            .resolve()
            .unwrap();
        assert_eq!(
            table.flag("many").unwrap().value(),
            &FlagValue::Integer(100)
        );

        let err = batch()
            .special(Special::Results)
            .flag("many:results:lots")
            .resolve()
            .unwrap_err();
        assert!(matches!(err, ResolveError::ResultsNotInteger { .. }));
    }

    #[test]
    fn test_language_flag_unchecked() {
        let table = batch()
            .special(Special::Language)
            .flag("german:language:de")
            .resolve()
            .unwrap();
        assert_eq!(
            table.flag("german").unwrap().value(),
            &FlagValue::Text("de".to_string())
        );
    }

    #[test]
    fn test_list_flag_values() {
        let table = batch()
            .list("ft:enum:pdf:pdf,doc,xls")
            .flag("office:ft:doc,xls")
            .resolve()
            .unwrap();
        let flag = table.flag("office").unwrap();
        assert_eq!(
            flag.value(),
            &FlagValue::List(vec!["doc".to_string(), "xls".to_string()])
        );
        assert_eq!(
            flag.description(),
            "An alias for the 'enum' list option 'ft' with the values 'doc,xls'"
        );

        let err = batch()
            .list("ft:enum:pdf:pdf,doc")
            .flag("office:ft:doc,odt")
            .resolve()
            .unwrap_err();
        assert!(matches!(err, ResolveError::NotSubsetOfList { .. }));
    }

    #[test]
    fn test_duplicate_flag_names() {
        let err = sort_enum()
            .flag("by:sort:date")
            .flag("by:sort:relevance")
            .resolve()
            .unwrap_err();
        assert_eq!(err, ResolveError::DuplicateNonVariable("by".to_string()));
    }

    #[test]
    fn test_flag_may_share_name_with_variable() {
        let table = batch()
            .bool("safe:yes")
            .bool("strict:no")
            .flag("strict:safe:no")
            .resolve()
            .unwrap();
        assert!(table.variable("strict").is_some());
        assert!(table.flag("strict").is_some());
    }

    #[test]
    fn test_alias_to_enum() {
        let table = sort_enum().alias("s:sort:enum").resolve().unwrap();
        let sort = table.variable("sort").unwrap();
        assert!(sort.has_alias("s"));
        assert_eq!(sort.aliases().collect::<Vec<_>>(), vec!["s"]);

        let alias = table.alias("s").unwrap();
        assert_eq!(alias.target(), &AliasTarget::Variable("sort".to_string()));
        assert_eq!(alias.kind(), OptionKind::Enum);
    }

    #[test]
    fn test_alias_kind_mismatch() {
        let err = sort_enum().alias("s:sort:flag").resolve().unwrap_err();
        assert_eq!(
            err,
            ResolveError::DanglingAlias {
                alias: "s".to_string(),
                kind: OptionKind::Flag,
            }
        );
        assert_eq!(
            err.to_string(),
            "alias 's' does not target any option of matching type ('flag')"
        );

        let err = sort_enum().alias("s:sort:bool").resolve().unwrap_err();
        assert!(matches!(err, ResolveError::DanglingAlias { .. }));
    }

    #[test]
    fn test_alias_to_flag() {
        let table = sort_enum()
            .flag("bydate:sort:date")
            .alias("d:bydate:flag")
            .resolve()
            .unwrap();
        assert!(table.flag("bydate").unwrap().has_alias("d"));
        assert!(!table.variable("sort").unwrap().has_alias("d"));
    }

    #[test]
    fn test_alias_to_missing_flag() {
        let err = sort_enum().alias("d:bydate:flag").resolve().unwrap_err();
        assert!(matches!(err, ResolveError::DanglingAlias { .. }));
    }

    #[test]
    fn test_alias_name_clashes_with_flag() {
        let err = sort_enum()
            .flag("bydate:sort:date")
            .alias("bydate:sort:enum")
            .resolve()
            .unwrap_err();
        assert_eq!(err, ResolveError::DuplicateNonVariable("bydate".to_string()));
    }

    #[test]
    fn test_alias_to_special() {
        let table = batch()
            .special(Special::Results)
            .alias("n:results:special")
            .resolve()
            .unwrap();
        assert!(table.variable("results").unwrap().has_alias("n"));
    }

    #[test]
    fn test_overrides_apply_to_variables() {
        let table = batch()
            .metavar("sort:order")
            .describe("sort:How results are sorted")
            .enumeration("sort:relevance:relevance,date")
            .resolve()
            .unwrap();
        let sort = table.variable("sort").unwrap();
        assert_eq!(sort.metavar(), Some("ORDER"));
        assert_eq!(sort.description(), "How results are sorted");
    }

    #[test]
    fn test_metavar_override_cannot_target_flag() {
        let err = sort_enum()
            .flag("bydate:sort:date")
            .metavar("bydate:when")
            .resolve()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "metavar for 'bydate' with the value 'WHEN' targets a non-existent variable"
        );
    }

    #[test]
    fn test_description_override_missing_target() {
        let err = batch().describe("nope:text").resolve().unwrap_err();
        assert_eq!(err, ResolveError::DanglingDescription("nope".to_string()));
    }

    #[test]
    fn test_mapping_to_missing_variable() {
        let err = sort_enum().mapping("order:o").resolve().unwrap_err();
        assert_eq!(
            err.to_string(),
            "URL parameter 'order' does not target any existing variable"
        );

        let err = sort_enum().list_mapping("order:o").resolve().unwrap_err();
        assert!(matches!(
            err,
            ResolveError::DanglingDirective {
                subject: "URL parameter",
                ..
            }
        ));
    }

    #[test]
    fn test_inline_and_collapse_subjects() {
        let err = sort_enum().inline("ft:filetype").resolve().unwrap_err();
        assert!(err.to_string().starts_with("inlining 'ft'"));

        let err = sort_enum().collapse("ft:a,b").resolve().unwrap_err();
        assert!(err.to_string().starts_with("collapse 'ft'"));
    }

    #[test]
    fn test_directives_kept_after_check() {
        let table = sort_enum()
            .mapping("sort:order")
            .inline("sort:sortby")
            .collapse("sort")
            .resolve()
            .unwrap();
        let directives = table.directives();
        assert!(directives.has_mappings());
        assert_eq!(directives.mappings[0].parameter, "order");
        assert_eq!(directives.inlines[0].keyword, "sortby");
        assert!(directives.collapses[0].collapses.is_empty());
    }

    #[test]
    fn test_flag_errors_reported_before_alias_errors() {
        let err = sort_enum()
            .alias("x:missing:bool")
            .flag("bynum:sort:popularity")
            .resolve()
            .unwrap_err();
        assert!(matches!(err, ResolveError::NotInEnum { .. }));
    }

    #[test]
    fn test_resolution_is_repeatable() {
        let builder = sort_enum()
            .bool("safe:yes")
            .flag("bydate:sort:date")
            .alias("s:sort:enum")
            .alias("d:bydate:flag")
            .metavar("safe:filter")
            .mapping("sort:order");
        let first = builder.resolve().unwrap();
        let second = builder.resolve().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_resolver_with_explicit_registry() {
        let registry = KindRegistry::new();
        let resolver = Resolver::new(&registry);
        let table = resolver.resolve(&sort_enum().0).unwrap();
        assert!(matches!(
            table.variable("sort").unwrap().var_kind(),
            VarKind::Enum { .. }
        ));
    }
}
