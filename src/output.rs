//! The elvis manifest and writing it to stdout or an atomically replaced file.

use crate::config::{Config, ConfigError};
use crate::kind::KindRegistry;
use crate::resolve::{OptionTable, Resolver};
use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::Builder;
use tracing::{debug, info};

/// Output target meaning standard output.
pub const STDOUT_TARGET: &str = "-";

/// Suffix of the temporary file written next to the destination.
const TEMP_SUFFIX: &str = ".mkelvis.tmp";

/// A validated elvis with its fully resolved options.
#[derive(Debug, Clone, Serialize)]
pub struct Elvis {
    name: String,
    description: String,
    base_url: String,
    search_url: String,
    num_tabs: u32,
    query_parameter: Option<String>,
    append_search_args: bool,
    append_mappings: bool,
    enable_completions: bool,
    /// Aliases and flags only exist when some variable option does.
    any_options_defined: bool,
    #[serde(flatten)]
    options: OptionTable,
}

impl Elvis {
    /// Validate `config` and resolve its declarations with the standard
    /// kinds.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Self::with_registry(config, KindRegistry::standard())
    }

    pub fn with_registry(config: &Config, registry: &KindRegistry) -> Result<Self, ConfigError> {
        config.validate()?;
        let urls = config.urls()?;
        let batch = config.to_batch_with(registry)?;
        let options = Resolver::new(registry).resolve(&batch)?;

        if options.directives().has_mappings() && config.query_parameter.is_none() {
            return Err(ConfigError::MappingWithoutQueryParameter);
        }
        debug!(
            name = %config.name,
            variables = options.variables().len(),
            flags = options.flags().len(),
            aliases = options.aliases().len(),
            "resolved elvis"
        );

        Ok(Self {
            name: config.name.clone(),
            description: config.full_description(&urls),
            base_url: urls.base_url(),
            search_url: urls.search_url(),
            num_tabs: config.num_tabs,
            query_parameter: config.query_parameter.clone(),
            append_search_args: config.append_search_args,
            append_mappings: config.append_mappings,
            enable_completions: config.enable_completions,
            any_options_defined: options.any_variables(),
            options,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn search_url(&self) -> &str {
        &self.search_url
    }

    pub fn options(&self) -> &OptionTable {
        &self.options
    }
}

/// Render the manifest as pretty-printed JSON with a trailing newline.
pub fn manifest_string(elvis: &Elvis) -> Result<String> {
    let mut manifest = serde_json::to_string_pretty(elvis)?;
    manifest.push('\n');
    Ok(manifest)
}

/// Write the manifest to `writer`.
pub fn write_manifest<W: Write>(elvis: &Elvis, mut writer: W) -> Result<()> {
    writer.write_all(manifest_string(elvis)?.as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Write the manifest to `path`, replacing any existing file atomically.
///
/// The content goes to a temporary file in the same directory first, so
/// readers see either the old file or the complete new one.
pub fn write_manifest_file(elvis: &Elvis, path: &Path) -> Result<PathBuf> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = Builder::new()
        .prefix(&format!("{}.", elvis.name))
        .suffix(TEMP_SUFFIX)
        .tempfile_in(dir)?;
    debug!(temp = %file.path().display(), "writing manifest");
    write_manifest(elvis, &mut file)?;
    file.persist(path)?;
    Ok(path.to_path_buf())
}

/// Send the manifest to `target`: stdout for `-`, otherwise a file.
///
/// Returns the written path, or `None` for stdout.
pub fn emit(elvis: &Elvis, target: &str) -> Result<Option<PathBuf>> {
    if target == STDOUT_TARGET {
        write_manifest(elvis, std::io::stdout().lock())?;
        return Ok(None);
    }
    let path = write_manifest_file(elvis, Path::new(target))?;
    info!(path = %path.display(), "wrote elvis");
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OptionSpecs;
    use serde_json::Value;

    fn config() -> Config {
        let mut config = Config::new("foo", "foo.com", "foo.com/search");
        config.query_parameter = Some("q".to_string());
        config.options = OptionSpecs {
            yes_no: vec!["safe:yes".into()],
            enums: vec!["sort:relevance:relevance,date".into()],
            flag: vec!["bydate:sort:date".into(), "unsafe:safe:no".into()],
            alias: vec!["s:sort:enum".into(), "d:bydate:flag".into()],
            map: vec!["sort:order".into()],
            ..OptionSpecs::default()
        };
        config
    }

    fn manifest(elvis: &Elvis) -> Value {
        serde_json::from_str(&manifest_string(elvis).unwrap()).unwrap()
    }

    #[test]
    fn test_elvis_metadata() {
        let elvis = Elvis::from_config(&config()).unwrap();
        assert_eq!(elvis.name(), "foo");
        assert_eq!(elvis.description(), "Search foo (foo.com)");
        assert_eq!(elvis.base_url(), "https://foo.com");
        assert_eq!(elvis.search_url(), "https://foo.com/search");
        assert_eq!(elvis.options().variables().len(), 2);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = config();
        config.name = "foo-bar".to_string();
        assert!(matches!(
            Elvis::from_config(&config),
            Err(ConfigError::InvalidName(_))
        ));
    }

    #[test]
    fn test_resolution_error_surfaces() {
        let mut config = config();
        config.options.flag.push("bynum:sort:popularity".into());
        let err = Elvis::from_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::Resolve(_)));
        assert!(err
            .to_string()
            .contains("is not contained in its target enum"));
    }

    #[test]
    fn test_mapping_requires_query_parameter() {
        let mut config = config();
        config.query_parameter = None;
        assert!(matches!(
            Elvis::from_config(&config),
            Err(ConfigError::MappingWithoutQueryParameter)
        ));

        config.options.map.clear();
        assert!(Elvis::from_config(&config).is_ok());
    }

    #[test]
    fn test_manifest_contents() {
        let elvis = Elvis::from_config(&config()).unwrap();
        let value = manifest(&elvis);

        assert_eq!(value["name"], "foo");
        assert_eq!(value["num_tabs"], 1);
        assert_eq!(value["any_options_defined"], true);

        let sort = &value["variables"][1];
        assert_eq!(sort["name"], "sort");
        assert_eq!(sort["type"], "enum");
        assert_eq!(sort["metavar"], "SORT");
        assert_eq!(sort["values"], serde_json::json!(["relevance", "date"]));
        assert_eq!(sort["flags"], serde_json::json!(["bydate"]));
        assert_eq!(sort["aliases"], serde_json::json!(["s"]));

        let bydate = &value["flags"][0];
        assert_eq!(bydate["target"], "sort");
        assert_eq!(bydate["value"], "date");
        assert_eq!(bydate["aliases"], serde_json::json!(["d"]));

        assert_eq!(value["aliases"][1]["target"]["type"], "flag");
        assert_eq!(value["directives"]["mappings"][0]["parameter"], "order");
        assert_eq!(value["directives"]["mappings"][0]["url_encode"], true);
    }

    #[test]
    fn test_manifest_without_options() {
        let config = Config::new("foo", "foo.com", "foo.com");
        let value = manifest(&Elvis::from_config(&config).unwrap());
        assert_eq!(value["any_options_defined"], false);
        assert_eq!(value["variables"], serde_json::json!([]));
        assert_eq!(value["query_parameter"], Value::Null);
    }

    #[test]
    fn test_results_flag_serialized_as_integer() {
        let mut config = Config::new("foo", "foo.com", "foo.com");
        config.options.use_results_option = true;
        config.options.flag = vec!["many:results:50".into()];
        let value = manifest(&Elvis::from_config(&config).unwrap());
        assert_eq!(value["flags"][0]["value"], 50);
        assert_eq!(value["variables"][0]["default"], "$SURFRAW_results");
    }

    #[test]
    fn test_write_manifest_to_writer() {
        let elvis = Elvis::from_config(&config()).unwrap();
        let mut buffer = Vec::new();
        write_manifest(&elvis, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.ends_with("}\n"));
        assert_eq!(text, manifest_string(&elvis).unwrap());
    }

    #[test]
    fn test_write_manifest_file_replaces_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foo");
        std::fs::write(&path, "old").unwrap();

        let elvis = Elvis::from_config(&config()).unwrap();
        let written = write_manifest_file(&elvis, &path).unwrap();
        assert_eq!(written, path);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, manifest_string(&elvis).unwrap());

        // No temporary files left behind.
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_emit_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out");
        let elvis = Elvis::from_config(&config()).unwrap();
        let written = emit(&elvis, path.to_str().unwrap()).unwrap();
        assert_eq!(written, Some(path.clone()));
        assert!(path.exists());
    }
}
