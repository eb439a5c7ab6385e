//! mkelvis - generate surfraw elvi from option declarations.

use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, FromArgMatches, Parser};
use mkelvis::{output, Config, Elvis, OptionSpecs};
use std::ffi::OsString;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

/// Generate an elvis for surfraw.
#[derive(Parser, Debug)]
#[command(name = "mkelvis", version, about)]
struct Cli {
    /// Name of the elvis
    #[arg(required_unless_present = "config", conflicts_with = "config")]
    name: Option<String>,

    /// URL opened when no search terms are given
    #[arg(required_unless_present = "config", conflicts_with = "config")]
    base_url: Option<String>,

    /// URL the search terms are appended to
    #[arg(required_unless_present = "config", conflicts_with = "config")]
    search_url: Option<String>,

    /// Read the elvis from a JSON file; declarations given as flags are added to it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(flatten)]
    options: OptionSpecs,

    /// Use http when the URLs name no scheme
    #[arg(long)]
    insecure: bool,

    /// Do not append the search terms to the search URL
    #[arg(long)]
    no_append_args: bool,

    /// Do not append mapped variables to the search URL
    #[arg(long)]
    no_append_mappings: bool,

    /// Do not generate shell completions
    #[arg(long)]
    no_completions: bool,

    /// Tabs after the elvis name in `sr -elvi` output
    #[arg(long, value_name = "N", default_value_t = 1)]
    num_tabs: u32,

    /// URL parameter carrying the search terms
    #[arg(short = 'Q', long, value_name = "PARAM")]
    query_parameter: Option<String>,

    /// Description shown by `sr -elvi`
    #[arg(long)]
    description: Option<String>,

    /// Where to write the elvis ('-' for stdout) [default: the elvis name]
    #[arg(short, long, value_name = "FILE")]
    output: Option<String>,

    /// Log more (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Parse `args`, keeping the order in which variables were declared.
    fn try_parse_ordered<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Self::command().try_get_matches_from(args)?;
        let mut cli = Self::from_arg_matches(&matches)?;
        cli.options.record_order(&matches);
        Ok(cli)
    }

    /// Build the elvis configuration from a config file or the positionals.
    fn into_config(self) -> Result<Config> {
        let Some(path) = self.config else {
            let name = self.name.context("missing elvis name")?;
            let base_url = self.base_url.context("missing base URL")?;
            let search_url = self.search_url.context("missing search URL")?;
            let mut config = Config::new(&name, &base_url, &search_url);
            config.description = self.description;
            config.insecure = self.insecure;
            config.num_tabs = self.num_tabs;
            config.query_parameter = self.query_parameter;
            config.append_search_args = !self.no_append_args;
            config.append_mappings = !self.no_append_mappings;
            config.enable_completions = !self.no_completions;
            config.options = self.options;
            return Ok(config);
        };

        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        let mut config = Config::from_json(&json)
            .with_context(|| format!("failed to parse config file '{}'", path.display()))?;
        config.options.extend(self.options);
        Ok(config)
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::try_parse_ordered(std::env::args_os()).unwrap_or_else(|err| err.exit());
    init_logging(cli.verbose);

    let target = cli.output.clone();
    let config = cli.into_config()?;
    let elvis = Elvis::from_config(&config)
        .with_context(|| format!("failed to generate elvis '{}'", config.name))?;

    let target = target.unwrap_or_else(|| config.name.clone());
    output::emit(&elvis, &target).with_context(|| format!("failed to write elvis to '{target}'"))?;

    Ok(())
}
