//! CLI argument definitions.
//!
//! The main entry point is the [`Cli`] struct.

use clap::{Args, FromArgMatches, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::config::Overrides;
use crate::render::OutputFormat;

/// dsomm - Score repositories against the DevSecOps Maturity Model.
#[derive(Debug, Parser)]
#[command(name = "dsomm")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to settings file (overrides .dsomm/config.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Registry file replacing the built-in maturity model
    #[arg(long, global = true, env = "DSOMM_REGISTRY")]
    pub registry: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Evaluate repositories (default if no command specified)
    Run(RunArgs),

    /// List the numbered checks of the maturity model
    List(ListArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RunArgs {
    /// Checks to run: level names, check numbers or names (comma-separated), or ALL
    #[arg(short, long, value_name = "EXPR")]
    pub select: Option<String>,

    /// Repositories to evaluate (owner/name, comma-separated)
    #[arg(short, long, value_delimiter = ',', value_name = "REPO")]
    pub repos: Vec<String>,

    /// File listing one repository per line
    #[arg(long, value_name = "PATH")]
    pub repos_file: Option<PathBuf>,

    /// Evaluate every repository of an organisation
    #[arg(long)]
    pub org: Option<String>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Output file (CSV defaults to dsomm.csv)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// List manual checks in the menu
    #[arg(long)]
    pub show_unsupported: bool,

    /// Concurrent probe invocations
    #[arg(long, env = "DSOMM_WORKERS")]
    pub workers: Option<usize>,

    /// Seconds before a probe is abandoned
    #[arg(long, env = "DSOMM_TIMEOUT", value_name = "SECS")]
    pub timeout: Option<u64>,

    /// GitHub token (falls back to GH_TOKEN)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// GitHub REST API base URL
    #[arg(long, env = "GITHUB_API_URL")]
    pub api_url: Option<String>,

    /// Use defaults, no prompts
    #[arg(long)]
    pub non_interactive: bool,
}

impl RunArgs {
    /// Settings supplied by these flags and their environment variables.
    pub fn overrides(&self, registry: Option<PathBuf>) -> Overrides {
        Overrides {
            workers: self.workers,
            timeout_secs: self.timeout,
            show_unsupported: self.show_unsupported,
            format: self.format,
            output: self.output.clone(),
            registry,
            api_url: self.api_url.clone(),
        }
    }

    /// Run arguments for a bare `dsomm`: no flags, but the environment
    /// variables behind them still apply.
    pub fn from_env() -> Self {
        let cmd = Self::augment_args(clap::Command::new("run").no_binary_name(true));
        cmd.try_get_matches_from(std::iter::empty::<String>())
            .ok()
            .and_then(|matches| Self::from_arg_matches(&matches).ok())
            .unwrap_or_default()
    }

    /// The API token from `--token`/`GITHUB_TOKEN`, else `GH_TOKEN`.
    pub fn resolved_token(&self) -> Option<String> {
        self.token
            .clone()
            .or_else(|| std::env::var("GH_TOKEN").ok())
            .filter(|t| !t.trim().is_empty())
    }
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ListArgs {
    /// Include manual checks
    #[arg(long)]
    pub show_unsupported: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_flags_parse() {
        let cli = Cli::try_parse_from([
            "dsomm",
            "run",
            "--select",
            "LEVEL1,7",
            "--repos",
            "acme/api,acme/web",
            "--format",
            "csv",
            "--workers",
            "2",
        ])
        .unwrap();

        let Some(Commands::Run(args)) = cli.command else {
            panic!("Expected run command");
        };
        assert_eq!(args.select.as_deref(), Some("LEVEL1,7"));
        assert_eq!(args.repos, ["acme/api", "acme/web"]);
        assert_eq!(args.format, Some(OutputFormat::Csv));
        assert_eq!(args.overrides(None).workers, Some(2));
    }

    #[test]
    fn padded_repos_collect_cleanly() {
        let cli = Cli::try_parse_from(["dsomm", "run", "--repos", "acme/api, acme/web,"]).unwrap();
        let Some(Commands::Run(args)) = cli.command else {
            panic!("Expected run command");
        };
        let sources = crate::repos::RepoSources {
            repos: args.repos,
            ..Default::default()
        };
        assert_eq!(sources.collect(None).unwrap(), ["acme/api", "acme/web"]);
    }

    #[test]
    fn tabular_is_accepted_for_table() {
        let cli = Cli::try_parse_from(["dsomm", "run", "-f", "tabular"]).unwrap();
        let Some(Commands::Run(args)) = cli.command else {
            panic!("Expected run command");
        };
        assert_eq!(args.format, Some(OutputFormat::Table));
    }

    #[test]
    fn no_subcommand_is_allowed() {
        let cli = Cli::try_parse_from(["dsomm", "--quiet"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.quiet);
    }

    #[test]
    fn bare_invocation_has_no_selection() {
        let args = RunArgs::from_env();
        assert!(args.select.is_none());
        assert!(args.repos.is_empty());
    }

    #[test]
    fn global_registry_flag() {
        let cli = Cli::try_parse_from(["dsomm", "list", "--registry", "custom.yml"]).unwrap();
        assert_eq!(cli.registry, Some(PathBuf::from("custom.yml")));
    }
}
