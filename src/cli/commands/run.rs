//! Run command implementation.
//!
//! The `dsomm run` command evaluates repositories against the selected
//! checks and reports the scores.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::ValueEnum;

use crate::cli::args::RunArgs;
use crate::config::{load_settings, validate, Settings};
use crate::error::{DsommError, Result};
use crate::github::{GitHubClient, DEFAULT_API_URL};
use crate::probes::{builtin_table, capabilities, Capability, ProbeTable, Resolver};
use crate::registry::{self, Registry};
use crate::render::{emit, OutputFormat, DEFAULT_CSV_PATH};
use crate::repos::{dedupe, split_repo_arg, RepoSources};
use crate::runner::{CancellationToken, Engine, RunProgress};
use crate::score::aggregate;
use crate::selector::{select, SelectionSet, ALL};
use crate::ui::{
    format_duration, menu_lines, should_use_colors, DsommTheme, Prompt, PromptOption,
    UserInterface,
};

use super::dispatcher::{Command, CommandResult};

/// The run command implementation.
pub struct RunCommand {
    project_root: PathBuf,
    args: RunArgs,
    config: Option<PathBuf>,
    registry: Option<PathBuf>,
    cancel: CancellationToken,
    probes: Option<(ProbeTable, Vec<Capability>)>,
}

impl RunCommand {
    pub fn new(project_root: &Path, args: RunArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            args,
            config: None,
            registry: None,
            cancel: CancellationToken::new(),
            probes: None,
        }
    }

    /// Use this settings file instead of the project's.
    pub fn with_config(mut self, config: Option<PathBuf>) -> Self {
        self.config = config;
        self
    }

    /// Use this registry file instead of the configured one.
    pub fn with_registry(mut self, registry: Option<PathBuf>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run against this probe table instead of the built-in GitHub probes.
    pub fn with_probes(mut self, table: ProbeTable, capabilities: Vec<Capability>) -> Self {
        self.probes = Some((table, capabilities));
        self
    }

    fn settings(&self) -> Result<Settings> {
        let mut settings = load_settings(&self.project_root, self.config.as_deref())?;
        settings.apply(&self.args.overrides(self.registry.clone()));
        validate(&settings).map_err(|message| {
            DsommError::Other(anyhow::anyhow!("Invalid settings: {}", message))
        })?;
        Ok(settings)
    }

    fn theme() -> DsommTheme {
        if should_use_colors() {
            DsommTheme::new()
        } else {
            DsommTheme::plain()
        }
    }

    fn selection(
        &self,
        registry: &Registry,
        settings: &Settings,
        ui: &mut dyn UserInterface,
    ) -> Result<SelectionSet> {
        let expression = match &self.args.select {
            Some(expression) => expression.clone(),
            None => {
                if ui.is_interactive() {
                    for line in menu_lines(registry, settings.show_unsupported, &Self::theme()) {
                        ui.message(&line);
                    }
                    ui.message("");
                }
                let prompt = Prompt::input(
                    "select",
                    &format!(
                        "Checks to run (level names, numbers or names, comma-separated; {} for every check)",
                        ALL
                    ),
                );
                ui.prompt(&prompt)?.as_string()
            }
        };

        let selection = select(&expression, registry)?;
        tracing::debug!(expression = %expression, count = selection.len(), "Selected checks");
        Ok(selection)
    }

    fn repositories(&self, client: &GitHubClient, ui: &mut dyn UserInterface) -> Result<Vec<String>> {
        let sources = RepoSources {
            repos: self.args.repos.clone(),
            file: self.args.repos_file.clone(),
            org: self.args.org.clone(),
        };

        let repos = if sources.is_empty() {
            let prompt = Prompt::input(
                "repos",
                "Repositories to evaluate (owner/name, comma-separated)",
            );
            dedupe(split_repo_arg(&ui.prompt(&prompt)?.as_string()))
        } else {
            sources.collect(Some(client))?
        };

        if repos.is_empty() {
            return Err(DsommError::NoRepositories);
        }
        Ok(repos)
    }

    fn format(&self, settings: &Settings, ui: &mut dyn UserInterface) -> Result<OutputFormat> {
        if let Some(format) = settings.format {
            return Ok(format);
        }

        let prompt = Prompt::select(
            "format",
            "Output format",
            vec![
                PromptOption::new("Table", "table"),
                PromptOption::new("CSV", "csv"),
                PromptOption::new("JSON", "json"),
            ],
        )
        .with_default(OutputFormat::Table.to_string());

        let answer = ui.prompt(&prompt)?.as_string();
        OutputFormat::from_str(answer.trim(), true).map_err(|_| {
            DsommError::Other(anyhow::anyhow!("Unknown output format '{}'", answer.trim()))
        })
    }

    fn output_path(
        &self,
        settings: &Settings,
        format: OutputFormat,
        ui: &mut dyn UserInterface,
    ) -> Result<Option<PathBuf>> {
        if let Some(output) = &settings.output {
            return Ok(Some(output.clone()));
        }
        if format == OutputFormat::Csv && ui.is_interactive() {
            let prompt =
                Prompt::input("output", "Output file").with_default(DEFAULT_CSV_PATH);
            let answer = ui.prompt(&prompt)?.as_string();
            let answer = answer.trim();
            let path = if answer.is_empty() { DEFAULT_CSV_PATH } else { answer };
            return Ok(Some(PathBuf::from(path)));
        }
        Ok(format.default_path())
    }
}

impl Command for RunCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let settings = self.settings()?;
        let registry = registry::load(settings.registry.as_deref())?;

        if ui.is_interactive() {
            ui.show_header("DevSecOps Maturity Model");
        }

        let selection = self.selection(&registry, &settings, ui)?;

        let api_url = settings.api_url.as_deref().unwrap_or(DEFAULT_API_URL);
        let client = Arc::new(GitHubClient::new(
            api_url,
            self.args.resolved_token(),
            settings.timeout(),
        )?);
        if self.probes.is_none() && !client.is_authenticated() {
            ui.warning("No GitHub token found; checks that need one will report errors");
        }

        let repos = self.repositories(&client, ui)?;
        let format = self.format(&settings, ui)?;
        let output = self.output_path(&settings, format, ui)?;

        let builtin;
        let (table, caps) = match &self.probes {
            Some((table, caps)) => (table, caps.clone()),
            None => {
                builtin = builtin_table(Arc::clone(&client));
                (&builtin, capabilities(&client))
            }
        };
        let resolver = Resolver::new(&registry, table, caps);

        let started = std::time::Instant::now();
        let show_each = ui.output_mode().shows_each_result();
        let mut progress = ui.start_progress(repos.len() * selection.len());

        let engine = Engine::new(&resolver, settings.run_options(), self.cancel.clone());
        let results = engine.run_with_progress(&repos, &selection, |event| {
            if let RunProgress::PairFinished {
                repo,
                check,
                report,
                ..
            } = event
            {
                if show_each {
                    progress.println(&format!("{} / {}: {}", repo, check, report.detail));
                }
                progress.advance(&format!("{} / {}", repo, check));
            }
        });
        let results = match results {
            Ok(results) => results,
            Err(err) => {
                progress.finish("Interrupted");
                return Err(err);
            }
        };
        progress.finish(&format!("Done in {}", format_duration(started.elapsed())));

        let board = aggregate(&results, &registry, &selection);
        emit(&board, format, output.as_deref(), &mut std::io::stdout().lock())?;

        if let Some(path) = &output {
            ui.success(&format!("Results have been saved to {}", path.display()));
        }

        // Keep JSON on stdout parseable.
        if format == OutputFormat::Json && output.is_none() {
            return Ok(CommandResult::success());
        }

        ui.message("");
        ui.message("Score for the checks in selected Level(s):");
        for line in board.summary_lines() {
            ui.message(&line);
        }

        Ok(CommandResult::success())
    }
}
