//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands, RunArgs};
use crate::error::Result;
use crate::runner::CancellationToken;
use crate::ui::UserInterface;

use super::completions::CompletionsCommand;
use super::list::ListCommand;
use super::run::RunCommand;

/// Trait for command implementations.
pub trait Command {
    /// Execute the command.
    ///
    /// Setup problems are returned as errors; the caller maps them to an
    /// exit code with [`DsommError::exit_code`](crate::DsommError::exit_code).
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    pub success: bool,
    pub exit_code: i32,
}

impl CommandResult {
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    project_root: PathBuf,
    cancel: CancellationToken,
}

impl CommandDispatcher {
    pub fn new(project_root: PathBuf, cancel: CancellationToken) -> Self {
        Self {
            project_root,
            cancel,
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Route the subcommand to its implementation; no subcommand means `run`.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &cli.command {
            Some(Commands::Run(args)) => self.run_command(cli, args.clone()).execute(ui),
            Some(Commands::List(args)) => ListCommand::new(&self.project_root, args.clone())
                .with_config(cli.config.clone())
                .with_registry(cli.registry.clone())
                .execute(ui),
            Some(Commands::Completions(args)) => CompletionsCommand::new(args.clone()).execute(ui),
            None => self.run_command(cli, RunArgs::from_env()).execute(ui),
        }
    }

    fn run_command(&self, cli: &Cli, args: RunArgs) -> RunCommand {
        RunCommand::new(&self.project_root, args)
            .with_config(cli.config.clone())
            .with_registry(cli.registry.clone())
            .with_cancel(self.cancel.clone())
    }
}
