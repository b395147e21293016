//! List command implementation.
//!
//! The `dsomm list` command prints the numbered check menu.

use std::path::{Path, PathBuf};

use crate::cli::args::ListArgs;
use crate::config::{load_settings, Overrides};
use crate::error::Result;
use crate::registry;
use crate::ui::{menu_entries, menu_lines, should_use_colors, DsommTheme, UserInterface};

use super::dispatcher::{Command, CommandResult};

pub struct ListCommand {
    project_root: PathBuf,
    args: ListArgs,
    config: Option<PathBuf>,
    registry: Option<PathBuf>,
}

impl ListCommand {
    pub fn new(project_root: &Path, args: ListArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            args,
            config: None,
            registry: None,
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
}

impl Command for ListCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut settings = load_settings(&self.project_root, self.config.as_deref())?;
        settings.apply(&Overrides {
            show_unsupported: self.args.show_unsupported,
            registry: self.registry.clone(),
            ..Default::default()
        });

        let registry = registry::load(settings.registry.as_deref())?;

        if self.args.json {
            let entries = menu_entries(&registry, settings.show_unsupported);
            let json = serde_json::to_string_pretty(&entries).map_err(anyhow::Error::from)?;
            println!("{}", json);
            return Ok(CommandResult::success());
        }

        let theme = if should_use_colors() {
            DsommTheme::new()
        } else {
            DsommTheme::plain()
        };
        for line in menu_lines(&registry, settings.show_unsupported, &theme) {
            ui.message(&line);
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    fn project_with_registry() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("levels.yml"),
            "LEVEL1:\n  - name: a\n    probe: pa\n  - name: m\n    probe: pm\n    supported: false\n",
        )
        .unwrap();
        temp
    }

    #[test]
    fn lists_builtin_registry() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();

        let result = ListCommand::new(temp.path(), ListArgs::default())
            .execute(&mut ui)
            .unwrap();

        assert!(result.success);
        assert_eq!(ui.messages()[0], "Available checks:");
        assert!(ui.has_message("LEVEL1:"));
    }

    #[test]
    fn manual_checks_hidden_by_default() {
        let temp = project_with_registry();
        let mut ui = MockUI::new();

        ListCommand::new(temp.path(), ListArgs::default())
            .with_registry(Some(temp.path().join("levels.yml")))
            .execute(&mut ui)
            .unwrap();

        assert!(ui.has_message("1. a"));
        assert!(!ui.has_message("(manual)"));
    }

    #[test]
    fn show_unsupported_marks_manual_checks() {
        let temp = project_with_registry();
        let mut ui = MockUI::new();
        let args = ListArgs {
            show_unsupported: true,
            json: false,
        };

        ListCommand::new(temp.path(), args)
            .with_registry(Some(temp.path().join("levels.yml")))
            .execute(&mut ui)
            .unwrap();

        assert!(ui.has_message("2. m (manual)"));
    }

    #[test]
    fn missing_registry_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();

        let result = ListCommand::new(temp.path(), ListArgs::default())
            .with_registry(Some(temp.path().join("missing.yml")))
            .execute(&mut ui);

        assert!(result.is_err());
    }
}
