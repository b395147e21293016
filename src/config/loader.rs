//! Settings file discovery and loading.

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;

use crate::config::merger::merge_layers;
use crate::config::schema::Settings;
use crate::error::{DsommError, Result};

/// Directory holding project settings.
pub const CONFIG_DIR: &str = ".dsomm";

/// Settings files of a project, in merge order.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// `.dsomm/config.yml`
    pub project: Option<PathBuf>,
    /// `.dsomm/config.local.yml`
    pub project_local: Option<PathBuf>,
}

impl ConfigPaths {
    pub fn discover(project_root: &Path) -> Self {
        let dir = project_root.join(CONFIG_DIR);
        Self {
            project: existing(dir.join("config.yml")),
            project_local: existing(dir.join("config.local.yml")),
        }
    }

    pub fn all_existing(&self) -> Vec<&PathBuf> {
        self.project.iter().chain(self.project_local.iter()).collect()
    }
}

fn existing(path: PathBuf) -> Option<PathBuf> {
    path.is_file().then_some(path)
}

/// Walk up from `start` looking for a `.dsomm` directory, then `.git`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        if current.join(CONFIG_DIR).is_dir() || current.join(".git").exists() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Read a settings file as a raw YAML value.
///
/// # Errors
///
/// `ConfigNotFound` when the file is missing, `ConfigParseError` when it is
/// not valid YAML.
pub fn load_settings_value(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DsommError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            DsommError::Io(e)
        }
    })?;

    serde_yaml::from_str(&content).map_err(|e| DsommError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load settings for a project.
///
/// With `config_override` only that file is read. Otherwise the project's
/// `config.yml` and `config.local.yml` are merged; a project without either
/// gets the defaults. A relative `registry` path is taken relative to the
/// directory the settings came from.
pub fn load_settings(project_root: &Path, config_override: Option<&Path>) -> Result<Settings> {
    let (layers, source, base_dir) = match config_override {
        Some(path) => {
            let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
            (vec![load_settings_value(path)?], path.to_path_buf(), base)
        }
        None => {
            let paths = ConfigPaths::discover(project_root);
            let mut layers = Vec::new();
            for path in paths.all_existing() {
                tracing::debug!(path = %path.display(), "Loading settings layer");
                layers.push(load_settings_value(path)?);
            }
            (
                layers,
                project_root.join(CONFIG_DIR).join("config.yml"),
                project_root.to_path_buf(),
            )
        }
    };

    let mut settings: Settings =
        serde_yaml::from_value(merge_layers(&layers)).map_err(|e| DsommError::ConfigParseError {
            path: source.clone(),
            message: e.to_string(),
        })?;

    if let Some(registry) = settings.registry.as_mut() {
        if registry.is_relative() {
            *registry = base_dir.join(&*registry);
        }
    }

    crate::config::validator::validate(&settings).map_err(|message| {
        DsommError::ConfigParseError {
            path: source,
            message,
        }
    })?;

    Ok(settings)
}
