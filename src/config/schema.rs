//! Settings file schema.
//!
//! Maps `.dsomm/config.yml`:
//!
//! ```yaml
//! workers: 8
//! timeout_secs: 30
//! show_unsupported: true
//! format: csv
//! output: reports/dsomm.csv
//! registry: levels/custom.yml
//! api_url: https://github.example.com/api/v3
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::render::OutputFormat;
use crate::runner::{RunOptions, DEFAULT_WORKERS};

/// Run settings after every layer has been applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Concurrent probe invocations.
    #[serde(skip_serializing_if = "is_default_workers")]
    pub workers: usize,

    /// Seconds before a single probe invocation is abandoned.
    #[serde(skip_serializing_if = "is_default_timeout")]
    pub timeout_secs: u64,

    /// List manual checks in the menu.
    #[serde(skip_serializing_if = "is_false")]
    pub show_unsupported: bool,

    /// Output format when none is given on the command line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,

    /// Output path when none is given on the command line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    /// Registry file replacing the built-in maturity model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry: Option<PathBuf>,

    /// GitHub REST API base URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            timeout_secs: default_timeout_secs(),
            show_unsupported: false,
            format: None,
            output: None,
            registry: None,
            api_url: None,
        }
    }
}

impl Settings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            workers: self.workers,
            timeout: self.timeout(),
        }
    }

    /// Apply command-line and environment values on top of these settings.
    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(workers) = overrides.workers {
            self.workers = workers;
        }
        if let Some(timeout) = overrides.timeout_secs {
            self.timeout_secs = timeout;
        }
        if overrides.show_unsupported {
            self.show_unsupported = true;
        }
        if let Some(format) = overrides.format {
            self.format = Some(format);
        }
        if let Some(output) = &overrides.output {
            self.output = Some(output.clone());
        }
        if let Some(registry) = &overrides.registry {
            self.registry = Some(registry.clone());
        }
        if let Some(api_url) = &overrides.api_url {
            self.api_url = Some(api_url.clone());
        }
    }
}

/// Values supplied on the command line or through the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub workers: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub show_unsupported: bool,
    pub format: Option<OutputFormat>,
    pub output: Option<PathBuf>,
    pub registry: Option<PathBuf>,
    pub api_url: Option<String>,
}

fn default_timeout_secs() -> u64 {
    60
}

fn is_default_workers(v: &usize) -> bool {
    *v == DEFAULT_WORKERS
}

fn is_default_timeout(v: &u64) -> bool {
    *v == default_timeout_secs()
}

fn is_false(v: &bool) -> bool {
    !v
}
