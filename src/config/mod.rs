//! Layered run settings.
//!
//! Settings are resolved in this order, later layers winning:
//! 1. Built-in defaults
//! 2. Project settings (`.dsomm/config.yml`, then `.dsomm/config.local.yml`),
//!    or the single file given with `--config`
//! 3. Environment variables (`DSOMM_WORKERS`, `DSOMM_TIMEOUT`, ...)
//! 4. Command-line flags
//!
//! Layers 3 and 4 arrive together as [`Overrides`].
//!
//! # Example
//!
//! ```
//! use dsomm::config::load_settings;
//! use std::fs;
//! use tempfile::TempDir;
//!
//! let temp = TempDir::new().unwrap();
//! fs::create_dir_all(temp.path().join(".dsomm")).unwrap();
//! fs::write(temp.path().join(".dsomm/config.yml"), "workers: 8").unwrap();
//!
//! let settings = load_settings(temp.path(), None).unwrap();
//! assert_eq!(settings.workers, 8);
//! assert_eq!(settings.timeout_secs, 60);
//! ```

pub mod loader;
pub mod merger;
pub mod schema;
pub mod validator;

pub use loader::{find_project_root, load_settings, load_settings_value, ConfigPaths, CONFIG_DIR};
pub use merger::{deep_merge, merge_layers};
pub use schema::{Overrides, Settings};
pub use validator::{validate, validate_settings, ValidationError};
