//! Maturity model registry.
//!
//! The registry declares levels and the checks inside them. It is loaded
//! once per run, either from the embedded model or from a user-supplied
//! YAML file, and is read-only afterwards.
//!
//! # Example
//!
//! ```
//! use dsomm::registry::parse_registry_str;
//!
//! let registry = parse_registry_str(
//!     "LEVEL1:\n  - name: a\n    probe: proba\n  - name: b\n    probe: probb\n    supported: false\n",
//! )
//! .unwrap();
//!
//! assert_eq!(registry.level_of("b"), Some("LEVEL1"));
//! assert_eq!(registry.all_checks(false).len(), 1);
//! ```

pub mod builtin;
pub mod loader;
pub mod model;

pub use builtin::load_builtin;
pub use loader::{load_registry_file, parse_registry, parse_registry_str};
pub use model::{CheckDescriptor, Level, Registry};

use std::path::Path;

use crate::error::Result;

/// Load the registry from `path`, or the built-in model when no path is given.
pub fn load(path: Option<&Path>) -> Result<Registry> {
    match path {
        Some(p) => {
            tracing::debug!(path = %p.display(), "Loading registry file");
            load_registry_file(p)
        }
        None => load_builtin(),
    }
}
