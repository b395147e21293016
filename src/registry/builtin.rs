//! Built-in maturity model embedded at compile time.

use crate::error::{DsommError, Result};
use include_dir::{include_dir, Dir};

use super::loader::parse_registry_str;
use super::model::Registry;

/// Embedded levels directory.
static LEVELS_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/levels");

/// File name of the default model inside the embedded directory.
const DEFAULT_MODEL: &str = "dsomm.yml";

/// Raw YAML of the built-in model.
pub fn builtin_source() -> Result<&'static str> {
    let file = LEVELS_DIR
        .get_file(DEFAULT_MODEL)
        .ok_or_else(|| DsommError::ConfigNotFound {
            path: format!("levels/{}", DEFAULT_MODEL).into(),
        })?;

    file.contents_utf8()
        .ok_or_else(|| DsommError::ConfigParseError {
            path: format!("levels/{}", DEFAULT_MODEL).into(),
            message: "Invalid UTF-8".to_string(),
        })
}

/// Load the built-in DSOMM registry.
pub fn load_builtin() -> Result<Registry> {
    parse_registry_str(builtin_source()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_loads() {
        let registry = load_builtin().unwrap();
        let levels: Vec<_> = registry.levels().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(levels, ["LEVEL1", "LEVEL2", "LEVEL3", "LEVEL4", "LEVEL5"]);
    }

    #[test]
    fn builtin_registry_has_one_manual_check() {
        let registry = load_builtin().unwrap();
        let manual: Vec<_> = registry
            .all_checks(true)
            .into_iter()
            .filter(|c| !c.supported)
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(manual, ["l3_7_vulnerability_management"]);
    }

    #[test]
    fn builtin_numbering_starts_at_level_one() {
        let registry = load_builtin().unwrap();
        assert_eq!(
            registry.by_number(1).map(|c| c.name.as_str()),
            Some("l1_1_automated_prs")
        );
        assert_eq!(registry.check_count(), 30);
    }
}
