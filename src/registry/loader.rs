//! Registry document parsing.
//!
//! The document is YAML with one top-level key per level. Each level holds
//! a list of check records:
//!
//! ```yaml
//! LEVEL1:
//!   - name: l1_1_automated_prs
//!     probe: automated_prs
//!   - name: l1_4_manual_review
//!     probe: manual_review
//!     supported: false
//! ```
//!
//! `module` is accepted as an alias of `probe`. `supported` defaults to true.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_yaml::Value;

use crate::error::{DsommError, Result};

use super::model::{CheckDescriptor, Level, Registry};

#[derive(Debug, Deserialize)]
struct CheckRecord {
    name: Option<String>,
    #[serde(alias = "module")]
    probe: Option<String>,
    #[serde(default = "default_supported")]
    supported: bool,
    title: Option<String>,
}

fn default_supported() -> bool {
    true
}

/// Load a registry from a YAML file.
pub fn load_registry_file(path: &Path) -> Result<Registry> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DsommError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            DsommError::Io(e)
        }
    })?;

    let value: Value = serde_yaml::from_str(&content).map_err(|e| DsommError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    parse_registry(&value)
}

/// Parse registry YAML text.
pub fn parse_registry_str(content: &str) -> Result<Registry> {
    let value: Value = serde_yaml::from_str(content).map_err(|e| DsommError::RegistryLoadError {
        message: e.to_string(),
    })?;
    parse_registry(&value)
}

/// Build a registry from a parsed YAML document.
///
/// # Errors
///
/// Returns `RegistryLoadError` when the document is not a mapping of level
/// names to check lists or a record lacks `name`/`probe`, and
/// `DuplicateCheck` when a check name appears twice anywhere.
pub fn parse_registry(value: &Value) -> Result<Registry> {
    let mapping = value
        .as_mapping()
        .ok_or_else(|| invalid("expected a mapping of level names to check lists"))?;

    if mapping.is_empty() {
        return Err(invalid("no levels defined"));
    }

    let mut levels = Vec::with_capacity(mapping.len());
    let mut seen: HashMap<String, String> = HashMap::new();

    for (key, entries) in mapping {
        let level_name = key
            .as_str()
            .ok_or_else(|| invalid("level names must be strings"))?
            .to_string();

        if levels
            .iter()
            .any(|l: &Level| l.name.eq_ignore_ascii_case(&level_name))
        {
            return Err(invalid(format!(
                "level {} is declared twice (level names are case-insensitive)",
                level_name
            )));
        }

        let records: &[Value] = match entries {
            Value::Sequence(items) => items.as_slice(),
            Value::Null => &[],
            _ => {
                return Err(invalid(format!(
                    "level {} must hold a list of checks",
                    level_name
                )))
            }
        };

        let mut checks = Vec::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            let check = parse_check(&level_name, position, record)?;

            if let Some(first_level) = seen.get(&check.name) {
                return Err(DsommError::DuplicateCheck {
                    check: check.name,
                    level: level_name,
                    first_level: first_level.clone(),
                });
            }
            seen.insert(check.name.clone(), level_name.clone());
            checks.push(check);
        }

        tracing::debug!(level = %level_name, checks = checks.len(), "Loaded level");
        levels.push(Level {
            name: level_name,
            checks,
        });
    }

    Ok(Registry::from_levels(levels))
}

fn parse_check(level: &str, position: usize, record: &Value) -> Result<CheckDescriptor> {
    let parsed: CheckRecord = serde_yaml::from_value(record.clone()).map_err(|e| {
        invalid(format!(
            "level {}, check #{}: {}",
            level,
            position + 1,
            e
        ))
    })?;

    let name = match parsed.name.map(|n| n.trim().to_string()) {
        Some(n) if !n.is_empty() => n,
        _ => {
            return Err(invalid(format!(
                "level {}, check #{}: missing required field 'name'",
                level,
                position + 1
            )))
        }
    };

    let probe_id = match parsed.probe.map(|p| p.trim().to_string()) {
        Some(p) if !p.is_empty() => p,
        _ => {
            return Err(invalid(format!(
                "level {}, check {}: missing required field 'probe'",
                level, name
            )))
        }
    };

    Ok(CheckDescriptor {
        name,
        probe_id,
        supported: parsed.supported,
        title: parsed.title,
    })
}

fn invalid(message: impl Into<String>) -> DsommError {
    DsommError::RegistryLoadError {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn parses_levels_in_declaration_order() {
        let registry = parse_registry_str(
            r#"
LEVEL2:
  - name: b
    probe: probb
LEVEL1:
  - name: a
    probe: proba
"#,
        )
        .unwrap();

        let names: Vec<_> = registry.levels().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["LEVEL2", "LEVEL1"]);
    }

    #[test]
    fn supported_defaults_to_true() {
        let registry = parse_registry_str("L1:\n  - name: a\n    probe: proba\n").unwrap();
        assert!(registry.check("a").unwrap().supported);
    }

    #[test]
    fn accepts_module_alias() {
        let registry =
            parse_registry_str("L1:\n  - name: a\n    module: proba\n    supported: false\n")
                .unwrap();
        let check = registry.check("a").unwrap();
        assert_eq!(check.probe_id, "proba");
        assert!(!check.supported);
    }

    #[test]
    fn rejects_duplicate_names_across_levels() {
        let result = parse_registry_str(
            r#"
L1:
  - name: a
    probe: proba
L2:
  - name: a
    probe: other
"#,
        );

        match result {
            Err(DsommError::DuplicateCheck {
                check,
                level,
                first_level,
            }) => {
                assert_eq!(check, "a");
                assert_eq!(level, "L2");
                assert_eq!(first_level, "L1");
            }
            other => panic!("expected DuplicateCheck, got {:?}", other),
        }
    }

    #[test]
    fn rejects_duplicate_names_within_level() {
        let result = parse_registry_str(
            "L1:\n  - name: a\n    probe: p\n  - name: a\n    probe: q\n",
        );
        assert!(matches!(result, Err(DsommError::DuplicateCheck { .. })));
    }

    #[test]
    fn missing_probe_names_level_and_check() {
        let err = parse_registry_str("LEVEL3:\n  - name: orphan\n").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("LEVEL3"), "{}", msg);
        assert!(msg.contains("orphan"), "{}", msg);
        assert!(msg.contains("probe"), "{}", msg);
    }

    #[test]
    fn missing_name_names_level_and_position() {
        let err = parse_registry_str("LEVEL1:\n  - name: a\n    probe: p\n  - probe: q\n")
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("LEVEL1"), "{}", msg);
        assert!(msg.contains("#2"), "{}", msg);
        assert!(msg.contains("name"), "{}", msg);
    }

    #[test]
    fn rejects_non_mapping_document() {
        assert!(matches!(
            parse_registry_str("- a\n- b\n"),
            Err(DsommError::RegistryLoadError { .. })
        ));
    }

    #[test]
    fn rejects_empty_document() {
        assert!(parse_registry_str("{}").is_err());
    }

    #[test]
    fn rejects_level_that_is_not_a_list() {
        let err = parse_registry_str("L1: nope\n").unwrap_err();
        assert!(err.to_string().contains("L1"));
    }

    #[test]
    fn empty_level_is_allowed() {
        let registry = parse_registry_str("L1:\nL2:\n  - name: a\n    probe: p\n").unwrap();
        assert_eq!(registry.levels()[0].checks.len(), 0);
    }

    #[test]
    fn rejects_levels_differing_only_in_case() {
        let result = parse_registry_str(
            "level1:\n  - name: a\n    probe: p\nLEVEL1:\n  - name: b\n    probe: q\n",
        );
        assert!(result.is_err());
    }

    #[test]
    fn load_file_reports_missing_file() {
        let temp = TempDir::new().unwrap();
        let result = load_registry_file(&temp.path().join("nope.yml"));
        assert!(matches!(result, Err(DsommError::ConfigNotFound { .. })));
    }

    #[test]
    fn load_file_reports_parse_errors_with_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("levels.yml");
        fs::write(&path, "L1: [unclosed").unwrap();

        let err = load_registry_file(&path).unwrap_err();
        assert!(matches!(err, DsommError::ConfigParseError { .. }));
        assert!(err.to_string().contains("levels.yml"));
    }
}
