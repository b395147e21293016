//! Registry data types.

use serde::Serialize;

/// A single check declared in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckDescriptor {
    /// Unique check identifier (e.g., "l1_1_automated_prs").
    pub name: String,
    /// Identifier of the probe that evaluates this check.
    pub probe_id: String,
    /// False for activities without an automated probe.
    pub supported: bool,
    /// Human-readable label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// A maturity level: an ordered group of checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Level {
    /// Level name as declared (e.g., "LEVEL1").
    pub name: String,
    /// Checks in declaration order.
    pub checks: Vec<CheckDescriptor>,
}

impl Level {
    /// Names of every check in this level, supported or not.
    pub fn check_names(&self) -> impl Iterator<Item = &str> {
        self.checks.iter().map(|c| c.name.as_str())
    }

    /// Number of checks marked as supported.
    pub fn supported_count(&self) -> usize {
        self.checks.iter().filter(|c| c.supported).count()
    }
}

/// The loaded maturity model.
///
/// Levels keep the order in which they were declared, and so does every
/// enumeration this type hands out. A `Registry` is built once per run and
/// shared by reference afterwards; nothing mutates it after [`Registry::from_levels`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registry {
    levels: Vec<Level>,
}

impl Registry {
    /// Build a registry from already-validated levels.
    ///
    /// Callers outside the loader should go through [`super::parse_registry`],
    /// which enforces name uniqueness.
    pub(crate) fn from_levels(levels: Vec<Level>) -> Self {
        Self { levels }
    }

    /// All levels in declaration order.
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Look up a level by name, ignoring ASCII case.
    pub fn level(&self, name: &str) -> Option<&Level> {
        self.levels
            .iter()
            .find(|l| l.name.eq_ignore_ascii_case(name))
    }

    /// Every check in registry order, optionally hiding unsupported ones.
    pub fn all_checks(&self, include_unsupported: bool) -> Vec<&CheckDescriptor> {
        self.levels
            .iter()
            .flat_map(|l| l.checks.iter())
            .filter(|c| include_unsupported || c.supported)
            .collect()
    }

    /// Total number of declared checks.
    pub fn check_count(&self) -> usize {
        self.levels.iter().map(|l| l.checks.len()).sum()
    }

    /// Find a check by exact name.
    pub fn check(&self, name: &str) -> Option<&CheckDescriptor> {
        self.levels
            .iter()
            .flat_map(|l| l.checks.iter())
            .find(|c| c.name == name)
    }

    /// Name of the level that declares `check_name`.
    pub fn level_of(&self, check_name: &str) -> Option<&str> {
        self.levels
            .iter()
            .find(|l| l.checks.iter().any(|c| c.name == check_name))
            .map(|l| l.name.as_str())
    }

    /// Stable 1-based number of a check.
    ///
    /// Numbers come from the full enumeration, so hiding unsupported checks
    /// in a menu never renumbers the rest.
    pub fn index_of(&self, check_name: &str) -> Option<usize> {
        self.all_checks(true)
            .iter()
            .position(|c| c.name == check_name)
            .map(|i| i + 1)
    }

    /// Check carrying the given stable number.
    pub fn by_number(&self, number: usize) -> Option<&CheckDescriptor> {
        if number == 0 {
            return None;
        }
        self.all_checks(true).get(number - 1).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(name: &str, supported: bool) -> CheckDescriptor {
        CheckDescriptor {
            name: name.to_string(),
            probe_id: format!("probe_{}", name),
            supported,
            title: None,
        }
    }

    fn sample() -> Registry {
        Registry::from_levels(vec![
            Level {
                name: "LEVEL1".to_string(),
                checks: vec![check("a", true), check("b", false)],
            },
            Level {
                name: "LEVEL2".to_string(),
                checks: vec![check("c", true)],
            },
        ])
    }

    #[test]
    fn all_checks_keeps_declaration_order() {
        let registry = sample();
        let names: Vec<_> = registry.all_checks(true).iter().map(|c| &c.name).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn all_checks_can_hide_unsupported() {
        let registry = sample();
        let names: Vec<_> = registry
            .all_checks(false)
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, ["a", "c"]);
    }

    #[test]
    fn level_of_finds_owner() {
        let registry = sample();
        assert_eq!(registry.level_of("c"), Some("LEVEL2"));
        assert_eq!(registry.level_of("missing"), None);
    }

    #[test]
    fn level_lookup_ignores_case() {
        let registry = sample();
        assert!(registry.level("level1").is_some());
        assert!(registry.level("LEVEL3").is_none());
    }

    #[test]
    fn numbers_ignore_visibility() {
        let registry = sample();
        assert_eq!(registry.index_of("c"), Some(3));
        assert_eq!(registry.by_number(3).map(|c| c.name.as_str()), Some("c"));
        assert!(registry.by_number(0).is_none());
        assert!(registry.by_number(4).is_none());
    }

    #[test]
    fn supported_count_per_level() {
        let registry = sample();
        assert_eq!(registry.levels()[0].supported_count(), 1);
        assert_eq!(registry.check_count(), 3);
    }
}
