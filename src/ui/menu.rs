//! The numbered check menu.
//!
//! Numbers come from [`Registry::index_of`], so hiding manual checks leaves
//! gaps instead of renumbering.

use serde::Serialize;

use crate::registry::Registry;

use super::DsommTheme;

/// Suffix marking checks without an automated probe.
pub const MANUAL_MARKER: &str = "(manual)";

/// One menu line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuEntry {
    pub number: usize,
    pub level: String,
    pub name: String,
    pub supported: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Checks to list, in registry order.
pub fn menu_entries(registry: &Registry, show_unsupported: bool) -> Vec<MenuEntry> {
    let mut entries = Vec::new();
    for level in registry.levels() {
        for check in &level.checks {
            if !check.supported && !show_unsupported {
                continue;
            }
            let Some(number) = registry.index_of(&check.name) else {
                continue;
            };
            entries.push(MenuEntry {
                number,
                level: level.name.clone(),
                name: check.name.clone(),
                supported: check.supported,
                title: check.title.clone(),
            });
        }
    }
    entries
}

/// Menu text: a heading per level followed by its numbered checks.
pub fn menu_lines(registry: &Registry, show_unsupported: bool, theme: &DsommTheme) -> Vec<String> {
    let entries = menu_entries(registry, show_unsupported);
    let mut lines = vec!["Available checks:".to_string()];

    for level in registry.levels() {
        let mut level_entries = entries.iter().filter(|e| e.level == level.name).peekable();
        if level_entries.peek().is_none() {
            continue;
        }

        lines.push(String::new());
        lines.push(format!("{}:", theme.level.apply_to(&level.name)));
        for entry in level_entries {
            let mut line = format!(
                "  {} {}",
                theme.number.apply_to(format!("{}.", entry.number)),
                entry.name
            );
            if let Some(title) = &entry.title {
                line.push_str(&format!(" {}", theme.dim.apply_to(format!("- {}", title))));
            }
            if !entry.supported {
                line.push_str(&format!(" {}", theme.manual.apply_to(MANUAL_MARKER)));
            }
            lines.push(line);
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::parse_registry_str;

    fn registry() -> Registry {
        parse_registry_str(
            r#"
LEVEL1:
  - name: a
    probe: pa
    title: Automated PRs
  - name: b
    probe: pb
    supported: false
LEVEL2:
  - name: c
    probe: pc
"#,
        )
        .unwrap()
    }

    #[test]
    fn hidden_manual_checks_leave_gaps() {
        let numbers: Vec<_> = menu_entries(&registry(), false)
            .iter()
            .map(|e| (e.number, e.name.clone()))
            .collect();
        assert_eq!(numbers, [(1, "a".to_string()), (3, "c".to_string())]);
    }

    #[test]
    fn shown_manual_checks_are_marked() {
        let lines = menu_lines(&registry(), true, &DsommTheme::plain());
        assert_eq!(
            lines,
            [
                "Available checks:",
                "",
                "LEVEL1:",
                "  1. a - Automated PRs",
                "  2. b (manual)",
                "",
                "LEVEL2:",
                "  3. c",
            ]
        );
    }

    #[test]
    fn levels_with_only_hidden_checks_are_skipped() {
        let registry = parse_registry_str(
            "L1:\n  - name: m\n    probe: p\n    supported: false\nL2:\n  - name: n\n    probe: p\n",
        )
        .unwrap();
        let lines = menu_lines(&registry, false, &DsommTheme::plain());
        assert!(!lines.iter().any(|l| l == "L1:"));
        assert!(lines.iter().any(|l| l == "  2. n"));
    }
}
