//! Check selection.
//!
//! A selection expression is a comma-separated list of tokens:
//!
//! - a level name (`LEVEL2`, case-insensitive) selects every check of that
//!   level, manual ones included
//! - a number selects the check with that stable number (see
//!   [`Registry::index_of`]); numbers outside the registry are ignored
//! - a check name selects that check
//!
//! The whole expression `ALL` (any case) selects every check.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::{DsommError, Result};
use crate::registry::Registry;

/// Keyword selecting every check.
pub const ALL: &str = "ALL";

/// Deduplicated check names in registry order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SelectionSet {
    names: Vec<String>,
}

impl SelectionSet {
    /// Build a set from names, dropping duplicates and names the registry
    /// does not know, and sorting into registry order.
    pub fn from_names<I, S>(registry: &Registry, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let wanted: HashSet<String> = names.into_iter().map(|n| n.as_ref().to_string()).collect();
        let names = registry
            .all_checks(true)
            .into_iter()
            .filter(|c| wanted.contains(&c.name))
            .map(|c| c.name.clone())
            .collect();
        Self { names }
    }

    /// Every check of the registry.
    pub fn all(registry: &Registry) -> Self {
        Self {
            names: registry
                .all_checks(true)
                .into_iter()
                .map(|c| c.name.clone())
                .collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, check_name: &str) -> bool {
        self.names.iter().any(|n| n == check_name)
    }
}

/// Resolve a selection expression against the registry.
///
/// # Errors
///
/// Returns [`DsommError::NoChecksSelected`] when no token selects anything.
pub fn select(expression: &str, registry: &Registry) -> Result<SelectionSet> {
    let trimmed = expression.trim();

    let selection = if trimmed.eq_ignore_ascii_case(ALL) {
        SelectionSet::all(registry)
    } else {
        let mut picked: Vec<&str> = Vec::new();

        for token in trimmed.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            if let Ok(number) = token.parse::<usize>() {
                match registry.by_number(number) {
                    Some(check) => picked.push(&check.name),
                    None => tracing::debug!(number, "Ignoring out-of-range check number"),
                }
            } else if let Some(level) = registry.level(token) {
                picked.extend(level.check_names());
            } else if let Some(check) = registry
                .all_checks(true)
                .into_iter()
                .find(|c| c.name.eq_ignore_ascii_case(token))
            {
                picked.push(&check.name);
            } else {
                tracing::warn!(token, "Ignoring unknown selection token");
            }
        }

        SelectionSet::from_names(registry, picked)
    };

    if selection.is_empty() {
        return Err(DsommError::NoChecksSelected {
            expression: expression.to_string(),
        });
    }

    tracing::debug!(count = selection.len(), %expression, "Selected checks");
    Ok(selection)
}
