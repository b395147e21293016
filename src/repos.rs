//! Where the repositories to evaluate come from.
//!
//! Repositories are opaque identifiers (`owner/name` for GitHub). They can be
//! listed on the command line, read from a file, enumerated from an
//! organisation, or any mix of the three; the combined list keeps the first
//! occurrence of each identifier.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::error::{DsommError, Result};
use crate::github::types::RepositorySummary;
use crate::github::GitHubClient;

/// Page size for organisation listings.
pub const ORG_PAGE_SIZE: usize = 100;

/// Repository inputs gathered from flags and prompts.
#[derive(Debug, Clone, Default)]
pub struct RepoSources {
    /// Identifiers given directly.
    pub repos: Vec<String>,
    /// File with one identifier per line.
    pub file: Option<PathBuf>,
    /// Organisation whose repositories are all evaluated.
    pub org: Option<String>,
}

impl RepoSources {
    /// Whether no source was given at all.
    pub fn is_empty(&self) -> bool {
        self.repos.is_empty() && self.file.is_none() && self.org.is_none()
    }

    /// Resolve every source into one deduplicated list.
    ///
    /// `client` is only used when an organisation was given.
    pub fn collect(&self, client: Option<&GitHubClient>) -> Result<Vec<String>> {
        let mut all: Vec<String> = self.repos.iter().flat_map(|r| split_repo_arg(r)).collect();

        if let Some(path) = &self.file {
            all.extend(read_repos_file(path)?);
        }

        if let Some(org) = &self.org {
            let client = client.ok_or_else(|| {
                DsommError::Other(anyhow::anyhow!(
                    "Listing organisation '{}' needs an API client",
                    org
                ))
            })?;
            all.extend(list_org_repos(client, org)?);
        }

        let repos = dedupe(all);
        tracing::debug!(count = repos.len(), "Collected repositories");
        Ok(repos)
    }
}

/// Split a comma-separated `--repos` value.
pub fn split_repo_arg(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Parse the contents of a repositories file.
///
/// One identifier per line; blank lines and lines starting with `#` are
/// ignored.
pub fn parse_repo_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

/// Read a repositories file.
pub fn read_repos_file(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DsommError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            DsommError::Io(e)
        }
    })?;
    Ok(parse_repo_list(&content))
}

/// Every repository of an organisation, following pagination until an
/// empty page.
pub fn list_org_repos(client: &GitHubClient, org: &str) -> Result<Vec<String>> {
    let mut repos = Vec::new();
    let mut page = 1;

    loop {
        let path = format!(
            "/orgs/{}/repos?per_page={}&page={}",
            org, ORG_PAGE_SIZE, page
        );
        let batch: Vec<RepositorySummary> = client
            .get_json(&path)
            .with_context(|| format!("Failed to list repositories of '{}'", org))?;

        if batch.is_empty() {
            break;
        }
        tracing::debug!(org, page, count = batch.len(), "Fetched repository page");
        repos.extend(batch.into_iter().map(|r| r.full_name));
        page += 1;
    }

    Ok(repos)
}

/// Remove duplicates, keeping the first occurrence.
pub fn dedupe(repos: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    repos
        .into_iter()
        .filter(|r| seen.insert(r.clone()))
        .collect()
}
