//! Probes that read repository settings, metadata and single files.

use anyhow::Result;

use crate::github::types::{
    ArtifactList, Commit, DependencyGraph, Release, Repository, Sbom, Tag, User,
};
use crate::github::GitHubClient;

use super::report::ProbeReport;

/// Files whose presence implies the project is versioned.
pub const VERSION_FILES: &[&str] = &[
    "VERSION",
    "version.txt",
    "package.json",
    "setup.py",
    "pom.xml",
];

fn repository(client: &GitHubClient, repo: &str) -> Result<Repository> {
    client.get_json(&format!("/repos/{}", repo))
}

/// Version file, tag or release.
pub fn versioning(client: &GitHubClient, repo: &str) -> Result<ProbeReport> {
    for file in VERSION_FILES {
        if client.file_exists(repo, file)? {
            return Ok(ProbeReport::success(format!("Detected (file: {})", file)));
        }
    }

    let tags: Vec<Tag> = client
        .get_json_optional(&format!("/repos/{}/tags?per_page=1", repo))?
        .unwrap_or_default();
    if let Some(tag) = tags.first() {
        return Ok(ProbeReport::success(format!(
            "Detected (latest tag: {})",
            tag.name
        )));
    }

    let releases: Vec<Release> = client
        .get_json_optional(&format!("/repos/{}/releases?per_page=1", repo))?
        .unwrap_or_default();
    if let Some(release) = releases.first() {
        return Ok(ProbeReport::success(format!(
            "Detected (latest release: {})",
            release.tag_name
        )));
    }

    Ok(ProbeReport::not_detected())
}

/// Secret scanning is enabled.
pub fn stored_secrets(client: &GitHubClient, repo: &str) -> Result<ProbeReport> {
    let alerts = client.exists(&format!("/repos/{}/secret-scanning/alerts?per_page=1", repo))?;
    if !alerts {
        return Ok(ProbeReport::failure("Not enabled"));
    }

    Ok(if repository(client, repo)?.secret_scanning_enabled() {
        ProbeReport::success("Detected: Secret scanning enabled")
    } else {
        ProbeReport::not_detected()
    })
}

fn artifacts(client: &GitHubClient, repo: &str) -> Result<ArtifactList> {
    Ok(client
        .get_json_optional(&format!("/repos/{}/actions/artifacts", repo))?
        .unwrap_or_default())
}

/// Build artifacts kept without an expiry date.
pub fn artifact_pinning(client: &GitHubClient, repo: &str) -> Result<ProbeReport> {
    let pinned = artifacts(client, repo)?
        .artifacts
        .iter()
        .filter(|a| a.expires_at.is_none())
        .count();

    Ok(if pinned > 0 {
        ProbeReport::success(format!("Enabled ({})", pinned))
    } else {
        ProbeReport::failure("Not enabled")
    })
}

/// Build artifacts that carry a signature.
pub fn artifact_signing(client: &GitHubClient, repo: &str) -> Result<ProbeReport> {
    let signed = artifacts(client, repo)?
        .artifacts
        .iter()
        .filter(|a| a.name.to_lowercase().contains("signature"))
        .count();

    Ok(if signed > 0 {
        ProbeReport::success(format!("Detected ({})", signed))
    } else {
        ProbeReport::not_detected()
    })
}

fn sbom(client: &GitHubClient, repo: &str) -> Result<Option<Sbom>> {
    client.get_json_optional(&format!("/repos/{}/dependency-graph/sbom", repo))
}

/// The dependency graph can export an SBOM.
pub fn sbom_available(client: &GitHubClient, repo: &str) -> Result<ProbeReport> {
    Ok(match sbom(client, repo)? {
        Some(doc) => ProbeReport::success(format!(
            "Detected ({} packages)",
            doc.sbom.packages.len()
        )),
        None => ProbeReport::not_detected(),
    })
}

/// An SBOM or dependency graph lists the dependencies.
pub fn dependency_inventory(client: &GitHubClient, repo: &str) -> Result<ProbeReport> {
    if let Some(doc) = sbom(client, repo)? {
        return Ok(ProbeReport::success(format!(
            "Detected (SBOM with {} packages)",
            doc.sbom.packages.len()
        )));
    }

    let graph: Option<DependencyGraph> = client
        .get_json_optional(&format!("/repos/{}/dependency-graph/dependencies", repo))?;
    Ok(match graph {
        Some(graph) => {
            let count: usize = graph.dependencies.iter().map(|m| m.dependencies.len()).sum();
            ProbeReport::success(format!(
                "Detected (Dependency graph with {} dependencies)",
                count
            ))
        }
        None => ProbeReport::not_detected(),
    })
}

/// The repository owner has two-factor authentication.
///
/// GitHub only reveals this flag to the account itself, so the probe needs
/// a token belonging to the owner.
pub fn owner_mfa(client: &GitHubClient, repo: &str) -> Result<ProbeReport> {
    let owner = repository(client, repo)?.owner.login;
    let user: User = client.get_json(&format!("/users/{}", owner))?;

    Ok(if user.two_factor_authentication == Some(true) {
        ProbeReport::success(format!("MFA Enabled for {}", user.login))
    } else {
        ProbeReport::failure("Not Enabled")
    })
}

/// The latest commit carries a verified signature.
pub fn code_signing(client: &GitHubClient, repo: &str) -> Result<ProbeReport> {
    let commits: Vec<Commit> = client.get_json(&format!("/repos/{}/commits?per_page=1", repo))?;
    Ok(match commits.first() {
        Some(commit) if commit.is_verified() => ProbeReport::success("Enabled"),
        _ => ProbeReport::not_detected(),
    })
}

/// Dependabot vulnerability alerts are switched on.
pub fn vulnerability_alerts(client: &GitHubClient, repo: &str) -> Result<ProbeReport> {
    Ok(
        if client.exists(&format!("/repos/{}/vulnerability-alerts", repo))? {
            ProbeReport::success("Vulnerability alerts enabled")
        } else {
            ProbeReport::failure("Not enabled")
        },
    )
}

/// A `.gitignore` with at least one rule.
pub fn gitignore(client: &GitHubClient, repo: &str) -> Result<ProbeReport> {
    let Some(content) = client.file_content(repo, ".gitignore")? else {
        return Ok(ProbeReport::not_detected());
    };

    let rules = count_gitignore_rules(&content);
    Ok(if rules > 0 {
        ProbeReport::success(format!("Detected ({} rules)", rules))
    } else {
        ProbeReport::not_detected()
    })
}

/// Non-blank lines that are not comments.
pub fn count_gitignore_rules(content: &str) -> usize {
    content
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
        .count()
}
