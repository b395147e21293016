//! Response shapes for the REST endpoints the probes read.
//!
//! Only the fields the probes look at are declared; everything else in the
//! payload is ignored.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A user, organisation or bot account.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub login: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl Account {
    pub fn is_bot(&self) -> bool {
        self.kind == "Bot"
    }
}

/// `GET /users/{login}` (only the owner sees `two_factor_authentication`).
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub login: String,
    #[serde(default)]
    pub two_factor_authentication: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureStatus {
    #[serde(default)]
    pub status: Option<String>,
}

impl FeatureStatus {
    pub fn is_enabled(&self) -> bool {
        self.status.as_deref() == Some("enabled")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecurityAndAnalysis {
    #[serde(default)]
    pub advanced_security: Option<FeatureStatus>,
    #[serde(default)]
    pub secret_scanning: Option<FeatureStatus>,
}

/// `GET /repos/{owner}/{repo}`
#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub full_name: String,
    pub owner: Account,
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub security_and_analysis: Option<SecurityAndAnalysis>,
}

impl Repository {
    pub fn advanced_security_enabled(&self) -> bool {
        self.security_and_analysis
            .as_ref()
            .and_then(|s| s.advanced_security.as_ref())
            .is_some_and(FeatureStatus::is_enabled)
    }

    pub fn secret_scanning_enabled(&self) -> bool {
        self.security_and_analysis
            .as_ref()
            .and_then(|s| s.secret_scanning.as_ref())
            .is_some_and(FeatureStatus::is_enabled)
    }
}

/// Entry of `GET /orgs/{org}/repos`.
#[derive(Debug, Clone, Deserialize)]
pub struct RepositorySummary {
    pub full_name: String,
}

/// `GET /repos/{owner}/{repo}/contents/{path}` for a file.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentFile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub content: Option<String>,
}

/// Entry of a directory listing from the contents API.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentEntry {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Workflow {
    pub name: String,
    #[serde(default)]
    pub path: String,
}

/// `GET /repos/{owner}/{repo}/actions/workflows`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkflowList {
    #[serde(default)]
    pub workflows: Vec<Workflow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub user: Option<Account>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub merged_by: Option<Account>,
    #[serde(default)]
    pub requested_reviewers: Vec<Account>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Label {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tag {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    pub tag_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Artifact {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// `GET /repos/{owner}/{repo}/actions/artifacts`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArtifactList {
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Verification {
    #[serde(default)]
    pub verified: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitDetail {
    #[serde(default)]
    pub verification: Option<Verification>,
}

/// Entry of `GET /repos/{owner}/{repo}/commits`.
#[derive(Debug, Clone, Deserialize)]
pub struct Commit {
    pub commit: CommitDetail,
}

impl Commit {
    pub fn is_verified(&self) -> bool {
        self.commit.verification.as_ref().is_some_and(|v| v.verified)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SbomDocument {
    #[serde(default)]
    pub packages: Vec<serde_json::Value>,
}

/// `GET /repos/{owner}/{repo}/dependency-graph/sbom`
#[derive(Debug, Clone, Deserialize)]
pub struct Sbom {
    pub sbom: SbomDocument,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub dependencies: Vec<serde_json::Value>,
}

/// Dependency graph listing grouped by manifest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DependencyGraph {
    #[serde(default)]
    pub dependencies: Vec<Manifest>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusCheck {
    pub context: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleParameters {
    #[serde(default)]
    pub required_status_checks: Vec<StatusCheck>,
}

/// Entry of `GET /repos/{owner}/{repo}/rules/branches/{branch}`.
#[derive(Debug, Clone, Deserialize)]
pub struct BranchRule {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub ruleset_id: Option<u64>,
    #[serde(default)]
    pub parameters: Option<RuleParameters>,
}
