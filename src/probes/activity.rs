//! Probes that look at pull request and issue activity.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};

use crate::github::types::{BranchRule, ContentEntry, Issue, Label, PullRequest, Repository};
use crate::github::GitHubClient;

use super::report::ProbeReport;

/// Window for "recent" automation activity.
pub const ACTIVITY_WINDOW_DAYS: i64 = 30;

/// Status-check context that gates merges on medium vulnerabilities.
pub const MEDIUM_VULNERABILITY_CHECK: &str = "medium-vulnerability";

fn pulls(client: &GitHubClient, repo: &str, query: &str) -> Result<Vec<PullRequest>> {
    client.get_json(&format!("/repos/{}/pulls?{}", repo, query))
}

fn cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(ACTIVITY_WINDOW_DAYS)
}

/// Bot-authored pull requests opened in the last 30 days.
pub fn automated_prs(client: &GitHubClient, repo: &str, now: DateTime<Utc>) -> Result<ProbeReport> {
    let since = cutoff(now);
    let prs = pulls(
        client,
        repo,
        "state=all&sort=created&direction=desc&per_page=100",
    )?;

    let count = prs
        .iter()
        .filter(|pr| pr.user.as_ref().is_some_and(|u| u.is_bot()))
        .filter(|pr| pr.created_at.is_some_and(|t| t > since))
        .count();

    Ok(if count > 0 {
        ProbeReport::success(format!("Detected ({} in last 30 days)", count))
    } else {
        ProbeReport::not_detected()
    })
}

/// Pull requests merged by a bot in the last 30 days.
pub fn automated_pr_merges(
    client: &GitHubClient,
    repo: &str,
    now: DateTime<Utc>,
) -> Result<ProbeReport> {
    let since = cutoff(now);
    let prs = pulls(
        client,
        repo,
        "state=closed&sort=updated&direction=desc&per_page=100",
    )?;

    let count = prs
        .iter()
        .filter(|pr| pr.merged_at.is_some_and(|t| t > since))
        .filter(|pr| pr.merged_by.as_ref().is_some_and(|u| u.is_bot()))
        .count();

    Ok(if count > 0 {
        ProbeReport::success(format!("Detected ({} in last 30 days)", count))
    } else {
        ProbeReport::not_detected()
    })
}

/// Whether the latest open pull request asked for review.
pub fn review_requests(client: &GitHubClient, repo: &str) -> Result<ProbeReport> {
    let prs = pulls(client, repo, "state=open&per_page=1")?;
    Ok(match prs.first() {
        None => ProbeReport::failure("No PRs"),
        Some(pr) if !pr.requested_reviewers.is_empty() => {
            ProbeReport::success("Last PR requested for review")
        }
        Some(_) => ProbeReport::not_detected(),
    })
}

/// Dependency-update and security-patch pull requests.
pub fn patch_management_stats(client: &GitHubClient, repo: &str) -> Result<ProbeReport> {
    let prs = pulls(client, repo, "state=all&per_page=100")?;

    let titled = |words: &[&str]| {
        prs.iter()
            .filter(|pr| {
                let title = pr.title.to_lowercase();
                words.iter().any(|w| title.contains(w))
            })
            .count()
    };
    let updates = titled(&["dependency", "update"]);
    let security = titled(&["security", "patch"]);

    Ok(if updates + security > 0 {
        ProbeReport::success(format!(
            "Detected ({} dependency updates, {} security patches)",
            updates, security
        ))
    } else {
        ProbeReport::not_detected()
    })
}

/// Bug-labelled issues and fix pull requests.
pub fn defect_treatment(client: &GitHubClient, repo: &str) -> Result<ProbeReport> {
    let mut indicators = Vec::new();

    let issues: Vec<Issue> = client
        .get_json_optional(&format!(
            "/repos/{}/issues?state=all&labels=bug,defect&per_page=100",
            repo
        ))?
        .unwrap_or_default();
    if !issues.is_empty() {
        indicators.push(format!(
            "Found {} issues labeled as bugs/defects",
            issues.len()
        ));
    }

    let fixes = pulls(client, repo, "state=all&per_page=100")?
        .iter()
        .filter(|pr| {
            let title = pr.title.to_lowercase();
            title.contains("fix") || title.contains("bug")
        })
        .count();
    if fixes > 0 {
        indicators.push(format!("Found {} PRs related to defect fixes", fixes));
    }

    Ok(if indicators.is_empty() {
        ProbeReport::not_detected()
    } else {
        ProbeReport::success(format!(
            "Defect treatment detected: {}",
            indicators.join(", ")
        ))
    })
}

/// Bug templates, reproducibility labels and issues with reproduction steps.
pub fn reproducible_defects(client: &GitHubClient, repo: &str) -> Result<ProbeReport> {
    let mut indicators = Vec::new();

    let templates: Vec<ContentEntry> = client
        .get_json_optional(&format!("/repos/{}/contents/.github/ISSUE_TEMPLATE", repo))?
        .unwrap_or_default();
    if templates.iter().any(|t| {
        let name = t.name.to_lowercase();
        name.contains("bug") || name.contains("defect")
    }) {
        indicators.push("Bug report template found".to_string());
    }

    let labels: Vec<Label> = client
        .get_json_optional(&format!("/repos/{}/labels", repo))?
        .unwrap_or_default();
    let reproducible: Vec<&str> = labels
        .iter()
        .filter(|l| l.name.to_lowercase().contains("reproducible"))
        .map(|l| l.name.as_str())
        .collect();
    if !reproducible.is_empty() {
        indicators.push(format!(
            "Reproducibility labels found: {}",
            reproducible.join(", ")
        ));
    }

    let issues: Vec<Issue> = client
        .get_json_optional(&format!("/repos/{}/issues?state=all&per_page=100", repo))?
        .unwrap_or_default();
    let with_steps = issues
        .iter()
        .filter_map(|i| i.body.as_deref())
        .filter(|body| {
            let body = body.to_lowercase();
            body.contains("steps to reproduce") || body.contains("reproduction steps")
        })
        .count();
    if with_steps > 0 {
        indicators.push(format!(
            "Found {} issues with reproduction steps",
            with_steps
        ));
    }

    Ok(if indicators.is_empty() {
        ProbeReport::not_detected()
    } else {
        ProbeReport::success(format!(
            "Reproducible defect tickets likely configured: {}",
            indicators.join(", ")
        ))
    })
}

/// A branch ruleset on the default branch requires the medium-vulnerability
/// status check.
pub fn medium_vulnerability_gate(client: &GitHubClient, repo: &str) -> Result<ProbeReport> {
    let info: Option<Repository> = client.get_json_optional(&format!("/repos/{}", repo))?;
    let branch = info
        .and_then(|r| r.default_branch)
        .unwrap_or_else(|| "main".to_string());

    let rules: Vec<BranchRule> = client
        .get_json_optional(&format!("/repos/{}/rules/branches/{}", repo, branch))?
        .unwrap_or_default();

    let gate = rules.iter().find(|rule| {
        rule.kind == "required_status_checks"
            && rule.parameters.as_ref().is_some_and(|p| {
                p.required_status_checks
                    .iter()
                    .any(|c| c.context.contains(MEDIUM_VULNERABILITY_CHECK))
            })
    });

    Ok(match gate {
        Some(rule) => ProbeReport::success(format!(
            "Ruleset '{}' applies to '{}' and includes a required status check for medium vulnerabilities",
            rule.ruleset_id.map(|id| id.to_string()).unwrap_or_default(),
            branch
        )),
        None => ProbeReport::failure(format!(
            "No ruleset with required status checks for medium vulnerabilities found for branch {}",
            branch
        )),
    })
}
