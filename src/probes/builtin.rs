//! Binding of the built-in probe ids to their GitHub implementations.

use std::sync::Arc;

use chrono::Utc;

use crate::github::GitHubClient;

use super::report::ProbeReport;
use super::table::{Capability, Probe, ProbeTable};
use super::{activity, indicators, settings};

/// Detail recorded when a probe cannot reach the API.
pub const UNABLE_TO_CHECK: &str = "Unable to check";

/// Wrap a fallible GitHub check into a [`Probe`].
///
/// API failures are logged and reported as an error result; they never
/// abort the run.
pub fn github_probe<F>(client: &Arc<GitHubClient>, probe_id: &'static str, check: F) -> impl Probe
where
    F: Fn(&GitHubClient, &str) -> anyhow::Result<ProbeReport> + Send + Sync + 'static,
{
    let client = Arc::clone(client);
    move |repo: &str| match check(&client, repo) {
        Ok(report) => report,
        Err(err) => {
            tracing::warn!(probe = probe_id, repo, error = %format!("{:#}", err), "Probe failed");
            ProbeReport::error(UNABLE_TO_CHECK)
        }
    }
}

/// Capabilities a run gets from its API client.
pub fn capabilities(client: &GitHubClient) -> Vec<Capability> {
    if client.is_authenticated() {
        vec![Capability::AuthenticatedApi]
    } else {
        Vec::new()
    }
}

/// Table with every built-in probe.
pub fn builtin_table(client: Arc<GitHubClient>) -> ProbeTable {
    let c = &client;
    let auth = &[Capability::AuthenticatedApi];
    let mut table = ProbeTable::new();

    table
        .register(
            "automated_prs",
            github_probe(c, "automated_prs", |gh, repo| {
                activity::automated_prs(gh, repo, Utc::now())
            }),
        )
        .register(
            "automated_pr_merges",
            github_probe(c, "automated_pr_merges", |gh, repo| {
                activity::automated_pr_merges(gh, repo, Utc::now())
            }),
        )
        .register(
            "review_requests",
            github_probe(c, "review_requests", activity::review_requests),
        )
        .register(
            "patch_management_stats",
            github_probe(c, "patch_management_stats", activity::patch_management_stats),
        )
        .register(
            "defect_treatment",
            github_probe(c, "defect_treatment", activity::defect_treatment),
        )
        .register(
            "reproducible_defects",
            github_probe(c, "reproducible_defects", activity::reproducible_defects),
        )
        .register(
            "medium_vulnerability_gate",
            github_probe(
                c,
                "medium_vulnerability_gate",
                activity::medium_vulnerability_gate,
            ),
        );

    table
        .register("versioning", github_probe(c, "versioning", settings::versioning))
        .register_requiring(
            "stored_secrets",
            auth,
            github_probe(c, "stored_secrets", settings::stored_secrets),
        )
        .register(
            "artifact_pinning",
            github_probe(c, "artifact_pinning", settings::artifact_pinning),
        )
        .register("sbom", github_probe(c, "sbom", settings::sbom_available))
        .register_requiring(
            "owner_mfa",
            auth,
            github_probe(c, "owner_mfa", settings::owner_mfa),
        )
        .register(
            "code_signing",
            github_probe(c, "code_signing", settings::code_signing),
        )
        .register(
            "dependency_inventory",
            github_probe(c, "dependency_inventory", settings::dependency_inventory),
        )
        .register_requiring(
            "vulnerability_alerts",
            auth,
            github_probe(c, "vulnerability_alerts", settings::vulnerability_alerts),
        )
        .register("gitignore", github_probe(c, "gitignore", settings::gitignore))
        .register(
            "artifact_signing",
            github_probe(c, "artifact_signing", settings::artifact_signing),
        );

    let indicator_sets: [(&'static str, &'static indicators::IndicatorSet); 11] = [
        ("serverside_sca", &indicators::SERVERSIDE_SCA),
        ("libyear", &indicators::LIBYEAR),
        ("clientside_sca", &indicators::CLIENTSIDE_SCA),
        ("sast_clientside", &indicators::SAST_CLIENTSIDE),
        ("sast_serverside", &indicators::SAST_SERVERSIDE),
        (
            "advanced_defect_visualization",
            &indicators::ADVANCED_DEFECT_VISUALIZATION,
        ),
        ("sast_self", &indicators::SAST_SELF),
        ("image_cve_correlation", &indicators::IMAGE_CVE_CORRELATION),
        ("known_cves", &indicators::KNOWN_CVES),
        ("infra_known_cves", &indicators::INFRA_KNOWN_CVES),
        ("sast_all", &indicators::SAST_ALL),
    ];
    for (probe_id, set) in indicator_sets {
        table.register(
            probe_id,
            github_probe(c, probe_id, move |gh, repo| {
                indicators::evaluate(gh, repo, set)
            }),
        );
    }

    table.register(
        "multiple_analyzers",
        github_probe(c, "multiple_analyzers", indicators::multiple_analyzers),
    );

    tracing::debug!(probes = table.len(), "Registered built-in probes");
    table
}
