//! Configuration-indicator probes.
//!
//! Most checks look for the same kind of evidence: well-known tool
//! configuration files in the repository root and GitHub Actions workflows
//! whose name or content mentions the tool. Those checks are declared as
//! [`IndicatorSet`] data and evaluated by [`evaluate`].

use anyhow::Result;

use crate::github::types::{Repository, WorkflowList};
use crate::github::GitHubClient;

use super::report::ProbeReport;

/// Files that indicate a tool is configured.
#[derive(Debug)]
pub struct FileGroup {
    /// Prefix of each finding, e.g. "Config file" or "ESLint config found".
    pub label: &'static str,
    pub files: &'static [&'static str],
    /// Stop at the first file found in this group.
    pub first_only: bool,
}

/// Every existing file is reported.
pub const fn each(label: &'static str, files: &'static [&'static str]) -> FileGroup {
    FileGroup {
        label,
        files,
        first_only: false,
    }
}

/// Only the first existing file is reported.
pub const fn first(label: &'static str, files: &'static [&'static str]) -> FileGroup {
    FileGroup {
        label,
        files,
        first_only: true,
    }
}

/// How workflows are searched for keywords.
#[derive(Debug)]
pub enum WorkflowScan {
    /// Match the lowercased workflow name.
    Names {
        keywords: &'static [&'static str],
        label: &'static str,
    },
    /// Match the lowercased workflow file content.
    Contents {
        keywords: &'static [&'static str],
        label: &'static str,
    },
}

/// A declarative indicator probe.
#[derive(Debug)]
pub struct IndicatorSet {
    /// Text before the list of findings.
    pub summary: &'static str,
    /// Joins the findings.
    pub separator: &'static str,
    /// Also report GitHub Advanced Security when the repository enables it.
    pub advanced_security: bool,
    pub files: &'static [FileGroup],
    pub workflows: WorkflowScan,
}

pub const SERVERSIDE_SCA: IndicatorSet = IndicatorSet {
    summary: "Server-side SCA detected",
    separator: ", ",
    advanced_security: false,
    files: &[each(
        "Config file",
        &["dependency-check.xml", "sca-config.json", ".snyk"],
    )],
    workflows: WorkflowScan::Names {
        keywords: &["dependency", "sca", "composition", "snyk"],
        label: "GitHub Action",
    },
};

pub const LIBYEAR: IndicatorSet = IndicatorSet {
    summary: "Libyear testing implemented",
    separator: ", ",
    advanced_security: false,
    files: &[each(
        "Config file",
        &[
            "libyear.json",
            "libyear-config.js",
            "libyear.config.js",
            ".libyearrc",
        ],
    )],
    workflows: WorkflowScan::Names {
        keywords: &["libyear"],
        label: "GitHub Action",
    },
};

pub const CLIENTSIDE_SCA: IndicatorSet = IndicatorSet {
    summary: "Client-side SCA detected",
    separator: ", ",
    advanced_security: false,
    files: &[each(
        "Config file",
        &[
            "package.json",
            "yarn.lock",
            "bower.json",
            "Gemfile.lock",
            "requirements.txt",
        ],
    )],
    workflows: WorkflowScan::Names {
        keywords: &["npm audit", "yarn audit", "bundle audit", "safety check"],
        label: "GitHub Action",
    },
};

pub const SAST_CLIENTSIDE: IndicatorSet = IndicatorSet {
    summary: "Client-side static analysis detected",
    separator: ", ",
    advanced_security: false,
    files: &[
        first(
            "ESLint config found",
            &[".eslintrc", ".eslintrc.js", ".eslintrc.json", ".eslintrc.yml"],
        ),
        first(
            "Stylelint config found",
            &[".stylelintrc", ".stylelintrc.json", ".stylelintrc.yml"],
        ),
        first("TSLint config found", &["tslint.json"]),
        first("JSHint config found", &[".jshintrc"]),
        first(
            "Prettier config found",
            &[
                ".prettierrc",
                ".prettierrc.js",
                ".prettierrc.json",
                ".prettierrc.yml",
            ],
        ),
    ],
    workflows: WorkflowScan::Names {
        keywords: &[
            "eslint",
            "stylelint",
            "tslint",
            "jshint",
            "prettier",
            "static analysis",
        ],
        label: "GitHub Action",
    },
};

pub const SAST_SERVERSIDE: IndicatorSet = IndicatorSet {
    summary: "Server-side static analysis detected",
    separator: ", ",
    advanced_security: false,
    files: &[
        first("Pylint config found", &[".pylintrc", "pylintrc"]),
        first("Flake8 config found", &[".flake8", "setup.cfg"]),
        first("Rubocop config found", &[".rubocop.yml"]),
        first(
            "PHP_CodeSniffer config found",
            &["phpcs.xml", "phpcs.xml.dist"],
        ),
        first("SonarQube config found", &["sonar-project.properties"]),
        first("Checkstyle config found", &["checkstyle.xml"]),
    ],
    workflows: WorkflowScan::Names {
        keywords: &[
            "pylint",
            "flake8",
            "rubocop",
            "phpcs",
            "sonarqube",
            "checkstyle",
            "static analysis",
        ],
        label: "GitHub Action",
    },
};

pub const ADVANCED_DEFECT_VISUALIZATION: IndicatorSet = IndicatorSet {
    summary: "Advanced defect visualization detected",
    separator: ", ",
    advanced_security: false,
    files: &[
        each(
            "Visualization file found",
            &[
                "diagram.svg",
                "repo-visualization.yml",
                "create-diagram.yml",
                "defect-visualization-config.json",
            ],
        ),
        each("Integration found", &[".veracode", ".snyk"]),
    ],
    workflows: WorkflowScan::Names {
        keywords: &["visualiz", "diagram", "defect"],
        label: "Visualization workflow",
    },
};

const SELF_WRITTEN_ANALYSIS_FILES: &[&str] = &[
    ".eslintrc",
    ".pylintrc",
    "sonar-project.properties",
    ".golangci.yml",
    "tslint.json",
    ".rubocop.yml",
    "stylelint.config.js",
    ".ktlint.yml",
    ".swiftlint.yml",
];

const SELF_WRITTEN_ANALYSIS_WORKFLOWS: WorkflowScan = WorkflowScan::Names {
    keywords: &["lint", "analyze", "sonar", "static analysis"],
    label: "GitHub Action",
};

pub const SAST_SELF: IndicatorSet = IndicatorSet {
    summary: "Static analysis configured",
    separator: ", ",
    advanced_security: false,
    files: &[each("Config file", SELF_WRITTEN_ANALYSIS_FILES)],
    workflows: SELF_WRITTEN_ANALYSIS_WORKFLOWS,
};

pub const SAST_ALL: IndicatorSet = IndicatorSet {
    summary: "Static analysis configured",
    separator: ", ",
    advanced_security: false,
    files: &[each("Config file", SELF_WRITTEN_ANALYSIS_FILES)],
    workflows: SELF_WRITTEN_ANALYSIS_WORKFLOWS,
};

pub const IMAGE_CVE_CORRELATION: IndicatorSet = IndicatorSet {
    summary: "Vulnerability correlation enabled",
    separator: "; ",
    advanced_security: false,
    files: &[
        each(
            "Trivy config found",
            &[".trivyignore", "trivy.yaml", "trivy-config.yaml"],
        ),
        each("Clair config found", &["clair-config.yaml"]),
        each("Snyk config found", &[".snyk", "snyk.yaml"]),
        each("Dependabot config found", &[".github/dependabot.yml"]),
        each(
            "GitHub Advanced Security config found",
            &[".github/workflows/codeql-analysis.yml"],
        ),
    ],
    workflows: WorkflowScan::Contents {
        keywords: &[
            "codeql",
            "vulnerability",
            "security scan",
            "trivy",
            "clair",
            "snyk",
        ],
        label: "Vulnerability scanning workflow",
    },
};

pub const KNOWN_CVES: IndicatorSet = IndicatorSet {
    summary: "Vulnerability testing config",
    separator: "; ",
    advanced_security: true,
    files: &[
        each(
            "Trivy config found",
            &[".trivyignore", "trivy.yaml", "trivy-config.yaml"],
        ),
        each("Clair config found", &["clair-config.yaml"]),
        each("Snyk config found", &[".snyk", "snyk.yaml"]),
        each(
            "GitHub Advanced Security config found",
            &[".github/workflows/codeql-analysis.yml"],
        ),
    ],
    workflows: WorkflowScan::Contents {
        keywords: &[
            "codeql",
            "vulnerability",
            "security scan",
            "snyk",
            "dependabot",
        ],
        label: "Vulnerability scanning workflow",
    },
};

pub const INFRA_KNOWN_CVES: IndicatorSet = IndicatorSet {
    summary: "Infrastructure vulnerability testing likely enabled",
    separator: "; ",
    advanced_security: false,
    files: &[
        each("Trivy config found", &[".trivyignore", "trivy.yaml"]),
        each("Terrascan config found", &[".terrascan", "terrascan.yaml"]),
        each("Checkov config found", &[".checkov.yaml", ".checkov.yml"]),
        each("tfsec config found", &[".tfsec", "tfsec.yaml"]),
        each("Snyk config found", &[".snyk", "snyk.yaml"]),
    ],
    workflows: WorkflowScan::Contents {
        keywords: &[
            "infrastructure",
            "iac",
            "terraform",
            "cloudformation",
            "trivy",
            "terrascan",
            "checkov",
            "tfsec",
            "snyk",
            "lacework",
        ],
        label: "Infrastructure scanning workflow",
    },
};

/// Run an indicator set against `repo`.
pub fn evaluate(client: &GitHubClient, repo: &str, set: &IndicatorSet) -> Result<ProbeReport> {
    let found = collect(client, repo, set)?;
    if found.is_empty() {
        Ok(ProbeReport::not_detected())
    } else {
        Ok(ProbeReport::success(format!(
            "{}: {}",
            set.summary,
            found.join(set.separator)
        )))
    }
}

/// Findings of an indicator set, in declaration order.
pub fn collect(client: &GitHubClient, repo: &str, set: &IndicatorSet) -> Result<Vec<String>> {
    let mut found = Vec::new();

    if set.advanced_security {
        let info: Option<Repository> = client.get_json_optional(&format!("/repos/{}", repo))?;
        if info.is_some_and(|r| r.advanced_security_enabled()) {
            found.push("GitHub Advanced Security enabled".to_string());
        }
    }

    for group in set.files {
        for file in group.files {
            if client.file_exists(repo, file)? {
                found.push(format!("{}: {}", group.label, file));
                if group.first_only {
                    break;
                }
            }
        }
    }

    match &set.workflows {
        WorkflowScan::Names { keywords, label } => {
            for workflow in list_workflows(client, repo)?.workflows {
                if contains_any(&workflow.name, keywords) {
                    found.push(format!("{}: {}", label, workflow.name));
                }
            }
        }
        WorkflowScan::Contents { keywords, label } => {
            for (name, content) in workflow_contents(client, repo)? {
                if contains_any(&content, keywords) {
                    found.push(format!("{}: {}", label, name));
                }
            }
        }
    }

    Ok(found)
}

/// Workflows of `repo`; an empty list when Actions is not available.
pub fn list_workflows(client: &GitHubClient, repo: &str) -> Result<WorkflowList> {
    Ok(client
        .get_json_optional(&format!("/repos/{}/actions/workflows", repo))?
        .unwrap_or_default())
}

/// `(workflow name, file content)` for every workflow whose file is readable.
pub fn workflow_contents(client: &GitHubClient, repo: &str) -> Result<Vec<(String, String)>> {
    let mut contents = Vec::new();
    for workflow in list_workflows(client, repo)?.workflows {
        if workflow.path.is_empty() {
            continue;
        }
        if let Some(content) = client.file_content(repo, &workflow.path)? {
            contents.push((workflow.name, content));
        }
    }
    Ok(contents)
}

/// Case-insensitive substring match against lowercase keywords.
pub fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    let lowered = haystack.to_lowercase();
    keywords.iter().any(|k| lowered.contains(k))
}

/// Analyzers recognised by the multiple-analyzers check, with their
/// configuration files.
pub const ANALYZERS: &[(&str, &[&str])] = &[
    (
        "SonarQube",
        &["sonar-project.properties", ".sonarcloud.properties"],
    ),
    (
        "ESLint",
        &[".eslintrc", ".eslintrc.js", ".eslintrc.json", ".eslintrc.yml"],
    ),
    ("Pylint", &[".pylintrc", "pylintrc"]),
    ("RuboCop", &[".rubocop.yml"]),
    ("Checkstyle", &["checkstyle.xml"]),
    ("Flake8", &[".flake8", "setup.cfg"]),
    (
        "Stylelint",
        &[".stylelintrc", ".stylelintrc.json", ".stylelintrc.yml"],
    ),
];

/// Passes when at least two distinct analyzers are configured, either by
/// config file or by being mentioned in a workflow.
pub fn multiple_analyzers(client: &GitHubClient, repo: &str) -> Result<ProbeReport> {
    let mut analyzers: Vec<(&str, String)> = Vec::new();

    for (analyzer, files) in ANALYZERS {
        for file in *files {
            if client.file_exists(repo, file)? {
                analyzers.push((*analyzer, format!("Config file: {}", file)));
                break;
            }
        }
    }

    for (workflow, content) in workflow_contents(client, repo)? {
        let content = content.to_lowercase();
        for (analyzer, _) in ANALYZERS {
            let known = analyzers.iter().any(|(name, _)| name == analyzer);
            if !known && content.contains(&analyzer.to_lowercase()) {
                analyzers.push((*analyzer, format!("GitHub Action: {}", workflow)));
            }
        }
    }

    let listed = analyzers
        .iter()
        .map(|(name, source)| format!("{} ({})", name, source))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(match analyzers.len() {
        0 => ProbeReport::not_detected(),
        1 => ProbeReport::failure(format!("Single analyzer detected: {}", listed)),
        _ => ProbeReport::success(format!("Multiple analyzers detected: {}", listed)),
    })
}
