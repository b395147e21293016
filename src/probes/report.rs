//! Probe results.

use serde::Serialize;

/// Sentinel shown for checks that have no automated probe.
pub const NOT_SUPPORTED: &str = "Not Supported";

/// Free-text results that count as a failed check.
///
/// Matching is case-insensitive and against the whole string.
pub const NEGATIVE_RESULTS: &[&str] = &[
    "not detected",
    "no",
    "not available",
    "not enabled",
    "unable to check",
    "error parsing data",
    "error exception",
    "error",
];

/// What a probe concluded about a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStatus {
    /// The practice was found.
    Success,
    /// The practice was looked for and not found.
    Failure,
    /// Only free text is available; classify by wording.
    Unknown,
    /// The probe could not reach a conclusion.
    Error,
}

/// Outcome plus the evidence shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeReport {
    pub status: ProbeStatus,
    pub detail: String,
}

impl ProbeReport {
    /// The practice was found; `detail` describes the evidence.
    pub fn success(detail: impl Into<String>) -> Self {
        Self {
            status: ProbeStatus::Success,
            detail: detail.into(),
        }
    }

    /// The practice was looked for and not found.
    pub fn failure(detail: impl Into<String>) -> Self {
        Self {
            status: ProbeStatus::Failure,
            detail: detail.into(),
        }
    }

    /// The standard "nothing found" report.
    pub fn not_detected() -> Self {
        Self::failure("Not detected")
    }

    /// The probe could not finish.
    pub fn error(detail: impl Into<String>) -> Self {
        Self {
            status: ProbeStatus::Error,
            detail: detail.into(),
        }
    }

    /// A free-text result, classified later by its wording.
    pub fn raw(detail: impl Into<String>) -> Self {
        Self {
            status: ProbeStatus::Unknown,
            detail: detail.into(),
        }
    }

    /// Whether this report counts as a passed check.
    pub fn is_success(&self) -> bool {
        match self.status {
            ProbeStatus::Success => true,
            ProbeStatus::Failure | ProbeStatus::Error => false,
            ProbeStatus::Unknown => !is_negative(&self.detail),
        }
    }
}

/// Whether free text belongs to the negative vocabulary.
pub fn is_negative(text: &str) -> bool {
    let lowered = text.to_lowercase();
    NEGATIVE_RESULTS.iter().any(|n| *n == lowered)
}

impl From<&str> for ProbeReport {
    fn from(text: &str) -> Self {
        Self::raw(text)
    }
}

impl From<String> for ProbeReport {
    fn from(text: String) -> Self {
        Self::raw(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_vocabulary_is_case_insensitive() {
        assert!(is_negative("Not detected"));
        assert!(is_negative("NOT DETECTED"));
        assert!(is_negative("Error exception"));
        assert!(is_negative("no"));
    }

    #[test]
    fn negative_vocabulary_is_whole_string() {
        assert!(!is_negative("Error: timeout"));
        assert!(!is_negative("No PRs"));
        assert!(!is_negative("not detected yet"));
    }

    #[test]
    fn raw_reports_classify_by_wording() {
        assert!(!ProbeReport::raw("Not detected").is_success());
        assert!(ProbeReport::raw("Detected (3 packages)").is_success());
        assert!(ProbeReport::raw("Error: timeout").is_success());
    }

    #[test]
    fn tagged_reports_ignore_wording() {
        assert!(ProbeReport::success("no").is_success());
        assert!(!ProbeReport::failure("Detected").is_success());
        assert!(!ProbeReport::error("Enabled").is_success());
    }

    #[test]
    fn strings_convert_to_raw_reports() {
        let report: ProbeReport = "Enabled".into();
        assert_eq!(report.status, ProbeStatus::Unknown);
        assert_eq!(report.detail, "Enabled");
    }
}
