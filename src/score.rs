//! Outcome classification and score aggregation.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::probes::ProbeReport;
use crate::registry::Registry;
use crate::runner::RunResults;
use crate::selector::SelectionSet;

/// Label of the grand-total row.
pub const TOTAL: &str = "TOTAL";

/// Shown for a pair the run produced no report for.
const MISSING_RESULT: &str = "Error";

/// Binary verdict for one (repository, check) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    pub fn of(report: &ProbeReport) -> Self {
        if report.is_success() {
            Outcome::Success
        } else {
            Outcome::Failure
        }
    }
}

/// Successful checks out of scored checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreCell {
    pub successful: usize,
    pub total: usize,
}

impl ScoreCell {
    pub fn record(&mut self, outcome: Outcome) {
        self.total += 1;
        if outcome == Outcome::Success {
            self.successful += 1;
        }
    }

    fn add(&mut self, other: ScoreCell) {
        self.successful += other.successful;
        self.total += other.total;
    }
}

/// Renders as `successful/total`, or nothing when no check was scored.
impl fmt::Display for ScoreCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.total == 0 {
            Ok(())
        } else {
            write!(f, "{}/{}", self.successful, self.total)
        }
    }
}

impl Serialize for ScoreCell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.total == 0 {
            serializer.serialize_none()
        } else {
            use serde::ser::SerializeStruct;
            let mut state = serializer.serialize_struct("ScoreCell", 2)?;
            state.serialize_field("successful", &self.successful)?;
            state.serialize_field("total", &self.total)?;
            state.end()
        }
    }
}

/// One check and its result for every repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckRow {
    pub check: String,
    pub supported: bool,
    /// Report per repository, in repository order.
    pub reports: Vec<ProbeReport>,
}

/// The selected checks of one level with their per-repository score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelSection {
    pub level: String,
    pub rows: Vec<CheckRow>,
    /// Score per repository.
    pub scores: Vec<ScoreCell>,
}

impl LevelSection {
    /// Score summed over every repository.
    pub fn overall(&self) -> ScoreCell {
        let mut sum = ScoreCell::default();
        for cell in &self.scores {
            sum.add(*cell);
        }
        sum
    }
}

/// Everything a renderer needs: check rows grouped by level, level scores
/// and the total score, each with one column per repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scoreboard {
    pub repos: Vec<String>,
    pub levels: Vec<LevelSection>,
    pub total: Vec<ScoreCell>,
}

impl Scoreboard {
    /// Every check row in registry order.
    pub fn rows(&self) -> impl Iterator<Item = &CheckRow> {
        self.levels.iter().flat_map(|l| l.rows.iter())
    }

    /// Score of `level` for the repository at `repo_index`.
    pub fn level_score(&self, level: &str, repo_index: usize) -> Option<ScoreCell> {
        self.levels
            .iter()
            .find(|l| l.level == level)
            .and_then(|l| l.scores.get(repo_index).copied())
    }

    /// One line per level that scored anything, e.g.
    /// `LEVEL1: 2/3 checks successful`.
    pub fn summary_lines(&self) -> Vec<String> {
        self.levels
            .iter()
            .filter_map(|section| {
                let overall = section.overall();
                (overall.total > 0)
                    .then(|| format!("{}: {} checks successful", section.level, overall))
            })
            .collect()
    }
}

/// Group results by level and score them.
///
/// Levels without a selected check are left out. Unsupported checks keep
/// their row but never count towards a score.
pub fn aggregate(results: &RunResults, registry: &Registry, selection: &SelectionSet) -> Scoreboard {
    let repos = results.repos().to_vec();
    let mut total = vec![ScoreCell::default(); repos.len()];
    let mut levels = Vec::new();

    for level in registry.levels() {
        let mut section = LevelSection {
            level: level.name.clone(),
            rows: Vec::new(),
            scores: vec![ScoreCell::default(); repos.len()],
        };

        for check in level.checks.iter().filter(|c| selection.contains(&c.name)) {
            let mut reports = Vec::with_capacity(repos.len());
            for (i, repo) in repos.iter().enumerate() {
                let report = match results.get(repo, &check.name) {
                    Some(report) => report.clone(),
                    None => {
                        tracing::debug!(repo = %repo, check = %check.name, "No result for pair");
                        ProbeReport::error(MISSING_RESULT)
                    }
                };
                if check.supported {
                    section.scores[i].record(Outcome::of(&report));
                }
                reports.push(report);
            }
            section.rows.push(CheckRow {
                check: check.name.clone(),
                supported: check.supported,
                reports,
            });
        }

        if section.rows.is_empty() {
            continue;
        }
        for (sum, cell) in total.iter_mut().zip(&section.scores) {
            sum.add(*cell);
        }
        levels.push(section);
    }

    Scoreboard {
        repos,
        levels,
        total,
    }
}
