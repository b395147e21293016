//! JSON output for scripting.

use std::io::Write;

use serde::Serialize;

use super::ScoreFormatter;
use crate::score::{ScoreCell, Scoreboard};

/// Writes the scoreboard as a JSON document.
pub struct JsonFormatter;

#[derive(Serialize)]
struct JsonOutput<'a> {
    repos: &'a [String],
    checks: Vec<JsonCheck<'a>>,
    levels: Vec<JsonLevel<'a>>,
    total: &'a [ScoreCell],
}

#[derive(Serialize)]
struct JsonCheck<'a> {
    name: &'a str,
    level: &'a str,
    supported: bool,
    results: Vec<JsonResult<'a>>,
}

#[derive(Serialize)]
struct JsonResult<'a> {
    repo: &'a str,
    status: crate::probes::ProbeStatus,
    detail: &'a str,
    success: bool,
}

#[derive(Serialize)]
struct JsonLevel<'a> {
    name: &'a str,
    scores: &'a [ScoreCell],
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreFormatter for JsonFormatter {
    fn format<W: Write>(&self, board: &Scoreboard, writer: &mut W) -> std::io::Result<()> {
        let checks = board
            .levels
            .iter()
            .flat_map(|section| {
                section.rows.iter().map(move |row| JsonCheck {
                    name: &row.check,
                    level: &section.level,
                    supported: row.supported,
                    results: board
                        .repos
                        .iter()
                        .zip(&row.reports)
                        .map(|(repo, report)| JsonResult {
                            repo,
                            status: report.status,
                            detail: &report.detail,
                            success: row.supported && report.is_success(),
                        })
                        .collect(),
                })
            })
            .collect();

        let output = JsonOutput {
            repos: &board.repos,
            checks,
            levels: board
                .levels
                .iter()
                .map(|s| JsonLevel {
                    name: &s.level,
                    scores: &s.scores,
                })
                .collect(),
            total: &board.total,
        };

        serde_json::to_writer_pretty(&mut *writer, &output).map_err(std::io::Error::other)?;
        writeln!(writer)
    }
}
