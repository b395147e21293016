//! Scoreboard output formatters.
//!
//! Every format lays out one row per check, one column per repository, a
//! `<LEVEL> score` row after each level and a final `TOTAL score` row.

pub mod csv;
pub mod json;
pub mod table;

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{DsommError, Result};
use crate::score::Scoreboard;

pub use self::csv::CsvFormatter;
pub use self::json::JsonFormatter;
pub use self::table::{Table, TableFormatter};

/// Header of the first column.
pub const FEATURE_HEADER: &str = "Security Feature";

/// Label of the grand-total row.
pub const TOTAL_SCORE_LABEL: &str = "TOTAL score";

/// File written when CSV output has no explicit path.
pub const DEFAULT_CSV_PATH: &str = "dsomm.csv";

/// Label of a level's score row.
pub fn level_score_label(level: &str) -> String {
    format!("{} score", level)
}

/// Output format for run results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Box-drawn grid
    #[default]
    #[serde(alias = "tabular")]
    #[value(alias = "tabular")]
    Table,
    /// Comma-separated values
    Csv,
    /// Structured JSON
    Json,
}

impl OutputFormat {
    /// Where output goes when no path was given; `None` means stdout.
    pub fn default_path(self) -> Option<PathBuf> {
        match self {
            OutputFormat::Csv => Some(PathBuf::from(DEFAULT_CSV_PATH)),
            OutputFormat::Table | OutputFormat::Json => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Table => "table",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        };
        f.write_str(name)
    }
}

/// Trait for formatting a scoreboard.
pub trait ScoreFormatter {
    fn format<W: Write>(&self, board: &Scoreboard, writer: &mut W) -> std::io::Result<()>;
}

/// Format `board` into `writer`.
pub fn render<W: Write>(
    board: &Scoreboard,
    format: OutputFormat,
    writer: &mut W,
) -> std::io::Result<()> {
    match format {
        OutputFormat::Table => TableFormatter::new().format(board, writer),
        OutputFormat::Csv => CsvFormatter::new().format(board, writer),
        OutputFormat::Json => JsonFormatter::new().format(board, writer),
    }
}

/// Format `board` into a string.
pub fn render_to_string(board: &Scoreboard, format: OutputFormat) -> String {
    let mut out = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = render(board, format, &mut out);
    String::from_utf8_lossy(&out).into_owned()
}

/// Write the results to `path`, or to `stdout` when there is none.
///
/// # Errors
///
/// When the file cannot be written the grid view goes to `stdout` instead
/// and [`DsommError::RenderError`] is returned, so the run's results are
/// never lost.
pub fn emit<W: Write>(
    board: &Scoreboard,
    format: OutputFormat,
    path: Option<&Path>,
    stdout: &mut W,
) -> Result<()> {
    let Some(path) = path else {
        render(board, format, stdout)?;
        return Ok(());
    };

    if let Err(err) = write_file(board, format, path) {
        tracing::warn!(path = %path.display(), error = %err, "Falling back to stdout");
        render(board, OutputFormat::Table, stdout)?;
        return Err(DsommError::RenderError {
            path: path.to_path_buf(),
            message: err.to_string(),
        });
    }

    tracing::info!(path = %path.display(), %format, "Results written");
    Ok(())
}

fn write_file(board: &Scoreboard, format: OutputFormat, path: &Path) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    render(board, format, &mut writer)?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probes::ProbeReport;
    use crate::score::{CheckRow, LevelSection, ScoreCell};
    use tempfile::TempDir;

    fn board() -> Scoreboard {
        Scoreboard {
            repos: vec!["x".to_string()],
            levels: vec![LevelSection {
                level: "L1".to_string(),
                rows: vec![CheckRow {
                    check: "a".to_string(),
                    supported: true,
                    reports: vec![ProbeReport::raw("Detected")],
                }],
                scores: vec![ScoreCell {
                    successful: 1,
                    total: 1,
                }],
            }],
            total: vec![ScoreCell {
                successful: 1,
                total: 1,
            }],
        }
    }

    #[test]
    fn format_names_parse() {
        assert_eq!(
            OutputFormat::from_str("tabular", true).unwrap(),
            OutputFormat::Table
        );
        assert_eq!(
            serde_yaml::from_str::<OutputFormat>("csv").unwrap(),
            OutputFormat::Csv
        );
        assert_eq!(OutputFormat::Json.to_string(), "json");
    }

    #[test]
    fn only_csv_defaults_to_a_file() {
        assert_eq!(
            OutputFormat::Csv.default_path(),
            Some(PathBuf::from("dsomm.csv"))
        );
        assert_eq!(OutputFormat::Table.default_path(), None);
    }

    #[test]
    fn emit_without_path_uses_stdout() {
        let mut out = Vec::new();
        emit(&board(), OutputFormat::Csv, None, &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("Security Feature,x\n"));
    }

    #[test]
    fn emit_writes_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.csv");
        let mut out = Vec::new();

        emit(&board(), OutputFormat::Csv, Some(&path), &mut out).unwrap();

        assert!(out.is_empty());
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("TOTAL score,1/1"));
    }

    #[test]
    fn unwritable_path_falls_back_to_grid() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing").join("out.csv");
        let mut out = Vec::new();

        let err = emit(&board(), OutputFormat::Csv, Some(&path), &mut out).unwrap_err();

        assert!(matches!(err, DsommError::RenderError { .. }));
        assert_eq!(err.exit_code(), 2);
        let fallback = String::from_utf8(out).unwrap();
        assert!(fallback.contains("┌"));
        assert!(fallback.contains("TOTAL score"));
    }
}
