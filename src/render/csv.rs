//! CSV output.
//!
//! Fields are quoted only when they contain a comma, a double quote or a
//! line break; quotes inside quoted fields are doubled. Lines end in `\n`.

use std::io::Write;

use super::{level_score_label, ScoreFormatter, FEATURE_HEADER, TOTAL_SCORE_LABEL};
use crate::score::Scoreboard;

/// Writes the scoreboard as comma-separated values.
pub struct CsvFormatter;

impl CsvFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Quote a field when needed.
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn write_record<W, I, S>(writer: &mut W, fields: I) -> std::io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let line: Vec<String> = fields
        .into_iter()
        .map(|f| escape_field(f.as_ref()))
        .collect();
    writer.write_all(line.join(",").as_bytes())?;
    writer.write_all(b"\n")
}

impl ScoreFormatter for CsvFormatter {
    fn format<W: Write>(&self, board: &Scoreboard, writer: &mut W) -> std::io::Result<()> {
        write_record(
            writer,
            std::iter::once(FEATURE_HEADER).chain(board.repos.iter().map(String::as_str)),
        )?;

        for section in &board.levels {
            for row in &section.rows {
                write_record(
                    writer,
                    std::iter::once(row.check.as_str())
                        .chain(row.reports.iter().map(|r| r.detail.as_str())),
                )?;
            }
            write_record(
                writer,
                std::iter::once(level_score_label(&section.level))
                    .chain(section.scores.iter().map(ToString::to_string)),
            )?;
        }

        write_record(
            writer,
            std::iter::once(TOTAL_SCORE_LABEL.to_string())
                .chain(board.total.iter().map(ToString::to_string)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probes::{ProbeReport, NOT_SUPPORTED};
    use crate::registry::parse_registry_str;
    use crate::runner::RunResults;
    use crate::score::aggregate;
    use crate::selector::SelectionSet;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn render(board: &Scoreboard) -> String {
        let mut out = Vec::new();
        CsvFormatter::new().format(board, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn escapes_only_when_needed() {
        assert_eq!(escape_field("Detected"), "Detected");
        assert_eq!(escape_field("Detected (a, b)"), "\"Detected (a, b)\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn levels_and_total_rows() {
        let registry = parse_registry_str(
            r#"
LEVEL1:
  - name: l1_1_automated_prs
    probe: automated_prs
  - name: l1_2_versioning
    probe: versioning
LEVEL2:
  - name: l2_1_manual
    probe: manual
    supported: false
"#,
        )
        .unwrap();
        let selection = SelectionSet::all(&registry);
        let results = RunResults::from_grid(
            strings(&["acme/api", "acme/web"]),
            strings(&["l1_1_automated_prs", "l1_2_versioning", "l2_1_manual"]),
            vec![
                ProbeReport::success("Detected (Bots: dependabot[bot], renovate[bot])"),
                ProbeReport::success("Detected (file: package.json)"),
                ProbeReport::raw(NOT_SUPPORTED),
                ProbeReport::failure("Not detected"),
                ProbeReport::success("Detected (latest tag: v1.2.0)"),
                ProbeReport::raw(NOT_SUPPORTED),
            ],
        )
        .unwrap();

        let csv = render(&aggregate(&results, &registry, &selection));

        insta::assert_snapshot!(csv, @r#"
        Security Feature,acme/api,acme/web
        l1_1_automated_prs,"Detected (Bots: dependabot[bot], renovate[bot])",Not detected
        l1_2_versioning,Detected (file: package.json),Detected (latest tag: v1.2.0)
        LEVEL1 score,2/2,1/2
        l2_1_manual,Not Supported,Not Supported
        LEVEL2 score,,
        TOTAL score,2/2,1/2
        "#);
    }

    #[test]
    fn output_is_stable() {
        let registry = parse_registry_str("L1:\n  - name: a\n    probe: p\n").unwrap();
        let selection = SelectionSet::all(&registry);
        let results = RunResults::from_grid(
            strings(&["x"]),
            strings(&["a"]),
            vec![ProbeReport::raw("Detected")],
        )
        .unwrap();
        let board = aggregate(&results, &registry, &selection);

        let first = render(&board);
        assert_eq!(first, render(&board));
        assert_eq!(
            first,
            "Security Feature,x\na,Detected\nL1 score,1/1\nTOTAL score,1/1\n"
        );
    }
}
