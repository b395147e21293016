//! Box-drawn grid output.

use std::io::Write;

use console::measure_text_width;

use super::{level_score_label, ScoreFormatter, FEATURE_HEADER, TOTAL_SCORE_LABEL};
use crate::score::Scoreboard;

/// A grid of text cells with optional separator lines between rows.
#[derive(Debug)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Row>,
    column_widths: Vec<usize>,
}

#[derive(Debug)]
enum Row {
    Cells(Vec<String>),
    Separator,
}

impl Table {
    pub fn new<S: AsRef<str>>(headers: &[S]) -> Self {
        let headers: Vec<String> = headers.iter().map(|s| s.as_ref().to_string()).collect();
        let column_widths = headers.iter().map(|h| measure_text_width(h)).collect();

        Self {
            headers,
            rows: Vec::new(),
            column_widths,
        }
    }

    pub fn add_row<S: AsRef<str>>(&mut self, row: &[S]) {
        let row: Vec<String> = row.iter().map(|s| s.as_ref().to_string()).collect();

        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = self.column_widths.get_mut(i) {
                *width = (*width).max(measure_text_width(cell));
            }
        }

        self.rows.push(Row::Cells(row));
    }

    /// Draw a horizontal rule before the next row.
    pub fn add_separator(&mut self) {
        if !self.rows.is_empty() {
            self.rows.push(Row::Separator);
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| matches!(r, Row::Cells(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    pub fn render(&self) -> String {
        let mut output = String::new();

        output.push_str(&self.render_border('┌', '┬', '┐'));
        output.push('\n');
        output.push_str(&self.render_row(&self.headers));
        output.push('\n');
        output.push_str(&self.render_border('╞', '╪', '╡'));
        output.push('\n');

        for row in &self.rows {
            match row {
                Row::Cells(cells) => output.push_str(&self.render_row(cells)),
                Row::Separator => output.push_str(&self.render_border('├', '┼', '┤')),
            }
            output.push('\n');
        }

        output.push_str(&self.render_border('└', '┴', '┘'));
        output
    }

    fn render_border(&self, left: char, mid: char, right: char) -> String {
        let fill = if left == '╞' { "═" } else { "─" };
        let segments: Vec<String> = self
            .column_widths
            .iter()
            .map(|width| fill.repeat(width + 2))
            .collect();
        format!("{}{}{}", left, segments.join(mid.to_string().as_str()), right)
    }

    fn render_row(&self, row: &[String]) -> String {
        let mut s = String::from("│");

        for (i, width) in self.column_widths.iter().enumerate() {
            let cell = row.get(i).map(String::as_str).unwrap_or("");
            let pad = width.saturating_sub(measure_text_width(cell));
            s.push(' ');
            s.push_str(cell);
            s.push_str(&" ".repeat(pad));
            s.push_str(" │");
        }

        s
    }
}

/// Grid view of a scoreboard.
pub struct TableFormatter;

impl TableFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Lay the scoreboard out as a [`Table`].
    pub fn build(board: &Scoreboard) -> Table {
        let mut headers = vec![FEATURE_HEADER.to_string()];
        headers.extend(board.repos.iter().cloned());
        let mut table = Table::new(&headers);

        for section in &board.levels {
            for row in &section.rows {
                let mut cells = vec![row.check.clone()];
                cells.extend(row.reports.iter().map(|r| r.detail.clone()));
                table.add_row(&cells);
            }
            let mut cells = vec![level_score_label(&section.level)];
            cells.extend(section.scores.iter().map(ToString::to_string));
            table.add_row(&cells);
            table.add_separator();
        }

        let mut cells = vec![TOTAL_SCORE_LABEL.to_string()];
        cells.extend(board.total.iter().map(ToString::to_string));
        table.add_row(&cells);
        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreFormatter for TableFormatter {
    fn format<W: Write>(&self, board: &Scoreboard, writer: &mut W) -> std::io::Result<()> {
        writeln!(writer, "{}", Self::build(board).render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probes::ProbeReport;
    use crate::score::{CheckRow, LevelSection, ScoreCell};

    fn board() -> Scoreboard {
        Scoreboard {
            repos: vec!["acme/api".to_string()],
            levels: vec![LevelSection {
                level: "LEVEL1".to_string(),
                rows: vec![CheckRow {
                    check: "l1_2_versioning".to_string(),
                    supported: true,
                    reports: vec![ProbeReport::success("Detected (file: package.json)")],
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
    fn table_empty() {
        let table = Table::new(&["A", "B"]);
        assert!(table.is_empty());

        let output = table.render();
        assert!(output.contains("A"));
        assert!(output.contains("B"));
    }

    #[test]
    fn separators_are_not_rows() {
        let mut table = Table::new(&["A"]);
        table.add_separator();
        table.add_row(&["one"]);
        table.add_separator();
        table.add_row(&["two"]);

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.render().matches('├').count(), 1);
    }

    #[test]
    fn columns_align_on_display_width() {
        let mut table = Table::new(&["Name"]);
        table.add_row(&["héllo wörld"]);

        let output = table.render();
        let widths: Vec<usize> = output.lines().map(measure_text_width).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn scoreboard_grid_has_score_rows() {
        let mut out = Vec::new();
        TableFormatter::new().format(&board(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Security Feature"));
        assert!(text.contains("acme/api"));
        assert!(text.contains("Detected (file: package.json)"));
        assert!(text.contains("LEVEL1 score"));
        assert!(text.contains("TOTAL score"));
        assert!(text.contains("1/1"));
    }
}
