//! Run progress display.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use super::theme::DsommTheme;
use super::ProgressHandle;

const BAR_TEMPLATE: &str = "{spinner:.magenta} [{bar:24.magenta/dim}] {pos}/{len} {msg}";

/// Progress bar over (repository, check) pairs.
pub struct RunProgressBar {
    bar: ProgressBar,
}

impl RunProgressBar {
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        let style = ProgressStyle::with_template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// A bar that draws nothing.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }
}

impl ProgressHandle for RunProgressBar {
    fn advance(&mut self, msg: &str) {
        self.bar.set_message(msg.to_string());
        self.bar.inc(1);
    }

    fn println(&mut self, line: &str) {
        self.bar.println(line);
    }

    fn finish(&mut self, msg: &str) {
        let theme = DsommTheme::new();
        self.bar.finish_and_clear();
        if !self.bar.is_hidden() && !msg.is_empty() {
            println!("{}", theme.format_success(msg));
        }
    }
}

/// Format a duration the way status lines show it ("850ms", "4.2s", "2m 5s").
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        return format!("{}ms", millis);
    }
    let secs = duration.as_secs();
    if secs < 60 {
        return format!("{:.1}s", duration.as_secs_f64());
    }
    format!("{}m {}s", secs / 60, secs % 60)
}
