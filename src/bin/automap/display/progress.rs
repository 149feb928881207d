use std::io::{self, Write};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Spinner that walks through a fixed number of pipeline steps on stderr.
pub struct StepSpinner {
    bar: Option<ProgressBar>,
    start: Instant,
    step_start: Instant,
    step: u8,
    total_steps: u8,
}

impl StepSpinner {
    fn new(total_steps: u8) -> Self {
        let now = Instant::now();
        Self {
            bar: None,
            start: now,
            step_start: now,
            step: 0,
            total_steps,
        }
    }

    fn clear(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }

    fn step(&mut self, description: &str) {
        self.clear();
        self.step += 1;
        self.step_start = Instant::now();

        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner:.cyan} {msg}") {
            bar.set_style(style.tick_chars(TICK_CHARS));
        }
        bar.enable_steady_tick(Duration::from_millis(80));
        bar.set_message(format!(
            "[{}/{}] {description}...",
            self.step, self.total_steps
        ));
        self.bar = Some(bar);
    }

    fn complete_step(&mut self, description: &str, details: &[String]) {
        self.clear();

        let elapsed = self.step_start.elapsed();
        let mut stderr = io::stderr().lock();
        let _ = writeln!(
            stderr,
            "  \x1b[32m✓\x1b[0m {:<44} {:>5.1}s",
            description,
            elapsed.as_secs_f64()
        );
        for detail in details {
            let _ = writeln!(stderr, "      \x1b[2m·\x1b[0m {detail}");
        }
    }

    fn finish(mut self, label: &str, advisories: usize) {
        self.clear();

        let mut stderr = io::stderr().lock();
        let total = format!("Total: {:.2}s", self.start.elapsed().as_secs_f64());
        let _ = writeln!(stderr);
        let _ = writeln!(
            stderr,
            "  \x1b[2m╺━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━╸\x1b[0m"
        );
        let _ = writeln!(stderr);
        if advisories == 0 {
            let _ = writeln!(stderr, "  \x1b[32m✓\x1b[0m {label:<36} {total:>13}");
        } else {
            let label = format!("{label} ({advisories} advisories)");
            let _ = writeln!(stderr, "  \x1b[33m!\x1b[0m {label:<36} {total:>13}");
        }
        let _ = writeln!(stderr);
    }
}

/// Step reporting that is either drawn on a terminal or discarded.
pub enum Progress {
    Interactive(StepSpinner),
    Silent,
}

impl Progress {
    pub fn new(interactive: bool, total_steps: u8) -> Self {
        if interactive {
            Self::Interactive(StepSpinner::new(total_steps))
        } else {
            Self::Silent
        }
    }

    pub fn step(&mut self, description: &str) {
        if let Self::Interactive(spinner) = self {
            spinner.step(description);
        }
    }

    pub fn complete_step(&mut self, description: &str, details: &[String]) {
        if let Self::Interactive(spinner) = self {
            spinner.complete_step(description, details);
        }
    }

    /// Prints the closing footer, flagging runs that raised advisories.
    pub fn finish(self, label: &str, advisories: usize) {
        if let Self::Interactive(spinner) = self {
            spinner.finish(label, advisories);
        }
    }
}
