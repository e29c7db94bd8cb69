// Copyright (c) The selectest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reporting test events in a human-readable format.

use crate::{
    errors::WriteEventError,
    runner::{RunStats, TestEvent},
    suite::{Suite, TestCase, TestEntry},
};
use owo_colors::{OwoColorize, Style};
use std::io::Write;

/// Functionality to report test results to a writer.
#[derive(Debug)]
pub struct TestReporter {
    styles: Styles,
    case_name_width: usize,
}

impl TestReporter {
    /// Creates a new reporter for `suite`.
    pub fn new(suite: &Suite, colorize: bool) -> Self {
        let mut styles = Styles::default();
        if colorize {
            styles.colorize();
        }
        let case_name_width = suite
            .cases()
            .iter()
            .map(|case| case.name().len())
            .max()
            .unwrap_or_default();
        Self {
            styles,
            case_name_width,
        }
    }

    /// Report a test event to the given writer.
    pub fn report_event(
        &self,
        event: &TestEvent<'_>,
        mut writer: impl Write,
    ) -> Result<(), WriteEventError> {
        self.write_event(event, &mut writer)?;
        writer.flush()?;
        Ok(())
    }

    fn write_event(&self, event: &TestEvent<'_>, writer: &mut impl Write) -> std::io::Result<()> {
        match event {
            TestEvent::RunStarted { suite } => {
                let starting = format!("{:>12}", "Starting");
                write!(writer, "{} ", starting.style(self.styles.pass))?;
                write!(
                    writer,
                    "{} tests across {} test cases",
                    suite.run_count().style(self.styles.count),
                    suite.cases().len().style(self.styles.count),
                )?;

                let skip_count = suite.skip_count();
                if skip_count > 0 {
                    write!(writer, " ({} skipped)", skip_count.style(self.styles.count))?;
                }
                writeln!(writer)?;
            }
            TestEvent::TestFinished {
                case,
                entry,
                run_status,
            } => {
                let status_style = if run_status.status.is_success() {
                    self.styles.pass
                } else {
                    self.styles.fail
                };
                // Format the status first so that the width is applied to the text, not to the
                // escape codes.
                let status = format!("{:>12}", run_status.status);
                write!(writer, "{} ", status.style(status_style))?;

                // * > means right-align.
                // * 8 is the number of characters to pad to.
                // * .3 means print three digits after the decimal point.
                write!(writer, "[{:>8.3?}s] ", run_status.time_taken.as_secs_f64())?;

                self.write_instance(case, entry, writer)?;
                writeln!(writer)?;

                if let Some(message) = run_status.status.message() {
                    write!(writer, "\n{}", "--- ERROR: ".style(self.styles.fail))?;
                    self.write_instance(case, entry, writer)?;
                    writeln!(writer, "{}", " ---".style(self.styles.fail))?;
                    writeln!(writer, "{}", message.style(self.styles.fail_output))?;
                    writeln!(writer)?;
                }
            }
            TestEvent::TestSkipped {
                case,
                entry,
                reason,
            } => {
                let skip = format!("{:>12}", "SKIP");
                write!(writer, "{} ", skip.style(self.styles.skip))?;
                // same spacing [   0.034s]
                write!(writer, "[         ] ")?;

                self.write_instance(case, entry, writer)?;
                let reason = format!("({reason})");
                writeln!(writer, " {}", reason.style(self.styles.skip_reason))?;
            }
            TestEvent::RunFinished {
                start_time,
                run_stats:
                    RunStats {
                        initial_run_count,
                        final_run_count,
                        passed,
                        failed,
                        skipped,
                    },
            } => {
                let summary_style = if *failed > 0 {
                    self.styles.fail
                } else {
                    self.styles.pass
                };
                let summary = format!("{:>12}", "Summary");
                write!(writer, "{} ", summary.style(summary_style))?;

                write!(writer, "[{:>8.3?}s] ", start_time.elapsed().as_secs_f64())?;

                write!(writer, "{}", final_run_count.style(self.styles.count))?;
                if final_run_count != initial_run_count {
                    write!(writer, "/{}", initial_run_count.style(self.styles.count))?;
                }
                write!(
                    writer,
                    " tests run: {} {}, ",
                    passed.style(self.styles.count),
                    "passed".style(self.styles.pass),
                )?;

                if *failed > 0 {
                    write!(
                        writer,
                        "{} {}, ",
                        failed.style(self.styles.count),
                        "failed".style(self.styles.fail),
                    )?;
                }

                writeln!(
                    writer,
                    "{} {}",
                    skipped.style(self.styles.count),
                    "skipped".style(self.styles.skip),
                )?;
            }
        }
        Ok(())
    }

    fn write_instance(
        &self,
        case: &TestCase,
        entry: &TestEntry,
        writer: &mut impl Write,
    ) -> std::io::Result<()> {
        let case_name = format!("{:>width$}", case.name(), width = self.case_name_width);
        write!(
            writer,
            "{}  {}",
            case_name.style(self.styles.case_name),
            entry.name().style(self.styles.test_name),
        )
    }
}

#[derive(Clone, Debug, Default)]
struct Styles {
    count: Style,
    pass: Style,
    fail: Style,
    fail_output: Style,
    skip: Style,
    skip_reason: Style,
    case_name: Style,
    test_name: Style,
}

impl Styles {
    fn colorize(&mut self) {
        self.count = Style::new().bold();
        self.pass = Style::new().green().bold();
        self.fail = Style::new().red().bold();
        self.fail_output = Style::new().red();
        self.skip = Style::new().yellow().bold();
        self.skip_reason = Style::new().yellow();
        self.case_name = Style::new().magenta().bold();
        self.test_name = Style::new().blue().bold();
    }
}
