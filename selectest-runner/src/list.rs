// Copyright (c) The selectest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Listing the tests in a suite without running them.

use crate::{
    errors::WriteTestListError,
    suite::{Outcome, Suite, TestEntry},
};
use itertools::Itertools;
use owo_colors::{OwoColorize, Style};
use selectest_metadata::{FilterMatch, TestCaseSummary, TestEntrySummary, TestListSummary};
use serde::Serialize;
use std::io::{self, Write};

/// Output formats for selectest.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputFormat {
    /// A human-readable output format.
    Human {
        /// Whether to produce verbose output.
        verbose: bool,
    },

    /// Machine-readable output format.
    Serializable(SerializableFormat),
}

/// A serialized, machine-readable output format.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SerializableFormat {
    /// JSON with no whitespace.
    Json,
    /// JSON, prettified.
    JsonPretty,
}

impl SerializableFormat {
    /// Write this data in the given format to the writer.
    pub fn to_writer(
        self,
        value: &impl Serialize,
        writer: impl io::Write,
    ) -> serde_json::Result<()> {
        match self {
            SerializableFormat::Json => serde_json::to_writer(writer, value),
            SerializableFormat::JsonPretty => serde_json::to_writer_pretty(writer, value),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Styles {
    pub(crate) case_name: Style,
    pub(crate) test_name: Style,
    pub(crate) source: Style,
    pub(crate) field: Style,
    pub(crate) skip: Style,
}

impl Styles {
    pub(crate) fn colorize(&mut self) {
        self.case_name = Style::new().magenta().bold();
        self.test_name = Style::new().blue().bold();
        self.source = Style::new().cyan();
        self.field = Style::new().yellow().bold();
        self.skip = Style::new().yellow();
    }
}

impl Suite {
    /// Returns a serializable summary of this suite.
    pub fn to_summary(&self) -> TestListSummary {
        let test_cases = self
            .cases()
            .iter()
            .map(|case| TestCaseSummary {
                name: case.name().to_owned(),
                source: case.source().to_owned(),
                tests: case.entries().iter().map(entry_summary).collect(),
            })
            .collect();

        TestListSummary {
            test_count: self.test_count(),
            run_count: self.run_count(),
            skip_count: self.skip_count(),
            test_cases,
        }
    }

    /// Outputs the list of tests and their outcomes to the given writer.
    pub fn write(
        &self,
        output_format: OutputFormat,
        writer: impl Write,
        colorize: bool,
    ) -> Result<(), WriteTestListError> {
        match output_format {
            OutputFormat::Human { verbose } => self
                .write_human(writer, verbose, colorize)
                .map_err(WriteTestListError::Io),
            OutputFormat::Serializable(format) => format
                .to_writer(&self.to_summary(), writer)
                .map_err(WriteTestListError::Json),
        }
    }

    fn write_human(&self, mut writer: impl Write, verbose: bool, colorize: bool) -> io::Result<()> {
        let mut styles = Styles::default();
        if colorize {
            styles.colorize();
        }

        for case in self.cases() {
            writeln!(
                writer,
                "{} ({}):",
                case.name().style(styles.case_name),
                case.source().style(styles.source),
            )?;

            if case.entries().is_empty() {
                writeln!(writer, "    (no tests)")?;
                continue;
            }

            for entry in case.entries() {
                write!(writer, "    {}", entry.name().style(styles.test_name))?;
                if let Outcome::Skip(reason) = entry.outcome() {
                    let reason = format!("(skipped: {reason})");
                    write!(writer, " {}", reason.style(styles.skip))?;
                }
                writeln!(writer)?;

                if verbose && let Some(tags) = entry.tags() {
                    let product = tags.product().map_or("shared".to_owned(), |p| p.to_string());
                    let priority = tags
                        .priority()
                        .map_or("none".to_owned(), |p| p.to_string());
                    writeln!(
                        writer,
                        "        {} {product}, {} {priority}, {} {}",
                        "product:".style(styles.field),
                        "priority:".style(styles.field),
                        "categories:".style(styles.field),
                        tags.categories().iter().join(", "),
                    )?;
                }
            }
        }

        writeln!(
            writer,
            "{} tests, {} to run, {} skipped",
            self.test_count(),
            self.run_count(),
            self.skip_count(),
        )
    }
}

fn entry_summary(entry: &TestEntry) -> TestEntrySummary {
    let filter_match = match entry.outcome() {
        Outcome::Run => FilterMatch::Matches,
        Outcome::Skip(reason) => FilterMatch::Mismatch {
            reason: reason.clone(),
        },
    };
    TestEntrySummary {
        name: entry.name().to_owned(),
        tags: entry.tags().cloned(),
        filter_match,
    }
}
