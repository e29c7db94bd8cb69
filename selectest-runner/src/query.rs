// Copyright (c) The selectest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Extracting suite, priority and category metadata from the test catalog.

use crate::{
    discovery::{DiscoveredSuite, SuiteLayout, TestCatalog},
    errors::WriteTestListError,
    list::{OutputFormat, Styles},
};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::{collections::BTreeSet, fmt, io};

/// The kind of metadata to query.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum QueryKind {
    /// The names of all suites in the catalog.
    Suites,

    /// The distinct priorities of tests in the requested suites.
    Priorities,

    /// The distinct categories of tests in the requested suites.
    Categories,
}

/// The result of a metadata query.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "query")]
pub enum QueryResult {
    /// Suite names.
    Suites {
        /// The names of all suites found in the catalog.
        suites: BTreeSet<String>,
    },

    /// Priorities.
    Priorities {
        /// The distinct priorities assigned to tests.
        priorities: BTreeSet<i32>,
    },

    /// Categories.
    Categories {
        /// The distinct categories assigned to tests.
        categories: BTreeSet<String>,
    },
}

impl QueryResult {
    /// Runs a query.
    ///
    /// Suite queries consider the whole catalog. Priority and category queries only consider the
    /// tests of `suites`, regardless of any filters.
    pub fn new(
        kind: QueryKind,
        catalog: &TestCatalog,
        layout: &SuiteLayout,
        suites: &[DiscoveredSuite],
    ) -> Self {
        let tags = || {
            suites
                .iter()
                .flat_map(|suite| suite.cases())
                .flat_map(|case| case.entries())
                .filter_map(|entry| entry.tags())
        };

        match kind {
            QueryKind::Suites => Self::Suites {
                suites: catalog.suite_folders(layout),
            },
            QueryKind::Priorities => Self::Priorities {
                priorities: tags().filter_map(|tags| tags.priority()).collect(),
            },
            QueryKind::Categories => Self::Categories {
                categories: tags()
                    .flat_map(|tags| tags.categories().iter().cloned())
                    .collect(),
            },
        }
    }

    /// Writes this result to the given writer.
    pub fn write(
        &self,
        output_format: OutputFormat,
        writer: impl io::Write,
        colorize: bool,
    ) -> Result<(), WriteTestListError> {
        match output_format {
            OutputFormat::Human { .. } => self
                .write_human(writer, colorize)
                .map_err(WriteTestListError::Io),
            OutputFormat::Serializable(format) => {
                format.to_writer(self, writer).map_err(WriteTestListError::Json)
            }
        }
    }

    fn write_human(&self, mut writer: impl io::Write, colorize: bool) -> io::Result<()> {
        let mut styles = Styles::default();
        if colorize {
            styles.colorize();
        }

        match self {
            Self::Suites { suites } => write_values(&mut writer, suites, &styles),
            Self::Priorities { priorities } => write_values(&mut writer, priorities, &styles),
            Self::Categories { categories } => write_values(&mut writer, categories, &styles),
        }
    }
}

fn write_values<T: fmt::Display>(
    writer: &mut impl io::Write,
    values: &BTreeSet<T>,
    styles: &Styles,
) -> io::Result<()> {
    if values.is_empty() {
        writeln!(writer, "(none)")?;
    }
    for value in values {
        writeln!(writer, "{}", value.style(styles.test_name))?;
    }
    Ok(())
}
