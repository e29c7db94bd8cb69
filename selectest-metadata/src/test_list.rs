// Copyright (c) The selectest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{FilterMatch, TagMetadata};
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Root element for a serializable list of tests, as produced by `selectest list`.
///
/// The list contains every discovered test along with whether it will be run.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TestListSummary {
    /// The total number of tests.
    pub test_count: usize,

    /// The number of tests that will be run.
    pub run_count: usize,

    /// The number of tests that will be skipped.
    pub skip_count: usize,

    /// The test cases, in the order they were loaded.
    pub test_cases: Vec<TestCaseSummary>,
}

/// A test case within a [`TestListSummary`].
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TestCaseSummary {
    /// The name of the test case.
    pub name: String,

    /// The path of the file the test case is defined in, relative to the test root.
    pub source: Utf8PathBuf,

    /// The tests within this case, in registration order.
    pub tests: Vec<TestEntrySummary>,
}

/// A single test within a [`TestCaseSummary`].
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TestEntrySummary {
    /// The name of the test.
    pub name: String,

    /// The tags on this test, or `None` if it was never tagged.
    pub tags: Option<TagMetadata>,

    /// Whether the test matches the filters, and if not, why.
    pub filter_match: FilterMatch,
}
