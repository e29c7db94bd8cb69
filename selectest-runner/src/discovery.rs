// Copyright (c) The selectest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Selecting test cases for requested suites.
//!
//! Test cases are registered up front in a [`TestCatalog`]. A suite named `N` consists of every
//! registered case whose source path lies under the folder `N<suffix>/` and whose file name
//! matches the layout's glob (see [`SuiteLayout`]).

use crate::{errors::SuiteLayoutError, suite::TestCase};
use camino::Utf8Path;
use globset::{Glob, GlobMatcher};
use itertools::Itertools;
use std::collections::BTreeSet;

/// Naming conventions for suite folders and test files.
#[derive(Clone, Debug)]
pub struct SuiteLayout {
    folder_suffix: String,
    file_pattern: String,
    matcher: GlobMatcher,
}

impl SuiteLayout {
    /// The default suffix for suite folders.
    pub const DEFAULT_FOLDER_SUFFIX: &'static str = "_tests";

    /// The default glob for test file names.
    pub const DEFAULT_FILE_PATTERN: &'static str = "test_*.rs";

    /// Creates a new layout, compiling `file_pattern`.
    pub fn new(
        folder_suffix: impl Into<String>,
        file_pattern: impl Into<String>,
    ) -> Result<Self, SuiteLayoutError> {
        let file_pattern = file_pattern.into();
        let matcher = Glob::new(&file_pattern)
            .map_err(|err| SuiteLayoutError::new(&file_pattern, err))?
            .compile_matcher();
        Ok(Self {
            folder_suffix: folder_suffix.into(),
            file_pattern,
            matcher,
        })
    }

    /// The suffix for suite folders.
    pub fn folder_suffix(&self) -> &str {
        &self.folder_suffix
    }

    /// The glob for test file names.
    pub fn file_pattern(&self) -> &str {
        &self.file_pattern
    }

    /// Returns the name of the suite folder `source` lives in, if any.
    ///
    /// This is the first path component, without the folder suffix. The file name is not
    /// checked.
    pub fn suite_folder<'a>(&self, source: &'a Utf8Path) -> Option<&'a str> {
        let mut components = source.components();
        let folder = components.next()?.as_str();
        // A bare file isn't inside any suite folder.
        components.next()?;
        folder
            .strip_suffix(&self.folder_suffix)
            .filter(|name| !name.is_empty())
    }

    /// Returns true if the file name of `source` matches the test file glob.
    pub fn is_test_file(&self, source: &Utf8Path) -> bool {
        source
            .file_name()
            .is_some_and(|file_name| self.matcher.is_match(file_name))
    }

    /// Returns the suite that `source` belongs to, if it is a test file in a suite folder.
    pub fn suite_name<'a>(&self, source: &'a Utf8Path) -> Option<&'a str> {
        self.suite_folder(source).filter(|_| self.is_test_file(source))
    }
}

/// The statically registered test cases available to a run.
#[derive(Clone, Debug, Default)]
pub struct TestCatalog {
    cases: Vec<TestCase>,
}

impl TestCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a test case.
    pub fn register(&mut self, case: TestCase) -> &mut Self {
        self.cases.push(case);
        self
    }

    /// All registered cases, in registration order.
    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    /// The names of all suite folders that contain registered cases in test files.
    ///
    /// A folder whose cases all live in files that don't match the test file glob isn't a suite.
    pub fn suite_folders(&self, layout: &SuiteLayout) -> BTreeSet<String> {
        self.cases
            .iter()
            .filter_map(|case| layout.suite_name(case.source()))
            .map(ToOwned::to_owned)
            .collect()
    }

    /// Selects the cases of the requested suites.
    ///
    /// Requested suites that don't exist are reported as warnings and otherwise ignored.
    /// Duplicate requests are only loaded once.
    pub fn discover<S: AsRef<str>>(
        &self,
        layout: &SuiteLayout,
        requested: &[S],
    ) -> Vec<DiscoveredSuite> {
        let folders = self.suite_folders(layout);
        tracing::debug!(
            "found suite folders: {}",
            folders
                .iter()
                .map(|name| format!("{name}{}", layout.folder_suffix))
                .join(", ")
        );

        let requested: Vec<&str> = requested.iter().map(|name| name.as_ref()).unique().collect();
        tracing::debug!("requested suites: {}", requested.iter().join(", "));

        let missing: Vec<&str> = requested
            .iter()
            .copied()
            .filter(|name| !folders.contains(*name))
            .collect();
        if !missing.is_empty() {
            tracing::warn!(
                "requested suites not found: {} (available: {})",
                missing.iter().join(", "),
                folders.iter().join(", "),
            );
        }
        for folder in folders.iter().filter(|name| !requested.contains(&name.as_str())) {
            tracing::debug!("suite `{folder}` not requested, skipping");
        }

        requested
            .into_iter()
            .filter(|name| folders.contains(*name))
            .map(|name| {
                let cases: Vec<_> = self
                    .cases
                    .iter()
                    .filter(|case| layout.suite_name(case.source()) == Some(name))
                    .cloned()
                    .collect();
                let suite = DiscoveredSuite {
                    name: name.to_owned(),
                    cases,
                };
                tracing::info!(
                    "loaded suite `{}`: {} test cases, {} tests",
                    suite.name,
                    suite.cases.len(),
                    suite.test_count(),
                );
                suite
            })
            .collect()
    }
}

/// The cases selected for one requested suite.
#[derive(Clone, Debug)]
pub struct DiscoveredSuite {
    name: String,
    cases: Vec<TestCase>,
}

impl DiscoveredSuite {
    /// The name of the suite.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The selected cases.
    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    /// Consumes self, returning the selected cases.
    pub fn into_cases(self) -> Vec<TestCase> {
        self.cases
    }

    /// The total number of tests in the selected cases.
    pub fn test_count(&self) -> usize {
        self.cases.iter().map(|case| case.entries().len()).sum()
    }
}
