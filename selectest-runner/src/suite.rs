// Copyright (c) The selectest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test cases, test entries and the suite builder that decides which entries run.

use crate::test_filter::FilterPolicy;
use camino::{Utf8Path, Utf8PathBuf};
use selectest_metadata::{FilterMatch, SkipReason, Tag, TagMetadata};
use std::error::Error;

/// The result of running a single test body.
pub type TestResult = Result<(), Box<dyn Error + Send + Sync>>;

/// A test body.
pub type TestFn = fn() -> TestResult;

/// Whether a test entry runs, as decided by the [`SuiteBuilder`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Outcome {
    /// The test will be executed.
    #[default]
    Run,

    /// The test will be reported as skipped, for the given reason.
    Skip(SkipReason),
}

impl Outcome {
    /// Returns the skip reason, if the test is skipped.
    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            Self::Run => None,
            Self::Skip(reason) => Some(reason),
        }
    }
}

impl From<FilterMatch> for Outcome {
    fn from(filter_match: FilterMatch) -> Self {
        match filter_match {
            FilterMatch::Matches => Self::Run,
            FilterMatch::Mismatch { reason } => Self::Skip(reason),
        }
    }
}

/// A single named test within a [`TestCase`].
#[derive(Clone, Debug)]
pub struct TestEntry {
    name: String,
    body: TestFn,
    tags: Option<TagMetadata>,
    outcome: Outcome,
}

impl TestEntry {
    /// Creates a new, untagged entry.
    pub fn new(name: impl Into<String>, body: TestFn) -> Self {
        Self {
            name: name.into(),
            body,
            tags: None,
            outcome: Outcome::Run,
        }
    }

    /// Applies a tag to this entry, creating its metadata on first use.
    #[must_use]
    pub fn tag(mut self, tag: Tag) -> Self {
        self.apply_tag(tag);
        self
    }

    fn apply_tag(&mut self, tag: Tag) {
        match &mut self.tags {
            Some(tags) => tags.apply(tag),
            None => self.tags = Some(TagMetadata::from_tag(tag)),
        }
    }

    /// The name of the test.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The test body.
    pub fn body(&self) -> TestFn {
        self.body
    }

    /// The tag metadata, or `None` if the test was never tagged.
    pub fn tags(&self) -> Option<&TagMetadata> {
        self.tags.as_ref()
    }

    /// The outcome recorded for this test.
    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }
}

/// A named group of tests defined in a single source file.
#[derive(Clone, Debug)]
pub struct TestCase {
    name: String,
    source: Utf8PathBuf,
    entries: Vec<TestEntry>,
}

impl TestCase {
    /// Creates an empty test case.
    ///
    /// `source` is the `/`-separated path of the file defining the case, relative to the test
    /// root, for example `unit_tests/package_a/test_a.rs`.
    pub fn new(name: impl Into<String>, source: impl Into<Utf8PathBuf>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            entries: Vec::new(),
        }
    }

    /// Registers an untagged test.
    #[must_use]
    pub fn test(self, name: impl Into<String>, body: TestFn) -> Self {
        self.entry(TestEntry::new(name, body))
    }

    /// Registers a test with a tag.
    #[must_use]
    pub fn tagged_test(self, name: impl Into<String>, tag: Tag, body: TestFn) -> Self {
        self.entry(TestEntry::new(name, body).tag(tag))
    }

    /// Registers an already-constructed entry.
    #[must_use]
    pub fn entry(mut self, entry: TestEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Applies a tag to the registered test called `name`.
    ///
    /// Tagging an unknown name does nothing apart from logging a warning.
    #[must_use]
    pub fn tag(mut self, name: &str, tag: Tag) -> Self {
        match self.entries.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => entry.apply_tag(tag),
            None => {
                tracing::warn!(
                    "test case `{}` has no test named `{name}`, ignoring tag",
                    self.name,
                );
            }
        }
        self
    }

    /// The name of the test case.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The source path of the test case.
    pub fn source(&self) -> &Utf8Path {
        &self.source
    }

    /// The tests in this case, in registration order.
    pub fn entries(&self) -> &[TestEntry] {
        &self.entries
    }

    fn apply_policy(&mut self, policy: &FilterPolicy) {
        for entry in &mut self.entries {
            let filter_match = policy.filter_match(entry.tags.as_ref());
            if let Some(reason) = filter_match.skip_reason() {
                tracing::debug!(
                    "skipping {}::{} at {} stage: {reason}",
                    self.name,
                    entry.name,
                    reason.stage(),
                );
            }
            entry.outcome = filter_match.into();
        }
    }
}

/// Builds a [`Suite`], deciding the [`Outcome`] of every test added to it.
///
/// The builder borrows a single [`FilterPolicy`] for its whole lifetime.
#[derive(Debug)]
pub struct SuiteBuilder<'p> {
    policy: &'p FilterPolicy,
    cases: Vec<TestCase>,
}

impl<'p> SuiteBuilder<'p> {
    /// Creates a new builder for `policy`.
    pub fn new(policy: &'p FilterPolicy) -> Self {
        Self {
            policy,
            cases: Vec::new(),
        }
    }

    /// Decides the outcome of every test in `case`, and adds it to the suite.
    pub fn add_case(&mut self, mut case: TestCase) -> &mut Self {
        case.apply_policy(self.policy);
        self.cases.push(case);
        self
    }

    /// Adds several cases.
    pub fn add_cases(&mut self, cases: impl IntoIterator<Item = TestCase>) -> &mut Self {
        for case in cases {
            self.add_case(case);
        }
        self
    }

    /// Returns the suite.
    pub fn build(self) -> Suite {
        Suite { cases: self.cases }
    }
}

/// A set of test cases whose outcomes have been decided.
#[derive(Clone, Debug, Default)]
pub struct Suite {
    cases: Vec<TestCase>,
}

impl Suite {
    /// The test cases in this suite.
    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    /// Iterates over all tests, along with the case that contains them.
    pub fn iter(&self) -> impl Iterator<Item = (&TestCase, &TestEntry)> + '_ {
        self.cases
            .iter()
            .flat_map(|case| case.entries.iter().map(move |entry| (case, entry)))
    }

    /// The total number of tests.
    pub fn test_count(&self) -> usize {
        self.cases.iter().map(|case| case.entries.len()).sum()
    }

    /// The number of tests that will be skipped.
    pub fn skip_count(&self) -> usize {
        self.iter()
            .filter(|(_, entry)| entry.outcome.skip_reason().is_some())
            .count()
    }

    /// The number of tests that will be run.
    pub fn run_count(&self) -> usize {
        self.test_count() - self.skip_count()
    }
}
