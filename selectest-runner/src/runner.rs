// Copyright (c) The selectest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Executing the tests in a [`Suite`].
//!
//! Tests run sequentially on the current thread. A test body that panics is reported as a
//! failure, and doesn't stop the run.

use crate::suite::{Outcome, Suite, TestCase, TestEntry};
use selectest_metadata::SkipReason;
use std::{
    any::Any,
    convert::Infallible,
    fmt,
    panic::{self, AssertUnwindSafe},
    time::{Duration, Instant},
};

/// Executes the tests in a suite.
#[derive(Clone, Debug)]
pub struct TestRunner<'a> {
    suite: &'a Suite,
}

impl<'a> TestRunner<'a> {
    /// Creates a new runner for `suite`.
    pub fn new(suite: &'a Suite) -> Self {
        Self { suite }
    }

    /// Executes the tests.
    ///
    /// The callback is called with the results of each test.
    pub fn execute<F>(&self, mut callback: F) -> RunStats
    where
        F: FnMut(TestEvent<'a>),
    {
        let res = self.try_execute::<Infallible, _>(|test_event| {
            callback(test_event);
            Ok(())
        });
        match res {
            Ok(run_stats) => run_stats,
            Err(never) => match never {},
        }
    }

    /// Executes the tests.
    ///
    /// Accepts a callback that is called with the results of each test. If the callback returns an
    /// error, the run is stopped and the error is returned.
    pub fn try_execute<E, F>(&self, mut callback: F) -> Result<RunStats, E>
    where
        F: FnMut(TestEvent<'a>) -> Result<(), E>,
    {
        let start_time = Instant::now();
        let mut run_stats = RunStats {
            initial_run_count: self.suite.run_count(),
            ..RunStats::default()
        };

        callback(TestEvent::RunStarted { suite: self.suite })?;

        for (case, entry) in self.suite.iter() {
            match entry.outcome() {
                Outcome::Skip(reason) => {
                    run_stats.skipped += 1;
                    callback(TestEvent::TestSkipped {
                        case,
                        entry,
                        reason,
                    })?;
                }
                Outcome::Run => {
                    let run_status = run_test(entry);
                    run_stats.final_run_count += 1;
                    if run_status.status.is_success() {
                        run_stats.passed += 1;
                    } else {
                        run_stats.failed += 1;
                    }
                    callback(TestEvent::TestFinished {
                        case,
                        entry,
                        run_status,
                    })?;
                }
            }
        }

        callback(TestEvent::RunFinished {
            start_time,
            run_stats,
        })?;

        Ok(run_stats)
    }
}

fn run_test(entry: &TestEntry) -> TestRunStatus {
    let start_time = Instant::now();
    let body = entry.body();
    tracing::trace!("running {}", entry.name());

    let status = match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(Ok(())) => TestStatus::Pass,
        Ok(Err(error)) => TestStatus::Fail {
            message: error.to_string(),
        },
        Err(payload) => TestStatus::Panic {
            message: panic_message(payload.as_ref()),
        },
    };

    TestRunStatus {
        status,
        time_taken: start_time.elapsed(),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "(non-string panic payload)".to_owned()
    }
}

/// Information about a test that finished running.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TestRunStatus {
    /// The status of the test.
    pub status: TestStatus,

    /// The time the test took to run.
    pub time_taken: Duration,
}

/// The final status of a test that was run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TestStatus {
    /// The test returned `Ok`.
    Pass,

    /// The test returned an error.
    Fail {
        /// The error message.
        message: String,
    },

    /// The test panicked.
    Panic {
        /// The panic message.
        message: String,
    },
}

impl TestStatus {
    /// Returns true if the test passed.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// The failure message, if the test failed.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Pass => None,
            Self::Fail { message } | Self::Panic { message } => Some(message),
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Pad so that alignment specifiers are respected.
        match self {
            Self::Pass => f.pad("PASS"),
            Self::Fail { .. } => f.pad("FAIL"),
            Self::Panic { .. } => f.pad("PANIC"),
        }
    }
}

/// Statistics for a test run.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct RunStats {
    /// The number of tests that were expected to be run at the beginning.
    pub initial_run_count: usize,

    /// The number of tests that were actually run.
    pub final_run_count: usize,

    /// The number of tests that passed.
    pub passed: usize,

    /// The number of tests that failed or panicked.
    pub failed: usize,

    /// The number of tests that were skipped.
    pub skipped: usize,
}

impl RunStats {
    /// Returns true if no tests failed.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// A test event.
///
/// Events are produced by a [`TestRunner`] and consumed by a
/// [`TestReporter`](crate::reporter::TestReporter).
#[derive(Clone, Debug)]
pub enum TestEvent<'a> {
    /// The test run started.
    RunStarted {
        /// The suite that will be run.
        suite: &'a Suite,
    },

    /// A test finished running.
    TestFinished {
        /// The case the test belongs to.
        case: &'a TestCase,

        /// The test.
        entry: &'a TestEntry,

        /// The result of running the test.
        run_status: TestRunStatus,
    },

    /// A test was skipped.
    TestSkipped {
        /// The case the test belongs to.
        case: &'a TestCase,

        /// The test.
        entry: &'a TestEntry,

        /// The reason the test was skipped.
        reason: &'a SkipReason,
    },

    /// The test run finished.
    RunFinished {
        /// The time at which the run was started.
        start_time: Instant,

        /// Statistics for the run.
        run_stats: RunStats,
    },
}
