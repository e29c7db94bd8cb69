// Copyright (c) The selectest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Documented exit codes for `selectest` failures.
///
/// `selectest` runs may fail for a variety of reasons. This structure documents the exit codes
/// that may occur in case of expected failures.
///
/// Unknown/unexpected failures will always result in exit code 1.
pub enum SelectestExitCode {}

impl SelectestExitCode {
    /// No errors occurred and selectest exited normally.
    pub const OK: i32 = 0;

    /// No tests were selected to run, but no other errors occurred.
    ///
    /// This is also returned if every discovered test was skipped by the filters.
    pub const NO_TESTS_RUN: i32 = 4;

    /// One or more tests failed.
    pub const TEST_RUN_FAILED: i32 = 100;

    /// Writing data to stdout or stderr produced an error.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;

    /// A user issue happened while setting up a selectest invocation.
    ///
    /// This covers configuration errors such as conflicting category filters, unknown products,
    /// unknown profiles and invalid config files.
    pub const SETUP_ERROR: i32 = 96;
}
