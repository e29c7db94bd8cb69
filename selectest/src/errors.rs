// Copyright (c) The selectest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::output::{NO_HEADING_TARGET, StderrStyles};
use owo_colors::OwoColorize;
use selectest_metadata::SelectestExitCode;
use selectest_runner::errors::*;
use std::error::Error;
use thiserror::Error;

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

// The #[error()] strings are placeholders: errors are printed with display_to_stderr, which
// colorizes them.

/// An expected error that causes selectest to exit with a nonzero code.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("config parse error")]
    ConfigParseError {
        #[from]
        err: ConfigParseError,
    },
    #[error("profile not found")]
    ProfileNotFound {
        #[from]
        err: ProfileNotFound,
    },
    #[error("filter policy build error")]
    FilterPolicyBuildError {
        #[from]
        err: FilterPolicyBuildError,
    },
    #[error("suite layout error")]
    SuiteLayoutError {
        #[from]
        err: SuiteLayoutError,
    },
    #[error("error writing test list")]
    WriteTestListError {
        #[from]
        err: WriteTestListError,
    },
    #[error("error writing event")]
    WriteEventError {
        #[from]
        err: WriteEventError,
    },
    #[error("test run failed")]
    TestRunFailed { failed: usize },
    #[error("no tests to run")]
    NoTestsRun { skipped: usize },
}

impl ExpectedError {
    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::ConfigParseError { .. }
            | Self::ProfileNotFound { .. }
            | Self::FilterPolicyBuildError { .. }
            | Self::SuiteLayoutError { .. } => SelectestExitCode::SETUP_ERROR,
            Self::WriteTestListError { .. } | Self::WriteEventError { .. } => {
                SelectestExitCode::WRITE_OUTPUT_ERROR
            }
            Self::TestRunFailed { .. } => SelectestExitCode::TEST_RUN_FAILED,
            Self::NoTestsRun { .. } => SelectestExitCode::NO_TESTS_RUN,
        }
    }

    /// Displays this error to stderr, followed by its chain of causes.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match self {
            Self::ConfigParseError { err } => {
                tracing::error!(
                    "failed to parse selectest config at `{}`",
                    err.config_file().style(styles.bold)
                );
                err.source()
            }
            Self::ProfileNotFound { err } => {
                tracing::error!("{err}");
                err.source()
            }
            Self::FilterPolicyBuildError { err } => {
                tracing::error!("failed to resolve test filters");
                Some(err as &dyn Error)
            }
            Self::SuiteLayoutError { err } => {
                tracing::error!("{err}");
                err.source()
            }
            Self::WriteTestListError { err } => {
                tracing::error!("failed to write test list to output");
                Some(err as &dyn Error)
            }
            Self::WriteEventError { err } => {
                tracing::error!("failed to write event to output");
                Some(err as &dyn Error)
            }
            Self::TestRunFailed { failed } => {
                tracing::error!(
                    "test run failed: {} {} failed",
                    failed.style(styles.bold),
                    plural(*failed),
                );
                None
            }
            Self::NoTestsRun { skipped } => {
                tracing::error!(
                    "no tests to run ({} {} skipped)",
                    skipped.style(styles.warning_text),
                    plural(*skipped),
                );
                None
            }
        };

        while let Some(err) = next_error {
            tracing::error!(target: NO_HEADING_TARGET, "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "test" } else { "tests" }
}
