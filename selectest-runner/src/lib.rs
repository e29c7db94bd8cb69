// Copyright (c) The selectest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core functionality for [selectest](https://crates.io/crates/selectest). The `selectest` binary
//! uses this crate, but it may be used directly by other test runners.
//!
//! The main entry points are:
//!
//! * [`test_filter::FilterPolicyBuilder`], which resolves run configuration into a
//!   [`FilterPolicy`](test_filter::FilterPolicy).
//! * [`suite::SuiteBuilder`], which decides whether each test runs or is skipped.
//! * [`runner::TestRunner`], which executes a built suite.

pub mod config;
pub mod discovery;
pub mod errors;
pub mod list;
pub mod query;
pub mod reporter;
pub mod runner;
pub mod suite;
pub mod test_filter;
