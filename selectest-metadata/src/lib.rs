// Copyright (c) The selectest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Shared data types for [selectest](https://crates.io/crates/selectest): the tag metadata
//! attached to tests, the reasons a test can be skipped, serializable test lists and documented
//! exit codes.
//!
//! This crate is intentionally small so that test authors can tag tests without depending on the
//! runner.

mod exit_codes;
mod filter_match;
mod tags;
mod test_list;

pub use exit_codes::*;
pub use filter_match::*;
pub use tags::*;
pub use test_list::*;
