// Copyright (c) The selectest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! A tag-driven test selection runner.
//!
//! For documentation and usage, see the `selectest --help` output. This crate is not meant to be
//! used as a library; its API is exposed for the `selectest` binary only.

mod demo_suites;
mod dispatch;
mod errors;
mod output;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
#[doc(hidden)]
pub use output::OutputWriter;
