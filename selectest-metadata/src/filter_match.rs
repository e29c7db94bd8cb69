// Copyright (c) The selectest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::ProductId;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt};

/// An enum describing whether a test matches the filters of a run.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", tag = "status")]
pub enum FilterMatch {
    /// This test matches the filters and will be run.
    Matches,

    /// This test does not match the filters and will be skipped.
    Mismatch {
        /// The reason this test was skipped.
        reason: SkipReason,
    },
}

impl FilterMatch {
    /// Returns the skip reason, if the filters did not match.
    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            Self::Matches => None,
            Self::Mismatch { reason } => Some(reason),
        }
    }
}

impl From<Option<SkipReason>> for FilterMatch {
    fn from(reason: Option<SkipReason>) -> Self {
        match reason {
            Some(reason) => Self::Mismatch { reason },
            None => Self::Matches,
        }
    }
}

/// The reason a test was skipped.
///
/// Each variant carries the data needed to format it, so reasons can be compared in tests and
/// rendered consistently in reports.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum SkipReason {
    /// The test is product-specific, but no target product was requested.
    ProductSpecific {
        /// The product the test is specific to.
        found: ProductId,
    },

    /// The test is shared, and shared tests were excluded from this run.
    SharedExcluded,

    /// The test is specific to a product other than the target product.
    ProductMismatch {
        /// The product the test is specific to.
        found: ProductId,
    },

    /// Priority filtering is active, but the test has no (or a negative) priority.
    PriorityUndefined,

    /// The test's priority number is higher (less important) than the requested floor.
    PriorityBelowThreshold {
        /// The priority the test was tagged with.
        found: i32,
    },

    /// The test is in one or more excluded categories.
    CategoryExcluded {
        /// The excluded categories the test was tagged with.
        matched: BTreeSet<String>,
    },

    /// The test is in none of the included categories.
    CategoryNotIncluded,
}

impl SkipReason {
    /// Returns the filter stage that produced this reason.
    pub fn stage(&self) -> FilterStage {
        match self {
            Self::ProductSpecific { .. } | Self::SharedExcluded | Self::ProductMismatch { .. } => {
                FilterStage::Product
            }
            Self::PriorityUndefined | Self::PriorityBelowThreshold { .. } => FilterStage::Priority,
            Self::CategoryExcluded { .. } => FilterStage::CategoryExclusion,
            Self::CategoryNotIncluded => FilterStage::CategoryInclusion,
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProductSpecific { found } => {
                write!(f, "product-specific test, no product requested (found: {found})")
            }
            Self::SharedExcluded => write!(f, "shared test excluded"),
            Self::ProductMismatch { found } => write!(f, "product mismatch (found: {found})"),
            Self::PriorityUndefined => write!(f, "no priority defined"),
            Self::PriorityBelowThreshold { found } => {
                write!(f, "priority lower than requested (found: {found})")
            }
            Self::CategoryExcluded { matched } => {
                write!(f, "category in exclusion list (matched: ")?;
                for (idx, category) in matched.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{category}")?;
                }
                write!(f, ")")
            }
            Self::CategoryNotIncluded => write!(f, "category not in inclusion list"),
        }
    }
}

/// A stage of the filter pipeline, in evaluation order.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum FilterStage {
    /// Product affiliation and the shared/product-specific distinction.
    Product,

    /// The priority floor.
    Priority,

    /// Category exclusion.
    CategoryExclusion,

    /// Category inclusion.
    CategoryInclusion,
}

impl fmt::Display for FilterStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Product => write!(f, "product"),
            Self::Priority => write!(f, "priority"),
            Self::CategoryExclusion => write!(f, "category-exclusion"),
            Self::CategoryInclusion => write!(f, "category-inclusion"),
        }
    }
}
