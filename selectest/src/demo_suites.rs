// Copyright (c) The selectest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The built-in catalog of demonstration tests.
//!
//! The tests exercise a small arithmetic function across `unit`, `component` and `workflow` suites.
//! Tags are spread so that every filter dimension selects a different subset.
//!
//! | suite     | case            | test                     | tags                           |
//! |-----------|-----------------|--------------------------|--------------------------------|
//! | unit      | TestUnitA       | test_one_param           | -                              |
//! | unit      | TestUnitA       | test_two_params          | Nightly, priority 10           |
//! | unit      | TestUnitA       | test_three_params        | Weekly                         |
//! | unit      | TestUnitB       | test_one_negative_param  | -                              |
//! | unit      | TestUnitB       | test_two_negative_params | Nightly, BME                   |
//! | unit      | TestUnitB       | test_three_params        | Weekly, ACE                    |
//! | component | TestComponentA  | test_one_param           | -                              |
//! | component | TestComponentA  | test_two_params          | Nightly, Long-running, prio 1  |
//! | component | TestComponentA  | test_three_params        | Nightly, BME, priority 1       |
//! | component | TestComponentB  | test_one_negative_param  | -                              |
//! | component | TestComponentB  | test_two_negative_params | Weekly, Long-running, ACE      |
//! | component | TestComponentB  | test_three_params        | Weekly, Long-running, prio 2   |
//! | workflow  | TestWorkflowA/B | (three tests each)       | -                              |

use selectest_metadata::{ProductId, tag};
use selectest_runner::{
    discovery::TestCatalog,
    suite::{TestCase, TestResult},
};
use thiserror::Error;

#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("add requires at least 2 operands, got {0}")]
pub(crate) struct AddError(usize);

/// Adds up `operands`, requiring at least two of them.
pub(crate) fn add(operands: &[i64]) -> Result<i64, AddError> {
    if operands.len() < 2 {
        return Err(AddError(operands.len()));
    }
    Ok(operands.iter().sum())
}

fn check_sum(operands: &[i64], expected: i64) -> TestResult {
    let actual = add(operands)?;
    if actual != expected {
        return Err(format!("Add result did not produce {expected} (got {actual})").into());
    }
    Ok(())
}

fn check_rejected(operands: &[i64]) -> TestResult {
    match add(operands) {
        Ok(actual) => Err(format!("add({operands:?}) should have failed, got {actual}").into()),
        Err(_) => Ok(()),
    }
}

/// Returns the built-in catalog.
pub(crate) fn demo_catalog() -> TestCatalog {
    let mut catalog = TestCatalog::new();
    catalog
        .register(
            TestCase::new("TestUnitA", "unit_tests/package_a/test_a.rs")
                .test("test_one_param", || check_rejected(&[1]))
                .tagged_test("test_two_params", tag!("Nightly"; priority = 10), || {
                    check_sum(&[1, 2], 3)
                })
                .tagged_test("test_three_params", tag!("Weekly"), || {
                    check_sum(&[1, 2, 3], 6)
                }),
        )
        .register(
            TestCase::new("TestUnitB", "unit_tests/package_b/test_b.rs")
                .test("test_one_negative_param", || check_rejected(&[-1]))
                .tagged_test(
                    "test_two_negative_params",
                    tag!("Nightly"; product = ProductId::Bme),
                    || check_sum(&[-1, -2], -3),
                )
                .tagged_test(
                    "test_three_params",
                    tag!("Weekly"; product = ProductId::Ace),
                    || check_sum(&[-1, -2, -3], -6),
                ),
        )
        .register(
            TestCase::new("TestComponentA", "component_tests/cpackage_a/test_a.rs")
                .test("test_one_param", || check_rejected(&[1]))
                .tagged_test(
                    "test_two_params",
                    tag!("Nightly", "Long-running"; priority = 1),
                    || check_sum(&[1, 2], 3),
                )
                .tagged_test(
                    "test_three_params",
                    tag!("Nightly"; priority = 1, product = ProductId::Bme),
                    || check_sum(&[1, 2, 3], 6),
                ),
        )
        .register(
            TestCase::new("TestComponentB", "component_tests/cpackage_b/test_b.rs")
                .test("test_one_negative_param", || check_rejected(&[-1]))
                .tagged_test(
                    "test_two_negative_params",
                    tag!("Weekly", "Long-running"; product = ProductId::Ace),
                    || check_sum(&[-1, -2], -3),
                )
                .tagged_test(
                    "test_three_params",
                    tag!("Weekly", "Long-running"; priority = 2),
                    || check_sum(&[-1, -2, -3], -6),
                ),
        )
        .register(
            TestCase::new("TestWorkflowA", "workflow_tests/workflow_a/test_a.rs")
                .test("test_one_param", || check_rejected(&[1]))
                .test("test_two_params", || check_sum(&[1, 2], 3))
                .test("test_three_params", || check_sum(&[1, 2, 3], 6)),
        )
        .register(
            TestCase::new("TestWorkflowB", "workflow_tests/workflow_b/test_b.rs")
                .test("test_one_negative_param", || check_rejected(&[-1]))
                .test("test_two_negative_params", || check_sum(&[-1, -2], -3))
                .test("test_three_params", || check_sum(&[-1, -2, -3], -6)),
        );
    catalog
}
