// Copyright (c) The selectest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use selectest_metadata::{ProductId, tag};
use selectest_runner::{
    discovery::{SuiteLayout, TestCatalog},
    suite::{TestCase, TestResult},
};

pub(crate) fn pass() -> TestResult {
    Ok(())
}

pub(crate) fn fail() -> TestResult {
    Err("Multiply result did not produce 6".into())
}

/// A catalog with three suites and a mix of tagged and untagged tests.
///
/// | suite    | case               | test              | tags                                 |
/// |----------|--------------------|-------------------|--------------------------------------|
/// | unit     | TestScale          | test_identity     | -                                    |
/// | unit     | TestScale          | test_double       | Nightly, priority 1                  |
/// | unit     | TestScale          | test_overflow     | Weekly, Long-running, ACE            |
/// | unit     | TestRound          | test_half_up      | Nightly, BME, priority 2             |
/// | unit     | TestRound          | test_half_even    | -                                    |
/// | storage  | TestPersist        | test_roundtrip    | Weekly, priority 3                   |
/// | storage  | TestPersist        | test_corrupt      | Long-running, STL, priority 1 (fails)|
/// | workflow | TestEndToEnd       | test_pipeline     | -                                    |
pub(crate) fn fixture_catalog() -> TestCatalog {
    let mut catalog = TestCatalog::new();
    catalog
        .register(
            TestCase::new("TestScale", "unit_tests/scale/test_scale.rs")
                .test("test_identity", pass)
                .tagged_test("test_double", tag!("Nightly"; priority = 1), pass)
                .tagged_test(
                    "test_overflow",
                    tag!("Weekly", "Long-running"; product = ProductId::Ace),
                    pass,
                ),
        )
        .register(
            TestCase::new("TestRound", "unit_tests/round/test_round.rs")
                .test("test_half_up", pass)
                .test("test_half_even", pass)
                .tag("test_half_up", tag!("Nightly"; product = ProductId::Bme, priority = 2)),
        )
        .register(
            TestCase::new("TestPersist", "storage_tests/test_persist.rs")
                .tagged_test("test_roundtrip", tag!("Weekly"; priority = 3), pass)
                .tagged_test(
                    "test_corrupt",
                    tag!("Long-running"; product = ProductId::Stl, priority = 1),
                    fail,
                ),
        )
        // Not a test file: never discovered.
        .register(TestCase::new("Helpers", "storage_tests/helpers.rs").test("test_helper", pass))
        .register(
            TestCase::new("TestEndToEnd", "workflow_tests/test_end_to_end.rs")
                .test("test_pipeline", pass),
        );
    catalog
}

pub(crate) fn default_layout() -> SuiteLayout {
    SuiteLayout::new(
        SuiteLayout::DEFAULT_FOLDER_SUFFIX,
        SuiteLayout::DEFAULT_FILE_PATTERN,
    )
    .expect("default layout is valid")
}
