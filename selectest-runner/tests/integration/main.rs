// Copyright (c) The selectest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests covering discovery, filtering and execution together.

use color_eyre::eyre::Result;
use maplit::btreeset;
use pretty_assertions::assert_eq;
use selectest_metadata::{FilterMatch, ProductId, SkipReason, TagMetadata, tag};
use selectest_runner::{
    runner::{RunStats, TestEvent, TestRunner},
    suite::{Suite, SuiteBuilder, TestCase},
    test_filter::{CategoryMode, FilterPolicy, FilterPolicyBuilder},
};
use std::collections::BTreeSet;

mod config_profiles;
mod fixtures;

use fixtures::*;

fn build_suite(policy: &FilterPolicy, suites: &[&str]) -> Suite {
    let catalog = fixture_catalog();
    let mut builder = SuiteBuilder::new(policy);
    for suite in catalog.discover(&default_layout(), suites) {
        builder.add_cases(suite.into_cases());
    }
    builder.build()
}

fn outcomes(suite: &Suite) -> Vec<(String, Option<SkipReason>)> {
    suite
        .iter()
        .map(|(case, entry)| {
            (
                format!("{}::{}", case.name(), entry.name()),
                entry.outcome().skip_reason().cloned(),
            )
        })
        .collect()
}

#[test]
fn scenario_prioritized_shared_test_runs() {
    let tags = TagMetadata::from_tag(tag!("Nightly"; priority = 1));
    let policy = FilterPolicy::new(None, false, 5, CategoryMode::Exclude, BTreeSet::new());
    assert_eq!(policy.filter_match(Some(&tags)), FilterMatch::Matches);
}

#[test]
fn scenario_product_test_without_target_is_skipped() {
    let tags = TagMetadata::from_tag(tag!(; product = ProductId::Ace));
    let policy = FilterPolicy::default();
    let filter_match = policy.filter_match(Some(&tags));
    assert_eq!(
        filter_match,
        FilterMatch::Mismatch {
            reason: SkipReason::ProductSpecific {
                found: ProductId::Ace
            }
        }
    );
    assert_eq!(
        filter_match.skip_reason().map(ToString::to_string).as_deref(),
        Some("product-specific test, no product requested (found: ACE)")
    );
}

#[test]
fn scenario_untagged_test_runs_for_target_product() {
    let policy = FilterPolicyBuilder::new()
        .set_target_product(Some("BME"))
        .build()
        .unwrap();
    assert_eq!(policy.filter_match(None), FilterMatch::Matches);
}

#[test]
fn scenario_excluded_category_is_reported() {
    let tags = TagMetadata::from_tag(tag!("Weekly", "Long-running"));
    let policy = FilterPolicyBuilder::new()
        .set_exclude_categories("Long-running")
        .build()
        .unwrap();
    assert_eq!(
        policy.filter_match(Some(&tags)),
        FilterMatch::Mismatch {
            reason: SkipReason::CategoryExcluded {
                matched: btreeset! {"Long-running".to_owned()}
            }
        }
    );
}

#[test]
fn default_run_over_unit_suite() {
    let suite = build_suite(&FilterPolicy::default(), &["unit"]);
    assert_eq!(
        outcomes(&suite),
        vec![
            ("TestScale::test_identity".to_owned(), None),
            ("TestScale::test_double".to_owned(), None),
            (
                "TestScale::test_overflow".to_owned(),
                Some(SkipReason::ProductSpecific {
                    found: ProductId::Ace
                })
            ),
            (
                "TestRound::test_half_up".to_owned(),
                Some(SkipReason::ProductSpecific {
                    found: ProductId::Bme
                })
            ),
            ("TestRound::test_half_even".to_owned(), None),
        ]
    );
}

#[test]
fn product_run_skipping_shared_tests() {
    let policy = FilterPolicyBuilder::new()
        .set_target_product(Some("BME"))
        .set_skip_shared(true)
        .build()
        .unwrap();
    let suite = build_suite(&policy, &["unit", "storage"]);

    assert_eq!(suite.test_count(), 7);
    let running: Vec<_> = outcomes(&suite)
        .into_iter()
        .filter(|(_, reason)| reason.is_none())
        .map(|(name, _)| name)
        .collect();
    assert_eq!(running, ["TestRound::test_half_up"]);

    let reasons: BTreeSet<_> = outcomes(&suite)
        .into_iter()
        .filter_map(|(_, reason)| Some(reason?.to_string()))
        .collect();
    assert_eq!(
        reasons,
        btreeset! {
            "product mismatch (found: ACE)".to_owned(),
            "product mismatch (found: STL)".to_owned(),
            "shared test excluded".to_owned(),
        }
    );
}

#[test]
fn priority_and_inclusion_combined() {
    let policy = FilterPolicyBuilder::new()
        .set_target_product(Some("STL"))
        .set_min_priority(2)
        .set_include_categories(vec!["Nightly", "Long-running"])
        .build()
        .unwrap();
    let suite = build_suite(&policy, &["unit", "storage", "workflow"]);

    assert_eq!(
        outcomes(&suite),
        vec![
            (
                "TestScale::test_identity".to_owned(),
                Some(SkipReason::PriorityUndefined)
            ),
            ("TestScale::test_double".to_owned(), None),
            (
                "TestScale::test_overflow".to_owned(),
                Some(SkipReason::ProductMismatch {
                    found: ProductId::Ace
                })
            ),
            (
                "TestRound::test_half_up".to_owned(),
                Some(SkipReason::ProductMismatch {
                    found: ProductId::Bme
                })
            ),
            (
                "TestRound::test_half_even".to_owned(),
                Some(SkipReason::PriorityUndefined)
            ),
            (
                "TestPersist::test_roundtrip".to_owned(),
                Some(SkipReason::PriorityBelowThreshold { found: 3 })
            ),
            ("TestPersist::test_corrupt".to_owned(), None),
            (
                "TestEndToEnd::test_pipeline".to_owned(),
                Some(SkipReason::PriorityUndefined)
            ),
        ]
    );
}

#[test]
fn run_reports_failures_and_skips() {
    let policy = FilterPolicyBuilder::new()
        .set_target_product(Some("STL"))
        .build()
        .unwrap();
    let suite = build_suite(&policy, &["storage"]);

    let mut finished = Vec::new();
    let run_stats = TestRunner::new(&suite).execute(|event| {
        if let TestEvent::TestFinished {
            entry, run_status, ..
        } = event
        {
            finished.push((entry.name().to_owned(), run_status.status.is_success()));
        }
    });

    assert_eq!(
        finished,
        [
            ("test_roundtrip".to_owned(), true),
            ("test_corrupt".to_owned(), false),
        ]
    );
    assert_eq!(
        run_stats,
        RunStats {
            initial_run_count: 2,
            final_run_count: 2,
            passed: 1,
            failed: 1,
            skipped: 0,
        }
    );
}

#[test]
fn empty_and_unknown_suites() -> Result<()> {
    let catalog = fixture_catalog();
    let layout = default_layout();
    assert!(catalog.discover(&layout, &["missing"]).is_empty());

    let policy = FilterPolicy::default();
    let mut builder = SuiteBuilder::new(&policy);
    builder.add_case(TestCase::new("TestEmpty", "unit_tests/test_empty.rs"));
    let suite = builder.build();
    assert_eq!(suite.test_count(), 0);
    assert_eq!(suite.run_count(), 0);

    let run_stats = TestRunner::new(&suite).execute(|_| {});
    assert_eq!(run_stats.final_run_count, 0);
    assert!(run_stats.is_success());
    Ok(())
}
