// Copyright (c) The selectest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::fixtures::fixture_catalog;
use camino_tempfile::Utf8TempDir;
use camino_tempfile_ext::prelude::*;
use color_eyre::eyre::Result;
use indoc::indoc;
use pretty_assertions::assert_eq;
use selectest_metadata::SkipReason;
use selectest_runner::{
    config::SelectestConfig,
    errors::FilterPolicyBuildError,
    suite::SuiteBuilder,
};

fn write_config(contents: &str) -> Result<Utf8TempDir> {
    let temp_dir = camino_tempfile::tempdir()?;
    temp_dir
        .child(SelectestConfig::CONFIG_PATH)
        .write_str(contents)?;
    Ok(temp_dir)
}

#[test]
fn profile_drives_discovery_and_filtering() -> Result<()> {
    let temp_dir = write_config(indoc! {r#"
        [discovery]
        file-pattern = "test_*.rs"

        [profile.storage]
        suites = ["storage"]
        product = "stl"
        priority = 1
    "#})?;

    let config = SelectestConfig::from_sources(temp_dir.path(), None)?;
    let profile = config.profile(Some("storage"))?;
    let policy = profile.policy_builder().build()?;

    let layout = config.suite_layout()?;
    let mut builder = SuiteBuilder::new(&policy);
    for suite in fixture_catalog().discover(&layout, profile.suites()) {
        builder.add_cases(suite.into_cases());
    }
    let suite = builder.build();

    let outcomes: Vec<_> = suite
        .iter()
        .map(|(_, entry)| (entry.name(), entry.outcome().skip_reason().cloned()))
        .collect();
    assert_eq!(
        outcomes,
        [
            (
                "test_roundtrip",
                Some(SkipReason::PriorityBelowThreshold { found: 3 })
            ),
            ("test_corrupt", None),
        ]
    );
    Ok(())
}

#[test]
fn command_line_overrides_profile() -> Result<()> {
    let temp_dir = write_config(indoc! {r#"
        [profile.default]
        product = "ACE"
        exclude-categories = "Long-running"
    "#})?;

    let config = SelectestConfig::from_sources(temp_dir.path(), None)?;
    let profile = config.profile(None)?;

    // Values set after the profile win, and categories are replaced as a unit.
    let mut builder = profile.policy_builder();
    builder
        .set_target_product(Some("BME"))
        .set_include_categories("Nightly")
        .set_exclude_categories(None::<String>);
    let policy = builder.build()?;

    assert_eq!(policy.target_product().map(|p| p.as_str()), Some("BME"));
    assert_eq!(policy.categories().len(), 1);
    Ok(())
}

#[test]
fn unknown_product_in_profile() -> Result<()> {
    let temp_dir = write_config(indoc! {r#"
        [profile.default]
        product = "XYZ"
    "#})?;

    let config = SelectestConfig::from_sources(temp_dir.path(), None)?;
    let err = config.profile(None)?.policy_builder().build().unwrap_err();
    let FilterPolicyBuildError::UnknownProduct(source) = err else {
        panic!("expected unknown product, got {err:?}");
    };
    assert_eq!(source.input(), "XYZ");
    Ok(())
}
