// Copyright (c) The selectest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filtering tests based on their tags.
//!
//! The main structure in this module is [`FilterPolicy`], which is created by a
//! [`FilterPolicyBuilder`]. A policy evaluates four filter stages in a fixed order, stopping at
//! the first stage that rejects a test:
//!
//! 1. [`product_filter`]
//! 2. [`priority_filter`]
//! 3. [`category_exclusion_filter`] (only in [`CategoryMode::Exclude`])
//! 4. [`category_inclusion_filter`] (only in [`CategoryMode::Include`])

use crate::errors::FilterPolicyBuildError;
use selectest_metadata::{FilterMatch, ProductId, SkipReason, TagMetadata};
use serde::Deserialize;
use std::collections::BTreeSet;

/// Whether the categories of a [`FilterPolicy`] select or reject tests.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum CategoryMode {
    /// Skip tests that are in any of the categories.
    ///
    /// This is the default.
    #[default]
    Exclude,

    /// Skip tests that are in none of the categories.
    Include,
}

/// Raw category input, as provided on the command line or in a config file.
///
/// A single string is a one-element set, a list is the set of its elements, and absence is the
/// empty set.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CategoryInput {
    /// No categories.
    #[default]
    Absent,

    /// A single category.
    One(String),

    /// A list of categories.
    Many(Vec<String>),
}

impl CategoryInput {
    /// Normalizes this input into a set of categories.
    pub fn into_set(self) -> BTreeSet<String> {
        match self {
            Self::Absent => BTreeSet::new(),
            Self::One(category) => [category].into(),
            Self::Many(categories) => categories.into_iter().collect(),
        }
    }
}

impl From<&str> for CategoryInput {
    fn from(category: &str) -> Self {
        Self::One(category.to_owned())
    }
}

impl From<String> for CategoryInput {
    fn from(category: String) -> Self {
        Self::One(category)
    }
}

impl From<Vec<String>> for CategoryInput {
    fn from(categories: Vec<String>) -> Self {
        Self::Many(categories)
    }
}

impl From<Vec<&str>> for CategoryInput {
    fn from(categories: Vec<&str>) -> Self {
        Self::Many(categories.into_iter().map(ToOwned::to_owned).collect())
    }
}

impl<T: Into<CategoryInput>> From<Option<T>> for CategoryInput {
    fn from(input: Option<T>) -> Self {
        input.map_or(Self::Absent, Into::into)
    }
}

/// A builder for [`FilterPolicy`] instances.
///
/// The builder accepts unvalidated run configuration and checks it in [`Self::build`].
#[derive(Clone, Debug, Default)]
pub struct FilterPolicyBuilder {
    target_product: Option<String>,
    skip_shared: bool,
    min_priority: i32,
    include_categories: BTreeSet<String>,
    exclude_categories: BTreeSet<String>,
}

impl FilterPolicyBuilder {
    /// Creates a new builder which, if built as-is, filters nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the product to target, as its raw string spelling.
    pub fn set_target_product(&mut self, product: Option<impl Into<String>>) -> &mut Self {
        self.target_product = product.map(Into::into);
        self
    }

    /// Sets whether shared tests are skipped when a target product is set.
    pub fn set_skip_shared(&mut self, skip_shared: bool) -> &mut Self {
        self.skip_shared = skip_shared;
        self
    }

    /// Sets the priority floor. Values `<= 0` disable priority filtering.
    pub fn set_min_priority(&mut self, min_priority: i32) -> &mut Self {
        self.min_priority = min_priority;
        self
    }

    /// Sets the categories to include.
    pub fn set_include_categories(&mut self, categories: impl Into<CategoryInput>) -> &mut Self {
        self.include_categories = categories.into().into_set();
        self
    }

    /// Sets the categories to exclude.
    pub fn set_exclude_categories(&mut self, categories: impl Into<CategoryInput>) -> &mut Self {
        self.exclude_categories = categories.into().into_set();
        self
    }

    /// Resolves the configuration into a policy.
    ///
    /// Fails if the target product is unknown, or if both include and exclude categories were
    /// specified.
    pub fn build(&self) -> Result<FilterPolicy, FilterPolicyBuildError> {
        let target_product = self
            .target_product
            .as_deref()
            .map(str::parse::<ProductId>)
            .transpose()
            .map_err(FilterPolicyBuildError::UnknownProduct)?;

        let (category_mode, categories) = match (
            self.include_categories.is_empty(),
            self.exclude_categories.is_empty(),
        ) {
            (false, false) => {
                return Err(FilterPolicyBuildError::ConflictingCategoryFilters {
                    include: self.include_categories.clone(),
                    exclude: self.exclude_categories.clone(),
                });
            }
            (false, true) => (CategoryMode::Include, self.include_categories.clone()),
            (true, _) => (CategoryMode::Exclude, self.exclude_categories.clone()),
        };

        let policy = FilterPolicy {
            target_product,
            skip_shared: self.skip_shared,
            min_priority: self.min_priority,
            category_mode,
            categories,
        };
        tracing::debug!("resolved filter policy: {policy:?}");
        Ok(policy)
    }
}

/// The resolved, read-only filter configuration for a run.
///
/// A policy is immutable once built, so a single instance can be shared across every suite (and
/// thread) of a run.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FilterPolicy {
    target_product: Option<ProductId>,
    skip_shared: bool,
    min_priority: i32,
    category_mode: CategoryMode,
    categories: BTreeSet<String>,
}

impl FilterPolicy {
    /// Creates a policy directly from already-validated parts.
    pub fn new(
        target_product: Option<ProductId>,
        skip_shared: bool,
        min_priority: i32,
        category_mode: CategoryMode,
        categories: BTreeSet<String>,
    ) -> Self {
        Self {
            target_product,
            skip_shared,
            min_priority,
            category_mode,
            categories,
        }
    }

    /// The product targeted by this run, if any.
    pub fn target_product(&self) -> Option<ProductId> {
        self.target_product
    }

    /// Whether shared tests are skipped when a product is targeted.
    pub fn skip_shared(&self) -> bool {
        self.skip_shared
    }

    /// The priority floor; `<= 0` means priority filtering is disabled.
    pub fn min_priority(&self) -> i32 {
        self.min_priority
    }

    /// Whether the categories include or exclude tests.
    pub fn category_mode(&self) -> CategoryMode {
        self.category_mode
    }

    /// The categories to include or exclude. Empty means no category filtering.
    pub fn categories(&self) -> &BTreeSet<String> {
        &self.categories
    }

    /// Runs all filter stages in order against a test's tags.
    ///
    /// The first stage that rejects the test determines the reason; later stages are not
    /// evaluated.
    pub fn filter_match(&self, tags: Option<&TagMetadata>) -> FilterMatch {
        product_filter(tags, self)
            .or_else(|| priority_filter(tags, self))
            .or_else(|| match self.category_mode {
                CategoryMode::Exclude => category_exclusion_filter(tags, self),
                CategoryMode::Include => category_inclusion_filter(tags, self),
            })
            .into()
    }
}

/// Checks product affiliation against the target product.
///
/// Without a target product only shared tests pass. With a target, tests for that product pass,
/// as do shared tests unless shared tests are skipped.
pub fn product_filter(tags: Option<&TagMetadata>, policy: &FilterPolicy) -> Option<SkipReason> {
    let product = tags.and_then(TagMetadata::product);
    match (policy.target_product, product) {
        (None, Some(found)) => Some(SkipReason::ProductSpecific { found }),
        (None, None) => None,
        (Some(_), None) if policy.skip_shared => Some(SkipReason::SharedExcluded),
        (Some(_), None) => None,
        (Some(target), Some(found)) if found != target => {
            Some(SkipReason::ProductMismatch { found })
        }
        (Some(_), Some(_)) => None,
    }
}

/// Checks a test's priority against the priority floor.
///
/// Priorities `1..=min_priority` pass. Tests without a priority, or with a negative one, are
/// rejected while the floor is active.
pub fn priority_filter(tags: Option<&TagMetadata>, policy: &FilterPolicy) -> Option<SkipReason> {
    if policy.min_priority <= 0 {
        return None;
    }

    match tags.and_then(TagMetadata::priority) {
        None => Some(SkipReason::PriorityUndefined),
        Some(priority) if priority < 0 => Some(SkipReason::PriorityUndefined),
        Some(priority) if priority > policy.min_priority => {
            Some(SkipReason::PriorityBelowThreshold { found: priority })
        }
        Some(_) => None,
    }
}

/// Rejects tests in any of the policy's categories, in [`CategoryMode::Exclude`].
pub fn category_exclusion_filter(
    tags: Option<&TagMetadata>,
    policy: &FilterPolicy,
) -> Option<SkipReason> {
    if policy.category_mode != CategoryMode::Exclude || policy.categories.is_empty() {
        return None;
    }

    let matched = tags?.matching_categories(&policy.categories);
    (!matched.is_empty()).then_some(SkipReason::CategoryExcluded { matched })
}

/// Rejects tests in none of the policy's categories, in [`CategoryMode::Include`].
pub fn category_inclusion_filter(
    tags: Option<&TagMetadata>,
    policy: &FilterPolicy,
) -> Option<SkipReason> {
    if policy.category_mode != CategoryMode::Include || policy.categories.is_empty() {
        return None;
    }

    let included = tags.is_some_and(|tags| !tags.categories().is_disjoint(&policy.categories));
    (!included).then_some(SkipReason::CategoryNotIncluded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::btreeset;
    use pretty_assertions::assert_eq;
    use proptest::collection::btree_set;
    use selectest_metadata::{FilterStage, tag};
    use test_case::test_case;
    use test_strategy::proptest;

    fn product_policy(target_product: Option<ProductId>, skip_shared: bool) -> FilterPolicy {
        FilterPolicy::new(
            target_product,
            skip_shared,
            0,
            CategoryMode::Exclude,
            BTreeSet::new(),
        )
    }

    #[test]
    fn policy_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FilterPolicy>();
    }

    fn tags_for(product: Option<ProductId>) -> TagMetadata {
        let tag = match product {
            Some(product) => tag!(; product = product),
            None => tag!(),
        };
        TagMetadata::from_tag(tag)
    }

    // Each row of the product decision table. `Some(None)` is a tag without a product.
    #[test_case(None, false, Some(Some(ProductId::Ace)), Some(SkipReason::ProductSpecific { found: ProductId::Ace }); "no target, product tag")]
    #[test_case(None, false, Some(None), None; "no target, shared tag")]
    #[test_case(None, true, None, None; "no target, no tag")]
    #[test_case(Some(ProductId::Ace), true, None, Some(SkipReason::SharedExcluded); "skip shared, no tag")]
    #[test_case(Some(ProductId::Ace), true, Some(None), Some(SkipReason::SharedExcluded); "skip shared, shared tag")]
    #[test_case(Some(ProductId::Ace), true, Some(Some(ProductId::Ace)), None; "skip shared, same product")]
    #[test_case(Some(ProductId::Ace), false, Some(Some(ProductId::Ace)), None; "same product")]
    #[test_case(Some(ProductId::Ace), false, Some(Some(ProductId::Bme)), Some(SkipReason::ProductMismatch { found: ProductId::Bme }); "other product")]
    #[test_case(Some(ProductId::Ace), true, Some(Some(ProductId::Stl)), Some(SkipReason::ProductMismatch { found: ProductId::Stl }); "skip shared, other product")]
    #[test_case(Some(ProductId::Bme), false, None, None; "keep shared, no tag")]
    #[test_case(Some(ProductId::Bme), false, Some(None), None; "keep shared, shared tag")]
    fn product_table(
        target_product: Option<ProductId>,
        skip_shared: bool,
        tag_product: Option<Option<ProductId>>,
        expected: Option<SkipReason>,
    ) {
        let policy = product_policy(target_product, skip_shared);
        let tags = tag_product.map(tags_for);
        assert_eq!(product_filter(tags.as_ref(), &policy), expected);
    }

    #[test_case(0, None, None; "disabled, no tag")]
    #[test_case(-3, Some(7), None; "disabled by negative floor")]
    #[test_case(2, None, Some(SkipReason::PriorityUndefined); "no tag")]
    #[test_case(2, Some(-1), Some(SkipReason::PriorityUndefined); "negative priority")]
    #[test_case(2, Some(3), Some(SkipReason::PriorityBelowThreshold { found: 3 }); "above floor")]
    #[test_case(2, Some(2), None; "at floor")]
    #[test_case(2, Some(1), None; "below floor")]
    fn priority_table(min_priority: i32, priority: Option<i32>, expected: Option<SkipReason>) {
        let policy = FilterPolicy::new(
            None,
            false,
            min_priority,
            CategoryMode::Exclude,
            BTreeSet::new(),
        );
        let tags = priority.map(|priority| TagMetadata::from_tag(tag!(; priority = priority)));
        assert_eq!(priority_filter(tags.as_ref(), &policy), expected);
    }

    #[test]
    fn priority_tag_without_priority() {
        let policy = FilterPolicy::new(None, false, 5, CategoryMode::Exclude, BTreeSet::new());
        let tags = TagMetadata::from_tag(tag!("Nightly"));
        assert_eq!(
            priority_filter(Some(&tags), &policy),
            Some(SkipReason::PriorityUndefined)
        );
    }

    #[test]
    fn category_filters_respect_mode() {
        let categories = btreeset! {"Long-running".to_owned()};
        let tags = TagMetadata::from_tag(tag!("Weekly", "Long-running"));

        let exclude = FilterPolicy::new(None, false, 0, CategoryMode::Exclude, categories.clone());
        assert_eq!(
            category_exclusion_filter(Some(&tags), &exclude),
            Some(SkipReason::CategoryExcluded {
                matched: categories.clone()
            })
        );
        // The inclusion stage is inert in exclude mode.
        assert_eq!(category_inclusion_filter(None, &exclude), None);

        let include = FilterPolicy::new(None, false, 0, CategoryMode::Include, categories);
        assert_eq!(category_inclusion_filter(Some(&tags), &include), None);
        assert_eq!(
            category_inclusion_filter(None, &include),
            Some(SkipReason::CategoryNotIncluded)
        );
        assert_eq!(category_exclusion_filter(Some(&tags), &include), None);
    }

    #[test]
    fn empty_categories_disable_category_filters() {
        for mode in [CategoryMode::Exclude, CategoryMode::Include] {
            let policy = FilterPolicy::new(None, false, 0, mode, BTreeSet::new());
            assert_eq!(policy.filter_match(None), FilterMatch::Matches);
        }
    }

    #[test]
    fn product_stage_short_circuits() {
        // This test would be rejected by every stage; only the product reason is reported.
        let policy = FilterPolicy::new(
            Some(ProductId::Ace),
            true,
            1,
            CategoryMode::Include,
            btreeset! {"Nightly".to_owned()},
        );
        let filter_match = policy.filter_match(None);
        assert_eq!(
            filter_match,
            FilterMatch::Mismatch {
                reason: SkipReason::SharedExcluded
            }
        );
    }

    #[test]
    fn priority_stage_precedes_categories() {
        let policy = FilterPolicy::new(
            None,
            false,
            1,
            CategoryMode::Exclude,
            btreeset! {"Nightly".to_owned()},
        );
        let tags = TagMetadata::from_tag(tag!("Nightly"; priority = 4));
        assert_eq!(
            policy.filter_match(Some(&tags)).skip_reason().map(SkipReason::stage),
            Some(FilterStage::Priority)
        );
    }

    #[test]
    fn builder_normalizes_categories() {
        let policy = FilterPolicyBuilder::new()
            .set_include_categories("Nightly")
            .build()
            .unwrap();
        assert_eq!(policy.category_mode(), CategoryMode::Include);
        assert_eq!(policy.categories(), &btreeset! {"Nightly".to_owned()});

        let policy = FilterPolicyBuilder::new()
            .set_exclude_categories(vec!["Weekly", "Long-running", "Weekly"])
            .build()
            .unwrap();
        assert_eq!(policy.category_mode(), CategoryMode::Exclude);
        assert_eq!(
            policy.categories(),
            &btreeset! {"Long-running".to_owned(), "Weekly".to_owned()}
        );

        let policy = FilterPolicyBuilder::new()
            .set_include_categories(None::<String>)
            .build()
            .unwrap();
        assert!(policy.categories().is_empty());
        assert_eq!(policy, FilterPolicy::default());
    }

    #[test]
    fn builder_rejects_conflicting_categories() {
        let err = FilterPolicyBuilder::new()
            .set_include_categories("Nightly")
            .set_exclude_categories("Long-running")
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            FilterPolicyBuildError::ConflictingCategoryFilters {
                include: btreeset! {"Nightly".to_owned()},
                exclude: btreeset! {"Long-running".to_owned()},
            }
        );
        assert_eq!(
            err.to_string(),
            "category filters are mutually exclusive: got include (Nightly) and exclude \
             (Long-running)"
        );
    }

    #[test]
    fn builder_resolves_product() {
        let policy = FilterPolicyBuilder::new()
            .set_target_product(Some("bme"))
            .set_skip_shared(true)
            .set_min_priority(2)
            .build()
            .unwrap();
        assert_eq!(policy.target_product(), Some(ProductId::Bme));
        assert!(policy.skip_shared());
        assert_eq!(policy.min_priority(), 2);

        let err = FilterPolicyBuilder::new()
            .set_target_product(Some("XYZ"))
            .build()
            .unwrap_err();
        assert!(matches!(err, FilterPolicyBuildError::UnknownProduct(_)));
    }

    #[test]
    fn category_input_from_toml_shapes() {
        #[derive(Deserialize)]
        struct Wrapper {
            #[serde(default)]
            categories: CategoryInput,
        }

        let one: Wrapper = serde_json::from_str(r#"{"categories": "Nightly"}"#).unwrap();
        assert_eq!(one.categories, CategoryInput::One("Nightly".to_owned()));
        let many: Wrapper = serde_json::from_str(r#"{"categories": ["A", "B"]}"#).unwrap();
        assert_eq!(
            many.categories.into_set(),
            btreeset! {"A".to_owned(), "B".to_owned()}
        );
        let absent: Wrapper = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.categories, CategoryInput::Absent);
    }

    #[proptest(cases = 64)]
    fn untagged_shared_tests_always_skipped(
        target_product: ProductId,
        min_priority: i32,
        include: bool,
        #[strategy(btree_set("[A-Z][a-z]{0,6}", 0..4))] categories: BTreeSet<String>,
    ) {
        let mode = if include {
            CategoryMode::Include
        } else {
            CategoryMode::Exclude
        };
        let policy = FilterPolicy::new(Some(target_product), true, min_priority, mode, categories);
        proptest::prop_assert_eq!(
            policy.filter_match(None),
            FilterMatch::Mismatch {
                reason: SkipReason::SharedExcluded
            }
        );
    }

    #[proptest(cases = 64)]
    fn priority_floor_property(tags: TagMetadata, #[strategy(1..20i32)] min_priority: i32) {
        let policy = FilterPolicy::new(
            None,
            false,
            min_priority,
            CategoryMode::Exclude,
            BTreeSet::new(),
        );
        let skipped = priority_filter(Some(&tags), &policy).is_some();
        let expected = match tags.priority() {
            None => true,
            Some(priority) => priority < 0 || priority > min_priority,
        };
        proptest::prop_assert_eq!(skipped, expected);
    }

    #[proptest(cases = 64)]
    fn category_modes_are_complementary(
        tags: TagMetadata,
        #[strategy(btree_set("[A-Z][a-z]{0,6}", 1..4))] categories: BTreeSet<String>,
    ) {
        let intersects = !tags.categories().is_disjoint(&categories);
        let exclude = FilterPolicy::new(None, false, 0, CategoryMode::Exclude, categories.clone());
        let include = FilterPolicy::new(None, false, 0, CategoryMode::Include, categories);

        proptest::prop_assert_eq!(
            category_exclusion_filter(Some(&tags), &exclude).is_some(),
            intersects
        );
        proptest::prop_assert_eq!(
            category_inclusion_filter(Some(&tags), &include).is_some(),
            !intersects
        );
    }

    #[proptest(cases = 64)]
    fn filter_match_is_idempotent(
        tags: Option<TagMetadata>,
        target_product: Option<ProductId>,
        skip_shared: bool,
        #[strategy(-2..6i32)] min_priority: i32,
        #[strategy(btree_set("[A-Z][a-z]{0,6}", 0..3))] categories: BTreeSet<String>,
    ) {
        let policy = FilterPolicy::new(
            target_product,
            skip_shared,
            min_priority,
            CategoryMode::Exclude,
            categories,
        );
        let first = policy.filter_match(tags.as_ref());
        let second = policy.filter_match(tags.as_ref());
        proptest::prop_assert_eq!(first, second);
    }
}
