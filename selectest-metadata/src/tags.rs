// Copyright (c) The selectest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tag metadata attached to individual tests.

use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt, str::FromStr};
use thiserror::Error;

/// A product that a test can be specific to.
///
/// Tests without a product are *shared*: they are assumed to be relevant to every product.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProductId {
    /// The ACE product.
    Ace,

    /// The BME product.
    Bme,

    /// The STL product.
    Stl,
}

impl ProductId {
    /// All known products, in declaration order.
    pub const ALL: [Self; 3] = [Self::Ace, Self::Bme, Self::Stl];

    /// Returns the canonical spelling of this product.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ace => "ACE",
            Self::Bme => "BME",
            Self::Stl => "STL",
        }
    }

    /// Returns the canonical spellings of all known products.
    pub fn variants() -> [&'static str; 3] {
        Self::ALL.map(Self::as_str)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductId {
    type Err = ProductIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|product| product.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ProductIdParseError::new(s))
    }
}

/// An error that occurs while parsing a [`ProductId`] from a string.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error(
    "unrecognized product: {input}\n(known values: {})",
    ProductId::variants().join(", "),
)]
pub struct ProductIdParseError {
    input: String,
}

impl ProductIdParseError {
    fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }

    /// Returns the input that failed to parse.
    pub fn input(&self) -> &str {
        &self.input
    }
}

/// A single tagging operation: categories plus optional product and priority.
///
/// Tags are applied to tests with [`TagMetadata::apply`], usually through the `tag` method on a
/// test entry. The [`tag!`](crate::tag) macro is a shorthand for building one.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[must_use]
pub struct Tag {
    categories: BTreeSet<String>,
    product: Option<ProductId>,
    priority: Option<i32>,
}

impl Tag {
    /// Creates an empty tag: no categories, shared, no priority.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a category label.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.categories.insert(category.into());
        self
    }

    /// Adds several category labels.
    pub fn categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories.extend(categories.into_iter().map(Into::into));
        self
    }

    /// Marks the test as specific to `product`.
    pub fn product(mut self, product: ProductId) -> Self {
        self.product = Some(product);
        self
    }

    /// Sets the priority. 1 is the highest priority.
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Builds a [`Tag`] from category labels and optional `product`/`priority` values.
///
/// ```
/// use selectest_metadata::{ProductId, tag};
///
/// let tag = tag!("Nightly", "Long-running"; priority = 1, product = ProductId::Bme);
/// let only_priority = tag!(; priority = 2);
/// let only_categories = tag!("Weekly");
/// # let _ = (tag, only_priority, only_categories);
/// ```
#[macro_export]
macro_rules! tag {
    ($($category:expr),* $(; $($key:ident = $value:expr),* $(,)?)?) => {
        $crate::Tag::new()
            $(.category($category))*
            $($(.$key($value))*)?
    };
}

/// Metadata attached to a test: product affiliation, priority and categories.
///
/// An absent `TagMetadata` is equivalent to the default: shared, unprioritized and uncategorized.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TagMetadata {
    product: Option<ProductId>,
    priority: Option<i32>,
    #[serde(default)]
    categories: BTreeSet<String>,
}

impl TagMetadata {
    /// Creates metadata from a single tagging operation.
    pub fn from_tag(tag: Tag) -> Self {
        let mut metadata = Self::default();
        metadata.apply(tag);
        metadata
    }

    /// Applies another tagging operation on top of this one.
    ///
    /// Categories accumulate; product and priority are replaced by the values in `tag`, even if
    /// those are absent.
    pub fn apply(&mut self, tag: Tag) {
        let Tag {
            categories,
            product,
            priority,
        } = tag;
        self.categories.extend(categories);
        self.product = product;
        self.priority = priority;
    }

    /// The product this test is specific to, or `None` for shared tests.
    pub fn product(&self) -> Option<ProductId> {
        self.product
    }

    /// The priority of this test, if one was assigned.
    pub fn priority(&self) -> Option<i32> {
        self.priority
    }

    /// The categories of this test.
    pub fn categories(&self) -> &BTreeSet<String> {
        &self.categories
    }

    /// Returns the categories of this test that also appear in `categories`.
    pub fn matching_categories(&self, categories: &BTreeSet<String>) -> BTreeSet<String> {
        self.categories.intersection(categories).cloned().collect()
    }
}

#[cfg(feature = "proptest1")]
mod proptest_impls {
    use super::*;
    use proptest::prelude::*;

    impl Arbitrary for ProductId {
        type Parameters = ();
        type Strategy = BoxedStrategy<Self>;

        fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
            prop_oneof![Just(Self::Ace), Just(Self::Bme), Just(Self::Stl)].boxed()
        }
    }

    impl Arbitrary for TagMetadata {
        type Parameters = ();
        type Strategy = BoxedStrategy<Self>;

        fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
            (
                any::<Option<ProductId>>(),
                any::<Option<i32>>(),
                proptest::collection::btree_set("[A-Z][a-z]{0,6}", 0..4),
            )
                .prop_map(|(product, priority, categories)| Self {
                    product,
                    priority,
                    categories,
                })
                .boxed()
        }
    }
}
