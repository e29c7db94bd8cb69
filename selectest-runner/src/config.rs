// Copyright (c) The selectest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration support for selectest.
//!
//! The config is read from `.config/selectest.toml` (or an explicitly passed file), layered over
//! the default config embedded in selectest. Profiles other than `default` inherit unset values
//! from the `default` profile.

use crate::{
    discovery::SuiteLayout,
    errors::{ConfigParseError, ConfigParseErrorKind, ProfileNotFound, SuiteLayoutError},
    test_filter::{CategoryInput, FilterPolicyBuilder},
};
use camino::Utf8Path;
use config::{Config, ConfigError, File, FileFormat, builder::DefaultState};
use itertools::Itertools;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

/// Overall selectest configuration.
///
/// Returned by [`SelectestConfig::from_sources`].
#[derive(Clone, Debug)]
pub struct SelectestConfig {
    inner: SelectestConfigDeserialize,
}

impl SelectestConfig {
    /// The default location of the config within the root directory: `.config/selectest.toml`.
    pub const CONFIG_PATH: &'static str = ".config/selectest.toml";

    /// Contains the default config as a TOML file.
    ///
    /// Repository-specific configuration is layered on top of the default config.
    pub const DEFAULT_CONFIG: &'static str = include_str!("../default-config.toml");

    /// The name of the profile all other profiles inherit from.
    pub const DEFAULT_PROFILE: &'static str = "default";

    /// Reads the selectest config from the given file, or if not specified from
    /// `.config/selectest.toml` in `root`.
    ///
    /// If no config file is specified and `root` doesn't have `.config/selectest.toml`, uses the
    /// default config options.
    pub fn from_sources(
        root: impl AsRef<Utf8Path>,
        config_file: Option<&Utf8Path>,
    ) -> Result<Self, ConfigParseError> {
        let (config_file, source) = match config_file {
            Some(file) => (file.to_owned(), File::new(file.as_str(), FileFormat::Toml)),
            None => {
                let config_file = root.as_ref().join(Self::CONFIG_PATH);
                let source = File::new(config_file.as_str(), FileFormat::Toml).required(false);
                (config_file, source)
            }
        };

        let builder = Self::make_default_config().add_source(source);
        let (inner, unknown) = Self::build_and_deserialize_config(&builder)
            .map_err(|kind| ConfigParseError::new(&config_file, kind))?;

        if !unknown.is_empty() {
            warn_unknown_config_keys(&config_file, &unknown);
        }

        Ok(Self { inner })
    }

    /// Returns the default config, without reading any files.
    pub fn default_config() -> Result<Self, ConfigParseError> {
        let (inner, _unknown) = Self::build_and_deserialize_config(&Self::make_default_config())
            .map_err(|kind| ConfigParseError::new("<default config>", kind))?;
        Ok(Self { inner })
    }

    /// The name of the profile used when none is requested.
    pub fn default_profile_name(&self) -> &str {
        &self.inner.default_profile
    }

    /// The names of all profiles, in sorted order.
    pub fn profile_names(&self) -> impl Iterator<Item = &str> + '_ {
        let mut names: BTreeSet<&str> = self.inner.profiles.keys().map(String::as_str).collect();
        names.insert(Self::DEFAULT_PROFILE);
        names.into_iter()
    }

    /// Returns the profile with the given name, or the default profile if `name` is `None`.
    pub fn profile(&self, name: Option<&str>) -> Result<SelectestProfile<'_>, ProfileNotFound> {
        let name = name.unwrap_or(self.inner.default_profile.as_str());
        let custom_profile = if name == Self::DEFAULT_PROFILE {
            None
        } else {
            let profile = self
                .inner
                .profiles
                .get(name)
                .ok_or_else(|| ProfileNotFound::new(name, self.profile_names()))?;
            Some(profile)
        };

        Ok(SelectestProfile {
            name: name.to_owned(),
            default_profile: self
                .inner
                .profiles
                .get(Self::DEFAULT_PROFILE)
                .unwrap_or(&EMPTY_PROFILE),
            custom_profile,
        })
    }

    /// Returns the suite layout used for discovery.
    pub fn suite_layout(&self) -> Result<SuiteLayout, SuiteLayoutError> {
        SuiteLayout::new(
            &self.inner.discovery.folder_suffix,
            &self.inner.discovery.file_pattern,
        )
    }

    // ---
    // Helper methods
    // ---

    fn make_default_config() -> config::builder::ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(Self::DEFAULT_CONFIG, FileFormat::Toml))
    }

    /// This returns a tuple of (config, ignored paths).
    fn build_and_deserialize_config(
        builder: &config::builder::ConfigBuilder<DefaultState>,
    ) -> Result<(SelectestConfigDeserialize, BTreeSet<String>), ConfigParseErrorKind> {
        let config = builder
            .build_cloned()
            .map_err(|error| ConfigParseErrorKind::BuildError(Box::new(error)))?;

        let mut ignored = BTreeSet::new();
        let mut cb = |path: serde_ignored::Path| {
            ignored.insert(path.to_string());
        };
        let ignored_de = serde_ignored::Deserializer::new(config, &mut cb);
        let config: SelectestConfigDeserialize = serde_path_to_error::deserialize(ignored_de)
            .map_err(|error| {
                // The config crate also reports the key; drop it so the path is only shown once.
                let path = error.path().clone();
                let config_error = error.into_inner();
                let error = match config_error {
                    ConfigError::At { error, .. } => *error,
                    other => other,
                };
                ConfigParseErrorKind::DeserializeError(Box::new(serde_path_to_error::Error::new(
                    path, error,
                )))
            })?;

        Ok((config, ignored))
    }
}

fn warn_unknown_config_keys(config_file: &Utf8Path, unknown: &BTreeSet<String>) {
    let unknown_str = if unknown.len() == 1 {
        format!("key: {}", unknown.iter().join(""))
    } else {
        format!(
            "keys:\n{}",
            unknown.iter().map(|key| format!("  - {key}")).join("\n")
        )
    };

    tracing::warn!("in config file {config_file}, ignoring unknown configuration {unknown_str}");
}

static EMPTY_PROFILE: FilterProfile = FilterProfile {
    suites: None,
    product: None,
    skip_shared: None,
    priority: None,
    include_categories: None,
    exclude_categories: None,
};

/// A selectest profile, with values from the `default` profile filled in.
///
/// Returned by [`SelectestConfig::profile`].
#[derive(Clone, Debug)]
pub struct SelectestProfile<'cfg> {
    name: String,
    default_profile: &'cfg FilterProfile,
    custom_profile: Option<&'cfg FilterProfile>,
}

impl<'cfg> SelectestProfile<'cfg> {
    /// The name of the profile.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The suites to load.
    pub fn suites(&self) -> &'cfg [String] {
        self.custom_profile
            .and_then(|profile| profile.suites.as_deref())
            .or(self.default_profile.suites.as_deref())
            .unwrap_or_default()
    }

    /// The product to target, as a raw string.
    pub fn target_product(&self) -> Option<&'cfg str> {
        self.custom_profile
            .and_then(|profile| profile.product.as_deref())
            .or(self.default_profile.product.as_deref())
    }

    /// Whether to skip shared tests.
    pub fn skip_shared(&self) -> bool {
        self.custom_profile
            .and_then(|profile| profile.skip_shared)
            .or(self.default_profile.skip_shared)
            .unwrap_or(false)
    }

    /// The priority floor.
    pub fn min_priority(&self) -> i32 {
        self.custom_profile
            .and_then(|profile| profile.priority)
            .or(self.default_profile.priority)
            .unwrap_or(0)
    }

    /// The categories to include and exclude, as `(include, exclude)`.
    ///
    /// Category settings are inherited as a unit: if the profile sets either list, the `default`
    /// profile's lists are ignored.
    pub fn categories(&self) -> (CategoryInput, CategoryInput) {
        let profile = self
            .custom_profile
            .filter(|profile| profile.has_categories())
            .unwrap_or(self.default_profile);
        (
            profile.include_categories.clone().unwrap_or_default(),
            profile.exclude_categories.clone().unwrap_or_default(),
        )
    }

    /// Returns a filter policy builder initialized from this profile.
    pub fn policy_builder(&self) -> FilterPolicyBuilder {
        let (include, exclude) = self.categories();
        let mut builder = FilterPolicyBuilder::new();
        builder
            .set_target_product(self.target_product())
            .set_skip_shared(self.skip_shared())
            .set_min_priority(self.min_priority())
            .set_include_categories(include)
            .set_exclude_categories(exclude);
        builder
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct SelectestConfigDeserialize {
    default_profile: String,
    discovery: DiscoveryConfig,
    #[serde(rename = "profile")]
    profiles: BTreeMap<String, FilterProfile>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DiscoveryConfig {
    folder_suffix: String,
    file_pattern: String,
}

/// The filter settings of a single profile, as written in the config file.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct FilterProfile {
    #[serde(default)]
    suites: Option<Vec<String>>,
    #[serde(default)]
    product: Option<String>,
    #[serde(default)]
    skip_shared: Option<bool>,
    #[serde(default)]
    priority: Option<i32>,
    #[serde(default)]
    include_categories: Option<CategoryInput>,
    #[serde(default)]
    exclude_categories: Option<CategoryInput>,
}

impl FilterProfile {
    fn has_categories(&self) -> bool {
        self.include_categories.is_some() || self.exclude_categories.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{errors::FilterPolicyBuildError, test_filter::CategoryMode};
    use camino_tempfile::tempdir;
    use camino_tempfile_ext::prelude::*;
    use indoc::indoc;
    use maplit::btreeset;
    use pretty_assertions::assert_eq;
    use selectest_metadata::ProductId;

    fn config_with(contents: &str) -> SelectestConfig {
        let temp_dir = tempdir().unwrap();
        temp_dir
            .child(SelectestConfig::CONFIG_PATH)
            .write_str(contents)
            .unwrap();
        SelectestConfig::from_sources(temp_dir.path(), None).unwrap()
    }

    #[test]
    fn default_config_is_valid() {
        let config = SelectestConfig::default_config().unwrap();
        assert_eq!(config.default_profile_name(), "default");
        assert_eq!(
            config.profile_names().collect::<Vec<_>>(),
            ["default", "nightly"]
        );

        let profile = config.profile(None).unwrap();
        assert_eq!(profile.suites(), ["unit"]);
        assert_eq!(profile.policy_builder().build().unwrap(), Default::default());

        let layout = config.suite_layout().unwrap();
        assert_eq!(layout.folder_suffix(), "_tests");
        assert_eq!(layout.file_pattern(), "test_*.rs");
    }

    #[test]
    fn missing_config_file_uses_defaults() {
        let temp_dir = tempdir().unwrap();
        let config = SelectestConfig::from_sources(temp_dir.path(), None).unwrap();
        assert_eq!(config.profile(None).unwrap().name(), "default");
    }

    #[test]
    fn custom_profile_inherits_from_default() {
        let config = config_with(indoc! {r#"
            default-profile = "ace"

            [profile.default]
            priority = 3
            include-categories = "Nightly"

            [profile.ace]
            product = "ACE"
            skip-shared = true
        "#});

        let profile = config.profile(None).unwrap();
        assert_eq!(profile.name(), "ace");
        assert_eq!(profile.suites(), ["unit"]);
        assert_eq!(profile.target_product(), Some("ACE"));
        assert!(profile.skip_shared());
        assert_eq!(profile.min_priority(), 3);

        let policy = profile.policy_builder().build().unwrap();
        assert_eq!(policy.target_product(), Some(ProductId::Ace));
        assert_eq!(policy.category_mode(), CategoryMode::Include);
        assert_eq!(policy.categories(), &btreeset! {"Nightly".to_owned()});
    }

    #[test]
    fn profile_categories_replace_inherited_categories() {
        let config = config_with(indoc! {r#"
            [profile.default]
            include-categories = "Nightly"

            [profile.weekly]
            exclude-categories = ["Long-running", "Flaky"]
        "#});

        let policy = config
            .profile(Some("weekly"))
            .unwrap()
            .policy_builder()
            .build()
            .unwrap();
        assert_eq!(policy.category_mode(), CategoryMode::Exclude);
        assert_eq!(
            policy.categories(),
            &btreeset! {"Flaky".to_owned(), "Long-running".to_owned()}
        );
    }

    #[test]
    fn conflicting_categories_fail_at_build_time() {
        let config = config_with(indoc! {r#"
            [profile.both]
            include-categories = "Nightly"
            exclude-categories = "Long-running"
        "#});

        let err = config
            .profile(Some("both"))
            .unwrap()
            .policy_builder()
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            FilterPolicyBuildError::ConflictingCategoryFilters { .. }
        ));
    }

    #[test]
    fn unknown_profile() {
        let config = config_with("[profile.ci]\npriority = 1\n");
        let err = config.profile(Some("missing")).unwrap_err();
        assert_eq!(err.profile(), "missing");
        assert_eq!(
            err.to_string(),
            "profile `missing` not found (known profiles: ci, default, nightly)"
        );
    }

    #[test]
    fn invalid_value_reports_path() {
        let temp_dir = tempdir().unwrap();
        let config_file = temp_dir.child("custom.toml");
        config_file
            .write_str("[profile.default]\npriority = \"high\"\n")
            .unwrap();
        let config_path = config_file.to_path_buf();

        let err = SelectestConfig::from_sources(temp_dir.path(), Some(&config_path)).unwrap_err();
        assert_eq!(err.config_file(), config_path);
        match err.kind() {
            ConfigParseErrorKind::DeserializeError(error) => {
                assert_eq!(error.path().to_string(), "profile.default.priority");
            }
            other => panic!("unexpected error kind: {other:?}"),
        }
    }

    #[test]
    fn missing_explicit_config_file() {
        let temp_dir = tempdir().unwrap();
        let missing = temp_dir.path().join("missing.toml");
        let err = SelectestConfig::from_sources(temp_dir.path(), Some(&missing)).unwrap_err();
        assert!(matches!(err.kind(), ConfigParseErrorKind::BuildError(_)));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let config = config_with(indoc! {r#"
            [profile.default]
            retries = 3
            priority = 2
        "#});
        assert_eq!(config.profile(None).unwrap().min_priority(), 2);
    }
}
