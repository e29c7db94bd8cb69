// Copyright (c) The selectest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    demo_suites::demo_catalog,
    errors::{ExpectedError, Result},
    output::{OutputContext, OutputOpts, OutputWriter},
};
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};
use selectest_metadata::SelectestExitCode;
use selectest_runner::{
    config::{SelectestConfig, SelectestProfile},
    discovery::SuiteLayout,
    errors::{WriteEventError, WriteTestListError},
    list::{OutputFormat, SerializableFormat},
    query::{QueryKind, QueryResult},
    reporter::TestReporter,
    runner::TestRunner,
    suite::{Suite, SuiteBuilder},
    test_filter::FilterPolicyBuilder,
};
use std::io::Write;
use supports_color::Stream;

/// A tag-driven test selection runner.
///
/// Tests are discovered from the built-in catalog, filtered by product, priority and category
/// tags, and then listed or run.
#[derive(Debug, Parser)]
#[command(
    version,
    name = "selectest",
    styles = crate::output::clap_styles::style(),
    max_term_width = 100,
)]
pub struct SelectestApp {
    /// Directory containing .config/selectest.toml
    #[arg(long, global = true, value_name = "DIR", default_value = ".")]
    root: Utf8PathBuf,

    /// Config file [default: <root>/.config/selectest.toml]
    #[arg(long, global = true, value_name = "PATH")]
    config_file: Option<Utf8PathBuf>,

    /// Config profile to use [default: from config]
    #[arg(long, short = 'P', global = true, env = "SELECTEST_PROFILE")]
    profile: Option<String>,

    #[clap(flatten)]
    output: OutputOpts,

    #[clap(subcommand)]
    command: Command,
}

impl SelectestApp {
    /// Initializes the output context, including the global logger.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app, returning the process exit code.
    pub fn exec(self, output: OutputContext, output_writer: &mut OutputWriter) -> Result<i32> {
        let config = SelectestConfig::from_sources(&self.root, self.config_file.as_deref())?;
        let profile = config.profile(self.profile.as_deref())?;
        tracing::debug!("using profile `{}`", profile.name());
        let layout = config.suite_layout()?;

        match self.command {
            Command::List {
                filter_opts,
                message_format,
            } => {
                let suite = filter_opts.build_suite(&profile, &layout)?;
                let mut writer = output_writer.stdout_writer();
                suite.write(
                    message_format.to_output_format(output.verbose),
                    &mut writer,
                    output.color.should_colorize(Stream::Stdout),
                )?;
                writer.flush().map_err(WriteTestListError::Io)?;
                Ok(SelectestExitCode::OK)
            }
            Command::Run { filter_opts } => {
                let suite = filter_opts.build_suite(&profile, &layout)?;
                run_suite(&suite, output, output_writer)
            }
            Command::Query {
                kind,
                suite_opts,
                message_format,
            } => {
                let catalog = demo_catalog();
                let suites = catalog.discover(&layout, &suite_opts.requested(&profile));
                let result = QueryResult::new(kind.into(), &catalog, &layout, &suites);
                let mut writer = output_writer.stdout_writer();
                result.write(
                    message_format.to_output_format(output.verbose),
                    &mut writer,
                    output.color.should_colorize(Stream::Stdout),
                )?;
                writer.flush().map_err(WriteTestListError::Io)?;
                Ok(SelectestExitCode::OK)
            }
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List tests and whether they will run
    ///
    /// Tests are discovered and filtered exactly as they would be for `run`, but nothing is
    /// executed. Use --message-format json to get machine-readable output.
    List {
        #[clap(flatten)]
        filter_opts: FilterOpts,

        /// Output format
        #[arg(
            short = 'T',
            long,
            value_enum,
            default_value_t,
            help_heading = "OUTPUT OPTIONS",
            value_name = "FMT"
        )]
        message_format: MessageFormatOpts,
    },

    /// Run tests
    ///
    /// Selected tests are run one at a time. Skipped tests are reported along with the reason
    /// they were skipped.
    Run {
        #[clap(flatten)]
        filter_opts: FilterOpts,
    },

    /// Query tag metadata
    ///
    /// Prints the suites in the catalog, or the distinct priorities or categories used by the
    /// tests of the requested suites. Filters are not applied.
    Query {
        /// What to query
        #[arg(value_enum)]
        kind: QueryKindOpt,

        #[clap(flatten)]
        suite_opts: SuiteOpts,

        /// Output format
        #[arg(
            short = 'T',
            long,
            value_enum,
            default_value_t,
            help_heading = "OUTPUT OPTIONS",
            value_name = "FMT"
        )]
        message_format: MessageFormatOpts,
    },
}

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
enum MessageFormatOpts {
    #[default]
    Human,
    Json,
    JsonPretty,
}

impl MessageFormatOpts {
    fn to_output_format(self, verbose: bool) -> OutputFormat {
        match self {
            Self::Human => OutputFormat::Human { verbose },
            Self::Json => OutputFormat::Serializable(SerializableFormat::Json),
            Self::JsonPretty => OutputFormat::Serializable(SerializableFormat::JsonPretty),
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum QueryKindOpt {
    Suites,
    Priorities,
    Categories,
}

impl From<QueryKindOpt> for QueryKind {
    fn from(kind: QueryKindOpt) -> Self {
        match kind {
            QueryKindOpt::Suites => Self::Suites,
            QueryKindOpt::Priorities => Self::Priorities,
            QueryKindOpt::Categories => Self::Categories,
        }
    }
}

#[derive(Debug, Args)]
#[clap(next_help_heading = "SUITE OPTIONS")]
struct SuiteOpts {
    /// Suites to load [default: from profile]
    #[arg(long = "suite", value_name = "NAME", value_delimiter = ',')]
    suites: Vec<String>,
}

impl SuiteOpts {
    fn requested(&self, profile: &SelectestProfile<'_>) -> Vec<String> {
        if self.suites.is_empty() {
            profile.suites().to_vec()
        } else {
            self.suites.clone()
        }
    }
}

// Each option overrides the corresponding profile setting.
#[derive(Debug, Args)]
#[clap(next_help_heading = "FILTER OPTIONS")]
struct FilterOpts {
    #[clap(flatten)]
    suite_opts: SuiteOpts,

    /// Product to run tests for: ACE, BME or STL
    #[arg(long, value_name = "PRODUCT")]
    product: Option<String>,

    /// Only run tests at or above this priority (1 is the highest, 0 disables)
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    priority: Option<i32>,

    /// Only run tests in these categories
    #[arg(long = "include-category", value_name = "CATEGORY", value_delimiter = ',')]
    include_categories: Vec<String>,

    /// Skip tests in these categories
    #[arg(long = "exclude-category", value_name = "CATEGORY", value_delimiter = ',')]
    exclude_categories: Vec<String>,

    /// Skip untagged and product-less tests when a product is requested
    #[arg(long)]
    skip_shared: bool,

    /// Run shared tests even if the profile skips them
    #[arg(long, overrides_with = "skip_shared")]
    no_skip_shared: bool,
}

impl FilterOpts {
    fn policy_builder(&self, profile: &SelectestProfile<'_>) -> FilterPolicyBuilder {
        let mut builder = profile.policy_builder();
        if let Some(product) = &self.product {
            builder.set_target_product(Some(product));
        }
        if let Some(priority) = self.priority {
            builder.set_min_priority(priority);
        }
        if self.no_skip_shared {
            builder.set_skip_shared(false);
        } else if self.skip_shared {
            builder.set_skip_shared(true);
        }
        // Category flags replace the profile's category settings as a whole.
        if !self.include_categories.is_empty() || !self.exclude_categories.is_empty() {
            builder
                .set_include_categories(self.include_categories.clone())
                .set_exclude_categories(self.exclude_categories.clone());
        }
        builder
    }

    fn build_suite(&self, profile: &SelectestProfile<'_>, layout: &SuiteLayout) -> Result<Suite> {
        let policy = self.policy_builder(profile).build()?;

        let requested = self.suite_opts.requested(profile);
        let mut builder = SuiteBuilder::new(&policy);
        for suite in demo_catalog().discover(layout, &requested) {
            builder.add_cases(suite.into_cases());
        }
        Ok(builder.build())
    }
}

fn run_suite(suite: &Suite, output: OutputContext, output_writer: &mut OutputWriter) -> Result<i32> {
    let reporter = TestReporter::new(suite, output.color.should_colorize(Stream::Stderr));
    let mut writer = output_writer.stderr_writer();
    let run_stats = TestRunner::new(suite)
        .try_execute::<WriteEventError, _>(|event| reporter.report_event(&event, &mut writer))?;

    if !run_stats.is_success() {
        Err(ExpectedError::TestRunFailed {
            failed: run_stats.failed,
        })
    } else if run_stats.final_run_count == 0 {
        Err(ExpectedError::NoTestsRun {
            skipped: run_stats.skipped,
        })
    } else {
        Ok(SelectestExitCode::OK)
    }
}
