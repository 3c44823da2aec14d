use std::fmt::Display;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use issuelens_core::{Category, IssueLensConfig, OutputFormat};
use issuelens_tracker::activity::Period;
use issuelens_tracker::impact::{analyze_impact, ImpactOptions, ImpactReport};
use issuelens_tracker::model::{load_issues, Issue};
use issuelens_tracker::report::{analyze_categories, ActivityOptions, CategoryOutcome, IssueFilter};
use issuelens_tracker::resolution::{analyze_resolution, ResolutionOptions, ResolutionReport};

#[derive(Parser)]
#[command(
    name = "issuelens",
    version,
    about = "Issue-tracker analytics from a JSON export",
    long_about = "issuelens reads a JSON export of issues and their timeline events and\n\
                   reports what the tracker has been busy with.\n\n\
                   Examples:\n  \
                     issuelens categories                     Most active issues of the latest year\n  \
                     issuelens categories --year 2023 --type bug,docs\n  \
                     issuelens categories --start-year 2022 --end-year 2024 --label area/cli\n  \
                     issuelens impact --months 6              Issues spanning several areas\n  \
                     issuelens resolution --event labeled     Event timing vs resolution time"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .issuelens.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for command results.\n\n\
                       Formats:\n  \
                         text      Human-readable tables and summaries (default)\n  \
                         json      Machine-readable JSON with camelCase keys\n  \
                         markdown  GitHub-flavored Markdown"
    )]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    verbose: bool,

    /// When to use colors
    #[arg(long, global = true, default_value = "auto")]
    color: ColorChoice,
}

#[derive(Subcommand)]
enum Command {
    /// Rank the most active issues and break them down by category
    #[command(long_about = "Rank the most active issues and break them down by category.\n\n\
        Counts every event per issue in the selected period, min-max normalizes each\n\
        event type, and sums the result into an activity score. Issues are classified\n\
        as Bug, Feature, Docs, Dependency, Infra, or Other from their labels and title.\n\n\
        Without --year or a range, the latest year with dated events is used.\n\n\
        Examples:\n  issuelens categories --year 2024 --top 10\n  \
        issuelens categories --type bug --label area/installer")]
    Categories {
        /// Issues JSON export (default: [data] path from config)
        #[arg(long)]
        data: Option<PathBuf>,

        /// Analyze a single year
        #[arg(long, conflicts_with_all = ["start_year", "end_year"])]
        year: Option<i32>,

        /// First year of an inclusive range (requires --end-year)
        #[arg(long, requires = "end_year")]
        start_year: Option<i32>,

        /// Last year of an inclusive range (requires --start-year)
        #[arg(long, requires = "start_year")]
        end_year: Option<i32>,

        /// Number of issues in the ranking (default: 5)
        #[arg(long)]
        top: Option<usize>,

        /// Only show these categories (comma-separated)
        #[arg(long = "type", value_delimiter = ',')]
        types: Vec<Category>,

        /// Only show issues with a label containing any of these (comma-separated)
        #[arg(long = "label", value_delimiter = ',')]
        labels: Vec<String>,
    },
    /// Find issues that touch more than one area/* label
    #[command(long_about = "Find issues that touch more than one area/* label.\n\n\
        Reports the most impacted areas, how many areas each issue spans, the state\n\
        distribution, and a monthly timeline of when multi-area issues were opened.\n\
        With --months, issues without a creation date are left out.\n\n\
        Examples:\n  issuelens impact\n  issuelens impact --months 12 --top-areas 5")]
    Impact {
        /// Issues JSON export (default: [data] path from config)
        #[arg(long)]
        data: Option<PathBuf>,

        /// Look back this many 30-day months; 0 means all time
        #[arg(long)]
        months: Option<u32>,

        /// Number of areas in the ranking (default: 10)
        #[arg(long)]
        top_areas: Option<usize>,
    },
    /// Correlate the timing of events with resolution time
    #[command(long_about = "Correlate the timing of events with resolution time.\n\n\
        For each event type, pairs the days from creation to its first occurrence with\n\
        the days from creation to the last update, then fits a trendline and computes\n\
        the Pearson correlation.\n\n\
        Examples:\n  issuelens resolution\n  issuelens resolution --event labeled,assigned,milestoned")]
    Resolution {
        /// Issues JSON export (default: [data] path from config)
        #[arg(long)]
        data: Option<PathBuf>,

        /// Event types to correlate (comma-separated; default: labeled,assigned)
        #[arg(long = "event", value_delimiter = ',')]
        events: Vec<String>,
    },
    /// Create a default .issuelens.toml configuration file
    #[command(long_about = "Create a default .issuelens.toml configuration file.\n\n\
        Generates a commented-out template with all available options.\n\
        Fails if .issuelens.toml already exists.")]
    Init,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Clone, PartialEq, Eq, ValueEnum)]
enum ColorChoice {
    /// Auto-detect based on terminal
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl ColorChoice {
    /// Whether to emit ANSI colors on a stream with the given terminal status.
    fn enabled(&self, is_terminal: bool, no_color: bool) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => is_terminal && !no_color,
        }
    }
}

/// A report the CLI can print in every output format.
trait Render: Serialize + Display {
    fn markdown(&self) -> String;
}

impl Render for CategoryOutcome {
    fn markdown(&self) -> String {
        self.to_markdown()
    }
}

impl Render for ImpactReport {
    fn markdown(&self) -> String {
        self.to_markdown()
    }
}

impl Render for ResolutionReport {
    fn markdown(&self) -> String {
        self.to_markdown()
    }
}

fn print_report(report: &impl Render, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{report}"),
        OutputFormat::Markdown => print!("{}", report.markdown()),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report).into_diagnostic()?);
        }
    }
    Ok(())
}

fn print_welcome(use_color: bool) {
    let version = env!("CARGO_PKG_VERSION");

    if use_color {
        println!("\x1b[1missuelens\x1b[0m v{version} - what has the issue tracker been busy with?\n");

        println!("Quick start:");
        println!("  \x1b[36missuelens init\x1b[0m                 Create a .issuelens.toml config file");
        println!("  \x1b[36missuelens categories\x1b[0m           Most active issues of the latest year\n");

        println!("All commands:");
        println!("  \x1b[32mcategories\x1b[0m  Activity ranking and category breakdown");
        println!("  \x1b[32mimpact\x1b[0m      Issues spanning multiple areas");
        println!("  \x1b[32mresolution\x1b[0m  Event timing vs resolution time");
        println!("  \x1b[32minit\x1b[0m        Create default configuration\n");
    } else {
        println!("issuelens v{version} - what has the issue tracker been busy with?\n");

        println!("Quick start:");
        println!("  issuelens init                 Create a .issuelens.toml config file");
        println!("  issuelens categories           Most active issues of the latest year\n");

        println!("All commands:");
        println!("  categories  Activity ranking and category breakdown");
        println!("  impact      Issues spanning multiple areas");
        println!("  resolution  Event timing vs resolution time");
        println!("  init        Create default configuration\n");
    }

    println!("Run 'issuelens <command> --help' for details.");
}

fn init_tracing(verbose: bool, ansi: bool) {
    use tracing_subscriber::EnvFilter;

    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("ISSUELENS_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(ansi)
        .with_target(false)
        .init();
}

fn load_data(cli_path: Option<&Path>, config: &IssueLensConfig) -> Result<Vec<Issue>> {
    let path = cli_path.unwrap_or(config.data.path.as_path());
    if !path.exists() {
        miette::bail!(miette::miette!(
            help = "Pass --data <file>, or set [data] path in .issuelens.toml",
            "Issue export not found: {}",
            path.display()
        ));
    }
    Ok(load_issues(path)?)
}

fn period_from_args(
    year: Option<i32>,
    start_year: Option<i32>,
    end_year: Option<i32>,
) -> Result<Option<Period>> {
    match (year, start_year, end_year) {
        (Some(year), None, None) => Ok(Some(Period::Year(year))),
        (None, Some(start), Some(end)) if start <= end => Ok(Some(Period::Range { start, end })),
        (None, Some(start), Some(end)) => miette::bail!(miette::miette!(
            help = "Swap the values: --start-year is the earlier year",
            "--start-year {start} is after --end-year {end}"
        )),
        (None, None, None) => Ok(None),
        _ => miette::bail!("use either --year, or --start-year together with --end-year"),
    }
}

const DEFAULT_CONFIG: &str = r#"# issuelens configuration
# Command-line flags take precedence over these values.

[data]
# JSON export of issues with their labels and events
# path = "./poetry_issues.json"

[activity]
# top_n = 5
# other_top_k = 10
# title_width = 80
# max_labels = 4
# wrap_at = 60

[impact]
# Look-back window in 30-day months (0 = all time)
# months = 0
# top_areas = 10

[resolution]
# events = ["labeled", "assigned"]
"#;

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();

    let no_color = std::env::var("NO_COLOR").is_ok();
    let use_color = cli.color.enabled(std::io::stdout().is_terminal(), no_color);
    let log_color = cli.color.enabled(std::io::stderr().is_terminal(), no_color);
    init_tracing(cli.verbose, log_color);

    let config = match &cli.config {
        Some(path) => IssueLensConfig::from_file(path)?,
        None => {
            let default_path = Path::new(".issuelens.toml");
            if default_path.exists() {
                IssueLensConfig::from_file(default_path)?
            } else {
                IssueLensConfig::default()
            }
        }
    };
    tracing::debug!(format = %cli.format, data = %config.data.path.display(), "configuration resolved");

    match cli.command {
        None => {
            print_welcome(use_color);
        }
        Some(Command::Categories {
            ref data,
            year,
            start_year,
            end_year,
            top,
            ref types,
            ref labels,
        }) => {
            let period = period_from_args(year, start_year, end_year)?;
            let issues = load_data(data.as_deref(), &config)?;

            let mut options = ActivityOptions::from_config(&config.activity);
            options.period = period;
            if let Some(top) = top {
                options.top_n = top;
            }
            options.filter = IssueFilter::new(types.clone(), labels);

            let outcome = analyze_categories(&issues, &options);
            print_report(&outcome, cli.format)?;
        }
        Some(Command::Impact {
            ref data,
            months,
            top_areas,
        }) => {
            let issues = load_data(data.as_deref(), &config)?;

            let mut options = ImpactOptions::from_config(&config.impact);
            if let Some(months) = months {
                options.months = months;
            }
            if let Some(top_areas) = top_areas {
                options.top_areas = top_areas;
            }

            let report = analyze_impact(&issues, &options);
            print_report(&report, cli.format)?;
        }
        Some(Command::Resolution {
            ref data,
            ref events,
        }) => {
            let issues = load_data(data.as_deref(), &config)?;

            let mut options = ResolutionOptions::from_config(&config.resolution);
            if !events.is_empty() {
                options.events = events.clone();
            }

            let report = analyze_resolution(&issues, &options);
            print_report(&report, cli.format)?;
        }
        Some(Command::Init) => {
            let path = Path::new(".issuelens.toml");
            if path.exists() {
                miette::bail!(".issuelens.toml already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created .issuelens.toml with default configuration");
        }
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "issuelens", &mut std::io::stdout());
        }
    }

    Ok(())
}
