//! Bio CLI - Command-line interface
//!
//! Usage:
//!   bio extract <html> [--title <title>] [--categories <a,b>]
//!   bio timeline <html> [--start <year>] [--end <year>]
//!   bio batch <dir>

use std::path::{Path, PathBuf};

use anyhow::Context;
use bio_cli::{write_dump, Pipeline, Profile};
use bio_core::config::{AppConfig, LoggingConfig};
use bio_parser::WikiPage;
use clap::{Parser, Subcommand};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "bio")]
#[command(about = "Biography extraction from saved Wikipedia articles")]
#[command(version)]
struct Cli {
    /// TOML configuration file (BIO_* environment variables override it)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline on one saved article
    Extract {
        /// Path to the article HTML
        html: PathBuf,
        /// Page title (defaults to the file name)
        #[arg(long)]
        title: Option<String>,
        /// Comma-separated category names (defaults to the page's category links)
        #[arg(long, value_delimiter = ',')]
        categories: Option<Vec<String>>,
        /// First year of the filtered timeline view
        #[arg(long)]
        start: Option<i32>,
        /// Last year of the filtered timeline view
        #[arg(long)]
        end: Option<i32>,
    },
    /// Print the timeline and its analysis as JSON
    Timeline {
        /// Path to the article HTML
        html: PathBuf,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        start: Option<i32>,
        #[arg(long)]
        end: Option<i32>,
    },
    /// Process every `.html` file in a directory
    Batch {
        /// Directory of saved articles
        dir: PathBuf,
    },
}

#[derive(Serialize)]
struct TimelineDump<'a> {
    events: &'a [bio_core::TimelineEvent],
    activity_periods: &'a [bio_core::ActivityPeriod],
    turning_points: &'a [bio_core::TurningPoint],
}

impl<'a> TimelineDump<'a> {
    fn new(profile: &'a Profile) -> Self {
        Self {
            events: &profile.timeline,
            activity_periods: &profile.analysis.activity_periods,
            turning_points: &profile.analysis.turning_points,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config.logging);

    match cli.command {
        Commands::Extract {
            html,
            title,
            categories,
            start,
            end,
        } => {
            let pipeline = Pipeline::new(&config).with_range(start, end);
            let page = load_page(&html, title.as_deref())?;
            let profile = pipeline.process(&page, categories.as_deref());

            let out = &config.output;
            write_dump(&out.directory, "sections", &profile.sections, out.pretty)?;
            write_dump(&out.directory, "infobox", &profile.infobox, out.pretty)?;
            write_dump(&out.directory, "timeline", &TimelineDump::new(&profile), out.pretty)?;
            write_dump(&out.directory, "network", &profile.graph, out.pretty)?;
            let path = write_dump(&out.directory, "profile", &profile, out.pretty)?;
            println!("{}", path.display());
        }
        Commands::Timeline {
            html,
            title,
            start,
            end,
        } => {
            let pipeline = Pipeline::new(&config).with_range(start, end);
            let page = load_page(&html, title.as_deref())?;
            let profile = pipeline.process(&page, None);

            let json = serde_json::to_string_pretty(&serde_json::json!({
                "timeline": TimelineDump::new(&profile),
                "filtered_events": profile.analysis.filtered_events,
                "events_per_year": profile.analysis.events_per_year,
            }))?;
            println!("{}", json);
        }
        Commands::Batch { dir } => {
            let pipeline = Pipeline::new(&config);
            let profiles = run_batch(&pipeline, &dir)?;
            let out = &config.output;
            let path = write_dump(&out.directory, "profiles", &profiles, out.pretty)?;
            println!("{} pages -> {}", profiles.len(), path.display());
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?
            .with_env_override()?,
        None => AppConfig::from_env()?,
    };
    Ok(config)
}

fn init_tracing(config: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    if config.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_page(path: &Path, title: Option<&str>) -> anyhow::Result<WikiPage> {
    WikiPage::from_file(path, title).with_context(|| format!("Failed to load {}", path.display()))
}

/// Process every article in `dir`; a failing page is logged and skipped
fn run_batch(pipeline: &Pipeline, dir: &Path) -> anyhow::Result<Vec<Profile>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "html" || ext == "htm"))
        .collect();
    paths.sort();

    let mut profiles = Vec::new();
    for path in paths {
        match WikiPage::from_file(&path, None) {
            Ok(page) => profiles.push(pipeline.process(&page, None)),
            Err(e) => tracing::warn!("Skipping {}: {}", path.display(), e),
        }
    }
    Ok(profiles)
}
