//! Command-line front end for the profile filters.
//!
//! Reads a CSV export, runs one pipeline and writes the labeled, filtered and
//! URL-only artifacts.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nominatim_client::NominatimClient;
use profile_filter::geocoder::GeocoderExt;
use profile_filter::{
    keyword_projection, parse_keyword_list, Dataset, FilterSession, KeywordSet,
    NominatimGeocoder, Projection, DEFAULT_CASE_SENSITIVE,
};

mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "profile-filter")]
#[command(about = "Filter profile exports by country or by keywords")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve each profile's location to a country and keep selected countries
    Location {
        /// CSV export with a "Location" column
        input: PathBuf,

        /// Country to keep (repeatable). Without any, every row is kept
        #[arg(short, long = "country")]
        countries: Vec<String>,

        /// Print the countries found in the file and exit
        #[arg(long)]
        list_countries: bool,

        /// Directory for the exported CSV files
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },

    /// Keep profiles whose column contains one of the keywords
    Keywords {
        /// CSV export to filter
        input: PathBuf,

        /// Column to search
        #[arg(short, long)]
        column: String,

        /// Case-sensitive keywords, comma separated (whitespace is significant)
        #[arg(long = "cs")]
        case_sensitive: Option<String>,

        /// Case-insensitive keywords, comma separated (whitespace is significant)
        #[arg(long = "ci", default_value = "")]
        case_insensitive: String,

        /// Directory for the exported CSV files
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,profile_filter=debug,nominatim_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

#[tokio::main]
async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Location {
            input,
            countries,
            list_countries,
            out,
        } => run_location(&input, countries, list_countries, &out).await,
        Commands::Keywords {
            input,
            column,
            case_sensitive,
            case_insensitive,
            out,
        } => {
            let keywords = keyword_set(case_sensitive.as_deref(), &case_insensitive);
            run_keywords(&input, &column, &keywords, &out)
        }
    }
}

async fn run_location(
    input: &Path,
    countries: Vec<String>,
    list_countries: bool,
    out: &Path,
) -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    let dataset = load(input)?;

    let client = NominatimClient::with_options(
        &config.user_agent,
        &config.nominatim_url,
        config.lookup_timeout,
    )
    .context("Failed to create geocoding client")?;
    let resolver_config = config.resolver_config();
    let client = client.with_language(resolver_config.language.clone());
    let geocoder =
        NominatimGeocoder::new(client).rate_limited(resolver_config.requests_per_second);

    let session = FilterSession::new(geocoder, resolver_config);
    let labeled = session
        .label_locations(dataset)
        .await
        .context("Failed to label locations")?;

    if list_countries {
        for country in &labeled.countries {
            println!("{country}");
        }
        return Ok(());
    }

    let selected: HashSet<String> = countries.into_iter().collect();
    let unknown: Vec<_> = selected
        .iter()
        .filter(|c| !labeled.countries.contains(*c))
        .collect();
    if !unknown.is_empty() {
        eprintln!(
            "{} no profile resolved to: {}",
            "Warning:".yellow().bold(),
            unknown
                .iter()
                .map(|c| c.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    let projection = session.filter_locations(&labeled, &selected)?;
    export(&projection, out)
}

fn run_keywords(input: &Path, column: &str, keywords: &KeywordSet, out: &Path) -> Result<()> {
    if keywords.has_empty_term() {
        eprintln!(
            "{} a keyword list contains an empty entry, every row with a value will match",
            "Warning:".yellow().bold()
        );
    }

    let dataset = load(input)?;
    let projection = keyword_projection(&dataset, column, keywords)
        .with_context(|| format!("Failed to filter column {column:?}"))?;
    export(&projection, out)
}

/// Keyword lists from the raw flag values; without `--cs` the executive
/// title defaults apply.
fn keyword_set(case_sensitive: Option<&str>, case_insensitive: &str) -> KeywordSet {
    let case_sensitive = match case_sensitive {
        Some(raw) => parse_keyword_list(raw),
        None => DEFAULT_CASE_SENSITIVE.iter().map(|s| s.to_string()).collect(),
    };
    KeywordSet {
        case_sensitive,
        case_insensitive: parse_keyword_list(case_insensitive),
    }
}

fn load(input: &Path) -> Result<Dataset> {
    tracing::info!(input = %input.display(), "Loading profiles");
    Dataset::from_path(input).with_context(|| format!("Failed to read {}", input.display()))
}

fn export(projection: &Projection, out: &Path) -> Result<()> {
    let summary = projection.summary();
    let paths = projection
        .write_to_dir(out)
        .with_context(|| format!("Failed to write exports to {}", out.display()))?;

    println!(
        "Number of rows (original): {}",
        summary.unfiltered_rows.to_string().bold()
    );
    println!(
        "Number of rows (filtered): {}",
        summary.filtered_rows.to_string().bold()
    );
    println!();
    println!("{} {}", "Unfiltered labeled:".green(), paths.unfiltered.display());
    println!("{} {}", "Filtered:".green(), paths.filtered.display());
    println!("{} {}", "Profile URLs:".green(), paths.profile_urls.display());
    Ok(())
}
