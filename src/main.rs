use chrono::{Datelike, Local};
use clap::{Parser, Subcommand};
use console::style;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use newsloom::ai::{GeminiProvider, PacedGenerator};
use newsloom::assets::UnsplashClient;
use newsloom::collect::{HtmlScraper, RssFetcher};
use newsloom::deliver::SmtpMailer;
use newsloom::pipeline::{CategoryStatus, Pipeline, RunSummary};
use newsloom::types::Category;
use newsloom::ConfigLoader;

/// Parse a content category from string
fn parse_category(s: &str) -> Result<Category, String> {
    s.parse()
}

#[derive(Parser)]
#[command(name = "newsloom")]
#[command(
    version,
    about = "Scheduled news analysis, drafting and mail delivery"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, help = "Path to the configuration file")]
    config: Option<PathBuf>,

    #[arg(long)]
    verbose: bool,

    #[arg(long, short)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline for today's scheduled categories
    Run {
        #[arg(
            long,
            value_parser = parse_category,
            help = "Category override: tech, bio, patent (repeatable; default: weekday schedule)"
        )]
        category: Vec<Category>,

        #[arg(long, help = "History file override")]
        history: Option<PathBuf>,

        #[arg(long = "dry-run", help = "Stop after topic selection, send nothing")]
        dry_run: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(long, help = "Output as JSON instead of TOML")]
        json: bool,
    },
    /// Show the configuration file path
    Path,
    /// Write a starter configuration file
    Init {
        #[arg(long, help = "Overwrite an existing file")]
        force: bool,
    },
}

fn main() -> ExitCode {
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Run {
            category,
            history,
            dry_run,
        } => {
            let mut config = ConfigLoader::load(cli.config.as_deref())?;
            if let Some(history) = history {
                config.history.path = history;
            }

            let categories = if category.is_empty() {
                Category::scheduled_for(Local::now().weekday())
            } else {
                category
            };

            let provider = GeminiProvider::new(&config.llm)?;
            let generator = PacedGenerator::new(
                Arc::new(provider),
                Duration::from_secs(config.llm.pacing_secs),
            );
            let fetcher = RssFetcher::new()?;
            let scraper = HtmlScraper::new()?;
            let searcher = UnsplashClient::new(&config.images)?;
            let sender = SmtpMailer::new(&config.mail)?;

            let pipeline = Pipeline::new(
                &config, &generator, &fetcher, &scraper, &searcher, &sender,
            );

            let rt = Runtime::new()?;
            let summary = rt.block_on(pipeline.run(&categories, dry_run))?;
            print_summary(&summary);

            if summary.failed() > 0 {
                anyhow::bail!("{} of {} categories failed", summary.failed(), summary.outcomes.len());
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { json } => {
                ConfigLoader::show_config(cli.config.as_deref(), json)?;
            }
            ConfigAction::Path => {
                println!("{}", ConfigLoader::default_config_path().display());
            }
            ConfigAction::Init { force } => {
                let path = ConfigLoader::init(cli.config.as_deref(), force)?;
                println!("Wrote {}", path.display());
            }
        },
    }

    Ok(())
}

fn print_summary(summary: &RunSummary) {
    for outcome in &summary.outcomes {
        let category = style(outcome.category.label()).bold();
        match &outcome.status {
            CategoryStatus::Published { topics, subject } => {
                println!(
                    "{} {} ({} topics): {}",
                    style("published").green(),
                    category,
                    topics,
                    subject
                );
            }
            CategoryStatus::Skipped { found, needed } => {
                println!(
                    "{} {}: {} fresh candidates, {} needed",
                    style("skipped").yellow(),
                    category,
                    found,
                    needed
                );
            }
            CategoryStatus::DryRun { titles } => {
                println!("{} {}:", style("dry-run").cyan(), category);
                for title in titles {
                    println!("  - {}", title);
                }
            }
            CategoryStatus::Failed { error } => {
                println!("{} {}: {}", style("failed").red(), category, error);
            }
        }
    }
}
