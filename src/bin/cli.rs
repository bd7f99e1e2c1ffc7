//! Launch Outreach CLI
//!
//! Scrape today's launches, review the CSV, then email the makers.

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use launch_outreach::{
    config::{self, Credentials},
    error::Result,
    models::Dataset,
    pipeline::{self, AutoConfirm, ConfirmGate, RunContext, RunOptions, StdinConfirm},
    services::{EmailTemplate, EmailTransport, ResendTransport, SendOptions},
    storage::LocalStorage,
    utils::http::HttpFetcher,
};

/// Launch Outreach - scrape product launches and email their makers
#[derive(Parser, Debug)]
#[command(
    name = "launch-outreach",
    version,
    about = "Scrape product launches and send maker outreach emails"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape today's launches into a dataset file
    Scrape {
        /// Maximum number of launches (0 = all)
        limit: Option<usize>,
    },

    /// Send emails for a dataset
    Email {
        /// Dataset file path or YYYY-MM-DD date
        dataset: String,

        /// Maximum number of emails (0 = all)
        limit: Option<usize>,

        /// Send every email to the test address instead
        #[arg(long)]
        test: bool,

        /// Test address (default: TEST_EMAIL)
        #[arg(long)]
        test_email: Option<String>,
    },

    /// Run the full pipeline: scrape → confirm → email
    Run {
        #[arg(long)]
        scrape_limit: Option<usize>,

        #[arg(long)]
        email_limit: Option<usize>,

        /// Only scrape
        #[arg(long, conflicts_with = "email_only")]
        scrape_only: bool,

        /// Only email an existing dataset
        #[arg(long)]
        email_only: bool,

        /// Send without asking for confirmation
        #[arg(long)]
        no_confirm: bool,

        /// Dataset date to email (default: today)
        #[arg(long, requires = "email_only")]
        date: Option<NaiveDate>,

        /// Send every email to the test address instead
        #[arg(long)]
        test: bool,

        /// Test address (default: TEST_EMAIL)
        #[arg(long)]
        test_email: Option<String>,
    },

    /// Validate configuration, template and credentials
    Validate,

    /// Show status counts for a dataset
    Info {
        /// Dataset date (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Test recipient for `--test`, or `None` in production mode.
fn test_recipient(
    credentials: &Credentials,
    test: bool,
    flag: Option<&str>,
) -> Result<Option<String>> {
    if !test {
        return Ok(None);
    }
    credentials.resolve_test_email(flag).map(Some)
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    config::load_dotenv();

    let config = config::load_config(&cli.config);
    let storage = LocalStorage::new(&config.paths.data_dir);
    let today = Local::now().date_naive();

    match cli.command {
        Command::Scrape { limit } => {
            let path = storage.dataset_path(today);
            let fetcher = HttpFetcher::new(&config.scraper)?;
            let outcome = pipeline::run_scraper(&config, &fetcher, &storage, &path, limit).await?;
            if !outcome.is_empty() {
                log::info!("Review {} before sending", path.display());
            }
        }

        Command::Email {
            dataset,
            limit,
            test,
            test_email,
        } => {
            let credentials = Credentials::from_env()?;
            let recipient = test_recipient(&credentials, test, test_email.as_deref())?;
            let template = EmailTemplate::load(&config.emailer.template_path)?;
            let path = pipeline::resolve_dataset(&dataset, storage.data_dir());

            let transport = ResendTransport::new(&config.emailer, &credentials.api_key)?;
            let options = SendOptions::from_config(&config.emailer, &credentials.from_email)
                .with_limit(limit)
                .with_test_recipient(recipient);
            pipeline::run_emailer(&config, &transport, &storage, &template, &path, options)
                .await?;
        }

        Command::Run {
            scrape_limit,
            email_limit,
            scrape_only,
            email_only,
            no_confirm,
            date,
            test,
            test_email,
        } => {
            let credentials = if scrape_only {
                None
            } else {
                Some(Credentials::from_env()?)
            };
            let recipient = match &credentials {
                Some(creds) => test_recipient(creds, test, test_email.as_deref())?,
                None => None,
            };
            let transport = match &credentials {
                Some(creds) => Some(ResendTransport::new(&config.emailer, &creds.api_key)?),
                None => None,
            };

            let fetcher = HttpFetcher::new(&config.scraper)?;
            let gate: &dyn ConfirmGate = if no_confirm {
                &AutoConfirm
            } else {
                &StdinConfirm
            };
            let ctx = RunContext {
                config: &config,
                fetcher: &fetcher,
                storage: &storage,
                transport: transport.as_ref().map(|t| t as &dyn EmailTransport),
                from: credentials
                    .as_ref()
                    .map(|c| c.from_email.clone())
                    .unwrap_or_default(),
                gate,
            };
            let options = RunOptions {
                scrape_limit,
                email_limit,
                scrape_only,
                email_only,
                date,
                test_recipient: recipient,
                confirm: !no_confirm,
            };
            pipeline::run_pipeline(&ctx, &options).await?;
        }

        Command::Validate => {
            pipeline::run_validate(&config, Credentials::from_env())?;
            log::info!("All validations passed!");
        }

        Command::Info { date } => {
            let path = Dataset::path_for(storage.data_dir(), date.unwrap_or(today));
            pipeline::run_info(&storage, &path).await?;
        }
    }

    Ok(())
}
