// src/pipeline/run.rs

//! Full run: scrape today's launches, confirm, then email them.

use std::fmt;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use chrono::{Local, NaiveDate};

use crate::error::{AppError, Result};
use crate::models::{Config, Dataset, DatasetStats, EmailStatus};
use crate::pipeline::email::{print_summary, run_emailer};
use crate::pipeline::scrape::run_scraper;
use crate::services::{EmailTemplate, EmailTransport, SendOptions, SendSummary};
use crate::storage::DatasetStorage;
use crate::utils::http::PageFetcher;
use crate::utils::log;

/// Options for `run_pipeline`.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub scrape_limit: Option<usize>,
    pub email_limit: Option<usize>,
    pub scrape_only: bool,
    pub email_only: bool,
    /// Dataset to email with `email_only`; today when unset
    pub date: Option<NaiveDate>,
    /// Test-mode recipient, already resolved
    pub test_recipient: Option<String>,
    /// Ask before sending
    pub confirm: bool,
}

/// What the email phase is about to do, shown before asking to proceed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendPlan {
    pub dataset: PathBuf,
    pub pending: usize,
    pub limit: Option<usize>,
    pub delay_secs: u64,
    pub test_recipient: Option<String>,
}

impl fmt::Display for SendPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.test_recipient {
            Some(to) => writeln!(f, "  Mode:    TEST (all emails to {to})")?,
            None => writeln!(f, "  Mode:    PRODUCTION (real recipients)")?,
        }
        writeln!(f, "  Dataset: {}", self.dataset.display())?;
        writeln!(f, "  Pending: {}", self.pending)?;
        match self.limit {
            Some(limit) => writeln!(f, "  Limit:   {limit}")?,
            None => writeln!(f, "  Limit:   none")?,
        }
        write!(f, "  Delay:   {}s between emails", self.delay_secs)
    }
}

/// Decides whether the email phase may start.
pub trait ConfirmGate: Send + Sync {
    fn confirm(&self, plan: &SendPlan) -> Result<bool>;
}

/// Asks on the terminal; only `y` proceeds.
pub struct StdinConfirm;

impl ConfirmGate for StdinConfirm {
    fn confirm(&self, plan: &SendPlan) -> Result<bool> {
        let mut stdout = io::stdout();
        writeln!(stdout, "\nReady to send emails:\n{plan}")?;
        write!(stdout, "Proceed? [y/N] ")?;
        stdout.flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(answer.trim().eq_ignore_ascii_case("y"))
    }
}

/// Always proceeds. Used for `--no-confirm`.
pub struct AutoConfirm;

impl ConfirmGate for AutoConfirm {
    fn confirm(&self, _plan: &SendPlan) -> Result<bool> {
        Ok(true)
    }
}

/// Collaborators for a full run.
pub struct RunContext<'a> {
    pub config: &'a Config,
    pub fetcher: &'a dyn PageFetcher,
    pub storage: &'a dyn DatasetStorage,
    /// Required unless the run is scrape-only
    pub transport: Option<&'a dyn EmailTransport>,
    /// Sender identity for outgoing mail
    pub from: String,
    pub gate: &'a dyn ConfirmGate,
}

/// What happened during a full run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub dataset: PathBuf,
    pub scraped: Option<DatasetStats>,
    pub emailed: Option<SendSummary>,
    /// The operator declined the confirmation prompt
    pub declined: bool,
}

/// Run scrape and email phases.
///
/// Scraping always writes today's dataset; `date` only picks the file for an
/// email-only run. The transport and template are checked before any work.
pub async fn run_pipeline(ctx: &RunContext<'_>, options: &RunOptions) -> Result<RunReport> {
    if options.scrape_only && options.email_only {
        return Err(AppError::config(
            "--scrape-only and --email-only cannot be combined",
        ));
    }
    if options.date.is_some() && !options.email_only {
        return Err(AppError::config("--date can only be used with --email-only"));
    }

    let email_phase = if options.scrape_only {
        None
    } else {
        let transport = ctx
            .transport
            .ok_or_else(|| AppError::config("email phase requires transport credentials"))?;
        let template = EmailTemplate::load(&ctx.config.emailer.template_path)?;
        Some((transport, template))
    };

    let date = options.date.unwrap_or_else(|| Local::now().date_naive());
    let path = Dataset::path_for(&ctx.config.paths.data_dir, date);
    let total_steps = if options.scrape_only || options.email_only { 1 } else { 2 };
    let mut report = RunReport {
        dataset: path.clone(),
        ..RunReport::default()
    };

    if !options.email_only {
        log::step(1, total_steps, "Scraping launches");
        let outcome = run_scraper(
            ctx.config,
            ctx.fetcher,
            ctx.storage,
            &path,
            options.scrape_limit,
        )
        .await?;
        let empty = outcome.is_empty();
        report.scraped = Some(outcome.stats);
        if empty {
            log::warn("Nothing scraped, skipping the email phase");
            return Ok(report);
        }
    }

    let Some((transport, template)) = email_phase else {
        return Ok(report);
    };

    log::step(total_steps, total_steps, "Sending emails");
    let dataset = ctx.storage.read(&path).await?;
    let plan = SendPlan {
        dataset: path.clone(),
        pending: dataset
            .records
            .iter()
            .filter(|r| r.email_status == EmailStatus::Pending)
            .count(),
        limit: options.email_limit.filter(|&n| n > 0),
        delay_secs: ctx.config.emailer.send_delay_secs,
        test_recipient: options.test_recipient.clone(),
    };

    if options.confirm && !ctx.gate.confirm(&plan)? {
        log::warn("Email phase cancelled");
        report.declined = true;
        print_summary(&SendSummary::default(), &path);
        return Ok(report);
    }

    let send_options = SendOptions::from_config(&ctx.config.emailer, ctx.from.clone())
        .with_limit(options.email_limit)
        .with_test_recipient(options.test_recipient.clone());
    let summary = run_emailer(
        ctx.config,
        transport,
        ctx.storage,
        &template,
        &path,
        send_options,
    )
    .await?;
    report.emailed = Some(summary);

    log::success("Run complete");
    Ok(report)
}
