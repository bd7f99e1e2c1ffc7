//! Pipeline entry points for outreach operations.
//!
//! - `run_scraper`: Fetch today's launches and write the dataset
//! - `run_emailer`: Send to every pending record of a dataset
//! - `run_pipeline`: Scrape, confirm, then send

pub mod email;
pub mod run;
pub mod scrape;
pub mod validate;

pub use email::{resolve_dataset, run_emailer};
pub use run::{
    AutoConfirm, ConfirmGate, RunContext, RunOptions, RunReport, SendPlan, StdinConfirm,
    run_pipeline,
};
pub use scrape::{ScrapeOutcome, run_scraper};
pub use validate::{run_info, run_validate};
