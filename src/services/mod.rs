//! Service layer for the outreach application.
//!
//! This module contains the business logic for:
//! - Listing extraction (`ListingExtractor`)
//! - Contact enrichment (`Enricher`)
//! - Template rendering (`EmailTemplate`)
//! - Email delivery (`EmailTransport`, `ResendTransport`)
//! - Status-tracked sending (`EmailSender`)

mod enricher;
mod listing;
mod sender;
mod template;
mod transport;

pub use enricher::{Enricher, PageScan, SocialKind};
pub use listing::{DetailInfo, ListingExtractor, ListingItem};
pub use sender::{EmailSender, SendOptions, SendSummary};
pub use template::{EmailTemplate, FALLBACK_FIRST_NAME, RenderedEmail, first_name, render};
pub use transport::{EmailTransport, OutgoingEmail, ResendTransport};
