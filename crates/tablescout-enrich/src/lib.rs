//! Best-effort lead enrichment: contact email discovery and social profile
//! discovery.
//!
//! Everything in this crate is silent-fail per lead. A website that refuses
//! connections or a Graph API that rejects the token leaves the lead
//! untouched and the pipeline moving.

mod email;
mod social;

pub use email::{enrich_emails, EmailDiscovery, EmailFinder};
pub use social::{enrich_social, SocialFinder, SocialProfile};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
