//! Lead source adapters.
//!
//! Each adapter wraps one external restaurant directory and normalizes its
//! records into the common [`tablescout_core::Lead`] shape. Per-record parse
//! failures are skipped with a warning; an adapter errors only on missing
//! credentials or total request failure, which the collector treats as "this
//! source contributed zero leads".

mod collect;
mod error;
mod geocode;
mod google_places;
mod outscraper;
mod retry;
mod yelp;

pub use collect::{collect_leads, LeadSources, SearchOptions};
pub use error::SourceError;
pub use geocode::{parse_geocode, Geocode};
pub use google_places::GooglePlacesClient;
pub use outscraper::OutscraperClient;
pub use yelp::YelpClient;
