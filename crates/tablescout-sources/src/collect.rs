//! Multi-source lead collection.
//!
//! Runs every configured source, continuing past individual source failures
//! with a warning, then de-duplicates across sources by lowercased
//! name+address.

use std::collections::HashSet;

use tablescout_core::{AppConfig, Lead};

use crate::error::SourceError;
use crate::geocode::parse_geocode;
use crate::google_places::GooglePlacesClient;
use crate::outscraper::OutscraperClient;
use crate::yelp::YelpClient;

/// Knobs shared by all source adapters for one collection run.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub radius_km: u32,
    /// Per-source record cap (Outscraper only; the other providers have
    /// their own fixed page sizes).
    pub limit: u32,
    pub target_independent: bool,
    pub exclude_doordash: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            radius_km: 10,
            limit: 100,
            target_independent: false,
            exclude_doordash: false,
        }
    }
}

/// The set of configured source adapters. A `None` slot means the provider's
/// API key was not set and the source is skipped.
#[derive(Default)]
pub struct LeadSources {
    pub google_places: Option<GooglePlacesClient>,
    pub yelp: Option<YelpClient>,
    pub outscraper: Option<OutscraperClient>,
}

impl LeadSources {
    /// Builds clients for every provider with a configured API key.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if a `reqwest::Client` cannot be
    /// constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, SourceError> {
        let google_places = match &config.google_places_api_key {
            Some(key) => Some(GooglePlacesClient::new(
                key,
                config.request_timeout_secs,
                &config.user_agent,
                config.max_retries,
                config.retry_backoff_base_secs,
            )?),
            None => None,
        };
        let yelp = match &config.yelp_api_key {
            Some(key) => Some(YelpClient::new(
                key,
                config.request_timeout_secs,
                &config.user_agent,
                config.max_retries,
                config.retry_backoff_base_secs,
            )?),
            None => None,
        };
        let outscraper = match &config.outscraper_api_key {
            Some(key) => Some(OutscraperClient::new(
                key,
                config.request_timeout_secs,
                &config.user_agent,
                config.max_retries,
                config.retry_backoff_base_secs,
            )?),
            None => None,
        };
        Ok(Self {
            google_places,
            yelp,
            outscraper,
        })
    }

    /// True when no provider key is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.google_places.is_none() && self.yelp.is_none() && self.outscraper.is_none()
    }
}

/// Collect leads from every configured source for `area`.
///
/// A failing source contributes zero leads; other sources still run.
/// Returns the de-duplicated union in source order.
pub async fn collect_leads(
    sources: &LeadSources,
    area: &str,
    options: &SearchOptions,
) -> Vec<Lead> {
    let geocode = parse_geocode(area);
    let mut all: Vec<Lead> = Vec::new();

    if let Some(client) = &sources.google_places {
        match client
            .search(area, options.radius_km, geocode, options.target_independent)
            .await
        {
            Ok(leads) => {
                tracing::info!(count = leads.len(), "collected Google Places leads");
                all.extend(leads);
            }
            Err(e) => {
                tracing::warn!(source = "google_places", error = %e, "source failed");
            }
        }
    }

    if let Some(client) = &sources.yelp {
        match client.search(area).await {
            Ok(leads) => {
                tracing::info!(count = leads.len(), "collected Yelp leads");
                all.extend(leads);
            }
            Err(e) => {
                tracing::warn!(source = "yelp", error = %e, "source failed");
            }
        }
    }

    if let Some(client) = &sources.outscraper {
        match client
            .search(
                area,
                options.limit,
                geocode,
                options.target_independent,
                options.exclude_doordash,
            )
            .await
        {
            Ok(leads) => {
                tracing::info!(count = leads.len(), "collected Outscraper leads");
                all.extend(leads);
            }
            Err(e) => {
                tracing::warn!(source = "outscraper", error = %e, "source failed");
            }
        }
    }

    // Providers issue different opaque IDs for the same restaurant, so
    // cross-source dedup keys on name+address.
    let mut seen: HashSet<String> = HashSet::new();
    all.retain(|lead| seen.insert(format!("{}-{}", lead.name, lead.address).to_lowercase()));

    all
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn yelp_server(businesses: serde_json::Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v3/businesses/search"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "businesses": businesses })),
            )
            .mount(&server)
            .await;
        server
    }

    fn business(id: &str, name: &str, address: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "name": name,
            "review_count": 3,
            "location": {"display_address": [address]}
        })
    }

    #[tokio::test]
    async fn duplicate_leads_across_sources_are_merged() {
        let yelp = yelp_server(serde_json::json!([
            business("y1", "Joe's Diner", "1 Main St"),
            business("y2", "JOE'S DINER", "1 MAIN ST"),
            business("y3", "Rosa's Cantina", "2 Elm St"),
        ]))
        .await;

        let sources = LeadSources {
            yelp: Some(
                YelpClient::with_base_url("k", 5, "t", 0, 0, &yelp.uri()).unwrap(),
            ),
            ..LeadSources::default()
        };

        let leads = collect_leads(&sources, "Fresno, CA", &SearchOptions::default()).await;
        assert_eq!(leads.len(), 2);
    }

    #[tokio::test]
    async fn failing_source_contributes_zero_leads() {
        let broken = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&broken)
            .await;
        let yelp = yelp_server(serde_json::json!([
            business("y1", "Joe's Diner", "1 Main St")
        ]))
        .await;

        let sources = LeadSources {
            outscraper: Some(
                OutscraperClient::with_base_url("k", 5, "t", 0, 0, &broken.uri()).unwrap(),
            ),
            yelp: Some(
                YelpClient::with_base_url("k", 5, "t", 0, 0, &yelp.uri()).unwrap(),
            ),
            ..LeadSources::default()
        };

        let leads = collect_leads(&sources, "Fresno, CA", &SearchOptions::default()).await;
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].name, "Joe's Diner");
    }

    #[tokio::test]
    async fn no_configured_sources_yields_empty() {
        let sources = LeadSources::default();
        assert!(sources.is_empty());
        let leads = collect_leads(&sources, "Fresno, CA", &SearchOptions::default()).await;
        assert!(leads.is_empty());
    }
}
