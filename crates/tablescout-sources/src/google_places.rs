//! Google Places lead source.
//!
//! Text search for restaurants in an area, followed by a per-place details
//! fetch for contact fields the search response omits (website, phone).
//! Details failures degrade gracefully: the lead is kept with whatever the
//! search response carried.

use std::time::Duration;

use chrono::Utc;
use reqwest::{Client, Url};
use serde::Deserialize;
use tablescout_core::Lead;

use crate::error::SourceError;
use crate::geocode::Geocode;
use crate::retry::retry_with_backoff;

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";

/// Name fragments that mark a place as a chain, filtered out when the
/// caller targets independent restaurants.
const CHAIN_INDICATORS: &[&str] = &[
    "mcdonald",
    "burger king",
    "subway",
    "taco bell",
    "kfc",
    "pizza hut",
    "domino",
    "starbucks",
    "dunkin",
    "wendy",
    "chipotle",
    "panera",
    "olive garden",
    "applebees",
    "chilis",
    "outback",
    "red lobster",
];

#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct PlaceResult {
    name: String,
    formatted_address: String,
    place_id: String,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    user_ratings_total: Option<u32>,
    #[serde(default)]
    formatted_phone_number: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    #[serde(default)]
    result: Option<PlaceDetails>,
}

#[derive(Debug, Default, Deserialize)]
struct PlaceDetails {
    #[serde(default)]
    website: Option<String>,
    #[serde(default)]
    formatted_phone_number: Option<String>,
    #[serde(default)]
    photos: Vec<serde_json::Value>,
}

/// Client for the Google Places text-search and details endpoints.
pub struct GooglePlacesClient {
    client: Client,
    api_key: String,
    base_url: Url,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl GooglePlacesClient {
    /// Creates a client pointed at the production Places API.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, SourceError> {
        Self::with_base_url(
            api_key,
            timeout_secs,
            user_agent,
            max_retries,
            backoff_base_secs,
            DEFAULT_BASE_URL,
        )
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] on client construction failure or
    /// [`SourceError::InvalidBaseUrl`] on an unparseable base URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
        base_url: &str,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        let base_url =
            Url::parse(base_url).map_err(|e| SourceError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            max_retries,
            backoff_base_secs,
        })
    }

    /// Searches for restaurants in `area` and normalizes results into leads.
    ///
    /// Malformed result records are skipped with a warning. When
    /// `target_independent` is set, places matching known chain names are
    /// dropped before the details fetch.
    ///
    /// # Errors
    ///
    /// - [`SourceError::ApiError`] when the API status is neither `OK` nor
    ///   `ZERO_RESULTS`.
    /// - [`SourceError::RateLimited`] / [`SourceError::Http`] after retries
    ///   are exhausted.
    /// - [`SourceError::Deserialize`] when the envelope does not parse.
    pub async fn search(
        &self,
        area: &str,
        radius_km: u32,
        geocode: Option<Geocode>,
        target_independent: bool,
    ) -> Result<Vec<Lead>, SourceError> {
        let query = format!("restaurants {area}");
        let mut url = self.endpoint("/maps/api/place/textsearch/json");
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("query", &query)
                .append_pair("key", &self.api_key)
                .append_pair("type", "restaurant");
            if let Some(geo) = geocode {
                pairs.append_pair("location", &format!("{},{}", geo.lat, geo.lng));
                let radius_m = u64::from(geo.radius_km.unwrap_or(radius_km)) * 1000;
                pairs.append_pair("radius", &radius_m.to_string());
            }
        }

        let body = self.request_json(url).await?;
        let envelope: TextSearchResponse =
            serde_json::from_value(body).map_err(|e| SourceError::Deserialize {
                context: format!("text search for \"{query}\""),
                source: e,
            })?;

        if envelope.status != "OK" && envelope.status != "ZERO_RESULTS" {
            return Err(SourceError::ApiError {
                provider: "google_places".to_owned(),
                message: match envelope.error_message {
                    Some(detail) => format!("{}: {detail}", envelope.status),
                    None => envelope.status,
                },
            });
        }

        let mut leads = Vec::new();
        for raw in envelope.results {
            let place: PlaceResult = match serde_json::from_value(raw) {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping malformed Places record");
                    continue;
                }
            };

            if target_independent && is_chain(&place.name) {
                tracing::debug!(name = %place.name, "filtered chain restaurant");
                continue;
            }

            let details = self.details(&place.place_id).await.unwrap_or_else(|e| {
                tracing::warn!(
                    place_id = %place.place_id,
                    error = %e,
                    "details fetch failed, keeping search fields only"
                );
                PlaceDetails::default()
            });

            leads.push(self.to_lead(place, details));
        }

        Ok(leads)
    }

    async fn details(&self, place_id: &str) -> Result<PlaceDetails, SourceError> {
        let mut url = self.endpoint("/maps/api/place/details/json");
        url.query_pairs_mut()
            .append_pair("place_id", place_id)
            .append_pair("key", &self.api_key)
            .append_pair("fields", "website,formatted_phone_number,photos");

        let body = self.request_json(url).await?;
        let envelope: DetailsResponse =
            serde_json::from_value(body).map_err(|e| SourceError::Deserialize {
                context: format!("details for place {place_id}"),
                source: e,
            })?;
        Ok(envelope.result.unwrap_or_default())
    }

    fn to_lead(&self, place: PlaceResult, details: PlaceDetails) -> Lead {
        let mut parts = place.formatted_address.split(',').map(str::trim);
        let _street = parts.next();
        let city = parts.next().map(str::to_owned);
        let state = parts.next().map(str::to_owned);

        Lead {
            name: place.name,
            address: place.formatted_address.clone(),
            place_id: Some(place.place_id),
            city,
            state,
            source: "google_places".to_owned(),
            website: details.website,
            phone: details
                .formatted_phone_number
                .or(place.formatted_phone_number),
            rating: place.rating,
            total_ratings: place.user_ratings_total.unwrap_or(0),
            has_photos: !details.photos.is_empty(),
            scraped_at: Some(Utc::now()),
            ..Lead::default()
        }
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(path);
        url
    }

    async fn request_json(&self, url: Url) -> Result<serde_json::Value, SourceError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            async move {
                let response = self.client.get(url.clone()).send().await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(SourceError::RateLimited {
                        provider: "google_places".to_owned(),
                        retry_after_secs,
                    });
                }

                if !status.is_success() {
                    return Err(SourceError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }

                let body = response.text().await?;
                serde_json::from_str(&body).map_err(|e| SourceError::Deserialize {
                    context: url.path().to_owned(),
                    source: e,
                })
            }
        })
        .await
    }
}

fn is_chain(name: &str) -> bool {
    let lower = name.to_lowercase();
    CHAIN_INDICATORS.iter().any(|chain| lower.contains(chain))
}

#[cfg(test)]
#[path = "google_places_test.rs"]
mod tests;
