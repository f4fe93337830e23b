//! Outscraper lead source.
//!
//! A generic Google Maps scraping provider. Its field names drift between
//! plan tiers, so records are read from untyped JSON with ordered fallback
//! keys rather than a fixed struct. Records without a name are dropped.

use std::time::Duration;

use chrono::Utc;
use reqwest::{Client, Url};
use serde_json::Value;
use tablescout_core::Lead;

use crate::error::SourceError;
use crate::geocode::Geocode;
use crate::retry::retry_with_backoff;

const DEFAULT_BASE_URL: &str = "https://api.outscraper.cloud";

/// Client for the Outscraper `google-maps-search` endpoint (`X-API-KEY` auth).
pub struct OutscraperClient {
    client: Client,
    api_key: String,
    base_url: Url,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl OutscraperClient {
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

    /// Searches for restaurants in `area`, up to `limit` records.
    ///
    /// When `target_independent` is set, the query asks the provider for
    /// independent restaurants; when `exclude_doordash` is set, a negative
    /// site filter is appended.
    ///
    /// # Errors
    ///
    /// - [`SourceError::RateLimited`] / [`SourceError::Http`] after retries
    ///   are exhausted.
    /// - [`SourceError::UnexpectedStatus`] on non-2xx responses.
    /// - [`SourceError::Deserialize`] when the body is not JSON.
    pub async fn search(
        &self,
        area: &str,
        limit: u32,
        geocode: Option<Geocode>,
        target_independent: bool,
        exclude_doordash: bool,
    ) -> Result<Vec<Lead>, SourceError> {
        let mut query = if target_independent {
            format!("independent restaurants, {area}")
        } else {
            format!("restaurants, {area}")
        };
        if exclude_doordash {
            query.push_str(" -site:doordash.com");
        }

        let mut url = self.base_url.clone();
        url.set_path("/google-maps-search");
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("query", &query)
                .append_pair("limit", &limit.to_string())
                .append_pair("async", "false");
            if let Some(geo) = geocode {
                pairs.append_pair("latitude", &geo.lat.to_string());
                pairs.append_pair("longitude", &geo.lng.to_string());
                if let Some(radius) = geo.radius_km {
                    pairs.append_pair("radius", &radius.to_string());
                }
            }
        }

        let body = retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            async move {
                let response = self
                    .client
                    .get(url.clone())
                    .header("X-API-KEY", &self.api_key)
                    .send()
                    .await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    return Err(SourceError::RateLimited {
                        provider: "outscraper".to_owned(),
                        retry_after_secs: 60,
                    });
                }
                if !status.is_success() {
                    return Err(SourceError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }

                let text = response.text().await?;
                serde_json::from_str::<Value>(&text).map_err(|e| SourceError::Deserialize {
                    context: "Outscraper search".to_owned(),
                    source: e,
                })
            }
        })
        .await?;

        // The response is either {"data": [...]} or a bare array.
        let records = body
            .get("data")
            .and_then(Value::as_array)
            .or_else(|| body.as_array())
            .cloned()
            .unwrap_or_default();

        Ok(records.iter().filter_map(to_lead).collect())
    }
}

fn first_str<'a>(record: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| record.get(k).and_then(Value::as_str))
        .find(|s| !s.is_empty())
}

fn first_number(record: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| {
        let v = record.get(k)?;
        v.as_f64()
            .or_else(|| v.as_str().and_then(|s| s.parse().ok()))
    })
}

fn to_lead(record: &Value) -> Option<Lead> {
    let name = first_str(record, &["name", "title", "full_name"])?;
    let address = first_str(record, &["address", "full_address", "location"]).unwrap_or("");

    // City/state are the trailing address components before the country.
    let parts: Vec<&str> = address.split(',').map(str::trim).collect();
    let city = parts
        .len()
        .checked_sub(3)
        .and_then(|i| parts.get(i))
        .map(|s| (*s).to_owned());
    let state = parts
        .len()
        .checked_sub(2)
        .and_then(|i| parts.get(i))
        .map(|s| (*s).to_owned());

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let total_ratings = first_number(record, &["reviews", "reviews_count"])
        .map_or(0, |n| n.max(0.0) as u32);

    let has_photos = record
        .get("photos")
        .and_then(Value::as_array)
        .is_some_and(|p| !p.is_empty());

    Some(Lead {
        name: name.to_owned(),
        address: address.to_owned(),
        place_id: first_str(record, &["place_id", "id"]).map(str::to_owned),
        city,
        state,
        source: "outscraper".to_owned(),
        website: first_str(record, &["website", "site"]).map(str::to_owned),
        phone: first_str(record, &["phone", "phone_number", "phone_international"])
            .map(str::to_owned),
        rating: first_number(record, &["rating", "reviews_average"]).filter(|r| *r > 0.0),
        total_ratings,
        has_photos,
        scraped_at: Some(Utc::now()),
        ..Lead::default()
    })
}
