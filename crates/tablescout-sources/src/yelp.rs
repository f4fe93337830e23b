//! Yelp Fusion business-search lead source.

use std::time::Duration;

use chrono::Utc;
use reqwest::{Client, Url};
use serde::Deserialize;
use tablescout_core::Lead;

use crate::error::SourceError;
use crate::retry::retry_with_backoff;

const DEFAULT_BASE_URL: &str = "https://api.yelp.com";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    businesses: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Business {
    id: String,
    name: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    review_count: u32,
    location: BusinessLocation,
    #[serde(default)]
    photos: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct BusinessLocation {
    #[serde(default)]
    display_address: Vec<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    state: Option<String>,
}

/// Client for the Yelp Fusion `businesses/search` endpoint (bearer auth).
pub struct YelpClient {
    client: Client,
    api_key: String,
    base_url: Url,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl YelpClient {
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

    /// Searches for restaurants around `area` (up to 50, rating-sorted).
    ///
    /// Malformed business records are skipped with a warning.
    ///
    /// # Errors
    ///
    /// - [`SourceError::RateLimited`] / [`SourceError::Http`] after retries
    ///   are exhausted.
    /// - [`SourceError::UnexpectedStatus`] on non-2xx responses.
    /// - [`SourceError::Deserialize`] when the envelope does not parse.
    pub async fn search(&self, area: &str) -> Result<Vec<Lead>, SourceError> {
        let mut url = self.base_url.clone();
        url.set_path("/v3/businesses/search");
        url.query_pairs_mut()
            .append_pair("term", "restaurants")
            .append_pair("location", area)
            .append_pair("limit", "50")
            .append_pair("sort_by", "rating");

        let body = retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            async move {
                let response = self
                    .client
                    .get(url.clone())
                    .bearer_auth(&self.api_key)
                    .send()
                    .await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(SourceError::RateLimited {
                        provider: "yelp".to_owned(),
                        retry_after_secs,
                    });
                }

                if !status.is_success() {
                    return Err(SourceError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }

                let text = response.text().await?;
                serde_json::from_str::<serde_json::Value>(&text).map_err(|e| {
                    SourceError::Deserialize {
                        context: "Yelp business search".to_owned(),
                        source: e,
                    }
                })
            }
        })
        .await?;

        let envelope: SearchResponse =
            serde_json::from_value(body).map_err(|e| SourceError::Deserialize {
                context: "Yelp business search".to_owned(),
                source: e,
            })?;

        let mut leads = Vec::new();
        for raw in envelope.businesses {
            let business: Business = match serde_json::from_value(raw) {
                Ok(b) => b,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping malformed Yelp record");
                    continue;
                }
            };
            leads.push(to_lead(business));
        }
        Ok(leads)
    }
}

fn to_lead(business: Business) -> Lead {
    Lead {
        name: business.name,
        address: business.location.display_address.join(", "),
        yelp_id: Some(business.id),
        city: business.location.city,
        state: business.location.state,
        source: "yelp".to_owned(),
        website: business.url,
        phone: business.phone.filter(|p| !p.is_empty()),
        rating: business.rating,
        total_ratings: business.review_count,
        has_photos: !business.photos.is_empty(),
        scraped_at: Some(Utc::now()),
        ..Lead::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> YelpClient {
        YelpClient::with_base_url("yelp-key", 5, "tablescout-test", 0, 0, base_url)
            .expect("client construction should not fail")
    }

    #[tokio::test]
    async fn search_sends_bearer_auth_and_normalizes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v3/businesses/search"))
            .and(header("authorization", "Bearer yelp-key"))
            .and(query_param("location", "Fresno, CA"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "businesses": [{
                    "id": "y1",
                    "name": "Joe's Diner",
                    "url": "https://yelp.example/biz/joes-diner",
                    "phone": "+15595550100",
                    "rating": 3.0,
                    "review_count": 5,
                    "location": {
                        "display_address": ["1 Main St", "Fresno, CA 93701"],
                        "city": "Fresno",
                        "state": "CA"
                    },
                    "photos": ["https://img.example/1.jpg"]
                }]
            })))
            .mount(&server)
            .await;

        let leads = test_client(&server.uri()).search("Fresno, CA").await.unwrap();
        assert_eq!(leads.len(), 1);
        let lead = &leads[0];
        assert_eq!(lead.yelp_id.as_deref(), Some("y1"));
        assert_eq!(lead.address, "1 Main St, Fresno, CA 93701");
        assert_eq!(lead.total_ratings, 5);
        assert_eq!(lead.source, "yelp");
        assert!(lead.has_photos);
    }

    #[tokio::test]
    async fn malformed_business_is_skipped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v3/businesses/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "businesses": [
                    {"name": "missing id and location"},
                    {
                        "id": "y2",
                        "name": "Rosa's Cantina",
                        "review_count": 12,
                        "location": {"display_address": ["2 Elm St"]}
                    }
                ]
            })))
            .mount(&server)
            .await;

        let leads = test_client(&server.uri()).search("Fresno, CA").await.unwrap();
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].name, "Rosa's Cantina");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v3/businesses/search"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let result = test_client(&server.uri()).search("Fresno, CA").await;
        assert!(
            matches!(result, Err(SourceError::UnexpectedStatus { status: 401, .. })),
            "expected UnexpectedStatus(401), got: {result:?}"
        );
    }
}
