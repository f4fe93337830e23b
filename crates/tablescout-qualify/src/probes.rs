//! Async probes that gather website and delivery-platform signals.
//!
//! Probes never error out of the pipeline: any transport failure collapses
//! into a `ProbeFailed` signal and scoring continues.

use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use tablescout_core::Lead;

use crate::error::QualifyError;
use crate::signals::{DeliverySignal, LeadSignals, SignalSource, WebsiteSignal};

const DOORDASH_BASE: &str = "https://www.doordash.com";

/// Script markers typical of sites that have not been touched in years.
const LEGACY_MARKERS: &[&str] = &[
    "jquery-1.",
    "jquery-2.",
    "jquery.min.js?ver=1",
    "swfobject",
    "<frameset",
    "wp-content/themes/twenty1",
];

/// Markers of a modern build pipeline; their presence overrides any legacy
/// marker hit.
const MODERN_MARKERS: &[&str] = &[
    "/_next/",
    "__next_data__",
    "data-reactroot",
    "data-v-app",
    "astro-island",
    "/_nuxt/",
    "vite",
    "webpack",
];

/// Probes a lead's own website for tech age and menu photos.
pub struct WebsiteProber {
    client: Client,
    menu_img_re: Regex,
}

impl WebsiteProber {
    /// # Errors
    ///
    /// Returns [`QualifyError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, QualifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            menu_img_re: Regex::new(
                r#"(?is)<img[^>]*(?:src|alt)\s*=\s*["'][^"']*(?:menu|food|dish)[^"']*["']"#,
            )
            .expect("valid menu image regex"),
        })
    }

    /// Fetch and inspect `website`. Unreachable or non-2xx sites come back
    /// as a failed signal.
    pub async fn probe(&self, website: &str) -> WebsiteSignal {
        let html = match self.client.get(website).send().await {
            Ok(response) if response.status().is_success() => {
                match response.text().await {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::debug!(website, error = %e, "website body unreadable");
                        return WebsiteSignal::failed();
                    }
                }
            }
            Ok(response) => {
                tracing::debug!(website, status = %response.status(), "website probe rejected");
                return WebsiteSignal::failed();
            }
            Err(e) => {
                tracing::debug!(website, error = %e, "website probe failed");
                return WebsiteSignal::failed();
            }
        };

        let lower = html.to_lowercase();
        let legacy = LEGACY_MARKERS.iter().any(|m| lower.contains(m));
        let modern = MODERN_MARKERS.iter().any(|m| lower.contains(m));

        WebsiteSignal {
            source: SignalSource::Observed,
            outdated_tech: legacy && !modern,
            has_menu_photos: self.menu_img_re.is_match(&html),
        }
    }
}

/// Probes whether a restaurant appears on the delivery platform by guessing
/// its storefront URL from name and city.
pub struct DeliveryProber {
    client: Client,
    base_url: String,
}

impl DeliveryProber {
    /// # Errors
    ///
    /// Returns [`QualifyError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, QualifyError> {
        Self::with_base_url(timeout_secs, user_agent, DOORDASH_BASE)
    }

    /// # Errors
    ///
    /// Returns [`QualifyError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, QualifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// 404 or a page that never mentions the restaurant means not listed.
    /// Transport errors score the same way but carry `ProbeFailed`.
    pub async fn probe(&self, name: &str, city: Option<&str>) -> DeliverySignal {
        let slug = storefront_slug(name, city);
        if slug.is_empty() {
            return DeliverySignal::failed();
        }
        let url = format!("{}/store/{slug}", self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                let marker = name.to_lowercase();
                let listed = match response.text().await {
                    Ok(body) => body.to_lowercase().contains(&marker),
                    Err(_) => false,
                };
                DeliverySignal {
                    source: SignalSource::Observed,
                    listed,
                }
            }
            Ok(_) => DeliverySignal {
                source: SignalSource::Observed,
                listed: false,
            },
            Err(e) => {
                tracing::debug!(url, error = %e, "delivery probe failed");
                DeliverySignal::failed()
            }
        }
    }
}

/// `"Joe's Diner"` + `"Fresno"` → `"joe-s-diner-fresno"`.
fn storefront_slug(name: &str, city: Option<&str>) -> String {
    let raw = match city {
        Some(city) => format!("{name} {city}"),
        None => name.to_owned(),
    };
    let mut slug = String::with_capacity(raw.len());
    let mut last_dash = true;
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    slug.trim_end_matches('-').to_owned()
}

/// The probe pair used by the qualification pipeline.
pub struct Probers {
    pub website: WebsiteProber,
    pub delivery: DeliveryProber,
}

impl Probers {
    /// # Errors
    ///
    /// Returns [`QualifyError::Http`] if a `reqwest::Client` cannot be
    /// constructed.
    pub fn new(probe_timeout_secs: u64, user_agent: &str) -> Result<Self, QualifyError> {
        Ok(Self {
            website: WebsiteProber::new(probe_timeout_secs, user_agent)?,
            delivery: DeliveryProber::new(probe_timeout_secs, user_agent)?,
        })
    }
}

/// Run both probes for one lead, concurrently.
pub async fn gather_signals(lead: &Lead, probers: &Probers) -> LeadSignals {
    let delivery = probers.delivery.probe(&lead.name, lead.city.as_deref());
    match lead.website.as_deref() {
        Some(website) => {
            let (website_signal, delivery_signal) =
                tokio::join!(probers.website.probe(website), delivery);
            LeadSignals {
                website: Some(website_signal),
                delivery: delivery_signal,
            }
        }
        None => LeadSignals {
            website: None,
            delivery: delivery.await,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn website_prober() -> WebsiteProber {
        WebsiteProber::new(5, "tablescout-test").expect("prober construction should not fail")
    }

    fn delivery_prober(base: &str) -> DeliveryProber {
        DeliveryProber::with_base_url(5, "tablescout-test", base)
            .expect("prober construction should not fail")
    }

    async fn page(server: &MockServer, page_path: &str, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path(page_path))
            .respond_with(ResponseTemplate::new(status).set_body_string(body.to_owned()))
            .mount(server)
            .await;
    }

    #[test]
    fn slug_lowercases_and_collapses_punctuation() {
        assert_eq!(
            storefront_slug("Joe's  Diner!", Some("Fresno")),
            "joe-s-diner-fresno"
        );
        assert_eq!(storefront_slug("Rosa's Cantina", None), "rosa-s-cantina");
        assert_eq!(storefront_slug("!!!", None), "");
    }

    #[tokio::test]
    async fn legacy_script_without_modern_marker_is_outdated() {
        let server = MockServer::start().await;
        page(
            &server,
            "/",
            200,
            r#"<script src="/js/jquery-1.8.2.min.js"></script>"#,
        )
        .await;

        let signal = website_prober().probe(&server.uri()).await;
        assert_eq!(signal.source, SignalSource::Observed);
        assert!(signal.outdated_tech);
        assert!(!signal.has_menu_photos);
    }

    #[tokio::test]
    async fn modern_marker_overrides_legacy_script() {
        let server = MockServer::start().await;
        page(
            &server,
            "/",
            200,
            r#"<script src="/js/jquery-1.8.2.min.js"></script><div id="__NEXT_DATA__"></div>"#,
        )
        .await;

        let signal = website_prober().probe(&server.uri()).await;
        assert!(!signal.outdated_tech);
    }

    #[tokio::test]
    async fn menu_images_are_detected_by_src_or_alt() {
        let server = MockServer::start().await;
        page(
            &server,
            "/",
            200,
            r#"<img src="/images/hero.jpg" alt="our best dish of the week">"#,
        )
        .await;

        let signal = website_prober().probe(&server.uri()).await;
        assert!(signal.has_menu_photos);
    }

    #[tokio::test]
    async fn unreachable_website_is_a_failed_signal() {
        let signal = website_prober().probe("http://127.0.0.1:1/").await;
        assert_eq!(signal, WebsiteSignal::failed());
    }

    #[tokio::test]
    async fn server_error_is_a_failed_signal() {
        let server = MockServer::start().await;
        page(&server, "/", 500, "oops").await;
        let signal = website_prober().probe(&server.uri()).await;
        assert_eq!(signal.source, SignalSource::ProbeFailed);
    }

    #[tokio::test]
    async fn storefront_with_marker_counts_as_listed() {
        let server = MockServer::start().await;
        page(
            &server,
            "/store/joe-s-diner-fresno",
            200,
            "Order from Joe's Diner on DoorDash",
        )
        .await;

        let signal = delivery_prober(&server.uri())
            .probe("Joe's Diner", Some("Fresno"))
            .await;
        assert_eq!(signal.source, SignalSource::Observed);
        assert!(signal.listed);
    }

    #[tokio::test]
    async fn storefront_404_counts_as_not_listed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let signal = delivery_prober(&server.uri())
            .probe("Joe's Diner", Some("Fresno"))
            .await;
        assert_eq!(signal.source, SignalSource::Observed);
        assert!(!signal.listed);
    }

    #[tokio::test]
    async fn storefront_without_marker_counts_as_not_listed() {
        let server = MockServer::start().await;
        page(&server, "/store/joe-s-diner", 200, "Page not found").await;

        let signal = delivery_prober(&server.uri()).probe("Joe's Diner", None).await;
        assert!(!signal.listed);
    }

    #[tokio::test]
    async fn transport_error_is_failed_but_not_listed() {
        let signal = delivery_prober("http://127.0.0.1:1")
            .probe("Joe's Diner", Some("Fresno"))
            .await;
        assert_eq!(signal, DeliverySignal::failed());
        assert!(!signal.listed);
    }
}
