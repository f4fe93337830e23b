//! Contact email discovery.
//!
//! Scrapes the lead's homepage and likely contact pages for `mailto:` links
//! and email-shaped text, filters out operational noise addresses, and picks
//! the most contact-looking survivor. When nothing is found, synthesizes
//! ranked common-pattern guesses (`info@domain`, ...) for the email channel
//! to try in order.

use std::collections::HashSet;
use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use tablescout_core::Lead;
use url::Url;

use crate::EnrichError;

/// Substrings that disqualify a harvested address as a contact email.
const NOISE_PATTERNS: &[&str] = &[
    "noreply",
    "no-reply",
    "privacy",
    "abuse",
    "example.com",
    "test.com",
    "placeholder",
    "sentry",
    "monitoring",
    "analytics",
    "tracking",
];

/// Local parts preferred as the authoritative contact address.
const PREFERRED_PREFIXES: &[&str] = &["info@", "contact@", "hello@"];

/// Common-pattern guesses synthesized when scraping finds nothing.
const GUESS_PREFIXES: &[&str] = &["info", "contact", "hello", "general", "inquiries"];

/// Paths probed in addition to links discovered on the homepage.
const COMMON_CONTACT_PATHS: &[&str] = &["/contact", "/contact-us", "/about", "/about-us"];

/// Maximum number of secondary pages fetched per lead.
const MAX_CONTACT_PAGES: usize = 3;

/// What discovery produced for one lead.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EmailDiscovery {
    /// A scraped address considered authoritative.
    pub email: Option<String>,
    /// Ranked guesses, only populated when no address was scraped.
    pub potential_emails: Vec<String>,
}

/// Scrapes websites for contact emails.
pub struct EmailFinder {
    client: Client,
    email_re: Regex,
    mailto_re: Regex,
    href_re: Regex,
}

impl EmailFinder {
    /// # Errors
    ///
    /// Returns [`EnrichError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, EnrichError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            email_re: Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}")
                .expect("valid email regex"),
            mailto_re: Regex::new(r#"(?i)href\s*=\s*["']mailto:([^"'?\s>]+)"#)
                .expect("valid mailto regex"),
            href_re: Regex::new(r#"(?i)href\s*=\s*["']([^"'#]+)["']"#)
                .expect("valid href regex"),
        })
    }

    /// Discover contact emails for `website`.
    ///
    /// Fetch failures on individual pages are swallowed; if every page fails,
    /// the result falls back to pattern guesses on the site's domain.
    pub async fn find(&self, website: &str) -> EmailDiscovery {
        let Ok(base) = Url::parse(website) else {
            return EmailDiscovery::default();
        };

        let mut found: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        let homepage = self.fetch(base.as_str()).await;
        if let Some(html) = &homepage {
            self.harvest(html, &mut found, &mut seen);
        }

        for page_url in contact_page_urls(&base, homepage.as_deref(), &self.href_re) {
            if let Some(html) = self.fetch(&page_url).await {
                self.harvest(&html, &mut found, &mut seen);
            }
        }

        let valid: Vec<String> = found.into_iter().filter(|e| is_plausible(e)).collect();

        let email = valid
            .iter()
            .find(|e| PREFERRED_PREFIXES.iter().any(|p| e.contains(p)))
            .or_else(|| valid.first())
            .cloned();

        if email.is_some() {
            EmailDiscovery {
                email,
                potential_emails: Vec::new(),
            }
        } else {
            EmailDiscovery {
                email: None,
                potential_emails: guess_patterns(&base),
            }
        }
    }

    async fn fetch(&self, url: &str) -> Option<String> {
        match self.client.get(url).send().await {
            Ok(response) if response.status().is_success() => response.text().await.ok(),
            Ok(response) => {
                tracing::debug!(url, status = %response.status(), "contact page fetch skipped");
                None
            }
            Err(e) => {
                tracing::debug!(url, error = %e, "contact page fetch failed");
                None
            }
        }
    }

    /// Pull mailto targets first (strongest signal), then any email-shaped
    /// text, preserving first-seen order.
    fn harvest(&self, html: &str, found: &mut Vec<String>, seen: &mut HashSet<String>) {
        for capture in self.mailto_re.captures_iter(html) {
            let email = capture[1].trim().to_lowercase();
            if seen.insert(email.clone()) {
                found.push(email);
            }
        }
        for m in self.email_re.find_iter(html) {
            let email = m.as_str().to_lowercase();
            if seen.insert(email.clone()) {
                found.push(email);
            }
        }
    }
}

/// Candidate contact-page URLs: links on the homepage whose path mentions
/// contact/about, then the conventional paths, capped at
/// [`MAX_CONTACT_PAGES`].
fn contact_page_urls(base: &Url, homepage: Option<&str>, href_re: &Regex) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    if let Some(html) = homepage {
        for capture in href_re.captures_iter(html) {
            let href = &capture[1];
            if href.starts_with("mailto:") || href.starts_with("tel:") {
                continue;
            }
            let lower = href.to_lowercase();
            if !(lower.contains("contact") || lower.contains("about")) {
                continue;
            }
            if let Ok(joined) = base.join(href) {
                // Stay on the lead's own site.
                if joined.host_str() == base.host_str() && seen.insert(joined.to_string()) {
                    urls.push(joined.to_string());
                }
            }
        }
    }

    for path in COMMON_CONTACT_PATHS {
        if let Ok(joined) = base.join(path) {
            if seen.insert(joined.to_string()) {
                urls.push(joined.to_string());
            }
        }
    }

    urls.truncate(MAX_CONTACT_PAGES);
    urls
}

fn is_plausible(email: &str) -> bool {
    let lower = email.to_lowercase();
    if NOISE_PATTERNS.iter().any(|p| lower.contains(p)) {
        return false;
    }
    if lower.starts_with("support@") || lower.starts_with("help@") {
        return false;
    }
    // Long local parts are almost always tracking tokens.
    lower.split('@').next().is_some_and(|local| local.len() < 30)
}

fn guess_patterns(base: &Url) -> Vec<String> {
    let Some(host) = base.host_str() else {
        return Vec::new();
    };
    let domain = host.strip_prefix("www.").unwrap_or(host);
    GUESS_PREFIXES
        .iter()
        .map(|prefix| format!("{prefix}@{domain}"))
        .collect()
}

/// Enrich every lead lacking an email, in place. Best-effort; leads without
/// a website are left alone.
pub async fn enrich_emails(finder: &EmailFinder, leads: &mut [Lead]) {
    for lead in leads.iter_mut() {
        if lead.email.is_some() {
            continue;
        }
        let Some(website) = lead.website.clone() else {
            continue;
        };
        let discovery = finder.find(&website).await;
        if let Some(email) = discovery.email {
            tracing::debug!(lead = %lead.name, email = %email, "found contact email");
            lead.email = Some(email);
        } else if !discovery.potential_emails.is_empty() {
            lead.potential_emails = discovery.potential_emails;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn finder() -> EmailFinder {
        EmailFinder::new(5, "tablescout-test").expect("finder construction should not fail")
    }

    async fn html_page(server: &MockServer, page_path: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(page_path))
            .respond_with(ResponseTemplate::new(200).set_body_string(body.to_owned()))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn mailto_link_on_homepage_wins() {
        let server = MockServer::start().await;
        html_page(
            &server,
            "/",
            r#"<html><body><a href="mailto:info@joes-diner.example?subject=hi">Email us</a></body></html>"#,
        )
        .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = finder().find(&server.uri()).await;
        assert_eq!(result.email.as_deref(), Some("info@joes-diner.example"));
        assert!(result.potential_emails.is_empty());
    }

    #[tokio::test]
    async fn noise_addresses_are_filtered() {
        let server = MockServer::start().await;
        html_page(
            &server,
            "/",
            "reach us: noreply@joes.example or privacy@joes.example or support@joes.example",
        )
        .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = finder().find(&server.uri()).await;
        assert_eq!(result.email, None);
        // Falls back to pattern guesses on the mock server's host.
        assert_eq!(result.potential_emails.len(), 5);
        assert!(result.potential_emails[0].starts_with("info@"));
    }

    #[tokio::test]
    async fn contact_page_is_followed() {
        let server = MockServer::start().await;
        html_page(
            &server,
            "/",
            r#"<a href="/contact-us">Contact</a>"#,
        )
        .await;
        html_page(&server, "/contact-us", "write to contact@joes.example today").await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = finder().find(&server.uri()).await;
        assert_eq!(result.email.as_deref(), Some("contact@joes.example"));
    }

    #[tokio::test]
    async fn preferred_prefix_beats_first_seen() {
        let server = MockServer::start().await;
        html_page(
            &server,
            "/",
            "bookings: events@joes.example general: info@joes.example",
        )
        .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = finder().find(&server.uri()).await;
        assert_eq!(result.email.as_deref(), Some("info@joes.example"));
    }

    #[tokio::test]
    async fn unreachable_site_falls_back_to_guesses() {
        // Nothing listening on this port.
        let result = finder().find("http://127.0.0.1:1/").await;
        assert_eq!(result.email, None);
        assert_eq!(result.potential_emails.len(), 5);
    }

    #[tokio::test]
    async fn enrich_skips_leads_that_already_have_email() {
        let mut leads = vec![Lead {
            name: "Joe's Diner".to_owned(),
            email: Some("owner@joes.example".to_owned()),
            website: Some("http://127.0.0.1:1/".to_owned()),
            ..Lead::default()
        }];
        enrich_emails(&finder(), &mut leads).await;
        assert_eq!(leads[0].email.as_deref(), Some("owner@joes.example"));
        assert!(leads[0].potential_emails.is_empty());
    }

    #[test]
    fn guess_patterns_strip_www() {
        let base = Url::parse("https://www.joes-diner.example/menu").unwrap();
        let guesses = guess_patterns(&base);
        assert_eq!(guesses[0], "info@joes-diner.example");
        assert_eq!(guesses.len(), 5);
    }

    #[test]
    fn plausibility_rejects_long_local_parts() {
        assert!(is_plausible("info@joes.example"));
        assert!(!is_plausible(
            "a-very-long-tracking-token-address-x1@joes.example"
        ));
        assert!(!is_plausible("help@joes.example"));
    }
}
