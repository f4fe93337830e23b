//! Social profile discovery.
//!
//! Two strategies, tried in order: a Graph API page search matched against
//! the lead's name (which also yields the linked Instagram business account
//! and its follower count), then a scan of the lead's own website for
//! `instagram.com/<handle>` links.

use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use tablescout_core::Lead;
use url::Url;

use crate::EnrichError;

const GRAPH_API_BASE: &str = "https://graph.facebook.com/v21.0";

/// Instagram paths that are site chrome, not profile handles.
const NON_PROFILE_SEGMENTS: &[&str] = &["p", "reel", "reels", "explore", "stories", "accounts"];

/// What discovery produced for one lead.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SocialProfile {
    pub facebook_page_id: Option<String>,
    pub instagram_id: Option<String>,
    pub instagram_handle: Option<String>,
    pub instagram_followers: Option<u32>,
}

impl SocialProfile {
    fn is_empty(&self) -> bool {
        self.facebook_page_id.is_none() && self.instagram_handle.is_none()
    }
}

#[derive(Deserialize)]
struct PageSearchResponse {
    #[serde(default)]
    data: Vec<PageResult>,
}

#[derive(Deserialize)]
struct PageResult {
    id: String,
    name: String,
    #[serde(default)]
    instagram_business_account: Option<IgAccountRef>,
}

#[derive(Deserialize)]
struct IgAccountRef {
    id: String,
}

#[derive(Deserialize)]
struct IgAccountDetails {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    followers_count: Option<u32>,
}

/// Looks up social presence for leads.
pub struct SocialFinder {
    client: Client,
    /// Graph API token; when absent only the website scan runs.
    access_token: Option<String>,
    base_url: String,
    ig_link_re: Regex,
}

impl SocialFinder {
    /// # Errors
    ///
    /// Returns [`EnrichError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        access_token: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, EnrichError> {
        Self::with_base_url(access_token, timeout_secs, user_agent, GRAPH_API_BASE)
    }

    /// # Errors
    ///
    /// Returns [`EnrichError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(
        access_token: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, EnrichError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            access_token: access_token.map(str::to_owned),
            base_url: base_url.trim_end_matches('/').to_owned(),
            ig_link_re: Regex::new(
                r#"(?i)instagram\.com/([A-Za-z0-9_.]{2,30})["'/?\s<]"#,
            )
            .expect("valid instagram link regex"),
        })
    }

    /// Discover the lead's social presence. Best-effort; any failure along
    /// the way degrades to the next strategy or to an empty profile.
    pub async fn find(&self, lead: &Lead) -> SocialProfile {
        if let Some(profile) = self.find_via_graph(lead).await {
            if !profile.is_empty() {
                return profile;
            }
        }
        self.find_via_website(lead).await
    }

    async fn find_via_graph(&self, lead: &Lead) -> Option<SocialProfile> {
        let token = self.access_token.as_deref()?;
        let url = format!("{}/pages/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", lead.name.as_str()),
                ("fields", "id,name,instagram_business_account"),
                ("access_token", token),
            ])
            .send()
            .await;

        let response = match response {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                tracing::debug!(lead = %lead.name, status = %r.status(), "page search rejected");
                return None;
            }
            Err(e) => {
                tracing::debug!(lead = %lead.name, error = %e, "page search failed");
                return None;
            }
        };

        let body: PageSearchResponse = response.json().await.ok()?;
        let wanted = lead.name.to_lowercase();
        let page = body.data.into_iter().find(|p| {
            let got = p.name.to_lowercase();
            got.contains(&wanted) || wanted.contains(&got)
        })?;

        let mut profile = SocialProfile {
            facebook_page_id: Some(page.id),
            ..SocialProfile::default()
        };

        if let Some(ig) = page.instagram_business_account {
            profile.instagram_id = Some(ig.id.clone());
            if let Some(details) = self.ig_details(&ig.id, token).await {
                profile.instagram_handle = details.username;
                profile.instagram_followers = details.followers_count;
            }
        }

        Some(profile)
    }

    async fn ig_details(&self, ig_id: &str, token: &str) -> Option<IgAccountDetails> {
        let url = format!("{}/{ig_id}", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("fields", "username,followers_count"),
                ("access_token", token),
            ])
            .send()
            .await
            .ok()?;
        if !response.status().is_success() {
            return None;
        }
        response.json().await.ok()
    }

    /// Scan the lead's website for an Instagram profile link. Follower count
    /// is unknowable this way, so only the handle is filled in.
    async fn find_via_website(&self, lead: &Lead) -> SocialProfile {
        let Some(website) = lead.website.as_deref() else {
            return SocialProfile::default();
        };
        if Url::parse(website).is_err() {
            return SocialProfile::default();
        }
        let html = match self.client.get(website).send().await {
            Ok(r) if r.status().is_success() => match r.text().await {
                Ok(text) => text,
                Err(_) => return SocialProfile::default(),
            },
            _ => return SocialProfile::default(),
        };

        for capture in self.ig_link_re.captures_iter(&html) {
            let handle = capture[1].to_lowercase();
            if NON_PROFILE_SEGMENTS.contains(&handle.as_str()) {
                continue;
            }
            return SocialProfile {
                instagram_handle: Some(handle),
                ..SocialProfile::default()
            };
        }
        SocialProfile::default()
    }
}

/// Enrich leads missing social data, in place. Best-effort per lead.
pub async fn enrich_social(finder: &SocialFinder, leads: &mut [Lead]) {
    for lead in leads.iter_mut() {
        if lead.instagram_handle.is_some() || lead.facebook_page_id.is_some() {
            continue;
        }
        let profile = finder.find(lead).await;
        if profile.is_empty() {
            continue;
        }
        tracing::debug!(
            lead = %lead.name,
            handle = profile.instagram_handle.as_deref().unwrap_or("-"),
            "found social profile"
        );
        if profile.facebook_page_id.is_some() {
            lead.facebook_page_id = profile.facebook_page_id;
        }
        if profile.instagram_id.is_some() {
            lead.instagram_id = profile.instagram_id;
        }
        if profile.instagram_handle.is_some() {
            lead.instagram_handle = profile.instagram_handle;
        }
        if profile.instagram_followers.is_some() {
            lead.instagram_followers = profile.instagram_followers;
        }
    }
}
