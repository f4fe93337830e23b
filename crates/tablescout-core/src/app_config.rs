use std::path::PathBuf;

/// Application configuration, loaded from environment variables.
///
/// Provider credentials are all optional: a missing key disables the
/// corresponding source or outreach channel rather than failing startup.
#[derive(Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub log_level: String,

    // Scraping
    pub search_area: String,
    pub geocode: Option<String>,
    pub search_radius_km: u32,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,

    // Qualification
    pub max_reviews: u32,
    pub qualification_threshold: u32,
    pub probe_timeout_secs: u64,

    // Outreach
    pub batch_size: usize,
    pub batch_delay_ms: u64,
    pub max_attempts: usize,
    pub from_email: String,
    pub from_name: String,

    // Provider credentials
    pub google_places_api_key: Option<String>,
    pub yelp_api_key: Option<String>,
    pub outscraper_api_key: Option<String>,
    pub resend_api_key: Option<String>,
    pub vapi_api_key: Option<String>,
    pub vapi_phone_number_id: Option<String>,
    pub facebook_access_token: Option<String>,
    pub facebook_page_id: Option<String>,
    pub instagram_access_token: Option<String>,
}

fn redact(value: &Option<String>) -> Option<&'static str> {
    value.as_ref().map(|_| "[redacted]")
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("data_dir", &self.data_dir)
            .field("log_level", &self.log_level)
            .field("search_area", &self.search_area)
            .field("geocode", &self.geocode)
            .field("search_radius_km", &self.search_radius_km)
            .field("user_agent", &self.user_agent)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_secs", &self.retry_backoff_base_secs)
            .field("max_reviews", &self.max_reviews)
            .field("qualification_threshold", &self.qualification_threshold)
            .field("probe_timeout_secs", &self.probe_timeout_secs)
            .field("batch_size", &self.batch_size)
            .field("batch_delay_ms", &self.batch_delay_ms)
            .field("max_attempts", &self.max_attempts)
            .field("from_email", &self.from_email)
            .field("from_name", &self.from_name)
            .field("google_places_api_key", &redact(&self.google_places_api_key))
            .field("yelp_api_key", &redact(&self.yelp_api_key))
            .field("outscraper_api_key", &redact(&self.outscraper_api_key))
            .field("resend_api_key", &redact(&self.resend_api_key))
            .field("vapi_api_key", &redact(&self.vapi_api_key))
            .field("vapi_phone_number_id", &self.vapi_phone_number_id)
            .field("facebook_access_token", &redact(&self.facebook_access_token))
            .field("facebook_page_id", &self.facebook_page_id)
            .field(
                "instagram_access_token",
                &redact(&self.instagram_access_token),
            )
            .finish()
    }
}
